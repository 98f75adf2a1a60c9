//! Proof Worker Module
//!
//! 증명 계산을 격리된 실행 컨텍스트로 보내고 결과를 요청별로 되돌려주는 plumbing.
//!
//! # Components
//! - `protocol`: outbound / inbound message 형식
//! - `registry`: in-flight request 와 결과의 정확히-한-번 매칭
//! - `channel`: 컨텍스트 하나 + listener 하나의 수명 관리
//! - `context`: backend 를 blocking pool 에서 실행하는 worker loop
//! - `backend`: 증명 라이브러리 seam (`ProofBackend`)

pub mod backend;
pub mod channel;
pub mod context;
pub mod protocol;
pub mod registry;

pub use backend::{ProgressReporter, ProofBackend};
pub use channel::TaskChannel;
pub use protocol::{new_request_id, RequestId, ResultKind, ResultMessage, TaskKind, TaskMessage};
pub use registry::{DispatchOutcome, RequestEvent, RequestRegistry};
