//! ZK Privacy Pool Client Library
//!
//! # Overview
//!
//! Privacy pool 클라이언트의 핵심 로직:
//! 무거운 ZK 증명 계산을 격리된 실행 컨텍스트로 보내는 coordinator 와
//! deposit / withdrawal 금액을 정수로만 계산하는 fee 엔진.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      Client Core                         │
//! │                                                          │
//! │  ┌──────────────────┐           ┌──────────────────┐    │
//! │  │ ProofCoordinator │           │   Amount Math    │    │
//! │  └────────┬─────────┘           └──────────────────┘    │
//! │           │                                              │
//! │  ┌────────┴─────────┐  dispatch  ┌──────────────────┐   │
//! │  │   TaskChannel    │──────────▶│ RequestRegistry  │   │
//! │  └────────┬─────────┘            └──────────────────┘   │
//! └───────────┼──────────────────────────────────────────────┘
//!             │ TaskMessage / ResultMessage
//!             ▼
//!    ┌──────────────────┐
//!    │ Isolated Context │  (ProofBackend on blocking pool)
//!    └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: 에러 타입
//! - `services`: coordinator, fee 계산, 표시 헬퍼, simulated prover
//! - `worker`: 격리된 컨텍스트 메시지 프로토콜 / registry / 채널
//! - `types`: 증명 artifact 타입
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zk_pool_client::{ProofCoordinator, SimulatedProver};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let coordinator = ProofCoordinator::new(SimulatedProver::instant());
//!
//!     let proof = coordinator
//!         .generate_ragequit_proof(&commitment)
//!         .with_progress(|p| println!("{} {:.0}%", p.phase, p.progress * 100.0))
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod services;
pub mod types;
pub mod worker;


// Re-exports for convenience
pub use config::Config;
pub use error::{AmountError, BackendError, ProofError, RegistryError};
pub use services::{
    calculate_asp_fee, calculate_initial_deposit, fee_breakdown, FeeBreakdown, PendingProof,
    ProofCoordinator, SimulatedProver,
};
pub use types::{
    AccountCommitment, Amount, CommitmentProof, ProofPhase, ProofProgress, WithdrawalProof,
    WithdrawalProofInput,
};
pub use worker::ProofBackend;
