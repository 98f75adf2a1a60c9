//! Services Module
//!
//! 비즈니스 로직을 담당하는 서비스 레이어
//!
//! # Services
//! - `ProofCoordinator`: 격리된 컨텍스트로 증명 생성 / 검증 위임
//! - `SimulatedProver`: 개발 / 테스트용 증명 backend
//! - `amount`: 수수료 / deposit 금액 계산
//! - `format`: 금액 / 주소 / 시간 표시

pub mod amount;
pub mod format;
mod proof_coordinator;
mod simulated_prover;

pub use amount::{
    calculate_asp_fee, calculate_initial_deposit, fee_breakdown, parse_fee_bps, validate_fee_bps,
    FeeBreakdown, BPS_DENOMINATOR,
};
pub use proof_coordinator::{PendingProof, ProofCoordinator};
pub use simulated_prover::SimulatedProver;

#[cfg(test)]
pub(crate) use simulated_prover::fixtures;
