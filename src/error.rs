//! Error Handling Module
//!
//! Typed errors for every failure the client core can surface.
//! Uses thiserror for domain errors; the binary layers anyhow on top.
//!
//! # Taxonomy
//!
//! - `AmountError`: 잘못된 fee 설정 / 금액 문자열 (fail-fast, 호출 즉시 반환)
//! - `ProofError`: 증명 요청이 실패로 끝남 (worker 실패, 채널 종료, 응답 형식 오류)
//! - `BackendError`: 격리된 실행 컨텍스트 안에서 증명 라이브러리가 보고한 실패
//! - `RegistryError`: request id 충돌 (프로그래머 에러) / 닫힌 registry 에 등록

use num_bigint::BigUint;
use thiserror::Error;

/// 금액 / 수수료 계산 에러
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// fee_bps >= 10000 (100%) 이면 gross deposit 을 정의할 수 없음
    #[error("Fee of {fee_bps} bps is out of range (must be below 10000)")]
    FeeOutOfRange { fee_bps: BigUint },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Too many fractional digits: {found} > {decimals} decimals")]
    TooManyDecimals { found: usize, decimals: u32 },

    #[error("Decimals {decimals} out of range (max {max})")]
    DecimalsOutOfRange { decimals: u32, max: u32 },
}

/// 증명 요청 에러
///
/// # Design Decision
///
/// worker가 보고한 실패는 메시지를 그대로 전달 (`Worker`).
/// 호출자가 재시도 여부를 결정하므로 이 레이어는 재시도하지 않음.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    /// 격리된 컨텍스트가 error terminal message 를 보냄
    #[error("{0}")]
    Worker(String),

    /// success payload 를 기대한 타입으로 디코딩할 수 없음
    #[error("Invalid worker response: {0}")]
    InvalidResponse(String),

    /// task payload 직렬화 실패
    #[error("Failed to encode task payload: {0}")]
    Encoding(String),

    /// 채널이 닫혀서 결과를 받을 수 없음
    #[error("Proof worker channel closed")]
    ChannelClosed,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// 증명 라이브러리 (backend) 에러
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to load circuits: {0}")]
    CircuitLoading(String),

    #[error("Proof generation failed: {0}")]
    ProofGeneration(String),

    #[error("Proof verification failed: {0}")]
    Verification(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Request id already registered: {0}")]
    DuplicateId(String),

    /// listener 가 사라진 뒤의 등록 시도
    #[error("Request registry is closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_error_is_passed_through() {
        let err = ProofError::Worker("Merkle proof mismatch".to_string());
        assert_eq!(err.to_string(), "Merkle proof mismatch");
    }

    #[test]
    fn test_fee_out_of_range_message() {
        let err = AmountError::FeeOutOfRange { fee_bps: BigUint::from(10_000u32) };
        assert_eq!(
            err.to_string(),
            "Fee of 10000 bps is out of range (must be below 10000)"
        );
    }

    #[test]
    fn test_registry_error_converts() {
        let err: ProofError = RegistryError::DuplicateId("abc".to_string()).into();
        assert_eq!(err.to_string(), "Request id already registered: abc");
    }
}
