//! Common Types Module
//!
//! 증명 coordinator 를 통과하는 프로토콜 artifact 정의.
//! 내부 구조는 증명 라이브러리가 해석하며, 이 crate 는 그대로 전달만 함.
//! 필드 이름은 worker 와 주고받는 JSON 형식을 따름 (camelCase).

use std::fmt;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::services::format::format_units;

/// Pool 에 예치된 account commitment
///
/// Field element 값은 모두 10진수 문자열
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCommitment {
    pub hash: String,
    /// 예치 금액 (base units)
    pub value: String,
    pub label: String,
    pub nullifier: String,
    pub secret: String,
    pub block_number: u64,
    pub tx_hash: String,
}

/// Lean IMT 포함 증명
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleProof {
    pub root: String,
    pub leaf: String,
    pub index: u64,
    pub siblings: Vec<String>,
}

/// Withdrawal 증명 입력
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalProofInput {
    /// keccak(withdrawal, scope) - 수신자/relayer 데이터 바인딩
    pub context: String,
    pub withdrawal_amount: String,
    pub state_merkle_proof: MerkleProof,
    pub asp_merkle_proof: MerkleProof,
    pub state_root: String,
    pub state_tree_depth: u32,
    pub asp_root: String,
    pub asp_tree_depth: u32,
    pub new_secret: String,
    pub new_nullifier: String,
}

/// Groth16 proof (snarkjs 형식)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groth16Proof {
    pub pi_a: Vec<String>,
    pub pi_b: Vec<Vec<String>>,
    pub pi_c: Vec<String>,
    pub protocol: String,
    pub curve: String,
}

/// Ragequit (commitment 소유 증명) 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentProof {
    pub proof: Groth16Proof,
    pub public_signals: Vec<String>,
}

/// Withdrawal 증명 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalProof {
    pub proof: Groth16Proof,
    pub public_signals: Vec<String>,
}

/// 증명 작업 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofPhase {
    LoadingCircuits,
    GeneratingProof,
    VerifyingProof,
}

impl fmt::Display for ProofPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofPhase::LoadingCircuits => write!(f, "loading_circuits"),
            ProofPhase::GeneratingProof => write!(f, "generating_proof"),
            ProofPhase::VerifyingProof => write!(f, "verifying_proof"),
        }
    }
}

/// 진행 상황 descriptor
///
/// `progress` 는 관례상 [0, 1] 범위에서 단조 증가하지만 강제하지 않음
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProofProgress {
    pub phase: ProofPhase,
    pub progress: f64,
}

impl ProofProgress {
    pub fn new(phase: ProofPhase, progress: f64) -> Self {
        Self { phase, progress }
    }
}

/// 금액 타입 (표시용 decimals 포함)
///
/// `decimals` 는 표시에만 사용되며 정수 연산에는 영향 없음
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    pub value: BigUint,
    pub decimals: u32,
}

impl Amount {
    pub fn new(value: BigUint, decimals: u32) -> Self {
        Self { value, decimals }
    }

    /// ETH (18 decimals)
    pub fn eth(value: impl Into<BigUint>) -> Self {
        Self { value: value.into(), decimals: 18 }
    }

    /// USDC (6 decimals)
    pub fn usdc(value: impl Into<BigUint>) -> Self {
        Self { value: value.into(), decimals: 6 }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_units(&self.value, self.decimals))
    }
}
