//! Simulated Prover
//!
//! 실제 circuit 없이 동작하는 결정적 `ProofBackend`.
//! 개발 / 데모 / 테스트용이며 암호학적 보안성은 없음.
//!
//! # Algorithm
//!
//! ```text
//! public_signals = circuit 이 공개할 값 (commitment hash, nullifier hash, ...)
//! pi_a[0]        = keccak256(public_signals)   ← 검증 시 재계산해서 비교
//! ```
//!
//! 입력 검증은 실제 circuit constraint 와 같은 조건으로 실패함
//! (금액 초과, merkle leaf 불일치, root 불일치).

use std::thread;
use std::time::Duration;

use num_bigint::BigUint;
use sha3::{Digest, Keccak256};

use crate::error::BackendError;
use crate::types::{
    AccountCommitment, CommitmentProof, Groth16Proof, ProofPhase, WithdrawalProof,
    WithdrawalProofInput,
};
use crate::worker::{ProgressReporter, ProofBackend};

/// withdrawal circuit 의 public signal 개수
const WITHDRAWAL_SIGNALS: usize = 8;

/// 단계별 progress 보고 횟수
const STEPS: u32 = 4;

pub struct SimulatedProver {
    step_delay: Duration,
}

impl SimulatedProver {
    /// `step_delay`: progress 단계마다 blocking sleep (증명 시간 흉내)
    pub fn new(step_delay: Duration) -> Self {
        Self { step_delay }
    }

    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    /// keccak256(parts) → 0x hex
    pub fn hash(parts: &[&str]) -> String {
        let mut hasher = Keccak256::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        format!("0x{}", hex::encode(hasher.finalize()))
    }

    fn run_phase(&self, phase: ProofPhase, progress: &ProgressReporter) {
        for step in 0..=STEPS {
            progress.report(phase, f64::from(step) / f64::from(STEPS));
            if step < STEPS && !self.step_delay.is_zero() {
                thread::sleep(self.step_delay);
            }
        }
    }

    fn prove(&self, public_signals: &[String], progress: &ProgressReporter) -> Groth16Proof {
        self.run_phase(ProofPhase::GeneratingProof, progress);

        let signals: Vec<&str> = public_signals.iter().map(String::as_str).collect();
        let binding = Self::hash(&signals);

        Groth16Proof {
            pi_a: vec![binding.clone(), Self::hash(&[&binding, "a"]), "1".to_string()],
            pi_b: vec![
                vec![Self::hash(&[&binding, "b0"]), Self::hash(&[&binding, "b1"])],
                vec![Self::hash(&[&binding, "b2"]), Self::hash(&[&binding, "b3"])],
                vec!["1".to_string(), "0".to_string()],
            ],
            pi_c: vec![Self::hash(&[&binding, "c"]), Self::hash(&[&binding, "c1"]), "1".to_string()],
            protocol: "groth16".to_string(),
            curve: "bn128".to_string(),
        }
    }
}

impl Default for SimulatedProver {
    fn default() -> Self {
        Self::instant()
    }
}

fn parse_value(raw: &str, field: &str) -> Result<BigUint, BackendError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BackendError::InvalidInput(format!("{} must be a decimal integer", field)));
    }
    raw.parse()
        .map_err(|_| BackendError::InvalidInput(format!("{} must be a decimal integer", field)))
}

impl ProofBackend for SimulatedProver {
    fn generate_ragequit_proof(
        &self,
        commitment: &AccountCommitment,
        progress: &ProgressReporter,
    ) -> Result<CommitmentProof, BackendError> {
        tracing::debug!(request_id = progress.request_id(), "Simulating ragequit proof");

        if commitment.hash.is_empty() {
            return Err(BackendError::InvalidInput("commitment hash is empty".to_string()));
        }
        parse_value(&commitment.value, "commitment value")?;

        self.run_phase(ProofPhase::LoadingCircuits, progress);

        let public_signals = vec![
            commitment.hash.clone(),
            Self::hash(&[&commitment.nullifier]),
            commitment.value.clone(),
            commitment.label.clone(),
        ];
        let proof = self.prove(&public_signals, progress);

        Ok(CommitmentProof { proof, public_signals })
    }

    fn generate_withdrawal_proof(
        &self,
        commitment: &AccountCommitment,
        input: &WithdrawalProofInput,
        progress: &ProgressReporter,
    ) -> Result<WithdrawalProof, BackendError> {
        tracing::debug!(request_id = progress.request_id(), "Simulating withdrawal proof");

        let existing = parse_value(&commitment.value, "commitment value")?;
        let withdrawn = parse_value(&input.withdrawal_amount, "withdrawal amount")?;

        self.run_phase(ProofPhase::LoadingCircuits, progress);

        if withdrawn > existing {
            return Err(BackendError::ProofGeneration(format!(
                "withdrawal amount {} exceeds commitment value {}",
                withdrawn, existing
            )));
        }
        if input.state_merkle_proof.leaf != commitment.hash {
            return Err(BackendError::ProofGeneration(
                "commitment is not a leaf of the state tree".to_string(),
            ));
        }
        if input.state_merkle_proof.root != input.state_root {
            return Err(BackendError::ProofGeneration("state root mismatch".to_string()));
        }
        if input.asp_merkle_proof.leaf != commitment.label {
            return Err(BackendError::ProofGeneration(
                "label is not approved by the ASP tree".to_string(),
            ));
        }
        if input.asp_merkle_proof.root != input.asp_root {
            return Err(BackendError::ProofGeneration("ASP root mismatch".to_string()));
        }

        let remaining = (&existing - &withdrawn).to_string();
        let new_commitment = Self::hash(&[&remaining, &commitment.label, &input.new_nullifier, &input.new_secret]);

        let public_signals = vec![
            new_commitment,
            Self::hash(&[&commitment.nullifier]),
            input.withdrawal_amount.clone(),
            input.state_root.clone(),
            input.state_tree_depth.to_string(),
            input.asp_root.clone(),
            input.asp_tree_depth.to_string(),
            input.context.clone(),
        ];
        let proof = self.prove(&public_signals, progress);

        Ok(WithdrawalProof { proof, public_signals })
    }

    fn verify_withdrawal_proof(
        &self,
        proof: &WithdrawalProof,
        progress: &ProgressReporter,
    ) -> Result<bool, BackendError> {
        if proof.proof.protocol != "groth16" {
            return Err(BackendError::Verification(format!(
                "unsupported protocol '{}'",
                proof.proof.protocol
            )));
        }
        if proof.public_signals.len() != WITHDRAWAL_SIGNALS {
            return Err(BackendError::Verification(format!(
                "expected {} public signals, got {}",
                WITHDRAWAL_SIGNALS,
                proof.public_signals.len()
            )));
        }
        let Some(binding) = proof.proof.pi_a.first() else {
            return Err(BackendError::Verification("proof point A is empty".to_string()));
        };

        self.run_phase(ProofPhase::VerifyingProof, progress);

        let signals: Vec<&str> = proof.public_signals.iter().map(String::as_str).collect();
        Ok(*binding == Self::hash(&signals))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! 테스트 공용 입력

    use super::*;
    use crate::types::MerkleProof;

    pub fn commitment(value: &str, label: &str) -> AccountCommitment {
        AccountCommitment {
            hash: SimulatedProver::hash(&[value, label, "secret"]),
            value: value.to_string(),
            label: label.to_string(),
            nullifier: format!("nullifier-{}", label),
            secret: "secret".to_string(),
            block_number: 19_000_000,
            tx_hash: "0xdeadbeef".to_string(),
        }
    }

    pub fn withdrawal_input(commitment: &AccountCommitment, amount: &str) -> WithdrawalProofInput {
        WithdrawalProofInput {
            context: SimulatedProver::hash(&["withdrawal", amount]),
            withdrawal_amount: amount.to_string(),
            state_merkle_proof: MerkleProof {
                root: "state-root".to_string(),
                leaf: commitment.hash.clone(),
                index: 3,
                siblings: vec!["s0".to_string(), "s1".to_string()],
            },
            asp_merkle_proof: MerkleProof {
                root: "asp-root".to_string(),
                leaf: commitment.label.clone(),
                index: 1,
                siblings: vec!["a0".to_string()],
            },
            state_root: "state-root".to_string(),
            state_tree_depth: 2,
            asp_root: "asp-root".to_string(),
            asp_tree_depth: 1,
            new_secret: "new-secret".to_string(),
            new_nullifier: "new-nullifier".to_string(),
        }
    }
}
