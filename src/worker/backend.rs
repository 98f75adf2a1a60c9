//! Proof backend seam
//!
//! 실제 증명 생성 / 검증 라이브러리는 이 trait 뒤에 숨김.
//! 구현체는 격리된 실행 컨텍스트의 blocking thread 에서 호출되므로
//! CPU 집약적인 작업을 동기적으로 수행해도 됨.

use tokio::sync::mpsc;

use crate::error::BackendError;
use crate::types::{
    AccountCommitment, CommitmentProof, ProofPhase, ProofProgress, WithdrawalProof,
    WithdrawalProofInput,
};
use crate::worker::protocol::{RequestId, ResultMessage};

/// 증명 라이브러리 (외부 협력자)
///
/// 모든 well-formed 입력에 대해 결정적이고, 결국 성공 또는 에러로 끝나야 함.
pub trait ProofBackend: Send + Sync + 'static {
    /// Ragequit: commitment 소유 증명
    fn generate_ragequit_proof(
        &self,
        commitment: &AccountCommitment,
        progress: &ProgressReporter,
    ) -> Result<CommitmentProof, BackendError>;

    /// Withdrawal 증명
    fn generate_withdrawal_proof(
        &self,
        commitment: &AccountCommitment,
        input: &WithdrawalProofInput,
        progress: &ProgressReporter,
    ) -> Result<WithdrawalProof, BackendError>;

    /// Withdrawal 증명 검증
    ///
    /// 유효하지 않은 proof 는 `Ok(false)`, 검증 자체를 못 하면 `Err`
    fn verify_withdrawal_proof(
        &self,
        proof: &WithdrawalProof,
        progress: &ProgressReporter,
    ) -> Result<bool, BackendError>;
}

/// 실행 중인 요청의 progress message 발신기
///
/// backend 호출 동안에만 빌려주므로 terminal message 이후에는 보고할 수 없음
pub struct ProgressReporter {
    id: RequestId,
    results: mpsc::UnboundedSender<ResultMessage>,
}

impl ProgressReporter {
    pub fn new(id: RequestId, results: mpsc::UnboundedSender<ResultMessage>) -> Self {
        Self { id, results }
    }

    pub fn request_id(&self) -> &str {
        &self.id
    }

    pub fn report(&self, phase: ProofPhase, progress: f64) {
        let message = ResultMessage::progress(self.id.clone(), ProofProgress::new(phase, progress));
        // coordinator 가 이미 teardown 됐으면 버림
        let _ = self.results.send(message);
    }
}
