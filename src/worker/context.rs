//! Isolated execution context
//!
//! # Architecture
//!
//! ```text
//!   TaskMessage ──▶ ┌────────────────────┐
//!                   │   worker loop      │── spawn_blocking ──▶ ProofBackend
//!                   │  (tokio task)      │                        │
//!                   └────────────────────┘                        │ progress
//!   ResultMessage ◀───────────────────────────────────────────────┘ success / error
//! ```
//!
//! 각 task 는 blocking pool 에서 독립적으로 실행되므로
//! 여러 id 의 작업이 섞여서 진행되고, 완료 순서는 요청 순서와 무관함.
//! 받은 task 하나당 terminal message 는 정확히 하나 (backend panic 포함).

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::BackendError;
use crate::types::{AccountCommitment, WithdrawalProof};
use crate::worker::backend::{ProgressReporter, ProofBackend};
use crate::worker::protocol::{ResultMessage, TaskKind, TaskMessage, WithdrawalTask};

/// 격리된 컨텍스트 시작
///
/// 반환된 sender 가 모두 drop 되면 worker loop 종료.
/// 실행 중인 backend 호출은 취소되지 않고 끝까지 돌며 결과는 버려질 수 있음.
///
/// # Panics
///
/// Tokio runtime 밖에서 호출하면 panic
pub fn spawn(
    backend: Arc<dyn ProofBackend>,
) -> (mpsc::UnboundedSender<TaskMessage>, mpsc::UnboundedReceiver<ResultMessage>) {
    let (task_tx, task_rx) = mpsc::unbounded_channel();
    let (result_tx, result_rx) = mpsc::unbounded_channel();

    tokio::spawn(run(backend, task_rx, result_tx));

    (task_tx, result_rx)
}

async fn run(
    backend: Arc<dyn ProofBackend>,
    mut tasks: mpsc::UnboundedReceiver<TaskMessage>,
    results: mpsc::UnboundedSender<ResultMessage>,
) {
    tracing::debug!("Proof worker started");

    while let Some(task) = tasks.recv().await {
        let backend = backend.clone();
        let results = results.clone();

        tokio::spawn(async move {
            let id = task.id.clone();
            let kind = task.kind;
            let progress = ProgressReporter::new(id.clone(), results.clone());

            tracing::debug!(request_id = %id, ?kind, "Executing proof task");
            let outcome =
                tokio::task::spawn_blocking(move || execute(backend.as_ref(), task, &progress)).await;

            let terminal = match outcome {
                Ok(message) => message,
                Err(e) => {
                    tracing::error!(request_id = %id, ?kind, "Proof task aborted: {}", e);
                    ResultMessage::error(id, "proof worker panicked")
                }
            };

            let _ = results.send(terminal);
        });
    }

    tracing::debug!("Proof worker stopped");
}

fn decode<T: DeserializeOwned>(kind: TaskKind, payload: Value) -> Result<T, BackendError> {
    serde_json::from_value(payload)
        .map_err(|e| BackendError::InvalidInput(format!("malformed {:?} payload: {}", kind, e)))
}

fn encode<T: Serialize>(value: T) -> Result<Value, BackendError> {
    serde_json::to_value(value)
        .map_err(|e| BackendError::ProofGeneration(format!("failed to serialize result: {}", e)))
}

/// task 하나 실행 → terminal message
fn execute(backend: &dyn ProofBackend, task: TaskMessage, progress: &ProgressReporter) -> ResultMessage {
    let TaskMessage { kind, payload, id } = task;

    let outcome = match kind {
        TaskKind::GenerateRagequitProof => decode::<AccountCommitment>(kind, payload)
            .and_then(|commitment| backend.generate_ragequit_proof(&commitment, progress))
            .and_then(encode),
        TaskKind::GenerateWithdrawalProof => decode::<WithdrawalTask>(kind, payload)
            .and_then(|task| backend.generate_withdrawal_proof(&task.commitment, &task.input, progress))
            .and_then(encode),
        TaskKind::VerifyWithdrawalProof => decode::<WithdrawalProof>(kind, payload)
            .and_then(|proof| backend.verify_withdrawal_proof(&proof, progress))
            .and_then(encode),
    };

    match outcome {
        Ok(value) => ResultMessage::success(id, value),
        Err(e) => {
            tracing::debug!(request_id = %id, ?kind, "Proof task failed: {}", e);
            ResultMessage::error(id, e.to_string())
        }
    }
}
