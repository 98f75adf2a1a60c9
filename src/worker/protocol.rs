//! Worker message protocol
//!
//! 격리된 실행 컨텍스트와 주고받는 메시지 형식.
//!
//! ```text
//! outbound: { "type": "generateRagequitProof" | "generateWithdrawalProof" | "verifyWithdrawalProof",
//!             "payload": <kind-specific>, "id": "<request id>" }
//! inbound:  { "type": "success" | "error" | "progress",
//!             "payload": <result> | { "message": "..." } | { "phase", "progress" },
//!             "id": "<request id>" }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::{AccountCommitment, ProofProgress, WithdrawalProofInput};

/// 요청 식별자 (32자 hex, 122 bit random)
pub type RequestId = String;

/// 새 request id 생성
///
/// UUID v4 를 하이픈 없이 렌더링. 세션 수명 동안 충돌 확률은 무시 가능
pub fn new_request_id() -> RequestId {
    Uuid::new_v4().simple().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskKind {
    GenerateRagequitProof,
    GenerateWithdrawalProof,
    VerifyWithdrawalProof,
}

/// coordinator → 격리된 컨텍스트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMessage {
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub payload: Value,
    pub id: RequestId,
}

/// `generateWithdrawalProof` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalTask {
    pub commitment: AccountCommitment,
    pub input: WithdrawalProofInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Success,
    Error,
    Progress,
}

/// `error` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// 격리된 컨텍스트 → coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMessage {
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub payload: Value,
    pub id: RequestId,
}

impl ResultMessage {
    pub fn success(id: impl Into<RequestId>, payload: Value) -> Self {
        Self {
            kind: ResultKind::Success,
            payload,
            id: id.into(),
        }
    }

    pub fn error(id: impl Into<RequestId>, message: impl Into<String>) -> Self {
        Self {
            kind: ResultKind::Error,
            payload: serde_json::json!({ "message": message.into() }),
            id: id.into(),
        }
    }

    pub fn progress(id: impl Into<RequestId>, progress: ProofProgress) -> Self {
        Self {
            kind: ResultKind::Progress,
            payload: serde_json::json!({
                "phase": progress.phase,
                "progress": progress.progress,
            }),
            id: id.into(),
        }
    }

    /// success / error 는 요청 수명을 끝냄
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, ResultKind::Success | ResultKind::Error)
    }

    /// error payload 에서 사람이 읽을 수 있는 메시지 추출
    pub fn error_message(&self) -> String {
        match serde_json::from_value::<ErrorPayload>(self.payload.clone()) {
            Ok(payload) => payload.message,
            Err(_) => match &self.payload {
                Value::String(message) => message.clone(),
                Value::Null => "Unknown proof worker error".to_string(),
                other => other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProofPhase;
    use serde_json::json;

    #[test]
    fn test_request_id_format() {
        let a = new_request_id();
        let b = new_request_id();

        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_task_message_wire_format() {
        let message = TaskMessage {
            kind: TaskKind::VerifyWithdrawalProof,
            payload: json!({ "publicSignals": [] }),
            id: "abc".to_string(),
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "verifyWithdrawalProof",
                "payload": { "publicSignals": [] },
                "id": "abc",
            })
        );

        let kinds = serde_json::to_value([
            TaskKind::GenerateRagequitProof,
            TaskKind::GenerateWithdrawalProof,
        ])
        .unwrap();
        assert_eq!(kinds, json!(["generateRagequitProof", "generateWithdrawalProof"]));
    }

    #[test]
    fn test_result_message_parsing() {
        let raw = r#"{"type":"progress","payload":{"phase":"generating_proof","progress":0.25},"id":"r1"}"#;
        let message: ResultMessage = serde_json::from_str(raw).unwrap();

        assert_eq!(message.kind, ResultKind::Progress);
        assert!(!message.is_terminal());
        assert_eq!(
            message,
            ResultMessage::progress("r1", ProofProgress::new(ProofPhase::GeneratingProof, 0.25))
        );
    }

    #[test]
    fn test_error_message_extraction() {
        let message = ResultMessage::error("r2", "circuit not found");
        assert!(message.is_terminal());
        assert_eq!(serde_json::to_value(&message).unwrap()["payload"], json!({ "message": "circuit not found" }));
        assert_eq!(message.error_message(), "circuit not found");

        let bare = ResultMessage {
            kind: ResultKind::Error,
            payload: json!("boom"),
            id: "r3".to_string(),
        };
        assert_eq!(bare.error_message(), "boom");

        let empty = ResultMessage {
            kind: ResultKind::Error,
            payload: Value::Null,
            id: "r4".to_string(),
        };
        assert_eq!(empty.error_message(), "Unknown proof worker error");
    }
}
