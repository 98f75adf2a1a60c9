//! Request Registry
//!
//! in-flight request id → 요청별 이벤트 채널.
//!
//! # Invariants
//!
//! - id 당 pending entry 는 최대 하나
//! - terminal message (success / error) 를 보는 순간 entry 제거 → 정확히 한 번 settle
//! - progress message 로는 entry 를 제거하지 않음
//! - 모르는 id (이미 settle 됐거나 teardown 중) 의 메시지는 조용히 버림
//! - `abandon_all` 이후에는 새 id 를 받지 않음 (결과를 전달할 listener 가 없음)
//!
//! 진행 상황과 최종 결과가 같은 채널로 순서대로 전달되므로,
//! 호출자는 settle 이후의 progress 를 관찰할 수 없음.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{ProofError, RegistryError};
use crate::types::ProofProgress;
use crate::worker::protocol::{RequestId, ResultKind, ResultMessage};

/// 요청 하나에 대해 호출자에게 전달되는 이벤트
#[derive(Debug, Clone, PartialEq)]
pub enum RequestEvent {
    /// 0..N 회
    Progress(ProofProgress),
    /// 정확히 1회, 항상 마지막
    Settled(Result<Value, ProofError>),
}

/// `dispatch` 결과 (로깅 / 테스트용)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Progress,
    Settled,
    Dropped,
}

type EventSender = mpsc::UnboundedSender<RequestEvent>;

#[derive(Default)]
struct RegistryState {
    pending: HashMap<RequestId, EventSender>,
    closed: bool,
}

/// Thread-safe pending request 테이블
///
/// clone 은 같은 테이블을 공유함 (coordinator 와 listener task)
#[derive(Clone, Default)]
pub struct RequestRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // 임계 구역에서 panic 이 나도 테이블 자체는 일관된 상태
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 새 pending request 등록
    ///
    /// # Errors
    ///
    /// - 이미 등록된 id 면 `RegistryError::DuplicateId`
    /// - `abandon_all` 이후면 `RegistryError::Closed`
    pub fn register(
        &self,
        id: RequestId,
    ) -> Result<mpsc::UnboundedReceiver<RequestEvent>, RegistryError> {
        let mut state = self.lock();
        if state.closed {
            return Err(RegistryError::Closed);
        }
        if state.pending.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        state.pending.insert(id, tx);
        Ok(rx)
    }

    /// 격리된 컨텍스트에서 온 메시지를 해당 요청으로 라우팅
    pub fn dispatch(&self, message: ResultMessage) -> DispatchOutcome {
        match message.kind {
            ResultKind::Progress => {
                let progress: ProofProgress = match serde_json::from_value(message.payload.clone()) {
                    Ok(progress) => progress,
                    Err(e) => {
                        tracing::warn!(request_id = %message.id, "Malformed progress payload: {}", e);
                        return DispatchOutcome::Dropped;
                    }
                };

                let state = self.lock();
                match state.pending.get(&message.id) {
                    Some(tx) => {
                        // 호출자가 handle 을 버렸어도 entry 는 terminal message 까지 유지
                        let _ = tx.send(RequestEvent::Progress(progress));
                        DispatchOutcome::Progress
                    }
                    None => {
                        tracing::trace!(request_id = %message.id, "Dropping progress for unknown request");
                        DispatchOutcome::Dropped
                    }
                }
            }
            ResultKind::Success | ResultKind::Error => {
                let result = if message.kind == ResultKind::Success {
                    Ok(message.payload.clone())
                } else {
                    Err(ProofError::Worker(message.error_message()))
                };

                if self.settle(&message.id, result) {
                    DispatchOutcome::Settled
                } else {
                    tracing::debug!(request_id = %message.id, "Dropping terminal message for unknown request");
                    DispatchOutcome::Dropped
                }
            }
        }
    }

    /// entry 를 제거하고 결과 전달. entry 가 없었으면 false
    pub fn settle(&self, id: &str, result: Result<Value, ProofError>) -> bool {
        let removed = self.lock().pending.remove(id);
        match removed {
            Some(tx) => {
                let _ = tx.send(RequestEvent::Settled(result));
                true
            }
            None => false,
        }
    }

    /// 모든 pending request 포기하고 registry 를 닫음 (channel teardown)
    ///
    /// sender 가 drop 되므로 대기 중인 handle 은 `ChannelClosed` 로 끝남.
    /// 같은 lock 안에서 닫으므로 이후 `register` 는 전부 실패함
    pub fn abandon_all(&self) -> usize {
        let abandoned: Vec<_> = {
            let mut state = self.lock();
            state.closed = true;
            state.pending.drain().collect()
        };
        if !abandoned.is_empty() {
            tracing::debug!("Abandoning {} pending proof request(s)", abandoned.len());
        }
        abandoned.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().pending.contains_key(id)
    }

    /// `abandon_all` 이 호출됐는지
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProofPhase;
    use serde_json::json;
    use tokio::sync::mpsc::error::TryRecvError;

    fn progress(id: &str, value: f64) -> ResultMessage {
        ResultMessage::progress(id, ProofProgress::new(ProofPhase::GeneratingProof, value))
    }

    #[test]
    fn test_register_rejects_duplicate_id() {
        let registry = RequestRegistry::new();
        registry.register("a".to_string()).unwrap();

        let err = registry.register("a".to_string()).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateId("a".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_progress_keeps_entry() {
        let registry = RequestRegistry::new();
        let mut rx = registry.register("a".to_string()).unwrap();

        assert_eq!(registry.dispatch(progress("a", 0.5)), DispatchOutcome::Progress);
        assert!(registry.contains("a"));

        match rx.try_recv().unwrap() {
            RequestEvent::Progress(p) => assert_eq!(p.progress, 0.5),
            other => panic!("Expected progress, got {:?}", other),
        }
    }

    #[test]
    fn test_success_settles_once() {
        let registry = RequestRegistry::new();
        let mut rx = registry.register("a".to_string()).unwrap();

        let first = ResultMessage::success("a", json!(true));
        let duplicate = ResultMessage::success("a", json!(false));

        assert_eq!(registry.dispatch(first), DispatchOutcome::Settled);
        assert_eq!(registry.dispatch(duplicate), DispatchOutcome::Dropped);
        assert!(registry.is_empty());

        assert_eq!(rx.try_recv().unwrap(), RequestEvent::Settled(Ok(json!(true))));
        // sender 가 drop 되어 채널 종료
        assert_eq!(rx.try_recv().unwrap_err(), TryRecvError::Disconnected);
    }

    #[test]
    fn test_error_settles_with_worker_message() {
        let registry = RequestRegistry::new();
        let mut rx = registry.register("a".to_string()).unwrap();

        registry.dispatch(ResultMessage::error("a", "invalid merkle proof"));

        assert_eq!(
            rx.try_recv().unwrap(),
            RequestEvent::Settled(Err(ProofError::Worker("invalid merkle proof".to_string())))
        );
    }

    #[test]
    fn test_progress_after_settle_is_dropped() {
        let registry = RequestRegistry::new();
        let mut rx = registry.register("a".to_string()).unwrap();

        registry.dispatch(ResultMessage::success("a", json!(1)));
        assert_eq!(registry.dispatch(progress("a", 0.9)), DispatchOutcome::Dropped);

        assert!(matches!(rx.try_recv().unwrap(), RequestEvent::Settled(Ok(_))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unknown_id_does_not_affect_live_requests() {
        let registry = RequestRegistry::new();
        let mut rx = registry.register("live".to_string()).unwrap();

        assert_eq!(registry.dispatch(ResultMessage::success("ghost", json!(1))), DispatchOutcome::Dropped);
        assert_eq!(registry.dispatch(ResultMessage::error("ghost", "x")), DispatchOutcome::Dropped);
        assert_eq!(registry.dispatch(progress("ghost", 0.1)), DispatchOutcome::Dropped);

        assert!(registry.contains("live"));
        assert_eq!(rx.try_recv().unwrap_err(), TryRecvError::Empty);
    }

    #[test]
    fn test_out_of_order_terminals_route_by_id() {
        let registry = RequestRegistry::new();
        let mut rx_a = registry.register("a".to_string()).unwrap();
        let mut rx_b = registry.register("b".to_string()).unwrap();

        registry.dispatch(ResultMessage::success("b", json!("proof-b")));
        registry.dispatch(progress("a", 0.7));
        registry.dispatch(ResultMessage::success("a", json!("proof-a")));

        assert_eq!(rx_b.try_recv().unwrap(), RequestEvent::Settled(Ok(json!("proof-b"))));
        assert!(matches!(rx_a.try_recv().unwrap(), RequestEvent::Progress(_)));
        assert_eq!(rx_a.try_recv().unwrap(), RequestEvent::Settled(Ok(json!("proof-a"))));
    }

    #[test]
    fn test_malformed_progress_is_dropped() {
        let registry = RequestRegistry::new();
        let mut rx = registry.register("a".to_string()).unwrap();

        let message = ResultMessage {
            kind: ResultKind::Progress,
            payload: json!({ "phase": "compiling", "progress": 0.1 }),
            id: "a".to_string(),
        };

        assert_eq!(registry.dispatch(message), DispatchOutcome::Dropped);
        assert!(registry.contains("a"));
        assert_eq!(rx.try_recv().unwrap_err(), TryRecvError::Empty);
    }

    #[test]
    fn test_abandon_all_closes_handles() {
        let registry = RequestRegistry::new();
        let mut rx = registry.register("a".to_string()).unwrap();
        registry.register("b".to_string()).unwrap();

        assert_eq!(registry.abandon_all(), 2);
        assert!(registry.is_empty());
        assert_eq!(rx.try_recv().unwrap_err(), TryRecvError::Disconnected);
    }

    #[test]
    fn test_register_after_abandon_is_rejected() {
        let registry = RequestRegistry::new();
        assert!(!registry.is_closed());

        registry.abandon_all();
        assert!(registry.is_closed());

        assert_eq!(registry.register("late".to_string()).unwrap_err(), RegistryError::Closed);
        assert!(registry.is_empty());
        assert_eq!(registry.dispatch(ResultMessage::success("late", json!(1))), DispatchOutcome::Dropped);
    }
}
