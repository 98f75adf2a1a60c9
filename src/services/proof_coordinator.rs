//! Proof Coordinator
//!
//! 증명 생성 / 검증을 격리된 실행 컨텍스트로 보내는 public API.
//!
//! # Flow
//!
//! ```text
//! caller ──▶ ProofCoordinator ──(1) request id 생성
//!                 │            ──(2) RequestRegistry 등록
//!                 │            ──(3) TaskChannel 확보 (첫 호출 시 생성)
//!                 │            ──(4) TaskMessage 전송
//!                 ▼
//!           PendingProof<T> ◀── progress 0..N ── settled 1
//! ```
//!
//! # Design Decision
//!
//! - 채널은 전역 singleton 이 아니라 coordinator 인스턴스가 소유 (lazy init, 재사용)
//! - progress 콜백 대신 요청별 이벤트 채널: progress 0..N 후 terminal 값 하나
//! - 재시도 없음. 실패는 그대로 호출자에게 전달
//! - 취소 없음. handle 을 버려도 컨텍스트의 계산은 계속됨

use std::future::{Future, IntoFuture};
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{ProofError, RegistryError};
use crate::types::{
    AccountCommitment, CommitmentProof, ProofProgress, WithdrawalProof, WithdrawalProofInput,
};
use crate::worker::protocol::WithdrawalTask;
use crate::worker::{
    new_request_id, ProofBackend, RequestEvent, RequestId, RequestRegistry, TaskChannel, TaskKind,
    TaskMessage,
};

type ChannelFactory = Box<dyn Fn(RequestRegistry) -> TaskChannel + Send + Sync>;

/// 진행 중인 증명 요청 handle
///
/// `.await` 하면 최종 결과, `next_progress()` 로 진행 상황을 먼저 읽을 수 있음.
/// 진행 상황과 결과가 같은 채널로 순서대로 오므로 결과 이후 progress 는 없음.
pub struct PendingProof<T> {
    id: RequestId,
    events: Option<mpsc::UnboundedReceiver<RequestEvent>>,
    settled: Option<Result<Value, ProofError>>,
    _result: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> PendingProof<T> {
    fn new(id: RequestId, events: mpsc::UnboundedReceiver<RequestEvent>) -> Self {
        Self {
            id,
            events: Some(events),
            settled: None,
            _result: PhantomData,
        }
    }

    /// 전송 전에 이미 실패한 요청
    fn failed(id: RequestId, error: ProofError) -> Self {
        Self {
            id,
            events: None,
            settled: Some(Err(error)),
            _result: PhantomData,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.id
    }

    /// 결과가 도착했는지
    pub fn is_settled(&self) -> bool {
        self.settled.is_some()
    }

    /// 다음 progress. terminal 이벤트에 도달하면 `None`
    pub async fn next_progress(&mut self) -> Option<ProofProgress> {
        if self.settled.is_some() {
            return None;
        }

        let event = match self.events.as_mut() {
            Some(events) => events.recv().await,
            None => None,
        };

        match event {
            Some(RequestEvent::Progress(progress)) => Some(progress),
            Some(RequestEvent::Settled(result)) => {
                self.settled = Some(result);
                self.events = None;
                None
            }
            None => {
                // registry entry 가 결과 없이 사라짐 (teardown)
                self.settled = Some(Err(ProofError::ChannelClosed));
                self.events = None;
                None
            }
        }
    }

    /// progress 마다 콜백을 부르고 최종 결과 반환
    ///
    /// 콜백은 결과가 나온 뒤에는 절대 호출되지 않음
    pub async fn with_progress<F>(mut self, mut on_progress: F) -> Result<T, ProofError>
    where
        F: FnMut(ProofProgress),
    {
        while let Some(progress) = self.next_progress().await {
            on_progress(progress);
        }
        self.finish()
    }

    /// progress 를 무시하고 결과만 기다림
    pub async fn result(self) -> Result<T, ProofError> {
        self.with_progress(|_| {}).await
    }

    fn finish(self) -> Result<T, ProofError> {
        let value = self.settled.unwrap_or(Err(ProofError::ChannelClosed))?;
        serde_json::from_value(value).map_err(|e| ProofError::InvalidResponse(e.to_string()))
    }
}

impl<T> IntoFuture for PendingProof<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = Result<T, ProofError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.result())
    }
}

/// ZK 증명 coordinator
///
/// # Architecture
///
/// ```text
/// ┌──────────────────────────────────────────────────────┐
/// │                 ProofCoordinator                      │
/// │                                                       │
/// │  ┌─────────────────┐        ┌──────────────────────┐  │
/// │  │ RequestRegistry │◀───────│ TaskChannel (lazy)   │  │
/// │  │  id → events    │dispatch│  outbound / listener │  │
/// │  └─────────────────┘        └──────────┬───────────┘  │
/// │                                        │              │
/// └────────────────────────────────────────┼──────────────┘
///                                          ▼
///                               isolated context (backend)
/// ```
pub struct ProofCoordinator {
    registry: RequestRegistry,
    channel: OnceLock<TaskChannel>,
    factory: ChannelFactory,
}

impl ProofCoordinator {
    /// backend 를 호스팅하는 coordinator 생성
    ///
    /// 컨텍스트는 첫 요청 때 만들어짐
    pub fn new<B: ProofBackend>(backend: B) -> Self {
        Self::with_backend(Arc::new(backend))
    }

    pub fn with_backend(backend: Arc<dyn ProofBackend>) -> Self {
        Self::with_channel_factory(move |registry| TaskChannel::spawn(backend.clone(), registry))
    }

    /// 채널 생성 방법을 직접 주입 (외부 프로세스 bridge 등)
    pub fn with_channel_factory<F>(factory: F) -> Self
    where
        F: Fn(RequestRegistry) -> TaskChannel + Send + Sync + 'static,
    {
        Self {
            registry: RequestRegistry::new(),
            channel: OnceLock::new(),
            factory: Box::new(factory),
        }
    }

    /// 채널 확보 (lazy initialization)
    ///
    /// 동시에 여러 호출이 들어와도 생성은 한 번만
    fn channel(&self) -> &TaskChannel {
        self.channel.get_or_init(|| {
            tracing::debug!("Creating proof worker channel");
            (self.factory)(self.registry.clone())
        })
    }

    /// 채널이 이미 생성됐는지
    pub fn has_channel(&self) -> bool {
        self.channel.get().is_some()
    }

    /// 아직 결과가 오지 않은 요청 수
    pub fn pending_requests(&self) -> usize {
        self.registry.len()
    }

    fn submit<T, P>(&self, kind: TaskKind, payload: &P) -> PendingProof<T>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let id = new_request_id();

        let payload = match serde_json::to_value(payload) {
            Ok(payload) => payload,
            Err(e) => return PendingProof::failed(id, ProofError::Encoding(e.to_string())),
        };

        let events = match self.registry.register(id.clone()) {
            Ok(events) => events,
            Err(RegistryError::Closed) => {
                tracing::debug!(request_id = %id, ?kind, "Proof worker channel already closed");
                return PendingProof::failed(id, ProofError::ChannelClosed);
            }
            Err(e) => return PendingProof::failed(id, e.into()),
        };

        tracing::debug!(request_id = %id, ?kind, "Posting proof task");

        let message = TaskMessage {
            kind,
            payload,
            id: id.clone(),
        };
        if let Err(e) = self.channel().post(message) {
            tracing::warn!(request_id = %id, ?kind, "Failed to post proof task: {}", e);
            self.registry.settle(&id, Err(e));
        }

        PendingProof::new(id, events)
    }

    /// Ragequit 증명 생성 (commitment 공개 탈출)
    ///
    /// # Panics
    ///
    /// 첫 호출은 컨텍스트를 띄우므로 Tokio runtime 안에서 호출해야 함
    pub fn generate_ragequit_proof(&self, commitment: &AccountCommitment) -> PendingProof<CommitmentProof> {
        self.submit(TaskKind::GenerateRagequitProof, commitment)
    }

    /// Withdrawal 증명 생성
    pub fn generate_withdrawal_proof(
        &self,
        commitment: &AccountCommitment,
        input: &WithdrawalProofInput,
    ) -> PendingProof<WithdrawalProof> {
        let payload = WithdrawalTask {
            commitment: commitment.clone(),
            input: input.clone(),
        };
        self.submit(TaskKind::GenerateWithdrawalProof, &payload)
    }

    /// Withdrawal 증명 검증
    ///
    /// 검증 실패(invalid proof)는 `Ok(false)`, 컨텍스트 에러는 `Err`
    pub fn verify_withdrawal_proof(&self, proof: &WithdrawalProof) -> PendingProof<bool> {
        self.submit(TaskKind::VerifyWithdrawalProof, proof)
    }

    /// 채널과 컨텍스트 해제
    ///
    /// 남은 요청은 `ChannelClosed` 로 끝나며, 컨텍스트에서 이미 돌고 있는
    /// 계산은 취소되지 않고 결과만 버려짐
    pub fn shutdown(self) {
        tracing::debug!(pending = self.pending_requests(), "Shutting down proof coordinator");
        drop(self);
    }
}

impl Drop for ProofCoordinator {
    fn drop(&mut self) {
        self.registry.abandon_all();
    }
}
