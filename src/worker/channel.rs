//! Task Channel
//!
//! 격리된 컨텍스트 하나와 그 결과를 받는 listener 하나의 수명을 소유.
//!
//! # Design Decision
//!
//! - 동시 요청은 모두 하나의 채널로 multiplex (pool / 동시성 제한 없음)
//! - listener 는 생성 시점에 한 번만 설치, 모든 inbound message 를 registry 로 전달
//! - drop 시 listener 를 멈추고 outbound sender 를 놓아 컨텍스트를 종료시킴

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::ProofError;
use crate::worker::backend::ProofBackend;
use crate::worker::context;
use crate::worker::protocol::{ResultMessage, TaskMessage};
use crate::worker::registry::RequestRegistry;

pub struct TaskChannel {
    tasks: mpsc::UnboundedSender<TaskMessage>,
    listener: JoinHandle<()>,
}

impl TaskChannel {
    /// backend 를 호스팅하는 격리된 컨텍스트를 띄우고 채널 생성
    ///
    /// # Panics
    ///
    /// Tokio runtime 밖에서 호출하면 panic
    pub fn spawn(backend: Arc<dyn ProofBackend>, registry: RequestRegistry) -> Self {
        let (tasks, results) = context::spawn(backend);
        Self::from_parts(tasks, results, registry)
    }

    /// 이미 만들어진 컨텍스트 (다른 프로세스 bridge, 테스트 스크립트 등) 연결
    pub fn from_parts(
        tasks: mpsc::UnboundedSender<TaskMessage>,
        mut results: mpsc::UnboundedReceiver<ResultMessage>,
        registry: RequestRegistry,
    ) -> Self {
        let listener = tokio::spawn(async move {
            while let Some(message) = results.recv().await {
                let outcome = registry.dispatch(message);
                tracing::trace!(?outcome, "Dispatched worker message");
            }

            // 컨텍스트가 사라짐 → 더 이상 terminal message 가 올 수 없음
            tracing::warn!("Proof worker result stream ended");
            registry.abandon_all();
        });

        Self { tasks, listener }
    }

    /// task 전송 (non-blocking, 결과는 listener 를 통해 비동기로 도착)
    pub fn post(&self, message: TaskMessage) -> Result<(), ProofError> {
        self.tasks.send(message).map_err(|_| ProofError::ChannelClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tasks.is_closed() || self.listener.is_finished()
    }
}

impl Drop for TaskChannel {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
