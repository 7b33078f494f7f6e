use std::{
  sync::{
    Arc,
    atomic::{
      AtomicUsize,
      Ordering,
    },
    mpsc::{
      Receiver,
      RecvTimeoutError,
      Sender,
      TryRecvError,
      channel,
    },
  },
  time::Duration,
};

use thiserror::Error;
use tokio::runtime::{
  Builder,
  Runtime,
};

use crate::{
  AiError,
  GenerativeModel,
  Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiEvent {
  Completed {
    id:     RequestId,
    result: Result<String>,
  },
}

impl AiEvent {
  pub fn id(&self) -> RequestId {
    match self {
      Self::Completed { id, .. } => *id,
    }
  }
}

/// Runs model calls on a small tokio pool.
///
/// Each submitted request produces exactly one [`AiEvent::Completed`], in
/// whatever order the requests finish. The interaction thread picks them up
/// with [`AiRuntime::try_recv_event`].
pub struct AiRuntime {
  runtime:   Option<Runtime>,
  event_tx:  Sender<AiEvent>,
  event_rx:  Receiver<AiEvent>,
  next_id:   u64,
  in_flight: Arc<AtomicUsize>,
}

impl AiRuntime {
  pub fn new() -> std::result::Result<Self, AiRuntimeError> {
    let runtime = Builder::new_multi_thread()
      .worker_threads(2)
      .thread_name("the-ai-worker")
      .enable_all()
      .build()
      .map_err(|err| AiRuntimeError::FailedToStart(err.to_string()))?;
    let (event_tx, event_rx) = channel();

    Ok(Self {
      runtime: Some(runtime),
      event_tx,
      event_rx,
      next_id: 1,
      in_flight: Arc::new(AtomicUsize::new(0)),
    })
  }

  /// Number of requests submitted but not yet completed.
  pub fn in_flight(&self) -> usize {
    self.in_flight.load(Ordering::Acquire)
  }

  pub fn submit(
    &mut self,
    model: Arc<dyn GenerativeModel>,
    prompt: String,
  ) -> std::result::Result<RequestId, AiRuntimeError> {
    let Some(runtime) = &self.runtime else {
      return Err(AiRuntimeError::NotRunning);
    };

    let id = RequestId(self.next_id);
    self.next_id += 1;
    self.in_flight.fetch_add(1, Ordering::AcqRel);

    let completion = Completion {
      id,
      event_tx: self.event_tx.clone(),
      in_flight: Arc::clone(&self.in_flight),
      result: None,
    };
    runtime.spawn(async move {
      log::debug!("ai request {} started on '{}'", id.0, model.name());
      let result = model.generate(&prompt).await;
      if let Err(err) = &result {
        log::warn!("ai request {} failed: {err}", id.0);
      }
      completion.finish(result);
    });

    Ok(id)
  }

  pub fn try_recv_event(&self) -> Option<AiEvent> {
    match self.event_rx.try_recv() {
      Ok(event) => Some(event),
      Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
    }
  }

  pub fn recv_event_timeout(&self, timeout: Duration) -> Option<AiEvent> {
    match self.event_rx.recv_timeout(timeout) {
      Ok(event) => Some(event),
      Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
    }
  }

  /// Stops the pool without waiting for outstanding requests.
  pub fn shutdown(&mut self) {
    if let Some(runtime) = self.runtime.take() {
      let pending = self.in_flight();
      if pending > 0 {
        log::info!("ai runtime shutting down with {pending} request(s) in flight");
      }
      runtime.shutdown_background();
    }
  }
}

impl Drop for AiRuntime {
  fn drop(&mut self) {
    self.shutdown();
  }
}

/// Reports a request's outcome when dropped, so a task that panics or is
/// cancelled still produces its one completion event.
struct Completion {
  id:        RequestId,
  event_tx:  Sender<AiEvent>,
  in_flight: Arc<AtomicUsize>,
  result:    Option<Result<String>>,
}

impl Completion {
  fn finish(mut self, result: Result<String>) {
    self.result = Some(result);
  }
}

impl Drop for Completion {
  fn drop(&mut self) {
    let result = self.result.take().unwrap_or_else(|| {
      log::error!("ai request {} ended without a result", self.id.0);
      Err(AiError::Service("request aborted".into()))
    });
    self.in_flight.fetch_sub(1, Ordering::AcqRel);
    let _ = self.event_tx.send(AiEvent::Completed {
      id: self.id,
      result,
    });
  }
}

#[derive(Debug, Error)]
pub enum AiRuntimeError {
  #[error("failed to start ai runtime: {0}")]
  FailedToStart(String),
  #[error("ai runtime is not running")]
  NotRunning,
}
