//! Action dispatcher.
//!
//! Actions resolved by the engines are executed out-of-band:
//! - `submit` only enqueues, it never runs the action inline
//! - a pool of workers pulls requests from one shared queue
//! - every accepted request gets exactly one reply, the action result or,
//!   when shutdown wins the race, a fixed shutting-down notice

mod request;

use std::{
    panic::AssertUnwindSafe,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use futures::FutureExt;
use tokio::{runtime::Handle, sync::RwLock, task::JoinHandle};
use tracing::{Instrument, Span, debug, error, info, info_span, warn};

use crate::{
    DispatcherConfig, GuideflowError, Result,
    common::{Queue, Shutdown},
    runtime::ActionContext,
};

pub use request::ActionRequest;

/// Output of every request drained at shutdown.
pub const SHUTDOWN_REPLY: &str = "Server is shutting down. Please reconnect later";

/// Interval between drain passes while submitters still hold the gate.
const DRAIN_INTERVAL: Duration = Duration::from_millis(10);

/// Queue of pending actions and the workers executing them.
///
/// Cheap to clone, clones share the queue, the workers and the shutdown signal.
#[derive(Clone)]
pub struct ActionDispatcher {
    /// Pending requests, consumed by exactly one worker each.
    queue: Arc<Queue<ActionRequest>>,
    /// Submission gate, `true` once the dispatcher is shut down.
    closed: Arc<RwLock<bool>>,
    /// Number of workers spawned by `launch`.
    workers: usize,
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
    /// Task answering the queue with the shutdown notice once the signal fires.
    drainer: Arc<Mutex<Option<JoinHandle<usize>>>>,
    running: Arc<AtomicBool>,
    shutdown: Shutdown,
    span: Span,
}

impl ActionDispatcher {
    /// `queue_capacity == 0` means unbounded.
    pub fn new(
        workers: usize,
        queue_capacity: usize,
    ) -> Self {
        Self {
            queue: Queue::new(queue_capacity),
            closed: Arc::new(RwLock::new(false)),
            workers,
            handles: Arc::new(Mutex::new(Vec::new())),
            drainer: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            shutdown: Shutdown::new(),
            span: Span::none(),
        }
    }

    pub fn from_config(config: &DispatcherConfig) -> Self {
        Self::new(config.workers, config.queue_capacity)
    }

    /// Share an existing shutdown signal instead of owning one.
    pub fn with_shutdown(
        mut self,
        shutdown: Shutdown,
    ) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn with_span(
        mut self,
        span: Span,
    ) -> Self {
        self.span = span;
        self
    }

    /// Spawn the workers on `handle`. Calling it again is a no-op.
    ///
    /// From then on the shutdown signal alone closes the dispatcher, whoever
    /// fires it: queued requests get [`SHUTDOWN_REPLY`] without waiting for
    /// [`ActionDispatcher::shutdown`].
    pub fn launch(
        &self,
        handle: &Handle,
    ) {
        if self.running.swap(true, Ordering::Relaxed) {
            return;
        }

        let Ok(mut handles) = self.handles.lock() else {
            error!(parent: &self.span, "worker registry poisoned, dispatcher not launched");
            return;
        };
        for worker in 0..self.workers {
            let span = info_span!(parent: &self.span, "action_worker", worker);
            handles.push(handle.spawn(Self::work(self.queue.clone(), self.shutdown.clone()).instrument(span)));
        }
        drop(handles);

        let dispatcher = self.clone();
        let drainer = handle.spawn(
            async move {
                dispatcher.shutdown.wait().await;
                dispatcher.close_and_drain().await
            }
            .instrument(info_span!(parent: &self.span, "action_drain")),
        );
        if let Ok(mut slot) = self.drainer.lock() {
            *slot = Some(drainer);
        }
        info!(parent: &self.span, workers = self.workers, "action dispatcher launched");
    }

    /// Enqueue `request`. Waits while a bounded queue is full.
    ///
    /// Fails with [`GuideflowError::DispatcherClosed`] once the shutdown
    /// signal has fired, the request's reply is then abandoned and nothing is
    /// delivered.
    pub async fn submit(
        &self,
        request: ActionRequest,
    ) -> Result<()> {
        // checked under the gate: the drain cannot close it while we hold it,
        // so an accepted request is always seen by a drain pass
        let closed = self.closed.read().await;
        if *closed || self.shutdown.is_terminated() {
            warn!(parent: &self.span, request = %request.id, node = %request.node_id, "action rejected, dispatcher is closed");
            request.reply.abandon();
            return Err(GuideflowError::DispatcherClosed);
        }

        debug!(parent: &self.span, request = %request.id, workflow = %request.workflow_id, node = %request.node_id, "action submitted");
        self.queue.send_async(request).await
    }

    /// Number of requests waiting for a worker.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// `true` once the shutdown signal has fired, `submit` rejects from then on.
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_terminated()
    }

    /// Fire the shutdown signal, wait for the queue to be answered with
    /// [`SHUTDOWN_REPLY`] and for the workers to stop.
    ///
    /// Requests already taken by a worker run to completion and are answered
    /// normally. Returns the number of drained requests.
    pub async fn shutdown(&self) -> usize {
        self.shutdown.shutdown();

        let drainer = self.drainer.lock().ok().and_then(|mut slot| slot.take());
        let mut drained = match drainer {
            Some(drainer) => drainer.await.unwrap_or_else(|err| {
                error!(parent: &self.span, error = %err, "drain task aborted");
                0
            }),
            None => 0,
        };
        // never launched, or the drain task is gone
        drained += self.close_and_drain().await;

        let handles = self.handles.lock().map(|mut handles| std::mem::take(&mut *handles)).unwrap_or_default();
        for handle in handles {
            if let Err(err) = handle.await {
                error!(parent: &self.span, error = %err, "action worker aborted");
            }
        }
        self.running.store(false, Ordering::Relaxed);

        info!(parent: &self.span, drained, "action dispatcher stopped");
        drained
    }

    /// Close the submission gate and answer every queued request.
    async fn close_and_drain(&self) -> usize {
        // submitters blocked on a full queue hold the gate, keep draining
        // until they are through
        let mut drained = 0;
        let mut gate = loop {
            drained += self.drain();
            tokio::select! {
                gate = self.closed.write() => break gate,
                _ = tokio::time::sleep(DRAIN_INTERVAL) => {}
            }
        };
        *gate = true;
        drop(gate);
        drained += self.drain();

        if drained > 0 {
            info!(parent: &self.span, drained, "queued actions answered with shutdown notice");
        }
        drained
    }

    fn drain(&self) -> usize {
        let mut drained = 0;
        while let Some(request) = self.queue.try_next() {
            let ActionRequest {
                id,
                mut input,
                reply,
                ..
            } = request;
            input.output = SHUTDOWN_REPLY.to_string();
            if let Err(err) = reply.deliver(input) {
                warn!(parent: &self.span, request = %id, error = %err, "shutdown reply lost");
            }
            drained += 1;
        }
        drained
    }

    async fn work(
        queue: Arc<Queue<ActionRequest>>,
        shutdown: Shutdown,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                request = queue.next_async() => match request {
                    Some(request) => Self::execute(request, &shutdown).await,
                    None => break,
                },
            }
        }
        debug!("action worker stopped");
    }

    /// Run one action and deliver its reply. Errors and panics of the action
    /// end up in the reply's `error` field.
    async fn execute(
        request: ActionRequest,
        shutdown: &Shutdown,
    ) {
        let ActionRequest {
            id,
            workflow_id,
            node_id,
            action,
            mut input,
            reply,
        } = request;
        let ctx = ActionContext::new(id.clone(), workflow_id, node_id.clone(), input.session_id.clone(), shutdown.clone());

        match AssertUnwindSafe(action.run(&ctx, &mut input)).catch_unwind().await {
            Ok(Ok(())) => {
                debug!(request = %id, node = %node_id, "action completed");
            }
            Ok(Err(err)) => {
                warn!(request = %id, node = %node_id, error = %err, "action failed");
                input.error = Some(err.to_string());
            }
            Err(_) => {
                error!(request = %id, node = %node_id, "action panicked");
                input.error = Some(GuideflowError::Action(format!("action on node '{}' panicked", node_id)).to_string());
            }
        }

        if let Err(err) = reply.deliver(input) {
            warn!(request = %id, error = %err, "action reply lost");
        }
    }
}
