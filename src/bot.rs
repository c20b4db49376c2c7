//! Bot - the main entry point for Guideflow.
//!
//! The bot wires the pieces together:
//! - the tree repository holding deployed dialogs
//! - the action dispatcher and its workers
//! - one processor loop per connected connector
//! - the shutdown signal shared by all of them

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::{
    runtime::{Handle, Runtime},
    sync::mpsc,
};
use tracing::{Instrument, Span, info, info_span};

use crate::{
    ActionDispatcher, Config, Message, Processor, Result, WorkflowGetter,
    common::{Queue, Shutdown},
    model::DialogModel,
    reply::ReplyTo,
    store::TreeRepository,
};

/// A running guided-dialog service.
///
/// # Example
///
/// ```rust,ignore
/// let bot = BotBuilder::new().config(config).build()?;
/// bot.launch();
///
/// let (inbound, mut replies) = bot.connect();
/// inbound.send(Message::new("session-1", "").with_channel("web"))?;
/// while let Some(reply) = replies.recv().await {
///     println!("{} {:?}", reply.output, reply.option_ids());
/// }
///
/// bot.shutdown().await;
/// ```
pub struct Bot {
    store: Arc<dyn TreeRepository>,
    dispatcher: ActionDispatcher,
    processor: Processor,

    running: Arc<AtomicBool>,
    shutdown: Shutdown,
    /// Runtime owned by the bot, `None` when running on the caller's.
    runtime: Option<Arc<Runtime>>,
    handle: Handle,
    span: Span,
}

impl Bot {
    pub(crate) fn new(
        config: &Config,
        store: Arc<dyn TreeRepository>,
        routes: Arc<dyn WorkflowGetter>,
        runtime: Option<Arc<Runtime>>,
        handle: Handle,
        span: Span,
    ) -> Self {
        let shutdown = Shutdown::new();
        let dispatcher = ActionDispatcher::from_config(&config.dispatcher).with_shutdown(shutdown.clone()).with_span(info_span!(parent: &span, "dispatcher"));
        let processor = Processor::new(store.clone(), routes, dispatcher.clone(), &config.engine).with_span(info_span!(parent: &span, "processor"));

        Self {
            store,
            dispatcher,
            processor,
            running: Arc::new(AtomicBool::new(false)),
            shutdown,
            runtime,
            handle,
            span,
        }
    }

    /// Start the action workers. Calling it again is a no-op.
    pub fn launch(&self) {
        if self.running.swap(true, Ordering::Relaxed) {
            return;
        }

        self.dispatcher.launch(&self.handle);
        info!(parent: &self.span, own_runtime = self.runtime.is_some(), "bot launched");
    }

    /// Store a dialog definition. Returns `true` when the workflow is new.
    ///
    /// Conversations already running keep the tree they were configured with.
    pub fn deploy(
        &self,
        model: DialogModel,
    ) -> Result<bool> {
        info!(parent: &self.span, workflow = %model.id, "deploy dialog");
        self.store.deploy(model)
    }

    /// Attach a connector.
    ///
    /// Messages sent on the returned sender are processed in order, every
    /// reply, menus and action results alike, comes out of the receiver.
    pub fn connect(&self) -> (flume::Sender<Message>, mpsc::UnboundedReceiver<Message>) {
        let inbound = Queue::new(0);
        let (reply_to, replies) = ReplyTo::channel();

        let processor = self.processor.clone();
        let shutdown = self.shutdown.clone();
        let queue = inbound.clone();
        self.handle.spawn(async move { processor.process(queue, reply_to, shutdown).await }.instrument(info_span!(parent: &self.span, "connector")));

        (inbound.sender(), replies)
    }

    /// Stop every loop and answer the pending actions with the shutdown
    /// notice. Returns the number of drained requests.
    pub async fn shutdown(&self) -> usize {
        self.running.store(false, Ordering::Relaxed);
        self.shutdown.shutdown();
        let drained = self.dispatcher.shutdown().await;
        info!(parent: &self.span, drained, "bot stopped");
        drained
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    /// Handle of the runtime the bot spawns on.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}
