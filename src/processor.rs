//! Inbound message routing.
//!
//! The processor sits between connectors and engines. It resolves the
//! workflow of each message from its channel and keeps one [`DialogEngine`]
//! per session, so turns of a conversation never overlap.

mod routes;

use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tracing::{Span, error, info_span, warn};

use crate::{
    EngineConfig, Message, Result,
    common::{MemCache, Queue, Shutdown},
    dispatcher::ActionDispatcher,
    engine::{DialogEngine, RoutingPolicy},
    message::SessionId,
    reply::ReplyTo,
    store::TreeRepository,
};

pub use routes::{ChannelRoutes, EngineKind, Workflow, WorkflowGetter};

/// Output of the reply sent on a channel no workflow is routed to.
pub const WORKFLOW_NOT_FOUND_REPLY: &str = "some error has occurred";

/// Shared engine of one conversation.
type SessionEngine = Arc<Mutex<DialogEngine>>;

#[derive(Clone)]
pub struct Processor {
    repo: Arc<dyn TreeRepository>,
    workflows: Arc<dyn WorkflowGetter>,
    dispatcher: ActionDispatcher,
    routing: RoutingPolicy,
    /// Live conversations, idle ones expire.
    sessions: MemCache<SessionId, SessionEngine>,
    span: Span,
}

impl Processor {
    pub fn new(
        repo: Arc<dyn TreeRepository>,
        workflows: Arc<dyn WorkflowGetter>,
        dispatcher: ActionDispatcher,
        config: &EngineConfig,
    ) -> Self {
        Self {
            repo,
            workflows,
            dispatcher,
            routing: config.routing_policy,
            sessions: MemCache::with_time_to_idle(config.session_capacity as usize, Duration::from_secs(config.session_idle_secs)),
            span: Span::none(),
        }
    }

    pub fn with_span(
        mut self,
        span: Span,
    ) -> Self {
        self.span = span;
        self
    }

    /// Route one inbound message to its conversation's engine.
    ///
    /// Channels without a workflow get an error reply. A session whose
    /// workflow fails to configure gets the engine's not-ready reply and is
    /// retried on its next message.
    pub async fn handle(
        &self,
        message: Message,
        reply_to: &ReplyTo,
    ) -> Result<()> {
        let Some(flow) = self.workflows.get_flow(&message.channel_name) else {
            warn!(parent: &self.span, channel = %message.channel_name, session = %message.session_id, "workflow not found");
            let mut response = message;
            response.output = WORKFLOW_NOT_FOUND_REPLY.to_string();
            response.error = Some("workflow not found".to_string());
            return reply_to.reply().deliver(response);
        };

        let session = match self.session(&message.session_id, &flow) {
            Ok(session) => session,
            Err(err) => {
                error!(parent: &self.span, workflow = %flow.id, session = %message.session_id, error = %err, "failed to configure engine");
                let mut engine = self.engine(&message.session_id);
                engine.handle_message(message, reply_to).await?;
                return Err(err);
            }
        };

        let mut engine = session.lock().await;
        engine.handle_message(message, reply_to).await
    }

    /// Handle messages from `inbound` one by one until `shutdown` fires.
    pub async fn process(
        &self,
        inbound: Arc<Queue<Message>>,
        reply_to: ReplyTo,
        shutdown: Shutdown,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                message = inbound.next_async() => match message {
                    Some(message) => {
                        let session = message.session_id.clone();
                        if let Err(err) = self.handle(message, &reply_to).await {
                            error!(parent: &self.span, session = %session, error = %err, "failed to handle message");
                        }
                    }
                    None => break,
                },
            }
        }
    }

    /// Forget a conversation, its next message starts over.
    pub fn reset(
        &self,
        session_id: &str,
    ) {
        self.sessions.remove(&session_id.to_string());
    }

    /// Number of live conversations.
    pub fn sessions(&self) -> usize {
        self.sessions.len()
    }

    fn session(
        &self,
        session_id: &str,
        flow: &Workflow,
    ) -> Result<SessionEngine> {
        self.sessions.try_get_with(session_id.to_string(), || -> Result<SessionEngine> {
            let mut engine = match flow.engine {
                EngineKind::Guided => self.engine(session_id),
            };
            engine.configure(&flow.id)?;
            Ok(Arc::new(Mutex::new(engine)))
        })
    }

    fn engine(
        &self,
        session_id: &str,
    ) -> DialogEngine {
        DialogEngine::new(self.repo.clone(), self.dispatcher.clone())
            .with_routing(self.routing)
            .with_span(info_span!(parent: &self.span, "dialog_engine", session = session_id))
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Processor").field("routing", &self.routing).finish()
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::{ChannelRoutes, Processor, WORKFLOW_NOT_FOUND_REPLY};
    use crate::{
        EngineConfig, GuideflowError, Message, RouteConfig,
        common::{Queue, Shutdown},
        dispatcher::ActionDispatcher,
        engine::NOT_READY_REPLY,
        model::{DialogModel, NodeModel},
        reply::ReplyTo,
        store::{MemStore, TreeRepository},
    };

    fn billing() -> DialogModel {
        DialogModel {
            id: "billing".into(),
            nodes: vec![NodeModel::new("start", "", "How can we help?"), NodeModel::new("overdue", "start", "Overdue invoices")],
            ..Default::default()
        }
    }

    fn processor(store: &MemStore) -> Processor {
        let routes = ChannelRoutes::new(&[RouteConfig {
            channel: "billing-*".into(),
            workflow: "billing".into(),
        }])
        .unwrap();
        Processor::new(Arc::new(store.clone()), Arc::new(routes), ActionDispatcher::new(1, 16), &EngineConfig::default())
    }

    #[tokio::test]
    async fn test_processor_unknown_channel() {
        let store = MemStore::new();
        let processor = processor(&store);
        let (reply_to, mut rx) = ReplyTo::channel();

        processor.handle(Message::new("s1", "hi").with_channel("sales"), &reply_to).await.unwrap();

        let reply = rx.recv().await.unwrap();
        assert_eq!(reply.output, WORKFLOW_NOT_FOUND_REPLY);
        assert_eq!(reply.error.as_deref(), Some("workflow not found"));
        assert_eq!(processor.sessions(), 0);
    }

    #[tokio::test]
    async fn test_processor_keeps_one_engine_per_session() {
        let store = MemStore::new();
        store.deploy(billing()).unwrap();
        let processor = processor(&store);
        let (reply_to, mut rx) = ReplyTo::channel();

        processor.handle(Message::new("s1", "").with_channel("billing-web"), &reply_to).await.unwrap();
        processor.handle(Message::new("s2", "").with_channel("billing-web"), &reply_to).await.unwrap();
        processor.handle(Message::new("s1", "overdue").with_channel("billing-web"), &reply_to).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().output, "How can we help?");
        assert_eq!(rx.recv().await.unwrap().output, "How can we help?");
        assert_eq!(rx.recv().await.unwrap().output, "Overdue invoices");
        assert_eq!(processor.sessions(), 2);

        // a reset conversation starts over, the first message is not a selection
        processor.reset("s1");
        processor.handle(Message::new("s1", "overdue").with_channel("billing-web"), &reply_to).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().output, "How can we help?");
    }

    #[tokio::test]
    async fn test_processor_retries_failed_configuration() {
        let store = MemStore::new();
        let processor = processor(&store);
        let (reply_to, mut rx) = ReplyTo::channel();

        let err = processor.handle(Message::new("s1", "").with_channel("billing-web"), &reply_to).await.unwrap_err();
        assert!(matches!(err, GuideflowError::Configuration { .. }));
        assert_eq!(rx.recv().await.unwrap().output, NOT_READY_REPLY);
        assert_eq!(processor.sessions(), 0);

        store.deploy(billing()).unwrap();
        processor.handle(Message::new("s1", "").with_channel("billing-web"), &reply_to).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().output, "How can we help?");
    }

    #[tokio::test]
    async fn test_processor_loop_stops_on_shutdown() {
        let store = MemStore::new();
        store.deploy(billing()).unwrap();
        let processor = processor(&store);
        let (reply_to, mut rx) = ReplyTo::channel();
        let inbound = Queue::new(0);
        let shutdown = Shutdown::new();

        let task = {
            let processor = processor.clone();
            let inbound = inbound.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move { processor.process(inbound, reply_to, shutdown).await })
        };

        inbound.sender().send(Message::new("s1", "").with_channel("billing-1")).unwrap();
        assert_eq!(rx.recv().await.unwrap().output, "How can we help?");

        shutdown.shutdown();
        task.await.unwrap();
    }
}
