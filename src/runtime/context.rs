use std::future::Future;

use crate::{common::Shutdown, dialog::NodeId, message::SessionId};

/// Execution context handed to an action.
///
/// Workers never preempt a running action. Long actions may observe the
/// shutdown signal through [`ActionContext::cancelled`] and wrap up early.
#[derive(Debug, Clone)]
pub struct ActionContext {
    request_id: String,
    workflow_id: String,
    node_id: NodeId,
    session_id: SessionId,

    shutdown: Shutdown,
}

impl ActionContext {
    pub fn new(
        request_id: String,
        workflow_id: String,
        node_id: NodeId,
        session_id: SessionId,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            request_id,
            workflow_id,
            node_id,
            session_id,
            shutdown,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_terminated()
    }

    pub fn cancelled(&self) -> impl Future<Output = ()> + Send + 'static {
        self.shutdown.wait()
    }
}
