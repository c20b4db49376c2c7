use std::sync::Arc;

use crate::{Message, dialog::NodeId, dialog::actions::Action, reply::Reply, utils};

/// Unit of work handed to the action workers.
///
/// Carries its own one-shot reply, whoever takes the request out of the
/// queue is the only one able to answer it.
pub struct ActionRequest {
    pub id: String,
    pub workflow_id: String,
    pub node_id: NodeId,
    pub action: Arc<dyn Action>,
    pub input: Message,
    pub reply: Reply,
}

impl ActionRequest {
    pub fn new(
        workflow_id: &str,
        node_id: &str,
        action: Arc<dyn Action>,
        input: Message,
        reply: Reply,
    ) -> Self {
        Self {
            id: utils::longid(),
            workflow_id: workflow_id.to_string(),
            node_id: node_id.to_string(),
            action,
            input,
            reply,
        }
    }
}

impl std::fmt::Debug for ActionRequest {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ActionRequest")
            .field("id", &self.id)
            .field("workflow_id", &self.workflow_id)
            .field("node_id", &self.node_id)
            .field("action", &self.action.action_type())
            .field("session_id", &self.input.session_id)
            .finish()
    }
}
