use std::{fmt, sync::Arc};

use crate::dialog::actions::Action;

/// node id
pub type NodeId = String;

/// One step of a scripted conversation.
#[derive(Clone)]
pub struct DialogNode {
    /// unique id within a tree
    id: NodeId,
    /// id of the node this one attaches under, empty for the root
    parent: NodeId,
    /// name shown when the node is offered as an option
    label: String,
    /// reply text
    content: String,
    /// executed out-of-band when the node is reached
    action: Option<Arc<dyn Action>>,
}

impl DialogNode {
    pub fn new(
        id: impl Into<NodeId>,
        parent: impl Into<NodeId>,
        label: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent: parent.into(),
            label: label.into(),
            content: content.into(),
            action: None,
        }
    }

    /// A node without parent.
    pub fn root(
        id: impl Into<NodeId>,
        content: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self::new(id.clone(), "", id, content)
    }

    pub fn with_action(
        mut self,
        action: Arc<dyn Action>,
    ) -> Self {
        self.action = Some(action);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn action(&self) -> Option<&Arc<dyn Action>> {
        self.action.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }
}

impl fmt::Debug for DialogNode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("DialogNode")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("label", &self.label)
            .field("action", &self.action.as_ref().map(|a| a.action_type()))
            .finish()
    }
}
