use serde::{Deserialize, Serialize};

use crate::dialog::actions::Action;

#[derive(Serialize, Deserialize)]
pub struct NodeModel {
    pub id: String,
    /// empty for the root
    #[serde(default)]
    pub parent: String,
    /// defaults to the node id when empty
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Box<dyn Action>>,
}

impl NodeModel {
    pub fn new(
        id: impl Into<String>,
        parent: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent: parent.into(),
            label: String::new(),
            content: content.into(),
            action: None,
        }
    }

    pub fn with_label(
        mut self,
        label: impl Into<String>,
    ) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_action(
        mut self,
        action: Box<dyn Action>,
    ) -> Self {
        self.action = Some(action);
        self
    }
}
