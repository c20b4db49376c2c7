use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    GuideflowError, Result,
    dialog::{DialogNode, DialogTree},
    model::NodeModel,
};

/// Storage form of a dialog tree, nodes listed parents-first.
#[derive(Serialize, Deserialize, Default)]
pub struct DialogModel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    pub nodes: Vec<NodeModel>,
}

impl DialogModel {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str::<DialogModel>(s).map_err(|e| GuideflowError::Convert(format!("{}", e)))
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str::<DialogModel>(s).map_err(|e| GuideflowError::Convert(format!("{}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl TryFrom<DialogModel> for DialogTree {
    type Error = GuideflowError;

    fn try_from(model: DialogModel) -> Result<Self> {
        if model.nodes.is_empty() {
            return Err(GuideflowError::EmptyTree(model.id));
        }

        DialogTree::build(model.nodes.into_iter().map(|n| {
            let label = if n.label.is_empty() { n.id.clone() } else { n.label };
            let node = DialogNode::new(n.id, n.parent, label, n.content);
            match n.action {
                Some(action) => node.with_action(Arc::from(action)),
                None => node,
            }
        }))
    }
}

#[cfg(test)]
mod test {
    use crate::{
        GuideflowError,
        dialog::{DialogTree, actions::ActionType},
        model::{DialogModel, NodeModel},
    };

    const BILLING_JSON: &str = r#"{
        "id": "billing",
        "name": "Billing",
        "nodes": [
            { "id": "start", "content": "How can we help?" },
            { "id": "billing", "parent": "start", "label": "Billing", "content": "Billing menu" },
            { "id": "support", "parent": "start", "content": "Support menu" },
            {
                "id": "overdue",
                "parent": "billing",
                "label": "Overdue invoices",
                "content": "Fetching your invoices",
                "action": { "type": "static_reply", "reply": "no overdue invoices" }
            }
        ]
    }"#;

    #[test]
    fn test_dialog_model_from_json() {
        let model = DialogModel::from_json(BILLING_JSON).unwrap();
        assert_eq!(model.id, "billing");
        assert_eq!(model.nodes.len(), 4);

        let tree = DialogTree::try_from(model).unwrap();
        assert_eq!(tree.len(), 4);
        // label falls back to the id
        assert_eq!(tree.find("support").unwrap().label(), "support");
        let overdue = tree.find("overdue").unwrap();
        assert_eq!(overdue.action().unwrap().action_type(), ActionType::StaticReply);
    }

    #[test]
    fn test_dialog_model_from_toml() {
        let model = DialogModel::from_toml(
            r#"
            id = "support"

            [[nodes]]
            id = "start"
            content = "hi"

            [[nodes]]
            id = "chat"
            parent = "start"
            label = "Chat"
            content = "a human will answer"
            action = { type = "static_reply", reply = "queued" }
            "#,
        )
        .unwrap();

        let tree = DialogTree::try_from(model).unwrap();
        assert!(tree.find("chat").unwrap().has_action());
    }

    #[test]
    fn test_dialog_model_round_trip_json() {
        let model = DialogModel::from_json(BILLING_JSON).unwrap();
        let text = model.to_json().unwrap();
        let again = DialogModel::from_json(&text).unwrap();
        assert_eq!(again.nodes.len(), 4);
        assert!(again.nodes[3].action.is_some());
    }

    #[test]
    fn test_dialog_model_orphan_fails_whole_build() {
        let model = DialogModel {
            id: "broken".into(),
            nodes: vec![NodeModel::new("start", "", "hi"), NodeModel::new("overdue", "billing", "late")],
            ..Default::default()
        };
        assert!(matches!(DialogTree::try_from(model), Err(GuideflowError::OrphanNode { .. })));
    }

    #[test]
    fn test_dialog_model_empty() {
        let model = DialogModel {
            id: "empty".into(),
            ..Default::default()
        };
        assert_eq!(DialogTree::try_from(model).unwrap_err(), GuideflowError::EmptyTree("empty".into()));
    }
}
