use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Message, Result, runtime::ActionContext};

use super::{Action, ActionType};

/// Answers with a fixed text.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StaticReplyAction {
    pub reply: String,
}

impl StaticReplyAction {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
#[typetag::serde(name = "static_reply")]
impl Action for StaticReplyAction {
    fn action_type(&self) -> ActionType {
        ActionType::StaticReply
    }

    async fn run(
        &self,
        _: &ActionContext,
        message: &mut Message,
    ) -> Result<()> {
        message.output = self.reply.clone();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::StaticReplyAction;
    use crate::{
        Message,
        common::Shutdown,
        dialog::actions::{Action, ActionType},
        runtime::ActionContext,
    };

    #[tokio::test]
    async fn test_static_reply() {
        let action = StaticReplyAction::new("your invoices are on the way");
        let ctx = ActionContext::new("r1".into(), "billing".into(), "overdue".into(), "s1".into(), Shutdown::new());
        let mut msg = Message::new("s1", "overdue");

        action.run(&ctx, &mut msg).await.unwrap();

        assert_eq!(action.action_type(), ActionType::StaticReply);
        assert_eq!(msg.output, "your invoices are on the way");
        assert_eq!(msg.error, None);
    }

    #[test]
    fn test_static_reply_tagged_json() {
        let action: Box<dyn Action> = serde_json::from_str(r#"{"type": "static_reply", "reply": "hi"}"#).unwrap();
        assert_eq!(action.action_type(), ActionType::StaticReply);
    }
}
