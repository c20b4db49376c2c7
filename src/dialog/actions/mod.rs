pub mod http_request;
pub mod static_reply;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Message, Result, runtime::ActionContext};

pub use http_request::HttpRequestAction;
pub use static_reply::StaticReplyAction;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionType {
    /// user supplied action
    #[default]
    Custom,
    HttpRequest,
    StaticReply,
}

/// Side-effecting capability attached to a dialog node.
///
/// Actions run on the dispatcher workers, never inline with the turn that
/// resolved the node. They are deserialized from dialog definitions through
/// the `"type"` tag.
#[async_trait]
#[typetag::serde(tag = "type")]
pub trait Action: Send + Sync {
    /// Returns the type of the action.
    fn action_type(&self) -> ActionType;

    /// Executes the action against the caller's message.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The [`ActionContext`] of the request.
    /// * `message` - The message to annotate, usually by setting `output`.
    ///
    /// # Returns
    ///
    /// An error is recorded on the message by the worker, the reply is
    /// delivered either way and the action is not retried.
    async fn run(
        &self,
        ctx: &ActionContext,
        message: &mut Message,
    ) -> Result<()>;
}
