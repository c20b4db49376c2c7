//! Per-conversation dialog navigation.
//!
//! A [`DialogEngine`] walks one conversation through a dialog tree:
//! - `configure` loads the workflow's tree and puts the cursor on its root
//! - the first message only starts the dialog, it is never read as a selection
//! - later messages select a child of the cursor, or are routed by the
//!   [`RoutingPolicy`] when nothing matches
//! - every turn answers with the cursor's content and its children as options,
//!   actions on the cursor are handed to the [`ActionDispatcher`] and answer
//!   separately

mod routing;

use std::sync::Arc;

use petgraph::graph::NodeIndex;
use tracing::{Span, debug, info, warn};

use crate::{
    GuideflowError, Message, Result,
    dialog::{DialogNode, DialogTree},
    dispatcher::{ActionDispatcher, ActionRequest},
    message::{ReplyOption, ResponseType},
    reply::ReplyTo,
    store::TreeRepository,
};

pub use routing::{Route, RoutingPolicy};

/// Output of the reply sent by an engine that was never configured.
pub const NOT_READY_REPLY: &str = "some error occurred, please contact an administrator";

/// Position of a conversation in its tree.
struct ConversationCursor {
    workflow_id: String,
    tree: Arc<DialogTree>,
    root: NodeIndex,
    current: NodeIndex,
    dialog_started: bool,
}

/// Navigator of a single conversation.
///
/// Not shared between turns: the caller serializes messages of a
/// conversation, the engine only ever sees one at a time.
pub struct DialogEngine {
    repo: Arc<dyn TreeRepository>,
    dispatcher: ActionDispatcher,
    routing: RoutingPolicy,
    cursor: Option<ConversationCursor>,
    span: Span,
}

impl DialogEngine {
    pub fn new(
        repo: Arc<dyn TreeRepository>,
        dispatcher: ActionDispatcher,
    ) -> Self {
        Self {
            repo,
            dispatcher,
            routing: RoutingPolicy::default(),
            cursor: None,
            span: Span::none(),
        }
    }

    pub fn with_routing(
        mut self,
        routing: RoutingPolicy,
    ) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_span(
        mut self,
        span: Span,
    ) -> Self {
        self.span = span;
        self
    }

    /// Load the tree of `workflow_id` and place the cursor on its root.
    ///
    /// On failure the engine keeps its previous state.
    pub fn configure(
        &mut self,
        workflow_id: &str,
    ) -> Result<()> {
        let tree = self.repo.get_tree(workflow_id).map_err(|err| match err {
            err @ GuideflowError::Configuration { .. } => err,
            err => GuideflowError::Configuration {
                workflow_id: workflow_id.to_string(),
                reason: err.to_string(),
            },
        })?;
        let Some(root) = tree.root() else {
            return Err(GuideflowError::Configuration {
                workflow_id: workflow_id.to_string(),
                reason: "tree has no root".to_string(),
            });
        };

        self.cursor = Some(ConversationCursor {
            workflow_id: workflow_id.to_string(),
            tree,
            root,
            current: root,
            dialog_started: false,
        });
        info!(parent: &self.span, workflow = workflow_id, "engine configured");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn is_started(&self) -> bool {
        self.cursor.as_ref().is_some_and(|c| c.dialog_started)
    }

    pub fn routing(&self) -> RoutingPolicy {
        self.routing
    }

    pub fn workflow_id(&self) -> Option<&str> {
        self.cursor.as_ref().map(|c| c.workflow_id.as_str())
    }

    /// Node the conversation currently sits on.
    pub fn current(&self) -> Option<&DialogNode> {
        self.cursor.as_ref().map(|c| &c.tree[c.current])
    }

    /// Run one turn of the conversation.
    ///
    /// The menu reply of the turn is delivered on `reply_to` before this
    /// returns. When the reached node has an action, its result arrives later
    /// as a second delivery on the same stream. An engine that is not
    /// configured answers with an apology and leaves its state alone.
    pub async fn handle_message(
        &mut self,
        input: Message,
        reply_to: &ReplyTo,
    ) -> Result<()> {
        let Self {
            dispatcher,
            routing,
            cursor,
            span,
            ..
        } = self;
        let Some(cursor) = cursor.as_mut() else {
            warn!(parent: &*span, session = %input.session_id, "message received before configuration");
            let mut response = input;
            response.output = NOT_READY_REPLY.to_string();
            response.error = Some(GuideflowError::NotReady.to_string());
            return reply_to.reply().deliver(response);
        };

        if !cursor.dialog_started {
            cursor.dialog_started = true;
            debug!(parent: &*span, session = %input.session_id, workflow = %cursor.workflow_id, "dialog started");
        } else {
            match cursor.tree.search_one_level(cursor.current, &input.input) {
                Some(next) => cursor.current = next,
                None => {
                    cursor.current = match routing.route(cursor.root) {
                        Route::Reset(idx) => idx,
                        Route::Unsupported(policy) => {
                            warn!(parent: &*span, session = %input.session_id, routing = policy.as_ref(), "routing policy not supported, falling back to root");
                            cursor.root
                        }
                    };
                    debug!(parent: &*span, session = %input.session_id, selection = %input.input, "unmatched selection routed");
                }
            }
        }

        let tree = cursor.tree.clone();
        let node = &tree[cursor.current];
        debug!(parent: &*span, session = %input.session_id, node = node.id(), "cursor moved");

        let request = node.action().map(|action| ActionRequest::new(&cursor.workflow_id, node.id(), action.clone(), input.clone(), reply_to.reply()));

        let options = tree
            .children(cursor.current)
            .into_iter()
            .map(|idx| ReplyOption {
                id: tree[idx].id().to_string(),
                label: tree[idx].label().to_string(),
            })
            .collect();
        let mut response = input;
        response.output = node.content().to_string();
        response.options = options;
        response.response_type = ResponseType::OptionMenu;
        let delivered = reply_to.reply().deliver(response);

        if let Some(request) = request {
            dispatcher.submit(request).await?;
        }
        delivered
    }
}
