use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Strategy applied when an input matches no option visible from the cursor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoutingPolicy {
    /// Start over from the root of the tree.
    #[default]
    Fallback,
    /// Stay on the current node.
    KeepContext,
    /// Pass the conversation to a human agent.
    HumanHandOff,
}

/// Outcome of applying a [`RoutingPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Move the cursor to the given node.
    Reset(NodeIndex),
    /// The policy has no behavior yet, the caller decides what to do.
    Unsupported(RoutingPolicy),
}

impl RoutingPolicy {
    /// Route an unmatched input, `root` is the root of the conversation's tree.
    pub fn route(
        self,
        root: NodeIndex,
    ) -> Route {
        match self {
            RoutingPolicy::Fallback => Self::fallback(root),
            RoutingPolicy::KeepContext => Self::keep_context(),
            RoutingPolicy::HumanHandOff => Self::human_hand_off(),
        }
    }

    fn fallback(root: NodeIndex) -> Route {
        Route::Reset(root)
    }

    // TODO: define how the cursor should behave once a context is kept
    fn keep_context() -> Route {
        Route::Unsupported(RoutingPolicy::KeepContext)
    }

    // TODO: needs a hand-off target to route the conversation to
    fn human_hand_off() -> Route {
        Route::Unsupported(RoutingPolicy::HumanHandOff)
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use petgraph::graph::NodeIndex;

    use super::{Route, RoutingPolicy};

    #[test]
    fn test_routing_policy_route() {
        let root = NodeIndex::new(0);
        assert_eq!(RoutingPolicy::Fallback.route(root), Route::Reset(root));
        assert_eq!(RoutingPolicy::KeepContext.route(root), Route::Unsupported(RoutingPolicy::KeepContext));
        assert_eq!(RoutingPolicy::HumanHandOff.route(root), Route::Unsupported(RoutingPolicy::HumanHandOff));
    }

    #[test]
    fn test_routing_policy_names() {
        assert_eq!(RoutingPolicy::HumanHandOff.as_ref(), "human_hand_off");
        assert_eq!(RoutingPolicy::from_str("keep_context").unwrap(), RoutingPolicy::KeepContext);
        assert_eq!(RoutingPolicy::default(), RoutingPolicy::Fallback);
    }
}
