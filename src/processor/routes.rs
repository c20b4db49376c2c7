use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::{GuideflowError, Result, RouteConfig};

/// Kind of engine driving a workflow's conversations.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EngineKind {
    /// Tree navigation through option menus.
    #[default]
    Guided,
}

/// Workflow served on a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflow {
    pub id: String,
    pub engine: EngineKind,
}

/// Resolves the workflow of an inbound channel.
pub trait WorkflowGetter: Send + Sync {
    fn get_flow(
        &self,
        channel_name: &str,
    ) -> Option<Workflow>;
}

/// Glob routes from channel names to workflows, first matching route wins.
#[derive(Debug, Clone)]
pub struct ChannelRoutes {
    globs: GlobSet,
    workflows: Vec<String>,
}

impl ChannelRoutes {
    pub fn new(routes: &[RouteConfig]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut workflows = Vec::with_capacity(routes.len());
        for route in routes {
            let glob = Glob::new(&route.channel).map_err(|e| GuideflowError::Config(format!("invalid channel pattern '{}': {}", route.channel, e)))?;
            builder.add(glob);
            workflows.push(route.workflow.clone());
        }
        let globs = builder.build().map_err(|e| GuideflowError::Config(e.to_string()))?;

        Ok(Self {
            globs,
            workflows,
        })
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}

impl WorkflowGetter for ChannelRoutes {
    fn get_flow(
        &self,
        channel_name: &str,
    ) -> Option<Workflow> {
        let first = self.globs.matches(channel_name).into_iter().min()?;
        self.workflows.get(first).map(|id| Workflow {
            id: id.clone(),
            engine: EngineKind::Guided,
        })
    }
}

#[cfg(test)]
mod test {
    use super::{ChannelRoutes, EngineKind, WorkflowGetter};
    use crate::{GuideflowError, RouteConfig};

    fn route(
        channel: &str,
        workflow: &str,
    ) -> RouteConfig {
        RouteConfig {
            channel: channel.into(),
            workflow: workflow.into(),
        }
    }

    #[test]
    fn test_channel_routes_first_match_wins() {
        let routes = ChannelRoutes::new(&[route("support-*", "support"), route("*", "default")]).unwrap();
        assert_eq!(routes.len(), 2);

        let flow = routes.get_flow("support-eu").unwrap();
        assert_eq!(flow.id, "support");
        assert_eq!(flow.engine, EngineKind::Guided);
        assert_eq!(routes.get_flow("billing").unwrap().id, "default");
    }

    #[test]
    fn test_channel_routes_no_match() {
        let routes = ChannelRoutes::new(&[route("telegram-*", "billing")]).unwrap();
        assert!(routes.get_flow("cli").is_none());
        assert!(ChannelRoutes::new(&[]).unwrap().get_flow("anything").is_none());
    }

    #[test]
    fn test_channel_routes_invalid_pattern() {
        assert!(matches!(ChannelRoutes::new(&[route("support-[", "support")]), Err(GuideflowError::Config(_))));
    }
}
