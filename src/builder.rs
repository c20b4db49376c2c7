use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};
use tracing::Span;

use crate::{
    Bot, ChannelRoutes, Config, GuideflowError, Result, StoreType, WorkflowGetter,
    store::{FileStore, MemStore, TreeRepository},
};

pub struct BotBuilder {
    config: Config,
    store: Option<Arc<dyn TreeRepository>>,
    routes: Option<Arc<dyn WorkflowGetter>>,
    rt: Option<Arc<Runtime>>,
    span: Span,
}

impl Default for BotBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            store: None,
            routes: None,
            rt: None,
            span: Span::none(),
        }
    }
}

impl BotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    /// Use `store` instead of the one described by `[store]`.
    pub fn store(
        mut self,
        store: Arc<dyn TreeRepository>,
    ) -> Self {
        self.store = Some(store);
        self
    }

    /// Use `routes` instead of the `[[routes]]` of the config.
    pub fn routes(
        mut self,
        routes: Arc<dyn WorkflowGetter>,
    ) -> Self {
        self.routes = Some(routes);
        self
    }

    pub fn runtime(
        mut self,
        runtime: Arc<Runtime>,
    ) -> Self {
        self.rt = Some(runtime);
        self
    }

    /// Parent span of every event the bot and its components emit.
    pub fn span(
        mut self,
        span: Span,
    ) -> Self {
        self.span = span;
        self
    }

    pub fn build(&self) -> Result<Bot> {
        let store = match &self.store {
            Some(store) => store.clone(),
            None => self.build_store()?,
        };
        let routes: Arc<dyn WorkflowGetter> = match &self.routes {
            Some(routes) => routes.clone(),
            None => Arc::new(ChannelRoutes::new(&self.config.routes)?),
        };

        // an injected runtime first, then the ambient one, else our own
        let (runtime, handle) = match &self.rt {
            Some(rt) => (Some(rt.clone()), rt.handle().clone()),
            None => match Handle::try_current() {
                Ok(handle) => (None, handle),
                Err(_) => {
                    let rt = Arc::new(Builder::new_multi_thread().worker_threads(self.config.async_worker_thread_number.into()).enable_all().build()?);
                    let handle = rt.handle().clone();
                    (Some(rt), handle)
                }
            },
        };

        Ok(Bot::new(&self.config, store, routes, runtime, handle, self.span.clone()))
    }

    fn build_store(&self) -> Result<Arc<dyn TreeRepository>> {
        let store: Arc<dyn TreeRepository> = match self.config.store.store_type {
            StoreType::Mem => Arc::new(MemStore::new()),
            StoreType::File => {
                let file = self.config.store.file.as_ref().ok_or_else(|| GuideflowError::Config("file store configuration is required when store type is file".to_string()))?;
                Arc::new(FileStore::new(&file.dir, self.config.store.tree_cache_capacity))
            }
        };
        Ok(store)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::BotBuilder;
    use crate::{Config, GuideflowError, MemStore, RouteConfig, StoreType};

    #[test]
    fn test_builder_requires_file_store_config() {
        let mut config = Config::default();
        config.store.store_type = StoreType::File;

        let err = BotBuilder::new().config(config).build().err().unwrap();
        assert!(matches!(err, GuideflowError::Config(_)));
    }

    #[test]
    fn test_builder_rejects_invalid_route() {
        let mut config = Config::default();
        config.routes.push(RouteConfig {
            channel: "[".into(),
            workflow: "billing".into(),
        });

        assert!(matches!(BotBuilder::new().config(config).build(), Err(GuideflowError::Config(_))));
    }

    #[test]
    fn test_builder_with_injected_runtime() {
        let runtime = Arc::new(tokio::runtime::Builder::new_multi_thread().worker_threads(1).enable_all().build().unwrap());
        let bot = BotBuilder::new().store(Arc::new(MemStore::new())).runtime(runtime.clone()).build().unwrap();

        bot.launch();
        assert_eq!(runtime.block_on(bot.shutdown()), 0);
    }
}
