//! # Guideflow
//!
//! Guideflow is a guided-dialog engine: scripted conversations are trees of
//! option menus, and users walk them one selection at a time.
//!
//! ## Core Features
//!
//! - **Menu Navigation**: every turn answers with the current node's content and its children as options
//! - **Out-of-band Actions**: nodes may carry actions (HTTP calls, static replies, custom ones) executed by a worker pool
//! - **Exactly-once Replies**: each action request gets one reply, including a shutdown notice when it never ran
//! - **Pluggable Storage**: dialog trees come from memory or from JSON/TOML definition files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use guideflow::{BotBuilder, Config, DialogModel, Message};
//!
//! let config = Config::load_from_str(r#"
//!     [[routes]]
//!     channel = "*"
//!     workflow = "billing"
//! "#)?;
//! let bot = BotBuilder::new().config(config).build()?;
//! bot.launch();
//! bot.deploy(DialogModel::from_json(json_str)?)?;
//!
//! let (inbound, mut replies) = bot.connect();
//! inbound.send(Message::new("session-1", "").with_channel("web"))?;
//! let menu = replies.recv().await;
//!
//! bot.shutdown().await;
//! ```

mod bot;
mod builder;
mod common;
mod config;
mod dialog;
mod dispatcher;
mod engine;
mod error;
mod message;
mod model;
mod processor;
mod reply;
mod runtime;
mod store;
mod utils;

use std::sync::{Arc, RwLock};

pub use bot::Bot;
pub use builder::BotBuilder;
pub use common::Shutdown;
pub use config::{Config, DispatcherConfig, EngineConfig, FileStoreConfig, RouteConfig, StoreConfig, StoreType};
pub use dialog::{DialogNode, DialogTree, NodeId, actions};
pub use dispatcher::{ActionDispatcher, ActionRequest, SHUTDOWN_REPLY};
pub use engine::{DialogEngine, NOT_READY_REPLY, Route, RoutingPolicy};
pub use error::GuideflowError;
pub use message::{Connector, Message, ReplyOption, ResponseType, SessionId};
pub use model::*;
pub use processor::{ChannelRoutes, EngineKind, Processor, WORKFLOW_NOT_FOUND_REPLY, Workflow, WorkflowGetter};
pub use reply::{Reply, ReplyTo};
pub use runtime::ActionContext;
pub use store::{FileStore, MemStore, TreeRepository};

/// Result type alias for Guideflow operations.
pub type Result<T> = std::result::Result<T, GuideflowError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;
