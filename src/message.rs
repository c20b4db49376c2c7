//! Conversational message context.
//!
//! A `Message` travels from a connector through the processor and engine and
//! back out as a reply. Actions receive the same message and annotate it in
//! place with `output` or `error`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::utils;

/// Conversation identifier, one dialog cursor is kept per session.
pub type SessionId = String;

/// Transport a message arrived on.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Connector {
    #[default]
    Unknown,
    Telegram,
    Cli,
}

/// How a reply should be rendered by the connector.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponseType {
    #[default]
    Text,
    OptionMenu,
}

/// A selectable next step offered to the caller.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyOption {
    pub id: String,
    pub label: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Message {
    /// message id
    pub id: String,
    pub connector: Connector,
    /// id of the message on the connector side
    pub connector_id: String,
    pub channel_id: String,
    /// channel name used to pick the workflow
    pub channel_name: String,
    /// conversation this message belongs to
    pub session_id: SessionId,
    /// caller input, the selected option id for guided dialogs
    pub input: String,
    pub output: String,
    pub error: Option<String>,
    pub options: Vec<ReplyOption>,
    pub response_type: ResponseType,
    /// unix millis
    pub start_time: i64,
    /// unix millis, stamped on delivery
    pub end_time: i64,
    pub meta: HashMap<String, String>,
}

impl Message {
    pub fn new(
        session_id: impl Into<SessionId>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            input: input.into(),
            start_time: utils::time::time_millis(),
            ..Default::default()
        }
    }

    pub fn with_channel(
        mut self,
        channel_name: impl Into<String>,
    ) -> Self {
        self.channel_name = channel_name.into();
        self
    }

    pub fn with_connector(
        mut self,
        connector: Connector,
        connector_id: impl Into<String>,
    ) -> Self {
        self.connector = connector;
        self.connector_id = connector_id.into();
        self
    }

    pub fn with_meta(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.meta.insert(name.into(), value.into());
        self
    }

    /// Meta value by name, empty when absent.
    pub fn meta(
        &self,
        name: &str,
    ) -> &str {
        self.meta.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn option_ids(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.id.as_str()).collect()
    }
}
