mod action;
pub mod models;
pub mod summarize;

pub use action::HttpRequestAction;
pub use models::{HttpRequestMethod, Separator, SummarizeField};
