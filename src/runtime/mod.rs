mod context;

pub use context::ActionContext;
