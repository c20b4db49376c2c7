mod dialog;
mod node;

pub use dialog::DialogModel;
pub use node::NodeModel;
