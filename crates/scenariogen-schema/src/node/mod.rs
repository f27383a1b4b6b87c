//! Schema nodes: raw declarations, resolved type trees, and event records.

mod definition;
mod event;
mod resolved;

pub use definition::*;
pub use event::*;
pub use resolved::*;
