mod analysis;
mod analytics;
mod common;
mod conversation;
mod event;

pub use analysis::*;
pub use analytics::*;
pub use common::*;
pub use conversation::*;
pub use event::*;
