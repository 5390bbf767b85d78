//! CLI command implementations

mod classify;
mod console;
mod info;
mod rename;
mod to_text;

pub use classify::{language, publisher};
pub use info::info;
pub use rename::rename;
pub use to_text::to_text;
