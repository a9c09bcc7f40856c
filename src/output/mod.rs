//! Output sinks and persistence

pub mod console;
pub mod json;

pub use console::ConsoleSink;
pub use json::{default_snapshot_path, load_from_json, store_as_json};
