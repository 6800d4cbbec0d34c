//! Page access module
//!
//! Everything that yields "the current document" for an extraction request:
//! a live Chrome tab over CDP, a snapshot file, or a fixed in-memory snapshot.

pub mod chrome;
pub mod config;
pub mod page;
pub mod target;

pub use chrome::ChromePage;
pub use config::LaunchOptions;
pub use page::{PageSource, SnapshotFilePage, SnapshotPage};
pub use target::TargetPattern;
