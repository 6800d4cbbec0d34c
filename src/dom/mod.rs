//! DOM snapshot module
//!
//! This module provides a frozen, read-only copy of a rendered page for the
//! tree extractor to walk. It includes:
//! - ElementNode: Owned DOM node tree, for building documents in code
//! - DomSnapshot: Arena-indexed snapshot with parent links, read from the flat
//!   pre-order JSON the page script produces (FlatNode)
//! - Document: The minimal capability the extractor depends on

pub mod document;
pub mod element;
pub mod snapshot;

pub use document::Document;
pub use element::{ElementNode, TEXT_NODE_TAG, is_pruned_tag};
pub use snapshot::{DomSnapshot, FlatNode, NodeHandle};

/// Script evaluated in a page to capture `document.body` as flat snapshot JSON
pub const SNAPSHOT_SCRIPT: &str = include_str!("snapshot_dom.js");
