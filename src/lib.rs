//! # glimpse-bridge
//!
//! Bridges a remote automation client to a live outline document rendered in a
//! browser page. The bridge holds a WebSocket connection to a request source,
//! receives "extract the subtree rooted at node X" commands, walks the rendered
//! DOM and replies with the subtree as JSON.
//!
//! ## Features
//!
//! - **Connection manager**: single persistent connection with fixed-cadence reconnects
//! - **Tree extraction**: pure walk over a DOM snapshot, honouring collapsed nodes
//! - **Page sources**: live Chrome tab over CDP, snapshot files, or in-memory snapshots
//!
//! ## Running the bridge
//!
//! ```bash
//! # Attach to a running Chrome started with --remote-debugging-port
//! cargo run --bin glimpse-bridge -- --browser-ws ws://127.0.0.1:9222/devtools/browser/<id>
//!
//! # Serve a saved snapshot instead of a browser
//! cargo run --bin glimpse-bridge -- --snapshot page.json
//! ```
//!
//! ## Wire protocol
//!
//! ```text
//! -> {"action": "extract_dom", "node_id": "<id>"}
//! <- {"success": true, "root": {..}, "children": [..], "node_count": 3, "depth": 1}
//! <- {"success": false, "error": "No Workflowy tab open"}
//! ```
//!
//! ## Library usage
//!
//! ```rust
//! use glimpse_bridge::{DomSnapshot, ElementNode, OutlineLayout, TreeExtractor};
//!
//! let layout = OutlineLayout::default();
//! let page = ElementNode::new("body").with_children([layout.element(
//!     "A",
//!     Some("Groceries"),
//!     None,
//!     Some(vec![layout.element("B", Some("Milk"), Some("2 litres"), None)]),
//! )]);
//!
//! let result = TreeExtractor::new(layout).extract(&DomSnapshot::new(page), "A");
//! assert!(result.is_success());
//! assert_eq!(result.node_count(), 2);
//! ```
//!
//! ## Module Overview
//!
//! - [`bridge`]: Connection manager, wire protocol and transports
//! - [`extract`]: Tree extractor, outline layout and extracted records
//! - [`dom`]: DOM snapshots and the `Document` capability
//! - [`browser`]: Page sources (Chrome over CDP, snapshot files)
//! - [`error`]: Error types and result aliases

pub mod bridge;
pub mod browser;
pub mod dom;
pub mod error;
pub mod extract;

pub use bridge::{BridgeOptions, ConnectionManager, ConnectionState, MessageHandler, WsConnector};
pub use browser::{ChromePage, LaunchOptions, PageSource, SnapshotFilePage, SnapshotPage, TargetPattern};
pub use dom::{Document, DomSnapshot, ElementNode, FlatNode};
pub use error::{BridgeError, Result};
pub use extract::{ExtractedTree, ExtractionResult, NodeRecord, OutlineLayout, RootRecord, TreeExtractor};
