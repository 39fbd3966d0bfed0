//! Shared building blocks for serial-number hashtag synchronization.
//!
//! - [`records`]: element and interface records as returned by the controller
//! - [`tags`]: hashtag parsing, merging and serial-tag removal
//! - [`controller`]: the [`ControllerApi`] contract the sync driver runs on
//! - [`error`]: error types for API calls and whole runs
//!
//! # Example
//!
//! ```
//! use serialtag_common::{tags, Interface};
//!
//! let iface = Interface {
//!     id: "i1".to_string(),
//!     name: Some("controller 1".to_string()),
//!     description: Some("#uplink".to_string()),
//!     ..Default::default()
//! };
//!
//! let tagged = tags::put_tags(&["serial:SN1"], iface);
//! assert!(tags::extract_tags(&tagged).contains("serial:SN1"));
//! ```

pub mod controller;
pub mod error;
pub mod records;
pub mod tags;

// Re-export commonly used items at crate root
pub use controller::ControllerApi;
pub use error::{ApiError, ApiResult, SyncError, SyncResult};
pub use records::{defaults, Described, Element, Interface, Items};
pub use tags::{extract_tags, put_tags, remove_tags};
