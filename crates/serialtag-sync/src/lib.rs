//! Serial number hashtag synchronizer.
//!
//! This crate implements the `serialtagsync` tool, which makes sure the
//! management interface of every element carries `#serial:<serial_number>`
//! in its description, or strips those tags with `--remove`.
//!
//! # Flow
//!
//! | Step | Module |
//! |------|--------|
//! | Parse flags, read settings file and environment | [`config`] |
//! | Log in with token or email/password | [`auth`], [`http_client`] |
//! | List elements, pick the management interface | [`sync`], [`selector`] |
//! | Compute the new description and write it back | [`sync`] |
//!
//! # Example
//!
//! ```ignore
//! use serialtag_sync::{SerialTagSync, SyncMode};
//!
//! let mut sync = SerialTagSync::new(controller, SyncMode::Ensure);
//! let report = sync.run().await?;
//! ```

pub mod auth;
pub mod config;
pub mod endpoints;
pub mod http_client;
pub mod selector;
pub mod sync;

pub use auth::{authenticate, Prompt, Session, TerminalPrompt};
pub use config::{Args, Credentials, RunConfig, Settings};
pub use http_client::{HttpController, HttpControllerConfig};
pub use selector::select_management_interface;
pub use sync::{ElementOutcome, SerialTagSync, SyncMode, SyncReport};
