//! # stampdesk-cli — Command-Line Front-End for the Stamp Scanner
//!
//! Provides the `stampdesk` binary. The terminal stands in for the phone
//! screen: the scan console accepts decoded payloads as typed lines and
//! renders whatever state the flow is in.
//!
//! ## Subcommands
//!
//! - `stampdesk login <identifier>` — Staff login; the token is saved.
//! - `stampdesk logout` — Clear the saved session.
//! - `stampdesk status` — Show whether a saved session exists.
//! - `stampdesk scan` — Interactive scan console.
//!
//! ```bash
//! STAMPDESK_PASSWORD=staff123 stampdesk --mock login staff@demo.test
//! stampdesk --mock scan
//! ```

pub mod auth;
pub mod console;
pub mod context;

/// Default location of the credential file.
pub const DEFAULT_STORE_PATH: &str = ".stampdesk/credentials.json";
