//! # stampdesk-client -- Typed client for the loyalty stamp service
//!
//! Provides the three remote operations the scanner depends on:
//! - **Login** via `auth/login`
//! - **Member lookup** via `passkit/get-member-by-barcode`
//! - **Point adjustment** via `passkit/add-points` / `passkit/burn-points`
//!
//! Plus the **session manager** that owns the bearer token and persists it
//! through a [`CredentialStore`].
//!
//! ## Architecture
//!
//! Every remote call goes through the [`StampGateway`] trait. [`HttpGateway`]
//! talks to the live service; [`MockStampGateway`] is an in-memory stand-in
//! for demos and tests. Both read the bearer token from a shared
//! [`SessionManager`] on every call and never write it except on login.
//!
//! No error crosses this boundary as a raw transport or decode failure: all
//! of them are normalized into [`GatewayError`], whose `Display` is the
//! message shown to staff.

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod mock;
pub mod session;
pub mod store;

pub use config::{ConfigError, GatewayConfig};
pub use error::GatewayError;
pub use gateway::{LoginResponse, PointsUpdate, StampGateway};
pub use http::HttpGateway;
pub use mock::MockStampGateway;
pub use session::{BearerToken, SessionManager, TOKEN_KEY};
pub use store::{
    CredentialStore, FallbackCredentialStore, FileCredentialStore, MemoryCredentialStore,
    StoreError,
};
