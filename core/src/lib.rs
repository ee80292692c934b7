//! Request builder for the contact-graph REST API.
//!
//! # Overview
//! Builds authenticated `PreparedRequest` values for the service's fixed
//! endpoints without touching the network. The caller sends them with
//! whatever HTTP client it already uses.
//!
//! # Design
//! - `GraphClient` holds an explicit `ClientConfig` (secret key, base URL);
//!   there is no global state.
//! - `ApiCall` is the one table mapping each operation to its method, path
//!   and payload; the `build_*` helpers are thin wrappers over it.
//! - Types use owned `String` / `Vec` fields so the FFI crate can hand
//!   requests to C without lifetimes.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod types;

pub use client::GraphClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use endpoints::ApiCall;
pub use error::ApiError;
pub use http::{HttpMethod, PreparedRequest};
pub use types::{
    AddressBookEntry, AddressBookSource, AddressBookUpload, InviteAccepted, InviteSent,
    InviteeType, User, UserId,
};
