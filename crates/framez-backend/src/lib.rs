//! # framez-backend
//!
//! Client for the remote service behind Framez: auth (GoTrue), tables
//! (PostgREST), and object storage, plus durable session persistence.
//!
//! Callers depend on the [`Backend`] trait. [`SupabaseClient`] talks HTTP;
//! with the `memory` feature, [`memory::MemoryBackend`] runs in-process for
//! tests.

pub mod api;
pub mod error;
pub mod events;
mod http;
#[cfg(feature = "memory")]
pub mod memory;
pub mod persist;
pub mod supabase;

pub use api::{AuthApi, Backend, Query, SignUpResponse, StorageApi, TableApi, UploadOptions};
pub use error::BackendError;
pub use events::{AuthEventReceiver, EventHub};
pub use persist::SessionVault;
pub use supabase::SupabaseClient;
