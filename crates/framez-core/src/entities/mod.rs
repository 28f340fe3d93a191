//! Entity structs for the Framez domain objects.
//!
//! `Profile` and `Post` map to the backend's `profiles` and `posts` tables.
//! `Session` is the credential bound to an identity. The `New*` structs are
//! the insert payloads the client sends.

mod post;
mod profile;
mod session;

pub use post::{NewPost, Post};
pub use profile::{NewProfile, Profile};
pub use session::Session;
