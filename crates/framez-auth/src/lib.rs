//! # framez-auth
//!
//! Client-side session lifecycle for Framez.
//!
//! - [`store::SessionStore`]: the current [`AuthState`], readable by anyone
//! - [`controller::AuthController`]: the single writer, driven by backend
//!   auth events; exposes sign-up, sign-in, and sign-out
//! - [`gate`]: route regions that render, redirect, or wait on the store

pub mod controller;
pub mod error;
pub mod gate;
pub mod store;
pub mod validation;

pub use controller::{AuthController, SignUpOutcome};
pub use error::AuthError;
pub use framez_core::auth_state::AuthState;
pub use gate::{GateDecision, Region, RegionWatch, Route};
pub use store::SessionStore;
pub use validation::SignUpForm;
