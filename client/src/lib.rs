//! Client for the profile-auth API.
//!
//! Mirrors the single-page app: the same form checks, the same
//! request-then-upload flow, and a session file in place of browser storage.

pub mod api;
pub mod error;
pub mod forms;
pub mod session;

pub use api::ApiClient;
pub use error::{ClientError, Result};
pub use session::{Session, SessionStore};
