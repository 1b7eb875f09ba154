//! # API Module
//!
//! HTTP endpoints of the local server that receives the OAuth redirect.
//!
//! ## Endpoints
//!
//! - `GET <redirect path>` - [`callback`]: validates `state`, exchanges the
//!   authorization code for a token and hands it to the waiting `auth` command
//! - `GET /health` - [`health`]: returns service name and version as JSON
//!
//! The server only lives for the duration of `spotiply auth`.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
