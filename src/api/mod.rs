//! HTTP and push API
//!
//! Guest phones, the KJ console, and the big screen all talk to the same
//! surface: REST endpoints for actions, an SSE stream for state.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{build_router, AppContext};
