//! HTTP API for the companion web front end

mod handlers;
mod server;

pub use server::{router, run, AppContext};
