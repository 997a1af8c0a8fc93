// Application layer: the account registry every driver (script runner, CLI,
// tests) goes through.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
