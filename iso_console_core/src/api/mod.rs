pub mod client;
pub mod errors;
pub mod http;
pub mod types;

// Re-export the modules here for easy import elsewhere.
pub use client::*;
pub use errors::*;
pub use http::*;
pub use types::*;
