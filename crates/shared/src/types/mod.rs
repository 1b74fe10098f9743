//! Common types used across the application.

pub mod secret;

pub use secret::Secret;
