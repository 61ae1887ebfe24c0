//! The `utils` module provides common definitions used across the `stompd`
//! application.
//!
//! It centralizes the error taxonomy so every layer (codec, handlers,
//! transport) propagates the same error type.

pub mod error;

pub use error::{Result, StompError};
