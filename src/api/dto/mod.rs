//! Data Transfer Objects for API responses.
//!
//! Entities are serialized directly; only the error envelope has its own DTO.

mod error;

pub use error::ErrorResponse;
