//! # Quill Shared
//!
//! Wire types shared between the API server and the frontend.
//! In a full-stack Rust setup, this crate is compiled for both server and WASM.

pub mod authoring;
pub mod dto;
pub mod response;

pub use response::{ErrorResponse, FieldError, MessageResponse};
