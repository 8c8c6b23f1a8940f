//! # Quill Core
//!
//! The domain layer of Quill.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! the entities, the post service, and the ports infrastructure must implement.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use error::{PostError, RepoError};
