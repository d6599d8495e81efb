//! Use-case services over the repositories.
//!
//! # Responsibility
//! - Turn repository calls into use-case level APIs.
//! - Keep store/FFI/CLI callers free of storage details.

pub mod library_service;
pub mod list_service;
pub mod settings_service;
