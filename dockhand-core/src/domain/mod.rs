//! Core domain types
//!
//! The image being shipped and the lifecycle of a single deploy run.
//! Both are built at process start and dropped at exit; nothing is persisted.

pub mod deploy;
pub mod image;
