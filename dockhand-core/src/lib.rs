//! Dockhand Core
//!
//! Core types shared by the Dockhand deployment tool.
//!
//! This crate contains:
//! - Domain types: image references, deploy stages and run reports
//! - Packaging: the container recipe for the deployed server

pub mod domain;
pub mod packaging;
