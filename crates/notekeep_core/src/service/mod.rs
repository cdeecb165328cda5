//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate codec and store calls into use-case level APIs.
//! - Keep UI layers decoupled from serialization and storage details.

pub mod transfer;
