//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into event use-cases.
//! - Keep the CLI decoupled from storage details.

pub mod event_service;
