//! Shared utilities and common types for the rideshare backend.
//!
//! This crate provides small helpers used across the other crates:
//! - Common validation logic
//! - Creator id generation

pub mod creator_id;
pub mod validation;
