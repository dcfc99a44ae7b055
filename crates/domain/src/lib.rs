//! Domain layer for the rideshare backend.
//!
//! This crate contains:
//! - Domain models (Ride, JoinRequest, Passenger)
//! - The ride lifecycle service and its storage abstraction
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::RideError;
