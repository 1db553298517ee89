//! Role-facing use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and editor calls into the flows each role
//!   performs: login/signup, pet registration, appointment requests,
//!   medical records, demo seeding.
//! - Keep callers decoupled from storage and editor internals.

pub mod auth;
pub mod clinic;
pub mod seed;
