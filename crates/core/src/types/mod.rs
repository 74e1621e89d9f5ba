//! Core types for the customer master.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;

pub use id::CustomerId;
