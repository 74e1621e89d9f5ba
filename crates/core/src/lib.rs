//! Customer Master Core - record types and write-path rules.
//!
//! This crate holds everything about a customer record that does not need
//! I/O: the persisted, inbound and outbound shapes, the normalization applied
//! before anything is stored, the validation pass that runs before
//! normalization, and the mapper that combines the two.
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no database
//! access, no HTTP. The server crate wires these into a store and a router.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs
//! - [`normalize`] - Canonical storage form for strings, money and flags
//! - [`validation`] - Field constraints producing ordered violations
//! - [`customer`] - Record, request and response shapes
//! - [`mapper`] - Create / replace / merge policies and projections

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod customer;
pub mod mapper;
pub mod normalize;
pub mod types;
pub mod validation;

pub use customer::{CustomerRecord, CustomerRequest, CustomerResponse};
pub use types::*;
pub use validation::{RequestMode, Violation};
