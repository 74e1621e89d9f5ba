//! Business logic services.
//!
//! # Services
//!
//! - `customer` - Customer creation, lookup, replacement and merge

pub mod customer;

pub use customer::{CustomerError, CustomerService};
