//! Pure domain logic for the procura supplier-sharing backend.
//!
//! This crate has no internal dependencies so it can be used by the
//! repository layer, the API layer, and any future worker or CLI tooling.

pub mod allocation;
pub mod audit;
pub mod error;
pub mod share_code;
pub mod supply;
pub mod types;
