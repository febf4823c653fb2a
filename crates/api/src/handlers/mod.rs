//! Request handlers.
//!
//! Each submodule provides async handler functions for one surface.
//! Handlers delegate to the repositories in `procura_db` and map errors via
//! [`AppError`](crate::error::AppError); every response uses the standard
//! envelope.

pub mod portal;
pub mod share_link;
pub mod supply_record;
