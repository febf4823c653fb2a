//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the operations that write to the table

pub mod audit;
pub mod purchase_order;
pub mod share_link;
pub mod supply_record;
