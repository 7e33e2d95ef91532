// src/sheets/database/schema/mod.rs

mod migrations;
mod table_creation;

pub use migrations::{applied_versions, CURRENT_SCHEMA_VERSION};
pub use table_creation::*;
