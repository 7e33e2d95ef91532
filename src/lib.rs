//! Differential row updates for ordered spreadsheet rows.
//!
//! A batch of deletions, positional insertions, updates and appends is applied
//! to one sheet in a fixed order, after which the sheet's positions are
//! renumbered to `1..N`. Rows are identified by their stable id; positions are
//! only display ranks and move freely.

pub mod cli;
pub mod settings;
pub mod sheets;
