//! Horizon Table - reactive table models with incrementally maintained views.
//!
//! This is the main crate; it re-exports the core systems from
//! `horizon-table-core` alongside the [`model`] module.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_table::model::{ArrayTableModel, CellValue, TableModel, TranslatedTableModel};
//!
//! let source = Arc::new(ArrayTableModel::new(["Task", "Done"]));
//! source.add_row([CellValue::from("write docs"), false.into()]).unwrap();
//! source.add_row([CellValue::from("ship"), false.into()]).unwrap();
//!
//! let view = TranslatedTableModel::new(source);
//! view.move_row(1, 0).unwrap();
//! assert_eq!(view.value(0, 0).unwrap().as_str(), Some("ship"));
//! ```

pub use horizon_table_core::*;

pub mod model;
