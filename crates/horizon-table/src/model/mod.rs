//! Reactive table models.
//!
//! This module provides a tabular data abstraction and composable views over
//! it. Every model publishes four change streams, and every view keeps its
//! own index space consistent with its source under any interleaving of
//! edits, insertions, removals, and moves.
//!
//! # Core Types
//!
//! - `TableModel`: The trait that every model implements
//! - `TableSignals`: The four change signals each model owns
//! - `CellValue`: The value of a single cell
//!
//! # Model Implementations
//!
//! - `ArrayTableModel`: Owns rows of cell values
//! - `TranslatedTableModel`: Presents a source through a row permutation
//! - `SortedTableModel`: Keeps a source sorted, one bisection per change
//! - `SelectionTableModel`: Tracks which rows of a source are selected
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────┐  events  ┌──────────────────────┐  events  ┌──────────────────┐
//! │ ArrayTableModel │────────> │ TranslatedTableModel │────────> │ SortedTableModel │
//! └─────────────────┘          └──────────────────────┘          └──────────────────┘
//!          ^                              ^                               │
//!          │  value(row, col)             │  value / move_row             │
//!          └──────────────────────────────┴───────────────────────────────┘
//! ```
//!
//! Views never mutate their source. They translate each source event into
//! their own row indices before re-emitting it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_table::model::{ArrayTableModel, CellValue, SortedTableModel, TableModel};
//!
//! let source = Arc::new(ArrayTableModel::new(["Name", "Score"]));
//! source.add_row([CellValue::from("Bob"), 7.into()]).unwrap();
//! source.add_row([CellValue::from("Alice"), 9.into()]).unwrap();
//!
//! let sorted = SortedTableModel::new(source.clone()).unwrap();
//! assert_eq!(sorted.value(0, 0).unwrap().as_str(), Some("Alice"));
//!
//! let _subscription = sorted.subscribe_row_moved(|event| {
//!     println!("row {} moved to {}", event.source, event.destination);
//! });
//! source.set_value(0, 0, "Aaron").unwrap();
//! assert_eq!(sorted.value(0, 0).unwrap().as_str(), Some("Aaron"));
//! ```

mod array_model;
mod column_order;
mod comparator;
mod debug;
pub mod selection;
mod sorted_model;
mod traits;
mod translated_model;
mod value;

pub use array_model::ArrayTableModel;
pub use column_order::{ColumnOrder, SortDirection, SortKey};
pub use comparator::{Comparator, DefaultComparator};
pub use debug::{TableDebug, TableFormatOptions, TableStyle};
pub use selection::{SelectionTableModel, SELECTED_COLUMN};
pub use sorted_model::{SortedTableModel, SortedTableModelBuilder};
pub use traits::{RemovingRow, RowAdded, RowMoved, TableModel, TableSignals, ValueChanged};
pub use translated_model::TranslatedTableModel;
pub use value::CellValue;
