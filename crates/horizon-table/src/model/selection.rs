//! Row selection state kept as a table.
//!
//! [`SelectionTableModel`] is a one-column boolean table with one row per row
//! of its source. It follows the source's insertions, removals, and moves, so
//! a selected row stays selected wherever it goes. Pointer and keyboard
//! handling belong to whatever drives it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_table::model::{ArrayTableModel, SelectionTableModel};
//!
//! let source = Arc::new(ArrayTableModel::new(["Name"]));
//! for name in ["a", "b", "c", "d"] {
//!     source.add_row([name]).unwrap();
//! }
//!
//! let selection = SelectionTableModel::new(source.clone());
//! selection.set_selected(0, true).unwrap();
//! selection.select_range(1, 3).unwrap();
//! assert_eq!(selection.selected_rows(), vec![0, 1, 2, 3]);
//!
//! // Shrinking the range only deselects rows it covered before.
//! selection.select_range(1, 2).unwrap();
//! assert_eq!(selection.selected_rows(), vec![0, 1, 2]);
//!
//! // Selection follows the row when the source reorders.
//! source.move_row(2, 3).unwrap();
//! assert_eq!(selection.selected_rows(), vec![0, 1, 3]);
//! ```

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use horizon_table_core::{table_warn, ModelError, ModelResult, Subscription};

use super::array_model::ArrayTableModel;
use super::traits::{RemovingRow, RowAdded, RowMoved, TableModel, TableSignals};
use super::value::CellValue;

/// Name of the single column of a [`SelectionTableModel`].
pub const SELECTED_COLUMN: &str = "Selected";

struct SelectionInner {
    flags: ArrayTableModel,
    /// Anchor and end row of the last range selection.
    extent: Mutex<Option<(usize, usize)>>,
}

impl SelectionInner {
    fn on_row_added(&self, event: &RowAdded) {
        *self.extent.lock() = None;
        if let Err(error) = self.flags.insert_row(event.index, [false]) {
            table_warn!(index = event.index, %error, "selection out of step with source");
        }
    }

    fn on_removing_row(&self, event: &RemovingRow) {
        *self.extent.lock() = None;
        if let Err(error) = self.flags.remove_row(event.index) {
            table_warn!(index = event.index, %error, "selection out of step with source");
        }
    }

    fn on_row_moved(&self, event: &RowMoved) {
        *self.extent.lock() = None;
        if let Err(error) = self.flags.move_row(event.source, event.destination) {
            table_warn!(
                source = event.source,
                destination = event.destination,
                %error,
                "selection out of step with source"
            );
        }
    }
}

/// A boolean table recording which rows of a source are selected.
///
/// Every changed flag emits `ValueChanged` with the previous flag; setting a
/// flag to its current state emits nothing. Structural changes of the source
/// are mirrored and re-emitted as this model's own `RowAdded`,
/// `RemovingRow`, and `RowMoved`.
pub struct SelectionTableModel<S: TableModel + ?Sized + 'static> {
    source: Arc<S>,
    inner: Arc<SelectionInner>,
    _subscriptions: [Subscription; 3],
}

impl<S: TableModel + ?Sized + 'static> SelectionTableModel<S> {
    /// Creates a selection over `source` with nothing selected.
    pub fn new(source: Arc<S>) -> Self {
        let flags =
            ArrayTableModel::filled([SELECTED_COLUMN], source.row_count(), CellValue::Bool(false));
        let inner = Arc::new(SelectionInner {
            flags,
            extent: Mutex::new(None),
        });
        let source_signals = source.signals();

        let weak = Arc::downgrade(&inner);
        let row_added = source_signals.row_added.subscribe(move |event| {
            if let Some(inner) = Weak::upgrade(&weak) {
                inner.on_row_added(event);
            }
        });
        let weak = Arc::downgrade(&inner);
        let removing_row = source_signals.removing_row.subscribe(move |event| {
            if let Some(inner) = Weak::upgrade(&weak) {
                inner.on_removing_row(event);
            }
        });
        let weak = Arc::downgrade(&inner);
        let row_moved = source_signals.row_moved.subscribe(move |event| {
            if let Some(inner) = Weak::upgrade(&weak) {
                inner.on_row_moved(event);
            }
        });

        Self {
            source,
            inner,
            _subscriptions: [row_added, removing_row, row_moved],
        }
    }

    /// Returns the source model.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Returns `true` if `row` is selected.
    pub fn is_selected(&self, row: usize) -> ModelResult<bool> {
        Ok(self.inner.flags.value(row, 0)?.as_bool().unwrap_or(false))
    }

    /// Sets whether `row` is selected.
    pub fn set_selected(&self, row: usize, selected: bool) -> ModelResult<()> {
        self.inner.flags.set_value(row, 0, selected)
    }

    /// Flips the selection of `row` and returns the new state.
    pub fn toggle(&self, row: usize) -> ModelResult<bool> {
        let selected = !self.is_selected(row)?;
        self.set_selected(row, selected)?;
        Ok(selected)
    }

    /// Deselects every row.
    pub fn clear_selection(&self) -> ModelResult<()> {
        *self.inner.extent.lock() = None;
        for row in self.selected_rows() {
            self.set_selected(row, false)?;
        }
        Ok(())
    }

    /// Selects every row.
    pub fn select_all(&self) -> ModelResult<()> {
        for row in 0..self.row_count() {
            self.set_selected(row, true)?;
        }
        Ok(())
    }

    /// Selects every row between `anchor` and `row`, inclusive, in either
    /// order.
    ///
    /// When the previous range selection started at the same `anchor`, the
    /// rows it covered outside the new range are deselected, so repeated
    /// calls move the end of one range. Rows selected by other means stay
    /// selected. Structural changes of the source forget the previous range.
    pub fn select_range(&self, anchor: usize, row: usize) -> ModelResult<()> {
        let row_count = self.row_count();
        ModelError::check_row(anchor, row_count)?;
        ModelError::check_row(row, row_count)?;
        let previous = self
            .inner
            .extent
            .lock()
            .filter(|&(previous_anchor, _)| previous_anchor == anchor);

        let range = anchor.min(row)..=anchor.max(row);
        for index in range.clone() {
            self.set_selected(index, true)?;
        }
        if let Some((_, end)) = previous {
            for index in anchor.min(end)..=anchor.max(end).min(row_count - 1) {
                if !range.contains(&index) {
                    self.set_selected(index, false)?;
                }
            }
        }
        *self.inner.extent.lock() = Some((anchor, row));
        Ok(())
    }

    /// Indices of the selected rows, ascending.
    pub fn selected_rows(&self) -> Vec<usize> {
        self.inner
            .flags
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| row.first().and_then(CellValue::as_bool) == Some(true))
            .map(|(index, _)| index)
            .collect()
    }

    /// Number of selected rows.
    pub fn selected_count(&self) -> usize {
        self.selected_rows().len()
    }
}

impl<S: TableModel + ?Sized + 'static> TableModel for SelectionTableModel<S> {
    fn row_count(&self) -> usize {
        self.inner.flags.row_count()
    }

    fn column_count(&self) -> usize {
        self.inner.flags.column_count()
    }

    fn column_name(&self, column: usize) -> ModelResult<&str> {
        self.inner.flags.column_name(column)
    }

    fn value(&self, row: usize, column: usize) -> ModelResult<CellValue> {
        self.inner.flags.value(row, column)
    }

    fn signals(&self) -> &TableSignals {
        self.inner.flags.signals()
    }
}
