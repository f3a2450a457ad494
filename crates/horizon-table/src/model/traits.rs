//! Core traits and change events for table models.

use horizon_table_core::{ModelResult, Signal, Subscription};

use super::value::CellValue;

/// A cell value was replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChanged {
    /// Row of the changed cell, in the emitting model's index space.
    pub row: usize,
    /// Column of the changed cell.
    pub column: usize,
    /// The value the cell held before the change.
    pub previous: CellValue,
}

/// A row was inserted and is now readable at `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowAdded {
    /// Position of the new row.
    pub index: usize,
}

/// The row at `index` is about to be destroyed.
///
/// Emitted while the row is still readable, so listeners can inspect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovingRow {
    /// Position of the doomed row.
    pub index: usize,
}

/// The row at `source` was relocated.
///
/// `destination` is the final position of the moved row. Rows strictly
/// between the two positions shifted by one toward the vacated slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowMoved {
    /// Position of the row before the move.
    pub source: usize,
    /// Position of the row after the move.
    pub destination: usize,
}

impl RowMoved {
    /// Returns where a row that was at `index` before this move sits after it.
    ///
    /// ```
    /// use horizon_table::model::RowMoved;
    ///
    /// let moved = RowMoved { source: 0, destination: 2 };
    /// assert_eq!(moved.apply(0), 2);
    /// assert_eq!(moved.apply(1), 0);
    /// assert_eq!(moved.apply(2), 1);
    /// assert_eq!(moved.apply(3), 3);
    /// ```
    pub fn apply(&self, index: usize) -> usize {
        let (s, d) = (self.source, self.destination);
        if index == s {
            d
        } else if s < d && index > s && index <= d {
            index - 1
        } else if d < s && index >= d && index < s {
            index + 1
        } else {
            index
        }
    }
}

/// Signals emitted by table models to notify listeners of changes.
///
/// Every model owns one set. Events are delivered synchronously, in the
/// order the model performs the underlying changes.
pub struct TableSignals {
    /// Emitted after a cell value changes.
    pub value_changed: Signal<ValueChanged>,

    /// Emitted after a row has been inserted.
    pub row_added: Signal<RowAdded>,

    /// Emitted just before a row is removed.
    pub removing_row: Signal<RemovingRow>,

    /// Emitted after a row has been relocated.
    pub row_moved: Signal<RowMoved>,
}

impl Default for TableSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl TableSignals {
    /// Creates a new set of table signals.
    pub fn new() -> Self {
        Self {
            value_changed: Signal::new(),
            row_added: Signal::new(),
            removing_row: Signal::new(),
            row_moved: Signal::new(),
        }
    }

    /// Emits `value_changed` for a single cell.
    pub fn emit_value_changed(&self, row: usize, column: usize, previous: CellValue) {
        self.value_changed.emit(ValueChanged {
            row,
            column,
            previous,
        });
    }

    /// Emits `row_added`.
    pub fn emit_row_added(&self, index: usize) {
        self.row_added.emit(RowAdded { index });
    }

    /// Emits `removing_row`.
    pub fn emit_removing_row(&self, index: usize) {
        self.removing_row.emit(RemovingRow { index });
    }

    /// Emits `row_moved`.
    pub fn emit_row_moved(&self, source: usize, destination: usize) {
        self.row_moved.emit(RowMoved {
            source,
            destination,
        });
    }

    /// Total number of slots connected across all four signals.
    pub fn connection_count(&self) -> usize {
        self.value_changed.connection_count()
            + self.row_added.connection_count()
            + self.removing_row.connection_count()
            + self.row_moved.connection_count()
    }
}

/// The trait that every table model implements.
///
/// A table has a fixed set of named columns and a variable number of rows.
/// Consumers query shape and values through this trait and observe changes
/// through [`signals`](Self::signals) or the `subscribe_*` helpers.
///
/// The trait is object safe; the generic `subscribe_*` helpers are only
/// available on concrete types. Through `dyn TableModel`, subscribe via
/// `signals()` directly.
///
/// # Example
///
/// ```
/// use horizon_table::model::{ArrayTableModel, CellValue, TableModel};
///
/// let model = ArrayTableModel::new(["Name", "Age"]);
/// let _subscription = model.subscribe_row_added(|event| {
///     println!("row added at {}", event.index);
/// });
///
/// model.add_row(vec![CellValue::from("Alice"), 30.into()]).unwrap();
/// assert_eq!(model.row_count(), 1);
/// assert_eq!(model.column_name(1).unwrap(), "Age");
/// ```
pub trait TableModel: Send + Sync {
    /// Returns the number of rows.
    fn row_count(&self) -> usize;

    /// Returns the number of columns. Never changes over the model's lifetime.
    fn column_count(&self) -> usize;

    /// Returns the name of `column`, or `OutOfRange`.
    fn column_name(&self, column: usize) -> ModelResult<&str>;

    /// Returns a copy of the value at (`row`, `column`), or `OutOfRange`.
    ///
    /// Always reflects the latest committed state.
    fn value(&self, row: usize, column: usize) -> ModelResult<CellValue>;

    /// Returns the model's signals.
    fn signals(&self) -> &TableSignals;

    // -------------------------------------------------------------------------
    // Convenience methods with default implementations
    // -------------------------------------------------------------------------

    /// Returns `true` if the model has no rows.
    fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Returns copies of every value in `row`.
    fn row_values(&self, row: usize) -> ModelResult<Vec<CellValue>> {
        (0..self.column_count())
            .map(|column| self.value(row, column))
            .collect()
    }

    /// Returns the position of the column called `name`.
    fn column_index(&self, name: &str) -> Option<usize> {
        (0..self.column_count()).find(|&column| self.column_name(column) == Ok(name))
    }

    /// Subscribes to `ValueChanged` events.
    fn subscribe_value_changed<F>(&self, slot: F) -> Subscription
    where
        Self: Sized,
        F: Fn(&ValueChanged) + Send + Sync + 'static,
    {
        self.signals().value_changed.subscribe(slot)
    }

    /// Subscribes to `RowAdded` events.
    fn subscribe_row_added<F>(&self, slot: F) -> Subscription
    where
        Self: Sized,
        F: Fn(&RowAdded) + Send + Sync + 'static,
    {
        self.signals().row_added.subscribe(slot)
    }

    /// Subscribes to `RemovingRow` events.
    fn subscribe_removing_row<F>(&self, slot: F) -> Subscription
    where
        Self: Sized,
        F: Fn(&RemovingRow) + Send + Sync + 'static,
    {
        self.signals().removing_row.subscribe(slot)
    }

    /// Subscribes to `RowMoved` events.
    fn subscribe_row_moved<F>(&self, slot: F) -> Subscription
    where
        Self: Sized,
        F: Fn(&RowMoved) + Send + Sync + 'static,
    {
        self.signals().row_moved.subscribe(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_table_signals_creation() {
        let signals = TableSignals::new();
        assert_eq!(signals.connection_count(), 0);
    }

    #[test]
    fn test_emit_helpers() {
        let signals = TableSignals::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let recv = received.clone();
        signals.row_added.connect(move |e| recv.lock().push(("added", e.index, 0)));
        let recv = received.clone();
        signals
            .removing_row
            .connect(move |e| recv.lock().push(("removing", e.index, 0)));
        let recv = received.clone();
        signals
            .row_moved
            .connect(move |e| recv.lock().push(("moved", e.source, e.destination)));

        signals.emit_row_added(2);
        signals.emit_removing_row(1);
        signals.emit_row_moved(0, 3);

        assert_eq!(
            *received.lock(),
            vec![("added", 2, 0), ("removing", 1, 0), ("moved", 0, 3)]
        );
        assert_eq!(signals.connection_count(), 3);
    }

    #[test]
    fn test_row_moved_apply_backward() {
        let moved = RowMoved {
            source: 3,
            destination: 1,
        };
        assert_eq!(moved.apply(0), 0);
        assert_eq!(moved.apply(1), 2);
        assert_eq!(moved.apply(2), 3);
        assert_eq!(moved.apply(3), 1);
        assert_eq!(moved.apply(4), 4);
    }

    #[test]
    fn test_row_moved_apply_identity() {
        let moved = RowMoved {
            source: 2,
            destination: 2,
        };
        assert!((0..5).all(|i| moved.apply(i) == i));
    }
}
