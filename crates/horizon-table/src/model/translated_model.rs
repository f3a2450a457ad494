//! Index-translation view over another table model.
//!
//! `TranslatedTableModel` presents the rows of its source in an independent
//! order. It keeps a permutation between its own row indices and the source's,
//! forwards every query through that permutation, and re-emits every source
//! event in its own index space.

use parking_lot::RwLock;
use std::sync::{Arc, Weak};

use horizon_table_core::{table_trace, table_warn, ModelError, ModelResult, Subscription};

use super::traits::{RemovingRow, RowAdded, RowMoved, TableModel, TableSignals, ValueChanged};
use super::value::CellValue;

/// Bidirectional mapping between view rows and source rows.
///
/// `forward[view] = source` and `inverse[source] = view`. Both arrays always
/// have the source's row count and satisfy `forward[inverse[i]] == i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RowMapping {
    forward: Vec<usize>,
    inverse: Vec<usize>,
}

impl RowMapping {
    fn identity(len: usize) -> Self {
        Self {
            forward: (0..len).collect(),
            inverse: (0..len).collect(),
        }
    }

    fn len(&self) -> usize {
        self.forward.len()
    }

    /// Source row `index` was inserted; it is shown at view row `index`.
    fn insert(&mut self, index: usize) {
        self.forward.iter_mut().filter(|s| **s >= index).for_each(|s| *s += 1);
        self.inverse.iter_mut().filter(|v| **v >= index).for_each(|v| *v += 1);
        self.forward.insert(index, index);
        self.inverse.insert(index, index);
    }

    /// Source row `index` was removed. Returns the view row it occupied.
    fn remove(&mut self, index: usize) -> usize {
        let view = self.inverse.remove(index);
        self.forward.remove(view);
        self.forward.iter_mut().filter(|s| **s > index).for_each(|s| *s -= 1);
        self.inverse.iter_mut().filter(|v| **v > view).for_each(|v| *v -= 1);
        view
    }

    /// Moves view row `source` to view row `destination`.
    fn relocate(&mut self, source: usize, destination: usize) {
        let entry = self.forward.remove(source);
        self.forward.insert(destination, entry);
        for view in source.min(destination)..=source.max(destination) {
            self.inverse[self.forward[view]] = view;
        }
    }

    /// Rewrites every source index through a move performed by the source.
    fn follow_source_move(&mut self, moved: RowMoved) {
        for source in &mut self.forward {
            *source = moved.apply(*source);
        }
        for (view, &source) in self.forward.iter().enumerate() {
            self.inverse[source] = view;
        }
    }

    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        self.forward.len() == self.inverse.len()
            && self
                .inverse
                .iter()
                .enumerate()
                .all(|(i, &v)| self.forward.get(v) == Some(&i))
    }
}

struct TranslatedInner<S: ?Sized> {
    source: Arc<S>,
    mapping: RwLock<RowMapping>,
    signals: TableSignals,
}

impl<S: TableModel + ?Sized> TranslatedInner<S> {
    fn view_row(&self, source_row: usize) -> Option<usize> {
        self.mapping.read().inverse.get(source_row).copied()
    }

    fn on_value_changed(&self, event: &ValueChanged) {
        let Some(row) = self.view_row(event.row) else {
            table_warn!(row = event.row, "value change for unknown source row");
            return;
        };
        self.signals
            .emit_value_changed(row, event.column, event.previous.clone());
    }

    fn on_row_added(&self, event: &RowAdded) {
        {
            let mut mapping = self.mapping.write();
            if event.index > mapping.len() {
                table_warn!(index = event.index, "row added past the end of the mapping");
                return;
            }
            mapping.insert(event.index);
        }
        self.signals.emit_row_added(event.index);
    }

    fn on_removing_row(&self, event: &RemovingRow) {
        let Some(row) = self.view_row(event.index) else {
            table_warn!(index = event.index, "removal of unknown source row");
            return;
        };
        self.signals.emit_removing_row(row);

        // Listeners may have relocated rows, so the view row is looked up again.
        let mut mapping = self.mapping.write();
        if event.index < mapping.len() {
            mapping.remove(event.index);
        }
    }

    fn on_row_moved(&self, event: &RowMoved) {
        let (source, destination) = {
            let mut mapping = self.mapping.write();
            let len = mapping.len();
            if event.source >= len || event.destination >= len {
                table_warn!(
                    source = event.source,
                    destination = event.destination,
                    "move of unknown source row"
                );
                return;
            }
            let source = mapping.inverse[event.source];
            let destination = mapping.inverse[event.destination];
            mapping.follow_source_move(*event);
            mapping.relocate(source, destination);
            (source, destination)
        };
        table_trace!(source, destination, "source move translated");
        self.signals.emit_row_moved(source, destination);
    }
}

/// A view that presents its source's rows through a permutation.
///
/// The permutation starts as the identity. It changes when the view's own
/// [`move_row`](Self::move_row) is called, and it is kept in step with the
/// source's insertions, removals, and moves. The source itself is never
/// mutated by the view.
///
/// Dropping the view disconnects it from its source.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_table::model::{ArrayTableModel, CellValue, TableModel, TranslatedTableModel};
///
/// let source = Arc::new(ArrayTableModel::new(["N"]));
/// for n in 0..3 {
///     source.add_row([n]).unwrap();
/// }
///
/// let view = TranslatedTableModel::new(source.clone());
/// view.move_row(0, 1).unwrap();
/// assert_eq!(view.value(0, 0).unwrap(), CellValue::Int(1));
/// assert_eq!(view.map_to_source(1).unwrap(), 0);
///
/// // Edits to the source are reported at the view's row index.
/// source.set_value(0, 0, 10).unwrap();
/// assert_eq!(view.value(1, 0).unwrap(), CellValue::Int(10));
/// ```
pub struct TranslatedTableModel<S: TableModel + ?Sized + 'static> {
    inner: Arc<TranslatedInner<S>>,
    _subscriptions: [Subscription; 4],
}

impl<S: TableModel + ?Sized + 'static> TranslatedTableModel<S> {
    /// Creates a view over `source` with the identity permutation.
    pub fn new(source: Arc<S>) -> Self {
        let mapping = RowMapping::identity(source.row_count());
        let inner = Arc::new(TranslatedInner {
            source,
            mapping: RwLock::new(mapping),
            signals: TableSignals::new(),
        });
        let source_signals = inner.source.signals();

        let weak = Arc::downgrade(&inner);
        let value_changed = source_signals.value_changed.subscribe(move |event| {
            if let Some(inner) = Weak::upgrade(&weak) {
                inner.on_value_changed(event);
            }
        });
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
            inner,
            _subscriptions: [value_changed, row_added, removing_row, row_moved],
        }
    }

    /// Returns the source model.
    pub fn source(&self) -> &Arc<S> {
        &self.inner.source
    }

    /// Maps a view row to the source row it shows.
    pub fn map_to_source(&self, row: usize) -> ModelResult<usize> {
        let mapping = self.inner.mapping.read();
        mapping
            .forward
            .get(row)
            .copied()
            .ok_or_else(|| ModelError::row(row, mapping.len()))
    }

    /// Maps a source row to the view row that shows it.
    pub fn map_from_source(&self, source_row: usize) -> ModelResult<usize> {
        let mapping = self.inner.mapping.read();
        mapping
            .inverse
            .get(source_row)
            .copied()
            .ok_or_else(|| ModelError::row(source_row, mapping.len()))
    }

    /// Returns the source row shown at each view row, in view order.
    pub fn source_rows(&self) -> Vec<usize> {
        self.inner.mapping.read().forward.clone()
    }

    /// Relocates view row `source` so that it ends up at `destination`.
    ///
    /// Only the permutation changes. Emits `RowMoved` unless the two indices
    /// are equal, in which case nothing happens.
    pub fn move_row(&self, source: usize, destination: usize) -> ModelResult<()> {
        {
            let mut mapping = self.inner.mapping.write();
            ModelError::check_row(source, mapping.len())?;
            ModelError::check_row(destination, mapping.len())?;
            if source == destination {
                return Ok(());
            }
            mapping.relocate(source, destination);
        }
        table_trace!(source, destination, "view row moved");
        self.inner.signals.emit_row_moved(source, destination);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn mapping_snapshot(&self) -> RowMapping {
        self.inner.mapping.read().clone()
    }
}

impl<S: TableModel + ?Sized + 'static> TableModel for TranslatedTableModel<S> {
    fn row_count(&self) -> usize {
        self.inner.mapping.read().len()
    }

    fn column_count(&self) -> usize {
        self.inner.source.column_count()
    }

    fn column_name(&self, column: usize) -> ModelResult<&str> {
        self.inner.source.column_name(column)
    }

    fn value(&self, row: usize, column: usize) -> ModelResult<CellValue> {
        let source_row = self.map_to_source(row)?;
        self.inner.source.value(source_row, column)
    }

    fn signals(&self) -> &TableSignals {
        &self.inner.signals
    }
}
