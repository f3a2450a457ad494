//! Incrementally sorted view over another table model.
//!
//! `SortedTableModel` keeps the rows of its source ordered by a
//! [`ColumnOrder`]. A change to a single row costs a logarithmic number of
//! comparisons: only the affected row is repositioned, by bisection against
//! its already-sorted neighbours. Changing the column order re-derives every
//! position by repeated binary insertion.
//!
//! All reordering is done through an internal [`TranslatedTableModel`]; the
//! source is never mutated.

use parking_lot::RwLock;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Weak};

use horizon_table_core::logging::{span_names, targets};
use horizon_table_core::{
    table_debug, table_trace, table_warn, DispatchGate, ModelError, ModelResult, PerfSpan,
    Subscription,
};

use super::column_order::ColumnOrder;
use super::comparator::{Comparator, DefaultComparator};
use super::traits::{RemovingRow, RowAdded, RowMoved, TableModel, TableSignals, ValueChanged};
use super::translated_model::TranslatedTableModel;
use super::value::CellValue;

struct SortedInner<S: TableModel + ?Sized + 'static> {
    view: TranslatedTableModel<S>,
    /// The completed column order currently in effect.
    order: RwLock<Arc<ColumnOrder>>,
    comparator: Arc<dyn Comparator>,
    signals: TableSignals,
    /// Set while this view is relocating one of its own rows.
    relocating: AtomicBool,
    /// Set while a full re-sort is being applied.
    resorting: AtomicBool,
    /// Set when a row changed while a full re-sort was being applied.
    dirty: AtomicBool,
    /// Set when a row could not be repositioned, so the view may be out of
    /// order until the next successful re-sort.
    stale: AtomicBool,
    gate: DispatchGate,
}

impl<S: TableModel + ?Sized + 'static> SortedInner<S> {
    fn current_order(&self) -> Arc<ColumnOrder> {
        self.order.read().clone()
    }

    fn compare_with(&self, order: &ColumnOrder, a: usize, b: usize) -> ModelResult<Ordering> {
        for key in order {
            let left = self.view.value(a, key.column)?;
            let right = self.view.value(b, key.column)?;
            let ordering = key
                .direction
                .apply(self.comparator.compare(&left, &right)?);
            if ordering != Ordering::Equal {
                return Ok(ordering);
            }
        }
        Ok(Ordering::Equal)
    }

    fn compare_rows(&self, a: usize, b: usize) -> ModelResult<Ordering> {
        self.compare_with(&self.current_order(), a, b)
    }

    fn find_insertion_index(&self, lower: usize, upper: usize, row: usize) -> ModelResult<usize> {
        let order = self.current_order();
        let (mut lower, mut upper) = (lower, upper);
        while lower < upper {
            let probe = lower + (upper - lower) / 2;
            if self.compare_with(&order, probe, row)? == Ordering::Greater {
                upper = probe;
            } else {
                lower = probe + 1;
            }
        }
        Ok(lower)
    }

    fn reorder_bisection(&self, row: usize) -> ModelResult<()> {
        let _span =
            tracing::trace_span!(target: targets::SORT, span_names::REPOSITION, row).entered();
        let row_count = self.view.row_count();
        ModelError::check_row(row, row_count)?;

        let slot = self.find_insertion_index(0, row, row)?;
        if slot < row {
            return self.relocate(row, slot);
        }
        if row + 1 == row_count || self.compare_rows(row, row + 1)? != Ordering::Greater {
            return Ok(());
        }
        let slot = self.find_insertion_index(row + 1, row_count, row)?;
        self.relocate(row, slot - 1)
    }

    fn relocate(&self, source: usize, destination: usize) -> ModelResult<()> {
        table_trace!(source, destination, "repositioning row");
        let previous = self.relocating.swap(true, AtomicOrdering::AcqRel);
        let result = self.view.move_row(source, destination);
        self.relocating.store(previous, AtomicOrdering::Release);
        result
    }

    /// Repositions `row` after an edit, or defers to the running re-sort.
    ///
    /// A view left out of order by an earlier failure is re-sorted in full
    /// instead, since bisection needs every other row in order.
    fn reposition(&self, row: usize) {
        if self.resorting.load(AtomicOrdering::Acquire) {
            self.dirty.store(true, AtomicOrdering::Release);
            return;
        }
        if self.stale.load(AtomicOrdering::Acquire) {
            self.recover();
            return;
        }
        if let Err(error) = self.reorder_bisection(row) {
            self.stale.store(true, AtomicOrdering::Release);
            table_warn!(row, %error, "row left in place until the next re-sort");
        }
    }

    fn recover(&self) {
        let Ok(_dispatch) = self.gate.enter("reposition") else {
            return;
        };
        if let Err(error) = self.resort_with(self.current_order()) {
            table_warn!(%error, "view still out of order");
        }
    }

    /// Computes the moves that sort the view under `order` without touching
    /// it. Each `(from, to)` moves the row at `from` into the sorted prefix
    /// `[0, from)`.
    fn plan_resort(&self, order: &ColumnOrder) -> ModelResult<Vec<(usize, usize)>> {
        let row_count = self.view.row_count();
        let mut placed: Vec<usize> = Vec::with_capacity(row_count);
        let mut moves = Vec::new();
        for row in 0..row_count {
            let (mut lower, mut upper) = (0, placed.len());
            while lower < upper {
                let probe = lower + (upper - lower) / 2;
                if self.compare_with(order, placed[probe], row)? == Ordering::Greater {
                    upper = probe;
                } else {
                    lower = probe + 1;
                }
            }
            placed.insert(lower, row);
            if lower < row {
                moves.push((row, lower));
            }
        }
        Ok(moves)
    }

    /// Re-derives every row position under `order` and commits `order`.
    ///
    /// The caller must hold the dispatch gate.
    fn resort_with(&self, order: Arc<ColumnOrder>) -> ModelResult<()> {
        let _perf = PerfSpan::new(span_names::RESORT);
        loop {
            let moves = self.plan_resort(&order)?;
            *self.order.write() = order.clone();
            tracing::debug!(
                target: targets::SORT,
                rows = self.view.row_count(),
                moves = moves.len(),
                "applying full re-sort"
            );

            self.dirty.store(false, AtomicOrdering::Release);
            self.resorting.store(true, AtomicOrdering::Release);
            for (from, to) in moves {
                if self.dirty.load(AtomicOrdering::Acquire) {
                    break;
                }
                if self.relocate(from, to).is_err() {
                    self.dirty.store(true, AtomicOrdering::Release);
                    break;
                }
            }
            self.resorting.store(false, AtomicOrdering::Release);

            if !self.dirty.swap(false, AtomicOrdering::AcqRel) {
                self.stale.store(false, AtomicOrdering::Release);
                return Ok(());
            }
            tracing::debug!(target: targets::SORT, "rows changed during re-sort, running again");
        }
    }

    fn on_value_changed(&self, event: &ValueChanged) {
        self.signals
            .emit_value_changed(event.row, event.column, event.previous.clone());
        self.reposition(event.row);
    }

    fn on_row_added(&self, event: &RowAdded) {
        self.signals.emit_row_added(event.index);
        self.reposition(event.index);
    }

    fn on_removing_row(&self, event: &RemovingRow) {
        self.signals.emit_removing_row(event.index);
    }

    fn on_row_moved(&self, event: &RowMoved) {
        // Cleared here so that moves made by listeners count as foreign.
        let own = self.relocating.swap(false, AtomicOrdering::AcqRel);
        self.signals.emit_row_moved(event.source, event.destination);
        if !own {
            self.reposition(event.destination);
        }
    }
}

/// A view that keeps its source's rows sorted.
///
/// Rows are ordered by a completed [`ColumnOrder`] and a [`Comparator`].
/// The view re-emits every change of its source in its own index space;
/// a value change or insertion is re-emitted first, and the resulting
/// reposition follows as a `RowMoved`.
///
/// Rows the order considers equal keep an arbitrary but deterministic
/// relative order.
///
/// If the comparator fails while a changed row is being repositioned, the
/// source mutation still succeeds and the row stays where it is, logged at
/// `warn`. [`needs_resort`](Self::needs_resort) then reports `true` and the
/// next change, or an explicit [`resort`](Self::resort), re-sorts every row.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_table::model::{ArrayTableModel, CellValue, SortedTableModel, TableModel};
///
/// let source = Arc::new(ArrayTableModel::new(["N"]));
/// for n in [2, 1, 0] {
///     source.add_row([n]).unwrap();
/// }
///
/// let sorted = SortedTableModel::new(source.clone()).unwrap();
/// assert_eq!(sorted.value(0, 0).unwrap(), CellValue::Int(0));
///
/// // Source row 2 holds 0 and is shown first; raising it moves it last.
/// source.set_value(2, 0, 5).unwrap();
/// assert_eq!(sorted.value(2, 0).unwrap(), CellValue::Int(5));
/// ```
pub struct SortedTableModel<S: TableModel + ?Sized + 'static> {
    inner: Arc<SortedInner<S>>,
    _subscriptions: [Subscription; 4],
}

impl<S: TableModel + ?Sized + 'static> SortedTableModel<S> {
    /// Creates a view sorting every column ascending with the
    /// [`DefaultComparator`].
    pub fn new(source: Arc<S>) -> ModelResult<Self> {
        Self::with_order(source, ColumnOrder::new(), DefaultComparator::new())
    }

    /// Creates a view with an explicit order and comparator.
    ///
    /// Fails if the order is invalid for the source's columns or if the
    /// comparator cannot order the initial rows.
    pub fn with_order(
        source: Arc<S>,
        order: ColumnOrder,
        comparator: impl Comparator + 'static,
    ) -> ModelResult<Self> {
        Self::build(source, order, Arc::new(comparator))
    }

    /// Returns a builder for configuring a sorted view.
    pub fn builder(source: Arc<S>) -> SortedTableModelBuilder<S> {
        SortedTableModelBuilder::new(source)
    }

    fn build(
        source: Arc<S>,
        order: ColumnOrder,
        comparator: Arc<dyn Comparator>,
    ) -> ModelResult<Self> {
        let order = Arc::new(order.complete(source.column_count())?);
        let inner = Arc::new(SortedInner {
            view: TranslatedTableModel::new(source),
            order: RwLock::new(order.clone()),
            comparator,
            signals: TableSignals::new(),
            relocating: AtomicBool::new(false),
            resorting: AtomicBool::new(false),
            dirty: AtomicBool::new(false),
            stale: AtomicBool::new(false),
            gate: DispatchGate::new(),
        });

        {
            let _dispatch = inner.gate.enter("new")?;
            inner.resort_with(order)?;
        }

        let view_signals = inner.view.signals();
        let weak = Arc::downgrade(&inner);
        let value_changed = view_signals.value_changed.subscribe(move |event| {
            if let Some(inner) = Weak::upgrade(&weak) {
                inner.on_value_changed(event);
            }
        });
        let weak = Arc::downgrade(&inner);
        let row_added = view_signals.row_added.subscribe(move |event| {
            if let Some(inner) = Weak::upgrade(&weak) {
                inner.on_row_added(event);
            }
        });
        let weak = Arc::downgrade(&inner);
        let removing_row = view_signals.removing_row.subscribe(move |event| {
            if let Some(inner) = Weak::upgrade(&weak) {
                inner.on_removing_row(event);
            }
        });
        let weak = Arc::downgrade(&inner);
        let row_moved = view_signals.row_moved.subscribe(move |event| {
            if let Some(inner) = Weak::upgrade(&weak) {
                inner.on_row_moved(event);
            }
        });

        Ok(Self {
            inner,
            _subscriptions: [value_changed, row_added, removing_row, row_moved],
        })
    }

    /// Returns the source model.
    pub fn source(&self) -> &Arc<S> {
        self.inner.view.source()
    }

    /// Maps a view row to the source row it shows.
    pub fn map_to_source(&self, row: usize) -> ModelResult<usize> {
        self.inner.view.map_to_source(row)
    }

    /// Maps a source row to the view row that shows it.
    pub fn map_from_source(&self, source_row: usize) -> ModelResult<usize> {
        self.inner.view.map_from_source(source_row)
    }

    /// Returns the completed column order in effect.
    pub fn column_order(&self) -> ColumnOrder {
        ColumnOrder::clone(&self.inner.current_order())
    }

    /// Returns `true` if a failed reposition left the view out of order.
    pub fn needs_resort(&self) -> bool {
        self.inner.stale.load(AtomicOrdering::Acquire)
    }

    /// Replaces the column order and re-sorts every row.
    ///
    /// Fails with `InvalidArgument` if a column appears twice and with
    /// `OutOfRange` if a column does not exist. If the comparator fails while
    /// the new positions are being computed, the view and its order are left
    /// untouched.
    pub fn set_column_order(&self, order: ColumnOrder) -> ModelResult<()> {
        let _dispatch = self.inner.gate.enter("set_column_order")?;
        let order = order.complete(self.column_count())?;
        table_debug!(keys = order.len(), "column order changed");
        self.inner.resort_with(Arc::new(order))
    }

    /// Re-sorts every row with the current order.
    ///
    /// Only needed when rows changed without the view being notified, such
    /// as through a comparator whose behaviour changed.
    pub fn resort(&self) -> ModelResult<()> {
        let _dispatch = self.inner.gate.enter("resort")?;
        self.inner.resort_with(self.inner.current_order())
    }

    /// Compares two view rows under the current order.
    ///
    /// Returns the first non-equal per-column ordering, or `Equal` if every
    /// column compares equal.
    pub fn compare_rows(&self, a: usize, b: usize) -> ModelResult<Ordering> {
        self.inner.compare_rows(a, b)
    }

    /// Binary search of `[lower, upper)` for the first row that orders after
    /// `row`. Returns `upper` if there is none.
    pub fn find_insertion_index(&self, lower: usize, upper: usize, row: usize) -> ModelResult<usize> {
        self.inner.find_insertion_index(lower, upper, row)
    }

    /// Moves `row` to its sorted position, assuming every other row is
    /// already in order.
    pub fn reorder_bisection(&self, row: usize) -> ModelResult<()> {
        self.inner.reorder_bisection(row)
    }
}

impl<S: TableModel + ?Sized + 'static> TableModel for SortedTableModel<S> {
    fn row_count(&self) -> usize {
        self.inner.view.row_count()
    }

    fn column_count(&self) -> usize {
        self.inner.view.column_count()
    }

    fn column_name(&self, column: usize) -> ModelResult<&str> {
        self.inner.view.column_name(column)
    }

    fn value(&self, row: usize, column: usize) -> ModelResult<CellValue> {
        self.inner.view.value(row, column)
    }

    fn signals(&self) -> &TableSignals {
        &self.inner.signals
    }
}

/// Builder for [`SortedTableModel`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_table::model::{
///     ArrayTableModel, ColumnOrder, SortDirection, SortedTableModelBuilder, TableModel,
/// };
///
/// let source = Arc::new(ArrayTableModel::new(["A", "B"]));
/// source.add_row([1, 0]).unwrap();
/// source.add_row([0, 1]).unwrap();
///
/// let sorted = SortedTableModelBuilder::new(source)
///     .column_order(ColumnOrder::new().then(1, SortDirection::Descending))
///     .build()
///     .unwrap();
/// assert_eq!(sorted.value(0, 1).unwrap().as_int(), Some(1));
/// ```
pub struct SortedTableModelBuilder<S: TableModel + ?Sized + 'static> {
    source: Arc<S>,
    order: ColumnOrder,
    comparator: Option<Arc<dyn Comparator>>,
}

impl<S: TableModel + ?Sized + 'static> SortedTableModelBuilder<S> {
    /// Creates a new builder with the given source model.
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            order: ColumnOrder::new(),
            comparator: None,
        }
    }

    /// Sets the explicit column order.
    pub fn column_order(mut self, order: ColumnOrder) -> Self {
        self.order = order;
        self
    }

    /// Sets the comparator.
    pub fn comparator(mut self, comparator: impl Comparator + 'static) -> Self {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    /// Builds the sorted view.
    pub fn build(self) -> ModelResult<SortedTableModel<S>> {
        let comparator = self
            .comparator
            .unwrap_or_else(|| Arc::new(DefaultComparator::new()));
        SortedTableModel::build(self.source, self.order, comparator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::column_order::SortDirection;
    use crate::model::ArrayTableModel;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;

    fn single_column(values: &[i64]) -> Arc<ArrayTableModel> {
        let source = Arc::new(ArrayTableModel::new(["N"]));
        for &value in values {
            source.add_row([value]).unwrap();
        }
        source
    }

    fn column(model: &impl TableModel, column: usize) -> Vec<i64> {
        (0..model.row_count())
            .map(|row| model.value(row, column).unwrap().as_int().unwrap())
            .collect()
    }

    #[test]
    fn test_default_sort() {
        let sorted = SortedTableModel::new(single_column(&[2, 1, 0])).unwrap();
        assert_eq!(column(&sorted, 0), vec![0, 1, 2]);
        assert_eq!(sorted.map_to_source(0).unwrap(), 2);
    }

    #[test]
    fn test_bisection_after_edits() {
        let source = single_column(&[0, 1, 2]);
        let sorted = SortedTableModel::new(source.clone()).unwrap();

        let view_row = |source_row| sorted.map_from_source(source_row).unwrap();

        source.set_value(0, 0, 0).unwrap();
        assert_eq!(column(&sorted, 0), vec![0, 1, 2]);
        source.set_value(0, 0, 3).unwrap();
        assert_eq!(column(&sorted, 0), vec![1, 2, 3]);
        assert_eq!(view_row(0), 2);
        source.set_value(0, 0, 5).unwrap();
        assert_eq!(column(&sorted, 0), vec![1, 2, 5]);
        source.set_value(0, 0, -1).unwrap();
        assert_eq!(column(&sorted, 0), vec![-1, 1, 2]);
        assert_eq!(view_row(0), 0);
    }

    #[test]
    fn test_value_change_then_move_events() {
        let source = single_column(&[0, 1, 2]);
        let sorted = SortedTableModel::new(source.clone()).unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let recv = events.clone();
        let _a = sorted.subscribe_value_changed(move |e| recv.lock().push(format!("changed {}", e.row)));
        let recv = events.clone();
        let _b = sorted.subscribe_row_moved(move |e| {
            recv.lock().push(format!("moved {} {}", e.source, e.destination))
        });

        source.set_value(0, 0, 9).unwrap();
        assert_eq!(*events.lock(), vec!["changed 0", "moved 0 2"]);
    }

    #[test]
    fn test_row_added_is_positioned() {
        let source = single_column(&[5, 1, 3]);
        let sorted = SortedTableModel::new(source.clone()).unwrap();

        let added = Arc::new(Mutex::new(Vec::new()));
        let recv = added.clone();
        let _sub = sorted.subscribe_row_added(move |e| recv.lock().push(e.index));

        source.add_row([2]).unwrap();
        source.insert_row(0, [4]).unwrap();
        assert_eq!(column(&sorted, 0), vec![1, 2, 3, 4, 5]);
        assert_eq!(*added.lock(), vec![3, 0]);
    }

    #[test]
    fn test_removal_passes_through() {
        let source = single_column(&[5, 1, 3]);
        let sorted = SortedTableModel::new(source.clone()).unwrap();

        let removed = Arc::new(Mutex::new(Vec::new()));
        let recv = removed.clone();
        let _sub = sorted.subscribe_removing_row(move |e| recv.lock().push(e.index));

        source.remove_row(0).unwrap();
        assert_eq!(*removed.lock(), vec![2]);
        assert_eq!(column(&sorted, 0), vec![1, 3]);
    }

    #[test]
    fn test_source_move_keeps_order() {
        let source = single_column(&[3, 0, 2, 1]);
        let sorted = SortedTableModel::new(source.clone()).unwrap();
        source.move_row(0, 3).unwrap();
        source.move_row(2, 0).unwrap();
        assert_eq!(column(&sorted, 0), vec![0, 1, 2, 3]);
        assert!(sorted.inner.view.mapping_snapshot().is_consistent());
    }

    #[test]
    fn test_column_order() {
        let source = Arc::new(ArrayTableModel::new(["A", "B"]));
        source.add_row([1, 0]).unwrap();
        source.add_row([0, 1]).unwrap();
        source.add_row([2, 0]).unwrap();

        let sorted = SortedTableModel::with_order(
            source,
            ColumnOrder::new().then(1, SortDirection::Ascending),
            DefaultComparator::new(),
        )
        .unwrap();
        assert_eq!(column(&sorted, 0), vec![1, 2, 0]);
        assert_eq!(column(&sorted, 1), vec![0, 0, 1]);

        sorted
            .set_column_order(ColumnOrder::new().then(0, SortDirection::Descending))
            .unwrap();
        assert_eq!(column(&sorted, 0), vec![2, 1, 0]);
        assert_eq!(
            sorted.column_order(),
            ColumnOrder::new()
                .then(0, SortDirection::Descending)
                .then(1, SortDirection::Ascending)
        );
    }

    #[test]
    fn test_invalid_column_order_leaves_state() {
        let sorted = SortedTableModel::new(single_column(&[1, 0])).unwrap();
        let before = sorted.column_order();

        let duplicate = ColumnOrder::new()
            .then(0, SortDirection::Ascending)
            .then(0, SortDirection::Descending);
        assert!(matches!(
            sorted.set_column_order(duplicate),
            Err(ModelError::InvalidArgument(_))
        ));
        assert_eq!(
            sorted.set_column_order(ColumnOrder::new().then(1, SortDirection::Ascending)),
            Err(ModelError::column(1, 1))
        );
        assert_eq!(sorted.column_order(), before);
        assert_eq!(column(&sorted, 0), vec![0, 1]);
    }

    #[test]
    fn test_comparator_failure_leaves_state() {
        let source = Arc::new(ArrayTableModel::new(["A", "B"]));
        source.add_row([CellValue::Int(1), CellValue::from("x")]).unwrap();
        source.add_row([CellValue::Int(0), CellValue::Bool(true)]).unwrap();

        let sorted = SortedTableModel::with_order(
            source.clone(),
            ColumnOrder::new(),
            |a: &CellValue, b: &CellValue| match (a.as_int(), b.as_int()) {
                (Some(a), Some(b)) => Ok(a.cmp(&b)),
                _ => Err(ModelError::unsupported("ints only")),
            },
        )
        .unwrap();
        assert_eq!(column(&sorted, 0), vec![0, 1]);

        let moved = Arc::new(Mutex::new(0));
        let recv = moved.clone();
        let _sub = sorted.subscribe_row_moved(move |_| *recv.lock() += 1);

        let result = sorted.set_column_order(ColumnOrder::new().then(1, SortDirection::Ascending));
        assert!(matches!(result, Err(ModelError::Unsupported(_))));
        assert_eq!(column(&sorted, 0), vec![0, 1]);
        assert_eq!(sorted.column_order().keys()[0].column, 0);
        assert_eq!(*moved.lock(), 0);
    }

    #[test]
    fn test_incremental_failure_leaves_row() {
        let source = Arc::new(ArrayTableModel::new(["A"]));
        source.add_row([1]).unwrap();
        source.add_row([2]).unwrap();
        let sorted = SortedTableModel::new(source.clone()).unwrap();
        assert!(!sorted.needs_resort());

        source.set_value(0, 0, "text").unwrap();
        assert_eq!(sorted.value(0, 0).unwrap(), CellValue::from("text"));
        assert_eq!(sorted.value(1, 0).unwrap(), CellValue::Int(2));
        assert!(sorted.needs_resort());

        // Still unsortable: the failed re-sort keeps the flag.
        assert!(matches!(sorted.resort(), Err(ModelError::Unsupported(_))));
        assert!(sorted.needs_resort());
    }

    #[test]
    fn test_next_edit_recovers_order() {
        let source = single_column(&[1, 2, 4]);
        let sorted = SortedTableModel::new(source.clone()).unwrap();

        source.set_value(0, 0, "text").unwrap();
        assert!(sorted.needs_resort());

        source.set_value(0, 0, 9).unwrap();
        assert!(!sorted.needs_resort());
        assert_eq!(column(&sorted, 0), vec![2, 4, 9]);
    }

    #[test]
    fn test_resort_clears_stale_flag() {
        let source = single_column(&[3, 1]);
        let sorted = SortedTableModel::new(source.clone()).unwrap();
        let source_row = sorted.map_to_source(0).unwrap();

        source.set_value(source_row, 0, "x").unwrap();
        assert!(sorted.needs_resort());
        source.set_value(source_row, 0, 5).unwrap();
        assert!(!sorted.needs_resort());

        source.set_value(source_row, 0, CellValue::None).unwrap();
        assert!(sorted.needs_resort());
        source.remove_row(source_row).unwrap();
        sorted.resort().unwrap();
        assert!(!sorted.needs_resort());
        assert_eq!(column(&sorted, 0), vec![3]);
    }

    fn counting_view(
        row_count: i64,
    ) -> (Arc<ArrayTableModel>, SortedTableModel<ArrayTableModel>, Arc<AtomicUsize>) {
        let source = Arc::new(ArrayTableModel::new(["N"]));
        // 7919 is odd, so this visits every residue once.
        for row in 0..row_count {
            source.add_row([(row * 7919) % row_count * 2]).unwrap();
        }
        let comparisons = Arc::new(AtomicUsize::new(0));
        let counter = comparisons.clone();
        let sorted = SortedTableModel::builder(source.clone())
            .comparator(move |a: &CellValue, b: &CellValue| -> ModelResult<Ordering> {
                counter.fetch_add(1, AtomicOrdering::SeqCst);
                Ok(a.as_int().cmp(&b.as_int()))
            })
            .build()
            .unwrap();
        (source, sorted, comparisons)
    }

    #[test]
    fn test_single_edit_costs_logarithmic_comparisons() {
        let (source, sorted, comparisons) = counting_view(1024);
        // ceil(log2(1024)) == 10, twice for both bisections, plus slack.
        let bound = 2 * 10 + 4;

        comparisons.store(0, AtomicOrdering::SeqCst);
        source.set_value(sorted.map_to_source(0).unwrap(), 0, 10_000).unwrap();
        assert!(comparisons.load(AtomicOrdering::SeqCst) <= bound);
        assert_eq!(sorted.value(1023, 0).unwrap(), CellValue::Int(10_000));

        comparisons.store(0, AtomicOrdering::SeqCst);
        source.set_value(sorted.map_to_source(1023).unwrap(), 0, -1).unwrap();
        assert!(comparisons.load(AtomicOrdering::SeqCst) <= bound);
        assert_eq!(sorted.value(0, 0).unwrap(), CellValue::Int(-1));

        comparisons.store(0, AtomicOrdering::SeqCst);
        source.add_row([1001]).unwrap();
        assert!(comparisons.load(AtomicOrdering::SeqCst) <= bound);
        assert_eq!(sorted.value(501, 0).unwrap(), CellValue::Int(1001));
    }

    #[test]
    fn test_nested_resort_rejected() {
        let source = single_column(&[0, 1]);
        let sorted = Arc::new(SortedTableModel::new(source.clone()).unwrap());

        let nested = Arc::new(Mutex::new(Vec::new()));
        let recv = nested.clone();
        let weak = Arc::downgrade(&sorted);
        let _sub = sorted.subscribe_row_moved(move |_| {
            if let Some(sorted) = weak.upgrade() {
                recv.lock().push(sorted.resort());
            }
        });

        sorted
            .set_column_order(ColumnOrder::new().then(0, SortDirection::Descending))
            .unwrap();
        assert_eq!(*nested.lock(), vec![Err(ModelError::Reentrant("resort"))]);
        assert_eq!(column(&*sorted, 0), vec![1, 0]);
    }

    #[test]
    fn test_edit_during_resort_marks_dirty() {
        let source = single_column(&[0, 1, 2]);
        let sorted = Arc::new(SortedTableModel::new(source.clone()).unwrap());

        let fired = Arc::new(AtomicBool::new(false));
        let fired_clone = fired.clone();
        let weak_source = Arc::downgrade(&source);
        let _sub = sorted.subscribe_row_moved(move |_| {
            if !fired_clone.swap(true, AtomicOrdering::SeqCst) {
                if let Some(source) = weak_source.upgrade() {
                    source.add_row([1]).unwrap();
                }
            }
        });

        sorted
            .set_column_order(ColumnOrder::new().then(0, SortDirection::Descending))
            .unwrap();
        assert!(fired.load(AtomicOrdering::SeqCst));
        assert_eq!(column(&*sorted, 0), vec![2, 1, 1, 0]);
    }

    #[test]
    fn test_builder_with_comparator() {
        let source = Arc::new(ArrayTableModel::new(["Name"]));
        for name in ["bob", "Alice", "carol"] {
            source.add_row([name]).unwrap();
        }
        let by_length = |a: &CellValue, b: &CellValue| -> ModelResult<Ordering> {
            Ok(a.as_str().map(str::len).cmp(&b.as_str().map(str::len)))
        };
        let sorted = SortedTableModel::builder(source)
            .comparator(by_length)
            .build()
            .unwrap();
        let names: Vec<String> = (0..3)
            .map(|row| sorted.value(row, 0).unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["bob", "Alice", "carol"]);
    }

    #[test]
    fn test_find_insertion_index() {
        let sorted = SortedTableModel::new(single_column(&[0, 2, 4, 6])).unwrap();
        // Row 1 holds 2; among rows [2, 4) nothing orders before it.
        assert_eq!(sorted.find_insertion_index(2, 4, 1).unwrap(), 2);
        // Among rows [0, 1) row 0 holds 0 which does not order after 2.
        assert_eq!(sorted.find_insertion_index(0, 1, 1).unwrap(), 1);
        assert_eq!(sorted.compare_rows(3, 0).unwrap(), Ordering::Greater);
        assert_eq!(sorted.compare_rows(1, 1).unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_drop_disconnects_source() {
        let source = single_column(&[1]);
        let sorted = SortedTableModel::new(source.clone()).unwrap();
        assert_eq!(source.signals().connection_count(), 4);
        drop(sorted);
        assert_eq!(source.signals().connection_count(), 0);
    }
}
