//! Row store backed by an in-memory array of rows.
//!
//! `ArrayTableModel` owns its cell data and is the usual source at the bottom
//! of a stack of views.

use parking_lot::RwLock;

use horizon_table_core::{table_trace, DispatchGate, ModelError, ModelResult};

use super::traits::{TableModel, TableSignals};
use super::value::CellValue;

/// A table model that owns its rows.
///
/// Every mutation is validated before anything changes, and every successful
/// mutation emits exactly one event once the lock on the rows has been
/// released. Mutations requested from a slot while this model is still
/// delivering events for an earlier mutation fail with
/// [`ModelError::Reentrant`].
///
/// # Example
///
/// ```
/// use horizon_table::model::{ArrayTableModel, CellValue, TableModel};
///
/// let model = ArrayTableModel::new(["A", "B"]);
/// assert!(model.add_row([1, 2, 3]).is_err());
///
/// model.add_row([1, 2]).unwrap();
/// model.insert_row(0, [5, 7]).unwrap();
/// assert_eq!(model.value(0, 1).unwrap(), CellValue::Int(7));
///
/// model.move_row(0, 1).unwrap();
/// assert_eq!(model.value(1, 0).unwrap(), CellValue::Int(5));
/// ```
pub struct ArrayTableModel {
    column_names: Vec<String>,
    rows: RwLock<Vec<Vec<CellValue>>>,
    signals: TableSignals,
    gate: DispatchGate,
}

impl ArrayTableModel {
    /// Creates an empty model with the given column names.
    pub fn new<I, S>(column_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column_names: column_names.into_iter().map(Into::into).collect(),
            rows: RwLock::new(Vec::new()),
            signals: TableSignals::new(),
            gate: DispatchGate::new(),
        }
    }

    /// Creates a model pre-populated with `rows`.
    ///
    /// Fails with `InvalidArgument` if any row's width differs from the
    /// number of columns.
    pub fn from_rows<I, S>(column_names: I, rows: Vec<Vec<CellValue>>) -> ModelResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let model = Self::new(column_names);
        for (index, row) in rows.iter().enumerate() {
            model.check_shape(row).map_err(|_| {
                ModelError::invalid_argument(format!(
                    "row {index} has {} values, expected {}",
                    row.len(),
                    model.column_names.len()
                ))
            })?;
        }
        *model.rows.write() = rows;
        Ok(model)
    }

    /// Creates a model with `row_count` rows holding `value` in every cell.
    pub fn filled<I, S>(column_names: I, row_count: usize, value: CellValue) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let model = Self::new(column_names);
        let row = vec![value; model.column_names.len()];
        *model.rows.write() = vec![row; row_count];
        model
    }

    /// Returns a snapshot of every row.
    pub fn rows(&self) -> Vec<Vec<CellValue>> {
        self.rows.read().clone()
    }

    /// Replaces the value at (`row`, `column`).
    ///
    /// Setting a cell to the value it already holds does nothing and emits
    /// nothing. Otherwise emits `ValueChanged` with the previous value.
    pub fn set_value(&self, row: usize, column: usize, value: impl Into<CellValue>) -> ModelResult<()> {
        let _dispatch = self.gate.enter("set_value")?;
        ModelError::check_column(column, self.column_names.len())?;
        let value = value.into();

        let mut rows = self.rows.write();
        ModelError::check_row(row, rows.len())?;
        let cell = &mut rows[row][column];
        if *cell == value {
            return Ok(());
        }
        let previous = std::mem::replace(cell, value);
        drop(rows);

        table_trace!(row, column, "value changed");
        self.signals.emit_value_changed(row, column, previous);
        Ok(())
    }

    /// Appends a row and returns its index.
    pub fn add_row<R>(&self, row: R) -> ModelResult<usize>
    where
        R: IntoIterator,
        R::Item: Into<CellValue>,
    {
        let row: Vec<CellValue> = row.into_iter().map(Into::into).collect();
        let _dispatch = self.gate.enter("add_row")?;
        self.check_shape(&row)?;

        let mut rows = self.rows.write();
        let index = rows.len();
        rows.push(row);
        drop(rows);

        table_trace!(index, "row added");
        self.signals.emit_row_added(index);
        Ok(index)
    }

    /// Inserts a row at `index`, which may equal the row count.
    pub fn insert_row<R>(&self, index: usize, row: R) -> ModelResult<()>
    where
        R: IntoIterator,
        R::Item: Into<CellValue>,
    {
        let row: Vec<CellValue> = row.into_iter().map(Into::into).collect();
        let _dispatch = self.gate.enter("insert_row")?;
        self.check_shape(&row)?;

        let mut rows = self.rows.write();
        if index > rows.len() {
            return Err(ModelError::insertion(index, rows.len()));
        }
        rows.insert(index, row);
        drop(rows);

        table_trace!(index, "row added");
        self.signals.emit_row_added(index);
        Ok(())
    }

    /// Removes the row at `index` and returns its values.
    ///
    /// `RemovingRow` is emitted first, while the row is still readable.
    pub fn remove_row(&self, index: usize) -> ModelResult<Vec<CellValue>> {
        let _dispatch = self.gate.enter("remove_row")?;
        ModelError::check_row(index, self.row_count())?;

        self.signals.emit_removing_row(index);
        let removed = self.rows.write().remove(index);

        table_trace!(index, "row removed");
        Ok(removed)
    }

    /// Relocates the row at `source` so that it ends up at `destination`.
    ///
    /// Does nothing if the two are equal.
    pub fn move_row(&self, source: usize, destination: usize) -> ModelResult<()> {
        let _dispatch = self.gate.enter("move_row")?;

        let mut rows = self.rows.write();
        ModelError::check_row(source, rows.len())?;
        ModelError::check_row(destination, rows.len())?;
        if source == destination {
            return Ok(());
        }
        let row = rows.remove(source);
        rows.insert(destination, row);
        drop(rows);

        table_trace!(source, destination, "row moved");
        self.signals.emit_row_moved(source, destination);
        Ok(())
    }

    fn check_shape(&self, row: &[CellValue]) -> ModelResult<()> {
        if row.len() == self.column_names.len() {
            Ok(())
        } else {
            Err(ModelError::invalid_argument(format!(
                "row has {} values, expected {}",
                row.len(),
                self.column_names.len()
            )))
        }
    }
}

impl TableModel for ArrayTableModel {
    fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    fn column_count(&self) -> usize {
        self.column_names.len()
    }

    fn column_name(&self, column: usize) -> ModelResult<&str> {
        self.column_names
            .get(column)
            .map(String::as_str)
            .ok_or_else(|| ModelError::column(column, self.column_names.len()))
    }

    fn value(&self, row: usize, column: usize) -> ModelResult<CellValue> {
        ModelError::check_column(column, self.column_names.len())?;
        let rows = self.rows.read();
        ModelError::check_row(row, rows.len())?;
        Ok(rows[row][column].clone())
    }

    fn signals(&self) -> &TableSignals {
        &self.signals
    }
}

static_assertions::assert_impl_all!(ArrayTableModel: Send, Sync);
