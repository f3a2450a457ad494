//! Sort keys and column orders for sorted views.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use horizon_table_core::{ModelError, ModelResult};

/// Direction of a single sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// Applies the direction to an ascending ordering.
    #[inline]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    /// Returns the opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// One `(column, direction)` entry of a [`ColumnOrder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    /// Column index.
    pub column: usize,
    /// Direction for this column.
    pub direction: SortDirection,
}

impl SortKey {
    /// An ascending key on `column`.
    pub fn ascending(column: usize) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    /// A descending key on `column`.
    pub fn descending(column: usize) -> Self {
        Self {
            column,
            direction: SortDirection::Descending,
        }
    }
}

/// An ordered list of sort keys.
///
/// Rows are compared key by key; the first key whose cells differ decides.
/// A sorted view completes its order so that every column takes part:
/// columns missing from the explicit list are appended ascending, in
/// increasing index order.
///
/// Column orders serialize as a plain list of keys so applications can keep
/// a view's sort state in their settings.
///
/// # Example
///
/// ```
/// use horizon_table::model::{ColumnOrder, SortDirection, SortKey};
///
/// let order = ColumnOrder::new().then(2, SortDirection::Descending);
/// let complete = order.complete(4).unwrap();
/// assert_eq!(
///     complete.keys(),
///     &[
///         SortKey::descending(2),
///         SortKey::ascending(0),
///         SortKey::ascending(1),
///         SortKey::ascending(3),
///     ]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnOrder {
    keys: Vec<SortKey>,
}

impl ColumnOrder {
    /// An empty order. Completed, it sorts every column ascending.
    pub fn new() -> Self {
        Self::default()
    }

    /// An order built from explicit keys.
    pub fn from_keys(keys: impl IntoIterator<Item = SortKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Appends a key.
    pub fn then(mut self, column: usize, direction: SortDirection) -> Self {
        self.keys.push(SortKey { column, direction });
        self
    }

    /// The keys, in priority order.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Direction of `column`, if it has a key.
    pub fn direction_of(&self, column: usize) -> Option<SortDirection> {
        self.keys
            .iter()
            .find(|key| key.column == column)
            .map(|key| key.direction)
    }

    /// Checks every column index against `column_count` and rejects
    /// duplicates.
    pub fn validate(&self, column_count: usize) -> ModelResult<()> {
        let mut seen = vec![false; column_count];
        for key in &self.keys {
            ModelError::check_column(key.column, column_count)?;
            if std::mem::replace(&mut seen[key.column], true) {
                return Err(ModelError::invalid_argument(format!(
                    "column {} appears more than once in the sort order",
                    key.column
                )));
            }
        }
        Ok(())
    }

    /// Validates the order and appends every missing column ascending.
    pub fn complete(&self, column_count: usize) -> ModelResult<ColumnOrder> {
        self.validate(column_count)?;
        let mut keys = self.keys.clone();
        keys.extend(
            (0..column_count)
                .filter(|&column| self.direction_of(column).is_none())
                .map(SortKey::ascending),
        );
        Ok(ColumnOrder { keys })
    }
}

impl FromIterator<SortKey> for ColumnOrder {
    fn from_iter<T: IntoIterator<Item = SortKey>>(iter: T) -> Self {
        Self::from_keys(iter)
    }
}

impl<'a> IntoIterator for &'a ColumnOrder {
    type Item = &'a SortKey;
    type IntoIter = std::slice::Iter<'a, SortKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}
