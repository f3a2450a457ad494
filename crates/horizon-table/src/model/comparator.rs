//! Cell comparators used by sorted views.

use std::cmp::Ordering;
use std::fmt;

use horizon_table_core::{ModelError, ModelResult};

use super::value::CellValue;

/// Orders two cell values.
///
/// A comparator returns `Unsupported` for values it cannot order. Closures
/// with the matching signature implement this trait.
///
/// # Example
///
/// ```
/// use std::cmp::Ordering;
/// use horizon_table::model::{CellValue, Comparator};
/// use horizon_table_core::{ModelError, ModelResult};
///
/// // Orders strings by length only.
/// let by_length = |a: &CellValue, b: &CellValue| -> ModelResult<Ordering> {
///     match (a.as_str(), b.as_str()) {
///         (Some(a), Some(b)) => Ok(a.len().cmp(&b.len())),
///         _ => Err(ModelError::unsupported("expected strings")),
///     }
/// };
/// assert_eq!(
///     by_length.compare(&"ccc".into(), &"a".into()),
///     Ok(Ordering::Greater)
/// );
/// ```
pub trait Comparator: Send + Sync {
    /// Compares `a` with `b`.
    fn compare(&self, a: &CellValue, b: &CellValue) -> ModelResult<Ordering>;
}

impl<F> Comparator for F
where
    F: Fn(&CellValue, &CellValue) -> ModelResult<Ordering> + Send + Sync,
{
    fn compare(&self, a: &CellValue, b: &CellValue) -> ModelResult<Ordering> {
        self(a, b)
    }
}

/// The comparator used when none is supplied.
///
/// - `Int` and `Float` cells compare numerically and exactly, mixed pairs
///   included. Floats use the IEEE 754 total order with both zeros equal, so
///   `NaN` sorts after every number.
/// - `String` cells compare by locale collation when the `localization`
///   feature is enabled, and case-insensitively (ties broken by code point)
///   otherwise.
/// - Every other pairing is `Unsupported`.
pub struct DefaultComparator {
    #[cfg(feature = "localization")]
    collator: Option<icu::collator::CollatorBorrowed<'static>>,
}

impl DefaultComparator {
    /// Creates a comparator for the system locale.
    #[cfg(feature = "localization")]
    pub fn new() -> Self {
        let locale = sys_locale::get_locale().unwrap_or_else(|| "en-US".to_string());
        Self::with_locale(&locale)
    }

    /// Creates a comparator that orders strings without locale data.
    #[cfg(not(feature = "localization"))]
    pub fn new() -> Self {
        Self {}
    }

    /// Creates a comparator that collates strings for `locale`, a BCP 47
    /// identifier such as `"sv-SE"`.
    ///
    /// Falls back to the locale-independent ordering if the locale cannot be
    /// parsed or has no collation data.
    #[cfg(feature = "localization")]
    pub fn with_locale(locale: &str) -> Self {
        use icu::collator::Collator;
        use icu::locale::Locale;

        let collator = locale
            .parse::<Locale>()
            .ok()
            .and_then(|locale| Collator::try_new(locale.into(), Default::default()).ok());
        if collator.is_none() {
            tracing::debug!(
                target: horizon_table_core::logging::targets::SORT,
                locale,
                "no collation data, using fallback string order"
            );
        }
        Self { collator }
    }

    /// Compares two strings the way this comparator orders `String` cells.
    pub fn compare_strings(&self, a: &str, b: &str) -> Ordering {
        #[cfg(feature = "localization")]
        if let Some(collator) = &self.collator {
            return collator.compare(a, b);
        }
        fallback_string_order(a, b)
    }
}

fn fallback_string_order(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

impl Default for DefaultComparator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DefaultComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultComparator").finish_non_exhaustive()
    }
}

impl Comparator for DefaultComparator {
    fn compare(&self, a: &CellValue, b: &CellValue) -> ModelResult<Ordering> {
        match (a, b) {
            (CellValue::Int(a), CellValue::Int(b)) => Ok(a.cmp(b)),
            (CellValue::Float(a), CellValue::Float(b)) => Ok(compare_floats(*a, *b)),
            (CellValue::Int(a), CellValue::Float(b)) => Ok(compare_int_float(*a, *b)),
            (CellValue::Float(a), CellValue::Int(b)) => Ok(compare_int_float(*b, *a).reverse()),
            (CellValue::String(a), CellValue::String(b)) => Ok(self.compare_strings(a, b)),
            _ => Err(ModelError::unsupported(format!(
                "cannot compare {} with {}",
                a.kind(),
                b.kind()
            ))),
        }
    }
}

/// IEEE 754 total order, except that `-0.0` and `0.0` are equal.
fn compare_floats(a: f64, b: f64) -> Ordering {
    if a == b {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

/// Exact comparison of an integer with a float.
///
/// `NaN` sorts after every number when positive and before every number when
/// negative, matching [`compare_floats`].
fn compare_int_float(int: i64, float: f64) -> Ordering {
    if float.is_nan() {
        return if float.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    // Rounding is monotonic, so a strict result is exact. Equality means the
    // float is integral with magnitude at most 2^63.
    match (int as f64).partial_cmp(&float) {
        Some(Ordering::Equal) | None => i128::from(int).cmp(&(float as i128)),
        Some(ordering) => ordering,
    }
}
