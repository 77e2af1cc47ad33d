//! Field values held by grid records.
//!
//! A [`FieldValue`] is the unit the engine reads for content, sorting, search
//! and change detection. It plays the role a loosely typed property bag would
//! play elsewhere, but with an explicit variant for values that must be
//! invoked to be read.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;

/// Type alias for an invocable field value.
///
/// Reading a computed field calls the function with no arguments.
pub type ComputedFn = Arc<dyn Fn() -> FieldValue + Send + Sync>;

/// A single value stored under a field name in a [`Record`](super::Record).
///
/// # Example
///
/// ```
/// use lattice_grid::model::FieldValue;
///
/// let age = FieldValue::from(30);
/// assert_eq!(age.to_display_string(), "30");
///
/// let lazy = FieldValue::computed(|| FieldValue::from("late"));
/// assert_eq!(lazy.resolve().as_str(), Some("late"));
/// ```
#[derive(Clone, Default)]
pub enum FieldValue {
    /// No value. Renders as an empty string.
    #[default]
    None,
    /// Text.
    String(String),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Date and time, without an attached zone.
    Date(NaiveDateTime),
    /// A value produced on read.
    Computed(ComputedFn),
}

impl FieldValue {
    /// Creates a computed value from a closure.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn() -> FieldValue + Send + Sync + 'static,
    {
        FieldValue::Computed(Arc::new(f))
    }

    /// Returns `true` if this is `FieldValue::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, FieldValue::None)
    }

    /// Returns `true` if this value must be invoked to be read.
    pub fn is_computed(&self) -> bool {
        matches!(self, FieldValue::Computed(_))
    }

    /// Returns the plain value, invoking a computed value once.
    ///
    /// A computed value that yields another computed value resolves to
    /// `None`; only one level of invocation is performed.
    pub fn resolve(&self) -> FieldValue {
        match self {
            FieldValue::Computed(f) => match f() {
                FieldValue::Computed(_) => FieldValue::None,
                value => value,
            },
            other => other.clone(),
        }
    }

    /// Attempts to get the value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as a float. Integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(n) => Some(*n),
            FieldValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Attempts to get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get the value as a date.
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Stringifies the value for display, invoking computed values.
    pub fn to_display_string(&self) -> String {
        match self.resolve() {
            FieldValue::None | FieldValue::Computed(_) => String::new(),
            FieldValue::String(s) => s,
            FieldValue::Int(n) => n.to_string(),
            FieldValue::Float(n) => n.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Date(d) => d.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }

    /// Text matched by free-text search, if this value takes part in it.
    ///
    /// Computed values and absent values are skipped.
    pub fn search_text(&self) -> Option<String> {
        match self {
            FieldValue::None | FieldValue::Computed(_) => None,
            other => Some(other.to_display_string()),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            FieldValue::None => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Int(_) | FieldValue::Float(_) => 2,
            FieldValue::Date(_) => 3,
            FieldValue::String(_) => 4,
            FieldValue::Computed(_) => 5,
        }
    }
}

/// Compares two field values for sorting.
///
/// Computed values are resolved first. Numbers compare numerically across
/// `Int` and `Float`, with NaN ordered by [`f64::total_cmp`]. Values of
/// different kinds order by kind, with absent values first, so a column with
/// gaps still sorts deterministically.
pub fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    let a = a.resolve();
    let b = b.resolve();
    match (&a, &b) {
        (FieldValue::String(sa), FieldValue::String(sb)) => sa.cmp(sb),
        (FieldValue::Int(ia), FieldValue::Int(ib)) => ia.cmp(ib),
        (FieldValue::Bool(ba), FieldValue::Bool(bb)) => ba.cmp(bb),
        (FieldValue::Date(da), FieldValue::Date(db)) => da.cmp(db),
        (FieldValue::Float(fa), FieldValue::Float(fb)) => fa.total_cmp(fb),
        (FieldValue::Int(i), FieldValue::Float(f)) => compare_int_float(*i, *f),
        (FieldValue::Float(f), FieldValue::Int(i)) => compare_int_float(*i, *f).reverse(),
        _ => a.type_rank().cmp(&b.type_rank()),
    }
}

/// Exact comparison of an integer with a float.
fn compare_int_float(i: i64, f: f64) -> Ordering {
    let widened = (i as f64).total_cmp(&f);
    if widened.is_ne() {
        return widened;
    }
    // `f` is integral here. 2^63 is the only such value outside i64.
    if f >= i64::MAX as f64 {
        return Ordering::Less;
    }
    i.cmp(&(f as i64))
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::None, FieldValue::None) => true,
            (FieldValue::String(a), FieldValue::String(b)) => a == b,
            (FieldValue::Int(a), FieldValue::Int(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => a.to_bits() == b.to_bits(),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::Date(a), FieldValue::Date(b)) => a == b,
            (FieldValue::Computed(a), FieldValue::Computed(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::None => write!(f, "None"),
            FieldValue::String(s) => f.debug_tuple("String").field(s).finish(),
            FieldValue::Int(n) => f.debug_tuple("Int").field(n).finish(),
            FieldValue::Float(n) => f.debug_tuple("Float").field(n).finish(),
            FieldValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            FieldValue::Date(d) => f.debug_tuple("Date").field(d).finish(),
            FieldValue::Computed(_) => write!(f, "Computed(..)"),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::String(s.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Int(n as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::Int(n as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Float(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(d: NaiveDateTime) -> Self {
        FieldValue::Date(d)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl From<&serde_json::Value> for FieldValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => FieldValue::None,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => n.as_f64().map(FieldValue::Float).unwrap_or_default(),
            },
            Value::String(s) => FieldValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => FieldValue::String(value.to_string()),
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        FieldValue::from(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_display_strings() {
        assert_eq!(FieldValue::None.to_display_string(), "");
        assert_eq!(FieldValue::from("Ann").to_display_string(), "Ann");
        assert_eq!(FieldValue::from(25).to_display_string(), "25");
        assert_eq!(FieldValue::from(2.5).to_display_string(), "2.5");
        assert_eq!(FieldValue::from(true).to_display_string(), "true");

        let date = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        assert_eq!(FieldValue::from(date).to_display_string(), "2024-03-09T14:05:00");
    }

    #[test]
    fn test_computed_resolves_once() {
        let value = FieldValue::computed(|| FieldValue::from(7));
        assert_eq!(value.resolve(), FieldValue::Int(7));
        assert_eq!(value.to_display_string(), "7");

        let nested = FieldValue::computed(|| FieldValue::computed(|| FieldValue::from(1)));
        assert!(nested.resolve().is_none());
    }

    #[test]
    fn test_computed_equality_is_by_reference() {
        let a = FieldValue::computed(|| FieldValue::None);
        let b = a.clone();
        let c = FieldValue::computed(|| FieldValue::None);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_compare_mixed_numbers() {
        assert_eq!(
            compare_values(&FieldValue::Int(2), &FieldValue::Float(2.5)),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&FieldValue::None, &FieldValue::from("a")),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&FieldValue::from("b"), &FieldValue::from("a")),
            Ordering::Greater
        );
    }

    #[test]
    fn test_nan_equals_itself() {
        assert_eq!(FieldValue::Float(f64::NAN), FieldValue::Float(f64::NAN));
        assert_ne!(FieldValue::Float(0.0), FieldValue::Float(f64::NAN));
    }

    #[test]
    fn test_compare_is_total_with_nan() {
        let nan = FieldValue::Float(f64::NAN);
        let one = FieldValue::Float(1.0);
        let two = FieldValue::Int(2);
        assert_eq!(compare_values(&nan, &nan), Ordering::Equal);
        assert_eq!(compare_values(&one, &nan), Ordering::Less);
        assert_eq!(compare_values(&two, &nan), Ordering::Less);
        assert_eq!(compare_values(&nan, &two), Ordering::Greater);
    }

    #[test]
    fn test_compare_large_ints_with_floats() {
        let big = 1i64 << 53;
        assert_eq!(
            compare_values(&FieldValue::Int(big + 1), &FieldValue::Float(big as f64)),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&FieldValue::Float(big as f64), &FieldValue::Int(big)),
            Ordering::Equal
        );
        assert_eq!(
            compare_values(&FieldValue::Int(i64::MAX), &FieldValue::Float(i64::MAX as f64)),
            Ordering::Less
        );
    }

    #[test]
    fn test_search_text_skips_computed() {
        assert_eq!(FieldValue::from(30).search_text(), Some("30".to_string()));
        assert_eq!(FieldValue::None.search_text(), None);
        assert_eq!(
            FieldValue::computed(|| FieldValue::from("x")).search_text(),
            None
        );
    }

    #[test]
    fn test_from_json() {
        let value = serde_json::json!({"n": 3, "f": 1.5, "s": "x", "b": false, "z": null});
        assert_eq!(FieldValue::from(&value["n"]), FieldValue::Int(3));
        assert_eq!(FieldValue::from(&value["f"]), FieldValue::Float(1.5));
        assert_eq!(FieldValue::from(&value["s"]), FieldValue::from("x"));
        assert_eq!(FieldValue::from(&value["b"]), FieldValue::Bool(false));
        assert!(FieldValue::from(&value["z"]).is_none());
    }
}
