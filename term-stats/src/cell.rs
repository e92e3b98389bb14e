//! Raw cell values as they arrive from a host dataset.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Text tokens that hosts use to spell a null cell.
const NULL_TOKENS: [&str; 2] = ["null", "undefined"];

/// Largest magnitude rendered without a fractional part.
const INTEGER_RENDER_LIMIT: f64 = 1e15;

/// A single heterogeneous cell of a raw column.
///
/// Columns arrive from hosts that do not enforce a storage type, so a numeric
/// variable may carry text cells and a string variable may carry numbers. An empty
/// cell is `Text("")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// A numeric cell.
    Number(f64),
    /// A text cell, possibly numeric-looking or a date string.
    Text(String),
    /// A null / undefined cell.
    Null,
}

impl Cell {
    /// Returns true for a null cell.
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Returns true for null, empty or whitespace-only text, and the host's
    /// spelled-out null tokens.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Number(_) => false,
            Cell::Text(s) => {
                let trimmed = s.trim();
                trimmed.is_empty() || NULL_TOKENS.contains(&trimmed)
            }
        }
    }

    /// Returns the text form used for string-equality comparisons.
    ///
    /// Integral numbers render without a fractional part, so `Number(99.0)` compares
    /// equal to the literal `"99"`.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Cell::Number(x) => Cow::Owned(format_number(*x)),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Null => Cow::Borrowed(""),
        }
    }

    /// Parses the cell as a finite floating-point number.
    ///
    /// Returns `None` for null cells, empty text, non-finite values and anything that
    /// does not parse as a decimal float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(x) if x.is_finite() => Some(*x),
            Cell::Number(_) | Cell::Null => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|x| x.is_finite())
            }
        }
    }

    /// Returns true if the cell holds NaN, either directly or as text.
    pub fn is_nan(&self) -> bool {
        match self {
            Cell::Number(x) => x.is_nan(),
            Cell::Text(s) => s.trim().eq_ignore_ascii_case("nan"),
            Cell::Null => false,
        }
    }
}

/// Renders a number the way a host would print it.
pub fn format_number(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < INTEGER_RENDER_LIMIT {
        format!("{}", x as i64)
    } else {
        format!("{x}")
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell::Number(f64::from(value))
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

/// Builds a column of cells from anything convertible into [`Cell`].
pub fn column<I, T>(values: I) -> Vec<Cell>
where
    I: IntoIterator<Item = T>,
    T: Into<Cell>,
{
    values.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_detection() {
        assert!(Cell::Null.is_blank());
        assert!(Cell::from("").is_blank());
        assert!(Cell::from("   ").is_blank());
        assert!(Cell::from("null").is_blank());
        assert!(Cell::from("undefined").is_blank());
        assert!(!Cell::from("a").is_blank());
        assert!(!Cell::from(0.0).is_blank());
    }

    #[test]
    fn test_numeric_parsing() {
        assert_eq!(Cell::from("3.5").as_f64(), Some(3.5));
        assert_eq!(Cell::from(" 42 ").as_f64(), Some(42.0));
        assert_eq!(Cell::from("1e3").as_f64(), Some(1000.0));
        assert_eq!(Cell::from("").as_f64(), None);
        assert_eq!(Cell::from("abc").as_f64(), None);
        assert_eq!(Cell::from("inf").as_f64(), None);
        assert_eq!(Cell::from("NaN").as_f64(), None);
        assert_eq!(Cell::Number(f64::NAN).as_f64(), None);
        assert_eq!(Cell::Number(f64::INFINITY).as_f64(), None);
        assert_eq!(Cell::Null.as_f64(), None);
    }

    #[test]
    fn test_text_form() {
        assert_eq!(Cell::from(99.0).text(), "99");
        assert_eq!(Cell::from(-3.0).text(), "-3");
        assert_eq!(Cell::from(0.25).text(), "0.25");
        assert_eq!(Cell::from("b").text(), "b");
        assert_eq!(Cell::Null.text(), "");
    }

    #[test]
    fn test_json_round_trip_shapes() {
        let cells: Vec<Cell> = serde_json::from_str(r#"[1, "a", null, ""]"#).unwrap();
        assert_eq!(
            cells,
            vec![
                Cell::Number(1.0),
                Cell::from("a"),
                Cell::Null,
                Cell::from("")
            ]
        );
    }

    #[test]
    fn test_column_helper() {
        let cells = column([Some(1.0), None, Some(2.5)]);
        assert_eq!(cells, vec![Cell::Number(1.0), Cell::Null, Cell::Number(2.5)]);
    }
}
