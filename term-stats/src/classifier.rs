//! Per-cell value classification: missingness, numeric interpretability and date
//! coercion.
//!
//! Every function here is a pure function of its arguments. The engine calls them once
//! per cell and never caches the results.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::cell::Cell;
use crate::variable::{MissingSpec, VariableDescriptor, VariableType};

/// Seconds in one calendar day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Reference epoch for date coercion: the first day of the Gregorian calendar,
/// 1582-10-14, as used by SPSS.
pub const EPOCH_YMD: (i32, u32, u32) = (1582, 10, 14);

/// The outcome of classifying one cell for numeric accumulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellClass {
    /// Null, blank, NaN or matched by the user-defined missing specification.
    Missing,
    /// Present but not interpretable as a number.
    NonNumeric,
    /// A usable numeric value (date cells already coerced to seconds).
    Value(f64),
}

impl CellClass {
    /// Returns the numeric value, if any.
    pub fn value(self) -> Option<f64> {
        match self {
            CellClass::Value(x) => Some(x),
            CellClass::Missing | CellClass::NonNumeric => None,
        }
    }
}

/// Returns true if the cell counts as missing.
///
/// Null and blank cells are always missing. NaN is missing only when the cell is
/// being read as a number. Beyond that the active [`MissingSpec`] variant decides:
/// discrete literals match by text form, ranges match numeric values inclusively, and
/// a non-numeric cell never falls inside a range.
pub fn is_missing(cell: &Cell, spec: &MissingSpec, numeric_context: bool) -> bool {
    if cell.is_blank() {
        return true;
    }
    if numeric_context && cell.is_nan() {
        return true;
    }

    match spec {
        MissingSpec::None => false,
        MissingSpec::Discrete { values } => matches_discrete(cell, values),
        MissingSpec::Range { low, high } => matches_range(cell, *low, *high),
        MissingSpec::RangeDiscrete { values, low, high } => {
            matches_discrete(cell, values) || matches_range(cell, *low, *high)
        }
    }
}

/// Returns true only for cells that parse to a finite floating-point number.
pub fn is_numeric(cell: &Cell) -> bool {
    cell.as_f64().is_some()
}

/// Returns the value the accumulator sees for this cell, coercing date strings to
/// seconds for temporal variables.
pub fn numeric_value(cell: &Cell, var_type: VariableType) -> Option<f64> {
    if var_type.is_temporal() {
        match cell {
            Cell::Text(s) => date_to_seconds(s),
            Cell::Number(_) | Cell::Null => cell.as_f64(),
        }
    } else {
        cell.as_f64()
    }
}

/// Classifies a cell for numeric accumulation under the variable's metadata.
pub fn classify(cell: &Cell, variable: &VariableDescriptor) -> CellClass {
    if is_missing(cell, &variable.missing, true) {
        return CellClass::Missing;
    }
    match numeric_value(cell, variable.var_type) {
        Some(x) => CellClass::Value(x),
        None => CellClass::NonNumeric,
    }
}

/// Parses a case weight. Non-numeric and non-positive weights exclude the row.
pub fn weight_value(cell: &Cell) -> Option<f64> {
    cell.as_f64().filter(|w| *w > 0.0)
}

fn matches_discrete(cell: &Cell, values: &[String]) -> bool {
    let text = cell.text();
    let text = text.trim();
    values.iter().any(|v| v == text)
}

fn matches_range(cell: &Cell, low: f64, high: f64) -> bool {
    cell.as_f64().is_some_and(|x| x >= low && x <= high)
}

/// Date layouts recognised by [`date_to_seconds`].
struct DatePatterns {
    iso: Regex,
    us: Regex,
    eu: Regex,
    spss: Regex,
}

impl DatePatterns {
    fn new() -> Self {
        Self {
            iso: Regex::new(
                r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[T ](\d{1,2}):(\d{2})(?::(\d{2})(\.\d+)?)?)?$",
            )
            .unwrap(),
            us: Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap(),
            eu: Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$").unwrap(),
            spss: Regex::new(r"^(?i)(\d{1,2})-([a-z]{3})-(\d{4})$").unwrap(),
        }
    }
}

static DATE_PATTERNS: Lazy<DatePatterns> = Lazy::new(DatePatterns::new);

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Converts a date or datetime string to seconds since 1582-10-14 00:00:00.
///
/// Accepts `YYYY-MM-DD` with an optional `[T ]HH:MM[:SS[.fff]]` suffix,
/// `MM/DD/YYYY`, `DD.MM.YYYY` and `DD-MMM-YYYY`. Dates exactly one calendar day
/// apart differ by exactly [`SECONDS_PER_DAY`]. Returns `None` for anything that is
/// not a valid calendar date.
pub fn date_to_seconds(text: &str) -> Option<f64> {
    let text = text.trim();
    let patterns = &*DATE_PATTERNS;

    if let Some(caps) = patterns.iso.captures(text) {
        let date = ymd(&caps[1], &caps[2], &caps[3])?;
        let hour = caps.get(4).map_or(Some(0), |m| m.as_str().parse().ok())?;
        let minute = caps.get(5).map_or(Some(0), |m| m.as_str().parse().ok())?;
        let second = caps.get(6).map_or(Some(0), |m| m.as_str().parse().ok())?;
        let fraction = match caps.get(7) {
            Some(m) => format!("0{}", m.as_str()).parse::<f64>().ok()?,
            None => 0.0,
        };
        let time = NaiveTime::from_hms_opt(hour, minute, second)?;
        return seconds_since_epoch(date.and_time(time)).map(|s| s + fraction);
    }

    let date = if let Some(caps) = patterns.us.captures(text) {
        ymd(&caps[3], &caps[1], &caps[2])?
    } else if let Some(caps) = patterns.eu.captures(text) {
        ymd(&caps[3], &caps[2], &caps[1])?
    } else if let Some(caps) = patterns.spss.captures(text) {
        let month_name = caps[2].to_ascii_lowercase();
        let month = MONTHS.iter().position(|m| *m == month_name)? + 1;
        NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month as u32, caps[1].parse().ok()?)?
    } else {
        return None;
    };

    seconds_since_epoch(date.and_time(NaiveTime::from_hms_opt(0, 0, 0)?))
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn seconds_since_epoch(moment: NaiveDateTime) -> Option<f64> {
    let (y, m, d) = EPOCH_YMD;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?.and_time(NaiveTime::from_hms_opt(0, 0, 0)?);
    Some(moment.signed_duration_since(epoch).num_seconds() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::MeasurementLevel;

    #[test]
    fn test_blank_and_null_always_missing() {
        for cell in [Cell::Null, Cell::from(""), Cell::from("null")] {
            assert!(is_missing(&cell, &MissingSpec::None, false));
            assert!(is_missing(&cell, &MissingSpec::None, true));
        }
    }

    #[test]
    fn test_nan_missing_only_in_numeric_context() {
        let nan = Cell::Number(f64::NAN);
        assert!(is_missing(&nan, &MissingSpec::None, true));
        assert!(!is_missing(&nan, &MissingSpec::None, false));
        assert!(is_missing(&Cell::from("NaN"), &MissingSpec::None, true));
    }

    #[test]
    fn test_discrete_matches_by_text() {
        let spec = MissingSpec::discrete(["99", "refused"]);
        assert!(is_missing(&Cell::from(99.0), &spec, true));
        assert!(is_missing(&Cell::from("99"), &spec, true));
        assert!(is_missing(&Cell::from("refused"), &spec, false));
        assert!(!is_missing(&Cell::from(98.0), &spec, true));
    }

    #[test]
    fn test_range_is_inclusive_and_numeric_only() {
        let spec = MissingSpec::range(90.0, 99.0);
        assert!(is_missing(&Cell::from(90.0), &spec, true));
        assert!(is_missing(&Cell::from("99"), &spec, true));
        assert!(!is_missing(&Cell::from(89.5), &spec, true));
        assert!(!is_missing(&Cell::from("ninety"), &spec, true));
    }

    #[test]
    fn test_range_discrete_matches_either_rule() {
        let spec = MissingSpec::range_discrete(["n/a"], 0.0, 1.0);
        assert!(is_missing(&Cell::from("n/a"), &spec, true));
        assert!(is_missing(&Cell::from(0.5), &spec, true));
        assert!(!is_missing(&Cell::from(2.0), &spec, true));
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric(&Cell::from("12.5")));
        assert!(is_numeric(&Cell::from(3.0)));
        assert!(!is_numeric(&Cell::from("")));
        assert!(!is_numeric(&Cell::from("x")));
    }

    #[test]
    fn test_date_one_day_apart() {
        let a = date_to_seconds("2020-02-28").unwrap();
        let b = date_to_seconds("2020-02-29").unwrap();
        assert_eq!(b - a, SECONDS_PER_DAY);
    }

    #[test]
    fn test_epoch_is_zero() {
        assert_eq!(date_to_seconds("1582-10-14"), Some(0.0));
        assert_eq!(date_to_seconds("14-OCT-1582"), Some(0.0));
        assert_eq!(date_to_seconds("1582-10-15"), Some(SECONDS_PER_DAY));
    }

    #[test]
    fn test_date_layouts_agree() {
        let iso = date_to_seconds("2021-07-04");
        assert!(iso.is_some());
        assert_eq!(date_to_seconds("07/04/2021"), iso);
        assert_eq!(date_to_seconds("04.07.2021"), iso);
        assert_eq!(date_to_seconds("04-jul-2021"), iso);
    }

    #[test]
    fn test_datetime_with_time_of_day() {
        let midnight = date_to_seconds("2021-07-04").unwrap();
        let later = date_to_seconds("2021-07-04 06:30:15").unwrap();
        assert_eq!(later - midnight, 6.0 * 3600.0 + 30.0 * 60.0 + 15.0);
        let fractional = date_to_seconds("2021-07-04T00:00:01.5").unwrap();
        assert_eq!(fractional - midnight, 1.5);
    }

    #[test]
    fn test_invalid_dates() {
        assert_eq!(date_to_seconds("2021-02-30"), None);
        assert_eq!(date_to_seconds("13/01/2021"), None);
        assert_eq!(date_to_seconds("yesterday"), None);
        assert_eq!(date_to_seconds(""), None);
    }

    #[test]
    fn test_classify_date_variable() {
        let variable =
            VariableDescriptor::new("visit", VariableType::Date, MeasurementLevel::Scale);
        assert_eq!(
            classify(&Cell::from("1582-10-15"), &variable),
            CellClass::Value(SECONDS_PER_DAY)
        );
        assert_eq!(
            classify(&Cell::from("not a date"), &variable),
            CellClass::NonNumeric
        );
        assert_eq!(classify(&Cell::Null, &variable), CellClass::Missing);
    }

    #[test]
    fn test_weight_value() {
        assert_eq!(weight_value(&Cell::from(2.0)), Some(2.0));
        assert_eq!(weight_value(&Cell::from(0.0)), None);
        assert_eq!(weight_value(&Cell::from(-1.0)), None);
        assert_eq!(weight_value(&Cell::from("heavy")), None);
    }
}
