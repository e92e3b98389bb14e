//! Arrow adapter: turns Arrow columns into engine cells and derives default variable
//! descriptors from a schema.
//!
//! Temporal arrays are rendered as ISO-8601 text so they go through the same date
//! coercion as host-supplied date strings.

use arrow::array::{
    Array, BooleanArray, Date32Array, Date64Array, Float32Array, Float64Array, Int16Array,
    Int32Array, Int64Array, Int8Array, LargeStringArray, StringArray, TimestampMicrosecondArray,
    TimestampMillisecondArray, TimestampNanosecondArray, TimestampSecondArray, UInt16Array,
    UInt32Array, UInt64Array, UInt8Array,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use arrow::temporal_conversions::{
    date32_to_datetime, date64_to_datetime, timestamp_ms_to_datetime, timestamp_ns_to_datetime,
    timestamp_s_to_datetime, timestamp_us_to_datetime,
};
use chrono::{NaiveDateTime, Timelike};
use tracing::{debug, instrument};

use crate::cell::Cell;
use crate::error::{StatsError, StatsResult};
use crate::runner::DescriptivesRunner;
use crate::variable::{MeasurementLevel, VariableDescriptor, VariableType};

fn downcast<'a, T: Array + 'static>(array: &'a dyn Array, column: &str) -> StatsResult<&'a T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| StatsError::unsupported_arrow_type(column, array.data_type()))
}

/// Maps every slot of `array` through `value`, with Arrow nulls becoming
/// [`Cell::Null`].
fn collect_cells<A: Array>(array: &A, value: impl Fn(usize) -> Cell) -> Vec<Cell> {
    (0..array.len())
        .map(|i| if array.is_null(i) { Cell::Null } else { value(i) })
        .collect()
}

macro_rules! numeric_cells {
    ($array:expr, $column:expr, $ty:ty) => {{
        let array = downcast::<$ty>($array, $column)?;
        collect_cells(array, |i| Cell::Number(array.value(i) as f64))
    }};
}

macro_rules! temporal_cells {
    ($array:expr, $column:expr, $ty:ty, $convert:expr, $render:expr) => {{
        let array = downcast::<$ty>($array, $column)?;
        collect_cells(array, |i| match $convert(array.value(i)) {
            Some(datetime) => Cell::Text($render(datetime)),
            None => Cell::Null,
        })
    }};
}

fn render_date(datetime: NaiveDateTime) -> String {
    datetime.format("%Y-%m-%d").to_string()
}

fn render_datetime(datetime: NaiveDateTime) -> String {
    let mut text = datetime.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = datetime.nanosecond();
    if nanos > 0 {
        text.push_str(&format!(".{nanos:09}"));
    }
    text
}

/// Converts an Arrow array into cells. `column` only labels errors.
///
/// # Errors
///
/// [`StatsError::UnsupportedArrowType`] for nested, binary, decimal and other types
/// without a cell representation.
pub fn array_to_cells(array: &dyn Array, column: &str) -> StatsResult<Vec<Cell>> {
    let cells = match array.data_type() {
        DataType::Utf8 => {
            let array = downcast::<StringArray>(array, column)?;
            collect_cells(array, |i| Cell::Text(array.value(i).to_string()))
        }
        DataType::LargeUtf8 => {
            let array = downcast::<LargeStringArray>(array, column)?;
            collect_cells(array, |i| Cell::Text(array.value(i).to_string()))
        }
        DataType::Boolean => {
            let array = downcast::<BooleanArray>(array, column)?;
            collect_cells(array, |i| Cell::Number(if array.value(i) { 1.0 } else { 0.0 }))
        }
        DataType::Int8 => numeric_cells!(array, column, Int8Array),
        DataType::Int16 => numeric_cells!(array, column, Int16Array),
        DataType::Int32 => numeric_cells!(array, column, Int32Array),
        DataType::Int64 => numeric_cells!(array, column, Int64Array),
        DataType::UInt8 => numeric_cells!(array, column, UInt8Array),
        DataType::UInt16 => numeric_cells!(array, column, UInt16Array),
        DataType::UInt32 => numeric_cells!(array, column, UInt32Array),
        DataType::UInt64 => numeric_cells!(array, column, UInt64Array),
        DataType::Float32 => numeric_cells!(array, column, Float32Array),
        DataType::Float64 => numeric_cells!(array, column, Float64Array),
        DataType::Date32 => {
            temporal_cells!(array, column, Date32Array, date32_to_datetime, render_date)
        }
        DataType::Date64 => {
            temporal_cells!(array, column, Date64Array, date64_to_datetime, render_date)
        }
        DataType::Timestamp(TimeUnit::Second, _) => temporal_cells!(
            array,
            column,
            TimestampSecondArray,
            timestamp_s_to_datetime,
            render_datetime
        ),
        DataType::Timestamp(TimeUnit::Millisecond, _) => temporal_cells!(
            array,
            column,
            TimestampMillisecondArray,
            timestamp_ms_to_datetime,
            render_datetime
        ),
        DataType::Timestamp(TimeUnit::Microsecond, _) => temporal_cells!(
            array,
            column,
            TimestampMicrosecondArray,
            timestamp_us_to_datetime,
            render_datetime
        ),
        DataType::Timestamp(TimeUnit::Nanosecond, _) => temporal_cells!(
            array,
            column,
            TimestampNanosecondArray,
            timestamp_ns_to_datetime,
            render_datetime
        ),
        other => return Err(StatsError::unsupported_arrow_type(column, other)),
    };
    Ok(cells)
}

/// Derives the default descriptor for an Arrow field.
///
/// Numbers are scale, strings and booleans nominal, dates and timestamps scale.
pub fn descriptor_from_field(field: &Field) -> StatsResult<VariableDescriptor> {
    let (var_type, measure) = match field.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => (VariableType::String, MeasurementLevel::Nominal),
        DataType::Boolean => (VariableType::Numeric, MeasurementLevel::Nominal),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64 => (VariableType::Numeric, MeasurementLevel::Scale),
        DataType::Date32 | DataType::Date64 => (VariableType::Date, MeasurementLevel::Scale),
        DataType::Timestamp(_, _) => (VariableType::DateTime, MeasurementLevel::Scale),
        other => return Err(StatsError::unsupported_arrow_type(field.name(), other)),
    };
    Ok(VariableDescriptor::new(field.name(), var_type, measure))
}

/// Default descriptors for every field of a schema.
pub fn descriptors_from_schema(schema: &Schema) -> StatsResult<Vec<VariableDescriptor>> {
    schema
        .fields()
        .iter()
        .map(|field| descriptor_from_field(field))
        .collect()
}

/// Converts one named column of a record batch into cells.
pub fn cells_from_batch(batch: &RecordBatch, column: &str) -> StatsResult<Vec<Cell>> {
    let index = batch
        .schema()
        .index_of(column)
        .map_err(|_| StatsError::ColumnNotFound {
            column: column.to_string(),
        })?;
    array_to_cells(batch.column(index).as_ref(), column)
}

/// Builds a runner over every column of `batch` with default descriptors. The
/// optional weight column is used as case weights and not described itself.
#[instrument(skip(batch), fields(columns = batch.num_columns(), rows = batch.num_rows()))]
pub fn runner_from_batch(
    batch: &RecordBatch,
    weight_column: Option<&str>,
) -> StatsResult<DescriptivesRunner> {
    let mut runner = DescriptivesRunner::new();

    if let Some(weight_column) = weight_column {
        runner = runner.weights(cells_from_batch(batch, weight_column)?);
    }

    let schema = batch.schema();
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        if Some(field.name().as_str()) == weight_column {
            continue;
        }
        let descriptor = descriptor_from_field(field)?;
        debug!(column = %field.name(), var_type = ?descriptor.var_type, "Registered column");
        runner = runner.add(descriptor, array_to_cells(array.as_ref(), field.name())?);
    }

    Ok(runner)
}
