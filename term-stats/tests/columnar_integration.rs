//! Arrow record batches through the adapter and the runner.

use arrow::array::{
    ArrayRef, Date32Array, Float64Array, Int32Array, StringArray, TimestampSecondArray,
};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;
use term_stats::columnar::{array_to_cells, cells_from_batch, runner_from_batch};
use term_stats::prelude::*;

fn survey_batch() -> RecordBatch {
    RecordBatch::try_from_iter(vec![
        (
            "income",
            Arc::new(Float64Array::from(vec![Some(1000.0), None, Some(3000.0), Some(2000.0)]))
                as ArrayRef,
        ),
        (
            "city",
            Arc::new(StringArray::from(vec![Some("Oslo"), Some("Lima"), None, Some("Oslo")]))
                as ArrayRef,
        ),
        (
            "visit",
            Arc::new(Date32Array::from(vec![Some(0), Some(1), Some(3), None])) as ArrayRef,
        ),
        (
            "weight",
            Arc::new(Int32Array::from(vec![1, 1, 2, 0])) as ArrayRef,
        ),
    ])
    .unwrap()
}

#[test]
fn test_float_column_with_nulls() {
    let batch = survey_batch();
    let cells = cells_from_batch(&batch, "income").unwrap();
    let variable = VariableDescriptor::new("income", VariableType::Numeric, MeasurementLevel::Scale);

    let stats = compute(&variable, &cells, None, &DescriptivesOptions::default())
        .unwrap()
        .stats;
    assert_eq!(stats.n, 4);
    assert_eq!(stats.valid, 3);
    assert_eq!(stats.mean(), Some(2000.0));
}

#[test]
fn test_timestamps_coerce_to_seconds() {
    let stamps = TimestampSecondArray::from(vec![0, 90]);
    let cells = array_to_cells(&stamps, "ts").unwrap();
    let variable = VariableDescriptor::new("ts", VariableType::DateTime, MeasurementLevel::Scale);

    let stats = compute(&variable, &cells, None, &DescriptivesOptions::default())
        .unwrap()
        .stats;
    assert_eq!(stats.range(), Some(90.0));
}

#[tokio::test]
async fn test_runner_from_batch_uses_weight_column() {
    let batch = survey_batch();
    let context = runner_from_batch(&batch, Some("weight"))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(context.len(), 3);
    assert!(context.report("weight").is_none());

    // income: rows 0 and 2 carry usable weights (1 and 2); row 1 is null, row 3 has weight 0.
    assert_eq!(
        context.get_metric("income.SumOfWeights"),
        Some(MetricValue::Double(3.0))
    );
    assert_eq!(
        context.get_metric("income.Mean"),
        Some(MetricValue::Double((1000.0 + 6000.0) / 3.0))
    );

    assert_eq!(
        context.get_metric("city.Valid"),
        Some(MetricValue::Long(2))
    );
    assert_eq!(
        context.get_metric("visit.Range"),
        Some(MetricValue::Double(3.0 * 86_400.0))
    );
}

#[test]
fn test_unknown_column_is_reported() {
    let err = cells_from_batch(&survey_batch(), "missing").unwrap_err();
    assert_eq!(err.to_string(), "Column 'missing' not found in record batch");
}
