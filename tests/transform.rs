//! Tests for the built-in transformer set.

use tabflow::testing::*;
use tabflow::{
    AggFn, Aggregation, Chunk, DataType, DropBelowThreshold, DropIncomplete, FilterOp,
    FilterRows, FilterValue, GroupByAggregate, ImputeNumeric, ImputeText, NormalizeText,
    NumericStrategy, SelectColumns, TabflowError, TextStrategy, Transformer, Value,
};

// ---- DropIncomplete ----

#[test]
fn drop_incomplete_keeps_complete_rows_only() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("A", vec![Some(1), Some(2), None])
        .with_texts("B", vec![Some("a"), Some("b"), Some("c")])
        .build();

    let out = DropIncomplete.transform(chunk)?;

    let expected = ChunkBuilder::new()
        .with_ints("A", vec![Some(1), Some(2)])
        .with_texts("B", vec![Some("a"), Some("b")])
        .build();
    assert_chunks_equal(&out, &expected);
    Ok(())
}

#[test]
fn drop_incomplete_passes_complete_chunks_through() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("A", vec![Some(1), Some(2), Some(3)])
        .with_texts("B", vec![Some("a"), Some("b"), Some("c")])
        .build();

    let out = DropIncomplete.transform(chunk.clone())?;
    assert_chunks_equal(&out, &chunk);
    Ok(())
}

#[test]
fn drop_incomplete_can_empty_a_chunk() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("A", vec![None, None])
        .with_texts("B", vec![Some("a"), None])
        .build();

    let out = DropIncomplete.transform(chunk)?;
    assert_eq!(out.num_rows(), 0);
    assert_schema(&out, &["A", "B"]);
    Ok(())
}

#[test]
fn drop_incomplete_is_idempotent() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("A", vec![Some(1), None, Some(3)])
        .with_texts("B", vec![Some("a"), None, None])
        .build();

    let once = DropIncomplete.transform(chunk)?;
    let twice = DropIncomplete.transform(once.clone())?;
    assert_chunks_equal(&twice, &once);
    Ok(())
}

// ---- DropBelowThreshold ----

#[test]
fn threshold_one_equals_drop_incomplete() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("A", vec![Some(1), None, Some(3)])
        .with_texts("B", vec![Some("a"), Some("b"), None])
        .build();

    let strict = DropBelowThreshold::new(1.0)?.transform(chunk.clone())?;
    let dropped = DropIncomplete.transform(chunk)?;
    assert_chunks_equal(&strict, &dropped);
    Ok(())
}

#[test]
fn threshold_half_keeps_partially_complete_rows() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("A", vec![Some(1), None, None])
        .with_texts("B", vec![Some("a"), None, Some("c")])
        .build();

    let out = DropBelowThreshold::new(0.5)?.transform(chunk)?;

    let expected = ChunkBuilder::new()
        .with_ints("A", vec![Some(1), None])
        .with_texts("B", vec![Some("a"), Some("c")])
        .build();
    assert_chunks_equal(&out, &expected);
    Ok(())
}

#[test]
fn threshold_zero_keeps_everything() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("A", vec![None, None])
        .with_texts("B", vec![None, None])
        .build();

    let out = DropBelowThreshold::new(0.0)?.transform(chunk.clone())?;
    assert_chunks_equal(&out, &chunk);
    Ok(())
}

#[test]
fn threshold_half_across_four_columns() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("A", vec![Some(1), None, Some(3)])
        .with_texts("B", vec![Some("a"), Some("b"), None])
        .with_ints("C", vec![None, Some(2), None])
        .with_ints("D", vec![Some(9), None, Some(30)])
        .build();

    // every row has at least 2 of 4 cells present
    let out = DropBelowThreshold::new(0.5)?.transform(chunk.clone())?;
    assert_chunks_equal(&out, &chunk);
    Ok(())
}

#[test]
fn out_of_range_threshold_is_invalid_configuration() {
    assert!(matches!(
        DropBelowThreshold::new(1.5),
        Err(TabflowError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        DropBelowThreshold::new(-0.1),
        Err(TabflowError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        DropBelowThreshold::new(f64::NAN),
        Err(TabflowError::InvalidConfiguration(_))
    ));
}

// ---- NormalizeText ----

#[test]
fn normalize_trims_and_lowercases_text_columns() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_texts("A", vec![Some("  HELLO  "), Some("  World  "), Some("TeSt  ")])
        .with_ints("B", vec![Some(1), Some(2), Some(3)])
        .build();

    let out = NormalizeText.transform(chunk)?;

    let expected = ChunkBuilder::new()
        .with_texts("A", vec![Some("hello"), Some("world"), Some("test")])
        .with_ints("B", vec![Some(1), Some(2), Some(3)])
        .build();
    assert_chunks_equal(&out, &expected);
    Ok(())
}

#[test]
fn normalize_leaves_numeric_chunks_untouched() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("A", vec![Some(1), Some(2)])
        .with_floats("B", vec![Some(4.5), Some(5.5)])
        .build();

    let out = NormalizeText.transform(chunk.clone())?;
    assert_chunks_equal(&out, &chunk);
    Ok(())
}

#[test]
fn normalize_preserves_missing_cells() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_texts("A", vec![Some(" X "), None])
        .build();

    let out = NormalizeText.transform(chunk)?;
    assert_eq!(
        out.column("A").unwrap().values(),
        &[Value::Text("x".to_string()), Value::Null]
    );
    Ok(())
}

#[test]
fn normalize_is_idempotent() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_texts("A", vec![Some("  MiXeD Case "), Some("plain")])
        .with_ints("B", vec![Some(1), Some(2)])
        .build();

    let once = NormalizeText.transform(chunk)?;
    let twice = NormalizeText.transform(once.clone())?;
    assert_chunks_equal(&twice, &once);
    Ok(())
}

// ---- ImputeNumeric ----

#[test]
fn mean_imputation_fills_and_widens() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("A", vec![Some(1), Some(2), None, Some(4)])
        .with_texts("B", vec![Some("a"), Some("b"), Some("c"), Some("d")])
        .build();

    let out = ImputeNumeric::new(NumericStrategy::Mean).transform(chunk)?;

    let fill = (1.0 + 2.0 + 4.0) / 3.0;
    let expected = ChunkBuilder::new()
        .with_floats("A", vec![Some(1.0), Some(2.0), Some(fill), Some(4.0)])
        .with_texts("B", vec![Some("a"), Some("b"), Some("c"), Some("d")])
        .build();
    assert_chunks_equal(&out, &expected);
    Ok(())
}

#[test]
fn median_imputation_interpolates_even_counts() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("A", vec![Some(1), Some(2), None, Some(4), Some(10)])
        .build();

    let out = ImputeNumeric::new(NumericStrategy::Median).transform(chunk)?;

    let expected = ChunkBuilder::new()
        .with_floats(
            "A",
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(10.0)],
        )
        .build();
    assert_chunks_equal(&out, &expected);
    Ok(())
}

#[test]
fn mode_imputation_preserves_the_column_type() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("A", vec![Some(1), Some(2), Some(2), None, Some(4)])
        .build();

    let out = ImputeNumeric::new(NumericStrategy::Mode).transform(chunk)?;

    let expected = ChunkBuilder::new()
        .with_ints("A", vec![Some(1), Some(2), Some(2), Some(2), Some(4)])
        .build();
    assert_chunks_equal(&out, &expected);
    Ok(())
}

#[test]
fn mean_imputation_covers_every_numeric_column() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("A", vec![Some(1), None, Some(3)])
        .with_ints("B", vec![Some(10), Some(20), None])
        .with_texts("C", vec![Some("x"), Some("y"), Some("z")])
        .build();

    let out = ImputeNumeric::new(NumericStrategy::Mean).transform(chunk)?;

    let expected = ChunkBuilder::new()
        .with_floats("A", vec![Some(1.0), Some(2.0), Some(3.0)])
        .with_floats("B", vec![Some(10.0), Some(20.0), Some(15.0)])
        .with_texts("C", vec![Some("x"), Some("y"), Some("z")])
        .build();
    assert_chunks_equal(&out, &expected);
    Ok(())
}

#[test]
fn complete_columns_are_untouched() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("A", vec![Some(1), Some(2), Some(3)])
        .build();

    let out = ImputeNumeric::new(NumericStrategy::Mean).transform(chunk.clone())?;
    // no fill happened, so the column keeps its integer type
    assert_chunks_equal(&out, &chunk);
    Ok(())
}

#[test]
fn all_missing_numeric_columns_are_untouched() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("A", vec![None, None])
        .build();

    let out = ImputeNumeric::new(NumericStrategy::Mean).transform(chunk.clone())?;
    assert_chunks_equal(&out, &chunk);
    Ok(())
}

#[test]
fn unknown_numeric_strategy_fails_at_construction() {
    assert!(matches!(
        ImputeNumeric::from_name("invalid"),
        Err(TabflowError::InvalidConfiguration(_))
    ));
    assert!(ImputeNumeric::from_name("median").is_ok());
}

// ---- ImputeText ----

#[test]
fn text_mode_fills_with_most_frequent_value() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_texts("A", vec![Some("a"), Some("b"), Some("a"), None, Some("a")])
        .with_ints("B", vec![Some(1), Some(2), Some(3), Some(4), Some(5)])
        .build();

    let out = ImputeText::new(TextStrategy::Mode, None).transform(chunk)?;

    assert_eq!(
        out.column("A").unwrap().values()[3],
        Value::Text("a".to_string())
    );
    Ok(())
}

#[test]
fn text_default_fills_with_the_literal() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_texts("A", vec![Some("a"), Some("b"), None, Some("d")])
        .build();

    let out =
        ImputeText::new(TextStrategy::Default, Some("unknown".to_string())).transform(chunk)?;

    let expected = ChunkBuilder::new()
        .with_texts("A", vec![Some("a"), Some("b"), Some("unknown"), Some("d")])
        .build();
    assert_chunks_equal(&out, &expected);
    Ok(())
}

#[test]
fn text_mode_covers_every_text_column() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_texts("A", vec![Some("x"), Some("x"), None])
        .with_texts("B", vec![Some("y"), None, Some("y")])
        .with_ints("C", vec![Some(1), Some(2), Some(3)])
        .build();

    let out = ImputeText::new(TextStrategy::Mode, None).transform(chunk)?;

    let expected = ChunkBuilder::new()
        .with_texts("A", vec![Some("x"), Some("x"), Some("x")])
        .with_texts("B", vec![Some("y"), Some("y"), Some("y")])
        .with_ints("C", vec![Some(1), Some(2), Some(3)])
        .build();
    assert_chunks_equal(&out, &expected);
    Ok(())
}

#[test]
fn default_strategy_without_value_is_a_soft_no_op() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_texts("A", vec![Some("a"), None])
        .build();

    // warns at construction, leaves the column unchanged at transform
    let out = ImputeText::new(TextStrategy::Default, None).transform(chunk.clone())?;
    assert_chunks_equal(&out, &chunk);
    Ok(())
}

#[test]
fn unknown_text_strategy_fails_at_construction() {
    assert!(matches!(
        ImputeText::from_name("invalid", None),
        Err(TabflowError::InvalidConfiguration(_))
    ));
}

// ---- FilterRows ----

fn ages_chunk() -> Chunk {
    ChunkBuilder::new()
        .with_texts("name", vec![Some("a"), Some("b"), Some("c"), Some("d")])
        .with_ints("age", vec![Some(25), Some(30), Some(35), Some(40)])
        .build()
}

#[test]
fn greater_than_keeps_matching_rows() -> anyhow::Result<()> {
    let filter =
        FilterRows::comparison("age", FilterOp::Gt, FilterValue::Single(Value::Int(30)))?;

    let out = filter.transform(ages_chunk())?;

    assert_eq!(
        out.column("age").unwrap().values(),
        &[Value::Int(35), Value::Int(40)]
    );
    Ok(())
}

#[test]
fn equality_compares_ints_and_floats_numerically() -> anyhow::Result<()> {
    let filter =
        FilterRows::comparison("age", FilterOp::Eq, FilterValue::Single(Value::Float(30.0)))?;

    let out = filter.transform(ages_chunk())?;
    assert_eq!(out.num_rows(), 1);
    assert_eq!(out.column("age").unwrap().values(), &[Value::Int(30)]);
    Ok(())
}

#[test]
fn membership_operators_use_value_lists() -> anyhow::Result<()> {
    let keep = FilterRows::comparison(
        "age",
        FilterOp::In,
        FilterValue::List(vec![Value::Int(25), Value::Int(40)]),
    )?;
    let out = keep.transform(ages_chunk())?;
    assert_eq!(
        out.column("age").unwrap().values(),
        &[Value::Int(25), Value::Int(40)]
    );

    let exclude = FilterRows::comparison(
        "age",
        FilterOp::NotIn,
        FilterValue::List(vec![Value::Int(25), Value::Int(40)]),
    )?;
    let out = exclude.transform(ages_chunk())?;
    assert_eq!(
        out.column("age").unwrap().values(),
        &[Value::Int(30), Value::Int(35)]
    );
    Ok(())
}

#[test]
fn contains_matches_substrings_of_text_cells() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_texts("s", vec![Some("foobar"), Some("baz"), None])
        .build();
    let filter = FilterRows::comparison(
        "s",
        FilterOp::Contains,
        FilterValue::Single(Value::Text("foo".to_string())),
    )?;

    let out = filter.transform(chunk)?;
    assert_eq!(
        out.column("s").unwrap().values(),
        &[Value::Text("foobar".to_string())]
    );
    Ok(())
}

#[test]
fn missing_cells_never_satisfy_a_comparison() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("x", vec![Some(1), None, Some(3)])
        .build();
    let filter =
        FilterRows::comparison("x", FilterOp::Ne, FilterValue::Single(Value::Int(1)))?;

    let out = filter.transform(chunk)?;
    // the null row is excluded even under a negated operator
    assert_eq!(out.column("x").unwrap().values(), &[Value::Int(3)]);
    Ok(())
}

#[test]
fn predicate_form_sees_the_whole_row_set() -> anyhow::Result<()> {
    let filter = FilterRows::predicate(|chunk, row| {
        chunk
            .column("age")
            .and_then(|c| c.get(row).as_f64())
            .is_some_and(|age| age >= 35.0)
    });

    let out = filter.transform(ages_chunk())?;
    assert_eq!(out.num_rows(), 2);
    Ok(())
}

#[test]
fn filter_construction_rejects_bad_arity() {
    assert!(matches!(
        FilterRows::comparison("x", FilterOp::In, FilterValue::Single(Value::Int(1))),
        Err(TabflowError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        FilterRows::comparison(
            "x",
            FilterOp::Gt,
            FilterValue::List(vec![Value::Int(1)])
        ),
        Err(TabflowError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        FilterRows::comparison("", FilterOp::Gt, FilterValue::Single(Value::Int(1))),
        Err(TabflowError::InvalidConfiguration(_))
    ));
}

#[test]
fn unsupported_operator_names_fail_to_parse() {
    assert!(matches!(
        "~=".parse::<FilterOp>(),
        Err(TabflowError::InvalidConfiguration(_))
    ));
    assert_eq!(">=".parse::<FilterOp>().unwrap(), FilterOp::Ge);
}

#[test]
fn filtering_an_absent_column_is_column_not_found() -> anyhow::Result<()> {
    let filter =
        FilterRows::comparison("nope", FilterOp::Gt, FilterValue::Single(Value::Int(1)))?;
    let err = filter.transform(ages_chunk());
    assert!(matches!(err, Err(TabflowError::ColumnNotFound(_))));
    Ok(())
}

// ---- SelectColumns ----

fn abc_chunk() -> Chunk {
    ChunkBuilder::new()
        .with_ints("A", vec![Some(1), Some(2)])
        .with_ints("B", vec![Some(3), Some(4)])
        .with_ints("C", vec![Some(5), Some(6)])
        .build()
}

#[test]
fn keep_projects_in_the_given_order() -> anyhow::Result<()> {
    let out = SelectColumns::keep(vec!["C", "A"]).transform(abc_chunk())?;
    assert_schema(&out, &["C", "A"]);
    assert_eq!(out.num_rows(), 2);
    Ok(())
}

#[test]
fn keep_of_an_absent_column_is_column_not_found() {
    let err = SelectColumns::keep(vec!["A", "missing"]).transform(abc_chunk());
    assert!(matches!(err, Err(TabflowError::ColumnNotFound(_))));
}

#[test]
fn drop_preserves_input_order() -> anyhow::Result<()> {
    let out = SelectColumns::drop(vec!["B"]).transform(abc_chunk())?;
    assert_schema(&out, &["A", "C"]);
    Ok(())
}

#[test]
fn drop_of_an_absent_column_is_tolerated() -> anyhow::Result<()> {
    let out = SelectColumns::drop(vec!["missing"]).transform(abc_chunk())?;
    assert_schema(&out, &["A", "B", "C"]);
    Ok(())
}

#[test]
fn select_requires_exactly_one_mode() {
    assert!(matches!(
        SelectColumns::new(Some(vec!["A".into()]), Some(vec!["B".into()])),
        Err(TabflowError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        SelectColumns::new(None, None),
        Err(TabflowError::InvalidConfiguration(_))
    ));
}

// ---- GroupByAggregate ----

fn sales_chunk() -> Chunk {
    ChunkBuilder::new()
        .with_texts(
            "city",
            vec![Some("NY"), Some("SF"), Some("NY"), Some("NY")],
        )
        .with_ints("amount", vec![Some(1), Some(2), Some(3), None])
        .build()
}

#[test]
fn one_output_row_per_distinct_key() -> anyhow::Result<()> {
    let agg = GroupByAggregate::new(
        vec!["city".to_string()],
        vec![Aggregation::new("amount", vec![AggFn::Count])],
    )?;

    let out = agg.transform(sales_chunk())?;

    assert_eq!(out.num_rows(), 2);
    // first-seen key order
    assert_eq!(
        out.column("city").unwrap().values(),
        &[Value::Text("NY".to_string()), Value::Text("SF".to_string())]
    );
    // count skips the missing cell
    assert_eq!(
        out.column("amount").unwrap().values(),
        &[Value::Int(2), Value::Int(1)]
    );
    Ok(())
}

#[test]
fn single_function_keeps_the_original_name() -> anyhow::Result<()> {
    let agg = GroupByAggregate::new(
        vec!["city".to_string()],
        vec![Aggregation::new("amount", vec![AggFn::Sum])],
    )?;

    let out = agg.transform(sales_chunk())?;

    assert_schema(&out, &["city", "amount"]);
    assert_eq!(
        out.column("amount").unwrap().values(),
        &[Value::Int(4), Value::Int(2)]
    );
    Ok(())
}

#[test]
fn multiple_functions_suffix_the_output_names() -> anyhow::Result<()> {
    let agg = GroupByAggregate::new(
        vec!["city".to_string()],
        vec![Aggregation::new("amount", vec![AggFn::Sum, AggFn::Mean])],
    )?;

    let out = agg.transform(sales_chunk())?;

    assert_schema(&out, &["city", "amount_sum", "amount_mean"]);
    assert_eq!(
        out.column("amount_mean").unwrap().values(),
        &[Value::Float(2.0), Value::Float(2.0)]
    );
    Ok(())
}

#[test]
fn sample_std_and_var() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_texts("k", vec![Some("a"), Some("a"), Some("b")])
        .with_floats("v", vec![Some(1.0), Some(3.0), Some(5.0)])
        .build();
    let agg = GroupByAggregate::new(
        vec!["k".to_string()],
        vec![Aggregation::new("v", vec![AggFn::Var, AggFn::Std])],
    )?;

    let out = agg.transform(chunk)?;

    assert_eq!(
        out.column("v_var").unwrap().values(),
        &[Value::Float(2.0), Value::Null]
    );
    assert_eq!(
        out.column("v_std").unwrap().values(),
        &[Value::Float(2.0_f64.sqrt()), Value::Null]
    );
    Ok(())
}

#[test]
fn min_max_order_text_lexicographically() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("k", vec![Some(1), Some(1), Some(1)])
        .with_texts("s", vec![Some("pear"), Some("apple"), Some("plum")])
        .build();
    let agg = GroupByAggregate::new(
        vec!["k".to_string()],
        vec![Aggregation::new("s", vec![AggFn::Min, AggFn::Max])],
    )?;

    let out = agg.transform(chunk)?;

    assert_eq!(
        out.column("s_min").unwrap().values(),
        &[Value::Text("apple".to_string())]
    );
    assert_eq!(
        out.column("s_max").unwrap().values(),
        &[Value::Text("plum".to_string())]
    );
    Ok(())
}

#[test]
fn first_and_last_skip_missing_cells() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("k", vec![Some(1), Some(1), Some(1)])
        .with_texts("s", vec![None, Some("mid"), None])
        .build();
    let agg = GroupByAggregate::new(
        vec!["k".to_string()],
        vec![Aggregation::new("s", vec![AggFn::First, AggFn::Last])],
    )?;

    let out = agg.transform(chunk)?;

    assert_eq!(
        out.column("s_first").unwrap().values(),
        &[Value::Text("mid".to_string())]
    );
    assert_eq!(
        out.column("s_last").unwrap().values(),
        &[Value::Text("mid".to_string())]
    );
    Ok(())
}

#[test]
fn grouping_by_multiple_keys_counts_combinations() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_texts("a", vec![Some("x"), Some("x"), Some("y"), Some("x")])
        .with_ints("b", vec![Some(1), Some(2), Some(1), Some(1)])
        .with_ints("v", vec![Some(10), Some(20), Some(30), Some(40)])
        .build();
    let agg = GroupByAggregate::new(
        vec!["a".to_string(), "b".to_string()],
        vec![Aggregation::new("v", vec![AggFn::Sum])],
    )?;

    let out = agg.transform(chunk)?;

    // distinct combinations: (x,1), (x,2), (y,1)
    assert_eq!(out.num_rows(), 3);
    assert_eq!(
        out.column("v").unwrap().values(),
        &[Value::Int(50), Value::Int(20), Value::Int(30)]
    );
    Ok(())
}

#[test]
fn absent_columns_are_column_not_found() -> anyhow::Result<()> {
    let by_key = GroupByAggregate::new(
        vec!["missing".to_string()],
        vec![Aggregation::new("amount", vec![AggFn::Sum])],
    )?;
    assert!(matches!(
        by_key.transform(sales_chunk()),
        Err(TabflowError::ColumnNotFound(_))
    ));

    let by_value = GroupByAggregate::new(
        vec!["city".to_string()],
        vec![Aggregation::new("missing", vec![AggFn::Sum])],
    )?;
    assert!(matches!(
        by_value.transform(sales_chunk()),
        Err(TabflowError::ColumnNotFound(_))
    ));
    Ok(())
}

#[test]
fn group_by_requires_keys_and_aggregations() {
    assert!(matches!(
        GroupByAggregate::new(vec![], vec![Aggregation::new("v", vec![AggFn::Sum])]),
        Err(TabflowError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        GroupByAggregate::new(vec!["k".to_string()], vec![]),
        Err(TabflowError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        GroupByAggregate::new(vec!["k".to_string()], vec![Aggregation::new("v", vec![])]),
        Err(TabflowError::InvalidConfiguration(_))
    ));
}

// ---- composition ----

#[test]
fn transformer_order_is_significant() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_ints("x", vec![Some(1), None, Some(10)])
        .build();

    // filter-then-impute sees only concrete cells; impute-then-filter
    // manufactures a cell that survives the filter
    let filter = FilterRows::comparison("x", FilterOp::Gt, FilterValue::Single(Value::Int(2)))?;
    let impute = ImputeNumeric::new(NumericStrategy::Mean);

    let filtered_first = impute.transform(filter.transform(chunk.clone())?)?;
    assert_eq!(filtered_first.num_rows(), 1);

    let imputed_first = filter.transform(impute.transform(chunk)?)?;
    assert_eq!(imputed_first.num_rows(), 2);
    Ok(())
}

#[test]
fn transformers_report_stable_names() {
    assert_eq!(Transformer::name(&DropIncomplete), "drop_incomplete");
    assert_eq!(Transformer::name(&NormalizeText), "normalize_text");
    assert_eq!(
        Transformer::name(&ImputeNumeric::new(NumericStrategy::Mean)),
        "impute_numeric"
    );
}

#[test]
fn column_types_survive_row_transformers() -> anyhow::Result<()> {
    let chunk = ChunkBuilder::new()
        .with_bools("flag", vec![Some(true), Some(false), None])
        .with_floats("score", vec![Some(1.5), None, Some(2.5)])
        .build();

    let out = DropIncomplete.transform(chunk)?;
    assert_eq!(out.column("flag").unwrap().dtype(), DataType::Bool);
    assert_eq!(out.column("score").unwrap().dtype(), DataType::Float);
    assert_eq!(out.num_rows(), 1);
    Ok(())
}
