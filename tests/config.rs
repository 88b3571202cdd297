//! Tests for pipeline assembly from JSON specs.

use std::fs;
use tabflow::config::PipelineSpec;
use tabflow::testing::*;
use tabflow::{RunState, TabflowError};

#[test]
fn a_full_spec_parses_builds_and_runs() -> anyhow::Result<()> {
    let (_dir, input) = sample_csv("name,age\n ALICE ,34\nBob,\nCarol,51\nDan,28\n");
    let out_dir = tempfile::TempDir::new()?;
    let output = out_dir.path().join("out.jsonl");

    let spec = PipelineSpec::from_json(
        r#"{
            "reader": { "format": "csv", "chunk_size": 2 },
            "transformers": [
                { "op": "drop_incomplete" },
                { "op": "normalize_text" },
                { "op": "filter_rows", "column": "age", "operator": ">", "value": 30 }
            ],
            "writer": { "format": "jsonl" }
        }"#,
    )?;
    let mut pipeline = spec.build()?;
    let summary = pipeline.run(&input, &output)?;

    assert_eq!(pipeline.state(), RunState::Completed);
    assert_eq!(summary.rows_read, 4);
    assert_eq!(summary.rows_written, 2);
    let content = fs::read_to_string(&output)?;
    assert_eq!(
        content,
        "{\"name\":\"alice\",\"age\":34}\n{\"name\":\"carol\",\"age\":51}\n"
    );
    Ok(())
}

#[test]
fn unknown_operations_fail_to_parse() {
    let err = PipelineSpec::from_json(
        r#"{
            "reader": { "format": "csv", "chunk_size": 10 },
            "transformers": [ { "op": "frobnicate" } ],
            "writer": { "format": "csv" }
        }"#,
    );
    assert!(matches!(err, Err(TabflowError::MalformedInput(_))));
}

#[test]
fn constructor_errors_surface_at_build_time() -> anyhow::Result<()> {
    let spec = PipelineSpec::from_json(
        r#"{
            "reader": { "format": "csv", "chunk_size": 10 },
            "transformers": [ { "op": "drop_below_threshold", "threshold": 1.5 } ],
            "writer": { "format": "csv" }
        }"#,
    )?;
    assert!(matches!(
        spec.build(),
        Err(TabflowError::InvalidConfiguration(_))
    ));

    let spec = PipelineSpec::from_json(
        r#"{
            "reader": { "format": "csv", "chunk_size": 0 },
            "writer": { "format": "csv" }
        }"#,
    )?;
    assert!(matches!(
        spec.build(),
        Err(TabflowError::InvalidConfiguration(_))
    ));
    Ok(())
}

#[test]
fn unknown_strategies_fail_to_parse() {
    let err = PipelineSpec::from_json(
        r#"{
            "reader": { "format": "json" },
            "transformers": [ { "op": "impute_numeric", "strategy": "banana" } ],
            "writer": { "format": "jsonl" }
        }"#,
    );
    assert!(matches!(err, Err(TabflowError::MalformedInput(_))));
}

#[test]
fn membership_filters_take_value_lists() -> anyhow::Result<()> {
    let spec = PipelineSpec::from_json(
        r#"{
            "reader": { "format": "json" },
            "transformers": [
                { "op": "filter_rows", "column": "tag", "operator": "in", "value": ["a", "b"] }
            ],
            "writer": { "format": "jsonl" }
        }"#,
    )?;
    assert!(spec.build().is_ok());
    Ok(())
}

#[test]
fn group_by_specs_round_trip_through_json() -> anyhow::Result<()> {
    let spec = PipelineSpec::from_json(
        r#"{
            "reader": { "format": "csv", "chunk_size": 100 },
            "transformers": [
                {
                    "op": "group_by_aggregate",
                    "keys": ["city"],
                    "aggregations": [ { "column": "amount", "functions": ["sum", "mean"] } ]
                }
            ],
            "writer": { "format": "csv" }
        }"#,
    )?;

    let rendered = spec.to_json()?;
    let reparsed = PipelineSpec::from_json(&rendered)?;
    assert!(reparsed.build().is_ok());
    Ok(())
}

#[test]
fn specs_load_from_files() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("pipeline.json");
    fs::write(
        &path,
        r#"{ "reader": { "format": "json" }, "writer": { "format": "jsonl" } }"#,
    )?;

    assert!(PipelineSpec::from_file(&path)?.build().is_ok());
    assert!(matches!(
        PipelineSpec::from_file(dir.path().join("absent.json")),
        Err(TabflowError::NotFound(_))
    ));
    Ok(())
}
