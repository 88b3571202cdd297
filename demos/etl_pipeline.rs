//! Complete ETL (Extract, Transform, Load) pipeline demo.
//!
//! Generates a messy CSV of web shop orders, then runs a chunked pipeline:
//! 1. **Extract**: stream the CSV two hundred rows at a time
//! 2. **Transform**: drop incomplete rows, normalize text, impute missing
//!    amounts, keep the big orders
//! 3. **Load**: append the cleaned rows to a JSON-lines file
//!
//! Run with: cargo run --example etl_pipeline

use anyhow::Result;
use std::fs;
use std::path::Path;
use tabflow::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabflow=debug".into()),
        )
        .init();

    println!("🚀 ETL Pipeline Demo: Order Cleanup\n");

    // =========================================================================
    // EXTRACT: generate sample data
    // =========================================================================
    println!("📥 EXTRACT: writing sample orders...");

    let work = tempfile::TempDir::new()?;
    let input = work.path().join("orders.csv");
    let output = work.path().join("out").join("orders_clean.jsonl");

    let mut csv = String::from("customer,item,amount\n");
    for i in 0..500 {
        let customer = match i % 4 {
            0 => "  ALICE  ",
            1 => "bob",
            2 => "", // incomplete row, dropped by the pipeline
            _ => " Carol ",
        };
        let amount = if i % 7 == 0 {
            String::new() // missing amount, imputed by the pipeline
        } else {
            format!("{}", 10 + (i % 90))
        };
        csv.push_str(&format!("{customer},widget-{},{amount}\n", i % 3));
    }
    fs::write(&input, csv)?;

    // =========================================================================
    // TRANSFORM + LOAD: run the pipeline
    // =========================================================================
    println!("⚙️  TRANSFORM + LOAD: running the pipeline...\n");

    // impute before dropping, otherwise rows with a missing amount are gone
    let mut pipeline = Orchestrator::new(CsvReader::new(200)?, JsonlWriter::new())
        .with_transformer(ImputeNumeric::new(NumericStrategy::Mean))
        .with_transformer(DropIncomplete)
        .with_transformer(NormalizeText)
        .with_transformer(FilterRows::comparison(
            "amount",
            FilterOp::Ge,
            FilterValue::Single(Value::Int(20)),
        )?);

    let summary = pipeline.run(&input, &output)?;

    println!("  state:         {:?}", pipeline.state());
    println!("  chunks:        {}", summary.chunks_processed);
    println!("  rows read:     {}", summary.rows_read);
    println!("  rows written:  {}", summary.rows_written);

    let preview = fs::read_to_string(&output)?;
    println!("\n  first rows of {}:", Path::new("out/orders_clean.jsonl").display());
    for line in preview.lines().take(3) {
        println!("    {line}");
    }

    println!("\n✅ done");
    Ok(())
}
