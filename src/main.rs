// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::env;
use std::fs;
use std::time::Instant;
use the_transmogrifier::config::{load_and_validate_pipeline, EngineBuilder};
use the_transmogrifier::engine::{TransformOptions, TransformationEngine};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let snapshot = args.iter().any(|arg| arg == "--snapshot");
    let positional: Vec<&String> = args.iter().skip(1).filter(|arg| !arg.starts_with("--")).collect();

    if positional.len() != 2 {
        eprintln!("Usage: {} <pipeline.yaml> <input.json> [--snapshot]", args[0]);
        eprintln!("Example: {} configs/name-pipeline.yaml people.json", args[0]);
        eprintln!("         RUST_LOG=debug {} configs/orders-pipeline.yaml orders.json --snapshot", args[0]);
        std::process::exit(1);
    }

    let cfg = load_and_validate_pipeline(positional[0])
        .with_context(|| format!("failed to load pipeline {}", positional[0]))?;
    let (mut engine, options) = EngineBuilder::from_config(&cfg)?;

    if snapshot {
        println!("{}", serde_json::to_string_pretty(&engine.to_json()?)?);
        return Ok(());
    }

    let input = fs::read_to_string(positional[1])
        .with_context(|| format!("failed to read input {}", positional[1]))?;
    let input: Value = serde_json::from_str(&input)
        .with_context(|| format!("{} is not valid JSON", positional[1]))?;

    let start = Instant::now();
    let output = match input {
        Value::Array(documents) => {
            let mut transformed = Vec::with_capacity(documents.len());
            for doc in &documents {
                transformed.push(transform_one(&mut engine, doc, &options)?);
            }
            Value::Array(transformed)
        }
        doc @ Value::Object(_) => transform_one(&mut engine, &doc, &options)?,
        other => bail!("expected a JSON object or an array of objects, got {}", other),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    eprintln!("⏱️  Transformed in {:?}", start.elapsed());
    Ok(())
}

/// Transform one document, reporting skipped node failures on stderr.
fn transform_one(engine: &mut TransformationEngine, doc: &Value, options: &TransformOptions) -> Result<Value> {
    let report = engine.transform_with_report(doc, options)?;
    for failure in &report.errors {
        eprintln!("⚠️  Node {} failed: {}", failure.node_id, failure.error);
    }
    Ok(report.document)
}
