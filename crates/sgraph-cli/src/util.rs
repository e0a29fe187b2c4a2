use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use serde_json::{Map, Value};
use sgraph_json_schema::{BigIntStrategy, DateStrategy, UndefinedStrategy};

/// Read input from a file path, or stdin for `-`.
pub fn read_input(file: &Path) -> anyhow::Result<String> {
    if file == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Error reading from stdin")?;
        return Ok(buffer);
    }
    fs::read_to_string(file).with_context(|| format!("Error reading file {}", file.display()))
}

/// Date encoding for `--date-strategy`
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DateFormat {
    /// Epoch milliseconds
    Integer,
    /// RFC 3339 date-time string
    String,
}

impl From<DateFormat> for DateStrategy {
    fn from(format: DateFormat) -> Self {
        match format {
            DateFormat::Integer => DateStrategy::Integer,
            DateFormat::String => DateStrategy::String,
        }
    }
}

/// Big integer encoding for `--bigint-strategy`
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum BigIntFormat {
    /// 64-bit integer
    Integer,
    /// Decimal string
    String,
}

impl From<BigIntFormat> for BigIntStrategy {
    fn from(format: BigIntFormat) -> Self {
        match format {
            BigIntFormat::Integer => BigIntStrategy::Integer,
            BigIntFormat::String => BigIntStrategy::String,
        }
    }
}

/// Encoding of `undefined` for `--undefined-strategy`
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum UndefinedFormat {
    /// Accept any value
    Any,
    /// Accept only null
    Null,
}

impl From<UndefinedFormat> for UndefinedStrategy {
    fn from(format: UndefinedFormat) -> Self {
        match format {
            UndefinedFormat::Any => UndefinedStrategy::Any,
            UndefinedFormat::Null => UndefinedStrategy::Null,
        }
    }
}

/// Rebuild a JSON value with object keys sorted at every level.
pub fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
