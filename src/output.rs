use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::PageFailure;
use crate::model::FailureRow;

/// Serialize `value` as tab-indented JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    write_json(&mut buf, value)?;
    Ok(String::from_utf8(buf)?)
}

fn write_json<W: Write, T: Serialize + ?Sized>(writer: W, value: &T) -> Result<()> {
    let mut ser = Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut ser)?;
    Ok(())
}

/// Write `value` to `path` as tab-indented JSON, replacing any existing file.
pub fn write_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Could not create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_json(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

pub fn failure_rows(failures: &[PageFailure]) -> Vec<FailureRow> {
    failures
        .iter()
        .map(|f| FailureRow {
            index: f.index,
            reference: f.reference.clone(),
            error: f.error.to_string(),
        })
        .collect()
}
