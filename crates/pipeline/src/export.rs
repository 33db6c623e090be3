//! CSV persistence of chunk records.
//!
//! Files are UTF-8 with a byte-order mark so spreadsheet tools detect the
//! encoding, and always carry the fixed column header.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use texchunk_core::AppResult;

use crate::types::{ChunkRecord, CSV_HEADER};

const UTF8_BOM: &str = "\u{feff}";

/// Write `records` to `writer` as CSV with a BOM and header.
pub fn write_records_to<W: Write>(mut writer: W, records: &[ChunkRecord]) -> AppResult<()> {
    writer.write_all(UTF8_BOM.as_bytes())?;

    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    out.write_record(CSV_HEADER)?;
    for record in records {
        out.serialize(record)?;
    }
    out.flush()?;
    Ok(())
}

/// Write `records` to a CSV file, creating parent directories.
pub fn write_records(path: &Path, records: &[ChunkRecord]) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_records_to(BufWriter::new(file), records)?;

    tracing::info!("Wrote {} records to {:?}", records.len(), path);
    Ok(())
}

/// Read records back from a CSV file written by [`write_records`].
pub fn read_records(path: &Path) -> AppResult<Vec<ChunkRecord>> {
    let content = fs::read_to_string(path)?;
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(&content);

    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let records = reader
        .deserialize()
        .collect::<Result<Vec<ChunkRecord>, _>>()?;

    tracing::debug!("Read {} records from {:?}", records.len(), path);
    Ok(records)
}

/// File name for a department's CSV.
fn department_file_name(department: &str) -> String {
    let safe: String = department
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    format!("{}.csv", safe.trim())
}

/// Write one CSV per department into `out_dir`.
///
/// Returns the record count per written file name. Records without a
/// department are left out.
pub fn split_by_department(
    records: &[ChunkRecord],
    out_dir: &Path,
) -> AppResult<BTreeMap<String, usize>> {
    let mut by_department: BTreeMap<&str, Vec<ChunkRecord>> = BTreeMap::new();
    let mut unassigned = 0;
    for record in records {
        let department = record.department.trim();
        if department.is_empty() {
            unassigned += 1;
            continue;
        }
        by_department
            .entry(department)
            .or_default()
            .push(record.clone());
    }
    if unassigned > 0 {
        tracing::warn!("{} records have no department and were not split", unassigned);
    }

    fs::create_dir_all(out_dir)?;
    let mut written = BTreeMap::new();
    for (department, group) in by_department {
        let file_name = department_file_name(department);
        write_records(&out_dir.join(&file_name), &group)?;
        written.insert(file_name, group.len());
    }

    Ok(written)
}
