//! One-time import from a delimited address-book export

use crate::{ContactStore, ImportReport, ImportSpec, Result, StoreError};
use rusqlite::params;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use tracing::{info, warn};

/// Import contacts from a delimited text file.
pub fn import_file(
    store: &mut ContactStore,
    path: impl AsRef<Path>,
    spec: &ImportSpec,
) -> Result<ImportReport> {
    let path = path.as_ref();
    let file = File::open(path)?;
    info!("importing contacts from {}", path.display());
    import_delimited(store, BufReader::new(file), spec)
}

/// Import contacts from any buffered reader. Rows that are too short or
/// have an empty name or phone are skipped; everything else is inserted in a
/// single transaction.
pub fn import_delimited<R: BufRead>(
    store: &mut ContactStore,
    reader: R,
    spec: &ImportSpec,
) -> Result<ImportReport> {
    if spec.name_col == spec.phone_col {
        return Err(StoreError::InvalidColumn(format!(
            "name and phone both use column {}",
            spec.name_col
        )));
    }
    let needed = [Some(spec.name_col), Some(spec.phone_col), spec.email_col]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0);

    let mut report = ImportReport::default();
    let tx = store.connection_mut().transaction()?;
    {
        let mut insert =
            tx.prepare("INSERT INTO contacts (name, mobile_no, email) VALUES (?1, ?2, ?3)")?;

        let mut lines = reader.lines();
        let mut line_no = 0;
        let mut first = true;

        while let Some((record, fields)) = next_record(&mut lines, &mut line_no, spec.delimiter)? {
            if first {
                first = false;
                if spec.has_header {
                    report.header_columns = Some(fields.len());
                    continue;
                }
            }
            if record.trim().is_empty() {
                continue;
            }
            if fields.len() <= needed {
                report.skipped += 1;
                continue;
            }

            let name = fields[spec.name_col].trim();
            let phone = fields[spec.phone_col].trim();
            if name.is_empty() || phone.is_empty() {
                report.skipped += 1;
                continue;
            }
            let email = spec
                .email_col
                .map(|c| fields[c].trim())
                .filter(|e| !e.is_empty());

            insert.execute(params![name, phone, email])?;
            report.imported += 1;
        }
    }
    tx.commit()?;

    if report.skipped > 0 {
        warn!("{} rows skipped during import", report.skipped);
    }
    info!("imported {} contacts", report.imported);
    Ok(report)
}

/// Read one logical record, joining physical lines while a quoted field is
/// still open. A quote left open at end of input closes there.
fn next_record<B: BufRead>(
    lines: &mut Lines<B>,
    line_no: &mut usize,
    delimiter: char,
) -> Result<Option<(String, Vec<String>)>> {
    let mut record: Option<String> = None;
    loop {
        let Some(line) = lines.next() else {
            return Ok(record.map(|r| {
                let (fields, _) = split_record(&r, delimiter);
                (r, fields)
            }));
        };
        *line_no += 1;
        let line = line.map_err(|e| StoreError::Import {
            line: *line_no,
            reason: e.to_string(),
        })?;

        let joined = match record.take() {
            Some(mut r) => {
                r.push('\n');
                r.push_str(&line);
                r
            }
            None => line,
        };
        let (fields, open_quote) = split_record(&joined, delimiter);
        if !open_quote {
            return Ok(Some((joined, fields)));
        }
        record = Some(joined);
    }
}

/// Split one record, honouring double-quoted fields with `""` escapes.
/// Also reports whether a quoted field was still open at the end.
fn split_record(line: &str, delimiter: char) -> (Vec<String>, bool) {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
    (fields, in_quotes)
}
