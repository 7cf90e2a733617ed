//! Writing the final table and the discovered URL lists

use crate::config::OutputConfig;
use crate::output::aggregator::Table;
use crate::output::{OutputError, OutputResult};
use chrono::{DateTime, Local};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use url::Url;

/// Timestamp shared by every file of one run
#[derive(Debug, Clone, Copy)]
pub struct RunStamp(DateTime<Local>);

impl RunStamp {
    pub fn now() -> Self {
        Self(Local::now())
    }

    pub fn at(time: DateTime<Local>) -> Self {
        Self(time)
    }

    /// `YYYY-MM-DD HH-MM-SS`, safe in file names
    pub fn label(&self) -> String {
        self.0.format("%Y-%m-%d %H-%M-%S").to_string()
    }
}

/// Writes `table` as delimited text: header line first, then one line per row
///
/// Fields containing the separator, a quote or a line break are quoted, with
/// inner quotes doubled.
pub fn write_table<W: Write>(writer: W, table: &Table, separator: u8) -> OutputResult<()> {
    let mut csv = WriterBuilder::new()
        .delimiter(separator)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(&table.header)?;
    for row in &table.rows {
        if row.len() != table.width() {
            return Err(OutputError::Format(format!(
                "row has {} fields, header has {}",
                row.len(),
                table.width()
            )));
        }
        csv.write_record(row)?;
    }

    csv.flush()?;
    Ok(())
}

/// Writes the export file for a run and returns its path
///
/// The file is named `<prefix> <timestamp>.<ext>` inside the output
/// directory, the extension following the separator.
pub fn export_table(table: &Table, config: &OutputConfig, stamp: &RunStamp) -> OutputResult<PathBuf> {
    let separator = config.separator_byte();
    let file_name = format!(
        "{} {}.{}",
        config.prefix,
        stamp.label(),
        extension_for(separator)
    );
    let path = config.directory.join(file_name);

    let file = File::create(&path)?;
    write_table(BufWriter::new(file), table, separator)?;

    Ok(path)
}

/// Writes one URL per line to `<name> <timestamp>.txt` in `directory`
pub fn write_url_list(
    directory: &Path,
    name: &str,
    urls: &[Url],
    stamp: &RunStamp,
) -> OutputResult<PathBuf> {
    let path = directory.join(format!("{} {}.txt", name, stamp.label()));

    let mut file = BufWriter::new(File::create(&path)?);
    for url in urls {
        writeln!(file, "{}", url)?;
    }
    file.flush()?;

    Ok(path)
}

fn extension_for(separator: u8) -> &'static str {
    match separator {
        b',' => "csv",
        b'\t' => "tsv",
        _ => "txt",
    }
}
