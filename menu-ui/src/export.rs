//! Flat-file export of grid contents.
//!
//! ## Formats
//!
//! | Format | Extension | Header row | Delimiter | Quoting                    |
//! |--------|-----------|------------|-----------|----------------------------|
//! | CSV    | `.csv`    | yes        | `,`       | `"` only where needed      |
//! | Text   | `.txt`    | no         | tab       | none                       |
//!
//! Both formats are UTF-8 with `\n` line endings.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Text,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }

    /// Appends the format's extension unless `path` already ends with it.
    pub fn file_name(self, path: &Path) -> PathBuf {
        let has_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(self.extension()));
        if has_extension {
            path.to_path_buf()
        } else {
            let mut name = path.as_os_str().to_owned();
            name.push(".");
            name.push(self.extension());
            PathBuf::from(name)
        }
    }
}

/// One export destination as chosen in the save dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub path: PathBuf,
    pub format: ExportFormat,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes `headers` followed by `rows` as minimally quoted CSV.
pub fn write_csv<W: Write>(
    writer: W,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b',')
        .quote(b'"')
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(headers)?;
    for row in rows {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes `rows` as tab-separated lines, without a header.
pub fn write_text<W: Write>(mut writer: W, rows: &[Vec<String>]) -> io::Result<()> {
    for row in rows {
        writeln!(writer, "{}", row.join("\t"))?;
    }
    writer.flush()
}

/// Writes a grid to `target`, returning the path actually written.
pub fn export_table(
    target: &ExportTarget,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<PathBuf, ExportError> {
    let path = target.format.file_name(&target.path);
    let io_error = |source| ExportError::Io {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(io_error)?;
    let writer = BufWriter::new(file);
    match target.format {
        ExportFormat::Csv => write_csv(writer, headers, rows)?,
        ExportFormat::Text => write_text(writer, rows).map_err(io_error)?,
    }

    tracing::info!(path = %path.display(), rows = rows.len(), "exported table");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn csv_has_header_then_plain_rows() {
        let mut out = Vec::new();
        write_csv(
            &mut out,
            &["Dish ID", "Dish Name", "Price"],
            &rows(&[&["1", "Soup", "5.50"], &["2", "Salad", "4.00"]]),
        )
        .expect("should write CSV");

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Dish ID,Dish Name,Price\n1,Soup,5.50\n2,Salad,4.00\n"
        );
    }

    #[test]
    fn csv_quotes_only_when_needed() {
        let mut out = Vec::new();
        write_csv(
            &mut out,
            &["Name", "Notes"],
            &rows(&[&["Fish, chips", "say \"hi\""], &["Tea", "plain"]]),
        )
        .expect("should write CSV");

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Name,Notes\n\"Fish, chips\",\"say \"\"hi\"\"\"\nTea,plain\n"
        );
    }

    #[test]
    fn text_is_tab_separated_without_header() {
        let mut out = Vec::new();
        write_text(&mut out, &rows(&[&["1", "Soup", "5.50"], &["2", "", "4.00"]]))
            .expect("should write text");

        assert_eq!(String::from_utf8(out).unwrap(), "1\tSoup\t5.50\n2\t\t4.00\n");
    }

    #[test]
    fn file_name_appends_missing_extension_only() {
        assert_eq!(
            ExportFormat::Csv.file_name(Path::new("out/menu")),
            PathBuf::from("out/menu.csv")
        );
        assert_eq!(
            ExportFormat::Csv.file_name(Path::new("out/menu.CSV")),
            PathBuf::from("out/menu.CSV")
        );
        assert_eq!(
            ExportFormat::Text.file_name(Path::new("orders.csv")),
            PathBuf::from("orders.csv.txt")
        );
    }

    #[test]
    fn export_table_writes_utf8_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = ExportTarget {
            path: dir.path().join("menu"),
            format: ExportFormat::Csv,
        };

        let written = export_table(&target, &["Dish Name"], &rows(&[&["Crème brûlée"]]))
            .expect("should export");

        assert_eq!(written, dir.path().join("menu.csv"));
        assert_eq!(
            std::fs::read_to_string(written).unwrap(),
            "Dish Name\nCrème brûlée\n"
        );
    }

    #[test]
    fn export_into_missing_directory_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = ExportTarget {
            path: dir.path().join("missing").join("orders"),
            format: ExportFormat::Text,
        };

        let err = export_table(&target, &[], &[]).unwrap_err();

        assert!(matches!(err, ExportError::Io { ref path, .. } if path.ends_with("orders.txt")));
    }
}
