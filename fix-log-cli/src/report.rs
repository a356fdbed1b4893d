//! Output rendering
//!
//! Renders the assembled table into its persisted forms: an aligned
//! plain-text table, CSV, or JSON. Display cosmetics (column widths,
//! multi-value joining) live here, not in the decoder library.

use crate::config::OutputFormat;
use anyhow::{Context, Result};
use fix_log_decoder::OutputTable;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Padding added to every column beyond its widest content
const COLUMN_PADDING: usize = 2;

/// Build the default output file name: `Parsed_<stem>_<timestamp>.<ext>`
pub fn default_output_name(input: &Path, format: OutputFormat) -> String {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("Parsed_{}_{}.{}", stem, timestamp, format.extension())
}

/// Resolve where the output file goes
///
/// An explicit output path wins; otherwise the generated name lands in
/// `output_dir` (or next to the current working directory if unset).
pub fn resolve_output_path(
    input: &Path,
    explicit: Option<&Path>,
    output_dir: Option<&Path>,
    format: OutputFormat,
) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let name = default_output_name(input, format);
            match output_dir {
                Some(dir) => dir.join(name),
                None => PathBuf::from(name),
            }
        }
    }
}

/// Write the table to `path` in the requested format
pub fn write_table(table: &OutputTable, format: OutputFormat, path: &Path) -> Result<()> {
    log::info!("Writing {:?} report: {:?}", format, path);
    match format {
        OutputFormat::Txt => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            file.write_all(render_text(table).as_bytes())
                .with_context(|| format!("Failed to write output file: {:?}", path))?;
        }
        OutputFormat::Csv => write_csv(table, path)?,
        OutputFormat::Json => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            serde_json::to_writer_pretty(file, table)
                .with_context(|| format!("Failed to write JSON output: {:?}", path))?;
        }
    }
    Ok(())
}

/// Render the table as aligned plain text
///
/// Every column is padded to its widest cell (header included). Repeating-
/// group cells render as their values joined with ", ".
pub fn render_text(table: &OutputTable) -> String {
    let rendered_rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let content = rendered_rows
                .iter()
                .map(|row| row[col].chars().count())
                .max()
                .unwrap_or(0);
            header.chars().count().max(content) + COLUMN_PADDING
        })
        .collect();

    let mut out = String::new();
    write_padded_row(&mut out, &table.columns, &widths);
    let underline: Vec<String> = widths
        .iter()
        .map(|w| "-".repeat(w - COLUMN_PADDING))
        .collect();
    write_padded_row(&mut out, &underline, &widths);
    for row in &rendered_rows {
        write_padded_row(&mut out, row, &widths);
    }
    out
}

fn write_padded_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    for (cell, width) in cells.iter().zip(widths) {
        let cell = cell.as_ref();
        out.push_str(cell);
        let pad = width.saturating_sub(cell.chars().count());
        out.extend(std::iter::repeat(' ').take(pad));
    }
    // Trailing padding on the last column is dropped
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
}

/// Write the table as CSV
fn write_csv(table: &OutputTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {:?}", path))?;

    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV file: {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fix_log_decoder::Decoder;

    fn sample_table() -> OutputTable {
        let decoder = Decoder::new();
        let (table, failures) = decoder.tabulate([
            "S(TID=1) | NewOrder]: 35=D|55=AAPL",
            "S(TID=2) | Execution]: 35=8|448=A|447=B|452=1|448=C|447=D|452=2",
        ]);
        assert!(failures.is_empty());
        table
    }

    #[test]
    fn test_render_text_aligns_columns() {
        let table = sample_table();
        let text = render_text(&table);
        let lines: Vec<&str> = text.lines().collect();

        // Header, underline, two data rows
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("TID"));
        assert!(lines[1].starts_with("---"));

        // The classifier column starts at the same offset in every row
        let offset = lines[0].find("Order Type").unwrap();
        assert_eq!(&lines[2][offset..offset + 8], "NewOrder");
        assert_eq!(&lines[3][offset..offset + 9], "Execution");
    }

    #[test]
    fn test_render_text_joins_group_values() {
        let table = sample_table();
        let text = render_text(&table);
        assert!(text.contains("A, C"));
        assert!(text.contains("1, 2"));
    }

    #[test]
    fn test_write_csv() {
        let table = sample_table();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_table(&table, OutputFormat::Csv, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("TID,Order Type,8 BeginString"));
        // Joined group values are quoted by the CSV writer
        assert!(lines[2].contains("\"A, C\""));
    }

    #[test]
    fn test_write_json() {
        let table = sample_table();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_table(&table, OutputFormat::Json, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert_eq!(value["columns"][0], "TID");
        assert_eq!(value["rows"][0][0], "S(TID=1)");
        // Group cells stay arrays in JSON
        let party_col = value["columns"]
            .as_array()
            .unwrap()
            .iter()
            .position(|c| c == "448 PartyID")
            .unwrap();
        assert_eq!(value["rows"][1][party_col][1], "C");
    }

    #[test]
    fn test_default_output_name() {
        let name = default_output_name(Path::new("logs/fix_session.log"), OutputFormat::Csv);
        assert!(name.starts_with("Parsed_fix_session_"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn test_resolve_output_path_prefers_explicit() {
        let explicit = PathBuf::from("custom.txt");
        let resolved = resolve_output_path(
            Path::new("in.log"),
            Some(&explicit),
            Some(Path::new("ignored")),
            OutputFormat::Txt,
        );
        assert_eq!(resolved, explicit);

        let generated = resolve_output_path(
            Path::new("in.log"),
            None,
            Some(Path::new("reports")),
            OutputFormat::Txt,
        );
        assert!(generated.starts_with("reports"));
    }
}
