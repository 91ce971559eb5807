use crate::cli::OutputFormat;
use anyhow::Result;
use chirp_social::Table;

/// Render a table for stdout. Text output prints `column` only, one row per line.
pub fn render(table: &Table, format: OutputFormat, column: &str) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(&table.to_records())?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for cell in table.column(column)? {
                out.push_str(&cell.to_string());
                out.push('\n');
            }
            Ok(out)
        }
    }
}
