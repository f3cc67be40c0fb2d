use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::commands::CommandResult;
use crate::error::CliError;

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let envelope = json_envelope(result);
            let payload = if pretty {
                serde_json::to_string_pretty(&envelope)?
            } else {
                serde_json::to_string(&envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Ndjson => {
            for line in ndjson_lines(result)? {
                println!("{line}");
            }
        }
        OutputFormat::Table => print!("{}", render_table(result)),
    }

    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }

    Ok(())
}

fn json_envelope(result: &CommandResult) -> Value {
    json!({
        "meta": Value::Object(result.meta.clone()),
        "data": result.items,
        "warnings": result.warnings,
    })
}

fn ndjson_lines(result: &CommandResult) -> Result<Vec<String>, CliError> {
    result
        .items
        .iter()
        .map(|item| serde_json::to_string(item).map_err(CliError::from))
        .collect()
}

fn render_table(result: &CommandResult) -> String {
    let mut out = String::new();

    let key_width = result.meta.keys().map(|key| key.len()).max().unwrap_or(0);
    for (key, value) in &result.meta {
        out.push_str(&format!("{key:<key_width$} : {}\n", display_value(value)));
    }
    if !result.meta.is_empty() {
        out.push('\n');
    }

    if result.columns.is_empty() {
        return out;
    }

    let rows = result
        .items
        .iter()
        .map(|item| {
            result
                .columns
                .iter()
                .map(|column| item.get(*column).map(display_value).unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let widths = result
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            rows.iter()
                .map(|row| display_width(&row[index]))
                .chain(std::iter::once(display_width(column)))
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    let rule = widths
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>();

    out.push_str(&table_line(&result.columns, &widths));
    out.push_str(&table_line(&rule, &widths));
    for row in &rows {
        out.push_str(&table_line(row, &widths));
    }

    out
}

fn table_line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let mut line = cells
        .iter()
        .map(|cell| cell.as_ref())
        .zip(widths)
        .map(|(cell, width)| {
            let padding = width.saturating_sub(display_width(cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.truncate(line.trim_end().len());
    line.push('\n');
    line
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Terminal column width, counting CJK and fullwidth characters as two.
fn display_width(text: &str) -> usize {
    text.chars()
        .map(|ch| match ch as u32 {
            0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6 => 2,
            _ => 1,
        })
        .sum()
}
