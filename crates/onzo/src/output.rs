use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Print one record: JSON object, two-column table, `key=value` line, or
/// bare values.
pub fn print_record<T: Serialize>(record: &T, fields: &[(&str, String)], format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json(record)),
        OutputFormat::Table => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            for (name, value) in fields {
                table.add_row(vec![name.to_string(), value.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let line: Vec<String> = fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
            println!("{}", line.join(" "));
        }
        OutputFormat::Raw => {
            let line: Vec<&str> = fields.iter().map(|(_, v)| v.as_str()).collect();
            println!("{}", line.join(" "));
        }
    }
}

/// Print a list of rows: JSON array, table, or one line per row.
pub fn print_rows<T: Serialize>(
    records: &[T],
    header: Vec<&str>,
    rows: Vec<Vec<String>>,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => println!("{}", to_json(&records)),
        OutputFormat::Table => {
            let mut table = new_table(header);
            for row in rows {
                table.add_row(row);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in rows {
                let line: Vec<String> = header
                    .iter()
                    .zip(row)
                    .map(|(k, v)| format!("{}={v}", k.to_lowercase()))
                    .collect();
                println!("{}", line.join(" "));
            }
        }
        OutputFormat::Raw => {
            for row in rows {
                println!("{}", row.join(" "));
            }
        }
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

pub fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        power: u64,
    }

    #[test]
    fn json_is_single_line() {
        let json = to_json(&Sample { power: 1500 });
        assert_eq!(json, r#"{"power":1500}"#);
    }

    #[test]
    fn json_array_for_rows() {
        let json = to_json(&[Sample { power: 1 }, Sample { power: 2 }][..]);
        assert_eq!(json, r#"[{"power":1},{"power":2}]"#);
    }
}
