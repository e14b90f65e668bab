//! Operator-facing output
//!
//! Command handlers report through [`Report`]: plain messages, a single
//! pretty-printed record, or a list narrowed to a few summary fields.
//! [`Console`] writes to the terminal; [`Recorder`] keeps everything in
//! memory for tests.

use serde_json::Value;

/// Output sink used by command handlers
pub trait Report {
    /// Report a failure
    fn err(&mut self, message: &str);

    /// Report progress or success
    fn info(&mut self, message: &str);

    /// Pretty-print one value
    fn pp(&mut self, label: &str, value: &Value);

    /// Print a list, showing only `fields` of each item
    fn ppf(&mut self, label: &str, items: &Value, fields: &[&str]);
}

/// Writes `info` to stdout and `err` to stderr, mirroring both to tracing
#[derive(Debug, Default)]
pub struct Console;

impl Report for Console {
    fn err(&mut self, message: &str) {
        tracing::error!("{}", message);
        eprintln!("{}", message);
    }

    fn info(&mut self, message: &str) {
        tracing::info!("{}", message);
        println!("{}", message);
    }

    fn pp(&mut self, label: &str, value: &Value) {
        println!("{}", labeled(label, value));
    }

    fn ppf(&mut self, label: &str, items: &Value, fields: &[&str]) {
        match items.as_array() {
            Some(items) => {
                println!("{}:", label);
                print!("{}", render_table(items, fields));
            }
            None => self.pp(label, items),
        }
    }
}

/// Pretty-print `value` after `label`, adding `": "` unless the label
/// already ends in a separator
fn labeled(label: &str, value: &Value) -> String {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    if label.is_empty() {
        rendered
    } else if label.ends_with(char::is_whitespace) || label.ends_with(':') {
        format!("{}{}", label, rendered)
    } else {
        format!("{}: {}", label, rendered)
    }
}

/// In-memory sink
#[derive(Debug, Default)]
pub struct Recorder {
    pub errors: Vec<String>,
    pub infos: Vec<String>,
    pub printed: Vec<(String, Value)>,
}

impl Report for Recorder {
    fn err(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn info(&mut self, message: &str) {
        self.infos.push(message.to_string());
    }

    fn pp(&mut self, label: &str, value: &Value) {
        self.printed.push((label.to_string(), value.clone()));
    }

    fn ppf(&mut self, label: &str, items: &Value, fields: &[&str]) {
        let rows = items
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| {
                        let row = fields
                            .iter()
                            .map(|field| {
                                (field.to_string(), Value::String(extract_json_value(item, field)))
                            })
                            .collect::<serde_json::Map<_, _>>();
                        Value::Object(row)
                    })
                    .collect::<Vec<_>>()
            })
            .map(Value::Array)
            .unwrap_or_else(|| items.clone());
        self.printed.push((label.to_string(), rows));
    }
}

/// Render items as aligned columns, one header row plus one row per item
pub fn render_table(items: &[Value], fields: &[&str]) -> String {
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| fields.iter().map(|f| extract_json_value(item, f)).collect())
        .collect();

    let widths: Vec<usize> = fields
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, fields.iter().copied(), &widths);
    for row in &rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Extract a value from JSON using a dot-notation path
pub fn extract_json_value(item: &Value, path: &str) -> String {
    let mut current = item;

    for part in path.split('.') {
        let next = match part.parse::<usize>() {
            Ok(idx) => current.get(idx),
            Err(_) => current.get(part),
        };
        current = match next {
            Some(v) => v,
            None => return "-".to_string(),
        };
    }

    match current {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(_) => "[object]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_labeled_separates_label_from_value() {
        assert_eq!(labeled("Entitlements", &Value::Null), "Entitlements: null");
        assert_eq!(labeled("add user: ", &json!("x")), "add user: \"x\"");
        assert_eq!(labeled("", &json!(1)), "1");
    }

    #[test]
    fn test_extract_json_value_paths() {
        let user = json!({
            "userName": "alice",
            "emails": [{"value": "alice@example.com"}],
            "active": true,
            "meta": {"version": 3}
        });
        assert_eq!(extract_json_value(&user, "userName"), "alice");
        assert_eq!(extract_json_value(&user, "emails.0.value"), "alice@example.com");
        assert_eq!(extract_json_value(&user, "emails.1.value"), "-");
        assert_eq!(extract_json_value(&user, "active"), "true");
        assert_eq!(extract_json_value(&user, "meta"), "[object]");
        assert_eq!(extract_json_value(&user, "emails"), "[1 items]");
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let items = vec![
            json!({"displayName": "Engineers", "id": "g1"}),
            json!({"displayName": "QA", "id": "g22"}),
        ];
        let table = render_table(&items, &["displayName", "id"]);
        assert_eq!(
            table,
            "displayName  id\nEngineers    g1\nQA           g22\n"
        );
    }

    #[test]
    fn test_recorder_ppf_keeps_only_summary_fields() {
        let mut recorder = Recorder::default();
        recorder.ppf(
            "Groups",
            &json!([{"displayName": "QA", "id": "g1", "members": []}]),
            &["displayName", "id"],
        );
        assert_eq!(recorder.printed[0].1, json!([{"displayName": "QA", "id": "g1"}]));
    }
}
