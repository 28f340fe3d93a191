use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(&serde_json::to_value(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Print a status line to stderr unless `--quiet` is set.
pub fn note(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}

fn render_table(value: &Value) -> anyhow::Result<String> {
    let prefs = ui::prefs();
    let options = table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    };

    let rendered = match value {
        Value::Array(items) if items.is_empty() => String::from("(no rows)"),
        Value::Array(items) if items.iter().all(Value::is_object) => {
            let headers = column_order(items);
            let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
            let rows = items
                .iter()
                .filter_map(Value::as_object)
                .map(|map| {
                    headers
                        .iter()
                        .map(|h| map.get(h).map_or_else(|| String::from("-"), cell))
                        .collect()
                })
                .collect::<Vec<Vec<String>>>();
            table::render_table(&header_refs, &rows, options)
        }
        Value::Array(items) => {
            let rows = items.iter().map(|item| vec![cell(item)]).collect::<Vec<_>>();
            table::render_table(&["value"], &rows, options)
        }
        Value::Object(map) => {
            let rows = map
                .iter()
                .map(|(key, value)| vec![key.clone(), cell(value)])
                .collect::<Vec<_>>();
            table::render_table(&["field", "value"], &rows, options)
        }
        scalar => table::render_table(&["value"], &[vec![cell(scalar)]], options),
    };
    Ok(rendered)
}

/// Union of keys across rows, in first-seen order.
fn column_order(items: &[Value]) -> Vec<String> {
    let mut headers = Vec::<String>::new();
    for key in items.iter().filter_map(Value::as_object).flat_map(|m| m.keys()) {
        if !headers.contains(key) {
            headers.push(key.clone());
        }
    }
    headers
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::String(v) => v.clone(),
        Value::Array(items) => format!("[{}]", items.len()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Serialize;

    use super::render;
    use crate::cli::OutputFormat;

    #[derive(Clone, Serialize)]
    struct Row {
        author: &'static str,
        content: &'static str,
        image_url: Option<&'static str>,
    }

    #[test]
    fn json_render_is_valid_json() {
        let value = Row {
            author: "ada",
            content: "hi",
            image_url: None,
        };
        let out = render(&value, OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["author"], "ada");
        assert_eq!(parsed["image_url"], serde_json::Value::Null);
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let rows = vec![
            Row {
                author: "ada",
                content: "hi",
                image_url: None,
            };
            2
        ];
        let out = render(&rows, OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn table_render_keeps_field_order_and_dashes_nulls() {
        let rows = [Row {
            author: "ada",
            content: "hello",
            image_url: None,
        }];
        let out = render(&rows, OutputFormat::Table).expect("table render should work");
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[0].starts_with("author  content"));
        assert!(lines[0].contains("image_url"));
        assert!(lines[2].starts_with("ada "));
        assert!(lines[2].ends_with('-'));
    }

    #[test]
    fn empty_list_renders_placeholder() {
        let rows: Vec<Row> = Vec::new();
        assert_eq!(render(&rows, OutputFormat::Table).expect("render"), "(no rows)");
    }
}
