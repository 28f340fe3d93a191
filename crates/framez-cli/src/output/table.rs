//! Plain aligned tables for `--format table`.

const MIN_COLUMN: usize = 4;
const GAP: &str = "  ";

#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

fn width_of(value: &str) -> usize {
    value.chars().count()
}

/// Render `rows` under `headers`, one line per row.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(column, header)| {
            rows.iter()
                .filter_map(|row| row.get(column))
                .map(|cell| width_of(cell))
                .chain([width_of(header), MIN_COLUMN])
                .max()
                .unwrap_or(MIN_COLUMN)
        })
        .collect();
    if let Some(max_width) = options.max_width {
        shrink_to(&mut widths, headers, max_width);
    }

    let header = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| pad(&clip(header, *width), *width))
        .collect::<Vec<_>>()
        .join(GAP);
    let rule = "-".repeat(width_of(&header));

    let mut lines = vec![header, rule];
    for row in rows {
        let line = widths
            .iter()
            .enumerate()
            .map(|(column, width)| {
                let cell = clip(row.get(column).map_or("-", String::as_str), *width);
                let padded = pad(&cell, *width);
                if options.color {
                    colorize(&cell, padded)
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join(GAP);
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

/// Narrow the widest columns first until the table fits.
fn shrink_to(widths: &mut [usize], headers: &[&str], max_width: usize) {
    let gaps = widths.len().saturating_sub(1) * GAP.len();
    while widths.iter().sum::<usize>() + gaps > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|(column, width)| **width > width_of(headers[*column]).max(MIN_COLUMN))
            .max_by_key(|(_, width)| **width)
            .map(|(column, _)| column);
        let Some(column) = widest else {
            break;
        };
        widths[column] -= 1;
    }
}

fn clip(value: &str, width: usize) -> String {
    let single_line = value.replace('\n', " ");
    if width_of(&single_line) <= width {
        return single_line;
    }
    let mut out: String = single_line.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad(value: &str, width: usize) -> String {
    let fill = width.saturating_sub(width_of(value));
    format!("{value}{}", " ".repeat(fill))
}

/// Color session-state words; everything else passes through.
fn colorize(cell: &str, padded: String) -> String {
    let code = match cell {
        "authenticated" | "true" => "32",
        "resolving" => "33",
        "unauthenticated" | "false" => "31",
        _ => return padded,
    };
    format!("\u{1b}[{code}m{padded}\u{1b}[0m")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    #[test]
    fn columns_align_to_widest_cell() {
        let rows = vec![
            vec!["ada".to_string(), "hello".to_string()],
            vec!["grace".to_string(), "a longer post".to_string()],
        ];
        let table = render_table(&["author", "content"], &rows, PLAIN);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "author  content      ");
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[2], "ada     hello");
        assert_eq!(lines[3], "grace   a longer post");
    }

    #[test]
    fn long_cells_are_clipped_to_fit() {
        let rows = vec![vec!["x".to_string(), "y".repeat(100)]];
        let options = TableOptions {
            max_width: Some(40),
            color: false,
        };
        let table = render_table(&["id", "content"], &rows, options);
        assert!(table.lines().all(|line| line.chars().count() <= 40));
        assert!(table.contains('…'));
    }

    #[test]
    fn missing_cells_render_as_dash() {
        let rows = vec![vec!["only".to_string()]];
        let table = render_table(&["a", "b"], &rows, PLAIN);
        assert!(table.lines().nth(2).is_some_and(|line| line.ends_with('-')));
    }
}
