//! Output formatting: an ASCII table and one-JSON-object-per-line, grounded
//! in `original_source/format.go` (`FormatRowsAsTable`/`asciiTable`) and
//! `original_source/cli/main.go`'s two `formatters` entries.
//!
//! `asciiTable` had a stray `fmt.Println(colWidths)` debug line left in the
//! column-width computation; that was never meant to run in a shipped
//! binary, so it's dropped here rather than carried over (`SPEC_FULL.md`
//! §6).

use tinysql_core::value::Value;

/// Renders `rows` as a bordered ASCII table sized to `width` columns,
/// picking the narrowest percentile of observed cell widths that still fits
/// (`asciiTable`'s iterative `r` loop). An empty result set renders as a bare
/// message rather than an empty border.
pub fn format_table(rows: &[Vec<(String, Value)>], width: usize) -> String {
    let Some(first) = rows.first() else {
        return "(no rows)\n".to_string();
    };
    let header: Vec<String> = first.iter().map(|(name, _)| name.clone()).collect();
    let mut table: Vec<Vec<String>> = vec![header.clone()];
    for row in rows {
        table.push(row.iter().map(|(_, v)| v.to_string()).collect());
    }
    ascii_table(&table, width)
}

fn ascii_table(table: &[Vec<String>], width: usize) -> String {
    let cols = table[0].len();
    let mut col_widths: Vec<Vec<usize>> = vec![Vec::with_capacity(table.len()); cols];
    for row in table {
        for (i, cell) in row.iter().enumerate() {
            col_widths[i].push(cell.chars().count());
        }
    }
    for widths in &mut col_widths {
        widths.sort_unstable();
    }

    let percentile = |xs: &[usize], p: f64| xs[((xs.len() - 1) as f64 * p) as usize];

    let mut col_width = vec![0usize; cols];
    let mut p = 1.0_f64;
    loop {
        let mut table_width = 1usize;
        for (i, w) in col_width.iter_mut().enumerate() {
            *w = percentile(&col_widths[i], p);
            table_width += 1 + *w + 1 + 1;
        }
        if table_width <= width || p <= 0.5 {
            break;
        }
        p -= 0.1;
    }

    let border = || {
        let mut line = String::from("+ ");
        for w in &col_width {
            line.push_str(&"-".repeat(*w));
            line.push_str(" + ");
        }
        line.push('\n');
        line
    };

    let render_row = |cells: &[String]| {
        let mut b = String::from("|");
        for (i, cell) in cells.iter().enumerate() {
            let w = col_width[i];
            let len = cell.chars().count();
            let padded = if len <= w {
                format!("{cell}{}", " ".repeat(w - len))
            } else {
                let truncated: String = cell.chars().take(w.saturating_sub(3)).collect();
                format!("{truncated}...")
            };
            b.push(' ');
            b.push_str(&padded);
            b.push_str(" |");
        }
        b.push('\n');
        b
    };

    let mut out = String::new();
    out.push_str(&border());
    out.push_str(&render_row(&table[0]));
    out.push_str(&border());
    for row in &table[1..] {
        out.push_str(&render_row(row));
    }
    out.push_str(&border());
    out
}

/// Renders `rows` as one JSON object per line. Host rows already have
/// unique column names (`tinysql_core`'s `_N` dedup happens before this
/// ever sees them), so unlike `cli/main.go`'s formatter this doesn't need
/// its own duplicate-name suffixing pass.
pub fn format_json(rows: &[Vec<(String, Value)>]) -> String {
    let mut out = String::new();
    for row in rows {
        let mut obj = serde_json::Map::new();
        for (name, value) in row {
            obj.insert(name.clone(), value_to_json(value));
        }
        out.push_str(&serde_json::to_string(&serde_json::Value::Object(obj)).expect("map serializes"));
        out.push('\n');
    }
    out
}

fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Int(n) => serde_json::Value::from(*n),
        Value::Double(d) => serde_json::Number::from_f64(*d).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null),
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Array(xs) => serde_json::Value::Array(xs.iter().map(value_to_json).collect()),
        Value::Json(s) => serde_json::from_str(s).unwrap_or(serde_json::Value::String(s.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_with_no_rows_prints_placeholder() {
        assert_eq!(format_table(&[], 80), "(no rows)\n");
    }

    #[test]
    fn table_header_and_row_are_bordered() {
        let rows = vec![vec![("id".to_string(), Value::Int(1)), ("name".to_string(), Value::String("a".into()))]];
        let out = format_table(&rows, 80);
        assert!(out.contains("id"));
        assert!(out.contains("name"));
        assert!(out.contains('1'));
        assert!(out.starts_with("+ "));
    }

    #[test]
    fn json_emits_one_object_per_line() {
        let rows = vec![
            vec![("id".to_string(), Value::Int(1))],
            vec![("id".to_string(), Value::Int(2))],
        ];
        let out = format_json(&rows);
        assert_eq!(out, "{\"id\":1}\n{\"id\":2}\n");
    }
}
