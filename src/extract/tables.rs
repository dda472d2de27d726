use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static TABLE_WRAP: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".table-wrap").unwrap());
static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static HEAD_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("thead > tr").unwrap());
static BODY_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tbody > tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th, td").unwrap());

const MAX_SPAN: usize = 64;

/// A table flattened to text: one header label per column plus body rows.
#[derive(Debug, Clone)]
pub struct Table {
    pub id: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Collect the tables of an article page.
///
/// Tables are looked up inside `.table-wrap` containers, whose `id` names
/// the table. Pages without such containers fall back to bare `<table>`s.
pub fn find_tables(html: &str) -> Vec<Table> {
    let doc = Html::parse_document(html);

    let wraps: Vec<ElementRef> = doc.select(&TABLE_WRAP).collect();
    if !wraps.is_empty() {
        return wraps
            .iter()
            .enumerate()
            .filter_map(|(i, wrap)| {
                let table = wrap.select(&TABLE).next()?;
                let id = wrap
                    .value()
                    .attr("id")
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("table_{}", i + 1));
                Some(flatten(id, table))
            })
            .collect();
    }

    doc.select(&TABLE)
        .enumerate()
        .map(|(i, table)| {
            let id = table
                .value()
                .attr("id")
                .map(str::to_string)
                .unwrap_or_else(|| format!("table_{}", i + 1));
            flatten(id, table)
        })
        .collect()
}

fn flatten(id: String, table: ElementRef) -> Table {
    let head_rows: Vec<ElementRef> = table.select(&HEAD_ROW).collect();
    let mut body_rows: Vec<ElementRef> = table.select(&BODY_ROW).collect();

    // No <thead>: leading rows made only of <th> act as the header.
    let head = if head_rows.is_empty() {
        let n = body_rows.iter().take_while(|tr| is_header_row(tr)).count();
        expand_rows(body_rows.drain(..n))
    } else {
        expand_rows(head_rows)
    };

    Table {
        id,
        header: merge_header_rows(&head),
        rows: expand_rows(body_rows),
    }
}

fn is_header_row(tr: &ElementRef) -> bool {
    let mut cells = tr.select(&CELL).peekable();
    cells.peek().is_some() && cells.all(|c| c.value().name() == "th")
}

/// Cell texts per row, repeating spanned cells so columns line up.
fn expand_rows<'a>(rows: impl IntoIterator<Item = ElementRef<'a>>) -> Vec<Vec<String>> {
    // per column: text still spanning down, and how many more rows it covers
    let mut pending: Vec<Option<(String, usize)>> = Vec::new();
    let mut out = Vec::new();

    for tr in rows {
        let mut row = Vec::new();
        let mut cells = tr.select(&CELL);
        let mut col = 0;
        loop {
            if let Some(Some((text, left))) = pending.get_mut(col) {
                row.push(text.clone());
                *left -= 1;
                if *left == 0 {
                    pending[col] = None;
                }
                col += 1;
                continue;
            }
            let Some(cell) = cells.next() else {
                if pending.iter().skip(col).any(Option::is_some) {
                    row.push(String::new());
                    col += 1;
                    continue;
                }
                break;
            };
            let text = cell_text(cell);
            let colspan = span(&cell, "colspan");
            let rowspan = span(&cell, "rowspan");
            for _ in 0..colspan {
                if rowspan > 1 {
                    if pending.len() <= col {
                        pending.resize(col + 1, None);
                    }
                    pending[col] = Some((text.clone(), rowspan - 1));
                }
                row.push(text.clone());
                col += 1;
            }
        }
        out.push(row);
    }
    out
}

fn span(cell: &ElementRef, attr: &str) -> usize {
    cell.value()
        .attr(attr)
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

fn cell_text(cell: ElementRef) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stack multi-row headers into one label per column ("MNI coordinates x").
fn merge_header_rows(rows: &[Vec<String>]) -> Vec<String> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    (0..width)
        .map(|col| {
            let mut parts: Vec<&str> = Vec::new();
            for row in rows {
                if let Some(text) = row.get(col) {
                    if !text.is_empty() && parts.last() != Some(&text.as_str()) {
                        parts.push(text);
                    }
                }
            }
            parts.join(" ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colspan_header_is_merged() {
        let html = r#"<div class="table-wrap" id="tab1"><table>
            <thead>
              <tr><th rowspan="2">Region</th><th colspan="3">MNI</th></tr>
              <tr><th>x</th><th>y</th><th>z</th></tr>
            </thead>
            <tbody><tr><td>Insula</td><td>1</td><td>2</td><td>3</td></tr></tbody>
        </table></div>"#;
        let tables = find_tables(html);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].id, "tab1");
        assert_eq!(tables[0].header, vec!["Region", "MNI x", "MNI y", "MNI z"]);
        assert_eq!(tables[0].rows, vec![vec!["Insula", "1", "2", "3"]]);
    }

    #[test]
    fn rowspan_carries_into_following_rows() {
        let html = r#"<table><tbody>
            <tr><td rowspan="2">Left</td><td>1</td></tr>
            <tr><td>2</td></tr>
        </tbody></table>"#;
        let tables = find_tables(html);
        assert_eq!(tables[0].rows, vec![vec!["Left", "1"], vec!["Left", "2"]]);
    }

    #[test]
    fn th_rows_without_thead_become_header() {
        let html = r#"<table id="t"><tr><th>x</th><th>y</th></tr><tr><td>1</td><td>2</td></tr></table>"#;
        let tables = find_tables(html);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].id, "t");
        assert_eq!(tables[0].header, vec!["x", "y"]);
        assert_eq!(tables[0].rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn wrap_without_id_gets_positional_name() {
        let html = r#"<div class="table-wrap"><table><tr><td>a</td></tr></table></div>
                      <div class="table-wrap"><table><tr><td>b</td></tr></table></div>"#;
        let ids: Vec<String> = find_tables(html).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["table_1", "table_2"]);
    }

    #[test]
    fn page_without_tables() {
        assert!(find_tables("<html><body><p>No tables here</p></body></html>").is_empty());
    }
}
