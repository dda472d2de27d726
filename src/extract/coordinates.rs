use std::sync::LazyLock;

use regex::Regex;

use super::tables::Table;

/// Header naming a single axis, optionally followed by a unit: "x", "MNI y (mm)".
static AXIS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[\s,;/])([xyz])\s*(?:\([^)]*\)|\[[^\]]*\]|mm)?\s*$").unwrap()
});
/// Header of a column holding all three coordinates in one cell.
static COMBINED_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)coord|x\s*,\s*y\s*,\s*z|\bxyz\b|\bmni\b|talairach").unwrap()
});
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-+]?(?:\d+(?:\.\d*)?|\.\d+)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Pull (x, y, z) triplets out of one table.
///
/// Tables with consecutive x / y / z columns are read column-wise, every
/// such group in turn. Otherwise a single column holding "x, y, z" per cell
/// is used. Rows that don't parse are dropped.
pub fn extract_coordinates(table: &Table) -> Vec<Coordinate> {
    let groups = axis_groups(&table.header);
    if !groups.is_empty() {
        let mut out = Vec::new();
        for row in &table.rows {
            for &first in &groups {
                if let Some(c) = split_triplet(row, first) {
                    out.push(c);
                }
            }
        }
        return out;
    }

    match combined_column(table) {
        Some(col) => table
            .rows
            .iter()
            .filter_map(|row| row.get(col).and_then(|cell| parse_triplet(cell)))
            .collect(),
        None => Vec::new(),
    }
}

fn axis_of(header: &str) -> Option<char> {
    let caps = AXIS_HEADER.captures(header.trim())?;
    caps.get(1)?.as_str().chars().next().map(|c| c.to_ascii_lowercase())
}

/// Start indices of every x, y, z run of columns.
fn axis_groups(header: &[String]) -> Vec<usize> {
    let axes: Vec<Option<char>> = header.iter().map(|h| axis_of(h)).collect();
    axes.windows(3)
        .enumerate()
        .filter(|(_, w)| matches!(w, [Some('x'), Some('y'), Some('z')]))
        .map(|(i, _)| i)
        .collect()
}

fn combined_column(table: &Table) -> Option<usize> {
    let col = table.header.iter().position(|h| COMBINED_HEADER.is_match(h))?;
    let usable = table
        .rows
        .iter()
        .any(|row| row.get(col).and_then(|cell| parse_triplet(cell)).is_some());
    usable.then_some(col)
}

fn split_triplet(row: &[String], first: usize) -> Option<Coordinate> {
    Some(Coordinate {
        x: parse_single(row.get(first)?)?,
        y: parse_single(row.get(first + 1)?)?,
        z: parse_single(row.get(first + 2)?)?,
    })
}

fn parse_single(cell: &str) -> Option<f64> {
    let cell = normalize_signs(cell);
    let mut nums = NUMBER.find_iter(&cell);
    let value = nums.next()?.as_str().parse().ok()?;
    if nums.next().is_some() {
        return None;
    }
    Some(value)
}

fn parse_triplet(cell: &str) -> Option<Coordinate> {
    let cell = normalize_signs(cell);
    let nums: Vec<f64> = NUMBER
        .find_iter(&cell)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    match nums[..] {
        [x, y, z] => Some(Coordinate { x, y, z }),
        _ => None,
    }
}

/// Typeset minus signs and dashes to ASCII hyphen-minus.
pub fn normalize_signs(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2212}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{FE63}' | '\u{FF0D}' => '-',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(header: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            id: "T1".into(),
            header: header.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn c(x: f64, y: f64, z: f64) -> Coordinate {
        Coordinate { x, y, z }
    }

    #[test]
    fn split_columns_with_unicode_minus() {
        let t = table(
            &["Region", "BA", "x", "y", "z", "Z-score"],
            &[
                &["Insula", "13", "\u{2212}42", "18", "\u{2212}6", "4.1"],
                &["Precuneus", "7", "4", "\u{2013}62", "38.5", "3.9"],
            ],
        );
        assert_eq!(
            extract_coordinates(&t),
            vec![c(-42.0, 18.0, -6.0), c(4.0, -62.0, 38.5)]
        );
    }

    #[test]
    fn leading_dot_decimals_keep_their_sign() {
        assert_eq!(parse_single("-.5"), Some(-0.5));
        assert_eq!(parse_single("\u{2212}.25"), Some(-0.25));
        assert_eq!(parse_triplet("-.5, 2, 3"), Some(c(-0.5, 2.0, 3.0)));

        let t = table(&["x", "y", "z"], &[&["-.5", "12.", ".75"]]);
        assert_eq!(extract_coordinates(&t), vec![c(-0.5, 12.0, 0.75)]);
    }

    #[test]
    fn headers_with_units_and_group_labels() {
        let t = table(&["MNI x (mm)", "MNI y (mm)", "MNI z (mm)"], &[&["1", "2", "3"]]);
        assert_eq!(extract_coordinates(&t), vec![c(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn two_coordinate_groups_per_row() {
        let t = table(
            &["Left x", "Left y", "Left z", "Right x", "Right y", "Right z"],
            &[&["-30", "10", "2", "32", "12", "0"]],
        );
        assert_eq!(
            extract_coordinates(&t),
            vec![c(-30.0, 10.0, 2.0), c(32.0, 12.0, 0.0)]
        );
    }

    #[test]
    fn section_rows_are_skipped() {
        let t = table(
            &["Region", "x", "y", "z"],
            &[
                &["Positive effects", "Positive effects", "Positive effects", "Positive effects"],
                &["ACC", "2", "40", "10"],
            ],
        );
        assert_eq!(extract_coordinates(&t), vec![c(2.0, 40.0, 10.0)]);
    }

    #[test]
    fn combined_column() {
        let t = table(
            &["Region", "MNI coordinates (x, y, z)", "t"],
            &[
                &["Amygdala", "\u{2212}24, \u{2212}4, \u{2212}18", "5.2"],
                &["Thalamus", "(10 \u{2212}16 8)", "4.4"],
                &["Cluster", "n/a", "3.0"],
            ],
        );
        assert_eq!(
            extract_coordinates(&t),
            vec![c(-24.0, -4.0, -18.0), c(10.0, -16.0, 8.0)]
        );
    }

    #[test]
    fn unrelated_table_yields_nothing() {
        let t = table(
            &["Group", "Age", "Sex"],
            &[&["Patients", "34.2", "F"], &["Controls", "33.9", "M"]],
        );
        assert!(extract_coordinates(&t).is_empty());
    }

    #[test]
    fn axis_header_detection() {
        assert_eq!(axis_of("x"), Some('x'));
        assert_eq!(axis_of(" Y "), Some('y'));
        assert_eq!(axis_of("Talairach z [mm]"), Some('z'));
        assert_eq!(axis_of("Max"), None);
        assert_eq!(axis_of("Index"), None);
    }
}
