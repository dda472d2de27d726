pub mod coordinates;
pub mod tables;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::pmcids::Pmcid;
use crate::store::{self, CoordinateRow};

/// Turns a saved article page into a coordinates file at `dest`.
/// Returns the number of coordinates written.
pub trait CoordinateExtractor {
    fn extract(&self, pmcid: &Pmcid, page: &Path, dest: &Path) -> Result<usize>;
}

/// Reads stereotactic coordinates from the HTML tables of a PMC article.
pub struct TableExtractor;

impl CoordinateExtractor for TableExtractor {
    fn extract(&self, pmcid: &Pmcid, page: &Path, dest: &Path) -> Result<usize> {
        let bytes = std::fs::read(page).with_context(|| format!("Failed to read {:?}", page))?;
        let html = String::from_utf8_lossy(&bytes);
        let rows = extract_rows(pmcid, &html);
        debug!("Found {} coordinates for PMCID {}", rows.len(), pmcid);
        store::write_coordinates(dest, &rows)?;
        Ok(rows.len())
    }
}

/// Two-pass pipeline: html → tables → coordinate rows.
pub fn extract_rows(pmcid: &Pmcid, html: &str) -> Vec<CoordinateRow> {
    let tables = tables::find_tables(html);
    debug!("Found {} tables in PMCID {}", tables.len(), pmcid);

    let mut rows = Vec::new();
    for table in &tables {
        for c in coordinates::extract_coordinates(table) {
            rows.push(CoordinateRow {
                pmcid: pmcid.to_string(),
                table_id: table.id.clone(),
                x: c.x,
                y: c.y,
                z: c.z,
            });
        }
    }
    rows
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pmcids::parse_pmcids;

    fn pmcid(s: &str) -> Pmcid {
        parse_pmcids(s).unwrap().remove(0)
    }

    #[test]
    fn article_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/article.html").unwrap();
        let rows = extract_rows(&pmcid("3044478"), &html);

        let t1: Vec<_> = rows.iter().filter(|r| r.table_id == "tab1").collect();
        let t3: Vec<_> = rows.iter().filter(|r| r.table_id == "tab3").collect();
        assert_eq!(t1.len(), 4, "split-column table: {:?}", t1);
        assert_eq!(t3.len(), 2, "combined-column table: {:?}", t3);
        assert!(rows.iter().all(|r| r.table_id != "tab2"), "demographics leaked");
        assert!(rows.iter().all(|r| r.pmcid == "3044478"));

        assert_eq!((t1[0].x, t1[0].y, t1[0].z), (-38.0, 22.0, -4.0));
        assert_eq!((t3[1].x, t3[1].y, t3[1].z), (12.0, -18.0, 6.0));
    }

    #[test]
    fn writes_csv_next_to_page() {
        let dir = tempfile::tempdir().unwrap();
        let id = pmcid("3044478");
        let page = store::article_path(dir.path(), &id);
        let dest = store::coordinates_path(dir.path(), &id);
        std::fs::copy("tests/fixtures/article.html", &page).unwrap();

        let n = TableExtractor.extract(&id, &page, &dest).unwrap();
        assert_eq!(n, 6);
        assert_eq!(store::read_coordinates(&dest).unwrap().len(), 6);
    }

    #[test]
    fn page_without_tables_gives_header_only_csv() {
        let dir = tempfile::tempdir().unwrap();
        let id = pmcid("1");
        let page = dir.path().join("page.html");
        let dest = dir.path().join("coords.csv");
        std::fs::write(&page, "<html><body><p>Editorial</p></body></html>").unwrap();

        assert_eq!(TableExtractor.extract(&id, &page, &dest).unwrap(), 0);
        assert!(store::read_coordinates(&dest).unwrap().is_empty());
    }

    #[test]
    fn missing_page_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let r = TableExtractor.extract(
            &pmcid("1"),
            &dir.path().join("absent.html"),
            &dir.path().join("out.csv"),
        );
        assert!(r.is_err());
    }
}
