//! PMCID list reader.
//!
//! One identifier per line, without the `PMC` prefix. Blank lines are
//! skipped; a stray `PMC` prefix is stripped.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pmcid(String);

impl Pmcid {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pmcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("line {line}: empty identifier after stripping PMC prefix")]
    Empty { line: usize },
    #[error("line {line}: {token:?} is not a numeric PMCID")]
    NotNumeric { line: usize, token: String },
}

pub fn read_pmcids(path: &Path) -> Result<Vec<Pmcid>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read PMCID list {:?}", path))?;
    let ids = parse_pmcids(&text)
        .with_context(|| format!("Invalid PMCID list {:?}", path))?;
    Ok(ids)
}

pub fn parse_pmcids(text: &str) -> Result<Vec<Pmcid>, InputError> {
    let mut ids = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let token = raw.trim();
        if token.is_empty() {
            continue;
        }
        ids.push(parse_one(token, line)?);
    }
    Ok(ids)
}

fn parse_one(token: &str, line: usize) -> Result<Pmcid, InputError> {
    let bare = match token.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("pmc") => &token[3..],
        _ => token,
    };
    if bare.is_empty() {
        return Err(InputError::Empty { line });
    }
    if !bare.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::NotNumeric {
            line,
            token: token.to_string(),
        });
    }
    Ok(Pmcid(bare.to_string()))
}
