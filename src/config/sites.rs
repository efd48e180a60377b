//! Account list parsing.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Split account names separated by commas, whitespace or line breaks.
pub fn parse_sites(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read an account list file.
pub fn load_sites_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_sites(&content))
}
