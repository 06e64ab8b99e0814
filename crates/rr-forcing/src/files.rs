//! Forcing folder enumeration and filename timestamps.

use std::path::Path;

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::debug;

use crate::error::{ForcingError, ForcingResult};

/// Parse the model timestamp encoded in a forcing/observation file name.
///
/// The naming convention puts a `%Y%m%d%H%M` stamp at the front of the
/// name (e.g. `202108231400.CHRTOUT_DOMAIN1`), which is also what makes
/// lexical order chronological.
pub fn file_timestamp(file: &str) -> ForcingResult<NaiveDateTime> {
    let digits: String = file.chars().take_while(char::is_ascii_digit).collect();
    if digits.len() != 12 {
        return Err(ForcingError::BadTimestamp {
            file: file.to_string(),
        });
    }
    NaiveDateTime::parse_from_str(&digits, "%Y%m%d%H%M").map_err(|_| ForcingError::BadTimestamp {
        file: file.to_string(),
    })
}

/// Compile a shell-style glob (`*`, `?`) into an anchored regex.
fn glob_to_regex(pattern: &str) -> ForcingResult<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr).map_err(|source| ForcingError::BadPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// One-shot scan of `folder` for file names matching `pattern`, sorted
/// lexically. This is the only filesystem touch in window building; it
/// runs once per outer loop sequence, never per segment.
pub fn list_matching_files(folder: &Path, pattern: &str) -> ForcingResult<Vec<String>> {
    let matcher = glob_to_regex(pattern)?;
    let entries = std::fs::read_dir(folder).map_err(|source| ForcingError::Scan {
        path: folder.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ForcingError::Scan {
            path: folder.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if matcher.is_match(&name) {
            files.push(name);
        }
    }
    files.sort();
    debug!(folder = %folder.display(), pattern, matched = files.len(), "forcing folder scanned");
    Ok(files)
}
