//! Loader for the persisted barcode source.

use crate::error::{StorageError, StorageResult};
use pairlight_core::{Barcode, LedIndex};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Read the barcode source: one `token;position` per line.
///
/// `#`-prefixed lines and blank lines are ignored. Malformed lines,
/// out-of-range positions, duplicate tokens, duplicate positions, and tokens
/// reserved for administrative commands are skipped with a warning.
/// Insertion order of the surviving entries is preserved.
///
/// # Errors
/// Returns `StorageError::Io` if the file itself cannot be read; individual
/// bad records are never fatal.
pub fn load_positions(
    path: impl AsRef<Path>,
    reserved: &[String],
) -> StorageResult<Vec<(Barcode, LedIndex)>> {
    let content = fs::read_to_string(path)?;

    let mut entries = Vec::new();
    let mut seen_tokens = HashSet::new();
    let mut seen_positions = HashSet::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (token, position) = match parse_line(line) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Skipping barcode source line: {e}");
                continue;
            }
        };

        if reserved.iter().any(|r| r.as_str() == token.as_str()) {
            warn!("Skipping reserved token '{token}' found in barcode source");
            continue;
        }
        if !seen_tokens.insert(token.clone()) {
            warn!("Skipping duplicate token '{token}' in barcode source");
            continue;
        }
        if !seen_positions.insert(position) {
            warn!("Skipping token '{token}': position {position} already taken");
            continue;
        }

        entries.push((token, position));
    }

    Ok(entries)
}

fn parse_line(line: &str) -> StorageResult<(Barcode, LedIndex)> {
    let (token, position) = line
        .split_once(';')
        .ok_or_else(|| StorageError::invalid_record(line, "expected 'token;position'"))?;

    let token = Barcode::new(token).map_err(|e| StorageError::invalid_record(line, e.to_string()))?;
    let position: u16 = position
        .trim()
        .parse()
        .map_err(|_| StorageError::invalid_record(line, "position is not a non-negative integer"))?;
    let position =
        LedIndex::new(position).map_err(|e| StorageError::invalid_record(line, e.to_string()))?;

    Ok((token, position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_preserves_order() {
        let file = source("alpha;3\nbeta;1\ngamma;2\n");
        let entries = load_positions(file.path(), &[]).unwrap();

        let tokens: Vec<&str> = entries.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tokens, vec!["alpha", "beta", "gamma"]);
        assert_eq!(entries[0].1.as_u8(), 3);
    }

    #[test]
    fn test_comments_and_blanks_ignored() {
        let file = source("# header\n\nalpha;0\n   \n# trailing\nbeta;1\n");
        let entries = load_positions(file.path(), &[]).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[rstest]
    #[case("garbage")]
    #[case("beta;notanumber")]
    #[case(";5")]
    #[case("beta;50")]
    #[case("beta;-1")]
    fn test_bad_line_skipped(#[case] line: &str) {
        let file = source(&format!("alpha;0\n{line}\ngamma;49\n"));
        let entries = load_positions(file.path(), &[]).unwrap();

        let tokens: Vec<&str> = entries.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tokens, vec!["alpha", "gamma"]);
    }

    #[test]
    fn test_duplicate_token_and_position_skipped() {
        let file = source("alpha;0\nalpha;1\nbeta;0\ngamma;2\n");
        let entries = load_positions(file.path(), &[]).unwrap();

        let tokens: Vec<&str> = entries.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tokens, vec!["alpha", "gamma"]);
    }

    #[test]
    fn test_reserved_tokens_excluded() {
        let file = source("alpha;0\nRESET;1\nbeta;2\n");
        let entries = load_positions(file.path(), &["RESET".to_string()]).unwrap();

        let tokens: Vec<&str> = entries.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tokens, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_positions("/nonexistent/barcodes.txt", &[]);
        assert!(matches!(result, Err(StorageError::Io(_))));
    }
}
