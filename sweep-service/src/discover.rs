// Input Discovery
// Resolves filename patterns into candidate value lists before a sweep runs.
// The execution core never touches the filesystem; it receives the plain
// string lists this module produces.

use crate::error::{SetupError, SetupResult};

use std::fs;
use std::path::Path;

/// Expand a filename pattern such as `map/orz*.map` into a sorted list of
/// matching paths.
///
/// Only the final path component may contain wildcards (`*` matches any run
/// of characters, `?` exactly one). A pattern without wildcards resolves to
/// itself when the file exists and to an empty list otherwise. Zero matches
/// is a valid result; an unreadable directory is a setup error.
pub fn discover(pattern: &str) -> SetupResult<Vec<String>> {
    let (dir, file_pattern) = match pattern.rsplit_once('/') {
        Some((dir, file)) => (dir, file),
        None => (".", pattern),
    };

    if !contains_wildcard(file_pattern) {
        if Path::new(pattern).exists() {
            return Ok(vec![pattern.to_string()]);
        }
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|source| SetupError::Discover {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SetupError::Discover {
            pattern: pattern.to_string(),
            source,
        })?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if pattern_match(file_pattern, name) {
            matches.push(format!("{}/{}", dir, name));
        }
    }

    // read_dir order is platform-dependent; sweeps must enumerate
    // deterministically
    matches.sort();
    Ok(matches)
}

/// Check if a pattern component contains wildcard metacharacters
pub fn contains_wildcard(s: &str) -> bool {
    s.contains('*') || s.contains('?')
}

/// Match a filename against a wildcard pattern.
///
/// `*` matches zero or more characters, `?` matches exactly one. The
/// pattern must cover the entire input.
pub fn pattern_match(pattern: &str, input: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let input: Vec<char> = input.chars().collect();
    match_at(&pattern, &input)
}

fn match_at(pattern: &[char], input: &[char]) -> bool {
    match pattern.first() {
        None => input.is_empty(),
        Some('*') => (0..=input.len()).any(|skip| match_at(&pattern[1..], &input[skip..])),
        Some('?') => !input.is_empty() && match_at(&pattern[1..], &input[1..]),
        Some(&c) => input.first() == Some(&c) && match_at(&pattern[1..], &input[1..]),
    }
}
