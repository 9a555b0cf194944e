use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Error)]
#[error("invalid glob pattern {pattern:?}")]
pub struct PatternError {
    pattern: String,
    #[source]
    source: globset::Error,
}

/// Resolves `pattern` against `root` and returns the matching files.
///
/// Directories are walked in file-name order, so the result is stable across
/// platforms. A pattern whose base directory does not exist matches nothing.
pub fn resolve(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, PatternError> {
    let absolute = Path::new(pattern).is_absolute();
    // Candidates are relative to `root` with no `.` components.
    let glob = trim_current_dir(pattern);
    let matcher = GlobBuilder::new(glob)
        .literal_separator(true)
        .build()
        .map_err(|source| PatternError {
            pattern: pattern.to_string(),
            source,
        })?
        .compile_matcher();

    let (prefix, depth) = split_literal_prefix(glob);
    let base = root.join(prefix);
    if !base.is_dir() {
        debug!(pattern, base = %base.display(), "base directory does not exist");
        return Ok(vec![]);
    }

    let mut walker = WalkDir::new(&base).follow_links(true).sort_by_file_name();
    if let Some(depth) = depth {
        walker = walker.max_depth(depth);
    }

    let mut files = vec![];
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(pattern, "skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let candidate = if absolute {
            entry.path()
        } else {
            match entry.path().strip_prefix(root) {
                Ok(relative) => relative,
                Err(_) => continue,
            }
        };
        if matcher.is_match(candidate) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn trim_current_dir(mut pattern: &str) -> &str {
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest.trim_start_matches('/');
    }
    pattern
}

/// Splits off the leading path components that contain no glob syntax. Also
/// returns how deep below that prefix a match can be, when that is bounded.
fn split_literal_prefix(pattern: &str) -> (&str, Option<usize>) {
    let components: Vec<&str> = pattern.split('/').collect();
    let literal = components[..components.len() - 1]
        .iter()
        .take_while(|c| !c.contains(['*', '?', '[', ']', '{', '}']))
        .count();

    let prefix_len = components[..literal]
        .iter()
        .map(|c| c.len() + 1)
        .sum::<usize>()
        .saturating_sub(1);
    let prefix = &pattern[..prefix_len];

    let rest = &components[literal..];
    let bounded = !rest.iter().any(|c| c.contains("**")) && !splits_inside_braces(pattern);
    (prefix, bounded.then_some(rest.len()))
}

// `{a/b,c}` makes the component count meaningless.
fn splits_inside_braces(pattern: &str) -> bool {
    let mut depth = 0usize;
    for c in pattern.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '/' if depth > 0 => return true,
            _ => {}
        }
    }
    false
}
