//! Line-oriented config files: the agents roster, allowed-images list and
//! user store all share the same skeleton — one entry per line, `#`
//! comments and blank lines ignored.

use std::io;
use std::path::Path;

/// Split file content into trimmed, non-comment, non-empty lines.
pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_owned)
        .collect()
}

/// Load entries from a file; an absent file reads as an empty list, which
/// callers interpret as "no restriction".
pub async fn load_lines(path: &Path) -> io::Result<Vec<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(parse_lines(&content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}
