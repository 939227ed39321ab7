//! `source::path` selectors of a download request.

use filegate_core::error::AppError;
use filegate_core::result::AppResult;

const SOURCE_SEPARATOR: &str = "::";
const LIST_SEPARATOR: &str = "||";

/// One requested entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelector {
    /// Source name. Empty for share requests, which are pinned to the
    /// link's source.
    pub source: String,
    /// Logical path relative to the actor's scope.
    pub path: String,
}

impl FileSelector {
    pub fn new(source: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            path: path.into(),
        }
    }

    /// Parse `source::path`, or a bare `path`.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let (source, path) = match raw.split_once(SOURCE_SEPARATOR) {
            Some((source, path)) => (source.trim(), path),
            None => ("", raw),
        };
        if path.is_empty() {
            return Err(AppError::validation(format!("Invalid file selector: '{raw}'")));
        }
        Ok(Self::new(source, path))
    }

    /// Parse a `||`-separated selector list. Empty items are ignored.
    pub fn parse_list(raw: &str) -> AppResult<Vec<Self>> {
        let selectors = raw
            .split(LIST_SEPARATOR)
            .filter(|item| !item.trim().is_empty())
            .map(Self::parse)
            .collect::<AppResult<Vec<_>>>()?;
        if selectors.is_empty() {
            return Err(AppError::validation("No files specified"));
        }
        Ok(selectors)
    }
}
