use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Position in a source text (1-indexed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Compute the line/column of a byte offset into `text`.
    pub fn at(text: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        for (idx, ch) in text.char_indices() {
            if idx >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Grammar-level failures from the stylesheet and selector parsers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected character '{character}' at {position}")]
    UnexpectedChar { character: char, position: Position },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unterminated comment starting at {position}")]
    UnterminatedComment { position: Position },

    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: Position },

    #[error("unbalanced braces in block starting at {position}")]
    UnbalancedBraces { position: Position },

    #[error("missing selector before '{{' at {position}")]
    MissingSelector { position: Position },

    #[error("invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("selector '{selector}' parsed to {found} selectors, expected exactly one")]
    SelectorCount { selector: String, found: usize },
}

impl ParseError {
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }
}

/// Pipeline-level errors, carrying enough context to locate the
/// offending file.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{}: {source}", .path.display())]
    Parse { path: PathBuf, source: ParseError },

    #[error("{}: malformed object file: {source}", .path.display())]
    Artifact {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{}: not under source root {}", .path.display(), .root.display())]
    OutsideSourceRoot { path: PathBuf, root: PathBuf },
}

impl Error {
    pub fn parse(path: &Path, source: ParseError) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn artifact(path: &Path, source: serde_json::Error) -> Self {
        Self::Artifact {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_at_offsets() {
        let text = "a {\n  color: red;\n}";
        assert_eq!(Position::at(text, 0), Position::new(1, 1));
        assert_eq!(Position::at(text, 2), Position::new(1, 3));
        assert_eq!(Position::at(text, 4), Position::new(2, 1));
    }

    #[test]
    fn error_display_includes_path() {
        let err = Error::parse(Path::new("src/app.css"), ParseError::UnexpectedEof);
        assert_eq!(format!("{err}"), "src/app.css: unexpected end of input");
    }
}
