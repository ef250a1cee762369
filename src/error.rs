use crate::token::Token;
use crate::types::Range;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum AnalyzerError {
    FileNotFound(String),
    IO(std::io::Error),
}

impl Error for AnalyzerError {}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnalyzerError::IO(err) => writeln!(f, "IOError: {}", err),
            AnalyzerError::FileNotFound(err) => writeln!(f, "FileNotFoundError: {}", err),
        }
    }
}

impl From<std::io::Error> for AnalyzerError {
    fn from(err: std::io::Error) -> Self {
        AnalyzerError::IO(err)
    }
}

/// A run of characters the tokenizer could not classify.
///
/// `offset` and `length` are counted in characters so the position-lookup
/// service can resolve the end of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub line: u32,
    pub character: u32,
    pub offset: usize,
    pub length: usize,
}

impl Error for LexError {}

impl LexError {
    pub fn new(message: String, line: u32, character: u32, offset: usize, length: usize) -> Self {
        Self {
            message,
            line,
            character,
            offset,
            length,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "LexError: {}\n  --> {}:{}",
            self.message,
            self.line + 1,
            self.character + 1,
        )
    }
}

/// A grammar mismatch. `range` is `None` when the parser ran out of input,
/// in which case the inspector substitutes a zero-width range at document end.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub range: Option<Range>,
}

impl Error for SyntaxError {}

impl SyntaxError {
    pub fn from_token(token: &Token, message: String) -> Self {
        Self {
            message,
            range: Some(token.range),
        }
    }

    pub fn unexpected_end(message: String) -> Self {
        Self {
            message,
            range: None,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.range {
            Some(range) => writeln!(
                f,
                "SyntaxError: {}\n  --> {}:{}",
                self.message,
                range.start.line + 1,
                range.start.character + 1,
            ),
            None => writeln!(f, "SyntaxError: {}\n  --> end of input", self.message),
        }
    }
}
