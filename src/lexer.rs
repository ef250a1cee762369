use crate::error::LexError;
use crate::token::{Kind, Token};
use crate::types::{Position, Range};
use regex::Regex;

/// One entry of the token table. `kind: None` marks a skipped pattern
/// (plain whitespace produces no token).
struct TokenDef {
    kind: Option<Kind>,
    pattern: Regex,
}

pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

/// Regex-table tokenizer. Patterns are tried in declaration order and the
/// first match wins, so longer keywords (`hidetextbox`, `unload_textures`)
/// are listed before their prefixes (`hide`).
pub struct Lexer<'a> {
    source: &'a str,
    table: Vec<TokenDef>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            table: build_table(),
        }
    }

    /// Tokenizing is total: unmatched character runs are collected into
    /// `LexError` records and scanning resumes at the next matchable position.
    pub fn tokenize(&self) -> LexResult {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        let mut byte_pos = 0usize;
        let mut char_offset = 0usize;
        let mut line = 0u32;
        let mut character = 0u32;

        // (position, char offset, byte offset) of the current unmatched run
        let mut pending: Option<(Position, usize, usize)> = None;

        while byte_pos < self.source.len() {
            let rest = &self.source[byte_pos..];

            match self.match_at(rest) {
                Some((kind, len)) => {
                    if let Some(start) = pending.take() {
                        errors.push(make_error(self.source, start, char_offset, byte_pos));
                    }

                    let text = &rest[..len];
                    let start = Position::new(line, character);
                    advance(text, &mut line, &mut character, &mut char_offset);
                    let end = Position::new(line, character);

                    if let Some(kind) = kind {
                        tokens.push(Token {
                            kind,
                            text: text.to_string(),
                            range: Range::new(start, end),
                        });
                    }
                    byte_pos += len;
                }
                None => {
                    if pending.is_none() {
                        pending = Some((Position::new(line, character), char_offset, byte_pos));
                    }
                    let ch = rest.chars().next().unwrap_or('\0');
                    advance(&rest[..ch.len_utf8()], &mut line, &mut character, &mut char_offset);
                    byte_pos += ch.len_utf8();
                }
            }
        }

        if let Some(start) = pending.take() {
            errors.push(make_error(self.source, start, char_offset, byte_pos));
        }

        tokens.push(Token {
            kind: Kind::Eof,
            text: String::new(),
            range: Range::empty(Position::new(line, character)),
        });

        LexResult { tokens, errors }
    }

    fn match_at(&self, rest: &str) -> Option<(Option<Kind>, usize)> {
        for def in &self.table {
            if let Some(m) = def.pattern.find(rest) {
                if m.end() > 0 {
                    return Some((def.kind, m.end()));
                }
            }
        }
        None
    }
}

fn advance(text: &str, line: &mut u32, character: &mut u32, char_offset: &mut usize) {
    for ch in text.chars() {
        if ch == '\n' {
            *line += 1;
            *character = 0;
        } else {
            *character += 1;
        }
        *char_offset += 1;
    }
}

fn make_error(
    source: &str,
    start: (Position, usize, usize),
    char_offset: usize,
    byte_pos: usize,
) -> LexError {
    let (position, start_chars, start_bytes) = start;
    let run = &source[start_bytes..byte_pos];
    LexError::new(
        format!("Unrecognized character sequence \"{}\"", run.trim_end()),
        position.line,
        position.character,
        start_chars,
        char_offset - start_chars,
    )
}

fn build_table() -> Vec<TokenDef> {
    let def = |kind: Option<Kind>, pattern: &str| TokenDef {
        kind,
        pattern: Regex::new(pattern).unwrap(),
    };

    vec![
        def(Some(Kind::Str), r#"^(?:"(?:[^"]|\\")*[^\\]"|"")"#),
        def(Some(Kind::Number), r"^-?[0-9]+(?:\.[0-9]+)?"),
        def(Some(Kind::Endline), r"^(?:\s*(?:\r\n|\r|\n))+"),
        def(None, r"^\s+"),
        def(Some(Kind::LParen), r"^\("),
        def(Some(Kind::RParen), r"^\)"),
        def(Some(Kind::Colon), r"^:"),
        def(Some(Kind::Comma), r"^,"),
        def(Some(Kind::Fade), r"^fade"),
        def(Some(Kind::HideTextbox), r"^hidetextbox"),
        def(Some(Kind::UnloadTextures), r"^unload_textures"),
        def(Some(Kind::Show), r"^show"),
        def(Some(Kind::Hide), r"^hide"),
        def(Some(Kind::Scale), r"^scale"),
        def(Some(Kind::Move), r"^move"),
        def(Some(Kind::Play), r"^play"),
        def(Some(Kind::Stop), r"^stop"),
        def(Some(Kind::Volume), r"^volume"),
        def(Some(Kind::Say), r"^say(?:_legacy)?"),
        def(Some(Kind::Wait), r"^wait"),
        def(Some(Kind::Auto), r"^auto(?:play_legacy)?"),
        def(
            Some(Kind::Easing),
            r"^(?:linear|(?:sine|cube|ease)(?:inout|outin|in|out))",
        ),
        def(Some(Kind::Loop), r"^loop"),
        def(Some(Kind::Clear), r"^clear"),
        def(Some(Kind::Drawing), r"^(?:normal|overlay)"),
    ]
}
