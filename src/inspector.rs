use crate::checker::check;
use crate::config::Rules;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::types::{Diagnostic, Event, Pos, Position, Range};

/// Interface to the text-position arithmetic the shell owns. Offsets are
/// counted in characters.
pub trait PositionLookup {
    fn position_at(&self, offset: usize) -> Position;
    fn offset_at(&self, position: Position) -> usize;
}

pub struct InspectResult {
    /// `None` when syntax errors suppressed the semantic pass.
    pub events: Option<Vec<Pos<Event>>>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs the full pipeline over one document. Lexical errors do not stop
/// parsing; any syntax error skips the checker so cascades of nonsense
/// semantic diagnostics never reach the editor.
pub fn inspect(
    uri: &str,
    text: &str,
    lookup: &dyn PositionLookup,
    rules: &Rules,
) -> InspectResult {
    let mut diagnostics = Vec::new();

    let lexed = Lexer::new(text).tokenize();
    for error in &lexed.errors {
        let start = Position::new(error.line, error.character);
        let end = lookup.position_at(lookup.offset_at(start) + error.length);
        diagnostics.push(Diagnostic::error(
            error.message.clone(),
            Range::new(start, end),
        ));
    }

    let parsed = Parser::new(lexed.tokens).parse();
    if !parsed.errors.is_empty() {
        let document_end = lookup.position_at(text.chars().count());
        for error in parsed.errors {
            let range = error
                .range
                .unwrap_or_else(|| Range::empty(document_end));
            diagnostics.push(Diagnostic::error(error.message, range));
        }
        return InspectResult {
            events: None,
            diagnostics,
        };
    }

    let checked = check(&parsed.document, uri, rules);
    diagnostics.extend(checked.errors);
    InspectResult {
        events: Some(checked.events),
        diagnostics,
    }
}
