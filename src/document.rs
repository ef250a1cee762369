use crate::hover::hover_info;
use crate::inspector::PositionLookup;
use crate::types::{Event, Pos, Position};
use std::collections::HashMap;

/// Character-offset line index over one document's text. This is the
/// position-lookup service the CLI supplies to the inspector.
pub struct LineIndex {
    /// Char offset of the first character of each line.
    line_starts: Vec<usize>,
    /// Total character count.
    length: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut offset = 0;
        for ch in text.chars() {
            offset += 1;
            if ch == '\n' {
                line_starts.push(offset);
            }
        }
        Self {
            line_starts,
            length: offset,
        }
    }

    fn line_end(&self, line: usize) -> usize {
        self.line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.length)
    }
}

impl PositionLookup for LineIndex {
    fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.length);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(insertion) => insertion - 1,
        };
        Position::new(line as u32, (offset - self.line_starts[line]) as u32)
    }

    fn offset_at(&self, position: Position) -> usize {
        let line = (position.line as usize).min(self.line_starts.len() - 1);
        let start = self.line_starts[line];
        (start + position.character as usize).min(self.line_end(line))
    }
}

/// Latest-result-wins cache of event lists, keyed by document URI. A new
/// analysis for a URI fully replaces the previous one; closing a document
/// drops its entry.
#[derive(Default)]
pub struct DocumentStore {
    events: HashMap<String, Vec<Pos<Event>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, uri: &str, events: Vec<Pos<Event>>) {
        self.events.insert(uri.to_string(), events);
    }

    pub fn close(&mut self, uri: &str) {
        self.events.remove(uri);
    }

    pub fn events(&self, uri: &str) -> Option<&[Pos<Event>]> {
        self.events.get(uri).map(Vec::as_slice)
    }

    pub fn hover(&self, uri: &str, position: Position) -> Option<String> {
        hover_info(self.events(uri)?, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Range;

    #[test]
    fn position_and_offset_round_trip() {
        let index = LineIndex::new("wait 1\nsay \"hi\"\nauto 2");
        assert_eq!(index.position_at(0), Position::new(0, 0));
        assert_eq!(index.position_at(7), Position::new(1, 0));
        assert_eq!(index.position_at(11), Position::new(1, 4));
        assert_eq!(index.offset_at(Position::new(1, 4)), 11);
        assert_eq!(index.offset_at(Position::new(0, 5)), 5);
    }

    #[test]
    fn offsets_clamp_to_document_bounds() {
        let index = LineIndex::new("wait 1");
        assert_eq!(index.position_at(100), Position::new(0, 6));
        assert_eq!(index.offset_at(Position::new(9, 9)), 6);
        // column past the end of a line clamps to the line break
        let index = LineIndex::new("a\nbb");
        assert_eq!(index.offset_at(Position::new(0, 50)), 2);
    }

    #[test]
    fn empty_text_maps_everything_to_origin() {
        let index = LineIndex::new("");
        assert_eq!(index.position_at(0), Position::new(0, 0));
        assert_eq!(index.offset_at(Position::new(3, 7)), 0);
    }

    #[test]
    fn store_replaces_and_drops_per_uri() {
        let mut store = DocumentStore::new();
        let event = Pos::new(
            Range::new(Position::new(0, 0), Position::new(0, 6)),
            Event::HideTextbox,
        );
        store.update("file:///a.vns", vec![event.clone()]);
        assert_eq!(store.events("file:///a.vns").map(|e| e.len()), Some(1));

        store.update("file:///a.vns", Vec::new());
        assert_eq!(store.events("file:///a.vns").map(|e| e.len()), Some(0));

        store.close("file:///a.vns");
        assert!(store.events("file:///a.vns").is_none());
        assert!(store.hover("file:///a.vns", Position::new(0, 1)).is_none());
    }
}
