use serde::Serialize;
use std::fmt;

/// Zero-based line/character position, end-exclusive when used in a `Range`.
///
/// The derived ordering (line first, then character) is the document order
/// every sorted list in the checker relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn empty(at: Position) -> Self {
        Self { start: at, end: at }
    }

    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position < self.end
    }
}

/// A value tagged with the source range that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pos<T> {
    pub range: Range,
    pub value: T,
}

impl<T> Pos<T> {
    pub fn new(range: Range, value: T) -> Self {
        Self { range, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Easing {
    Linear,
    SineIn,
    SineOut,
    SineInOut,
    SineOutIn,
    CubeIn,
    CubeOut,
    CubeInOut,
    CubeOutIn,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseOutIn,
}

impl Easing {
    /// The lexer only emits easing tokens matching these exact spellings.
    pub fn from_text(text: &str) -> Option<Easing> {
        match text {
            "linear" => Some(Easing::Linear),
            "sinein" => Some(Easing::SineIn),
            "sineout" => Some(Easing::SineOut),
            "sineinout" => Some(Easing::SineInOut),
            "sineoutin" => Some(Easing::SineOutIn),
            "cubein" => Some(Easing::CubeIn),
            "cubeout" => Some(Easing::CubeOut),
            "cubeinout" => Some(Easing::CubeInOut),
            "cubeoutin" => Some(Easing::CubeOutIn),
            "easein" => Some(Easing::EaseIn),
            "easeout" => Some(Easing::EaseOut),
            "easeinout" => Some(Easing::EaseInOut),
            "easeoutin" => Some(Easing::EaseOutIn),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::SineIn => "sinein",
            Easing::SineOut => "sineout",
            Easing::SineInOut => "sineinout",
            Easing::SineOutIn => "sineoutin",
            Easing::CubeIn => "cubein",
            Easing::CubeOut => "cubeout",
            Easing::CubeInOut => "cubeinout",
            Easing::CubeOutIn => "cubeoutin",
            Easing::EaseIn => "easein",
            Easing::EaseOut => "easeout",
            Easing::EaseInOut => "easeinout",
            Easing::EaseOutIn => "easeoutin",
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Drawing {
    Normal,
    Overlay,
}

impl Drawing {
    pub fn from_text(text: &str) -> Option<Drawing> {
        match text {
            "normal" => Some(Drawing::Normal),
            "overlay" => Some(Drawing::Overlay),
            _ => None,
        }
    }
}

impl fmt::Display for Drawing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Drawing::Normal => f.write_str("normal"),
            Drawing::Overlay => f.write_str("overlay"),
        }
    }
}

/// A timed transition with a named easing curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fade {
    pub transition_time: Pos<f64>,
    pub easing: Pos<Easing>,
}

/// A pair of positioned numbers parsed from `<x>:<y>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Xy {
    pub x: Pos<f64>,
    pub y: Pos<f64>,
}

/// One validated scene directive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Show {
        file_path: Pos<String>,
        image_position: Xy,
        canvas_pivot: Xy,
        image_scale: Xy,
        #[serde(skip_serializing_if = "Option::is_none")]
        fade: Option<Fade>,
        drawing: Pos<Drawing>,
        #[serde(skip_serializing_if = "Option::is_none")]
        scaling: Option<Pos<bool>>,
    },
    Hide {
        file_path: Pos<String>,
        fade: Fade,
    },
    Scale {
        file_path: Pos<String>,
        image_scale: Xy,
        transition_time: Pos<f64>,
        easing: Pos<Easing>,
    },
    Move {
        file_path: Pos<String>,
        movement: Xy,
        transition_time: Pos<f64>,
        easing: Pos<Easing>,
    },
    Play {
        file_path: Pos<String>,
        fade_in_time: Pos<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        looping: Option<Pos<bool>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        loop_start: Option<Pos<f64>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        loop_end: Option<Pos<f64>>,
    },
    Stop {
        file_path: Pos<String>,
        fade_out_time: Pos<f64>,
    },
    Volume {
        file_path: Pos<String>,
        volume: Pos<f64>,
        transition_time: Pos<f64>,
    },
    Say {
        contents: Pos<String>,
    },
    Wait {
        delay: Pos<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        clear: Option<Pos<bool>>,
    },
    Auto {
        auto_play_time: Pos<f64>,
    },
    HideTextbox,
    UnloadTextures,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedInformation {
    pub message: String,
    pub uri: String,
    pub range: Range,
}

/// Editor-facing diagnostic record, recomputed fully on every document change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub range: Range,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_information: Option<Vec<RelatedInformation>>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, range: Range) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            range,
            related_information: None,
        }
    }

    pub fn warning(message: impl Into<String>, range: Range) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            range,
            related_information: None,
        }
    }

    pub fn with_related(mut self, message: impl Into<String>, uri: &str, range: Range) -> Self {
        self.related_information
            .get_or_insert_with(Vec::new)
            .push(RelatedInformation {
                message: message.into(),
                uri: uri.to_string(),
                range,
            });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_orders_by_line_then_character() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
        assert_eq!(Position::new(1, 1), Position::new(1, 1));
    }

    #[test]
    fn range_contains_is_end_exclusive() {
        let range = Range::new(Position::new(0, 2), Position::new(0, 6));
        assert!(range.contains(Position::new(0, 2)));
        assert!(range.contains(Position::new(0, 5)));
        assert!(!range.contains(Position::new(0, 6)));
        assert!(!range.contains(Position::new(1, 3)));
    }

    #[test]
    fn easing_round_trips_every_name() {
        for name in [
            "linear", "sinein", "sineout", "sineinout", "sineoutin", "cubein", "cubeout",
            "cubeinout", "cubeoutin", "easein", "easeout", "easeinout", "easeoutin",
        ] {
            let easing = Easing::from_text(name).unwrap();
            assert_eq!(easing.as_str(), name);
        }
        assert!(Easing::from_text("bounce").is_none());
    }
}
