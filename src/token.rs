use crate::types::Range;

#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: Kind,
    pub text: String,
    pub range: Range,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Kind {
    // Literals
    Str,         // "path/to/file.png", dialogue text
    Number,      // -12, 0.5

    // Delimiters
    Endline,     // one or more line breaks, the statement separator
    LParen,      // (
    RParen,      // )
    Colon,       // :
    Comma,       // ,

    // Command keywords
    Show,
    Hide,
    Scale,       // doubles as the trailing persist-scale flag on show
    Move,
    Play,
    Stop,
    Volume,
    Say,         // say, say_legacy
    Wait,
    Auto,        // auto, autoplay_legacy
    HideTextbox,
    UnloadTextures,

    // Argument keywords
    Fade,        // fade(time,easing)
    Easing,      // linear, sinein, cubeinout, ...
    Loop,
    Clear,
    Drawing,     // normal, overlay

    Eof,
}
