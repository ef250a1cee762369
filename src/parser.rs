use crate::error::SyntaxError;
use crate::token::{Kind, Token};
use crate::types::{Position, Range};

/// `<x>:<y>` sub-rule node.
#[derive(Debug, Clone)]
pub struct XyNode {
    pub x: Token,
    pub y: Token,
    pub span: Range,
}

/// `fade(<time>,<easing>)` sub-rule node.
#[derive(Debug, Clone)]
pub struct FadeNode {
    pub transition_time: Token,
    pub easing: Token,
    pub span: Range,
}

/// One node per command rule, every matched token retained.
#[derive(Debug, Clone)]
pub enum CommandNode {
    Show {
        file_path: Token,
        image_position: XyNode,
        canvas_pivot: XyNode,
        image_scale: XyNode,
        fade: Option<FadeNode>,
        drawing: Token,
        scaling: Option<Token>,
        span: Range,
    },
    Hide {
        file_path: Token,
        fade: FadeNode,
        span: Range,
    },
    Scale {
        file_path: Token,
        image_scale: XyNode,
        transition_time: Token,
        easing: Token,
        span: Range,
    },
    Move {
        file_path: Token,
        movement: XyNode,
        transition_time: Token,
        easing: Token,
        span: Range,
    },
    Play {
        file_path: Token,
        fade_in_time: Token,
        loop_keyword: Option<Token>,
        loop_window: Option<(Token, Token)>,
        span: Range,
    },
    Stop {
        file_path: Token,
        fade_out_time: Token,
        span: Range,
    },
    Volume {
        file_path: Token,
        volume: Token,
        transition_time: Token,
        span: Range,
    },
    Say {
        content: Token,
        span: Range,
    },
    Wait {
        time: Token,
        clear: Option<Token>,
        span: Range,
    },
    Auto {
        time: Token,
        span: Range,
    },
    HideTextbox {
        span: Range,
    },
    UnloadTextures {
        span: Range,
    },
}

impl CommandNode {
    pub fn span(&self) -> Range {
        match self {
            CommandNode::Show { span, .. }
            | CommandNode::Hide { span, .. }
            | CommandNode::Scale { span, .. }
            | CommandNode::Move { span, .. }
            | CommandNode::Play { span, .. }
            | CommandNode::Stop { span, .. }
            | CommandNode::Volume { span, .. }
            | CommandNode::Say { span, .. }
            | CommandNode::Wait { span, .. }
            | CommandNode::Auto { span, .. }
            | CommandNode::HideTextbox { span }
            | CommandNode::UnloadTextures { span } => *span,
        }
    }
}

/// Root rule: endline-separated commands.
#[derive(Debug, Clone, Default)]
pub struct DocumentNode {
    pub commands: Vec<CommandNode>,
}

pub struct ParseResult {
    pub document: DocumentNode,
    pub errors: Vec<SyntaxError>,
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    fn at(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.at().clone();
        if self.current < self.tokens.len() - 1 {
            self.current += 1;
        }
        token
    }

    fn is_eof(&self) -> bool {
        self.at().kind == Kind::Eof
    }

    fn eat(&mut self, expecting: Kind) -> Result<Token, SyntaxError> {
        if self.is_eof() {
            return Err(SyntaxError::unexpected_end(format!(
                "Expecting {:?} but reached the end of the script",
                expecting
            )));
        }
        if self.at().kind != expecting {
            return Err(SyntaxError::from_token(
                self.at(),
                format!(
                    "Expecting {:?} but found {:?}",
                    expecting,
                    self.at().text
                ),
            ));
        }
        Ok(self.advance())
    }

    /// Parses the whole token stream, recovering at the next line separator
    /// after any mismatch so the rest of the document is still analyzed.
    pub fn parse(&mut self) -> ParseResult {
        let mut document = DocumentNode::default();
        let mut errors = Vec::new();

        while !self.is_eof() {
            match self.parse_command() {
                Ok(command) => {
                    document.commands.push(command);
                    match self.at().kind {
                        Kind::Endline => {
                            self.advance();
                        }
                        Kind::Eof => {}
                        _ => {
                            errors.push(SyntaxError::from_token(
                                self.at(),
                                format!(
                                    "Expecting a line break but found {:?}",
                                    self.at().text
                                ),
                            ));
                            self.synchronize();
                        }
                    }
                }
                Err(error) => {
                    errors.push(error);
                    self.synchronize();
                }
            }
        }

        ParseResult { document, errors }
    }

    /// Skips past the next line separator (or to end of input).
    fn synchronize(&mut self) {
        while !self.is_eof() {
            if self.advance().kind == Kind::Endline {
                break;
            }
        }
    }

    fn parse_command(&mut self) -> Result<CommandNode, SyntaxError> {
        match self.at().kind {
            Kind::Show => self.parse_show(),
            Kind::Hide => self.parse_hide(),
            Kind::Scale => self.parse_scale(),
            Kind::Move => self.parse_move(),
            Kind::Play => self.parse_play(),
            Kind::Stop => self.parse_stop(),
            Kind::Volume => self.parse_volume(),
            Kind::Say => self.parse_say(),
            Kind::Wait => self.parse_wait(),
            Kind::Auto => self.parse_auto(),
            Kind::HideTextbox => {
                let keyword = self.advance();
                Ok(CommandNode::HideTextbox {
                    span: keyword.range,
                })
            }
            Kind::UnloadTextures => {
                let keyword = self.advance();
                Ok(CommandNode::UnloadTextures {
                    span: keyword.range,
                })
            }
            Kind::Eof => Err(SyntaxError::unexpected_end(
                "Expecting a command but reached the end of the script".to_string(),
            )),
            _ => Err(SyntaxError::from_token(
                self.at(),
                format!("Expecting a command but found {:?}", self.at().text),
            )),
        }
    }

    fn span_from(&self, start: Position) -> Range {
        Range::new(start, self.previous().range.end)
    }

    fn parse_xy(&mut self) -> Result<XyNode, SyntaxError> {
        let x = self.eat(Kind::Number)?;
        self.eat(Kind::Colon)?;
        let y = self.eat(Kind::Number)?;
        let span = Range::new(x.range.start, y.range.end);
        Ok(XyNode { x, y, span })
    }

    fn parse_fade(&mut self) -> Result<FadeNode, SyntaxError> {
        let keyword = self.eat(Kind::Fade)?;
        self.eat(Kind::LParen)?;
        let transition_time = self.eat(Kind::Number)?;
        self.eat(Kind::Comma)?;
        let easing = self.eat(Kind::Easing)?;
        let close = self.eat(Kind::RParen)?;
        Ok(FadeNode {
            transition_time,
            easing,
            span: Range::new(keyword.range.start, close.range.end),
        })
    }

    fn parse_show(&mut self) -> Result<CommandNode, SyntaxError> {
        let start = self.eat(Kind::Show)?.range.start;
        let file_path = self.eat(Kind::Str)?;
        let image_position = self.parse_xy()?;
        let canvas_pivot = self.parse_xy()?;
        let image_scale = self.parse_xy()?;
        let fade = if self.at().kind == Kind::Fade {
            Some(self.parse_fade()?)
        } else {
            None
        };
        let drawing = self.eat(Kind::Drawing)?;
        let scaling = if self.at().kind == Kind::Scale {
            Some(self.advance())
        } else {
            None
        };
        Ok(CommandNode::Show {
            file_path,
            image_position,
            canvas_pivot,
            image_scale,
            fade,
            drawing,
            scaling,
            span: self.span_from(start),
        })
    }

    fn parse_hide(&mut self) -> Result<CommandNode, SyntaxError> {
        let start = self.eat(Kind::Hide)?.range.start;
        let file_path = self.eat(Kind::Str)?;
        let fade = self.parse_fade()?;
        Ok(CommandNode::Hide {
            file_path,
            fade,
            span: self.span_from(start),
        })
    }

    fn parse_scale(&mut self) -> Result<CommandNode, SyntaxError> {
        let start = self.eat(Kind::Scale)?.range.start;
        let file_path = self.eat(Kind::Str)?;
        let image_scale = self.parse_xy()?;
        let transition_time = self.eat(Kind::Number)?;
        let easing = self.eat(Kind::Easing)?;
        Ok(CommandNode::Scale {
            file_path,
            image_scale,
            transition_time,
            easing,
            span: self.span_from(start),
        })
    }

    fn parse_move(&mut self) -> Result<CommandNode, SyntaxError> {
        let start = self.eat(Kind::Move)?.range.start;
        let file_path = self.eat(Kind::Str)?;
        let movement = self.parse_xy()?;
        let transition_time = self.eat(Kind::Number)?;
        let easing = self.eat(Kind::Easing)?;
        Ok(CommandNode::Move {
            file_path,
            movement,
            transition_time,
            easing,
            span: self.span_from(start),
        })
    }

    fn parse_play(&mut self) -> Result<CommandNode, SyntaxError> {
        let start = self.eat(Kind::Play)?.range.start;
        let file_path = self.eat(Kind::Str)?;
        let fade_in_time = self.eat(Kind::Number)?;
        let mut loop_keyword = None;
        let mut loop_window = None;
        if self.at().kind == Kind::Loop {
            loop_keyword = Some(self.advance());
            if self.at().kind == Kind::Number {
                let loop_start = self.advance();
                self.eat(Kind::Colon)?;
                let loop_end = self.eat(Kind::Number)?;
                loop_window = Some((loop_start, loop_end));
            }
        }
        Ok(CommandNode::Play {
            file_path,
            fade_in_time,
            loop_keyword,
            loop_window,
            span: self.span_from(start),
        })
    }

    fn parse_stop(&mut self) -> Result<CommandNode, SyntaxError> {
        let start = self.eat(Kind::Stop)?.range.start;
        let file_path = self.eat(Kind::Str)?;
        let fade_out_time = self.eat(Kind::Number)?;
        Ok(CommandNode::Stop {
            file_path,
            fade_out_time,
            span: self.span_from(start),
        })
    }

    fn parse_volume(&mut self) -> Result<CommandNode, SyntaxError> {
        let start = self.eat(Kind::Volume)?.range.start;
        let file_path = self.eat(Kind::Str)?;
        let volume = self.eat(Kind::Number)?;
        let transition_time = self.eat(Kind::Number)?;
        Ok(CommandNode::Volume {
            file_path,
            volume,
            transition_time,
            span: self.span_from(start),
        })
    }

    fn parse_say(&mut self) -> Result<CommandNode, SyntaxError> {
        let start = self.eat(Kind::Say)?.range.start;
        let content = self.eat(Kind::Str)?;
        Ok(CommandNode::Say {
            content,
            span: self.span_from(start),
        })
    }

    fn parse_wait(&mut self) -> Result<CommandNode, SyntaxError> {
        let start = self.eat(Kind::Wait)?.range.start;
        let time = self.eat(Kind::Number)?;
        let clear = if self.at().kind == Kind::Clear {
            Some(self.advance())
        } else {
            None
        };
        Ok(CommandNode::Wait {
            time,
            clear,
            span: self.span_from(start),
        })
    }

    fn parse_auto(&mut self) -> Result<CommandNode, SyntaxError> {
        let start = self.eat(Kind::Auto)?.range.start;
        let time = self.eat(Kind::Number)?;
        Ok(CommandNode::Auto {
            time,
            span: self.span_from(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(text: &str) -> ParseResult {
        let lexed = Lexer::new(text).tokenize();
        assert!(lexed.errors.is_empty(), "unexpected lex errors");
        Parser::new(lexed.tokens).parse()
    }

    #[test]
    fn parses_every_command_kind() {
        let script = concat!(
            "show \"bg.png\" 0:0 0.5:0.5 1:1 fade(0.3,linear) normal scale\n",
            "hide \"bg.png\" fade(0,linear)\n",
            "scale \"bg.png\" 2:2 1 easeinout\n",
            "move \"bg.png\" 10:-5 0.5 cubeout\n",
            "play \"bgm.ogg\" 1 loop 0:8\n",
            "stop \"bgm.ogg\" 1\n",
            "volume \"bgm.ogg\" 0.5 2\n",
            "say \"Hello there.\"\n",
            "wait 1 clear\n",
            "auto 2.5\n",
            "hidetextbox\n",
            "unload_textures\n",
        );
        let result = parse(script);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(result.document.commands.len(), 12);
    }

    #[test]
    fn trailing_line_breaks_are_legal() {
        let result = parse("wait 1\n\n");
        assert!(result.errors.is_empty());
        assert_eq!(result.document.commands.len(), 1);
    }

    #[test]
    fn empty_document_parses_cleanly() {
        let result = parse("");
        assert!(result.errors.is_empty());
        assert!(result.document.commands.is_empty());
    }

    #[test]
    fn recovers_at_the_next_line_separator() {
        let result = parse("wait clear\nauto 2");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.document.commands.len(), 1);
        assert!(matches!(
            result.document.commands[0],
            CommandNode::Auto { .. }
        ));
    }

    #[test]
    fn reports_unexpected_end_of_input_without_a_range() {
        let result = parse("hide \"bg.png\"");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].range.is_none());
    }

    #[test]
    fn error_carries_the_offending_token_range() {
        let result = parse("wait loop");
        assert_eq!(result.errors.len(), 1);
        let range = result.errors[0].range.expect("range");
        assert_eq!(range.start, Position::new(0, 5));
        assert_eq!(range.end, Position::new(0, 9));
    }

    #[test]
    fn one_bad_line_does_not_mask_later_ones() {
        let result = parse("wait clear\nwait normal\nwait 3");
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.document.commands.len(), 1);
    }

    #[test]
    fn play_without_loop_window_parses() {
        let result = parse("play \"bgm.ogg\" 0 loop");
        assert!(result.errors.is_empty());
        match &result.document.commands[0] {
            CommandNode::Play {
                loop_keyword,
                loop_window,
                ..
            } => {
                assert!(loop_keyword.is_some());
                assert!(loop_window.is_none());
            }
            other => panic!("expected play, got {:?}", other),
        }
    }

    #[test]
    fn command_span_covers_the_whole_line() {
        let result = parse("volume \"bgm.ogg\" 0.5 2");
        let span = result.document.commands[0].span();
        assert_eq!(span.start, Position::new(0, 0));
        assert_eq!(span.end, Position::new(0, 22));
    }

    #[test]
    fn show_fade_is_optional() {
        let result = parse("show \"a.png\" 0:0 0:0 1:1 overlay");
        assert!(result.errors.is_empty());
        match &result.document.commands[0] {
            CommandNode::Show { fade, scaling, .. } => {
                assert!(fade.is_none());
                assert!(scaling.is_none());
            }
            other => panic!("expected show, got {:?}", other),
        }
    }
}
