use crate::config::Rules;
use crate::parser::{CommandNode, DocumentNode, FadeNode, XyNode};
use crate::token::Token;
use crate::types::{Diagnostic, Drawing, Easing, Event, Fade, Pos, Range, Xy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Show,
    Hide,
    Scale,
    Move,
    Play,
    Loop,
    Stop,
    Volume,
}

/// One image/music operation collected during traversal, replayed against the
/// resource stacks after sorting into document order.
#[derive(Debug, Clone)]
struct FileRecord {
    file_path: String,
    range: Range,
    operation: Operation,
}

pub struct CheckResult {
    pub events: Vec<Pos<Event>>,
    pub errors: Vec<Diagnostic>,
}

/// Runs the semantic pass over one parsed document. All accumulation state is
/// local to this call; nothing survives between runs or documents.
pub fn check(document: &DocumentNode, uri: &str, rules: &Rules) -> CheckResult {
    Checker::new(uri, rules).run(document)
}

struct Checker<'a> {
    uri: &'a str,
    rules: &'a Rules,
    image_files: Vec<FileRecord>,
    music_files: Vec<FileRecord>,
    errors: Vec<Diagnostic>,
}

impl<'a> Checker<'a> {
    fn new(uri: &'a str, rules: &'a Rules) -> Self {
        Self {
            uri,
            rules,
            image_files: Vec::new(),
            music_files: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn run(mut self, document: &DocumentNode) -> CheckResult {
        let mut events: Vec<Pos<Event>> = document
            .commands
            .iter()
            .map(|command| Pos::new(command.span(), self.visit_command(command)))
            .collect();

        self.check_file_paths();

        // Recovery can hand commands over out of source order; consumers
        // require document order.
        events.sort_by_key(|event| event.range.start);

        CheckResult {
            events,
            errors: self.errors,
        }
    }

    fn visit_command(&mut self, command: &CommandNode) -> Event {
        match command {
            CommandNode::Show {
                file_path,
                image_position,
                canvas_pivot,
                image_scale,
                fade,
                drawing,
                scaling,
                ..
            } => {
                let file_path = self.file_record(file_path, Operation::Show);
                Event::Show {
                    file_path,
                    image_position: self.xy_value(image_position),
                    canvas_pivot: self.xy_value(canvas_pivot),
                    image_scale: self.xy_value(image_scale),
                    fade: fade.as_ref().map(|node| self.fade_value(node)),
                    drawing: Pos::new(
                        drawing.range,
                        Drawing::from_text(&drawing.text).unwrap_or(Drawing::Normal),
                    ),
                    scaling: scaling.as_ref().map(|token| Pos::new(token.range, true)),
                }
            }
            CommandNode::Hide {
                file_path, fade, ..
            } => {
                let file_path = self.file_record(file_path, Operation::Hide);
                Event::Hide {
                    file_path,
                    fade: self.fade_value(fade),
                }
            }
            CommandNode::Scale {
                file_path,
                image_scale,
                transition_time,
                easing,
                ..
            } => {
                let file_path = self.file_record(file_path, Operation::Scale);
                Event::Scale {
                    file_path,
                    image_scale: self.xy_value(image_scale),
                    transition_time: self.number_min(transition_time, 0.0, "transition time"),
                    easing: easing_value(easing),
                }
            }
            CommandNode::Move {
                file_path,
                movement,
                transition_time,
                easing,
                ..
            } => {
                let file_path = self.file_record(file_path, Operation::Move);
                Event::Move {
                    file_path,
                    movement: self.xy_value(movement),
                    transition_time: self.number_min(transition_time, 0.0, "transition time"),
                    easing: easing_value(easing),
                }
            }
            CommandNode::Play {
                file_path,
                fade_in_time,
                loop_keyword,
                loop_window,
                ..
            } => {
                let operation = if loop_keyword.is_some() {
                    Operation::Loop
                } else {
                    Operation::Play
                };
                let file_path = self.file_record(file_path, operation);
                let fade_in_time = self.number_min(fade_in_time, 0.0, "transition time");

                let mut loop_start = None;
                let mut loop_end = None;
                if let Some((start_token, end_token)) = loop_window {
                    let start = self.number_min(start_token, 0.0, "start timestamp");
                    let end = self.number_min(end_token, 0.0, "end timestamp");
                    if start.value.fract() != 0.0 {
                        self.errors.push(Diagnostic::error(
                            "The start timestamp should be integer.",
                            start.range,
                        ));
                    }
                    if end.value.fract() != 0.0 {
                        self.errors.push(Diagnostic::error(
                            "The end timestamp should be integer.",
                            end.range,
                        ));
                    }
                    if end.value <= start.value {
                        self.errors.push(
                            Diagnostic::error(
                                "The loop endpoint should be later than the loop startpoint.",
                                end.range,
                            )
                            .with_related("Loop startpoint", self.uri, start.range),
                        );
                    }
                    loop_start = Some(start);
                    loop_end = Some(end);
                }

                Event::Play {
                    file_path,
                    fade_in_time,
                    looping: loop_keyword.as_ref().map(|token| Pos::new(token.range, true)),
                    loop_start,
                    loop_end,
                }
            }
            CommandNode::Stop {
                file_path,
                fade_out_time,
                ..
            } => {
                let file_path = self.file_record(file_path, Operation::Stop);
                Event::Stop {
                    file_path,
                    fade_out_time: self.number_min(fade_out_time, 0.0, "transition time"),
                }
            }
            CommandNode::Volume {
                file_path,
                volume,
                transition_time,
                ..
            } => {
                let file_path = self.file_record(file_path, Operation::Volume);
                let volume = self.number_min(volume, 0.0, "volume");
                if let Some(max) = self.rules.max_volume {
                    if volume.value > max {
                        self.errors.push(Diagnostic::error(
                            format!("The volume should be no more than {}.", max),
                            volume.range,
                        ));
                    }
                }
                Event::Volume {
                    file_path,
                    volume,
                    transition_time: self.number_min(transition_time, 0.0, "transition time"),
                }
            }
            CommandNode::Say { content, .. } => {
                let lines = content.range.end.line - content.range.start.line;
                if lines >= self.rules.say_line_limit {
                    self.errors.push(Diagnostic::warning(
                        format!(
                            "The say content should be no more than {} lines.",
                            self.rules.say_line_limit
                        ),
                        content.range,
                    ));
                }
                Event::Say {
                    contents: Pos::new(content.range, unquote(&content.text)),
                }
            }
            CommandNode::Wait { time, clear, .. } => Event::Wait {
                delay: self.number_min(time, 0.0, "wait time"),
                clear: clear.as_ref().map(|token| Pos::new(token.range, true)),
            },
            CommandNode::Auto { time, .. } => Event::Auto {
                auto_play_time: self.number_min(time, 0.0, "autoplay time"),
            },
            CommandNode::HideTextbox { .. } => Event::HideTextbox,
            CommandNode::UnloadTextures { .. } => Event::UnloadTextures,
        }
    }

    /// Extracts the unquoted file path and records the operation for the
    /// lifecycle pass. Diagnostics for the lifecycle pass point at the path.
    fn file_record(&mut self, token: &Token, operation: Operation) -> Pos<String> {
        let path = Pos::new(token.range, unquote(&token.text));
        let list = match operation {
            Operation::Show | Operation::Hide | Operation::Scale | Operation::Move => {
                &mut self.image_files
            }
            Operation::Play | Operation::Loop | Operation::Stop | Operation::Volume => {
                &mut self.music_files
            }
        };
        list.push(FileRecord {
            file_path: path.value.clone(),
            range: path.range,
            operation,
        });
        path
    }

    fn number_min(&mut self, token: &Token, min: f64, label: &str) -> Pos<f64> {
        let value = number_value(token);
        if value.value < min {
            self.errors.push(Diagnostic::error(
                format!("The {} should be no less than {}.", label, min),
                value.range,
            ));
        }
        value
    }

    fn xy_value(&mut self, node: &XyNode) -> Xy {
        Xy {
            x: number_value(&node.x),
            y: number_value(&node.y),
        }
    }

    fn fade_value(&mut self, node: &FadeNode) -> Fade {
        Fade {
            transition_time: self.number_min(&node.transition_time, 0.0, "transition time"),
            easing: easing_value(&node.easing),
        }
    }

    /// Replays the collected image and music operations against two stacks.
    /// Matching scans backwards so the most recent open instance of a path is
    /// the one addressed, without requiring strictly nested lifetimes.
    fn check_file_paths(&mut self) {
        let mut image_files = std::mem::take(&mut self.image_files);
        let mut music_files = std::mem::take(&mut self.music_files);
        image_files.sort_by_key(|record| record.range.start);
        music_files.sort_by_key(|record| record.range.start);

        let mut image_stack: Vec<FileRecord> = Vec::new();
        let mut music_stack: Vec<FileRecord> = Vec::new();

        for image in image_files {
            match image.operation {
                Operation::Show => {
                    if let Some(idx) = image_stack
                        .iter()
                        .rposition(|open| open.file_path == image.file_path)
                    {
                        self.errors.push(
                            Diagnostic::warning(
                                format!("Another instance of {} is not hidden.", image.file_path),
                                image.range,
                            )
                            .with_related("Instance not hidden", self.uri, image_stack[idx].range),
                        );
                    }
                    image_stack.push(image);
                }
                Operation::Scale | Operation::Move => {
                    if !image_stack
                        .iter()
                        .any(|open| open.file_path == image.file_path)
                    {
                        self.errors.push(Diagnostic::error(
                            format!(
                                "Cannot find currently showing instance of {}.",
                                image.file_path
                            ),
                            image.range,
                        ));
                    }
                }
                Operation::Hide => {
                    match image_stack
                        .iter()
                        .rposition(|open| open.file_path == image.file_path)
                    {
                        Some(idx) => {
                            image_stack.remove(idx);
                        }
                        None => {
                            self.errors.push(Diagnostic::error(
                                format!(
                                    "Cannot find currently showing instance of {}.",
                                    image.file_path
                                ),
                                image.range,
                            ));
                        }
                    }
                }
                Operation::Play | Operation::Loop | Operation::Stop | Operation::Volume => {}
            }
        }

        for music in music_files {
            match music.operation {
                Operation::Play | Operation::Loop => {
                    let idx = if self.rules.legacy_music_duplicate_lookup {
                        // Historical lookup: scans the image stack for a
                        // loop-tagged entry, so it never matches anything.
                        image_stack.iter().rposition(|open| {
                            open.file_path == music.file_path && open.operation == Operation::Loop
                        })
                    } else {
                        music_stack
                            .iter()
                            .rposition(|open| open.file_path == music.file_path)
                    };
                    if let Some(idx) = idx {
                        let mut diagnostic = Diagnostic::warning(
                            format!("Another instance of {} is not stopped.", music.file_path),
                            music.range,
                        );
                        if let Some(prior) = music_stack.get(idx) {
                            diagnostic =
                                diagnostic.with_related("Instance not stopped", self.uri, prior.range);
                        }
                        self.errors.push(diagnostic);
                    }
                    music_stack.push(music);
                }
                Operation::Volume => {
                    if !music_stack
                        .iter()
                        .any(|open| open.file_path == music.file_path)
                    {
                        self.errors.push(Diagnostic::error(
                            format!(
                                "Cannot find currently playing instance of {}.",
                                music.file_path
                            ),
                            music.range,
                        ));
                    }
                }
                Operation::Stop => {
                    match music_stack
                        .iter()
                        .rposition(|open| open.file_path == music.file_path)
                    {
                        Some(idx) => {
                            music_stack.remove(idx);
                        }
                        None => {
                            self.errors.push(Diagnostic::error(
                                format!(
                                    "Cannot find currently playing instance of {}.",
                                    music.file_path
                                ),
                                music.range,
                            ));
                        }
                    }
                }
                Operation::Show | Operation::Hide | Operation::Scale | Operation::Move => {}
            }
        }
    }
}

fn number_value(token: &Token) -> Pos<f64> {
    Pos::new(token.range, token.text.parse().unwrap_or(0.0))
}

fn easing_value(token: &Token) -> Pos<Easing> {
    Pos::new(
        token.range,
        Easing::from_text(&token.text).unwrap_or(Easing::Linear),
    )
}

/// Strips the surrounding quotes of a string token and unescapes `\"`.
fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text);
    inner.replace("\\\"", "\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::types::{Position, Severity};

    const URI: &str = "file:///scene.vns";

    fn run_with(script: &str, rules: &Rules) -> CheckResult {
        let lexed = Lexer::new(script).tokenize();
        assert!(lexed.errors.is_empty(), "lex errors: {:?}", lexed.errors);
        let mut parser = Parser::new(lexed.tokens);
        let parsed = parser.parse();
        assert!(parsed.errors.is_empty(), "syntax errors: {:?}", parsed.errors);
        check(&parsed.document, URI, rules)
    }

    fn run(script: &str) -> CheckResult {
        run_with(script, &Rules::default())
    }

    #[test]
    fn show_then_hide_is_clean() {
        let result = run("show \"a.png\" 0:0 0:0 1:1 normal\nhide \"a.png\" fade(0,linear)");
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(result.events.len(), 2);
    }

    #[test]
    fn hide_without_show_is_an_error() {
        let result = run("hide \"a.png\" fade(0,linear)");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].severity, Severity::Error);
        assert_eq!(
            result.errors[0].message,
            "Cannot find currently showing instance of a.png."
        );
    }

    #[test]
    fn scale_and_move_require_a_showing_instance() {
        let result = run("scale \"a.png\" 2:2 1 linear\nmove \"a.png\" 1:1 1 linear");
        assert_eq!(result.errors.len(), 2);
        assert!(result
            .errors
            .iter()
            .all(|d| d.message == "Cannot find currently showing instance of a.png."));
    }

    #[test]
    fn duplicate_show_warns_and_still_pushes() {
        let script = concat!(
            "show \"a.png\" 0:0 0:0 1:1 normal\n",
            "show \"a.png\" 0:0 0:0 1:1 normal\n",
            "hide \"a.png\" fade(0,linear)\n",
            "hide \"a.png\" fade(0,linear)",
        );
        let result = run(script);
        assert_eq!(result.errors.len(), 1);
        let warning = &result.errors[0];
        assert_eq!(warning.severity, Severity::Warning);
        assert_eq!(warning.message, "Another instance of a.png is not hidden.");
        let related = warning.related_information.as_ref().expect("related");
        assert_eq!(related[0].message, "Instance not hidden");
        assert_eq!(related[0].range.start, Position::new(0, 5));
    }

    #[test]
    fn hide_removes_the_most_recent_matching_instance() {
        let script = concat!(
            "show \"a.png\" 0:0 0:0 1:1 normal\n",
            "show \"b.png\" 0:0 0:0 1:1 normal\n",
            "show \"a.png\" 0:0 0:0 1:1 normal\n",
            "hide \"a.png\" fade(0,linear)\n",
            "hide \"a.png\" fade(0,linear)\n",
            "hide \"b.png\" fade(0,linear)",
        );
        let result = run(script);
        // only the duplicate-show warning, no unmatched hides
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].severity, Severity::Warning);
    }

    #[test]
    fn duplicate_play_warns_with_related_location() {
        let result = run("play \"bgm.ogg\" 0\nplay \"bgm.ogg\" 0");
        assert_eq!(result.errors.len(), 1);
        let warning = &result.errors[0];
        assert_eq!(warning.severity, Severity::Warning);
        assert_eq!(warning.message, "Another instance of bgm.ogg is not stopped.");
        assert_eq!(warning.range.start, Position::new(1, 5));
        let related = warning.related_information.as_ref().expect("related");
        assert_eq!(related[0].message, "Instance not stopped");
        assert_eq!(related[0].range.start, Position::new(0, 5));
        assert_eq!(related[0].uri, URI);
    }

    #[test]
    fn legacy_duplicate_lookup_never_fires() {
        // The historical ruleset scanned the image stack for loop-tagged
        // entries, so the duplicate-play warning was unreachable. Pinned here
        // so the divergence from the default behavior stays visible.
        let rules = Rules {
            legacy_music_duplicate_lookup: true,
            ..Rules::default()
        };
        let result = run_with("play \"bgm.ogg\" 0\nplay \"bgm.ogg\" 0", &rules);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn play_volume_stop_is_clean() {
        let result = run("play \"bgm.ogg\" 1\nvolume \"bgm.ogg\" 0.5 2\nstop \"bgm.ogg\" 1");
        assert!(result.errors.is_empty(), "{:?}", result.errors);
    }

    #[test]
    fn volume_and_stop_require_a_playing_instance() {
        let result = run("volume \"bgm.ogg\" 0.5 2\nstop \"bgm.ogg\" 1");
        assert_eq!(result.errors.len(), 2);
        assert!(result
            .errors
            .iter()
            .all(|d| d.message == "Cannot find currently playing instance of bgm.ogg."));
    }

    #[test]
    fn loop_endpoint_must_follow_startpoint() {
        let result = run("play \"bgm.ogg\" 0 loop 5:3");
        assert_eq!(result.errors.len(), 1);
        let error = &result.errors[0];
        assert_eq!(
            error.message,
            "The loop endpoint should be later than the loop startpoint."
        );
        let related = error.related_information.as_ref().expect("related");
        assert_eq!(related[0].message, "Loop startpoint");
    }

    #[test]
    fn loop_endpoints_must_be_integers() {
        let result = run("play \"bgm.ogg\" 0 loop 1.5:3");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "The start timestamp should be integer.");
    }

    #[test]
    fn loop_endpoints_must_be_non_negative() {
        let result = run("play \"bgm.ogg\" 0 loop -2:-1");
        assert_eq!(result.errors.len(), 2);
        assert_eq!(
            result.errors[0].message,
            "The start timestamp should be no less than 0."
        );
        assert_eq!(
            result.errors[1].message,
            "The end timestamp should be no less than 0."
        );
    }

    #[test]
    fn negative_wait_is_an_error() {
        let result = run("wait -1");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "The wait time should be no less than 0.");
    }

    #[test]
    fn wait_clear_produces_a_clear_flagged_event() {
        let result = run("wait 1 clear");
        assert!(result.errors.is_empty());
        match &result.events[0].value {
            Event::Wait { delay, clear } => {
                assert_eq!(delay.value, 1.0);
                assert_eq!(clear.as_ref().map(|c| c.value), Some(true));
            }
            other => panic!("expected wait event, got {:?}", other),
        }
    }

    #[test]
    fn negative_auto_delay_is_an_error() {
        let result = run("auto -0.5");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0].message,
            "The autoplay time should be no less than 0."
        );
    }

    #[test]
    fn negative_fade_time_is_an_error() {
        let result = run("show \"a.png\" 0:0 0:0 1:1 fade(-1,linear) normal");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0].message,
            "The transition time should be no less than 0."
        );
    }

    #[test]
    fn volume_ceiling_is_enforced_only_when_configured() {
        let script = "play \"bgm.ogg\" 0\nvolume \"bgm.ogg\" 2 0";
        assert!(run(script).errors.is_empty());

        let rules = Rules {
            max_volume: Some(1.0),
            ..Rules::default()
        };
        let result = run_with(script, &rules);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "The volume should be no more than 1.");
    }

    #[test]
    fn overlong_say_content_is_a_warning() {
        let result = run("say \"one\ntwo\nthree\nfour\"");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].severity, Severity::Warning);
        assert_eq!(
            result.errors[0].message,
            "The say content should be no more than 3 lines."
        );
    }

    #[test]
    fn short_say_content_is_clean_and_unquoted() {
        let result = run("say \"Hello.\"");
        assert!(result.errors.is_empty());
        match &result.events[0].value {
            Event::Say { contents } => assert_eq!(contents.value, "Hello."),
            other => panic!("expected say event, got {:?}", other),
        }
    }

    #[test]
    fn events_come_back_in_document_order() {
        let script = "wait 1\nsay \"a\"\nauto 2\nhidetextbox";
        let result = run(script);
        assert_eq!(result.events.len(), 4);
        for pair in result.events.windows(2) {
            assert!(pair[0].range.start <= pair[1].range.start);
        }
    }

    #[test]
    fn repeated_checks_share_no_state() {
        let script = "show \"a.png\" 0:0 0:0 1:1 normal";
        let lexed = Lexer::new(script).tokenize();
        let parsed = Parser::new(lexed.tokens).parse();
        let first = check(&parsed.document, URI, &Rules::default());
        let second = check(&parsed.document, URI, &Rules::default());
        assert_eq!(first.errors, second.errors);
        assert_eq!(first.events, second.events);
    }
}
