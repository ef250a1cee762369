use crate::types::{Event, Pos, Position};

/// Finds the most specific positioned field containing `position` and renders
/// a description of its role and value. `None` when the position lands on no
/// field (keywords and punctuation carry no hover text).
pub fn hover_info(events: &[Pos<Event>], position: Position) -> Option<String> {
    let event = events.iter().find(|event| event.range.contains(position))?;
    describe_field(&event.value, position)
}

fn describe_field(event: &Event, position: Position) -> Option<String> {
    let hit = |pos: &Pos<f64>| pos.range.contains(position);

    match event {
        Event::Show {
            file_path,
            image_position,
            canvas_pivot,
            image_scale,
            fade,
            drawing,
            scaling,
        } => {
            if file_path.range.contains(position) {
                return Some(format!("Image file: {}", file_path.value));
            }
            if hit(&image_position.x) {
                return Some(format!("Image position X: {}", image_position.x.value));
            }
            if hit(&image_position.y) {
                return Some(format!("Image position Y: {}", image_position.y.value));
            }
            if hit(&canvas_pivot.x) {
                return Some(format!("Canvas pivot X: {}", canvas_pivot.x.value));
            }
            if hit(&canvas_pivot.y) {
                return Some(format!("Canvas pivot Y: {}", canvas_pivot.y.value));
            }
            if hit(&image_scale.x) {
                return Some(format!("Image scale X: {}", image_scale.x.value));
            }
            if hit(&image_scale.y) {
                return Some(format!("Image scale Y: {}", image_scale.y.value));
            }
            if let Some(fade) = fade {
                if let Some(text) = describe_fade(fade, position) {
                    return Some(text);
                }
            }
            if drawing.range.contains(position) {
                return Some(format!("Drawing mode: {}", drawing.value));
            }
            if let Some(scaling) = scaling {
                if scaling.range.contains(position) {
                    return Some("Persist the image scale across transitions".to_string());
                }
            }
            None
        }
        Event::Hide { file_path, fade } => {
            if file_path.range.contains(position) {
                return Some(format!("Image file: {}", file_path.value));
            }
            describe_fade(fade, position)
        }
        Event::Scale {
            file_path,
            image_scale,
            transition_time,
            easing,
        } => {
            if file_path.range.contains(position) {
                return Some(format!("Image file: {}", file_path.value));
            }
            if hit(&image_scale.x) {
                return Some(format!("Image scale X: {}", image_scale.x.value));
            }
            if hit(&image_scale.y) {
                return Some(format!("Image scale Y: {}", image_scale.y.value));
            }
            if hit(transition_time) {
                return Some(format!("Transition time: {}s", transition_time.value));
            }
            if easing.range.contains(position) {
                return Some(format!("Easing curve: {}", easing.value));
            }
            None
        }
        Event::Move {
            file_path,
            movement,
            transition_time,
            easing,
        } => {
            if file_path.range.contains(position) {
                return Some(format!("Image file: {}", file_path.value));
            }
            if hit(&movement.x) {
                return Some(format!("Movement X: {}", movement.x.value));
            }
            if hit(&movement.y) {
                return Some(format!("Movement Y: {}", movement.y.value));
            }
            if hit(transition_time) {
                return Some(format!("Transition time: {}s", transition_time.value));
            }
            if easing.range.contains(position) {
                return Some(format!("Easing curve: {}", easing.value));
            }
            None
        }
        Event::Play {
            file_path,
            fade_in_time,
            looping,
            loop_start,
            loop_end,
        } => {
            if file_path.range.contains(position) {
                return Some(format!("Audio file: {}", file_path.value));
            }
            if hit(fade_in_time) {
                return Some(format!("Fade-in time: {}s", fade_in_time.value));
            }
            if let Some(looping) = looping {
                if looping.range.contains(position) {
                    return Some("Loop the track".to_string());
                }
            }
            if let Some(start) = loop_start {
                if hit(start) {
                    return Some(format!("Loop start: {}", start.value));
                }
            }
            if let Some(end) = loop_end {
                if hit(end) {
                    return Some(format!("Loop end: {}", end.value));
                }
            }
            None
        }
        Event::Stop {
            file_path,
            fade_out_time,
        } => {
            if file_path.range.contains(position) {
                return Some(format!("Audio file: {}", file_path.value));
            }
            if hit(fade_out_time) {
                return Some(format!("Fade-out time: {}s", fade_out_time.value));
            }
            None
        }
        Event::Volume {
            file_path,
            volume,
            transition_time,
        } => {
            if file_path.range.contains(position) {
                return Some(format!("Audio file: {}", file_path.value));
            }
            if hit(volume) {
                return Some(format!("Target volume: {}", volume.value));
            }
            if hit(transition_time) {
                return Some(format!("Transition time: {}s", transition_time.value));
            }
            None
        }
        Event::Say { contents } => {
            if contents.range.contains(position) {
                return Some(format!("Dialogue: {}", contents.value));
            }
            None
        }
        Event::Wait { delay, clear } => {
            if hit(delay) {
                return Some(format!("Wait time: {}s", delay.value));
            }
            if let Some(clear) = clear {
                if clear.range.contains(position) {
                    return Some("Clear the textbox".to_string());
                }
            }
            None
        }
        Event::Auto { auto_play_time } => {
            if hit(auto_play_time) {
                return Some(format!("Auto-advance delay: {}s", auto_play_time.value));
            }
            None
        }
        Event::HideTextbox | Event::UnloadTextures => None,
    }
}

fn describe_fade(fade: &crate::types::Fade, position: Position) -> Option<String> {
    if fade.transition_time.range.contains(position) {
        return Some(format!("Fade transition time: {}s", fade.transition_time.value));
    }
    if fade.easing.range.contains(position) {
        return Some(format!("Easing curve: {}", fade.easing.value));
    }
    None
}
