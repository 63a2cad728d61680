//! Layout and text helpers shared by the screens.

use ratatui::prelude::*;

/// Centers a rectangle of the given percentage size inside `r`.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1]);
    area[1]
}

/// Wraps `text` to `width` columns, keeping at least one line.
pub fn wrap_lines(text: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    let lines: Vec<String> = text
        .lines()
        .flat_map(|line| {
            let wrapped = textwrap::wrap(line, width);
            if wrapped.is_empty() {
                vec![String::new()]
            } else {
                wrapped.into_iter().map(|piece| piece.into_owned()).collect()
            }
        })
        .collect();
    if lines.is_empty() { vec![String::new()] } else { lines }
}

/// First row to show so that `focus_line` stays inside a `height`-row view.
pub fn scroll_offset(focus_line: usize, height: u16, current: usize) -> usize {
    let height = usize::from(height.max(1));
    if focus_line < current {
        focus_line
    } else if focus_line >= current + height {
        focus_line + 1 - height
    } else {
        current
    }
}

/// Styled `key description` pairs for a hint strip.
pub fn hint_spans(hints: &[(&str, &str)], key_style: Style, text_style: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (key, description) in hints {
        spans.push(Span::styled(key.to_string(), key_style));
        spans.push(Span::styled(format!(" {description}  "), text_style));
    }
    spans
}
