//! Starter message editor screen.

use std::path::PathBuf;

use anyhow::Result;
use conform_engine::StarterPart;
use conform_types::StarterMessage;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use super::state::StartersState;
use crate::app::{App, Effect, Msg, ScreenOutcome};
use crate::ui::components::common::edit_text;
use crate::ui::components::component::Component;
use crate::ui::theme::Theme;
use crate::ui::utils::{hint_spans, scroll_offset, wrap_lines};

const RELOAD_FAILED_NOTICE: &str = "Could not reload starter messages.";

#[derive(Debug)]
pub struct StartersComponent {
    state: StartersState,
}

impl StartersComponent {
    pub fn new(path: PathBuf, messages: Vec<StarterMessage>) -> Self {
        Self {
            state: StartersState::new(path, messages),
        }
    }

    fn editing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter if self.state.part().is_multiline() => {
                self.state.editor_mut().insert_char('\n');
                self.state.commit_editor();
            }
            KeyCode::Enter => self.state.step_part(1),
            KeyCode::Up => self.state.step_message(-1),
            KeyCode::Down => self.state.step_message(1),
            _ => {
                if edit_text(self.state.editor_mut(), key) {
                    self.state.commit_editor();
                }
            }
        }
    }

    /// Body lines, the focused line, and the cursor position within them.
    fn build_body(&self, app: &App, width: u16) -> (Vec<Line<'static>>, usize, Option<(usize, u16)>) {
        let theme = app.theme.as_ref();
        let mut lines: Vec<Line<'static>> = Vec::new();
        let mut focus_line = 0;
        let mut cursor = None;
        let refreshing = self.state.list.is_refreshing();

        for (index, message) in self.state.list.messages().iter().enumerate() {
            let selected = index == self.state.selected();
            lines.push(Line::from(Span::styled(
                format!("Starter Message {}", index + 1),
                theme.label_style(selected),
            )));
            for part in StarterPart::ALL {
                let focused = selected && part == self.state.part();
                if focused {
                    focus_line = lines.len();
                }
                lines.push(Line::from(Span::styled(format!("  {}", part.label()), theme.label_style(focused))));
                for help in wrap_lines(part.help(), width.saturating_sub(2)) {
                    lines.push(Line::from(Span::styled(format!("  {help}"), theme.text_muted_style())));
                }

                if refreshing {
                    lines.push(Line::from(Span::styled(
                        format!("    {} refreshing", app.throbber()),
                        theme.status_info(),
                    )));
                    continue;
                }

                let text = if focused { self.state.editor().input() } else { part.get(message) };
                if text.is_empty() {
                    if focused {
                        cursor = Some((lines.len(), 4));
                    }
                    lines.push(Line::from(Span::styled(format!("    {}", part.placeholder()), theme.text_muted_style())));
                    continue;
                }
                if focused {
                    let editor = self.state.editor();
                    let before = &editor.input()[..editor.cursor()];
                    let row = before.matches('\n').count();
                    let column = before.rsplit('\n').next().unwrap_or_default().width();
                    cursor = Some((lines.len() + row, 4 + u16::try_from(column).unwrap_or(u16::MAX)));
                }
                let style = if focused { theme.text_primary_style() } else { theme.text_secondary_style() };
                for value_line in text.split('\n') {
                    lines.push(Line::from(Span::styled(format!("    {value_line}"), style)));
                }
            }
            lines.push(Line::default());
        }
        (lines, focus_line, cursor)
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect, theme: &dyn Theme) {
        let hints = [
            ("Tab", "next"),
            ("↑/↓", "message"),
            ("Ctrl-X", "clear"),
            ("Ctrl-R", "reload"),
            ("Ctrl-S", "save"),
            ("Esc", "cancel"),
        ];
        let mut spans = hint_spans(&hints, theme.accent_emphasis_style(), theme.text_muted_style());
        if let Some(notice) = &self.state.notice {
            spans.push(Span::styled(notice.clone(), theme.status_warning()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

impl Component for StartersComponent {
    fn init(&mut self) -> Result<()> {
        self.state.list.initialize();
        self.state.load_editor();
        Ok(())
    }

    fn handle_key_events(&mut self, _app: &mut App, key: KeyEvent) -> Vec<Effect> {
        self.state.notice = None;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return vec![Effect::Finish(ScreenOutcome::Cancelled)],
            KeyCode::Char('s') if ctrl => {
                return vec![Effect::Finish(ScreenOutcome::Starters(self.state.list.messages().to_vec()))];
            }
            KeyCode::Char('r') if ctrl => {
                if self.state.list.is_refreshing() {
                    return Vec::new();
                }
                self.state.list.set_refreshing(true);
                return vec![Effect::ReloadStarters(self.state.path.clone())];
            }
            _ => {}
        }
        if self.state.list.is_refreshing() {
            return Vec::new();
        }
        match key.code {
            KeyCode::Tab => self.state.step_part(1),
            KeyCode::BackTab => self.state.step_part(-1),
            KeyCode::Char('x') if ctrl => {
                self.state.clear_selected();
            }
            _ => self.editing_key(key),
        }
        Vec::new()
    }

    fn update(&mut self, _app: &mut App, msg: &Msg) -> Vec<Effect> {
        if let Msg::StartersLoaded(loaded) = msg {
            match loaded {
                Some(messages) => self.state.list.replace(messages.clone()),
                None => self.state.notice = Some(RELOAD_FAILED_NOTICE.to_string()),
            }
            self.state.list.set_refreshing(false);
            self.state.clamp_selection();
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let [body_area, footer] = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(rect);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.border_style(true))
            .title(Span::styled(" Starter Messages ", app.theme.accent_emphasis_style()));
        let inner = block.inner(body_area);
        let (lines, focus_line, cursor) = self.build_body(app, inner.width);
        self.state.scroll = scroll_offset(focus_line, inner.height, self.state.scroll);
        let scroll = self.state.scroll;

        if let Some((line, column)) = cursor
            && line >= scroll
            && line < scroll + usize::from(inner.height)
        {
            let y = inner.y + (line - scroll) as u16;
            let x = inner.x.saturating_add(column).min(inner.right().saturating_sub(1));
            frame.set_cursor_position(Position::new(x, y));
        }

        let body = Paragraph::new(lines)
            .block(block)
            .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
        frame.render_widget(body, body_area);
        self.render_footer(frame, footer, app.theme.as_ref());
    }
}
