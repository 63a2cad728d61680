//! Dynamic connector form screen.
//!
//! Paints the connector name, one control per visible field, the public
//! flag and group picker (enterprise only), and a submit button that is
//! enabled exactly when the form reports itself submittable.

use conform_engine::form::connector::{GROUP_SECTION_TITLE, PUBLIC_TOGGLE_DESCRIPTION, PUBLIC_TOGGLE_LABEL};
use conform_engine::form::connector_initial_values;
use conform_engine::{ConnectorForm, ConnectorFormOptions, FieldControl, FieldRow, FormError, SharedValues};
use conform_types::{ConnectionConfiguration, FieldKind, FieldValue};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use super::state::{ConnectorFormState, FocusTarget};
use crate::app::{App, Effect, Msg, ScreenOutcome};
use crate::ui::components::common::edit_text;
use crate::ui::components::component::Component;
use crate::ui::theme::Theme;
use crate::ui::utils::{hint_spans, scroll_offset, wrap_lines};

const INCOMPLETE_NOTICE: &str = "Fill in every required field before submitting.";
const GROUPS_FAILED_NOTICE: &str = "Unable to load user groups.";

#[derive(Debug)]
pub struct ConnectorFormComponent {
    state: ConnectorFormState,
    /// Values as the screen sees them; every form edit lands here.
    values: SharedValues,
}

/// Lines of the scrollable body plus where the focus and cursor landed.
#[derive(Default)]
struct Body {
    lines: Vec<Line<'static>>,
    focus_line: usize,
    /// Line index and column of the text cursor.
    cursor: Option<(usize, u16)>,
}

impl Body {
    fn push(&mut self, line: Line<'static>) {
        self.lines.push(line);
    }

    fn mark_focus(&mut self) {
        self.focus_line = self.lines.len();
    }
}

impl ConnectorFormComponent {
    pub fn new(config: ConnectionConfiguration, options: ConnectorFormOptions) -> Result<Self, FormError> {
        let values = SharedValues::with_values(connector_initial_values(
            &config.values,
            options.initial_name.as_deref(),
            options.defaults.as_ref(),
        ));
        let form = ConnectorForm::new(config, options, Box::new(values.clone()))?;
        Ok(Self {
            state: ConnectorFormState::new(form),
            values,
        })
    }

    fn submit(&mut self) -> Vec<Effect> {
        match self.state.form().submission_from(&self.values.snapshot()) {
            Some(submission) => vec![Effect::Finish(ScreenOutcome::Connector(submission))],
            None => {
                self.state.form_mut().touch_all();
                self.state.notice = Some(INCOMPLETE_NOTICE.to_string());
                Vec::new()
            }
        }
    }

    fn handle_field_key(&mut self, key: KeyEvent, row: FieldRow) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match row.control {
            FieldControl::SingleValue {
                kind: FieldKind::Checkbox, ..
            } => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => {
                    self.state.toggle_checkbox();
                }
                KeyCode::Down => self.state.focus_next(),
                KeyCode::Up => self.state.focus_prev(),
                _ => {}
            },
            FieldControl::SingleValue { .. } => match key.code {
                KeyCode::Enter | KeyCode::Down => self.state.focus_next(),
                KeyCode::Up => self.state.focus_prev(),
                _ => {
                    if edit_text(self.state.editor_mut(), key) {
                        self.state.commit_editor();
                    }
                }
            },
            FieldControl::Select { .. } => match key.code {
                KeyCode::Left => {
                    self.state.cycle_select(-1);
                }
                KeyCode::Right | KeyCode::Char(' ') => {
                    self.state.cycle_select(1);
                }
                KeyCode::Enter | KeyCode::Down => self.state.focus_next(),
                KeyCode::Up => self.state.focus_prev(),
                _ => {}
            },
            FieldControl::List { .. } => match key.code {
                KeyCode::Char('a') if ctrl => {
                    self.state.push_list_item();
                }
                KeyCode::Char('x') if ctrl => {
                    self.state.remove_list_item();
                }
                KeyCode::Down => {
                    if !self.state.move_list_cursor(1) {
                        self.state.focus_next();
                    }
                }
                KeyCode::Up => {
                    if !self.state.move_list_cursor(-1) {
                        self.state.focus_prev();
                    }
                }
                KeyCode::Enter => self.state.focus_next(),
                _ => {
                    if edit_text(self.state.editor_mut(), key) {
                        self.state.commit_editor();
                    }
                }
            },
            FieldControl::FileUpload { .. } => match key.code {
                KeyCode::Enter => {
                    self.state.add_typed_file();
                }
                KeyCode::Char('x') if ctrl => {
                    self.state.remove_last_file();
                }
                KeyCode::Down => self.state.focus_next(),
                KeyCode::Up => self.state.focus_prev(),
                _ => {
                    edit_text(self.state.editor_mut(), key);
                }
            },
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.theme.as_ref();
        let config = self.state.form().config();
        let mut title = vec![Span::styled(format!(" {} ", config.description), theme.accent_emphasis_style())];
        if app.executing {
            title.push(Span::styled(format!("{} loading ", app.throbber()), theme.status_info()));
        }
        let subtext = config.subtext.clone().unwrap_or_default();
        let header = Paragraph::new(Line::from(Span::styled(subtext, theme.text_secondary_style()))).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(false))
                .title(Line::from(title)),
        );
        frame.render_widget(header, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.theme.as_ref();
        let key_style = theme.accent_emphasis_style();
        let text_style = theme.text_muted_style();
        let mut hints = vec![("Tab", "next"), ("Shift-Tab", "previous")];
        if let Some(row) = self.state.focused_row() {
            match row.control {
                FieldControl::List { .. } => hints.extend([("Ctrl-A", "add item"), ("Ctrl-X", "remove item")]),
                FieldControl::Select { .. } => hints.push(("←/→", "choose")),
                FieldControl::FileUpload { .. } => hints.extend([("Enter", "add file"), ("Ctrl-X", "remove file")]),
                FieldControl::SingleValue {
                    kind: FieldKind::Checkbox, ..
                } => hints.push(("Space", "toggle")),
                FieldControl::SingleValue { .. } => {}
            }
        }
        hints.extend([("Ctrl-S", "submit"), ("Esc", "cancel")]);
        let mut spans = hint_spans(&hints, key_style, text_style);
        if let Some(notice) = &self.state.notice {
            spans.push(Span::styled(notice.clone(), theme.status_warning()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn build_body(&self, theme: &dyn Theme, width: u16) -> Body {
        let mut body = Body::default();
        let focus = self.state.focus();
        for (index, row) in self.state.form().rows().into_iter().enumerate() {
            let focused = focus == FocusTarget::Field(index);
            self.push_row(&mut body, theme, width, row, focused);
            body.push(Line::default());
        }

        let form = self.state.form();
        if form.shows_public_toggle() {
            let focused = focus == FocusTarget::PublicToggle;
            if focused {
                body.mark_focus();
            }
            body.push(Line::from(vec![
                Span::styled(checkbox(form.access().is_public()), theme.text_primary_style()),
                Span::styled(PUBLIC_TOGGLE_LABEL, theme.label_style(focused)),
            ]));
            for line in wrap_lines(PUBLIC_TOGGLE_DESCRIPTION, width) {
                body.push(Line::from(Span::styled(line, theme.text_muted_style())));
            }
            body.push(Line::default());
        }

        if form.shows_group_section() {
            body.push(Line::from(Span::styled(GROUP_SECTION_TITLE, theme.label_style(false))));
            body.push(Line::from(Span::styled(form.group_section_hint(), theme.text_muted_style())));
            let access = form.access();
            for (index, group) in access.groups().unwrap_or_default().iter().enumerate() {
                let focused = focus == FocusTarget::Group(index);
                if focused {
                    body.mark_focus();
                }
                let style = if focused { theme.selection_style() } else { theme.text_primary_style() };
                body.push(Line::from(vec![
                    Span::styled(checkbox(access.is_selected(group.id)), style),
                    Span::styled(group.name.clone(), style),
                ]));
            }
            body.push(Line::default());
        }

        if focus == FocusTarget::Submit {
            body.mark_focus();
        }
        let submit_style = if self.state.status.submittable {
            theme.status_success().add_modifier(Modifier::BOLD)
        } else {
            theme.text_muted_style()
        };
        let submit_style = if focus == FocusTarget::Submit {
            submit_style.add_modifier(Modifier::REVERSED)
        } else {
            submit_style
        };
        body.push(Line::from(Span::styled("[ Submit ]", submit_style)));
        body
    }

    fn push_row(&self, body: &mut Body, theme: &dyn Theme, width: u16, row: FieldRow, focused: bool) {
        if focused {
            body.mark_focus();
        }
        let show_label = !matches!(row.control, FieldControl::FileUpload { show_label: false });
        if show_label {
            let mut label = vec![Span::styled(row.label.clone(), theme.label_style(focused))];
            if row.optional {
                label.push(Span::styled(" (optional)", theme.text_muted_style()));
            }
            body.push(Line::from(label));
            if let Some(description) = &row.description {
                for line in wrap_lines(description, width) {
                    body.push(Line::from(Span::styled(line, theme.text_muted_style())));
                }
            }
        }

        let value_style = if focused { theme.text_primary_style() } else { theme.text_secondary_style() };
        match &row.control {
            FieldControl::SingleValue {
                kind: FieldKind::Checkbox,
                value,
            } => {
                let checked = value.as_bool().unwrap_or(false);
                body.push(Line::from(Span::styled(format!("{}{}", checkbox(checked), row.label), value_style)));
            }
            FieldControl::SingleValue { kind, value } => {
                let secret = *kind == FieldKind::Password;
                self.push_text_input(body, theme, value, secret, focused);
            }
            FieldControl::Select { choices, selected } => {
                let label = choices.get(*selected).map(|choice| choice.label.clone()).unwrap_or_default();
                let style = if focused { theme.selection_style() } else { value_style };
                body.push(Line::from(vec![
                    Span::styled("< ", theme.text_muted_style()),
                    Span::styled(label, style),
                    Span::styled(" >", theme.text_muted_style()),
                ]));
            }
            FieldControl::List { items } => {
                for (index, item) in items.iter().enumerate() {
                    let on_item = focused && index == self.state.list_cursor();
                    let prefix = if on_item { "› " } else { "• " };
                    if on_item {
                        body.cursor = Some((body.lines.len(), prefix.width() as u16 + self.state.editor().cursor_column(false)));
                        body.push(Line::from(vec![
                            Span::styled(prefix, theme.accent_emphasis_style()),
                            Span::styled(self.state.editor().input().to_string(), theme.text_primary_style()),
                        ]));
                    } else {
                        body.push(Line::from(vec![
                            Span::styled(prefix, theme.text_muted_style()),
                            Span::styled(item.clone(), value_style),
                        ]));
                    }
                }
                if items.is_empty() {
                    body.push(Line::from(Span::styled("(no entries)", theme.text_muted_style())));
                }
            }
            FieldControl::FileUpload { .. } => {
                for path in self.state.form().selected_files() {
                    body.push(Line::from(Span::styled(format!("• {}", path.display()), value_style)));
                }
                if focused {
                    let prefix = "path: ";
                    body.cursor = Some((body.lines.len(), prefix.width() as u16 + self.state.editor().cursor_column(false)));
                    body.push(Line::from(vec![
                        Span::styled(prefix, theme.text_muted_style()),
                        Span::styled(self.state.editor().input().to_string(), theme.text_primary_style()),
                    ]));
                } else if self.state.form().selected_files().is_empty() {
                    body.push(Line::from(Span::styled("(no files selected)", theme.text_muted_style())));
                }
            }
        }
        if let Some(error) = row.error {
            body.push(Line::from(Span::styled(error, theme.status_error())));
        }
    }

    fn push_text_input(&self, body: &mut Body, theme: &dyn Theme, value: &FieldValue, secret: bool, focused: bool) {
        let prefix = "> ";
        if focused {
            let editor = self.state.editor();
            body.cursor = Some((body.lines.len(), prefix.width() as u16 + editor.cursor_column(secret)));
            body.push(Line::from(vec![
                Span::styled(prefix, theme.accent_emphasis_style()),
                Span::styled(editor.display(secret), theme.text_primary_style()),
            ]));
        } else {
            let text = value.as_text().unwrap_or_default();
            let shown = if secret { mask(text) } else { text.to_string() };
            body.push(Line::from(vec![
                Span::styled(prefix, theme.text_muted_style()),
                Span::styled(shown, theme.text_secondary_style()),
            ]));
        }
    }
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x] " } else { "[ ] " }
}

fn mask(text: &str) -> String {
    crate::ui::components::common::TextInputState::with_text(text).display(true)
}

impl Component for ConnectorFormComponent {
    fn on_route_enter(&mut self, _app: &mut App) -> Vec<Effect> {
        if self.state.form().enterprise_features() {
            vec![Effect::LoadSession, Effect::LoadGroups]
        } else {
            Vec::new()
        }
    }

    fn handle_key_events(&mut self, _app: &mut App, key: KeyEvent) -> Vec<Effect> {
        self.state.notice = None;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return vec![Effect::Finish(ScreenOutcome::Cancelled)],
            KeyCode::Char('s') if ctrl => return self.submit(),
            KeyCode::Tab => {
                self.state.focus_next();
                return Vec::new();
            }
            KeyCode::BackTab => {
                self.state.focus_prev();
                return Vec::new();
            }
            _ => {}
        }

        match self.state.focus() {
            FocusTarget::Field(_) => {
                if let Some(row) = self.state.focused_row() {
                    self.handle_field_key(key, row);
                }
            }
            FocusTarget::PublicToggle | FocusTarget::Group(_) | FocusTarget::Submit
                if matches!(key.code, KeyCode::Down) =>
            {
                self.state.focus_next()
            }
            FocusTarget::PublicToggle | FocusTarget::Group(_) | FocusTarget::Submit if matches!(key.code, KeyCode::Up) => {
                self.state.focus_prev()
            }
            FocusTarget::PublicToggle => {
                if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
                    self.state.toggle_public();
                    self.state.ensure_focus_valid();
                }
            }
            FocusTarget::Group(index) => {
                if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
                    self.state.toggle_group_at(index);
                }
            }
            FocusTarget::Submit => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    return self.submit();
                }
            }
        }
        Vec::new()
    }

    fn update(&mut self, _app: &mut App, msg: &Msg) -> Vec<Effect> {
        match msg {
            Msg::SessionLoaded(session) => self.state.form_mut().apply_session(session),
            Msg::GroupsLoaded(Some(groups)) => self.state.form_mut().set_groups(groups.clone()),
            Msg::GroupsLoaded(None) => self.state.notice = Some(GROUPS_FAILED_NOTICE.to_string()),
            Msg::Tick | Msg::StartersLoaded(_) | Msg::ImpersonationFinished => return Vec::new(),
        }
        self.state.ensure_focus_valid();
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        self.state.render_pass();

        let [header, body_area, footer] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(3), Constraint::Length(1)]).areas(rect);
        self.render_header(frame, header, app);
        self.render_footer(frame, footer, app);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.border_style(true));
        let inner = block.inner(body_area);
        let body = self.build_body(app.theme.as_ref(), inner.width.saturating_sub(1));
        self.state.scroll = scroll_offset(body.focus_line, inner.height, self.state.scroll);
        let scroll = self.state.scroll;

        if let Some((line, column)) = body.cursor
            && line >= scroll
            && line < scroll + usize::from(inner.height)
        {
            let y = inner.y + (line - scroll) as u16;
            let x = inner.x.saturating_add(column).min(inner.right().saturating_sub(1));
            frame.set_cursor_position(Position::new(x, y));
        }

        let paragraph = Paragraph::new(body.lines)
            .block(block)
            .style(Style::default().bg(app.theme.roles().background))
            .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
        frame.render_widget(paragraph, body_area);
    }
}
