//! Tenant impersonation page.
//!
//! Only cloud superusers may use it. The page waits for the session, sends
//! everyone else to the login or default route, and then offers an email
//! and API key form. The response is logged and otherwise not shown.

use anyhow::Result;
use conform_engine::{RouteDecision, impersonation_access};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use super::state::{ImpersonateFocus, ImpersonateState};
use crate::app::{App, Effect, Msg, ScreenOutcome};
use crate::ui::components::common::{TextInputState, edit_text};
use crate::ui::components::component::Component;
use crate::ui::theme::Theme;
use crate::ui::utils::centered_rect;

pub const PAGE_TITLE: &str = "Impersonate User";
pub const EMAIL_PLACEHOLDER: &str = "Enter user email to impersonate";
pub const API_KEY_PLACEHOLDER: &str = "Enter API Key";
pub const RESTRICTED_NOTICE: &str = "Note: This feature is only available for @danswer.ai administrators";

#[derive(Debug, Default)]
pub struct ImpersonateComponent {
    state: ImpersonateState,
}

impl ImpersonateComponent {
    fn send(&mut self) -> Vec<Effect> {
        if self.state.sending {
            return Vec::new();
        }
        self.state.sending = true;
        vec![Effect::Impersonate(self.state.request())]
    }

    fn render_input(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &dyn Theme,
        input: &TextInputState,
        placeholder: &str,
        secret: bool,
        focused: bool,
    ) {
        let block = Block::default().borders(Borders::ALL).border_style(theme.border_style(focused));
        let inner = block.inner(area);
        let line = if input.input().is_empty() {
            Line::from(Span::styled(placeholder.to_string(), theme.text_muted_style()))
        } else {
            Line::from(Span::styled(input.display(secret), theme.text_primary_style()))
        };
        frame.render_widget(Paragraph::new(line).block(block), area);
        if focused {
            let x = inner.x.saturating_add(input.cursor_column(secret)).min(inner.right().saturating_sub(1));
            frame.set_cursor_position(Position::new(x, inner.y));
        }
    }
}

impl Component for ImpersonateComponent {
    fn init(&mut self) -> Result<()> {
        self.state = ImpersonateState::default();
        Ok(())
    }

    fn on_route_enter(&mut self, _app: &mut App) -> Vec<Effect> {
        vec![Effect::LoadSession]
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if key.code == KeyCode::Esc {
            return vec![Effect::Finish(ScreenOutcome::Cancelled)];
        }
        if impersonation_access(&app.session) != RouteDecision::Render {
            return Vec::new();
        }
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.state.focus = self.state.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.state.focus = self.state.focus.prev(),
            KeyCode::Enter if self.state.focus == ImpersonateFocus::Button => return self.send(),
            KeyCode::Char(' ') if self.state.focus == ImpersonateFocus::Button => return self.send(),
            KeyCode::Enter => self.state.focus = self.state.focus.next(),
            _ => {
                if let Some(input) = self.state.focused_input() {
                    edit_text(input, key);
                }
            }
        }
        Vec::new()
    }

    fn update(&mut self, app: &mut App, msg: &Msg) -> Vec<Effect> {
        match msg {
            Msg::SessionLoaded(_) => match impersonation_access(&app.session) {
                RouteDecision::Redirect(route) => {
                    debug!(route, "impersonation page not available");
                    vec![Effect::Finish(ScreenOutcome::Redirect(route))]
                }
                RouteDecision::Pending | RouteDecision::Render => Vec::new(),
            },
            Msg::ImpersonationFinished => {
                self.state.sending = false;
                vec![Effect::Finish(ScreenOutcome::Impersonated)]
            }
            Msg::Tick | Msg::GroupsLoaded(_) | Msg::StartersLoaded(_) => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        // Nothing is shown until the guard allows the page.
        if impersonation_access(&app.session) != RouteDecision::Render {
            return;
        }
        let theme = app.theme.as_ref();
        let area = centered_rect(60, 70, rect);
        let [title, email, api_key, button, notice] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(2),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(PAGE_TITLE, theme.accent_emphasis_style()))).alignment(Alignment::Center),
            title,
        );
        let focus = self.state.focus;
        self.render_input(frame, email, theme, &self.state.email, EMAIL_PLACEHOLDER, false, focus == ImpersonateFocus::Email);
        self.render_input(
            frame,
            api_key,
            theme,
            &self.state.api_key,
            API_KEY_PLACEHOLDER,
            true,
            focus == ImpersonateFocus::ApiKey,
        );

        let label = if self.state.sending {
            format!("{} {PAGE_TITLE}", app.throbber())
        } else {
            format!("[ {PAGE_TITLE} ]")
        };
        let mut style = theme.accent_emphasis_style();
        if focus == ImpersonateFocus::Button {
            style = style.add_modifier(Modifier::REVERSED);
        }
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(label, style))).alignment(Alignment::Center),
            button,
        );
        let width = usize::from(notice.width.max(1));
        let centered = if RESTRICTED_NOTICE.width() > width { Alignment::Left } else { Alignment::Center };
        frame.render_widget(
            Paragraph::new(Span::styled(RESTRICTED_NOTICE, theme.text_muted_style()))
                .alignment(centered)
                .wrap(Wrap { trim: true }),
            notice,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support;
    use conform_engine::{DEFAULT_ROUTE, LOGIN_ROUTE, SessionState};
    use conform_types::{User, UserRole};
    use crossterm::event::KeyModifiers;
    use ratatui::{Terminal, backend::TestBackend};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn signed_in(app: &mut App, component: &mut ImpersonateComponent, user: Option<User>) -> Vec<Effect> {
        let msg = Msg::SessionLoaded(SessionState::resolved(user));
        app.update(&msg);
        component.update(app, &msg)
    }

    fn draw(component: &mut ImpersonateComponent, app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                component.render(frame, area, app);
            })
            .unwrap();
        format!("{:?}", terminal.backend().buffer())
    }

    #[test]
    fn anonymous_viewers_are_sent_to_login() {
        let mut app = test_support::app();
        let mut component = ImpersonateComponent::default();
        let effects = signed_in(&mut app, &mut component, None);
        assert!(matches!(effects.as_slice(), [Effect::Finish(ScreenOutcome::Redirect(LOGIN_ROUTE))]));
    }

    #[test]
    fn regular_users_are_sent_to_search() {
        let mut app = test_support::app();
        let mut component = ImpersonateComponent::default();
        let user = User::new("basic@example.com", UserRole::Basic);
        let effects = signed_in(&mut app, &mut component, Some(user));
        assert!(matches!(effects.as_slice(), [Effect::Finish(ScreenOutcome::Redirect(DEFAULT_ROUTE))]));
    }

    #[test]
    fn nothing_renders_while_the_session_loads() {
        let mut app = test_support::app();
        let mut component = ImpersonateComponent::default();
        assert!(!draw(&mut component, &mut app).contains(PAGE_TITLE));
        assert!(component.handle_key_events(&mut app, key(KeyCode::Char('a'))).is_empty());
        assert_eq!(component.state.email.input(), "");
    }

    #[test]
    fn superuser_can_send_a_request() {
        let mut app = test_support::app();
        let mut component = ImpersonateComponent::default();
        let user = User::new("root@example.com", UserRole::Admin).cloud_superuser();
        assert!(signed_in(&mut app, &mut component, Some(user)).is_empty());

        for c in "a@b.io".chars() {
            component.handle_key_events(&mut app, key(KeyCode::Char(c)));
        }
        component.handle_key_events(&mut app, key(KeyCode::Tab));
        for c in "secret-key".chars() {
            component.handle_key_events(&mut app, key(KeyCode::Char(c)));
        }
        let screen = draw(&mut component, &mut app);
        assert!(screen.contains(PAGE_TITLE));
        assert!(!screen.contains("secret-key"));

        component.handle_key_events(&mut app, key(KeyCode::Tab));
        let effects = component.handle_key_events(&mut app, key(KeyCode::Enter));
        let [Effect::Impersonate(request)] = effects.as_slice() else {
            panic!("expected an impersonation request, got {effects:?}");
        };
        assert_eq!(request.email, "a@b.io");
        assert_eq!(request.api_key, "secret-key");
        assert!(component.handle_key_events(&mut app, key(KeyCode::Enter)).is_empty());

        let effects = component.update(&mut app, &Msg::ImpersonationFinished);
        assert!(matches!(effects.as_slice(), [Effect::Finish(ScreenOutcome::Impersonated)]));
    }
}
