use ratatui::Frame;

use crate::app::{App, AppState};
use crate::ui::{card::render_menu, SessionView};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Quiz set picker
pub struct MenuScreen;

impl Screen for MenuScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_menu(&app.deck, f.area(), f.buffer_mut());
    }
}

/// Loading, question, results and error views of the open session
pub struct SessionScreen;

impl Screen for SessionScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        if let Some(session) = app.session.as_ref() {
            f.render_widget(
                SessionView {
                    session,
                    results_scroll: app.results_scroll,
                },
                f.area(),
            );
        }
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Menu => Box::new(MenuScreen),
        AppState::Session => Box::new(SessionScreen),
    }
}

/// Draw the whole app
pub fn draw(app: &App, f: &mut Frame) {
    current_screen(&app.state).render(app, f);
}
