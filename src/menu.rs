use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent};
use ratatui::layout::{Position, Rect};

/// Quiz-set cards and the one currently highlighted.
///
/// Activation returns the card's name; what to do with it is up to the caller.
#[derive(Debug, Clone, Default)]
pub struct CardDeck {
    names: Vec<String>,
    selected: usize,
}

impl CardDeck {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names.into_iter().map(Into::<String>::into) {
            if !name.trim().is_empty() && !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self {
            names: unique,
            selected: 0,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.names.get(self.selected).map(String::as_str)
    }

    pub fn select_next(&mut self) {
        if !self.names.is_empty() {
            self.selected = (self.selected + 1) % self.names.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.names.is_empty() {
            self.selected = (self.selected + self.names.len() - 1) % self.names.len();
        }
    }

    /// Handle a key. Enter or Space on a press activates the highlighted card.
    pub fn on_key(&mut self, key: KeyEvent) -> Option<String> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Down | KeyCode::Tab | KeyCode::Char('j') => {
                self.select_next();
                None
            }
            KeyCode::Up | KeyCode::BackTab | KeyCode::Char('k') => {
                self.select_previous();
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.selected_name().map(str::to_owned),
            _ => None,
        }
    }

    /// Handle a left click; `areas` are the card rectangles as last laid out.
    pub fn on_click(&mut self, mouse: MouseEvent, areas: &[Rect]) -> Option<String> {
        let pos = Position::new(mouse.column, mouse.row);
        let idx = areas
            .iter()
            .take(self.names.len())
            .position(|area| area.contains(pos))?;
        self.selected = idx;
        self.selected_name().map(str::to_owned)
    }
}
