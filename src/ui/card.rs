use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use std::rc::Rc;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::menu::CardDeck;

const CARD_HEIGHT: u16 = 3;
const CARD_WIDTH: u16 = 40;
const TITLE_HEIGHT: u16 = 2;

/// A clickable box showing one quiz set name
pub struct QuizCard<'a> {
    pub name: &'a str,
    pub selected: bool,
}

impl Widget for QuizCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (border_style, text_style) = if self.selected {
            (
                Style::default().fg(Color::Cyan),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )
        } else {
            (
                Style::default().add_modifier(Modifier::DIM),
                Style::default(),
            )
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style);
        let inner_width = block.inner(area).width as usize;

        Paragraph::new(Span::styled(truncate(self.name, inner_width), text_style))
            .block(block)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

/// Cut `text` to at most `max_width` terminal columns, marking the cut with
/// an ellipsis.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// Rectangles of the first `count` cards, stacked and centered in `area`.
/// Cards that do not fit are left out.
pub fn card_areas(area: Rect, count: usize) -> Vec<Rect> {
    let list = menu_layout(area)[1];
    let width = CARD_WIDTH.min(list.width);
    let x = list.x + (list.width - width) / 2;

    (0..count)
        .map_while(|i| {
            let y = list.y.checked_add(u16::try_from(i).ok()?.checked_mul(CARD_HEIGHT)?)?;
            (y.saturating_add(CARD_HEIGHT) <= list.bottom())
                .then(|| Rect::new(x, y, width, CARD_HEIGHT))
        })
        .collect()
}

// title, card list, legend
fn menu_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .vertical_margin(1)
        .constraints([
            Constraint::Length(TITLE_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area)
}

/// Draw the quiz set menu: a title, one card per set, and a key legend
pub fn render_menu(deck: &CardDeck, area: Rect, buf: &mut Buffer) {
    let chunks = menu_layout(area);

    Paragraph::new(Span::styled(
        "Choose a quiz set",
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    if deck.is_empty() {
        Paragraph::new("No quiz sets configured")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
    }

    for (idx, card_area) in card_areas(area, deck.len()).into_iter().enumerate() {
        QuizCard {
            name: &deck.names()[idx],
            selected: idx == deck.selected(),
        }
        .render(card_area, buf);
    }

    Paragraph::new(Span::styled(
        "(↑/↓) move / (enter) open / click a card / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);
}
