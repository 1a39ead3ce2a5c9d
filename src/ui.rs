pub mod card;
pub mod screen;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::results::QuizResults;
use crate::session::{Phase, QuizSession, COMPLETED_MESSAGE};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const LOW_TIME_SECS: u32 = 10;

/// Renders a quiz session in whatever phase it is in
pub struct SessionView<'a> {
    pub session: &'a QuizSession,
    pub results_scroll: usize,
}

impl Widget for SessionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = self.session;
        match session.phase() {
            Phase::Loading => {
                centered_message(
                    area,
                    buf,
                    Span::styled("Loading...", Style::default().add_modifier(Modifier::DIM)),
                    &["(esc)ape"],
                );
            }
            Phase::Failed => {
                centered_message(
                    area,
                    buf,
                    Span::styled(
                        session.message().unwrap_or_default().to_string(),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    &["(r)etry", "(esc)ape"],
                );
            }
            Phase::NoData => {
                centered_message(
                    area,
                    buf,
                    Span::styled(
                        session.message().unwrap_or_default().to_string(),
                        Style::default().fg(Color::Yellow),
                    ),
                    &["(r)eload", "(esc)ape"],
                );
            }
            Phase::Active => render_question(session, area, buf),
            Phase::Completed => {
                if let Some(results) = session.results() {
                    render_results(session, results, self.results_scroll, area, buf);
                }
            }
        }
    }
}

fn legend(items: &[&str]) -> Paragraph<'static> {
    Paragraph::new(Span::styled(
        items.iter().join(" / "),
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
}

fn centered_message(area: Rect, buf: &mut Buffer, message: Span<'static>, keys: &[&str]) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(message)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
    legend(keys).render(chunks[3], buf);
}

fn render_question(session: &QuizSession, area: Rect, buf: &mut Buffer) {
    let Some(question) = session.current_question() else {
        return;
    };

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let selected_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD | Modifier::REVERSED);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // quiz set
            Constraint::Length(2), // time remaining
            Constraint::Length(2), // question number
            Constraint::Min(2),    // question text
            Constraint::Length(5), // options
            Constraint::Length(2), // prev / next
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(format!("Quiz: {}", session.quiz_set()), bold_style))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let secs = session.seconds_remaining();
    let timer_style = if secs <= LOW_TIME_SECS {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        dim_style
    };
    Paragraph::new(Span::styled(
        format!("Time remaining: {secs} seconds"),
        timer_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "Question {} of {}",
            session.current_index() + 1,
            session.questions().len()
        ),
        bold_style,
    ))
    .render(chunks[2], buf);

    Paragraph::new(question.text.as_str())
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    let pending = session.pending_selection();
    let options: Vec<Line> = question
        .options
        .iter()
        .enumerate()
        .map(|(slot, option)| {
            let label = format!(" [{}] {} ", slot + 1, option);
            if pending == Some(option.as_str()) {
                Line::from(Span::styled(label, selected_style))
            } else {
                Line::from(label)
            }
        })
        .collect();
    Paragraph::new(options).render(chunks[4], buf);

    let enabled = |on: bool| if on { bold_style } else { dim_style };
    let next_label = if session.is_last_question() {
        "Finish ▶"
    } else {
        "Next ▶"
    };
    Paragraph::new(Line::from(vec![
        Span::styled("◀ Prev", enabled(session.can_confirm_prev())),
        Span::raw("    "),
        Span::styled(next_label, enabled(session.can_confirm_next())),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[5], buf);

    legend(&["(1-4) choose", "(←) prev", "(enter) next", "(esc)ape"]).render(chunks[6], buf);
}

fn render_results(
    session: &QuizSession,
    results: &QuizResults,
    scroll: usize,
    area: Rect,
    buf: &mut Buffer,
) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(2), // completion message
            Constraint::Min(3),    // entries
            Constraint::Length(2), // summary
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled("Quiz Results", bold_style))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        COMPLETED_MESSAGE,
        Style::default().fg(Color::Green),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let lines: Vec<Line> = results
        .entries
        .iter()
        .enumerate()
        .skip(scroll)
        .flat_map(|(idx, entry)| {
            let question_style = if idx == session.current_index() {
                bold_style.add_modifier(Modifier::UNDERLINED)
            } else {
                bold_style
            };
            let answer_style = if entry.is_correct() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Red)
            };
            let user_answer = entry.user_answer.as_deref().unwrap_or("(no answer)");

            [
                Line::from(Span::styled(
                    format!("{}. {}", idx + 1, entry.question.text),
                    question_style,
                )),
                Line::from(Span::styled(
                    format!("   Your Answer: {user_answer}"),
                    answer_style,
                )),
                Line::from(format!("   Correct Answer: {}", entry.correct_answer)),
                Line::default(),
            ]
        })
        .collect();
    Paragraph::new(lines).render(chunks[2], buf);

    Paragraph::new(Span::styled(results.summary(), bold_style))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    legend(&["(p)rev question", "(↑/↓) scroll", "(r)etry", "(esc)ape"]).render(chunks[4], buf);
}
