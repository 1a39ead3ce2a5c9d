use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};
use ratatui::layout::Rect;
use tracing::{debug, info};

use crate::config::{Config, ExpiryPolicy};
use crate::countdown::Countdown;
use crate::loader::QuizSource;
use crate::menu::CardDeck;
use crate::runtime::QuizEvent;
use crate::session::{Advance, Phase, QuizSession};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Menu,
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// An in-flight quiz set fetch. Dropping it marks the fetch cancelled so
/// its result is never posted.
#[derive(Debug)]
struct LoadTicket {
    request: u64,
    cancelled: Arc<AtomicBool>,
}

impl Drop for LoadTicket {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

pub struct App {
    pub config: Config,
    pub state: AppState,
    pub deck: CardDeck,
    pub session: Option<QuizSession>,
    pub results_scroll: usize,
    source: Arc<dyn QuizSource>,
    events: Sender<QuizEvent>,
    tick_period: Duration,
    next_request: u64,
    load: Option<LoadTicket>,
    countdown: Option<Countdown>,
}

impl App {
    pub fn new(config: Config, source: Arc<dyn QuizSource>, events: Sender<QuizEvent>) -> Self {
        let deck = CardDeck::new(config.quiz_sets.clone());
        Self {
            config,
            state: AppState::Menu,
            deck,
            session: None,
            results_scroll: 0,
            source,
            events,
            tick_period: TICK_PERIOD,
            next_request: 0,
            load: None,
            countdown: None,
        }
    }

    /// Shorten the countdown period, for tests
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Start a fresh session for `quiz_set`, discarding any current one
    pub fn open_quiz_set(&mut self, quiz_set: &str) {
        self.close_session();
        info!(quiz_set, "opening quiz set");

        self.next_request += 1;
        let request = self.next_request;
        let cancelled = Arc::new(AtomicBool::new(false));

        let source = Arc::clone(&self.source);
        let tx = self.events.clone();
        let flag = Arc::clone(&cancelled);
        let name = quiz_set.to_string();
        std::thread::spawn(move || {
            let outcome = source.fetch(&name);
            if flag.load(Ordering::Acquire) {
                debug!(request, "discarding cancelled load");
                return;
            }
            let _ = tx.send(QuizEvent::Loaded { request, outcome });
        });

        self.load = Some(LoadTicket { request, cancelled });
        self.session = Some(QuizSession::new(
            quiz_set,
            self.config.seconds_per_question,
        ));
        self.results_scroll = 0;
        self.state = AppState::Session;
    }

    /// Drop the current session along with its load and countdown
    pub fn close_session(&mut self) {
        self.load = None;
        self.countdown = None;
        if let Some(session) = self.session.take() {
            debug!(quiz_set = session.quiz_set(), phase = %session.phase(), "session closed");
        }
        self.state = AppState::Menu;
    }

    pub fn is_loading(&self) -> bool {
        self.load.is_some()
    }

    pub fn countdown_generation(&self) -> Option<u64> {
        self.countdown.as_ref().map(Countdown::generation)
    }

    pub fn handle_event(&mut self, event: QuizEvent, viewport: Rect) -> Control {
        let control = match event {
            QuizEvent::Key(key) => self.on_key(key),
            QuizEvent::Mouse(mouse) => {
                self.on_mouse(mouse, viewport);
                Control::Continue
            }
            QuizEvent::Resize => Control::Continue,
            QuizEvent::InputClosed => Control::Quit,
            QuizEvent::Tick { generation } => {
                self.on_tick(generation);
                Control::Continue
            }
            QuizEvent::Loaded { request, outcome } => {
                if self.load.as_ref().map(|t| t.request) == Some(request) {
                    self.load = None;
                    if let Some(session) = self.session.as_mut() {
                        session.finish_load(outcome);
                    }
                } else {
                    debug!(request, "ignoring stale load result");
                }
                Control::Continue
            }
        };
        self.sync_countdown();
        control
    }

    fn on_tick(&mut self, generation: u64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.timer_generation() != generation {
            return;
        }
        session.tick();
        if session.seconds_remaining() == 0 && self.config.on_expiry == ExpiryPolicy::Advance {
            session.expire();
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent, viewport: Rect) {
        if self.state != AppState::Menu {
            return;
        }
        let areas = crate::ui::card::card_areas(viewport, self.deck.len());
        if let Some(name) = self.deck.on_click(mouse, &areas) {
            self.open_quiz_set(&name);
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.kind != KeyEventKind::Press {
            return Control::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        match self.state {
            AppState::Menu => {
                if key.code == KeyCode::Esc || key.code == KeyCode::Char('q') {
                    return Control::Quit;
                }
                if let Some(name) = self.deck.on_key(key) {
                    self.open_quiz_set(&name);
                }
                Control::Continue
            }
            AppState::Session => self.on_session_key(key),
        }
    }

    fn on_session_key(&mut self, key: KeyEvent) -> Control {
        if key.code == KeyCode::Esc {
            if self.deck.is_empty() {
                return Control::Quit;
            }
            self.close_session();
            return Control::Continue;
        }

        let Some(session) = self.session.as_mut() else {
            return Control::Continue;
        };

        match session.phase() {
            Phase::Loading => {}
            Phase::Active => match key.code {
                KeyCode::Char(c @ '1'..='4') => {
                    session.select_option_at(c as usize - '1' as usize);
                }
                KeyCode::Char(c @ 'a'..='d') => {
                    session.select_option_at(c as usize - 'a' as usize);
                }
                KeyCode::Enter | KeyCode::Right | KeyCode::Char('n') => {
                    if session.confirm_next() == Advance::Completed {
                        self.results_scroll = 0;
                    }
                }
                KeyCode::Left | KeyCode::Char('p') => {
                    session.confirm_prev();
                }
                _ => {}
            },
            Phase::Completed => match key.code {
                KeyCode::Left | KeyCode::Char('p') => {
                    if session.confirm_prev() {
                        self.results_scroll = self.results_scroll.min(session.current_index());
                    }
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.results_scroll = self.results_scroll.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    let total = session.questions().len();
                    if self.results_scroll + 1 < total {
                        self.results_scroll += 1;
                    }
                }
                KeyCode::Char('r') => self.reload(),
                _ => {}
            },
            Phase::NoData | Phase::Failed => {
                if key.code == KeyCode::Char('r') {
                    self.reload();
                }
            }
        }
        Control::Continue
    }

    fn reload(&mut self) {
        let Some(quiz_set) = self.session.as_ref().map(|s| s.quiz_set().to_string()) else {
            return;
        };
        self.open_quiz_set(&quiz_set);
    }

    /// Keep exactly one countdown running, armed for the session's current
    /// question, and none when no question is being timed.
    fn sync_countdown(&mut self) {
        let wanted = self
            .session
            .as_ref()
            .filter(|s| s.wants_countdown())
            .map(QuizSession::timer_generation);

        if self.countdown_generation() == wanted {
            return;
        }
        // drop the old one first so its thread is joined before the next starts
        self.countdown = None;
        if let Some(generation) = wanted {
            debug!(generation, "countdown armed");
            self.countdown = Some(Countdown::start(
                generation,
                self.tick_period,
                self.events.clone(),
            ));
        }
    }
}
