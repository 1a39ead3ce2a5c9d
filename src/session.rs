use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::loader::LoadError;
use crate::question::Question;
use crate::results::{project, QuizResults};

pub const DEFAULT_SECONDS_PER_QUESTION: u32 = 60;
pub const NO_DATA_MESSAGE: &str = "No quiz data available";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load quiz data";
pub const COMPLETED_MESSAGE: &str = "Quiz completed! Reviewing results...";

/// A confirmed answer for one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub chosen_option: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Loading,
    Active,
    Completed,
    NoData,
    Failed,
}

/// Outcome of a forward move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Guard not met; nothing changed
    Ignored,
    /// Moved on to the next question
    Moved,
    /// The last question was answered and results are available
    Completed,
}

/// One pass through a quiz set, from load to results.
///
/// All progression state lives here and only changes through the
/// transition methods below.
#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz_set: String,
    phase: Phase,
    questions: Vec<Question>,
    current_index: usize,
    seconds_per_question: u32,
    seconds_remaining: u32,
    pending_selection: Option<String>,
    answers: BTreeMap<usize, AnswerRecord>,
    results: Option<QuizResults>,
    error: Option<String>,
    timer_generation: u64,
}

impl QuizSession {
    /// A fresh session waiting for its questions. Each question gets at least one second.
    pub fn new(quiz_set: impl Into<String>, seconds_per_question: u32) -> Self {
        let seconds_per_question = seconds_per_question.max(1);
        Self {
            quiz_set: quiz_set.into(),
            phase: Phase::Loading,
            questions: Vec::new(),
            current_index: 0,
            seconds_per_question,
            seconds_remaining: seconds_per_question,
            pending_selection: None,
            answers: BTreeMap::new(),
            results: None,
            error: None,
            timer_generation: 0,
        }
    }

    /// Apply the result of fetching the quiz set. Ignored unless loading.
    pub fn finish_load(&mut self, outcome: Result<Vec<Question>, LoadError>) {
        if self.phase != Phase::Loading {
            warn!(quiz_set = %self.quiz_set, phase = %self.phase, "load result arrived late");
            return;
        }

        match outcome {
            Ok(questions) if questions.is_empty() => {
                info!(quiz_set = %self.quiz_set, "quiz set is empty");
                self.phase = Phase::NoData;
                self.error = Some(NO_DATA_MESSAGE.to_string());
            }
            Ok(questions) => {
                info!(quiz_set = %self.quiz_set, questions = questions.len(), "quiz started");
                self.questions = questions;
                self.current_index = 0;
                self.pending_selection = None;
                self.phase = Phase::Active;
                self.reset_countdown();
            }
            Err(e) => {
                warn!(quiz_set = %self.quiz_set, error = %e, "quiz set failed to load");
                self.questions.clear();
                self.phase = Phase::Failed;
                self.error = Some(LOAD_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// One second passed on the current question
    pub fn tick(&mut self) -> bool {
        if self.phase != Phase::Active || self.seconds_remaining == 0 {
            return false;
        }
        self.seconds_remaining -= 1;
        true
    }

    pub fn select_option(&mut self, option: &str) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        if self.pending_selection.as_deref() == Some(option) {
            return false;
        }
        self.pending_selection = Some(option.to_string());
        true
    }

    /// Select the option in `slot` (0-based) of the current question
    pub fn select_option_at(&mut self, slot: usize) -> bool {
        let Some(option) = self
            .current_question()
            .and_then(|q| q.option(slot))
            .map(str::to_owned)
        else {
            return false;
        };
        self.select_option(&option)
    }

    pub fn can_confirm_next(&self) -> bool {
        self.phase == Phase::Active
            && self.pending_selection.is_some()
            && self.seconds_remaining > 0
    }

    pub fn confirm_next(&mut self) -> Advance {
        if !self.can_confirm_next() {
            return Advance::Ignored;
        }
        self.record_pending();
        self.advance()
    }

    pub fn can_confirm_prev(&self) -> bool {
        matches!(self.phase, Phase::Active | Phase::Completed) && self.current_index > 0
    }

    pub fn confirm_prev(&mut self) -> bool {
        if !self.can_confirm_prev() {
            return false;
        }
        self.current_index -= 1;
        self.pending_selection = self
            .answers
            .get(&self.current_index)
            .map(|a| a.chosen_option.clone());
        self.reset_countdown();
        debug!(index = self.current_index, "moved back");
        true
    }

    /// Move past a question whose countdown ran out. A pending selection is
    /// kept as the answer; otherwise the question stays unanswered.
    pub fn expire(&mut self) -> Advance {
        if self.phase != Phase::Active || self.seconds_remaining > 0 {
            return Advance::Ignored;
        }
        debug!(index = self.current_index, "question expired");
        self.record_pending();
        self.advance()
    }

    fn record_pending(&mut self) {
        if let Some(option) = self.pending_selection.clone() {
            self.answers.insert(
                self.current_index,
                AnswerRecord {
                    question_index: self.current_index,
                    chosen_option: option,
                },
            );
        }
    }

    fn advance(&mut self) -> Advance {
        if self.current_index + 1 >= self.questions.len() {
            let results = project(&self.questions, &self.answers);
            info!(
                quiz_set = %self.quiz_set,
                score = results.score,
                total = results.total(),
                "quiz completed"
            );
            self.results = Some(results);
            self.phase = Phase::Completed;
            return Advance::Completed;
        }

        self.current_index += 1;
        self.pending_selection = None;
        self.reset_countdown();
        debug!(index = self.current_index, "moved forward");
        Advance::Moved
    }

    fn reset_countdown(&mut self) {
        self.seconds_remaining = self.seconds_per_question;
        self.timer_generation += 1;
    }

    /// Whether a countdown should be running right now
    pub fn wants_countdown(&self) -> bool {
        self.phase == Phase::Active && self.seconds_remaining > 0
    }

    pub fn quiz_set(&self) -> &str {
        &self.quiz_set
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn pending_selection(&self) -> Option<&str> {
        self.pending_selection.as_deref()
    }

    pub fn answers(&self) -> &BTreeMap<usize, AnswerRecord> {
        &self.answers
    }

    pub fn results(&self) -> Option<&QuizResults> {
        self.results.as_ref()
    }

    /// User-facing message for the no-data and failed phases
    pub fn message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn timer_generation(&self) -> u64 {
        self.timer_generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question::new(format!("question {i}"), ["A", "B", "C", "D"], "B"))
            .collect()
    }

    fn active(n: usize) -> QuizSession {
        let mut s = QuizSession::new("set", DEFAULT_SECONDS_PER_QUESTION);
        s.finish_load(Ok(questions(n)));
        s
    }

    #[test]
    fn test_new_session_is_loading() {
        let s = QuizSession::new("set", 60);
        assert_eq!(s.phase(), Phase::Loading);
        assert!(!s.wants_countdown());
        assert_eq!(s.current_question(), None);
    }

    #[test]
    fn test_load_starts_session() {
        let s = active(3);
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.seconds_remaining(), 60);
        assert!(!s.is_completed());
        assert_eq!(s.pending_selection(), None);
        assert!(s.wants_countdown());
        assert_eq!(s.timer_generation(), 1);
    }

    #[test]
    fn test_zero_seconds_still_counts_down() {
        let mut s = QuizSession::new("set", 0);
        s.finish_load(Ok(questions(2)));

        assert_eq!(s.seconds_remaining(), 1);
        assert!(s.wants_countdown());
        assert!(s.select_option("B"));
        assert!(s.can_confirm_next());
        assert_eq!(s.confirm_next(), Advance::Moved);
        assert_eq!(s.current_index(), 1);
    }

    #[test]
    fn test_load_empty_reports_no_data() {
        let mut s = QuizSession::new("set", 60);
        s.finish_load(Ok(vec![]));

        assert_eq!(s.phase(), Phase::NoData);
        assert_eq!(s.message(), Some(NO_DATA_MESSAGE));
        assert!(!s.wants_countdown());
        assert!(!s.select_option("A"));
        assert_eq!(s.confirm_next(), Advance::Ignored);
    }

    #[test]
    fn test_load_failure_keeps_nothing() {
        let mut s = QuizSession::new("set", 60);
        s.finish_load(Err(LoadError::Transport("connection refused".into())));

        assert_eq!(s.phase(), Phase::Failed);
        assert_eq!(s.message(), Some(LOAD_FAILED_MESSAGE));
        assert!(!s.is_completed());
        assert!(s.questions().is_empty());
    }

    #[test]
    fn test_second_load_result_is_ignored() {
        let mut s = active(2);
        s.finish_load(Err(LoadError::Status(500)));
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.questions().len(), 2);
    }

    #[test]
    fn test_tick_decrements_and_floors_at_zero() {
        let mut s = active(1);
        for _ in 0..10 {
            s.tick();
        }
        assert_eq!(s.seconds_remaining(), 50);

        for _ in 0..100 {
            s.tick();
        }
        assert_eq!(s.seconds_remaining(), 0);
        assert!(!s.tick());
        assert!(!s.wants_countdown());
        assert_eq!(s.phase(), Phase::Active);
    }

    #[test]
    fn test_tick_ignored_outside_active() {
        let mut s = QuizSession::new("set", 60);
        assert!(!s.tick());
        assert_eq!(s.seconds_remaining(), 60);
    }

    #[test]
    fn test_select_option_idempotent_and_replaces() {
        let mut s = active(2);
        assert!(s.select_option("A"));
        assert!(!s.select_option("A"));
        assert_eq!(s.pending_selection(), Some("A"));

        assert!(s.select_option("C"));
        assert_eq!(s.pending_selection(), Some("C"));
    }

    #[test]
    fn test_select_option_at_slot() {
        let mut s = active(1);
        assert!(s.select_option_at(3));
        assert_eq!(s.pending_selection(), Some("D"));
        assert!(!s.select_option_at(4));
        assert_eq!(s.pending_selection(), Some("D"));
    }

    #[test]
    fn test_confirm_next_without_selection_is_noop() {
        let mut s = active(2);
        let before = s.clone();

        assert_eq!(s.confirm_next(), Advance::Ignored);
        assert_eq!(s.current_index(), before.current_index());
        assert_eq!(s.seconds_remaining(), before.seconds_remaining());
        assert_eq!(s.answers(), before.answers());
        assert_eq!(s.timer_generation(), before.timer_generation());
    }

    #[test]
    fn test_confirm_next_moves_forward() {
        let mut s = active(3);
        s.tick();
        s.select_option("B");

        assert_eq!(s.confirm_next(), Advance::Moved);
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.seconds_remaining(), 60);
        assert_eq!(s.pending_selection(), None);
        assert_eq!(
            s.answers().get(&0),
            Some(&AnswerRecord {
                question_index: 0,
                chosen_option: "B".into()
            })
        );
    }

    #[test]
    fn test_confirm_next_disabled_at_zero_seconds() {
        let mut s = active(2);
        s.select_option("A");
        for _ in 0..60 {
            s.tick();
        }
        assert!(!s.can_confirm_next());
        assert_eq!(s.confirm_next(), Advance::Ignored);
        assert_eq!(s.current_index(), 0);
        assert!(s.answers().is_empty());
    }

    #[test]
    fn test_completion_happens_once() {
        let mut s = active(2);
        s.select_option("B");
        s.confirm_next();
        s.select_option("C");

        assert_matches!(s.confirm_next(), Advance::Completed);
        assert!(s.is_completed());
        let results = s.results().unwrap();
        assert_eq!(results.total(), 2);
        assert_eq!(results.score, 1);

        assert_eq!(s.confirm_next(), Advance::Ignored);
        assert!(!s.select_option("D"));
        assert_eq!(s.results().unwrap().entries[1].user_answer.as_deref(), Some("C"));
    }

    #[test]
    fn test_confirm_prev_at_first_question_is_noop() {
        let mut s = active(2);
        s.select_option("A");
        assert!(!s.confirm_prev());
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.pending_selection(), Some("A"));
    }

    #[test]
    fn test_next_then_prev_restores_answer() {
        let mut s = active(3);
        s.select_option("C");
        s.confirm_next();
        s.select_option("A");

        assert!(s.confirm_prev());
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.pending_selection(), Some("C"));
        assert_eq!(s.seconds_remaining(), 60);
    }

    #[test]
    fn test_prev_to_unanswered_question_clears_selection() {
        let mut s = active(3);
        s.select_option("A");
        s.confirm_next();
        s.select_option("B");
        s.confirm_next();
        // back on question 1, answered with B
        assert!(s.confirm_prev());
        assert_eq!(s.pending_selection(), Some("B"));

        let mut s = active(2);
        for _ in 0..60 {
            s.tick();
        }
        s.expire();
        assert_eq!(s.current_index(), 1);
        assert!(s.confirm_prev());
        assert_eq!(s.pending_selection(), None);
    }

    #[test]
    fn test_reanswer_replaces_record() {
        let mut s = active(2);
        s.select_option("A");
        s.confirm_next();
        s.confirm_prev();
        s.select_option("B");
        s.confirm_next();

        assert_eq!(s.answers().len(), 1);
        assert_eq!(s.answers()[&0].chosen_option, "B");
    }

    #[test]
    fn test_countdown_generation_changes_on_every_move() {
        let mut s = active(3);
        let g0 = s.timer_generation();
        s.select_option("A");
        s.confirm_next();
        let g1 = s.timer_generation();
        assert!(g1 > g0);
        s.confirm_prev();
        assert!(s.timer_generation() > g1);
    }

    #[test]
    fn test_expire_requires_zero_seconds() {
        let mut s = active(2);
        assert_eq!(s.expire(), Advance::Ignored);
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn test_expire_keeps_pending_selection() {
        let mut s = active(2);
        s.select_option("B");
        for _ in 0..60 {
            s.tick();
        }
        assert_eq!(s.expire(), Advance::Moved);
        assert_eq!(s.answers()[&0].chosen_option, "B");
        assert_eq!(s.seconds_remaining(), 60);
    }

    #[test]
    fn test_expire_on_last_question_completes() {
        let mut s = active(1);
        for _ in 0..60 {
            s.tick();
        }
        assert_eq!(s.expire(), Advance::Completed);
        let results = s.results().unwrap();
        assert_eq!(results.entries[0].user_answer, None);
        assert_eq!(results.score, 0);
    }

    #[test]
    fn test_prev_after_completion_moves_review_pointer() {
        let mut s = active(2);
        s.select_option("B");
        s.confirm_next();
        s.select_option("B");
        s.confirm_next();
        assert!(s.is_completed());

        assert!(s.confirm_prev());
        assert_eq!(s.current_index(), 0);
        assert!(s.is_completed());
        assert!(!s.wants_countdown());
        assert_eq!(s.results().unwrap().score, 2);
    }

    #[test]
    fn test_two_question_scenario() {
        let mut s = QuizSession::new("set", 60);
        s.finish_load(Ok(vec![
            Question::new("q1", ["A", "B", "C", "D"], "B"),
            Question::new("q2", ["A", "B", "C", "D"], "D"),
        ]));

        s.select_option("B");
        assert_eq!(s.confirm_next(), Advance::Moved);
        assert!(s.is_last_question());
        s.select_option("C");
        assert_eq!(s.confirm_next(), Advance::Completed);

        let results = s.results().unwrap();
        assert_eq!(results.score, 1);
        assert!(results.entries[0].is_correct());
        assert!(!results.entries[1].is_correct());
    }
}
