use std::collections::BTreeMap;

use crate::question::Question;
use crate::session::AnswerRecord;

/// One question paired with what the user answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub question: Question,
    pub user_answer: Option<String>,
    pub correct_answer: String,
}

impl ResultEntry {
    pub fn is_correct(&self) -> bool {
        self.user_answer.as_deref() == Some(self.correct_answer.as_str())
    }
}

/// Scored outcome of a completed session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuizResults {
    pub entries: Vec<ResultEntry>,
    pub score: usize,
}

impl QuizResults {
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn summary(&self) -> String {
        format!("You got {} out of {} correct.", self.score, self.total())
    }
}

/// Pair every question, in order, with its confirmed answer and score the lot.
pub fn project(questions: &[Question], answers: &BTreeMap<usize, AnswerRecord>) -> QuizResults {
    let entries: Vec<ResultEntry> = questions
        .iter()
        .enumerate()
        .map(|(idx, question)| ResultEntry {
            question: question.clone(),
            user_answer: answers.get(&idx).map(|a| a.chosen_option.clone()),
            correct_answer: question.correct_option.clone(),
        })
        .collect();

    let score = entries.iter().filter(|e| e.is_correct()).count();

    QuizResults { entries, score }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(idx: usize, option: &str) -> (usize, AnswerRecord) {
        (
            idx,
            AnswerRecord {
                question_index: idx,
                chosen_option: option.to_string(),
            },
        )
    }

    #[test]
    fn test_project_scores_exact_matches() {
        let questions = vec![
            Question::new("q1", ["A", "B", "C", "D"], "B"),
            Question::new("q2", ["A", "B", "C", "D"], "D"),
        ];
        let answers = BTreeMap::from([answer(0, "B"), answer(1, "C")]);

        let results = project(&questions, &answers);

        assert_eq!(results.score, 1);
        assert_eq!(results.total(), 2);
        assert_eq!(results.entries[0].user_answer.as_deref(), Some("B"));
        assert!(results.entries[0].is_correct());
        assert_eq!(results.entries[1].user_answer.as_deref(), Some("C"));
        assert!(!results.entries[1].is_correct());
        assert_eq!(results.summary(), "You got 1 out of 2 correct.");
    }

    #[test]
    fn test_project_preserves_order_and_marks_unanswered() {
        let questions = vec![
            Question::new("first", ["a", "b", "c", "d"], "a"),
            Question::new("second", ["a", "b", "c", "d"], "b"),
            Question::new("third", ["a", "b", "c", "d"], "c"),
        ];
        let answers = BTreeMap::from([answer(2, "c")]);

        let results = project(&questions, &answers);

        let texts: Vec<&str> = results
            .entries
            .iter()
            .map(|e| e.question.text.as_str())
            .collect();
        assert_eq!(texts, ["first", "second", "third"]);
        assert_eq!(results.entries[0].user_answer, None);
        assert!(!results.entries[0].is_correct());
        assert_eq!(results.score, 1);
    }

    #[test]
    fn test_project_comparison_is_case_sensitive() {
        let questions = vec![Question::new("q", ["yes", "Yes", "no", "No"], "Yes")];
        let answers = BTreeMap::from([answer(0, "yes")]);

        assert_eq!(project(&questions, &answers).score, 0);
    }

    #[test]
    fn test_project_empty() {
        let results = project(&[], &BTreeMap::new());
        assert_eq!(results, QuizResults::default());
        assert_eq!(results.summary(), "You got 0 out of 0 correct.");
    }
}
