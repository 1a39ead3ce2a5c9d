use serde::{Deserialize, Serialize};

/// Number of answer options every question carries
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A single multiple-choice question as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub options: [String; OPTIONS_PER_QUESTION],
    pub correct_option: String,
}

impl Question {
    pub fn new(
        text: impl Into<String>,
        options: [&str; OPTIONS_PER_QUESTION],
        correct_option: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            options: options.map(String::from),
            correct_option: correct_option.into(),
        }
    }

    pub fn option(&self, slot: usize) -> Option<&str> {
        self.options.get(slot).map(String::as_str)
    }
}

/// Wire shape of one element of the quiz service response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub answer_1: String,
    pub answer_2: String,
    pub answer_3: String,
    pub answer_4: String,
    pub correct_answer: String,
}

impl From<QuestionRecord> for Question {
    fn from(r: QuestionRecord) -> Self {
        Self {
            text: r.question,
            options: [r.answer_1, r.answer_2, r.answer_3, r.answer_4],
            correct_option: r.correct_answer,
        }
    }
}
