use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use talentbase_core::{CompanyId, DomainError, QuestionBankId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Text,
    MultipleChoice,
    Video,
}

/// One screening question, as stored in a bank and as snapshotted onto a
/// posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningQuestion {
    pub prompt: String,
    pub kind: QuestionKind,
    /// Choices for `MultipleChoice`; empty otherwise.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

impl ScreeningQuestion {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.prompt.trim().is_empty() {
            return Err(DomainError::validation("question prompt must not be empty"));
        }
        if self.kind == QuestionKind::MultipleChoice && self.options.len() < 2 {
            return Err(DomainError::validation(
                "multiple-choice questions need at least two options",
            ));
        }
        Ok(())
    }
}

/// A company's question bank: a mutable list of question definitions.
///
/// Its content is copied by value into a job posting at creation; posting and
/// bank are fully decoupled after that point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    pub id: QuestionBankId,
    pub company_id: CompanyId,
    pub name: String,
    pub questions: Vec<ScreeningQuestion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuestionBank {
    /// Deep copy of the current question list, for snapshot-on-create.
    pub fn snapshot(&self) -> Vec<ScreeningQuestion> {
        self.questions.clone()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("question bank name must not be empty"));
        }
        for q in &self.questions {
            q.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_question(prompt: &str) -> ScreeningQuestion {
        ScreeningQuestion {
            prompt: prompt.to_string(),
            kind: QuestionKind::Text,
            options: Vec::new(),
            required: true,
        }
    }

    fn bank(questions: Vec<ScreeningQuestion>) -> QuestionBank {
        let now = Utc::now();
        QuestionBank {
            id: QuestionBankId::new(),
            company_id: CompanyId::new(),
            name: "Engineering screen".to_string(),
            questions,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn snapshot_is_decoupled_from_later_edits() {
        let mut bank = bank(vec![text_question("Why Rust?")]);
        let snapshot = bank.snapshot();

        bank.questions.push(text_question("Why not Rust?"));
        bank.questions[0].prompt = "edited".to_string();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].prompt, "Why Rust?");
    }

    #[test]
    fn multiple_choice_needs_options() {
        let q = ScreeningQuestion {
            prompt: "Pick one".to_string(),
            kind: QuestionKind::MultipleChoice,
            options: vec!["only".to_string()],
            required: false,
        };
        assert!(matches!(q.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn blank_prompt_is_rejected() {
        let q = text_question("   ");
        assert!(matches!(q.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn bank_validation_covers_questions() {
        let bank = bank(vec![text_question("ok"), text_question("")]);
        assert!(bank.validate().is_err());
    }
}
