//! Test authoring form shared by "create" and "edit".
//!
//! Questions and options are ordered row view-models. Each row carries a
//! synthetic id taken from a per-form counter that only grows, so an id is
//! never handed out twice within one form.

use crate::error::{ClientError, ValidationError};
use crate::models::{OptionPayload, QuestionPayload, TeacherTest, TestPayload};
use std::future::Future;

pub type RowId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRow {
    pub id: RowId,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRow {
    pub id: RowId,
    pub text: String,
    pub options: Vec<OptionRow>,
}

/// Where a valid form is sent on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    Create,
    Update(i64),
}

impl FormTarget {
    pub fn heading(self) -> &'static str {
        match self {
            FormTarget::Create => "Создание теста",
            FormTarget::Update(_) => "Редактирование теста",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            FormTarget::Create => "Тест успешно создан!",
            FormTarget::Update(_) => "Тест успешно обновлен!",
        }
    }

    pub fn failure_fallback(self) -> &'static str {
        match self {
            FormTarget::Create => "Ошибка создания теста",
            FormTarget::Update(_) => "Ошибка обновления теста",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestForm {
    target: FormTarget,
    pub title: String,
    pub description: String,
    questions: Vec<QuestionRow>,
    question_counter: RowId,
    option_counter: RowId,
}

impl TestForm {
    fn empty(target: FormTarget) -> Self {
        Self {
            target,
            title: String::new(),
            description: String::new(),
            questions: Vec::new(),
            question_counter: 0,
            option_counter: 0,
        }
    }

    /// A blank form with one question holding two blank options.
    pub fn create() -> Self {
        let mut form = Self::empty(FormTarget::Create);
        form.add_question();
        form
    }

    /// A form pre-filled from an existing test, saving back to it.
    pub fn edit(test: &TeacherTest) -> Self {
        let mut form = Self::empty(FormTarget::Update(test.id));
        form.title = test.title.clone();
        form.description = test.description.clone().unwrap_or_default();
        for question in &test.questions {
            let qid = form.push_question(question.question_text.clone());
            for option in &question.options {
                form.push_option(qid, option.option_text.clone(), option.is_correct);
            }
        }
        form
    }

    /// A form filled from a payload, e.g. one read from a file.
    pub fn from_payload(target: FormTarget, payload: &TestPayload) -> Self {
        let mut form = Self::empty(target);
        form.title = payload.title.clone();
        form.description = payload.description.clone();
        for question in &payload.questions {
            let qid = form.push_question(question.question_text.clone());
            for option in &question.options {
                form.push_option(qid, option.option_text.clone(), option.is_correct);
            }
        }
        form
    }

    pub fn target(&self) -> FormTarget {
        self.target
    }

    pub fn questions(&self) -> &[QuestionRow] {
        &self.questions
    }

    fn next_question_id(&mut self) -> RowId {
        self.question_counter += 1;
        self.question_counter
    }

    fn next_option_id(&mut self) -> RowId {
        self.option_counter += 1;
        self.option_counter
    }

    fn push_question(&mut self, text: String) -> RowId {
        let id = self.next_question_id();
        self.questions.push(QuestionRow {
            id,
            text,
            options: Vec::new(),
        });
        id
    }

    fn push_option(&mut self, question: RowId, text: String, is_correct: bool) -> Option<RowId> {
        let index = self.questions.iter().position(|q| q.id == question)?;
        let id = self.next_option_id();
        self.questions[index].options.push(OptionRow { id, text, is_correct });
        Some(id)
    }

    /// Appends a question with two blank options.
    pub fn add_question(&mut self) -> RowId {
        let id = self.push_question(String::new());
        self.add_option(id);
        self.add_option(id);
        id
    }

    pub fn remove_question(&mut self, id: RowId) -> bool {
        let before = self.questions.len();
        self.questions.retain(|q| q.id != id);
        self.questions.len() != before
    }

    pub fn add_option(&mut self, question: RowId) -> Option<RowId> {
        self.push_option(question, String::new(), false)
    }

    pub fn remove_option(&mut self, id: RowId) -> bool {
        for question in &mut self.questions {
            if let Some(index) = question.options.iter().position(|o| o.id == id) {
                question.options.remove(index);
                return true;
            }
        }
        false
    }

    pub fn question_mut(&mut self, id: RowId) -> Option<&mut QuestionRow> {
        self.questions.iter_mut().find(|q| q.id == id)
    }

    pub fn option_mut(&mut self, id: RowId) -> Option<&mut OptionRow> {
        self.questions
            .iter_mut()
            .flat_map(|q| q.options.iter_mut())
            .find(|o| o.id == id)
    }

    pub fn set_question_text(&mut self, id: RowId, text: &str) -> bool {
        self.question_mut(id).map(|q| q.text = text.to_string()).is_some()
    }

    pub fn set_option_text(&mut self, id: RowId, text: &str) -> bool {
        self.option_mut(id).map(|o| o.text = text.to_string()).is_some()
    }

    pub fn set_correct(&mut self, id: RowId, is_correct: bool) -> bool {
        self.option_mut(id).map(|o| o.is_correct = is_correct).is_some()
    }

    /// Flips the "correct" mark and returns the new value.
    pub fn toggle_correct(&mut self, id: RowId) -> Option<bool> {
        self.option_mut(id).map(|o| {
            o.is_correct = !o.is_correct;
            o.is_correct
        })
    }

    /// Builds the request body, stopping at the first violation. Checks run
    /// in a fixed order so the reported message is deterministic.
    pub fn validate(&self) -> Result<TestPayload, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let mut questions = Vec::with_capacity(self.questions.len());
        for row in &self.questions {
            let question_text = row.text.trim();
            if question_text.is_empty() {
                return Err(ValidationError::EmptyQuestionText);
            }
            if row.options.len() < 2 {
                return Err(ValidationError::TooFewOptions);
            }

            let mut has_correct = false;
            let mut options = Vec::with_capacity(row.options.len());
            for option in &row.options {
                let option_text = option.text.trim();
                if option_text.is_empty() {
                    return Err(ValidationError::EmptyOptionText);
                }
                has_correct |= option.is_correct;
                options.push(OptionPayload {
                    option_text: option_text.to_string(),
                    is_correct: option.is_correct,
                });
            }
            if !has_correct {
                return Err(ValidationError::NoCorrectOption);
            }

            questions.push(QuestionPayload {
                question_text: question_text.to_string(),
                options,
            });
        }

        if questions.is_empty() {
            return Err(ValidationError::NoQuestions);
        }

        Ok(TestPayload {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            questions,
        })
    }

    /// Validates and hands the payload to `save`. Nothing is sent when
    /// validation fails.
    pub async fn submit<F, Fut, T>(&self, save: F) -> Result<T, ClientError>
    where
        F: FnOnce(FormTarget, TestPayload) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let payload = self.validate()?;
        save(self.target, payload).await
    }
}
