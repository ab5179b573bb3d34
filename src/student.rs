use crate::app::Page;
use crate::auth;
use crate::console::Console;
use crate::error::ClientError;
use crate::models::{Answer, GradedResult, ResultRow, Role, SessionUser, StudentQuestion, StudentTest, Submission};
use crate::render;
use crate::state::AppState;
use std::collections::{HashMap, HashSet};
use tracing::{error, info};

pub const LOAD_TESTS_FAILED: &str = "Ошибка загрузки тестов";
pub const LOAD_TEST_FAILED: &str = "Ошибка загрузки теста";
pub const SUBMIT_FAILED: &str = "Ошибка отправки теста";
pub const LOAD_RESULT_FAILED: &str = "Ошибка загрузки результата";
pub const LOAD_RESULTS_FAILED: &str = "Ошибка загрузки результатов";
pub const SUBMIT_CONFIRMATION: &str = "Вы уверены, что хотите отправить ответы?";

/// Picked option ids per question id.
pub type Selections = HashMap<i64, HashSet<i64>>;

/// One answer per question, in question order. Picked options keep the order
/// they have in the test; a question with nothing picked gets an empty list.
pub fn build_answers(test: &StudentTest, selections: &Selections) -> Vec<Answer> {
    test.questions
        .iter()
        .map(|question| {
            let picked = selections.get(&question.id);
            Answer {
                question_id: question.id,
                selected_option_ids: question
                    .options
                    .iter()
                    .filter(|o| picked.is_some_and(|p| p.contains(&o.id)))
                    .map(|o| o.id)
                    .collect(),
            }
        })
        .collect()
}

/// Parses "1, 3" or "1 3" into option ids of `question` (options are numbered
/// from 1). Empty input picks nothing.
pub fn parse_choice(input: &str, question: &StudentQuestion) -> Result<HashSet<i64>, String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let n: usize = part.parse().map_err(|_| format!("не номер варианта: {part}"))?;
            n.checked_sub(1)
                .and_then(|i| question.options.get(i))
                .map(|o| o.id)
                .ok_or_else(|| format!("нет варианта с номером {n}"))
        })
        .collect()
}

pub struct StudentPage<'a> {
    state: &'a AppState,
    user: SessionUser,
    current_test: Option<StudentTest>,
}

impl<'a> StudentPage<'a> {
    /// `None` when there is no student session; nothing is requested then.
    pub fn open(state: &'a AppState) -> Option<Self> {
        let user = state.sessions.require_role(Role::Student)?;
        Some(Self {
            state,
            user,
            current_test: None,
        })
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    pub fn current_test(&self) -> Option<&StudentTest> {
        self.current_test.as_ref()
    }

    pub async fn load_tests(&self) -> Result<Vec<StudentTest>, ClientError> {
        self.state.api.student_tests().await
    }

    pub async fn start_test(&mut self, test_id: i64) -> Result<&StudentTest, ClientError> {
        let test = self.state.api.student_test(test_id).await?;
        Ok(&*self.current_test.insert(test))
    }

    /// Asks for confirmation and submits the current test. Returns the id of
    /// the stored result; the graded view is loaded separately. `Ok(None)`
    /// when the user declines or no test is open.
    pub async fn submit_test<C: Console>(&mut self, console: &mut C, selections: &Selections) -> Result<Option<i64>, ClientError> {
        let Some(test) = self.current_test.as_ref() else {
            return Ok(None);
        };
        if !console.confirm(SUBMIT_CONFIRMATION)? {
            return Ok(None);
        }
        let submission = Submission {
            test_id: test.id,
            answers: build_answers(test, selections),
        };
        let receipt = self.state.api.submit(self.user.id, &submission).await?;
        info!(test_id = submission.test_id, result_id = receipt.result_id, "test submitted");
        self.current_test = None;
        Ok(Some(receipt.result_id))
    }

    pub async fn show_result(&self, result_id: i64) -> Result<GradedResult, ClientError> {
        self.state.api.student_result(result_id, self.user.id).await
    }

    pub async fn my_results(&self) -> Result<Vec<ResultRow>, ClientError> {
        self.state.api.student_results(self.user.id).await
    }

    pub async fn run<C: Console>(&mut self, console: &mut C) -> Result<Page, ClientError> {
        self.tests_view(console).await?;
        loop {
            console.show(&format!(
                "\n== Студент: {} ==\n1. Доступные тесты\n2. Пройти тест\n3. Мои результаты\n4. Подробности результата\n9. Выйти из аккаунта\n0. Выход",
                self.user.username
            ))?;
            let Some(choice) = console.read_line("> ")? else {
                return Ok(Page::Exit);
            };
            match choice.trim() {
                "1" => self.tests_view(console).await?,
                "2" => {
                    if let Some(id) = read_id(console, "Номер теста: ")? {
                        self.take_test(console, id).await?;
                    }
                }
                "3" => self.results_view(console).await?,
                "4" => {
                    if let Some(id) = read_id(console, "Номер результата: ")? {
                        self.result_view(console, id).await?;
                    }
                }
                "9" => match auth::logout(self.state) {
                    Ok(()) => return Ok(Page::Entry),
                    Err(err) => alert(console, &err, auth::LOGOUT_FAILED)?,
                },
                "0" => return Ok(Page::Exit),
                _ => {}
            }
        }
    }

    async fn tests_view<C: Console>(&self, console: &mut C) -> Result<(), ClientError> {
        match self.load_tests().await {
            Ok(tests) => console.show(&render::student_test_cards(&tests))?,
            Err(err) => alert(console, &err, LOAD_TESTS_FAILED)?,
        }
        Ok(())
    }

    async fn take_test<C: Console>(&mut self, console: &mut C, test_id: i64) -> Result<(), ClientError> {
        let test = match self.start_test(test_id).await {
            Ok(test) => test.clone(),
            Err(err) => return alert(console, &err, LOAD_TEST_FAILED),
        };
        console.show(&render::test_sheet(&test))?;

        loop {
            let mut selections = Selections::new();
            for (index, question) in test.questions.iter().enumerate() {
                let picked = loop {
                    let prompt = format!("Вопрос {}: номера вариантов через запятую (пусто: без ответа): ", index + 1);
                    let input = console.read_line(&prompt)?.unwrap_or_default();
                    match parse_choice(&input, question) {
                        Ok(picked) => break picked,
                        Err(msg) => console.show(&msg)?,
                    }
                };
                selections.insert(question.id, picked);
            }

            match self.submit_test(console, &selections).await {
                Ok(Some(result_id)) => return self.result_view(console, result_id).await,
                Ok(None) => {
                    console.show("1. Изменить ответы\n0. Вернуться к тестам")?;
                    let again = console.read_line("> ")?.unwrap_or_default();
                    if again.trim() != "1" {
                        self.current_test = None;
                        return Ok(());
                    }
                }
                Err(err @ ClientError::Io(_)) => return Err(err),
                Err(err) => {
                    alert(console, &err, SUBMIT_FAILED)?;
                    return Ok(());
                }
            }
        }
    }

    async fn results_view<C: Console>(&mut self, console: &mut C) -> Result<(), ClientError> {
        let results = match self.my_results().await {
            Ok(results) => results,
            Err(err) => return alert(console, &err, LOAD_RESULTS_FAILED),
        };
        console.show(&render::my_results_table(&results))?;
        if results.is_empty() {
            return Ok(());
        }
        if let Some(id) = read_id(console, "Подробнее о результате № (пусто: назад): ")? {
            self.result_view(console, id).await?;
        }
        Ok(())
    }

    async fn result_view<C: Console>(&mut self, console: &mut C, result_id: i64) -> Result<(), ClientError> {
        match self.show_result(result_id).await {
            Ok(result) => console.show(&render::graded_result(&result))?,
            Err(err) => alert(console, &err, LOAD_RESULT_FAILED)?,
        }
        Ok(())
    }
}

/// Logs the failure and shows a blocking alert with a fixed message.
pub(crate) fn alert<C: Console>(console: &mut C, err: &ClientError, message: &str) -> Result<(), ClientError> {
    error!("{}: {}", message, err);
    console.alert(message)?;
    Ok(())
}

/// Reads a numeric id; blank or non-numeric input yields `None`.
pub(crate) fn read_id<C: Console>(console: &mut C, prompt: &str) -> Result<Option<i64>, ClientError> {
    let raw = console.read_line(prompt)?.unwrap_or_default();
    Ok(raw.trim().trim_start_matches('#').parse().ok())
}
