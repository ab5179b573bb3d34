use crate::app::Page;
use crate::auth;
use crate::console::Console;
use crate::error::ClientError;
use crate::form::{FormTarget, RowId, TestForm};
use crate::models::{ResultRow, Role, SessionUser, Statistics, TeacherTest, TeacherTestSummary, TestPayload};
use crate::render;
use crate::state::AppState;
use crate::student::{alert, read_id};
use std::path::Path;
use tracing::{error, info};

pub const LOAD_TESTS_FAILED: &str = "Ошибка загрузки тестов";
pub const LOAD_TEST_FAILED: &str = "Ошибка загрузки теста";
pub const DELETE_CONFIRMATION: &str = "Вы уверены, что хотите удалить этот тест?";
pub const DELETE_FAILED: &str = "Ошибка удаления теста";
pub const DELETED: &str = "Тест успешно удален!";
pub const LOAD_STATISTICS_FAILED: &str = "Ошибка загрузки статистики";
pub const LOAD_RESULTS_FAILED: &str = "Ошибка загрузки результатов";

const EDITOR_HELP: &str = "Команды редактора:
  title <текст>      название теста
  desc <текст>       описание
  q+                 добавить вопрос
  q- <q>             удалить вопрос
  q <q> <текст>      текст вопроса
  o+ <q>             добавить вариант
  o- <o>             удалить вариант
  o <o> <текст>      текст варианта
  c <o>              отметить / снять «правильный»
  show               показать форму
  help               эта справка
  save               сохранить
  cancel             закрыть без сохранения";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsFilter {
    All,
    Test(i64),
    Student(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    Title(String),
    Description(String),
    AddQuestion,
    RemoveQuestion(RowId),
    QuestionText(RowId, String),
    AddOption(RowId),
    RemoveOption(RowId),
    OptionText(RowId, String),
    ToggleCorrect(RowId),
    Show,
    Help,
    Save,
    Cancel,
}

fn parse_row_id(raw: Option<&str>, prefix: char) -> Result<RowId, String> {
    let raw = raw.ok_or_else(|| "не указан номер строки".to_string())?;
    raw.strip_prefix(prefix)
        .unwrap_or(raw)
        .parse()
        .map_err(|_| format!("неверный номер строки: {raw}"))
}

impl EditorCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let (arg, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let arg = Some(arg).filter(|a| !a.is_empty());
        let text = text.trim().to_string();

        match word {
            "title" => Ok(Self::Title(rest.to_string())),
            "desc" => Ok(Self::Description(rest.to_string())),
            "q+" => Ok(Self::AddQuestion),
            "q-" => parse_row_id(arg, 'q').map(Self::RemoveQuestion),
            "q" => parse_row_id(arg, 'q').map(|id| Self::QuestionText(id, text)),
            "o+" => parse_row_id(arg, 'q').map(Self::AddOption),
            "o-" => parse_row_id(arg, 'o').map(Self::RemoveOption),
            "o" => parse_row_id(arg, 'o').map(|id| Self::OptionText(id, text)),
            "c" => parse_row_id(arg, 'o').map(Self::ToggleCorrect),
            "show" | "" => Ok(Self::Show),
            "help" => Ok(Self::Help),
            "save" => Ok(Self::Save),
            "cancel" => Ok(Self::Cancel),
            other => Err(format!("неизвестная команда: {other} (help: справка)")),
        }
    }

    /// Applies an editing command and returns a short confirmation. Commands
    /// that do not edit the form are rejected.
    pub fn apply(self, form: &mut TestForm) -> Result<String, String> {
        let missing_question = |id: RowId| format!("нет вопроса q{id}");
        let missing_option = |id: RowId| format!("нет варианта o{id}");
        match self {
            Self::Title(text) => {
                form.title = text;
                Ok("название обновлено".into())
            }
            Self::Description(text) => {
                form.description = text;
                Ok("описание обновлено".into())
            }
            Self::AddQuestion => {
                let id = form.add_question();
                let options: Vec<String> = form
                    .questions()
                    .iter()
                    .find(|q| q.id == id)
                    .map(|q| q.options.iter().map(|o| format!("o{}", o.id)).collect())
                    .unwrap_or_default();
                Ok(format!("добавлен вопрос q{id} (варианты {})", options.join(", ")))
            }
            Self::RemoveQuestion(id) => form
                .remove_question(id)
                .then(|| format!("вопрос q{id} удалён"))
                .ok_or_else(|| missing_question(id)),
            Self::QuestionText(id, text) => form
                .set_question_text(id, &text)
                .then(|| format!("вопрос q{id} обновлён"))
                .ok_or_else(|| missing_question(id)),
            Self::AddOption(question) => form
                .add_option(question)
                .map(|id| format!("добавлен вариант o{id}"))
                .ok_or_else(|| missing_question(question)),
            Self::RemoveOption(id) => form
                .remove_option(id)
                .then(|| format!("вариант o{id} удалён"))
                .ok_or_else(|| missing_option(id)),
            Self::OptionText(id, text) => form
                .set_option_text(id, &text)
                .then(|| format!("вариант o{id} обновлён"))
                .ok_or_else(|| missing_option(id)),
            Self::ToggleCorrect(id) => form
                .toggle_correct(id)
                .map(|on| {
                    if on {
                        format!("вариант o{id} отмечен как правильный")
                    } else {
                        format!("вариант o{id} больше не правильный")
                    }
                })
                .ok_or_else(|| missing_option(id)),
            Self::Show | Self::Help | Self::Save | Self::Cancel => Err("команда не изменяет форму".into()),
        }
    }
}

/// Reads a test definition in the request-body shape from a JSON file.
pub fn load_payload(path: &Path) -> Result<TestPayload, ClientError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub struct TeacherPage<'a> {
    state: &'a AppState,
    user: SessionUser,
}

impl<'a> TeacherPage<'a> {
    /// `None` when there is no teacher session; nothing is requested then.
    pub fn open(state: &'a AppState) -> Option<Self> {
        let user = state.sessions.require_role(Role::Teacher)?;
        Some(Self { state, user })
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    pub async fn load_tests(&self) -> Result<Vec<TeacherTestSummary>, ClientError> {
        self.state.api.teacher_tests().await
    }

    pub fn create_form(&self) -> TestForm {
        TestForm::create()
    }

    pub async fn edit_form(&self, test_id: i64) -> Result<TestForm, ClientError> {
        let test = self.state.api.teacher_test(test_id).await?;
        Ok(TestForm::edit(&test))
    }

    /// Validates the form and sends it to the endpoint its target names.
    pub async fn save_form(&self, form: &TestForm) -> Result<TeacherTest, ClientError> {
        let api = &self.state.api;
        let teacher_id = self.user.id;
        let saved = form
            .submit(|target, payload| async move {
                match target {
                    FormTarget::Create => api.create_test(teacher_id, &payload).await,
                    FormTarget::Update(test_id) => api.update_test(test_id, teacher_id, &payload).await,
                }
            })
            .await?;
        info!(test_id = saved.id, target = ?form.target(), "test saved");
        Ok(saved)
    }

    /// Asks for confirmation, then deletes. `Ok(false)` when declined.
    pub async fn delete_test<C: Console>(&self, console: &mut C, test_id: i64) -> Result<bool, ClientError> {
        if !console.confirm(DELETE_CONFIRMATION)? {
            return Ok(false);
        }
        self.state.api.delete_test(test_id, self.user.id).await?;
        info!(test_id, "test deleted");
        Ok(true)
    }

    pub async fn statistics(&self) -> Result<Statistics, ClientError> {
        self.state.api.statistics(self.user.id).await
    }

    pub async fn results(&self, filter: ResultsFilter) -> Result<Vec<ResultRow>, ClientError> {
        let api = &self.state.api;
        match filter {
            ResultsFilter::All => api.teacher_results(self.user.id).await,
            ResultsFilter::Test(test_id) => api.teacher_results_by_test(test_id, self.user.id).await,
            ResultsFilter::Student(student_id) => api.teacher_results_by_student(student_id, self.user.id).await,
        }
    }

    pub async fn run<C: Console>(&mut self, console: &mut C) -> Result<Page, ClientError> {
        self.tests_view(console).await?;
        loop {
            console.show(&format!(
                "\n== Преподаватель: {} ==\n1. Мои тесты\n2. Создать тест\n3. Редактировать тест\n4. Удалить тест\n5. Статистика\n6. Все результаты\n7. Результаты по тесту\n8. Результаты студента\n9. Выйти из аккаунта\n0. Выход",
                self.user.username
            ))?;
            let Some(choice) = console.read_line("> ")? else {
                return Ok(Page::Exit);
            };
            match choice.trim() {
                "1" => self.tests_view(console).await?,
                "2" => {
                    let mut form = self.create_form();
                    self.author(console, &mut form).await?;
                }
                "3" => {
                    if let Some(id) = read_id(console, "Номер теста: ")? {
                        match self.edit_form(id).await {
                            Ok(mut form) => {
                                self.author(console, &mut form).await?;
                            }
                            Err(err) => alert(console, &err, LOAD_TEST_FAILED)?,
                        }
                    }
                }
                "4" => {
                    if let Some(id) = read_id(console, "Номер теста: ")? {
                        self.delete_view(console, id).await?;
                    }
                }
                "5" => self.statistics_view(console).await?,
                "6" => self.results_view(console, ResultsFilter::All).await?,
                "7" => {
                    if let Some(id) = read_id(console, "Номер теста: ")? {
                        self.results_view(console, ResultsFilter::Test(id)).await?;
                    }
                }
                "8" => {
                    if let Some(id) = read_id(console, "Номер студента: ")? {
                        self.results_view(console, ResultsFilter::Student(id)).await?;
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

    pub async fn tests_view<C: Console>(&self, console: &mut C) -> Result<(), ClientError> {
        match self.load_tests().await {
            Ok(tests) => console.show(&render::teacher_test_cards(&tests))?,
            Err(err) => alert(console, &err, LOAD_TESTS_FAILED)?,
        }
        Ok(())
    }

    /// Runs the editor; on a successful save closes it, reloads the list and
    /// confirms. Returns the saved test.
    pub async fn author<C: Console>(&self, console: &mut C, form: &mut TestForm) -> Result<Option<TeacherTest>, ClientError> {
        let Some(saved) = self.edit_loop(console, form).await? else {
            return Ok(None);
        };
        self.tests_view(console).await?;
        console.alert(form.target().success_message())?;
        Ok(Some(saved))
    }

    /// Saves a form without the interactive editor, e.g. one loaded from a file.
    pub async fn save_with_feedback<C: Console>(&self, console: &mut C, form: &TestForm) -> Result<Option<TeacherTest>, ClientError> {
        match self.save_form(form).await {
            Ok(saved) => {
                self.tests_view(console).await?;
                console.alert(form.target().success_message())?;
                Ok(Some(saved))
            }
            Err(err @ ClientError::Io(_)) => Err(err),
            Err(err) => {
                self.report_save_error(console, form, &err)?;
                Ok(None)
            }
        }
    }

    fn report_save_error<C: Console>(&self, console: &mut C, form: &TestForm, err: &ClientError) -> Result<(), ClientError> {
        if !err.is_validation() {
            error!("saving test failed: {}", err);
        }
        console.show(&format!("Ошибка: {}", err.user_message(form.target().failure_fallback())))?;
        Ok(())
    }

    async fn edit_loop<C: Console>(&self, console: &mut C, form: &mut TestForm) -> Result<Option<TeacherTest>, ClientError> {
        console.show(&render::form(form))?;
        console.show(EDITOR_HELP)?;
        loop {
            let Some(line) = console.read_line("редактор> ")? else {
                return Ok(None);
            };
            let command = match EditorCommand::parse(&line) {
                Ok(command) => command,
                Err(msg) => {
                    console.show(&msg)?;
                    continue;
                }
            };
            match command {
                EditorCommand::Save => match self.save_form(form).await {
                    Ok(saved) => return Ok(Some(saved)),
                    Err(err @ ClientError::Io(_)) => return Err(err),
                    Err(err) => self.report_save_error(console, form, &err)?,
                },
                EditorCommand::Cancel => return Ok(None),
                EditorCommand::Show => console.show(&render::form(form))?,
                EditorCommand::Help => console.show(EDITOR_HELP)?,
                edit => match edit.apply(form) {
                    Ok(msg) | Err(msg) => console.show(&msg)?,
                },
            }
        }
    }

    /// Delete with confirmation; reloads the list on success, alerts on failure.
    pub async fn delete_view<C: Console>(&self, console: &mut C, test_id: i64) -> Result<(), ClientError> {
        match self.delete_test(console, test_id).await {
            Ok(true) => {
                self.tests_view(console).await?;
                console.alert(DELETED)?;
            }
            Ok(false) => {}
            Err(err @ ClientError::Io(_)) => return Err(err),
            Err(err) => {
                error!("deleting test {} failed: {}", test_id, err);
                console.alert(&err.user_message(DELETE_FAILED))?;
            }
        }
        Ok(())
    }

    pub async fn statistics_view<C: Console>(&self, console: &mut C) -> Result<(), ClientError> {
        match self.statistics().await {
            Ok(stats) => console.show(&render::statistics(&stats))?,
            Err(err) => alert(console, &err, LOAD_STATISTICS_FAILED)?,
        }
        Ok(())
    }

    pub async fn results_view<C: Console>(&self, console: &mut C, filter: ResultsFilter) -> Result<(), ClientError> {
        match self.results(filter).await {
            Ok(results) => console.show(&render::all_results_table(&results))?,
            Err(err) => alert(console, &err, LOAD_RESULTS_FAILED)?,
        }
        Ok(())
    }
}
