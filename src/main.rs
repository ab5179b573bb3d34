use anyhow::{bail, Context};
use quiz_client::app::{self, Page};
use quiz_client::auth;
use quiz_client::build_state;
use quiz_client::config::{Config, LogFormat};
use quiz_client::console::{Console, TerminalConsole};
use quiz_client::form::{FormTarget, TestForm};
use quiz_client::models::Role;
use quiz_client::render;
use quiz_client::state::AppState;
use quiz_client::student::{self, StudentPage};
use quiz_client::teacher::{self, ResultsFilter, TeacherPage};
use std::io;
use std::path::PathBuf;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

const LOGIN_REQUIRED: &str = "Требуется вход: выполните `quiz-client login`";

#[derive(StructOpt)]
enum StudentCommand {
    /// List available tests
    Tests,
    /// Take a test
    Take { test_id: i64 },
    /// Show a graded result
    #[structopt(name = "result")]
    Show { result_id: i64 },
    /// List own results
    Results,
}

#[derive(StructOpt)]
enum TeacherCommand {
    /// List own tests
    Tests,
    /// Create a test interactively or from a JSON file
    Create {
        #[structopt(long, parse(from_os_str))]
        file: Option<PathBuf>,
    },
    /// Edit a test interactively or replace it from a JSON file
    Edit {
        test_id: i64,
        #[structopt(long, parse(from_os_str))]
        file: Option<PathBuf>,
    },
    /// Delete a test
    Delete {
        test_id: i64,
        #[structopt(long)]
        yes: bool,
    },
    /// Aggregate statistics
    Stats,
    /// Students' results, optionally filtered
    Results {
        #[structopt(long)]
        test: Option<i64>,
        #[structopt(long)]
        student: Option<i64>,
    },
}

#[derive(StructOpt)]
enum Command {
    Login,
    Register,
    Logout,
    Whoami,
    /// Student page; without a subcommand opens it interactively
    Student {
        #[structopt(subcommand)]
        command: Option<StudentCommand>,
    },
    /// Teacher page; without a subcommand opens it interactively
    Teacher {
        #[structopt(subcommand)]
        command: Option<TeacherCommand>,
    },
}

#[derive(StructOpt)]
#[structopt(name = "quiz-client", about = "Terminal client for the quiz testing platform")]
struct Args {
    #[structopt(long)]
    api_url: Option<String>,
    #[structopt(long, parse(from_os_str))]
    session_path: Option<PathBuf>,
    #[structopt(subcommand)]
    command: Option<Command>,
}

/// Answers every confirmation with "yes".
struct AssumeYes<C>(C);

impl<C: Console> Console for AssumeYes<C> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.0.read_line(prompt)
    }

    fn show(&mut self, text: &str) -> io::Result<()> {
        self.0.show(text)
    }

    fn confirm(&mut self, _question: &str) -> io::Result<bool> {
        Ok(true)
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_writer(io::stderr).with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::from_args();
    let config = Config::from_env()
        .with_api_url(args.api_url)
        .with_session_path(args.session_path);
    init_tracing(config.log_format);

    let state = build_state(config);
    let mut console = TerminalConsole::stdio();

    match args.command {
        None => app::navigate(&state, &mut console, app::landing_page(&state)).await?,
        Some(Command::Login) => login(&state, &mut console).await?,
        Some(Command::Register) => register(&state, &mut console).await?,
        Some(Command::Logout) => {
            auth::logout(&state)?;
            console.show("Вы вышли из системы")?;
        }
        Some(Command::Whoami) => match state.sessions.current() {
            Some(user) => console.show(&format!("{} (id {}, {})", user.username, user.id, user.role))?,
            None => console.show("Вход не выполнен")?,
        },
        Some(Command::Student { command: None }) => app::navigate(&state, &mut console, Page::Student).await?,
        Some(Command::Student { command: Some(command) }) => run_student(&state, &mut console, command).await?,
        Some(Command::Teacher { command: None }) => app::navigate(&state, &mut console, Page::Teacher).await?,
        Some(Command::Teacher { command: Some(command) }) => run_teacher(&state, console, command).await?,
    }
    Ok(())
}

async fn login<C: Console>(state: &AppState, console: &mut C) -> anyhow::Result<()> {
    let username = console.read_line("Имя пользователя: ")?.unwrap_or_default();
    let password = console.read_line("Пароль: ")?.unwrap_or_default();
    match auth::login(state, &username, &password).await {
        Ok(user) => console.show(&format!("Вы вошли как {} ({})", user.username, user.role))?,
        Err(err) => bail!(err.user_message(auth::LOGIN_FAILED)),
    }
    Ok(())
}

async fn register<C: Console>(state: &AppState, console: &mut C) -> anyhow::Result<()> {
    let username = console.read_line("Имя пользователя: ")?.unwrap_or_default();
    let password = console.read_line("Пароль: ")?.unwrap_or_default();
    let role = console.read_line("Роль (student/teacher) [student]: ")?.unwrap_or_default();
    let role = if role.trim().is_empty() {
        Role::Student
    } else {
        role.parse::<Role>().map_err(anyhow::Error::msg)?
    };
    match auth::register(state, &username, &password, role).await {
        Ok(_) => console.show(auth::REGISTERED)?,
        Err(err) => bail!(err.user_message(auth::REGISTER_FAILED)),
    }
    Ok(())
}

async fn run_student<C: Console>(state: &AppState, console: &mut C, command: StudentCommand) -> anyhow::Result<()> {
    let Some(mut page) = StudentPage::open(state) else {
        bail!(LOGIN_REQUIRED);
    };
    match command {
        StudentCommand::Tests => {
            let tests = page.load_tests().await.context(student::LOAD_TESTS_FAILED)?;
            console.show(&render::student_test_cards(&tests))?;
        }
        StudentCommand::Take { test_id } => {
            let test = page.start_test(test_id).await.context(student::LOAD_TEST_FAILED)?.clone();
            console.show(&render::test_sheet(&test))?;
            let mut selections = student::Selections::new();
            for (index, question) in test.questions.iter().enumerate() {
                let prompt = format!("Вопрос {}: номера вариантов через запятую: ", index + 1);
                let input = console.read_line(&prompt)?.unwrap_or_default();
                let picked = student::parse_choice(&input, question).map_err(anyhow::Error::msg)?;
                selections.insert(question.id, picked);
            }
            match page.submit_test(console, &selections).await.context(student::SUBMIT_FAILED)? {
                Some(result_id) => {
                    let result = page.show_result(result_id).await.context(student::LOAD_RESULT_FAILED)?;
                    console.show(&render::graded_result(&result))?;
                }
                None => console.show("Ответы не отправлены")?,
            }
        }
        StudentCommand::Show { result_id } => {
            let result = page.show_result(result_id).await.context(student::LOAD_RESULT_FAILED)?;
            console.show(&render::graded_result(&result))?;
        }
        StudentCommand::Results => {
            let results = page.my_results().await.context(student::LOAD_RESULTS_FAILED)?;
            console.show(&render::my_results_table(&results))?;
        }
    }
    Ok(())
}

async fn run_teacher<C: Console>(state: &AppState, console: C, command: TeacherCommand) -> anyhow::Result<()> {
    let Some(page) = TeacherPage::open(state) else {
        bail!(LOGIN_REQUIRED);
    };
    let mut console = console;
    match command {
        TeacherCommand::Tests => page.tests_view(&mut console).await?,
        TeacherCommand::Create { file } => match file {
            Some(path) => {
                let form = TestForm::from_payload(FormTarget::Create, &teacher::load_payload(&path)?);
                page.save_with_feedback(&mut console, &form).await?;
            }
            None => {
                let mut form = page.create_form();
                page.author(&mut console, &mut form).await?;
            }
        },
        TeacherCommand::Edit { test_id, file } => match file {
            Some(path) => {
                let form = TestForm::from_payload(FormTarget::Update(test_id), &teacher::load_payload(&path)?);
                page.save_with_feedback(&mut console, &form).await?;
            }
            None => {
                let mut form = page.edit_form(test_id).await.context(teacher::LOAD_TEST_FAILED)?;
                page.author(&mut console, &mut form).await?;
            }
        },
        TeacherCommand::Delete { test_id, yes } => {
            if yes {
                page.delete_view(&mut AssumeYes(console), test_id).await?;
            } else {
                page.delete_view(&mut console, test_id).await?;
            }
        }
        TeacherCommand::Stats => page.statistics_view(&mut console).await?,
        TeacherCommand::Results { test, student } => {
            let filter = match (test, student) {
                (Some(_), Some(_)) => bail!("укажите либо --test, либо --student"),
                (Some(id), None) => ResultsFilter::Test(id),
                (None, Some(id)) => ResultsFilter::Student(id),
                (None, None) => ResultsFilter::All,
            };
            page.results_view(&mut console, filter).await?;
        }
    }
    Ok(())
}
