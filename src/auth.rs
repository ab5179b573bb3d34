use crate::app::Page;
use crate::console::Console;
use crate::error::{ClientError, ValidationError};
use crate::models::{LoginRequest, RegisterRequest, Role, SessionUser};
use crate::state::AppState;
use tracing::{info, warn};
use validator::Validate;

pub const LOGIN_FAILED: &str = "Ошибка входа";
pub const REGISTER_FAILED: &str = "Ошибка регистрации";
pub const REGISTERED: &str = "Регистрация успешна! Войдите в систему.";
pub const LOGOUT_FAILED: &str = "Ошибка выхода из системы";

/// Local checks run before `/auth/register` is called, in display order.
pub fn check_registration(username: &str, password: &str, role: Role) -> Result<RegisterRequest, ValidationError> {
    let request = RegisterRequest {
        username: username.trim().to_string(),
        password: password.to_string(),
        role,
    };
    if request.username.is_empty() || request.password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if let Err(errors) = request.validate() {
        let fields = errors.field_errors();
        if fields.contains_key("username") {
            return Err(ValidationError::UsernameTooShort);
        }
        if fields.contains_key("password") {
            return Err(ValidationError::PasswordTooShort);
        }
    }
    Ok(request)
}

/// Logs in and stores the returned user as the active session.
pub async fn login(state: &AppState, username: &str, password: &str) -> Result<SessionUser, ClientError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingFields.into());
    }
    let user = state
        .api
        .login(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
        .await?;
    state.sessions.save(&user)?;
    info!(user_id = user.id, role = %user.role, "logged in");
    Ok(user)
}

/// Creates an account. Does not log in.
pub async fn register(state: &AppState, username: &str, password: &str, role: Role) -> Result<SessionUser, ClientError> {
    let request = check_registration(username, password, role)?;
    let user = state.api.register(&request).await?;
    info!(user_id = user.id, role = %user.role, "registered");
    Ok(user)
}

pub fn logout(state: &AppState) -> Result<(), ClientError> {
    state.sessions.clear()?;
    info!("logged out");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthView {
    Login,
    Register,
}

/// Entry page: login and registration views, one visible at a time.
pub struct EntryPage<'a> {
    state: &'a AppState,
    view: AuthView,
}

impl<'a> EntryPage<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            state,
            view: AuthView::Login,
        }
    }

    pub fn view(&self) -> AuthView {
        self.view
    }

    pub fn show_login(&mut self) {
        self.view = AuthView::Login;
    }

    pub fn show_register(&mut self) {
        self.view = AuthView::Register;
    }

    /// Runs until the user logs in (returns the role's page) or quits.
    pub async fn run<C: Console>(&mut self, console: &mut C) -> Result<Page, ClientError> {
        loop {
            match self.view {
                AuthView::Login => {
                    console.show("\n== Вход ==\n1. Войти\n2. Регистрация\n0. Выход")?;
                    let Some(choice) = console.read_line("> ")? else {
                        return Ok(Page::Exit);
                    };
                    match choice.trim() {
                        "1" => {
                            if let Some(user) = self.login_form(console).await? {
                                return Ok(Page::for_role(user.role));
                            }
                        }
                        "2" => self.show_register(),
                        "0" => return Ok(Page::Exit),
                        _ => {}
                    }
                }
                AuthView::Register => {
                    console.show("\n== Регистрация ==\n1. Зарегистрироваться\n2. Уже есть аккаунт? Войти\n0. Выход")?;
                    let Some(choice) = console.read_line("> ")? else {
                        return Ok(Page::Exit);
                    };
                    match choice.trim() {
                        "1" => self.register_form(console).await?,
                        "2" => self.show_login(),
                        "0" => return Ok(Page::Exit),
                        _ => {}
                    }
                }
            }
        }
    }

    async fn login_form<C: Console>(&mut self, console: &mut C) -> Result<Option<SessionUser>, ClientError> {
        let username = console.read_line("Имя пользователя: ")?.unwrap_or_default();
        let password = console.read_line("Пароль: ")?.unwrap_or_default();
        match login(self.state, &username, &password).await {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                warn!("login failed: {}", err);
                console.show(&format!("Ошибка: {}", err.user_message(LOGIN_FAILED)))?;
                Ok(None)
            }
        }
    }

    async fn register_form<C: Console>(&mut self, console: &mut C) -> Result<(), ClientError> {
        let username = console.read_line("Имя пользователя: ")?.unwrap_or_default();
        let password = console.read_line("Пароль: ")?.unwrap_or_default();
        let role = loop {
            let raw = console.read_line("Роль (student/teacher) [student]: ")?.unwrap_or_default();
            if raw.trim().is_empty() {
                break Role::Student;
            }
            match raw.parse::<Role>() {
                Ok(role) => break role,
                Err(_) => console.show("Роль должна быть student или teacher")?,
            }
        };
        match register(self.state, &username, &password, role).await {
            Ok(_) => {
                console.show(REGISTERED)?;
                tokio::time::sleep(self.state.config.register_redirect_delay).await;
                self.show_login();
            }
            Err(err) => console.show(&format!("Ошибка: {}", err.user_message(REGISTER_FAILED)))?,
        }
        Ok(())
    }
}
