use reqwest::StatusCode;
use thiserror::Error;

pub const CONNECTION_ERROR: &str = "Ошибка соединения с сервером";

/// Local validation failures. Each variant's message is shown to the user
/// verbatim and no request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Заполните все поля")]
    MissingFields,
    #[error("Имя пользователя должно быть минимум 3 символа")]
    UsernameTooShort,
    #[error("Пароль должен быть минимум 4 символа")]
    PasswordTooShort,
    #[error("Введите название теста")]
    EmptyTitle,
    #[error("Заполните текст всех вопросов")]
    EmptyQuestionText,
    #[error("В каждом вопросе должно быть минимум 2 варианта")]
    TooFewOptions,
    #[error("Заполните текст всех вариантов")]
    EmptyOptionText,
    #[error("В каждом вопросе должен быть хотя бы один правильный вариант")]
    NoCorrectOption,
    #[error("Добавьте хотя бы один вопрос")]
    NoQuestions,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("server responded with {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Server {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("connection failed: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("unreadable response body: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session record: {0}")]
    Record(#[from] serde_json::Error),
}

impl ClientError {
    pub fn server(status: StatusCode, detail: Option<String>) -> Self {
        Self::Server { status, detail }
    }

    /// Message shown to the user. `fallback` is used when the server rejected
    /// the request without a usable `detail`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Server { detail, .. } => detail.clone().unwrap_or_else(|| fallback.to_string()),
            Self::Connection(_) | Self::Decode(_) => CONNECTION_ERROR.to_string(),
            Self::Io(_) | Self::Record(_) => fallback.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_detail_wins_over_fallback() {
        let err = ClientError::server(StatusCode::UNAUTHORIZED, Some("Invalid credentials".into()));
        assert_eq!(err.user_message("Ошибка входа"), "Invalid credentials");
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn missing_detail_uses_fallback() {
        let err = ClientError::server(StatusCode::INTERNAL_SERVER_ERROR, None);
        assert_eq!(err.user_message("Ошибка регистрации"), "Ошибка регистрации");
    }

    #[test]
    fn validation_message_is_verbatim() {
        let err = ClientError::from(ValidationError::PasswordTooShort);
        assert!(err.is_validation());
        assert_eq!(err.user_message("ignored"), "Пароль должен быть минимум 4 символа");
    }
}
