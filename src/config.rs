use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub session_path: PathBuf,
    pub log_format: LogFormat,
    /// Pause between a successful registration and switching to the login view.
    pub register_redirect_delay: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let api_url = env::var("QUIZ_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let session_path = env::var("QUIZ_SESSION_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_session_path);
        let log_format = match env::var("QUIZ_LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            api_url,
            session_path,
            log_format,
            register_redirect_delay: Duration::from_secs(2),
        }
    }

    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        self
    }

    pub fn with_session_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.session_path = path;
        }
        self
    }
}

fn default_session_path() -> PathBuf {
    env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".quiz_client").join(SESSION_FILE))
        .unwrap_or_else(|| PathBuf::from(SESSION_FILE))
}
