use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" | "s" | "студент" => Ok(Role::Student),
            "teacher" | "t" | "преподаватель" => Ok(Role::Teacher),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The logged-in user as returned by `/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3))]
    pub username: String,
    #[validate(length(min = 4))]
    pub password: String,
    pub role: Role,
}

/// Server timestamp. Naive values are kept as wall-clock time; values with an
/// offset are converted to local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub NaiveDateTime);

impl Timestamp {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self(dt.with_timezone(&Local).naive_local()));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(Self)
    }

    /// Date and time in the `ru-RU` style the web client used.
    pub fn localized(&self) -> String {
        self.0.format("%d.%m.%Y, %H:%M:%S").to_string()
    }

    pub fn localized_date(&self) -> String {
        self.0.format("%d.%m.%Y").to_string()
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentOption {
    pub id: i64,
    pub option_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentQuestion {
    pub id: i64,
    pub question_text: String,
    pub options: Vec<StudentOption>,
}

/// A test as the student sees it: options without correctness. The student
/// list endpoint returns the same shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentTest {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub questions: Vec<StudentQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherTestSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    pub questions_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeacherOption {
    #[serde(default)]
    pub id: Option<i64>,
    pub option_text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeacherQuestion {
    #[serde(default)]
    pub id: Option<i64>,
    pub question_text: String,
    pub options: Vec<TeacherOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherTest {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    pub questions: Vec<TeacherQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionPayload {
    pub option_text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionPayload {
    pub question_text: String,
    pub options: Vec<OptionPayload>,
}

/// Body of `POST /tests/` and `PUT /tests/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestPayload {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<QuestionPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Answer {
    pub question_id: i64,
    pub selected_option_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Submission {
    pub test_id: i64,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub result_id: i64,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub total_questions: Option<i64>,
    #[serde(default)]
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRow {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub test_id: Option<i64>,
    pub score: i64,
    pub total_questions: i64,
    pub completed_at: Timestamp,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub test_title: String,
}

impl ResultRow {
    pub fn percentage(&self) -> i64 {
        percentage(self.score, self.total_questions)
    }
}

/// How an option is highlighted in a graded result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    CorrectSelected,
    CorrectMissed,
    IncorrectSelected,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GradedOption {
    #[serde(default)]
    pub id: Option<i64>,
    pub text: String,
    pub is_correct: bool,
    pub was_selected: bool,
}

impl GradedOption {
    pub fn mark(&self) -> OptionMark {
        match (self.is_correct, self.was_selected) {
            (true, true) => OptionMark::CorrectSelected,
            (true, false) => OptionMark::CorrectMissed,
            (false, true) => OptionMark::IncorrectSelected,
            (false, false) => OptionMark::Neutral,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GradedQuestion {
    pub question_text: String,
    pub options: Vec<GradedOption>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedResult {
    pub id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub completed_at: Timestamp,
    #[serde(default)]
    pub test_title: Option<String>,
    pub questions: Vec<GradedQuestion>,
}

impl GradedResult {
    pub fn percentage(&self) -> i64 {
        percentage(self.score, self.total_questions)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestStatistics {
    #[serde(default)]
    pub test_id: Option<i64>,
    pub test_title: String,
    pub attempts: i64,
    pub avg_score: f64,
    pub avg_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub total_tests: i64,
    pub total_students: i64,
    pub total_attempts: i64,
    pub tests_statistics: Vec<TestStatistics>,
}

/// `round(score / total * 100)` with halves rounded up. A test without
/// questions scores 0%.
pub fn percentage(score: i64, total_questions: i64) -> i64 {
    if total_questions <= 0 {
        return 0;
    }
    let exact = score as f64 / total_questions as f64 * 100.0;
    (exact + 0.5).floor() as i64
}
