use crate::error::ClientError;
use crate::models::{
    GradedResult, LoginRequest, RegisterRequest, ResultRow, SessionUser, Statistics, StudentTest,
    SubmitReceipt, Submission, TeacherTest, TeacherTestSummary, TestPayload,
};
use crate::routes;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

/// Thin JSON gateway to the quiz backend. No retries, timeouts or auth headers.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends `body` as JSON to `base_url + path` and decodes the JSON reply.
    pub async fn request<B, T>(&self, path: &str, method: Method, body: Option<&B>) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "api request");
        let mut builder = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await.map_err(|err| {
            error!(%method, %url, "request failed: {}", err);
            ClientError::Connection(err)
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<ErrorBody>().await {
                Ok(body) => match body.detail {
                    Some(Value::String(detail)) => Some(detail),
                    _ => None,
                },
                Err(err) => {
                    warn!(%url, "error body is not json: {}", err);
                    None
                }
            };
            warn!(%method, %url, %status, detail = detail.as_deref().unwrap_or(""), "request rejected");
            return Err(ClientError::server(status, detail));
        }

        response.json::<T>().await.map_err(|err| {
            error!(%method, %url, "failed to decode response: {}", err);
            ClientError::Decode(err)
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request::<(), T>(path, Method::GET, None).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.request(path, Method::POST, Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.request(path, Method::PUT, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request::<(), T>(path, Method::DELETE, None).await
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<SessionUser, ClientError> {
        self.post(routes::LOGIN, credentials).await
    }

    pub async fn register(&self, account: &RegisterRequest) -> Result<SessionUser, ClientError> {
        self.post(routes::REGISTER, account).await
    }

    pub async fn student_tests(&self) -> Result<Vec<StudentTest>, ClientError> {
        self.get(routes::STUDENT_TESTS).await
    }

    pub async fn student_test(&self, test_id: i64) -> Result<StudentTest, ClientError> {
        self.get(&routes::student_test(test_id)).await
    }

    pub async fn submit(&self, student_id: i64, submission: &Submission) -> Result<SubmitReceipt, ClientError> {
        self.post(&routes::student_submit(student_id), submission).await
    }

    pub async fn student_result(&self, result_id: i64, student_id: i64) -> Result<GradedResult, ClientError> {
        self.get(&routes::student_result(result_id, student_id)).await
    }

    pub async fn student_results(&self, student_id: i64) -> Result<Vec<ResultRow>, ClientError> {
        self.get(&routes::student_results(student_id)).await
    }

    pub async fn teacher_tests(&self) -> Result<Vec<TeacherTestSummary>, ClientError> {
        self.get(routes::TEACHER_TESTS).await
    }

    pub async fn teacher_test(&self, test_id: i64) -> Result<TeacherTest, ClientError> {
        self.get(&routes::teacher_test(test_id)).await
    }

    pub async fn create_test(&self, teacher_id: i64, payload: &TestPayload) -> Result<TeacherTest, ClientError> {
        self.post(&routes::create_test(teacher_id), payload).await
    }

    pub async fn update_test(&self, test_id: i64, teacher_id: i64, payload: &TestPayload) -> Result<TeacherTest, ClientError> {
        self.put(&routes::owned_test(test_id, teacher_id), payload).await
    }

    pub async fn delete_test(&self, test_id: i64, teacher_id: i64) -> Result<(), ClientError> {
        self.delete::<Value>(&routes::owned_test(test_id, teacher_id)).await?;
        Ok(())
    }

    pub async fn statistics(&self, teacher_id: i64) -> Result<Statistics, ClientError> {
        self.get(&routes::teacher_statistics(teacher_id)).await
    }

    pub async fn teacher_results(&self, teacher_id: i64) -> Result<Vec<ResultRow>, ClientError> {
        self.get(&routes::teacher_results(teacher_id)).await
    }

    pub async fn teacher_results_by_test(&self, test_id: i64, teacher_id: i64) -> Result<Vec<ResultRow>, ClientError> {
        self.get(&routes::teacher_results_by_test(test_id, teacher_id)).await
    }

    pub async fn teacher_results_by_student(&self, student_id: i64, teacher_id: i64) -> Result<Vec<ResultRow>, ClientError> {
        self.get(&routes::teacher_results_by_student(student_id, teacher_id)).await
    }
}
