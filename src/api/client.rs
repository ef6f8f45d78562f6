//! reqwest implementation of the [`Backend`] trait against the LAN
//! backend's REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{ApiError, ApiResult, Backend, ContentCreate, FileUpload, OpenTarget};
use crate::catalog::{AuthResponse, Chapter, ChapterDetail, Class, LoginRequest, SignupRequest, Subject, User};
use crate::content::ContentItem;
use crate::progress::ProgressRecord;

/// Error body shape the backend uses for 4xx rejections.
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: Option<String>,
}

/// Acknowledgement body for create/upload endpoints.
#[derive(Debug, Deserialize)]
struct CreatedResponse {
    content_id: Option<String>,
    #[allow(dead_code)]
    message: Option<String>,
}

/// HTTP client for the LAN e-learning backend.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the given base URL, e.g. `http://host:8001`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {}", token))
    }

    /// Send a request and decode the JSON body, mapping failures into
    /// the [`ApiError`] taxonomy.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let response = Self::check_status(response).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn check_status(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        debug!(%status, "backend rejected request");

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthRejected);
        }

        if status.is_client_error() {
            // 4xx bodies carry a human-readable detail field.
            let detail = response
                .json::<ErrorDetail>()
                .await
                .ok()
                .and_then(|e| e.detail)
                .unwrap_or_else(|| format!("request rejected ({})", status));
            return Err(ApiError::Validation { detail });
        }

        Err(ApiError::Status {
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(self.client.post(self.url("/api/auth/login")).json(&body))
            .await
    }

    async fn signup(&self, email: &str, password: &str, role: &str) -> ApiResult<AuthResponse> {
        let body = SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            role: role.to_string(),
        };
        self.send(self.client.post(self.url("/api/auth/signup")).json(&body))
            .await
    }

    async fn current_user(&self, token: &str) -> ApiResult<User> {
        self.send(Self::bearer(self.client.get(self.url("/api/auth/user")), token))
            .await
    }

    async fn classes(&self, token: &str) -> ApiResult<Vec<Class>> {
        self.send(Self::bearer(self.client.get(self.url("/api/classes")), token))
            .await
    }

    async fn subjects(&self, token: &str, class_id: &str) -> ApiResult<Vec<Subject>> {
        let url = self.url(&format!("/api/subjects/{}", class_id));
        self.send(Self::bearer(self.client.get(url), token)).await
    }

    async fn chapters(&self, token: &str, subject_id: &str) -> ApiResult<Vec<Chapter>> {
        let url = self.url(&format!("/api/chapters/{}", subject_id));
        self.send(Self::bearer(self.client.get(url), token)).await
    }

    async fn chapter_detail(&self, token: &str, chapter_id: &str) -> ApiResult<ChapterDetail> {
        let url = self.url(&format!("/api/chapter/{}", chapter_id));
        self.send(Self::bearer(self.client.get(url), token)).await
    }

    async fn chapter_content(&self, token: &str, chapter_id: &str) -> ApiResult<Vec<ContentItem>> {
        let url = self.url(&format!("/api/content/{}", chapter_id));
        self.send(Self::bearer(self.client.get(url), token)).await
    }

    async fn create_content(&self, token: &str, content: &ContentCreate) -> ApiResult<String> {
        let request = Self::bearer(self.client.post(self.url("/api/content/create")), token)
            .json(content);
        let created: CreatedResponse = self.send(request).await?;
        Ok(created.content_id.unwrap_or_default())
    }

    async fn upload_file(&self, token: &str, upload: FileUpload) -> ApiResult<String> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let form = Form::new()
            .text("chapter_id", upload.chapter_id)
            .text("title", upload.title)
            .text("description", upload.description)
            .part("file", part);

        let request = Self::bearer(self.client.post(self.url("/api/content/upload-file")), token)
            .multipart(form);
        let created: CreatedResponse = self.send(request).await?;
        Ok(created.content_id.unwrap_or_default())
    }

    async fn open_content(&self, token: &str, content_id: &str) -> ApiResult<OpenTarget> {
        let url = self.url(&format!("/api/content/open/{}", content_id));
        self.send(Self::bearer(self.client.get(url), token)).await
    }

    async fn update_progress(&self, token: &str, chapter_id: &str, completed: bool) -> ApiResult<()> {
        let request = Self::bearer(self.client.post(self.url("/api/progress/update")), token)
            .json(&serde_json::json!({
                "chapter_id": chapter_id,
                "completed": completed,
            }));

        // Ack body is just a message; decode and discard.
        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }

    async fn progress(&self, token: &str, user_id: &str) -> ApiResult<Vec<ProgressRecord>> {
        let url = self.url(&format!("/api/progress/{}", user_id));
        self.send(Self::bearer(self.client.get(url), token)).await
    }
}
