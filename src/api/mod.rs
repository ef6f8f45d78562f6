//! Backend interface: the REST client and its error taxonomy.
//!
//! The [`Backend`] trait is the seam between the navigation/progress
//! logic and the network. The real implementation is [`ApiClient`];
//! tests drive the same logic with an in-memory fake.

pub mod client;

use async_trait::async_trait;
use thiserror::Error;

pub use client::ApiClient;

use crate::catalog::{AuthResponse, Chapter, ChapterDetail, Class, Subject, User};
use crate::content::ContentItem;
use crate::progress::ProgressRecord;

/// Failure categories for backend calls.
///
/// Transport and validation failures are non-fatal notices; an
/// auth rejection forces the session back to the unauthenticated state.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response received (connection refused, DNS, timeout).
    #[error("network error: {0}")]
    Transport(String),

    /// 401-equivalent; the session token is no longer valid.
    #[error("authentication rejected")]
    AuthRejected,

    /// The server rejected the input with a human-readable detail.
    #[error("{detail}")]
    Validation { detail: String },

    /// Any other non-success status.
    #[error("unexpected status {status}")]
    Status { status: u16 },

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Where an uploaded file should land, mirroring the backend's upload
/// subdirectories.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub chapter_id: String,
    pub title: String,
    pub description: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// New content record created by path or URL.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ContentCreate {
    pub title: String,
    pub content_type: String,
    pub file_path: String,
    pub description: String,
    pub chapter_id: String,
}

/// Resolution of `GET /api/content/open/{id}`: either a URL to open
/// externally or a LAN file path for the desktop shell.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OpenTarget {
    #[serde(rename = "type")]
    pub target_type: String,
    pub path: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// The LAN backend's REST surface, as consumed by the client.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse>;
    async fn signup(&self, email: &str, password: &str, role: &str) -> ApiResult<AuthResponse>;
    async fn current_user(&self, token: &str) -> ApiResult<User>;

    async fn classes(&self, token: &str) -> ApiResult<Vec<Class>>;
    async fn subjects(&self, token: &str, class_id: &str) -> ApiResult<Vec<Subject>>;
    async fn chapters(&self, token: &str, subject_id: &str) -> ApiResult<Vec<Chapter>>;
    async fn chapter_detail(&self, token: &str, chapter_id: &str) -> ApiResult<ChapterDetail>;
    async fn chapter_content(&self, token: &str, chapter_id: &str) -> ApiResult<Vec<ContentItem>>;

    async fn create_content(&self, token: &str, content: &ContentCreate) -> ApiResult<String>;
    async fn upload_file(&self, token: &str, upload: FileUpload) -> ApiResult<String>;
    async fn open_content(&self, token: &str, content_id: &str) -> ApiResult<OpenTarget>;

    async fn update_progress(&self, token: &str, chapter_id: &str, completed: bool) -> ApiResult<()>;
    async fn progress(&self, token: &str, user_id: &str) -> ApiResult<Vec<ProgressRecord>>;
}
