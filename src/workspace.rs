//! The signed-in user's working state: backend handle, catalog
//! navigator, progress tracker, and session token, driven through
//! dispatched operations so the navigation invariants live in one place.
//!
//! Failure policy (matching the backend contract):
//! - transport/validation failures become non-fatal notices on the
//!   navigator and leave prior state intact;
//! - an authentication rejection clears the session exactly once and
//!   resets all per-user state;
//! - a failed secondary content fetch still yields the chapter detail
//!   with an empty content list.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::api::{ApiError, Backend, ContentCreate, FileUpload, OpenTarget};
use crate::catalog::{Applied, ChapterView, FetchOutcome, FetchRequest, Navigator, User};
use crate::progress::ProgressTracker;
use crate::session::Session;

/// Default role for self-service signups.
const DEFAULT_ROLE: &str = "student";

pub struct Workspace {
    backend: Arc<dyn Backend>,
    session: Session,
    user: Option<User>,
    navigator: Navigator,
    progress: ProgressTracker,
}

impl Workspace {
    pub fn new(backend: Arc<dyn Backend>, session: Session) -> Self {
        Self {
            backend,
            session,
            user: None,
            navigator: Navigator::new(),
            progress: ProgressTracker::new(),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Sign in. On success the token is stored and the initial catalog
    /// fetch (class list) and progress fetch run immediately.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &str) -> Result<User> {
        let auth = self.backend.login(email, password).await?;
        self.session.set(auth.access_token).await?;
        self.user = Some(auth.user.clone());
        info!(user = %auth.user.email, "logged in");

        self.refresh_classes().await?;
        self.refresh_progress().await?;
        Ok(auth.user)
    }

    /// Create an account (student role) and sign in with it.
    #[instrument(skip(self, password))]
    pub async fn signup(&mut self, email: &str, password: &str) -> Result<User> {
        let auth = self.backend.signup(email, password, DEFAULT_ROLE).await?;
        self.session.set(auth.access_token).await?;
        self.user = Some(auth.user.clone());
        info!(user = %auth.user.email, "account created");

        self.refresh_classes().await?;
        self.refresh_progress().await?;
        Ok(auth.user)
    }

    /// Validate a persisted token against the backend. Returns false
    /// (and drops the token) when the backend no longer accepts it.
    pub async fn restore_session(&mut self) -> Result<bool> {
        let Some(token) = self.session.token().map(str::to_string) else {
            return Ok(false);
        };

        match self.backend.current_user(&token).await {
            Ok(user) => {
                self.user = Some(user);
                Ok(true)
            }
            Err(ApiError::AuthRejected) => {
                self.invalidate_session().await?;
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Sign out: clear the token and all per-user state. The navigator
    /// reset also invalidates any fetch still in flight.
    pub async fn logout(&mut self) -> Result<()> {
        self.session.clear().await?;
        self.user = None;
        self.navigator.reset();
        self.progress.clear();
        info!("logged out");
        Ok(())
    }

    /// Refetch the top-level class list.
    pub async fn refresh_classes(&mut self) -> Result<()> {
        let token = self.require_token()?;
        let request = self.navigator.load_classes();

        let outcome = match self.backend.classes(&token).await {
            Ok(classes) => FetchOutcome::Classes(classes),
            Err(e) => return self.fetch_error(request, e).await,
        };
        self.navigator.apply(&request, outcome);
        Ok(())
    }

    /// Select a class by id and fetch its subjects. The class must be
    /// present in the loaded class list.
    #[instrument(skip(self))]
    pub async fn select_class(&mut self, class_id: &str) -> Result<()> {
        let class = self
            .navigator
            .classes()
            .iter()
            .find(|c| c.id == class_id)
            .cloned()
            .with_context(|| format!("Unknown class: {}", class_id))?;

        let token = self.require_token()?;
        let request = self.navigator.select_class(class);

        let outcome = match self.backend.subjects(&token, class_id).await {
            Ok(subjects) => FetchOutcome::Subjects(subjects),
            Err(e) => return self.fetch_error(request, e).await,
        };
        self.navigator.apply(&request, outcome);
        Ok(())
    }

    /// Select a subject by id and fetch its chapters.
    #[instrument(skip(self))]
    pub async fn select_subject(&mut self, subject_id: &str) -> Result<()> {
        let subject = self
            .navigator
            .subjects()
            .iter()
            .find(|s| s.id == subject_id)
            .cloned()
            .with_context(|| format!("Unknown subject: {}", subject_id))?;

        let token = self.require_token()?;
        let request = self.navigator.select_subject(subject);

        let outcome = match self.backend.chapters(&token, subject_id).await {
            Ok(chapters) => FetchOutcome::Chapters(chapters),
            Err(e) => return self.fetch_error(request, e).await,
        };
        self.navigator.apply(&request, outcome);
        Ok(())
    }

    /// Select a chapter by id and fetch its detail plus attached
    /// content. The content fetch is secondary: if it fails, the detail
    /// is still shown with an empty content list.
    #[instrument(skip(self))]
    pub async fn select_chapter(&mut self, chapter_id: &str) -> Result<()> {
        let chapter = self
            .navigator
            .chapters()
            .iter()
            .find(|c| c.id == chapter_id)
            .cloned()
            .with_context(|| format!("Unknown chapter: {}", chapter_id))?;

        let token = self.require_token()?;
        let request = self.navigator.select_chapter(chapter);

        let detail = match self.backend.chapter_detail(&token, chapter_id).await {
            Ok(detail) => detail,
            Err(e) => return self.fetch_error(request, e).await,
        };

        let content = match self.backend.chapter_content(&token, chapter_id).await {
            Ok(content) => content,
            Err(ApiError::AuthRejected) => {
                self.invalidate_session().await?;
                anyhow::bail!("authentication rejected");
            }
            Err(e) => {
                warn!(%chapter_id, error = %e, "content fetch failed; showing detail without attachments");
                Vec::new()
            }
        };

        self.navigator
            .apply(&request, FetchOutcome::ChapterView(ChapterView { detail, content }));
        Ok(())
    }

    /// Apply a fetch result that arrived outside the usual select flow
    /// (e.g. a response an embedding UI held onto). Stale results are
    /// discarded by the navigator.
    pub fn apply_fetch(&mut self, request: &FetchRequest, outcome: FetchOutcome) -> Applied {
        self.navigator.apply(request, outcome)
    }

    /// Attach a content record (path or URL) to a chapter.
    pub async fn attach_content(&mut self, content: &ContentCreate) -> Result<String> {
        let token = self.require_token()?;
        match self.backend.create_content(&token, content).await {
            Ok(id) => {
                // Refresh the open chapter so the new item shows up.
                if self
                    .navigator
                    .selected_chapter()
                    .is_some_and(|c| c.id == content.chapter_id)
                {
                    self.select_chapter(&content.chapter_id.clone()).await?;
                }
                Ok(id)
            }
            Err(ApiError::AuthRejected) => {
                self.invalidate_session().await?;
                anyhow::bail!("authentication rejected");
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Upload a file to a chapter via the multipart endpoint.
    pub async fn upload_file(&mut self, upload: FileUpload) -> Result<String> {
        let token = self.require_token()?;
        match self.backend.upload_file(&token, upload).await {
            Ok(id) => Ok(id),
            Err(ApiError::AuthRejected) => {
                self.invalidate_session().await?;
                anyhow::bail!("authentication rejected");
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a content item into an openable target.
    pub async fn open_content(&mut self, content_id: &str) -> Result<OpenTarget> {
        let token = self.require_token()?;
        match self.backend.open_content(&token, content_id).await {
            Ok(target) => Ok(target),
            Err(ApiError::AuthRejected) => {
                self.invalidate_session().await?;
                anyhow::bail!("authentication rejected");
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Mark a chapter complete. Idempotent: the backend upserts, so a
    /// repeat mark succeeds and changes nothing. The local record set is
    /// refreshed wholesale afterwards rather than patched.
    #[instrument(skip(self))]
    pub async fn mark_complete(&mut self, chapter_id: &str) -> Result<()> {
        let token = self.require_token()?;
        match self.backend.update_progress(&token, chapter_id, true).await {
            Ok(()) => {}
            Err(ApiError::AuthRejected) => {
                self.invalidate_session().await?;
                anyhow::bail!("authentication rejected");
            }
            Err(e) => return Err(e.into()),
        }
        self.refresh_progress().await
    }

    /// Re-fetch the signed-in user's full progress list.
    pub async fn refresh_progress(&mut self) -> Result<()> {
        let token = self.require_token()?;
        let user_id = self
            .user
            .as_ref()
            .map(|u| u.id.clone())
            .context("No signed-in user")?;

        match self.backend.progress(&token, &user_id).await {
            Ok(records) => {
                self.progress.replace_all(records);
                Ok(())
            }
            Err(ApiError::AuthRejected) => {
                self.invalidate_session().await?;
                anyhow::bail!("authentication rejected");
            }
            Err(e) => {
                // Non-fatal: stale progress is displayed until the next refresh.
                warn!(error = %e, "progress fetch failed; keeping previous records");
                Ok(())
            }
        }
    }

    /// Completion percentage over the currently loaded chapter list.
    /// Derived on every call; an empty list yields 0.0.
    pub fn progress_percent(&self) -> f64 {
        let chapters = self.navigator.chapters();
        if chapters.is_empty() {
            return 0.0;
        }
        let completed = chapters
            .iter()
            .filter(|c| self.progress.is_completed(&c.id))
            .count();
        completed as f64 / chapters.len() as f64 * 100.0
    }

    fn require_token(&self) -> Result<String> {
        self.session
            .token()
            .map(str::to_string)
            .context("Not logged in")
    }

    /// Handle a failed fetch: auth rejection tears the session down;
    /// anything else is recorded as a non-fatal notice.
    async fn fetch_error(&mut self, request: FetchRequest, error: ApiError) -> Result<()> {
        match error {
            ApiError::AuthRejected => {
                self.invalidate_session().await?;
                anyhow::bail!("authentication rejected");
            }
            e => {
                self.navigator
                    .apply(&request, FetchOutcome::Failed(e.to_string()));
                Ok(())
            }
        }
    }

    /// Clear the session exactly once and reset all per-user state.
    async fn invalidate_session(&mut self) -> Result<()> {
        warn!("authentication rejected; clearing session");
        self.session.clear().await?;
        self.user = None;
        self.navigator.reset();
        self.progress.clear();
        Ok(())
    }
}
