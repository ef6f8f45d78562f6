//! Command-line interface for studyhall.
//!
//! Provides commands for signing in, browsing the Class → Subject →
//! Chapter catalog, attaching and opening content, and tracking
//! completion progress against a LAN backend.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::api::{ApiClient, ContentCreate, FileUpload};
use crate::config;
use crate::content::{classify, MediaPaths, RenderStrategy};
use crate::session::Session;
use crate::shell;
use crate::workspace::Workspace;

/// studyhall - LAN e-learning client
#[derive(Parser, Debug)]
#[command(name = "studyhall")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the session token
    Login {
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Create a student account and sign in
    Signup {
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Clear the stored session token
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List classes
    Classes,

    /// List subjects of a class
    Subjects {
        /// Class ID
        class_id: String,
    },

    /// List chapters of a subject, with completion flags
    Chapters {
        /// Class ID
        class_id: String,

        /// Subject ID
        subject_id: String,
    },

    /// Show a chapter: detail, classified content, completion
    Chapter {
        /// Class ID
        class_id: String,

        /// Subject ID
        subject_id: String,

        /// Chapter ID
        chapter_id: String,
    },

    /// Attach content to a chapter by path or URL
    Attach {
        /// Chapter ID
        chapter_id: String,

        /// Content title
        #[arg(short, long)]
        title: String,

        /// Declared type (text, video, image, document, ...); the
        /// backend auto-detects when omitted
        #[arg(short, long, default_value = "auto")]
        content_type: String,

        /// File path or URL
        path: String,

        /// Optional description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Upload a file to a chapter (multipart)
    Upload {
        /// Chapter ID
        chapter_id: String,

        /// Content title
        #[arg(short, long)]
        title: String,

        /// File to upload
        file: PathBuf,

        /// Optional description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Open a content item via the OS default handler
    Open {
        /// Content ID
        content_id: String,
    },

    /// Reveal a local path in the OS file browser
    Reveal {
        /// Path to reveal
        path: String,
    },

    /// Show the signed-in user's progress records
    Progress,

    /// Mark a chapter complete
    Complete {
        /// Chapter ID
        chapter_id: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Login { email, password } => login(&email, &password).await,
            Commands::Signup { email, password } => signup(&email, &password).await,
            Commands::Logout => logout().await,
            Commands::Whoami => whoami().await,
            Commands::Classes => list_classes().await,
            Commands::Subjects { class_id } => list_subjects(&class_id).await,
            Commands::Chapters {
                class_id,
                subject_id,
            } => list_chapters(&class_id, &subject_id).await,
            Commands::Chapter {
                class_id,
                subject_id,
                chapter_id,
            } => show_chapter(&class_id, &subject_id, &chapter_id).await,
            Commands::Attach {
                chapter_id,
                title,
                content_type,
                path,
                description,
            } => attach(&chapter_id, &title, &content_type, &path, &description).await,
            Commands::Upload {
                chapter_id,
                title,
                file,
                description,
            } => upload(&chapter_id, &title, file, &description).await,
            Commands::Open { content_id } => open_content(&content_id).await,
            Commands::Reveal { path } => reveal(&path),
            Commands::Progress => show_progress().await,
            Commands::Complete { chapter_id } => complete(&chapter_id).await,
            Commands::Config => show_config(),
        }
    }
}

/// Build a workspace from the resolved configuration.
async fn workspace() -> Result<Workspace> {
    let config = config::config()?;
    let backend = ApiClient::new(config.api_url.clone(), config.timeout)
        .context("Failed to build API client")?;
    let session = Session::load(config.token_path()).await?;
    Ok(Workspace::new(Arc::new(backend), session))
}

/// Build a workspace with a validated session; errors out when the
/// stored token is missing or rejected.
async fn signed_in_workspace() -> Result<Workspace> {
    let mut ws = workspace().await?;
    if !ws.restore_session().await? {
        anyhow::bail!("Not logged in. Run: studyhall login <email> --password <password>");
    }
    Ok(ws)
}

async fn login(email: &str, password: &str) -> Result<()> {
    let mut ws = workspace().await?;
    let user = ws.login(email, password).await?;
    println!("Logged in as {} ({})", user.email, user.role);
    println!("{} classes available", ws.navigator().classes().len());
    Ok(())
}

async fn signup(email: &str, password: &str) -> Result<()> {
    let mut ws = workspace().await?;
    let user = ws.signup(email, password).await?;
    println!("Account created for {} ({})", user.email, user.role);
    Ok(())
}

async fn logout() -> Result<()> {
    let mut ws = workspace().await?;
    ws.logout().await?;
    println!("Logged out");
    Ok(())
}

async fn whoami() -> Result<()> {
    let ws = signed_in_workspace().await?;
    let user = ws.user().context("No signed-in user")?;
    println!("{} ({}) [{}]", user.email, user.id, user.role);
    Ok(())
}

async fn list_classes() -> Result<()> {
    let mut ws = signed_in_workspace().await?;
    ws.refresh_classes().await?;

    if let Some(notice) = ws.navigator().notice() {
        eprintln!("Warning: {}", notice);
    }

    for class in ws.navigator().classes() {
        println!("{}  {} (grade {})", class.id, class.name, class.grade);
        if !class.description.is_empty() {
            println!("    {}", class.description);
        }
    }
    Ok(())
}

async fn list_subjects(class_id: &str) -> Result<()> {
    let mut ws = signed_in_workspace().await?;
    ws.refresh_classes().await?;
    ws.select_class(class_id).await?;

    if let Some(notice) = ws.navigator().notice() {
        eprintln!("Warning: {}", notice);
    }

    for subject in ws.navigator().subjects() {
        println!("{}  {}", subject.id, subject.name);
        if !subject.description.is_empty() {
            println!("    {}", subject.description);
        }
    }
    Ok(())
}

async fn list_chapters(class_id: &str, subject_id: &str) -> Result<()> {
    let mut ws = signed_in_workspace().await?;
    ws.refresh_classes().await?;
    ws.select_class(class_id).await?;
    ws.select_subject(subject_id).await?;
    ws.refresh_progress().await?;

    if let Some(notice) = ws.navigator().notice() {
        eprintln!("Warning: {}", notice);
    }

    for chapter in ws.navigator().chapters() {
        let mark = if ws.progress().is_completed(&chapter.id) {
            "[x]"
        } else {
            "[ ]"
        };
        println!("{} {}  {}", mark, chapter.id, chapter.name);
    }
    println!("Progress: {:.0}%", ws.progress_percent());
    Ok(())
}

async fn show_chapter(class_id: &str, subject_id: &str, chapter_id: &str) -> Result<()> {
    let mut ws = signed_in_workspace().await?;
    ws.refresh_classes().await?;
    ws.select_class(class_id).await?;
    ws.select_subject(subject_id).await?;
    ws.select_chapter(chapter_id).await?;
    ws.refresh_progress().await?;

    if let Some(notice) = ws.navigator().notice() {
        eprintln!("Warning: {}", notice);
    }

    let view = ws
        .navigator()
        .chapter_view()
        .context("Chapter detail unavailable")?;

    // Breadcrumb
    let crumb = [
        view.detail.class.as_ref().map(|c| c.name.as_str()),
        view.detail.subject.as_ref().map(|s| s.name.as_str()),
        Some(view.detail.chapter.name.as_str()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" > ");
    println!("{}", crumb);

    if !view.detail.chapter.description.is_empty() {
        println!("{}", view.detail.chapter.description);
    }
    if let Some(content) = &view.detail.chapter.content {
        println!("\n{}", content);
    }

    let completed = ws.progress().is_completed(chapter_id);
    println!("\nCompleted: {}", if completed { "yes" } else { "no" });

    let media = MediaPaths::new(config::config()?.media_url.clone());
    if view.content.is_empty() {
        println!("\nNo attached content");
    } else {
        println!("\nAttached content:");
        for item in &view.content {
            let classified = classify(item, &media);
            let action = match &classified.strategy {
                RenderStrategy::InlineText => "inline text".to_string(),
                RenderStrategy::InlineImage { url } => format!("image: {}", url),
                RenderStrategy::EmbedFrame { url } => format!("embed: {}", url),
                RenderStrategy::VideoPlayer { url } => format!("play: {}", url),
                RenderStrategy::AudioPlayer { url } => format!("play: {}", url),
                RenderStrategy::OpenExternally { target } => format!("open: {}", target),
            };
            println!("  {}  {} [{}] {}", item.id, item.title, classified.kind, action);
        }
    }
    Ok(())
}

async fn attach(
    chapter_id: &str,
    title: &str,
    content_type: &str,
    path: &str,
    description: &str,
) -> Result<()> {
    let mut ws = signed_in_workspace().await?;
    let content = ContentCreate {
        title: title.to_string(),
        content_type: content_type.to_string(),
        file_path: path.to_string(),
        description: description.to_string(),
        chapter_id: chapter_id.to_string(),
    };

    let id = ws.attach_content(&content).await?;
    println!("Content attached: {}", id);
    Ok(())
}

async fn upload(chapter_id: &str, title: &str, file: PathBuf, description: &str) -> Result<()> {
    let bytes = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read file: {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .context("File has no name")?;

    let mut ws = signed_in_workspace().await?;
    let id = ws
        .upload_file(FileUpload {
            chapter_id: chapter_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            file_name,
            bytes,
        })
        .await?;
    println!("File uploaded: {}", id);
    Ok(())
}

async fn open_content(content_id: &str) -> Result<()> {
    let mut ws = signed_in_workspace().await?;
    let target = ws.open_content(content_id).await?;

    let outcome = shell::open_path(&target.path);
    if outcome.success {
        println!("{}", outcome.message);
    } else {
        eprintln!("{}", outcome.message);
    }
    Ok(())
}

fn reveal(path: &str) -> Result<()> {
    let outcome = shell::show_in_folder(path);
    if outcome.success {
        println!("{}", outcome.message);
    } else {
        eprintln!("{}", outcome.message);
    }
    Ok(())
}

async fn show_progress() -> Result<()> {
    let mut ws = signed_in_workspace().await?;
    ws.refresh_progress().await?;

    let completed = ws.progress().completed_count();
    println!("{} chapters completed", completed);
    Ok(())
}

async fn complete(chapter_id: &str) -> Result<()> {
    let mut ws = signed_in_workspace().await?;
    ws.mark_complete(chapter_id).await?;
    println!("Chapter {} marked complete", chapter_id);
    Ok(())
}

fn show_config() -> Result<()> {
    let config = config::config()?;
    println!("home:      {}", config.home.display());
    println!("api_url:   {}", config.api_url);
    println!("media_url: {}", config.media_url);
    println!("timeout:   {}s", config.timeout.as_secs());
    match &config.config_file {
        Some(path) => println!("config:    {}", path.display()),
        None => println!("config:    (defaults)"),
    }
    Ok(())
}
