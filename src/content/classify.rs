//! Pure classification of content items into media kinds and rendering
//! strategies.
//!
//! Classification is total and deterministic: same input, same answer,
//! no I/O, and nothing here ever fails. Unrecognized input degrades to
//! [`MediaKind::File`] with an open-externally strategy.

use serde::{Deserialize, Serialize};

use super::{ContentItem, ContentTag};

/// Extensions treated as locally-playable video files.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "wmv", "webm", "mkv", "flv"];

/// Prefixes that mark a stored value as a backend-served upload.
const UPLOAD_PREFIXES: &[&str] = &["/uploads/", "uploads/"];

/// Concrete media kind after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Text,
    Image,
    Document,
    Spreadsheet,
    Presentation,
    Pdf,
    Audio,
    Webpage,
    /// Video hosted on YouTube, rendered via an embed frame.
    Youtube,
    /// Video served from the LAN backend's media directory.
    LocalVideo,
    /// Video at an arbitrary remote URL.
    ExternalVideo,
    /// Fallback for anything unrecognized.
    File,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MediaKind::Text => "text",
            MediaKind::Image => "image",
            MediaKind::Document => "document",
            MediaKind::Spreadsheet => "spreadsheet",
            MediaKind::Presentation => "presentation",
            MediaKind::Pdf => "pdf",
            MediaKind::Audio => "audio",
            MediaKind::Webpage => "webpage",
            MediaKind::Youtube => "youtube",
            MediaKind::LocalVideo => "local",
            MediaKind::ExternalVideo => "external",
            MediaKind::File => "file",
        };
        write!(f, "{}", s)
    }
}

/// How a classified item should be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderStrategy {
    /// Render the payload string as text.
    InlineText,
    /// Render an `<img>`-style inline image.
    InlineImage { url: String },
    /// Render inside an embedded frame (YouTube embeds, PDFs, web pages).
    EmbedFrame { url: String },
    /// Render with a native video player element.
    VideoPlayer { url: String },
    /// Render with a native audio player element.
    AudioPlayer { url: String },
    /// Hand the target to the desktop shell / OS default handler.
    OpenExternally { target: String },
}

/// Result of classifying one content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub kind: MediaKind,
    pub strategy: RenderStrategy,
}

/// Base URLs used to resolve backend-relative media paths.
#[derive(Debug, Clone)]
pub struct MediaPaths {
    /// Base URL the backend serves uploads from, e.g. `http://host:8001`.
    pub media_base: String,
}

impl MediaPaths {
    pub fn new(media_base: impl Into<String>) -> Self {
        Self {
            media_base: media_base.into(),
        }
    }

    /// Join the media base with a stored relative path. The stored value
    /// is never assumed to already be absolute.
    pub fn resolve(&self, stored: &str) -> String {
        if is_url(stored) {
            return stored.to_string();
        }
        format!(
            "{}/{}",
            self.media_base.trim_end_matches('/'),
            stored.trim_start_matches('/')
        )
    }
}

/// Classify one content item into a kind and rendering strategy.
///
/// The declared `content_type` tag wins for the broad category when
/// present and recognized; otherwise classification falls back to the
/// stored path/URL string.
pub fn classify(item: &ContentItem, paths: &MediaPaths) -> Classified {
    let source = item.source();

    match item.tag() {
        Some(tag) => classify_tagged(tag, source, paths),
        None => classify_untagged(source, paths),
    }
}

fn classify_tagged(tag: ContentTag, source: &str, paths: &MediaPaths) -> Classified {
    match tag {
        ContentTag::Text => Classified {
            kind: MediaKind::Text,
            strategy: RenderStrategy::InlineText,
        },
        ContentTag::Video => classify_video(source, paths),
        ContentTag::Image => Classified {
            kind: MediaKind::Image,
            strategy: RenderStrategy::InlineImage {
                url: resolve_upload(source, paths),
            },
        },
        ContentTag::Document => open_externally(MediaKind::Document, source),
        ContentTag::Spreadsheet => open_externally(MediaKind::Spreadsheet, source),
        ContentTag::Presentation => open_externally(MediaKind::Presentation, source),
        ContentTag::Pdf => Classified {
            kind: MediaKind::Pdf,
            strategy: RenderStrategy::EmbedFrame {
                url: resolve_upload(source, paths),
            },
        },
        ContentTag::Audio => Classified {
            kind: MediaKind::Audio,
            strategy: RenderStrategy::AudioPlayer {
                url: resolve_upload(source, paths),
            },
        },
        ContentTag::Webpage => Classified {
            kind: MediaKind::Webpage,
            strategy: RenderStrategy::EmbedFrame {
                url: source.to_string(),
            },
        },
        ContentTag::File => open_externally(MediaKind::File, source),
    }
}

/// Classification for legacy records identified only by path/extension.
fn classify_untagged(source: &str, paths: &MediaPaths) -> Classified {
    let lower = source.to_lowercase();

    let ext_is = |exts: &[&str]| exts.iter().any(|e| lower.ends_with(&format!(".{}", e)));

    if ext_is(&["doc", "docx"]) {
        open_externally(MediaKind::Document, source)
    } else if ext_is(&["xls", "xlsx", "csv"]) {
        open_externally(MediaKind::Spreadsheet, source)
    } else if ext_is(&["ppt", "pptx"]) {
        open_externally(MediaKind::Presentation, source)
    } else if ext_is(&["pdf"]) {
        Classified {
            kind: MediaKind::Pdf,
            strategy: RenderStrategy::EmbedFrame {
                url: resolve_upload(source, paths),
            },
        }
    } else if ext_is(&["jpg", "jpeg", "png", "gif", "bmp", "svg"]) {
        Classified {
            kind: MediaKind::Image,
            strategy: RenderStrategy::InlineImage {
                url: resolve_upload(source, paths),
            },
        }
    } else if ext_is(VIDEO_EXTENSIONS) {
        classify_video(source, paths)
    } else if ext_is(&["mp3", "wav", "ogg", "flac"]) {
        Classified {
            kind: MediaKind::Audio,
            strategy: RenderStrategy::AudioPlayer {
                url: resolve_upload(source, paths),
            },
        }
    } else if ext_is(&["htm", "html"]) {
        Classified {
            kind: MediaKind::Webpage,
            strategy: RenderStrategy::EmbedFrame {
                url: source.to_string(),
            },
        }
    } else if ext_is(&["txt"]) {
        Classified {
            kind: MediaKind::Text,
            strategy: RenderStrategy::InlineText,
        }
    } else {
        open_externally(MediaKind::File, source)
    }
}

/// Secondary classification within the `video` category.
fn classify_video(source: &str, paths: &MediaPaths) -> Classified {
    if let Some(embed) = youtube_embed_url(source) {
        return Classified {
            kind: MediaKind::Youtube,
            strategy: RenderStrategy::EmbedFrame { url: embed },
        };
    }

    if is_url(source) {
        return Classified {
            kind: MediaKind::ExternalVideo,
            strategy: RenderStrategy::VideoPlayer {
                url: source.to_string(),
            },
        };
    }

    let lower = source.to_lowercase();
    let local = UPLOAD_PREFIXES.iter().any(|p| lower.starts_with(p))
        || VIDEO_EXTENSIONS
            .iter()
            .any(|e| lower.ends_with(&format!(".{}", e)));

    if local {
        Classified {
            kind: MediaKind::LocalVideo,
            strategy: RenderStrategy::VideoPlayer {
                url: paths.resolve(source),
            },
        }
    } else {
        Classified {
            kind: MediaKind::ExternalVideo,
            strategy: RenderStrategy::VideoPlayer {
                url: source.to_string(),
            },
        }
    }
}

/// Derive an embeddable player URL from a YouTube watch/short/embed URL.
///
/// Returns `None` when the value is not a YouTube URL. The video id is
/// cut at the first `&`, `?`, `#` or `/` after it, so trailing query
/// parameters (`?t=5`, `&list=...`) never leak into the embed URL.
pub fn youtube_embed_url(source: &str) -> Option<String> {
    if !is_url(source) {
        return None;
    }

    // Already an embed URL: pass through with playback params appended.
    if source.contains("youtube.com/embed/") {
        let sep = if source.contains('?') { '&' } else { '?' };
        return Some(format!("{}{}rel=0", source, sep));
    }

    let id = if let Some(rest) = source.split("youtube.com/watch?v=").nth(1) {
        Some(rest)
    } else {
        source.split("youtu.be/").nth(1)
    }?;

    let id: String = id
        .chars()
        .take_while(|c| !matches!(c, '&' | '?' | '#' | '/'))
        .collect();

    if id.is_empty() {
        return None;
    }

    Some(format!("https://www.youtube.com/embed/{}", id))
}

fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn resolve_upload(source: &str, paths: &MediaPaths) -> String {
    let lower = source.to_lowercase();
    if UPLOAD_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        paths.resolve(source)
    } else {
        source.to_string()
    }
}

fn open_externally(kind: MediaKind, source: &str) -> Classified {
    Classified {
        kind,
        strategy: RenderStrategy::OpenExternally {
            target: source.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> MediaPaths {
        MediaPaths::new("http://lan-server:8001")
    }

    fn item(content_type: Option<&str>, source: &str) -> ContentItem {
        ContentItem {
            id: "c1".into(),
            title: "test".into(),
            content_type: content_type.map(Into::into),
            content_data: Some(source.into()),
            file_path: None,
            description: None,
            chapter_id: "ch1".into(),
        }
    }

    #[test]
    fn test_youtube_watch_url() {
        let c = classify(&item(Some("video"), "https://youtube.com/watch?v=abc123"), &paths());
        assert_eq!(c.kind, MediaKind::Youtube);
        assert_eq!(
            c.strategy,
            RenderStrategy::EmbedFrame {
                url: "https://www.youtube.com/embed/abc123".into()
            }
        );
    }

    #[test]
    fn test_youtube_short_url_strips_query() {
        let c = classify(&item(Some("video"), "https://youtu.be/abc123?t=5"), &paths());
        assert_eq!(c.kind, MediaKind::Youtube);
        match c.strategy {
            RenderStrategy::EmbedFrame { url } => {
                assert!(url.contains("embed/abc123"));
                assert!(!url.contains("t=5"));
            }
            other => panic!("expected embed frame, got {:?}", other),
        }
    }

    #[test]
    fn test_youtube_watch_url_strips_trailing_params() {
        let embed = youtube_embed_url("https://www.youtube.com/watch?v=xyz789&list=PL123").unwrap();
        assert_eq!(embed, "https://www.youtube.com/embed/xyz789");
    }

    #[test]
    fn test_youtube_embed_passthrough_appends_params() {
        let embed = youtube_embed_url("https://www.youtube.com/embed/abc123").unwrap();
        assert_eq!(embed, "https://www.youtube.com/embed/abc123?rel=0");
    }

    #[test]
    fn test_local_video_under_uploads() {
        let c = classify(&item(Some("video"), "/uploads/lesson1.mp4"), &paths());
        assert_eq!(c.kind, MediaKind::LocalVideo);
        assert_eq!(
            c.strategy,
            RenderStrategy::VideoPlayer {
                url: "http://lan-server:8001/uploads/lesson1.mp4".into()
            }
        );
    }

    #[test]
    fn test_local_video_by_extension() {
        let c = classify(&item(Some("video"), "videos/intro.WEBM"), &paths());
        assert_eq!(c.kind, MediaKind::LocalVideo);
    }

    #[test]
    fn test_external_video() {
        let c = classify(&item(Some("video"), "https://vimeo.com/12345"), &paths());
        assert_eq!(c.kind, MediaKind::ExternalVideo);
    }

    #[test]
    fn test_untagged_pdf_case_insensitive() {
        let c = classify(&item(None, "report.PDF"), &paths());
        assert_eq!(c.kind, MediaKind::Pdf);
    }

    #[test]
    fn test_untagged_extension_table() {
        let cases = [
            ("notes.docx", MediaKind::Document),
            ("grades.xlsx", MediaKind::Spreadsheet),
            ("slides.pptx", MediaKind::Presentation),
            ("diagram.png", MediaKind::Image),
            ("clip.mp4", MediaKind::LocalVideo),
            ("song.mp3", MediaKind::Audio),
            ("page.html", MediaKind::Webpage),
            ("readme.txt", MediaKind::Text),
        ];
        for (source, kind) in cases {
            assert_eq!(classify(&item(None, source), &paths()).kind, kind, "{}", source);
        }
    }

    #[test]
    fn test_unrecognized_degrades_to_file() {
        let c = classify(&item(None, "archive.xyz"), &paths());
        assert_eq!(c.kind, MediaKind::File);
        assert_eq!(
            c.strategy,
            RenderStrategy::OpenExternally {
                target: "archive.xyz".into()
            }
        );
    }

    #[test]
    fn test_unknown_tag_falls_back_to_path() {
        let c = classify(&item(Some("hologram"), "scan.pdf"), &paths());
        assert_eq!(c.kind, MediaKind::Pdf);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let i = item(Some("video"), "https://youtu.be/abc123?t=5");
        assert_eq!(classify(&i, &paths()), classify(&i, &paths()));
    }

    #[test]
    fn test_empty_source_is_file() {
        let c = classify(&item(None, ""), &paths());
        assert_eq!(c.kind, MediaKind::File);
    }

    #[test]
    fn test_tagged_text_is_inline() {
        let c = classify(&item(Some("text"), "Some lesson notes."), &paths());
        assert_eq!(c.kind, MediaKind::Text);
        assert_eq!(c.strategy, RenderStrategy::InlineText);
    }

    #[test]
    fn test_resolve_never_doubles_slashes() {
        let p = MediaPaths::new("http://host:8001/");
        assert_eq!(p.resolve("/uploads/a.mp4"), "http://host:8001/uploads/a.mp4");
        assert_eq!(p.resolve("uploads/a.mp4"), "http://host:8001/uploads/a.mp4");
    }
}
