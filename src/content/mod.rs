//! Content items attached to chapters, and their classification.
//!
//! A content item is a loosely-typed record: it may carry an explicit
//! `content_type` tag, a URL, a LAN path, or inline text. The classifier
//! in [`classify`] is the single authority that turns that into a concrete
//! media kind and rendering strategy.

pub mod classify;

use serde::{Deserialize, Serialize};

pub use classify::{classify, Classified, MediaKind, MediaPaths, RenderStrategy};

/// Declared content category, as stored by the backend.
///
/// Legacy items may omit the tag entirely and are classified by
/// extension instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentTag {
    Text,
    Video,
    Image,
    Document,
    Spreadsheet,
    Presentation,
    Pdf,
    Audio,
    Webpage,
    /// Generic fallback used by some backends for unknown uploads.
    File,
}

impl std::fmt::Display for ContentTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContentTag::Text => "text",
            ContentTag::Video => "video",
            ContentTag::Image => "image",
            ContentTag::Document => "document",
            ContentTag::Spreadsheet => "spreadsheet",
            ContentTag::Presentation => "presentation",
            ContentTag::Pdf => "pdf",
            ContentTag::Audio => "audio",
            ContentTag::Webpage => "webpage",
            ContentTag::File => "file",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ContentTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ContentTag::Text),
            "video" => Ok(ContentTag::Video),
            "image" => Ok(ContentTag::Image),
            "document" | "doc" => Ok(ContentTag::Document),
            "spreadsheet" => Ok(ContentTag::Spreadsheet),
            "presentation" => Ok(ContentTag::Presentation),
            "pdf" => Ok(ContentTag::Pdf),
            "audio" => Ok(ContentTag::Audio),
            "webpage" | "web" => Ok(ContentTag::Webpage),
            "file" => Ok(ContentTag::File),
            _ => anyhow::bail!("Unknown content type: {}", s),
        }
    }
}

/// Supplementary content attached to a chapter.
///
/// Backends disagree on the payload field name: newer ones store
/// `file_path`, older ones `content_data`. Both are kept and
/// [`ContentItem::source`] returns whichever is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,

    pub title: String,

    /// Declared category. Absent on legacy records; unknown strings are
    /// preserved so classification can fall back to the path.
    #[serde(default)]
    pub content_type: Option<String>,

    /// Inline text or a URL (older backends).
    #[serde(default)]
    pub content_data: Option<String>,

    /// LAN path or URL (newer backends).
    #[serde(default)]
    pub file_path: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    pub chapter_id: String,
}

impl ContentItem {
    /// The raw payload string, whichever field the backend used.
    pub fn source(&self) -> &str {
        self.content_data
            .as_deref()
            .or(self.file_path.as_deref())
            .unwrap_or("")
    }

    /// Parsed declared tag, if the record carries a recognized one.
    pub fn tag(&self) -> Option<ContentTag> {
        self.content_type.as_deref()?.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        assert_eq!("video".parse::<ContentTag>().unwrap(), ContentTag::Video);
        assert_eq!("PDF".parse::<ContentTag>().unwrap(), ContentTag::Pdf);
        assert_eq!("webpage".parse::<ContentTag>().unwrap(), ContentTag::Webpage);
        assert!("hologram".parse::<ContentTag>().is_err());
    }

    #[test]
    fn test_source_prefers_content_data() {
        let item = ContentItem {
            id: "1".into(),
            title: "t".into(),
            content_type: None,
            content_data: Some("inline".into()),
            file_path: Some("/uploads/a.pdf".into()),
            description: None,
            chapter_id: "c".into(),
        };
        assert_eq!(item.source(), "inline");
    }

    #[test]
    fn test_unknown_tag_is_none_not_error() {
        let item = ContentItem {
            id: "1".into(),
            title: "t".into(),
            content_type: Some("hologram".into()),
            content_data: None,
            file_path: Some("x.bin".into()),
            description: None,
            chapter_id: "c".into(),
        };
        assert!(item.tag().is_none());
    }
}
