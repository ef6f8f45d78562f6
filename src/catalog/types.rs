//! Wire types for the catalog hierarchy.
//!
//! These mirror the backend's JSON documents. All ids are opaque strings
//! minted server-side; the client never mutates catalog records.

use serde::{Deserialize, Serialize};

/// Signed-in user as returned by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
}

/// Top-level catalog node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Grade or level label (e.g. "5")
    #[serde(default)]
    pub grade: String,
}

/// Child of a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub class_id: String,
}

/// Child of a subject. `content` is the long-form lesson text, present
/// only in the detail response on some backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: Option<String>,
    pub subject_id: String,
}

/// Detail response for a single chapter: the chapter plus its ancestors
/// for breadcrumb display. Ancestors may be absent on older backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterDetail {
    pub chapter: Chapter,
    #[serde(default)]
    pub subject: Option<Subject>,
    #[serde(default)]
    pub class: Option<Class>,
}

/// A chapter detail merged with its attached content items.
///
/// The two pieces come from separate fetches; a failed content fetch
/// still yields a view with an empty `content` list.
#[derive(Debug, Clone)]
pub struct ChapterView {
    pub detail: ChapterDetail,
    pub content: Vec<crate::content::ContentItem>,
}

/// Credentials for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload for `POST /api/auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Response from login/signup: token plus the user it belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_detail_tolerates_missing_ancestors() {
        let json = r#"{
            "chapter": {
                "id": "ch1",
                "name": "Fractions",
                "description": "Intro",
                "subject_id": "s1"
            }
        }"#;

        let detail: ChapterDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.chapter.name, "Fractions");
        assert!(detail.subject.is_none());
        assert!(detail.class.is_none());
    }

    #[test]
    fn test_class_defaults() {
        let json = r#"{"id": "c1", "name": "Grade 5"}"#;
        let class: Class = serde_json::from_str(json).unwrap();
        assert_eq!(class.grade, "");
        assert_eq!(class.description, "");
    }
}
