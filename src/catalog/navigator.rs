//! Selection state machine for the Class → Subject → Chapter catalog.
//!
//! The navigator is a pure store: transitions mutate selection state and
//! return a [`FetchRequest`] describing the one follow-up fetch the caller
//! must perform. Fetch results come back through [`Navigator::apply`],
//! which commits them only if they still match the current selection —
//! a late response for an abandoned selection is discarded, never allowed
//! to overwrite newer state.

use tracing::{debug, warn};

use super::types::{Chapter, ChapterView, Class, Subject};

/// Coarse navigation state, derived from the selection chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    NoSelection,
    ClassSelected,
    SubjectSelected,
    ChapterSelected,
}

/// What a transition asks the caller to fetch next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTarget {
    /// Top-level class list.
    Classes,
    /// Subjects of the given class.
    Subjects { class_id: String },
    /// Chapters of the given subject.
    Chapters { subject_id: String },
    /// Detail plus attached content for the given chapter.
    ChapterView { chapter_id: String },
}

/// A pending fetch, stamped with the generation it was issued under.
///
/// The generation changes on wholesale resets (logout), so a reset
/// invalidates every fetch in flight regardless of target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub target: FetchTarget,
}

/// A fetch result handed back to the navigator.
#[derive(Debug)]
pub enum FetchOutcome {
    Classes(Vec<Class>),
    Subjects(Vec<Subject>),
    Chapters(Vec<Chapter>),
    ChapterView(ChapterView),
    /// Non-fatal failure; prior state is kept.
    Failed(String),
}

/// What `apply` did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Result committed to state.
    Committed,
    /// Result arrived for a superseded selection and was dropped.
    Stale,
    /// Fetch failed; previous state kept, notice recorded.
    Failed,
}

/// The catalog navigator. Exclusively owns the selection chain and the
/// fetched children at each level.
#[derive(Debug, Default)]
pub struct Navigator {
    generation: u64,

    selected_class: Option<Class>,
    selected_subject: Option<Subject>,
    selected_chapter: Option<Chapter>,

    classes: Vec<Class>,
    subjects: Vec<Subject>,
    chapters: Vec<Chapter>,
    chapter_view: Option<ChapterView>,

    /// Last non-fatal fetch error, for display. Cleared on the next
    /// successful commit.
    notice: Option<String>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NavState {
        if self.selected_chapter.is_some() {
            NavState::ChapterSelected
        } else if self.selected_subject.is_some() {
            NavState::SubjectSelected
        } else if self.selected_class.is_some() {
            NavState::ClassSelected
        } else {
            NavState::NoSelection
        }
    }

    pub fn selected_class(&self) -> Option<&Class> {
        self.selected_class.as_ref()
    }

    pub fn selected_subject(&self) -> Option<&Subject> {
        self.selected_subject.as_ref()
    }

    pub fn selected_chapter(&self) -> Option<&Chapter> {
        self.selected_chapter.as_ref()
    }

    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter_view(&self) -> Option<&ChapterView> {
        self.chapter_view.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Request the top-level class list.
    pub fn load_classes(&self) -> FetchRequest {
        FetchRequest {
            generation: self.generation,
            target: FetchTarget::Classes,
        }
    }

    /// Select a class. Always clears subject/chapter selection and their
    /// children lists, even when re-selecting the same class — stale
    /// downstream data is never kept.
    pub fn select_class(&mut self, class: Class) -> FetchRequest {
        let class_id = class.id.clone();
        self.selected_class = Some(class);
        self.selected_subject = None;
        self.selected_chapter = None;
        self.subjects.clear();
        self.chapters.clear();
        self.chapter_view = None;

        debug!(%class_id, "class selected");
        FetchRequest {
            generation: self.generation,
            target: FetchTarget::Subjects { class_id },
        }
    }

    /// Select a subject. Clears only chapter-level state.
    pub fn select_subject(&mut self, subject: Subject) -> FetchRequest {
        let subject_id = subject.id.clone();
        self.selected_subject = Some(subject);
        self.selected_chapter = None;
        self.chapters.clear();
        self.chapter_view = None;

        debug!(%subject_id, "subject selected");
        FetchRequest {
            generation: self.generation,
            target: FetchTarget::Chapters { subject_id },
        }
    }

    /// Select a chapter. Clears only the chapter detail view.
    pub fn select_chapter(&mut self, chapter: Chapter) -> FetchRequest {
        let chapter_id = chapter.id.clone();
        self.selected_chapter = Some(chapter);
        self.chapter_view = None;

        debug!(%chapter_id, "chapter selected");
        FetchRequest {
            generation: self.generation,
            target: FetchTarget::ChapterView { chapter_id },
        }
    }

    /// Wholesale reset (logout). Bumps the generation so every in-flight
    /// fetch is invalidated: the state-clearing action wins the race.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.selected_class = None;
        self.selected_subject = None;
        self.selected_chapter = None;
        self.classes.clear();
        self.subjects.clear();
        self.chapters.clear();
        self.chapter_view = None;
        self.notice = None;
        debug!(generation = self.generation, "navigator reset");
    }

    /// Commit a fetch result, unless it is stale.
    ///
    /// A result is stale when its generation no longer matches (a reset
    /// happened after it was issued) or when its target id no longer
    /// matches the current selection at that level (the selection was
    /// superseded while the fetch was in flight).
    pub fn apply(&mut self, request: &FetchRequest, outcome: FetchOutcome) -> Applied {
        if request.generation != self.generation {
            warn!(?request.target, "discarding fetch result from before a reset");
            return Applied::Stale;
        }

        if !self.matches_selection(&request.target) {
            warn!(?request.target, "discarding fetch result for superseded selection");
            return Applied::Stale;
        }

        match outcome {
            FetchOutcome::Failed(message) => {
                warn!(?request.target, %message, "fetch failed; keeping previous state");
                self.notice = Some(message);
                return Applied::Failed;
            }
            FetchOutcome::Classes(classes) => self.classes = classes,
            FetchOutcome::Subjects(subjects) => self.subjects = subjects,
            FetchOutcome::Chapters(chapters) => self.chapters = chapters,
            FetchOutcome::ChapterView(view) => self.chapter_view = Some(view),
        }
        self.notice = None;
        Applied::Committed
    }

    /// Whether a fetch target still corresponds to the current selection.
    fn matches_selection(&self, target: &FetchTarget) -> bool {
        match target {
            FetchTarget::Classes => true,
            FetchTarget::Subjects { class_id } => self
                .selected_class
                .as_ref()
                .is_some_and(|c| &c.id == class_id),
            FetchTarget::Chapters { subject_id } => self
                .selected_subject
                .as_ref()
                .is_some_and(|s| &s.id == subject_id),
            FetchTarget::ChapterView { chapter_id } => self
                .selected_chapter
                .as_ref()
                .is_some_and(|c| &c.id == chapter_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::ChapterDetail;

    fn class(id: &str) -> Class {
        Class {
            id: id.into(),
            name: format!("Class {}", id),
            description: String::new(),
            grade: String::new(),
        }
    }

    fn subject(id: &str, class_id: &str) -> Subject {
        Subject {
            id: id.into(),
            name: format!("Subject {}", id),
            description: String::new(),
            class_id: class_id.into(),
        }
    }

    fn chapter(id: &str, subject_id: &str) -> Chapter {
        Chapter {
            id: id.into(),
            name: format!("Chapter {}", id),
            description: String::new(),
            content: None,
            subject_id: subject_id.into(),
        }
    }

    fn view(chapter_id: &str) -> ChapterView {
        ChapterView {
            detail: ChapterDetail {
                chapter: chapter(chapter_id, "s1"),
                subject: None,
                class: None,
            },
            content: Vec::new(),
        }
    }

    #[test]
    fn test_select_class_cascades_reset() {
        let mut nav = Navigator::new();

        let req = nav.select_class(class("c1"));
        assert_eq!(nav.apply(&req, FetchOutcome::Subjects(vec![subject("s1", "c1")])), Applied::Committed);

        let req = nav.select_subject(subject("s1", "c1"));
        assert_eq!(nav.apply(&req, FetchOutcome::Chapters(vec![chapter("ch1", "s1")])), Applied::Committed);

        let req = nav.select_chapter(chapter("ch1", "s1"));
        assert_eq!(nav.apply(&req, FetchOutcome::ChapterView(view("ch1"))), Applied::Committed);
        assert_eq!(nav.state(), NavState::ChapterSelected);

        // Reselecting a class drops everything below it.
        nav.select_class(class("c2"));
        assert_eq!(nav.state(), NavState::ClassSelected);
        assert!(nav.selected_subject().is_none());
        assert!(nav.selected_chapter().is_none());
        assert!(nav.subjects().is_empty());
        assert!(nav.chapters().is_empty());
        assert!(nav.chapter_view().is_none());
    }

    #[test]
    fn test_reselecting_same_class_still_resets() {
        let mut nav = Navigator::new();

        let req = nav.select_class(class("c1"));
        nav.apply(&req, FetchOutcome::Subjects(vec![subject("s1", "c1")]));
        let req = nav.select_subject(subject("s1", "c1"));
        nav.apply(&req, FetchOutcome::Chapters(vec![chapter("ch1", "s1")]));

        // Same class again: reset, not no-op.
        let req = nav.select_class(class("c1"));
        assert!(nav.selected_subject().is_none());
        assert!(nav.selected_chapter().is_none());
        assert!(nav.subjects().is_empty());
        assert!(nav.chapters().is_empty());
        assert_eq!(req.target, FetchTarget::Subjects { class_id: "c1".into() });
    }

    #[test]
    fn test_select_subject_keeps_class_level() {
        let mut nav = Navigator::new();
        let req = nav.select_class(class("c1"));
        nav.apply(&req, FetchOutcome::Subjects(vec![subject("s1", "c1"), subject("s2", "c1")]));

        nav.select_subject(subject("s1", "c1"));
        assert_eq!(nav.subjects().len(), 2);
        assert!(nav.selected_class().is_some());
    }

    #[test]
    fn test_stale_chapter_fetch_is_discarded() {
        let mut nav = Navigator::new();
        nav.select_class(class("c1"));
        nav.select_subject(subject("s1", "c1"));

        let req_x = nav.select_chapter(chapter("x", "s1"));
        // Selection moves on before X's fetch resolves.
        let req_y = nav.select_chapter(chapter("y", "s1"));

        assert_eq!(nav.apply(&req_x, FetchOutcome::ChapterView(view("x"))), Applied::Stale);
        assert!(nav.chapter_view().is_none());

        assert_eq!(nav.apply(&req_y, FetchOutcome::ChapterView(view("y"))), Applied::Committed);
        assert_eq!(nav.chapter_view().unwrap().detail.chapter.id, "y");
    }

    #[test]
    fn test_stale_subject_fetch_is_discarded() {
        let mut nav = Navigator::new();
        let req_a = nav.select_class(class("a"));
        let req_b = nav.select_class(class("b"));

        assert_eq!(nav.apply(&req_a, FetchOutcome::Subjects(vec![subject("s1", "a")])), Applied::Stale);
        assert!(nav.subjects().is_empty());

        assert_eq!(nav.apply(&req_b, FetchOutcome::Subjects(vec![subject("s2", "b")])), Applied::Committed);
        assert_eq!(nav.subjects()[0].id, "s2");
    }

    #[test]
    fn test_reset_invalidates_in_flight_class_fetch() {
        let mut nav = Navigator::new();
        let req = nav.load_classes();

        // Logout happens while the fetch is in flight.
        nav.reset();

        assert_eq!(nav.apply(&req, FetchOutcome::Classes(vec![class("c1")])), Applied::Stale);
        assert!(nav.classes().is_empty());
    }

    #[test]
    fn test_failed_fetch_keeps_previous_state() {
        let mut nav = Navigator::new();
        let req = nav.select_class(class("c1"));
        nav.apply(&req, FetchOutcome::Subjects(vec![subject("s1", "c1")]));

        // A refetch of the same level fails; the old list survives.
        let retry = FetchRequest {
            generation: req.generation,
            target: FetchTarget::Subjects { class_id: "c1".into() },
        };
        assert_eq!(
            nav.apply(&retry, FetchOutcome::Failed("connection refused".into())),
            Applied::Failed
        );
        assert_eq!(nav.subjects().len(), 1);
        assert!(nav.selected_class().is_some());
        assert_eq!(nav.notice(), Some("connection refused"));
    }

    #[test]
    fn test_notice_cleared_on_next_commit() {
        let mut nav = Navigator::new();
        let req = nav.load_classes();
        nav.apply(&req, FetchOutcome::Failed("timeout".into()));
        assert!(nav.notice().is_some());

        nav.apply(&req, FetchOutcome::Classes(vec![class("c1")]));
        assert!(nav.notice().is_none());
    }

    #[test]
    fn test_state_derivation() {
        let mut nav = Navigator::new();
        assert_eq!(nav.state(), NavState::NoSelection);
        nav.select_class(class("c1"));
        assert_eq!(nav.state(), NavState::ClassSelected);
        nav.select_subject(subject("s1", "c1"));
        assert_eq!(nav.state(), NavState::SubjectSelected);
        nav.select_chapter(chapter("ch1", "s1"));
        assert_eq!(nav.state(), NavState::ChapterSelected);
        nav.reset();
        assert_eq!(nav.state(), NavState::NoSelection);
    }
}
