//! Catalog hierarchy: wire types and the selection navigator.

pub mod navigator;
pub mod types;

pub use navigator::{Applied, FetchOutcome, FetchRequest, FetchTarget, NavState, Navigator};
pub use types::{
    AuthResponse, Chapter, ChapterDetail, ChapterView, Class, LoginRequest, SignupRequest,
    Subject, User,
};
