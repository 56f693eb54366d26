//! Shiksha Sparks: classroom content generation for primary teachers.
//!
//! Composes lesson sparks, visual storyboards and printable ebook outlines
//! from a handful of classroom selections, using tag-guarded phrase tables
//! and string interpolation. Output is a deterministic function of the
//! selection and the engine seed.

use std::sync::OnceLock;

pub mod core;
pub mod schema;

use crate::core::pipeline::ContentEngine;
use crate::schema::ebook::{Ebook, EbookInput};
use crate::schema::lesson::{LessonPlan, LessonPlanInput};
use crate::schema::story::{VisualStory, VisualStoryInput};

static DEFAULT_ENGINE: OnceLock<ContentEngine> = OnceLock::new();

/// The built-in engine, built on first use.
///
/// If the built-in content ever failed to build, every field renders its
/// generic fallback text instead.
pub fn default_engine() -> &'static ContentEngine {
    DEFAULT_ENGINE.get_or_init(|| {
        ContentEngine::builtin().unwrap_or_else(|e| {
            tracing::error!(error = %e, "built-in content failed to load");
            ContentEngine::fallback_only()
        })
    })
}

/// Generate a lesson spark with the built-in content.
pub fn generate_lesson_plan(input: &LessonPlanInput) -> LessonPlan {
    default_engine().lesson_plan(input)
}

/// Generate a visual story with the built-in content.
pub fn generate_visual_story(input: &VisualStoryInput) -> VisualStory {
    default_engine().visual_story(input)
}

/// Generate an ebook pack with the built-in content.
pub fn generate_ebook(input: &EbookInput) -> Ebook {
    default_engine().ebook(input)
}
