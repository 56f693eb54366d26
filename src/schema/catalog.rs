use serde::Serialize;

use super::ebook::EbookInput;
use super::lesson::LessonPlanInput;
use super::options::{
    Duration, FocusSkill, GradeLevel, Language, StorySetting, Subject, Theme,
};
use super::story::VisualStoryInput;

/// Every selectable value per field, plus the form defaults.
///
/// Serialized as JSON for form builders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionCatalog {
    pub grade_levels: Vec<&'static str>,
    pub subjects: Vec<&'static str>,
    pub themes: Vec<&'static str>,
    pub languages: Vec<&'static str>,
    pub durations: Vec<&'static str>,
    pub settings: Vec<&'static str>,
    pub focus_skills: Vec<&'static str>,
    pub defaults: CatalogDefaults,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDefaults {
    pub lesson: LessonPlanInput,
    pub story: VisualStoryInput,
    pub ebook: EbookInput,
}

impl OptionCatalog {
    pub fn current() -> Self {
        Self {
            grade_levels: GradeLevel::labels(),
            subjects: Subject::labels(),
            themes: Theme::labels(),
            languages: Language::labels(),
            durations: Duration::labels(),
            settings: StorySetting::labels(),
            focus_skills: FocusSkill::labels(),
            defaults: CatalogDefaults {
                lesson: LessonPlanInput::default(),
                story: VisualStoryInput::default(),
                ebook: EbookInput::default(),
            },
        }
    }
}
