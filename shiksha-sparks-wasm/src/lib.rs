//! WASM bindings for shiksha-sparks. Powers the browser classroom studio.

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use shiksha_sparks::core::phrasebook::PhraseBook;
use shiksha_sparks::core::pipeline::ContentEngine;
use shiksha_sparks::schema::catalog::OptionCatalog;
use shiksha_sparks::schema::ebook::EbookInput;
use shiksha_sparks::schema::lesson::LessonPlanInput;
use shiksha_sparks::schema::story::VisualStoryInput;
use shiksha_sparks::schema::Printable;

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StudioInfo {
    seed: u64,
    rule_count: usize,
}

/// Generated record plus its print and share renderings.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Rendered<'a, T: Serialize> {
    content: &'a T,
    markdown: String,
    share_text: String,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------
fn parse_input<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {what} JSON: {e}"))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {e}"))
}

fn render<T: Serialize + Printable>(content: &T) -> Result<String, String> {
    to_json(&Rendered {
        content,
        markdown: content.to_markdown(),
        share_text: content.to_share_text(),
    })
}

fn build_engine(seed: u64, pack_ron: Option<&str>) -> Result<ContentEngine, String> {
    let mut builder = ContentEngine::builder().seed(seed);
    if let Some(src) = pack_ron {
        let pack = PhraseBook::parse_ron(src).map_err(|e| format!("Pack parse error: {e}"))?;
        builder = builder.with_phrasebook(pack);
    }
    builder
        .build()
        .map_err(|e| format!("Engine build error: {e}"))
}

fn js(message: String) -> JsError {
    JsError::new(&message)
}

// ---------------------------------------------------------------------------
// SparksStudio: the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct SparksStudio {
    engine: ContentEngine,
}

#[wasm_bindgen]
impl SparksStudio {
    /// Create a studio with the built-in content and the given seed.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<SparksStudio, JsError> {
        let engine = build_engine(seed, None).map_err(js)?;
        Ok(SparksStudio { engine })
    }

    /// Create a studio with a school's own RON pack merged over the
    /// built-in content.
    #[wasm_bindgen(js_name = withPack)]
    pub fn with_pack(seed: u64, pack_ron: &str) -> Result<SparksStudio, JsError> {
        let engine = build_engine(seed, Some(pack_ron)).map_err(js)?;
        Ok(SparksStudio { engine })
    }

    /// Generate a lesson spark from a JSON selection.
    ///
    /// Expected JSON shape:
    /// ```json
    /// {
    ///   "grade": "Class 3",
    ///   "subject": "EVS",
    ///   "theme": "Nature & Seasons",
    ///   "language": "Bilingual",
    ///   "duration": "45 min"
    /// }
    /// ```
    /// Returns `{ content, markdown, shareText }`.
    #[wasm_bindgen(js_name = lessonPlan)]
    pub fn lesson_plan(&self, input_json: &str) -> Result<String, JsError> {
        let input: LessonPlanInput = parse_input(input_json, "lesson").map_err(js)?;
        render(&self.engine.lesson_plan(&input)).map_err(js)
    }

    /// Generate a visual story from `{ theme, setting, language }`.
    #[wasm_bindgen(js_name = visualStory)]
    pub fn visual_story(&self, input_json: &str) -> Result<String, JsError> {
        let input: VisualStoryInput = parse_input(input_json, "story").map_err(js)?;
        render(&self.engine.visual_story(&input)).map_err(js)
    }

    /// Generate an ebook pack from
    /// `{ readingLevel, theme, focusSkill, language }`.
    pub fn ebook(&self, input_json: &str) -> Result<String, JsError> {
        let input: EbookInput = parse_input(input_json, "ebook").map_err(js)?;
        render(&self.engine.ebook(&input)).map_err(js)
    }

    /// Generate several lesson sparks. Returns a JSON array of records.
    #[wasm_bindgen(js_name = lessonPlanVariants)]
    pub fn lesson_plan_variants(&self, input_json: &str, count: usize) -> Result<String, JsError> {
        let input: LessonPlanInput = parse_input(input_json, "lesson").map_err(js)?;
        to_json(&self.engine.lesson_plan_variants(&input, count)).map_err(js)
    }

    #[wasm_bindgen(js_name = visualStoryVariants)]
    pub fn visual_story_variants(&self, input_json: &str, count: usize) -> Result<String, JsError> {
        let input: VisualStoryInput = parse_input(input_json, "story").map_err(js)?;
        to_json(&self.engine.visual_story_variants(&input, count)).map_err(js)
    }

    #[wasm_bindgen(js_name = ebookVariants)]
    pub fn ebook_variants(&self, input_json: &str, count: usize) -> Result<String, JsError> {
        let input: EbookInput = parse_input(input_json, "ebook").map_err(js)?;
        to_json(&self.engine.ebook_variants(&input, count)).map_err(js)
    }

    /// Every selectable value and the form defaults, as JSON.
    pub fn options() -> Result<String, JsError> {
        to_json(&OptionCatalog::current()).map_err(js)
    }

    /// Seed and rule count of this studio, as JSON.
    pub fn info(&self) -> Result<String, JsError> {
        to_json(&StudioInfo {
            seed: self.engine.seed(),
            rule_count: self.engine.phrasebook().rules.len(),
        })
        .map_err(js)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_both_renderings() {
        let engine = build_engine(3, None).unwrap();
        let input: LessonPlanInput = parse_input(
            r#"{"grade":"Class 2","subject":"Art","theme":"Healthy Habits","language":"English","duration":"30 min"}"#,
            "lesson",
        )
        .unwrap();
        let json = render(&engine.lesson_plan(&input)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["content"]["learningGoals"].as_array().unwrap().len() == 3);
        assert!(value["markdown"].as_str().unwrap().starts_with("# "));
        assert!(value["shareText"].as_str().unwrap().starts_with('*'));
    }

    #[test]
    fn bad_selection_is_reported() {
        let err = parse_input::<VisualStoryInput>(
            r#"{"theme":"Space","setting":"City","language":"English"}"#,
            "story",
        )
        .unwrap_err();
        assert!(err.starts_with("Invalid story JSON"));
        assert!(err.contains("Space"));
    }

    #[test]
    fn pack_overrides_builtin_title() {
        let pack = r#"{ "story_title": [Rule(alternatives: [(weight: 1, text: "Our {setting} Tale")])] }"#;
        let engine = build_engine(0, Some(pack)).unwrap();
        let story = engine.visual_story(&VisualStoryInput::default());
        assert_eq!(story.title, "Our Village Tale");
        assert!(build_engine(0, Some("not ron")).is_err());
    }
}
