use serde::{Deserialize, Serialize};

use super::options::{Duration, GradeLevel, Language, Subject, Theme};
use super::{Printable, Selection};

/// Selections for a lesson spark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlanInput {
    pub grade: GradeLevel,
    pub subject: Subject,
    pub theme: Theme,
    pub language: Language,
    pub duration: Duration,
}

impl Default for LessonPlanInput {
    fn default() -> Self {
        Self {
            grade: GradeLevel::Class3,
            subject: Subject::Evs,
            theme: Theme::NatureSeasons,
            language: Language::Bilingual,
            duration: Duration::Min45,
        }
    }
}

/// A generated lesson spark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlan {
    pub title: String,
    /// One-line summary shown under the title.
    pub overview: String,
    pub learning_goals: Vec<String>,
    pub warm_up: String,
    pub main_activity: String,
    pub assessment: String,
    pub take_home: String,
}

impl Selection for LessonPlanInput {
    const SLOTS: &'static [&'static str] = &[
        "grade",
        "grade_number",
        "subject",
        "theme",
        "language",
        "duration",
        "duration_minutes",
        "warm_up_minutes",
        "main_minutes",
        "closing_minutes",
    ];

    fn kind(&self) -> &'static str {
        "lesson"
    }

    fn tags(&self) -> Vec<String> {
        vec![
            "kind:lesson".to_string(),
            self.grade.tag(),
            self.grade.band().tag().to_string(),
            self.subject.tag(),
            self.theme.tag(),
            self.language.tag(),
            self.duration.tag(),
        ]
    }

    fn slots(&self) -> Vec<(&'static str, String)> {
        let split = self.duration.split();
        vec![
            ("grade", self.grade.label().to_string()),
            ("grade_number", self.grade.number().to_string()),
            ("subject", self.subject.label().to_string()),
            ("theme", self.theme.label().to_string()),
            ("language", self.language.label().to_string()),
            ("duration", self.duration.label().to_string()),
            ("duration_minutes", self.duration.minutes().to_string()),
            ("warm_up_minutes", split.warm_up.to_string()),
            ("main_minutes", split.main.to_string()),
            ("closing_minutes", split.closing.to_string()),
        ]
    }
}

impl Printable for LessonPlan {
    fn to_markdown(&self) -> String {
        let mut out = format!(
            "# {}\n\n{}\n\n## Learning goals\n\n",
            self.title, self.overview
        );
        for goal in &self.learning_goals {
            out.push_str(&format!("- {goal}\n"));
        }
        for (heading, body) in [
            ("Warm up", &self.warm_up),
            ("Main experience", &self.main_activity),
            ("Assessment", &self.assessment),
            ("Family connect", &self.take_home),
        ] {
            out.push_str(&format!("\n## {heading}\n\n{body}\n"));
        }
        out
    }

    fn to_share_text(&self) -> String {
        let mut out = format!("*{}*\n_{}_\n", self.title, self.overview);
        for goal in &self.learning_goals {
            out.push_str(&format!("• {goal}\n"));
        }
        out.push_str(&format!("\n*Family connect*\n{}\n", self.take_home));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> LessonPlan {
        LessonPlan {
            title: "Seasons Detectives".to_string(),
            overview: "A leafy walk through the seasons.".to_string(),
            learning_goals: vec!["Name two seasons.".to_string(), "Sort leaves.".to_string()],
            warm_up: "Sing the weather song.".to_string(),
            main_activity: "Leaf walk.".to_string(),
            assessment: "Thumbs up check.".to_string(),
            take_home: "Collect one leaf with family.".to_string(),
        }
    }

    #[test]
    fn default_matches_form_defaults() {
        let input = LessonPlanInput::default();
        assert_eq!(input.grade, GradeLevel::Class3);
        assert_eq!(input.subject, Subject::Evs);
        assert_eq!(input.duration, Duration::Min45);
    }

    #[test]
    fn slots_cover_declared_names() {
        let input = LessonPlanInput::default();
        let names: Vec<&str> = input.slots().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, LessonPlanInput::SLOTS);
    }

    #[test]
    fn tags_include_kind_and_band() {
        let tags = LessonPlanInput::default().tags();
        assert!(tags.contains(&"kind:lesson".to_string()));
        assert!(tags.contains(&"band:upper".to_string()));
        assert!(tags.contains(&"duration:45".to_string()));
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_string(&sample_plan()).unwrap();
        assert!(json.contains("\"learningGoals\""));
        assert!(json.contains("\"takeHome\""));

        let input: LessonPlanInput = serde_json::from_str(
            r#"{"grade":"Class 1","subject":"Math","theme":"Local Heroes","language":"Hindi","duration":"30 min"}"#,
        )
        .unwrap();
        assert_eq!(input.subject, Subject::Math);
    }

    #[test]
    fn markdown_has_all_sections() {
        let md = sample_plan().to_markdown();
        assert!(md.starts_with("# Seasons Detectives\n\nA leafy walk through the seasons."));
        assert!(md.contains("- Sort leaves."));
        assert!(md.contains("## Family connect"));
    }

    #[test]
    fn share_text_is_compact() {
        let text = sample_plan().to_share_text();
        assert!(text.starts_with("*Seasons Detectives*\n_A leafy walk through the seasons._"));
        assert!(text.contains("• Name two seasons."));
        assert!(!text.contains("Leaf walk."));
    }
}
