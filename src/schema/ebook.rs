use serde::{Deserialize, Serialize};

use super::options::{FocusSkill, GradeBand, GradeLevel, Language, Theme};
use super::{Printable, Selection};

/// Selections for a kids ebook pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbookInput {
    pub reading_level: GradeLevel,
    pub theme: Theme,
    pub focus_skill: FocusSkill,
    pub language: Language,
}

impl Default for EbookInput {
    fn default() -> Self {
        Self {
            reading_level: GradeLevel::Class4,
            theme: Theme::HeritageCulture,
            focus_skill: FocusSkill::LifeSkills,
            language: Language::Bilingual,
        }
    }
}

impl EbookInput {
    /// Chapter beats for this reading level. Early readers skip the puzzle
    /// chapter.
    pub fn chapter_beats(&self) -> &'static [&'static str] {
        match self.reading_level.band() {
            GradeBand::Early => &["spark", "journey", "home"],
            GradeBand::Upper => &["spark", "journey", "puzzle", "home"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub heading: String,
    pub summary: String,
    pub classroom_extension: String,
}

/// A generated printable book outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ebook {
    pub title: String,
    /// Back-cover blurb.
    pub description: String,
    pub chapters: Vec<Chapter>,
    pub printable_activity: String,
}

impl Selection for EbookInput {
    const SLOTS: &'static [&'static str] = &[
        "grade",
        "grade_number",
        "theme",
        "focus_skill",
        "language",
    ];

    fn kind(&self) -> &'static str {
        "ebook"
    }

    fn tags(&self) -> Vec<String> {
        vec![
            "kind:ebook".to_string(),
            self.reading_level.tag(),
            self.reading_level.band().tag().to_string(),
            self.theme.tag(),
            self.focus_skill.tag(),
            self.language.tag(),
        ]
    }

    fn slots(&self) -> Vec<(&'static str, String)> {
        vec![
            ("grade", self.reading_level.label().to_string()),
            ("grade_number", self.reading_level.number().to_string()),
            ("theme", self.theme.label().to_string()),
            ("focus_skill", self.focus_skill.label().to_string()),
            ("language", self.language.label().to_string()),
        ]
    }
}

impl Printable for Ebook {
    fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n\n{}\n", self.title, self.description);
        for (i, chapter) in self.chapters.iter().enumerate() {
            out.push_str(&format!(
                "\n## Chapter {}: {}\n\n{}\n\n**Classroom extension:** {}\n",
                i + 1,
                chapter.heading,
                chapter.summary,
                chapter.classroom_extension
            ));
        }
        out.push_str(&format!("\n## Printable add-on\n\n{}\n", self.printable_activity));
        out
    }

    fn to_share_text(&self) -> String {
        let mut out = format!("*{}*\n{}\n\n", self.title, self.description);
        for (i, chapter) in self.chapters.iter().enumerate() {
            out.push_str(&format!("{}. {}: {}\n", i + 1, chapter.heading, chapter.summary));
        }
        out.push_str(&format!("\n*Try at home*\n{}\n", self.printable_activity));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapter_beats_scale_with_level() {
        let mut input = EbookInput::default();
        assert_eq!(input.chapter_beats().len(), 4);
        input.reading_level = GradeLevel::Class2;
        assert_eq!(input.chapter_beats(), &["spark", "journey", "home"]);
    }

    #[test]
    fn slots_cover_declared_names() {
        let input = EbookInput::default();
        let names: Vec<&str> = input.slots().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, EbookInput::SLOTS);
    }

    #[test]
    fn reading_level_serializes_camel_case() {
        let json = serde_json::to_string(&EbookInput::default()).unwrap();
        assert!(json.contains("\"readingLevel\":\"Class 4\""));
        assert!(json.contains("\"focusSkill\":\"Life Skills\""));
    }

    #[test]
    fn share_text_lists_chapters() {
        let ebook = Ebook {
            title: "Grandma's Pottery Wheel".to_string(),
            description: "A clay adventure with Riya and her grandmother.".to_string(),
            chapters: vec![Chapter {
                heading: "Clay wakes up".to_string(),
                summary: "Riya meets the potter.".to_string(),
                classroom_extension: "Shape a diya.".to_string(),
            }],
            printable_activity: "Colour the pot pattern.".to_string(),
        };
        let text = ebook.to_share_text();
        assert!(text.starts_with("*Grandma's Pottery Wheel*\nA clay adventure"));
        assert!(text.contains("1. Clay wakes up: Riya meets the potter."));
        let md = ebook.to_markdown();
        assert!(md.contains("with Riya and her grandmother.\n\n## Chapter 1: Clay wakes up"));
    }
}
