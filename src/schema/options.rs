use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown {field} '{value}' (expected one of: {expected})")]
    Unknown {
        field: &'static str,
        value: String,
        expected: String,
    },
}

/// Declares a closed option set with a display label and a slug per value.
///
/// Labels are the values shown on the classroom forms ("Class 3",
/// "Nature & Seasons"); slugs feed selection tags (`grade:class_3`).
macro_rules! option_set {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal {
            $($variant:ident => ($label:literal, $slug:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Form label, e.g. as shown in a dropdown.
            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            pub fn slug(&self) -> &'static str {
                match self {
                    $(Self::$variant => $slug),+
                }
            }

            /// Returns the selection tag for this value (e.g. `"grade:class_3"`).
            pub fn tag(&self) -> String {
                format!("{}:{}", $field, self.slug())
            }

            pub fn field() -> &'static str {
                $field
            }

            pub fn labels() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.label()).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = OptionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| {
                        v.label().eq_ignore_ascii_case(wanted)
                            || v.slug().eq_ignore_ascii_case(wanted)
                    })
                    .ok_or_else(|| OptionError::Unknown {
                        field: $field,
                        value: s.to_string(),
                        expected: Self::labels().join(", "),
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = OptionError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.label().to_string()
            }
        }
    };
}

option_set! {
    /// Primary school class.
    GradeLevel, field = "grade" {
        Class1 => ("Class 1", "class_1"),
        Class2 => ("Class 2", "class_2"),
        Class3 => ("Class 3", "class_3"),
        Class4 => ("Class 4", "class_4"),
        Class5 => ("Class 5", "class_5"),
    }
}

option_set! {
    Subject, field = "subject" {
        Evs => ("EVS", "evs"),
        English => ("English", "english"),
        Math => ("Math", "math"),
        Hindi => ("Hindi", "hindi"),
        Art => ("Art", "art"),
    }
}

option_set! {
    /// Creative classroom theme shared by all three generators.
    Theme, field = "theme" {
        NatureSeasons => ("Nature & Seasons", "nature_seasons"),
        HeritageCulture => ("Heritage & Culture", "heritage_culture"),
        LocalHeroes => ("Local Heroes", "local_heroes"),
        WaterSustainability => ("Water & Sustainability", "water_sustainability"),
        FestivalsCelebrations => ("Festivals & Celebrations", "festivals_celebrations"),
        HealthyHabits => ("Healthy Habits", "healthy_habits"),
    }
}

option_set! {
    /// Language of facilitation.
    Language, field = "language" {
        English => ("English", "english"),
        Hindi => ("Hindi", "hindi"),
        Bilingual => ("Bilingual", "bilingual"),
    }
}

option_set! {
    /// Session length.
    Duration, field = "duration" {
        Min30 => ("30 min", "30"),
        Min45 => ("45 min", "45"),
        Min60 => ("60 min", "60"),
    }
}

option_set! {
    StorySetting, field = "setting" {
        Classroom => ("Classroom", "classroom"),
        Village => ("Village", "village"),
        City => ("City", "city"),
        NatureTrail => ("Nature Trail", "nature_trail"),
        Festival => ("Festival", "festival"),
    }
}

option_set! {
    FocusSkill, field = "skill" {
        Reading => ("Reading", "reading"),
        Vocabulary => ("Vocabulary", "vocabulary"),
        LifeSkills => ("Life Skills", "life_skills"),
        Steam => ("STEAM", "steam"),
    }
}

/// Coarse grade grouping used to scale content length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradeBand {
    /// Class 1 and 2.
    Early,
    /// Class 3 to 5.
    Upper,
}

impl GradeBand {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Early => "band:early",
            Self::Upper => "band:upper",
        }
    }
}

impl GradeLevel {
    pub fn number(&self) -> u8 {
        match self {
            Self::Class1 => 1,
            Self::Class2 => 2,
            Self::Class3 => 3,
            Self::Class4 => 4,
            Self::Class5 => 5,
        }
    }

    pub fn band(&self) -> GradeBand {
        if self.number() <= 2 {
            GradeBand::Early
        } else {
            GradeBand::Upper
        }
    }
}

/// Minute split of a session: warm up, main experience, closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSplit {
    pub warm_up: u32,
    pub main: u32,
    pub closing: u32,
}

impl Duration {
    pub fn minutes(&self) -> u32 {
        match self {
            Self::Min30 => 30,
            Self::Min45 => 45,
            Self::Min60 => 60,
        }
    }

    pub fn split(&self) -> SessionSplit {
        match self {
            Self::Min30 => SessionSplit {
                warm_up: 5,
                main: 20,
                closing: 5,
            },
            Self::Min45 => SessionSplit {
                warm_up: 10,
                main: 25,
                closing: 10,
            },
            Self::Min60 => SessionSplit {
                warm_up: 10,
                main: 35,
                closing: 15,
            },
        }
    }
}

/// Every tag a selection can carry. Used to flag typos in content packs.
pub fn all_tags() -> Vec<String> {
    let mut tags = Vec::new();
    tags.extend(GradeLevel::ALL.iter().map(|v| v.tag()));
    tags.extend(Subject::ALL.iter().map(|v| v.tag()));
    tags.extend(Theme::ALL.iter().map(|v| v.tag()));
    tags.extend(Language::ALL.iter().map(|v| v.tag()));
    tags.extend(Duration::ALL.iter().map(|v| v.tag()));
    tags.extend(StorySetting::ALL.iter().map(|v| v.tag()));
    tags.extend(FocusSkill::ALL.iter().map(|v| v.tag()));
    tags.push(GradeBand::Early.tag().to_string());
    tags.push(GradeBand::Upper.tag().to_string());
    for kind in ["lesson", "story", "ebook"] {
        tags.push(format!("kind:{kind}"));
    }
    tags
}
