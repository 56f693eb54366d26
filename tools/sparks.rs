/// Sparks: generate lesson sparks, visual stories and ebook packs from the
/// command line.
///
/// Usage: sparks [--format markdown|share|json] [--seed <n>]
///               [--variants <n>] [--content-dir <dir>] <command> [options]
///
/// Commands:
///   lesson  : lesson spark (grade, subject, theme, language, duration)
///   story   : visual story (theme, setting, language)
///   ebook   : kids ebook pack (reading level, theme, focus skill, language)
///   options : list every selectable value as JSON

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

use shiksha_sparks::core::pipeline::ContentEngine;
use shiksha_sparks::schema::catalog::OptionCatalog;
use shiksha_sparks::schema::ebook::EbookInput;
use shiksha_sparks::schema::lesson::LessonPlanInput;
use shiksha_sparks::schema::options::{
    Duration, FocusSkill, GradeLevel, Language, StorySetting, Subject, Theme,
};
use shiksha_sparks::schema::story::VisualStoryInput;
use shiksha_sparks::schema::Printable;

#[derive(Parser)]
#[command(name = "sparks", about = "Classroom content generator for primary teachers")]
struct Cli {
    /// Output format
    #[arg(long, value_enum, global = true, default_value = "markdown")]
    format: Format,
    /// Engine seed; change it for a fresh set of wordings
    #[arg(long, global = true, default_value_t = 0)]
    seed: u64,
    /// Number of variants to generate
    #[arg(long, global = true, default_value_t = 1)]
    variants: usize,
    /// Directory of `.ron` content packs merged over the built-in content
    #[arg(long, global = true, env = "SPARKS_CONTENT_DIR")]
    content_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Printable markdown
    Markdown,
    /// Compact message for chat apps
    Share,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a lesson spark
    Lesson {
        #[arg(long, default_value = "Class 3")]
        grade: GradeLevel,
        #[arg(long, default_value = "EVS")]
        subject: Subject,
        #[arg(long, default_value = "Nature & Seasons")]
        theme: Theme,
        #[arg(long, default_value = "Bilingual")]
        language: Language,
        #[arg(long, default_value = "45 min")]
        duration: Duration,
    },
    /// Generate a visual story
    Story {
        #[arg(long, default_value = "Local Heroes")]
        theme: Theme,
        #[arg(long, default_value = "Village")]
        setting: StorySetting,
        #[arg(long, default_value = "English")]
        language: Language,
    },
    /// Generate a kids ebook pack
    Ebook {
        #[arg(long, default_value = "Class 4")]
        reading_level: GradeLevel,
        #[arg(long, default_value = "Heritage & Culture")]
        theme: Theme,
        #[arg(long, default_value = "Life Skills")]
        focus_skill: FocusSkill,
        #[arg(long, default_value = "Bilingual")]
        language: Language,
    },
    /// List every selectable value and the form defaults
    Options,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Options = cli.command {
        let json = serde_json::to_string_pretty(&OptionCatalog::current())?;
        println!("{json}");
        return Ok(());
    }

    let mut builder = ContentEngine::builder().seed(cli.seed);
    if let Some(ref dir) = cli.content_dir {
        builder = builder.content_dir(dir);
    }
    let engine = builder.build().context("failed to build the content engine")?;

    match cli.command {
        Commands::Lesson {
            grade,
            subject,
            theme,
            language,
            duration,
        } => {
            let input = LessonPlanInput {
                grade,
                subject,
                theme,
                language,
                duration,
            };
            emit(&engine.lesson_plan_variants(&input, cli.variants), cli.format)
        }
        Commands::Story {
            theme,
            setting,
            language,
        } => {
            let input = VisualStoryInput {
                theme,
                setting,
                language,
            };
            emit(&engine.visual_story_variants(&input, cli.variants), cli.format)
        }
        Commands::Ebook {
            reading_level,
            theme,
            focus_skill,
            language,
        } => {
            let input = EbookInput {
                reading_level,
                theme,
                focus_skill,
                language,
            };
            emit(&engine.ebook_variants(&input, cli.variants), cli.format)
        }
        Commands::Options => Ok(()),
    }
}

fn emit<T: Printable + Serialize>(items: &[T], format: Format) -> anyhow::Result<()> {
    match format {
        Format::Json => {
            let json = if items.len() == 1 {
                serde_json::to_string_pretty(&items[0])?
            } else {
                serde_json::to_string_pretty(items)?
            };
            println!("{json}");
        }
        Format::Markdown => {
            let pages: Vec<String> = items.iter().map(Printable::to_markdown).collect();
            print!("{}", pages.join("\n---\n\n"));
        }
        Format::Share => {
            let pages: Vec<String> = items.iter().map(Printable::to_share_text).collect();
            print!("{}", pages.join("\n"));
        }
    }
    Ok(())
}
