use std::path::PathBuf;

use clap::Subcommand;
use lessongate_core::{ContentCategory, Database, LessonKind, LessonRecord, Level, SupportLanguage};

#[derive(Subcommand)]
pub enum LessonAction {
    /// Add or replace a lesson
    Add {
        /// Lesson title
        title: String,
        /// Lesson ID (generated if omitted)
        #[arg(long)]
        id: Option<String>,
        /// Release week; omit for an evergreen lesson
        #[arg(long)]
        week: Option<u32>,
        #[arg(long)]
        category: ContentCategory,
        #[arg(long)]
        level: Level,
        #[arg(long, default_value = "english")]
        language: SupportLanguage,
        /// Publish immediately
        #[arg(long)]
        publish: bool,
    },
    /// List lessons
    List {
        /// Include unpublished lessons
        #[arg(long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Publish a lesson
    Publish {
        /// Lesson ID
        id: String,
    },
    /// Unpublish a lesson
    Unpublish {
        /// Lesson ID
        id: String,
    },
    /// Import lessons from a JSON array file
    Import {
        /// Path to the JSON file
        path: PathBuf,
    },
}

pub fn run(action: LessonAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        LessonAction::Add {
            title,
            id,
            week,
            category,
            level,
            language,
            publish,
        } => {
            let kind = match week {
                Some(w) => LessonKind::numbered(w)?,
                None => LessonKind::Evergreen,
            };
            let lesson = LessonRecord {
                id: id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                title,
                kind,
                category,
                level,
                language_support: language,
                published: publish,
            };
            db.upsert_lesson(&lesson)?;
            println!("Lesson saved: {}", lesson.id);
        }
        LessonAction::List { all, json } => {
            let lessons: Vec<LessonRecord> = db
                .list_all_lessons()?
                .into_iter()
                .filter(|l| all || l.published)
                .collect();
            if json {
                return super::print_json(&lessons);
            }
            if lessons.is_empty() {
                println!("No lessons.");
            }
            for lesson in &lessons {
                let week = lesson.week().map_or_else(|| "--".to_string(), |w| format!("{w:>2}"));
                let state = if lesson.published { "" } else { "  (draft)" };
                println!(
                    "{week}  {:<10} {:<12} {:<10} {}  {}{state}",
                    lesson.category, lesson.level, lesson.language_support, lesson.id, lesson.title
                );
            }
        }
        LessonAction::Publish { id } => set_published(&db, &id, true)?,
        LessonAction::Unpublish { id } => set_published(&db, &id, false)?,
        LessonAction::Import { path } => {
            let content = std::fs::read_to_string(&path)?;
            let lessons: Vec<LessonRecord> = serde_json::from_str(&content)?;
            for lesson in &lessons {
                if lesson.week() == Some(0) {
                    return Err(format!("lesson '{}' has week 0", lesson.id).into());
                }
            }
            let count = db.import_lessons(&lessons)?;
            println!("Imported {count} lesson(s) from {}", path.display());
        }
    }
    Ok(())
}

fn set_published(
    db: &Database,
    id: &str,
    published: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !db.set_lesson_published(id, published)? {
        return Err(format!("lesson not found: {id}").into());
    }
    println!("{} {id}", if published { "Published" } else { "Unpublished" });
    Ok(())
}
