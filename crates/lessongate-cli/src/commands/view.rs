use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use lessongate_core::{ContentCategory, DisplayOrder, Level, Section, ViewFilters};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OrderArg {
    /// Oldest release first
    Chronological,
    /// Newest release first
    Newest,
}

impl From<OrderArg> for DisplayOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Chronological => DisplayOrder::Chronological,
            OrderArg::Newest => DisplayOrder::NewestFirst,
        }
    }
}

#[derive(Args)]
pub struct ViewArgs {
    /// Learner ID
    pub learner_id: String,
    /// Evaluate at this instant instead of now (RFC 3339)
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
    /// Only show lessons in this category (immersion, bilingual)
    #[arg(long)]
    pub category: Option<ContentCategory>,
    /// Only show lessons at this level (beginner, intermediate)
    #[arg(long)]
    pub level: Option<Level>,
    /// Hide lessons the learner already completed
    #[arg(long)]
    pub hide_completed: bool,
    /// Display order
    #[arg(long, value_enum, default_value = "chronological")]
    pub order: OrderArg,
    /// Output the full view as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ViewArgs) -> Result<(), Box<dyn std::error::Error>> {
    let now = super::resolve_now(args.at);
    let view = super::with_engine(|engine, _| {
        Ok(engine.resolve_learning_view(&args.learner_id, now)?)
    })?;

    if args.json {
        return super::print_json(&view);
    }

    let access = &view.access;
    println!(
        "Learner: {}{}",
        view.learner_id,
        if view.profile_found { "" } else { " (guest)" }
    );
    println!(
        "Access: immersion={} bilingual={} translation={}",
        access.immersion, access.bilingual, access.translation_support
    );

    match &view.engagement {
        Section::Ready(summary) => println!(
            "Streak: {} week(s), {} this week, {:.1} per week",
            summary.current_streak,
            summary.this_week_completed_count,
            summary.weekly_completion_rate
        ),
        Section::Unavailable { reason } => println!("Streak: unavailable ({reason})"),
    }

    let progression = match &view.progression {
        Section::Ready(p) => p,
        Section::Unavailable { reason } => {
            println!("Lessons: unavailable ({reason})");
            return Ok(());
        }
    };

    let state = &progression.state;
    println!(
        "Unlocked: {} of {} (week {}, {} completed, next unlock in {} day(s))",
        state.available_lesson_count,
        state.current_catalog_week,
        state.weeks_since_join,
        state.total_completed,
        state.days_until_next_unlock
    );
    if let Some(next) = &progression.next_lesson_id {
        println!("Next: {next}");
    }

    let filters = ViewFilters {
        category: args.category,
        level: args.level,
        hide_completed: args.hide_completed,
    };
    let lessons = progression.lessons_for_display(&filters, args.order.into());
    if lessons.is_empty() {
        println!("No lessons to show.");
        return Ok(());
    }

    for lesson in &lessons {
        let week = lesson.week().map_or_else(|| "--".to_string(), |w| format!("{w:>2}"));
        let done = if progression.completed_lesson_ids.contains(&lesson.id) {
            "x"
        } else {
            " "
        };
        println!(
            "[{done}] {week}  {:<12} {:<12} {}  {}",
            lesson.category, lesson.level, lesson.id, lesson.title
        );
    }
    Ok(())
}
