use chrono::{DateTime, Utc};
use clap::Args;
use lessongate_core::Section;

#[derive(Args)]
pub struct StreakArgs {
    /// Learner ID
    pub learner_id: String,
    /// Evaluate at this instant instead of now (RFC 3339)
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: StreakArgs) -> Result<(), Box<dyn std::error::Error>> {
    let now = super::resolve_now(args.at);
    let view = super::with_engine(|engine, _| {
        Ok(engine.resolve_learning_view(&args.learner_id, now)?)
    })?;

    let summary = match view.engagement {
        Section::Ready(summary) => summary,
        Section::Unavailable { reason } => {
            return Err(format!("streak unavailable: {reason}").into())
        }
    };

    if args.json {
        return super::print_json(&summary);
    }
    println!("Current streak:   {} week(s)", summary.current_streak);
    println!("This week:        {}", summary.this_week_completed_count);
    println!("Weekly rate:      {:.1}", summary.weekly_completion_rate);
    Ok(())
}
