use chrono::{DateTime, Utc};
use clap::Args;
use lessongate_core::CompletionOutcome;

#[derive(Args)]
pub struct CompleteArgs {
    /// Learner ID
    pub learner_id: String,
    /// Lesson ID
    pub lesson_id: String,
    /// Score from 0 to 100
    #[arg(long)]
    pub score: u32,
    /// Record the completion at this instant instead of now (RFC 3339)
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

pub fn run(args: CompleteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let now = super::resolve_now(args.at);
    let outcome = super::with_engine(|engine, _| {
        Ok(engine.mark_lesson_complete(&args.learner_id, &args.lesson_id, args.score, now)?)
    })?;

    match outcome {
        CompletionOutcome::Recorded { total_completed } => {
            println!("Completed {} ({total_completed} total)", args.lesson_id);
        }
        CompletionOutcome::AlreadyCompleted { total_completed } => {
            println!("Already completed {} ({total_completed} total)", args.lesson_id);
        }
        CompletionOutcome::Locked => {
            let message = format!("lesson '{}' is locked for {}", args.lesson_id, args.learner_id);
            return Err(message.into());
        }
        CompletionOutcome::UnknownLesson => {
            return Err(format!("unknown lesson: {}", args.lesson_id).into());
        }
    }
    Ok(())
}
