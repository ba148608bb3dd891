use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "lessongate", version, about = "Lessongate CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what a learner can see right now
    View(commands::view::ViewArgs),
    /// Mark a lesson complete for a learner
    Complete(commands::complete::CompleteArgs),
    /// Show a learner's weekly streak
    Streak(commands::streak::StreakArgs),
    /// Learner profile management
    Learner {
        #[command(subcommand)]
        action: commands::learner::LearnerAction,
    },
    /// Lesson catalog management
    Lesson {
        #[command(subcommand)]
        action: commands::lesson::LessonAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("LESSONGATE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::View(args) => commands::view::run(args),
        Commands::Complete(args) => commands::complete::run(args),
        Commands::Streak(args) => commands::streak::run(args),
        Commands::Learner { action } => commands::learner::run(action),
        Commands::Lesson { action } => commands::lesson::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "lessongate",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
