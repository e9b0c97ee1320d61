use clap::{Parser, Subcommand};
use garmin_planner::cli::commands;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "garmin-planner")]
#[command(author, version, about = "Compile and upload training plans to Garmin Connect", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Profile to use
    #[arg(short, long, global = true, env = "GARMIN_PROFILE")]
    profile: Option<String>,

    /// Enable verbose diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Authentication commands
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Download recent activities as JSON files
    Download {
        /// Number of weeks to look back
        #[arg(short, long, default_value_t = 2)]
        weeks: u32,
        /// Output directory for JSON files
        #[arg(short, long, default_value = "garmin_activities")]
        output_dir: String,
    },
    /// Compile a plan file and upload its workouts
    Upload {
        /// Path to the plan text file
        plan_file: String,
        /// Number of weeks the plan covers
        #[arg(long, default_value_t = 2)]
        weeks: u32,
        /// First day of the plan (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        week_start: Option<String>,
        /// Build and validate without contacting Garmin Connect
        #[arg(long)]
        dry_run: bool,
        /// Write the structured workout set to this JSON file
        #[arg(long, value_name = "PATH")]
        save_structured: Option<String>,
        /// Retries per workout for transient errors
        #[arg(long, default_value_t = 3)]
        max_retries: u32,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Log in to Garmin Connect
    Login {
        /// Email address (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Log out and clear stored credentials
    Logout,
    /// Show authentication status
    Status,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "garmin_planner=debug"
    } else {
        "garmin_planner=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> garmin_planner::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Auth { command } => match command {
            AuthCommands::Login { email } => commands::login(email, cli.profile).await,
            AuthCommands::Logout => commands::logout(cli.profile).await,
            AuthCommands::Status => commands::status(cli.profile).await,
        },
        Commands::Download { weeks, output_dir } => {
            commands::download(weeks, output_dir, cli.profile).await
        }
        Commands::Upload {
            plan_file,
            weeks,
            week_start,
            dry_run,
            save_structured,
            max_retries,
        } => {
            commands::upload(commands::UploadArgs {
                plan_file,
                weeks,
                week_start,
                dry_run,
                save_structured,
                max_retries,
                profile: cli.profile,
            })
            .await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", garmin_planner::error::format_user_error(&e));
        std::process::exit(1);
    }

    Ok(())
}
