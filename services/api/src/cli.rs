use crate::demo::{run_demo, run_recalculate, run_score, DemoArgs, RecalculateArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credence::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Credence",
    about = "Serve and operate the freelancer credibility scoring service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a JSON file of verified work without touching any store
    Score(ScoreArgs),
    /// Recalculate one freelancer's score from a work history id against the database
    Recalculate(RecalculateArgs),
    /// Walk through submissions, decisions, and score updates on an in-memory store
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override DATABASE_URL; without either, scores live in memory
    #[arg(long)]
    pub(crate) database_url: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Recalculate(args) => run_recalculate(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
