use crate::commands::{run_dashboard, run_records, run_submit, RecordsArgs, SubmitArgs};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use coaching_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Coaching Feedback Evaluator",
    about = "Rate supervisor coaching feedback, record submissions and build trend dashboards",
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
    /// Run the evaluation pipeline once for a JSON form
    Submit(SubmitArgs),
    /// List recorded submissions
    Records(RecordsArgs),
    /// Regenerate the per-employee trend dashboard
    Dashboard,
    /// Run an offline demo with a scripted model and in-memory sheets
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
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Submit(args) => run_submit(args).await,
        Command::Records(args) => run_records(args),
        Command::Dashboard => run_dashboard().await,
        Command::Demo(args) => run_demo(args).await,
    }
}
