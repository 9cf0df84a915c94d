use crate::demo::{run_demo, run_salary_breakdown, DemoArgs, SalaryArgs};
use crate::server;
use avenant::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Avenant Workflow Service",
    about = "Run and demonstrate the contract amendment workflow from the command line",
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
    /// Compute gross and net salary from a base salary, primes and CNSS affiliation
    Salary(SalaryArgs),
    /// Run an end-to-end CLI demo covering amendments and salary advances
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
        Command::Salary(args) => run_salary_breakdown(args),
        Command::Demo(args) => run_demo(args),
    }
}
