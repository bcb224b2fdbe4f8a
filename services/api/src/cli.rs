use crate::demo::{run_accelerate, run_demo, run_plan, AccelerateArgs, DemoArgs, PlanArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use debtclear::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "DebtClear",
    about = "Compare debt payoff strategies and explain the recommended order",
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
    /// Build a payoff plan for debts listed in a CSV file
    Plan(PlanArgs),
    /// Measure the effect of a one-off extra payment
    Accelerate(AccelerateArgs),
    /// Print a plan for a built-in sample portfolio
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
        Command::Plan(args) => run_plan(args),
        Command::Accelerate(args) => run_accelerate(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn plan_arguments_parse() {
        let cli = Cli::try_parse_from([
            "debtclear",
            "plan",
            "--debts",
            "debts.csv",
            "--budget",
            "450",
            "--start-date",
            "2025-01-01",
            "--json",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Plan(args)) => {
                assert_eq!(args.budget, 450.0);
                assert!(args.json);
                assert!(!args.full_history);
                assert!(args.start_date.is_some());
            }
            other => panic!("expected plan command, got {other:?}"),
        }
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["debtclear"]).expect("no arguments parse");
        assert!(cli.command.is_none());
    }
}
