use crate::quote::{run_batch, run_quote, BatchArgs, QuoteArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use scope_pricing::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Scope Pricing Guard",
    about = "Price construction scopes of work with a deterministic floor",
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
    /// Price a single scope of work and print the reconciled result
    Quote(QuoteArgs),
    /// Price every row of a `trade,state,scope[,sqft]` CSV file
    Batch(BatchArgs),
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
        Command::Quote(args) => run_quote(args),
        Command::Batch(args) => run_batch(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn quote_arguments_parse() {
        let cli = Cli::try_parse_from([
            "scope-pricing",
            "quote",
            "--trade",
            "electric",
            "--state",
            "ny",
            "--scope",
            "Install 4 outlets",
            "--json",
        ])
        .expect("quote arguments parse");

        match cli.command {
            Some(Command::Quote(args)) => {
                assert_eq!(args.trade, scope_pricing::workflows::estimate::Trade::Electrical);
                assert_eq!(args.state, "ny");
                assert!(args.json);
            }
            other => panic!("expected quote command, got {other:?}"),
        }
    }

    #[test]
    fn unknown_trade_is_rejected_at_parse_time() {
        let result = Cli::try_parse_from([
            "scope-pricing",
            "quote",
            "--trade",
            "roofing",
            "--scope",
            "reshingle",
        ]);
        assert!(result.is_err());
    }
}
