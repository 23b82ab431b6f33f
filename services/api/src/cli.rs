use crate::commands::{
    run_filter_build, run_filter_parse, run_locations, FilterBuildArgs, FilterParseArgs,
    LocationsArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use imoveis_search::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Imoveis Search",
    about = "Serve and exercise the listing search location filter from the command line",
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
    /// Parse or build listing search query strings
    Filter {
        #[command(subcommand)]
        command: FilterCommand,
    },
    /// List states, or one state's cities and neighborhoods
    Locations(LocationsArgs),
}

#[derive(Subcommand, Debug)]
enum FilterCommand {
    /// Hydrate a filter from a query string and print it with its options
    Parse(FilterParseArgs),
    /// Apply selections through the cascade and print the search location
    Build(FilterBuildArgs),
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
        Command::Filter {
            command: FilterCommand::Parse(args),
        } => run_filter_parse(args),
        Command::Filter {
            command: FilterCommand::Build(args),
        } => run_filter_build(args),
        Command::Locations(args) => run_locations(args),
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
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["imoveis-search-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn build_accepts_repeated_selections() {
        let cli = Cli::try_parse_from([
            "imoveis-search-api",
            "filter",
            "build",
            "--state",
            "SP",
            "--city",
            "Campinas",
            "--city",
            "Santos",
            "--room",
            "2",
            "--min-price",
            "200000",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Filter {
                command: FilterCommand::Build(args),
            }) => {
                assert_eq!(args.state.as_deref(), Some("SP"));
                assert_eq!(args.cities, vec!["Campinas", "Santos"]);
                assert_eq!(args.rooms, vec!["2"]);
                assert_eq!(args.min_price, Some(200_000.0));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
