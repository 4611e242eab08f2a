use crate::demo::{run_form, run_summary, FormArgs, SummaryArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use schein::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Schein Criteria Service",
    about = "Configure Schein criteria and evaluate students from the command line",
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
    /// Print the criterion form schema as JSON
    Form(FormArgs),
    /// Evaluate a course dataset against a set of criteria
    Summary(SummaryArgs),
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
        Command::Form(args) => run_form(args),
        Command::Summary(args) => run_summary(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["schein-api"]).expect("parses");

        assert!(cli.command.is_none());
    }

    #[test]
    fn summary_accepts_dataset_and_student() {
        let cli = Cli::try_parse_from([
            "schein-api",
            "summary",
            "--dataset",
            "course.json",
            "--student",
            "a1d5c9e0-3b6c-4c7a-8e0e-5e4f0b7c0401",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Summary(args)) => {
                assert_eq!(args.dataset, Some("course.json".into()));
                assert!(args.student.is_some());
                assert!(!args.json);
            }
            other => panic!("expected summary command, got {other:?}"),
        }
    }

    #[test]
    fn serve_overrides_are_parsed() {
        let cli =
            Cli::try_parse_from(["schein-api", "serve", "--port", "8081"]).expect("parses");

        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8081));
                assert!(args.host.is_none());
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }
}
