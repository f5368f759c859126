use crate::demo::{run_demo, run_import_reviews, DemoArgs, ImportReviewsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use club_licensing::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Club Licensing Review",
    about = "Run and demonstrate the football club licensing review service",
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
    /// Walk a seeded application through review and print the generated documents
    Demo(DemoArgs),
    /// Apply an offline CSV review sheet to the seeded demo application
    ImportReviews(ImportReviewsArgs),
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
        Command::Demo(args) => run_demo(args),
        Command::ImportReviews(args) => run_import_reviews(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["club-licensing-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn import_reviews_takes_a_sheet_path() {
        let cli = Cli::try_parse_from([
            "club-licensing-api",
            "import-reviews",
            "--sheet",
            "reviews.csv",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::ImportReviews(args)) => {
                assert_eq!(args.sheet.to_string_lossy(), "reviews.csv")
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
