use anyhow::Context;
use bookstore_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Serve or render the bookstore catalog view
#[derive(Debug, Parser)]
#[command(name = "bookstore", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP application until Ctrl-C
    Serve,
    /// Load the catalog once and print the rendered book list
    Render {
        /// Print a full HTML document instead of the bare fragment
        #[arg(long)]
        page: bool,
    },
    /// Print the resolved settings as JSON
    Settings,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookstore settings")?;
    bookstore_telemetry::init(&settings.telemetry)?;

    tracing::debug!(env = ?settings.environment, command = ?cli.command, "bookstore cli starting");

    match cli.command {
        Command::Serve => bookstore_app::app::serve(settings).await,
        Command::Render { page } => {
            let html = bookstore_app::app::render_once(&settings, page).await?;
            print!("{html}");
            Ok(())
        }
        Command::Settings => {
            let json = serde_json::to_string_pretty(&settings)
                .context("failed to serialize settings")?;
            println!("{json}");
            Ok(())
        }
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
    fn render_accepts_page_flag() {
        let cli = Cli::parse_from(["bookstore", "render", "--page"]);
        assert!(matches!(cli.command, Command::Render { page: true }));
    }
}
