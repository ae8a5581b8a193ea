use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tourney::application::controller::Game;
use tourney::application::engine::SettlementEngine;
use tourney::config::StoreConfig;
use tourney::interfaces::csv::command_reader::CommandReader;
use tourney::interfaces::dispatch;
use tourney::interfaces::json::response_writer::ResponseWriter;
use tourney::logging;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input command script (CSV: action, player, tournament, points)
    input: PathBuf,

    #[command(flatten)]
    store: StoreConfig,

    /// Default log filter when RUST_LOG is not set
    #[arg(long, env = "TOURNEY_LOG", default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let store = cli.store.open().into_diagnostic()?;
    let game = Game::new(SettlementEngine::new(store));

    // Replay commands in order, one JSON line per command
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    let stdout = io::stdout();
    let mut writer = ResponseWriter::new(stdout.lock());
    for command in reader.commands() {
        match command {
            Ok(command) => {
                let response = dispatch::execute(&game, &command).await;
                writer.write_response(&response).into_diagnostic()?;
            }
            Err(e) => {
                eprintln!("Error reading command: {}", e);
            }
        }
    }
    writer.flush().into_diagnostic()?;

    Ok(())
}
