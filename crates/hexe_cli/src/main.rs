use std::io::{self, BufRead};
use std::sync::Arc;

use hexe_api::HexeApiClient;
use hexe_chat::config::EnvConfig;
use hexe_chat::logging::init_logging;
use hexe_chat::{ChatStore, EventDispatcher};
use hexe_cli::commands::{handle_input, InputOutcome};
use hexe_cli::config::CliConfig;
use hexe_cli::runtime::{HttpEventSource, StreamRuntime};
use hexe_cli::transcript::TranscriptPrinter;

/// Exit status after SIGINT, matching shell conventions.
#[cfg(unix)]
const SIGNAL_EXIT_CODE: i32 = 130;

fn main() -> io::Result<()> {
    let env_config = EnvConfig::from_env();
    init_logging(&env_config)?;

    let config = CliConfig::from_env().map_err(io::Error::other)?;
    let client = HexeApiClient::new(config.api_config()).map_err(io::Error::other)?;
    let base_url = client.base_url();

    let dispatcher = EventDispatcher::new(ChatStore::new());
    dispatcher.subscribe(TranscriptPrinter::new(io::stdout()));

    let runtime = StreamRuntime::new(
        Arc::new(HttpEventSource::new(client)),
        Arc::clone(&dispatcher),
    );

    // Stdin reads block, so the handler exits the process itself once the
    // stream worker has stopped.
    #[cfg(unix)]
    let _signals = {
        let runtime = Arc::clone(&runtime);
        hexe_cli::signals::install_signal_handlers(move || {
            runtime.shutdown();
            std::process::exit(SIGNAL_EXIT_CODE);
        })?
    };

    runtime.start()?;
    tracing::info!(%base_url, "hexe started");
    println!("Connected to {base_url}. Type /help for commands.");

    for line in io::stdin().lock().lines() {
        let line = line?;
        match handle_input(&line, &runtime) {
            InputOutcome::Ignored | InputOutcome::Submitted => {}
            InputOutcome::Reply(text) => println!("{text}"),
            InputOutcome::Quit => break,
        }
    }

    runtime.shutdown();
    Ok(())
}
