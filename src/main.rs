// Entrypoint for the CLI application.
// - Keeps `main` small: load config, create an API client and hand both to
//   the UI loop.
// - Logging goes through `env_logger`; set `RUST_LOG=debug` to see requests.

use anyhow::Context;
use memorable_cli::{api::ApiClient, config::Config, ui};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::load().context("Failed to load configuration")?;
    log::info!("using API at {}", config.base_url);
    let api = ApiClient::from_config(&config).context("Failed to build HTTP client")?;

    // Blocks until the user exits.
    ui::main_menu(ui::Session::new(api, config))?;
    Ok(())
}
