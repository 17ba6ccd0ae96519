use astra::Server;
use estate_map::config::AppConfig;
use estate_map::router::{handle, AppState};
use estate_map::templates;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    if let Err(e) = config.map_key() {
        tracing::warn!("{e}; serving the map placeholder");
    }

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("Invalid BIND_ADDR {}: {e}", config.bind_addr);
            std::process::exit(1);
        }
    };

    let state = match AppState::from_config(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Startup failed: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting server at http://{addr}");
    let server = Server::bind(&addr).max_workers(8);

    let result = server.serve(move |req, _info| match handle(req, &state) {
        Ok(resp) => resp,
        Err(err) => {
            tracing::warn!("Request failed: {err}");
            templates::html_error_response(err)
        }
    });

    if let Err(e) = result {
        tracing::error!("Server ended with error: {e}");
    }

    tracing::info!("Server shut down cleanly.");
}
