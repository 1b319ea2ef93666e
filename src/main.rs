mod cli;
mod handlers;
mod http;
mod init;
mod models;
mod predict;
mod suggest;

use std::sync::Arc;

use clap::Parser;

use cli::Commands;
use handlers::{Consts, Ctx};

#[tokio::main]
async fn main() {
    init::init_logger();

    let cli = cli::Cli::parse();

    // Handle CLI flags.
    if let Some(cmd) = cli.command {
        match cmd {
            // Generate a new config file.
            Commands::NewConfig { path } => {
                match init::generate_config(&path) {
                    Ok(_) => {
                        log::info!("config file generated: {}", path.display());
                    }
                    Err(e) => {
                        log::error!("error generating config: {}", e);
                        std::process::exit(1);
                    }
                }
                return;
            }
        }
    }

    // Load config.
    let config = init::init_config(&cli.config);

    // Initialize languages from config.
    let langs = init::init_langs(&config);

    // Build the indexes up front. Once the server starts they are only ever
    // read, so they are shared without locking.
    let alphabet = init::init_fuzzy_alphabet(&config);
    let suggester = init::init_suggester(&langs, alphabet);
    let predictor = init::init_predictor(&langs);

    let defaults = Consts::default();

    // Setup the global app context used in HTTP handlers.
    let ctx = Arc::new(Ctx {
        suggester,
        predictor,
        langs,
        consts: Consts {
            default_suggestions: pick(config.app.default_suggestions, defaults.default_suggestions),
            max_suggestions: pick(config.app.max_suggestions, defaults.max_suggestions),
            default_top_k: pick(config.app.default_top_k, defaults.default_top_k),
            max_top_k: pick(config.app.max_top_k, defaults.max_top_k),
        },
    });

    // Start the HTTP server.
    let routes = http::init_handlers(ctx);
    let addr = if config.app.address.is_empty() {
        "0.0.0.0:8000".to_string()
    } else {
        config.app.address
    };

    log::info!("starting server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            log::error!("error listening on {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, routes).await {
        log::error!("server error: {}", e);
        std::process::exit(1);
    }
}

/// Use the configured value if set, else the default.
fn pick(configured: usize, default: usize) -> usize {
    if configured > 0 {
        configured
    } else {
        default
    }
}
