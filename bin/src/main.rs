use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
};
use notion_portfolio::{config::Config, NotionClient, Portfolio};
use std::{net::SocketAddr, sync::Arc};

mod server;

/// Serve a portfolio's content straight out of Notion
#[derive(Parser)]
struct Opts {
    /// The port to listen on
    #[clap(short, long, env = "PORT", default_value = "8080")]
    port: u16,
    /// A level of verbosity, and can be used multiple times
    #[clap(short, long, parse(from_occurrences))]
    verbose: u8,
}

fn setup_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build();

    let config = log4rs::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))?;

    log4rs::init_config(config)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Variables may just as well come from the real environment
    dotenv::dotenv().ok();

    let opts: Opts = Opts::parse();
    setup_logging(opts.verbose).context("Failed to set up logging")?;

    let config = Config::from_env()?;
    let client =
        NotionClient::new(&config.notion_api_key).context("Failed to create Notion client")?;
    let portfolio = Arc::new(Portfolio::new(client, config));

    let address = SocketAddr::from(([0, 0, 0, 0], opts.port));
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    log::info!("Starting server on {}", address);
    axum::serve(listener, server::router(portfolio))
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
