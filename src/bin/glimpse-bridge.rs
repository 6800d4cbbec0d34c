//! glimpse-bridge
//!
//! Connects to the request source and answers `extract_dom` commands from a
//! live Chrome tab or a DOM snapshot file.

use anyhow::Context;
use clap::Parser;
use glimpse_bridge::bridge::{BridgeOptions, ConnectionManager, MessageHandler, WsConnector, encode_reply};
use glimpse_bridge::browser::{ChromePage, LaunchOptions, PageSource, SnapshotFilePage, TargetPattern};
use glimpse_bridge::extract::{ExtractionResult, OutlineLayout, TreeExtractor, render_outline};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "glimpse-bridge")]
#[command(version)]
#[command(about = "Serve DOM subtree extraction requests over WebSocket", long_about = None)]
struct Cli {
    /// Request source WebSocket endpoint
    #[arg(long, default_value = glimpse_bridge::bridge::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Fixed delay between reconnect attempts, in milliseconds
    #[arg(long, value_name = "MS", default_value = "3000")]
    reconnect_delay_ms: u64,

    /// Send a ping right after each connect
    #[arg(long)]
    ping_on_connect: bool,

    /// Serve a DOM snapshot file (re-read per request) instead of a browser
    #[arg(long, value_name = "FILE", conflicts_with_all = ["browser_ws", "headless", "chrome_path", "user_data_dir"])]
    snapshot: Option<PathBuf>,

    /// DevTools WebSocket URL of a running Chrome to attach to
    #[arg(long, value_name = "URL")]
    browser_ws: Option<String>,

    /// Launch Chrome headless (only when launching)
    #[arg(long)]
    headless: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// Host of the target site
    #[arg(long, default_value = "workflowy.com")]
    target_host: String,

    /// Display name of the target site
    #[arg(long, default_value = "Workflowy")]
    target_label: String,

    /// Extract one node, print the reply and exit
    #[arg(long, value_name = "NODE_ID")]
    extract: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let target = TargetPattern::new(&cli.target_host, &cli.target_label);
    let page = open_page(&cli, target)?;
    let extractor = TreeExtractor::new(OutlineLayout::default());

    if let Some(node_id) = &cli.extract {
        let result = match page.extract_dom(node_id, &extractor).await {
            Ok(result) => result,
            Err(err) => ExtractionResult::from(err),
        };
        if let ExtractionResult::Success(tree) = &result {
            eprint!("{}", render_outline(&tree.children));
        }
        println!("{}", encode_reply(&result));
        return Ok(());
    }

    let options = BridgeOptions::new()
        .endpoint(&cli.endpoint)?
        .reconnect_delay(Duration::from_millis(cli.reconnect_delay_ms))
        .ping_on_connect(cli.ping_on_connect);

    let handler = MessageHandler::new(page, extractor);
    let mut manager = ConnectionManager::new(WsConnector, options, handler);

    tokio::select! {
        _ = manager.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            log::info!("Shutting down");
        }
    }

    Ok(())
}

fn open_page(cli: &Cli, target: TargetPattern) -> anyhow::Result<Arc<dyn PageSource>> {
    if let Some(path) = &cli.snapshot {
        log::info!("Serving snapshot file {}", path.display());
        return Ok(Arc::new(SnapshotFilePage::new(path).with_target(target)));
    }

    if let Some(ws_url) = &cli.browser_ws {
        log::info!("Attaching to browser at {}", ws_url);
        let page = ChromePage::connect(ws_url.clone(), target).context("Failed to attach to browser")?;
        return Ok(Arc::new(page));
    }

    let mut options = LaunchOptions::new().headless(cli.headless);
    if let Some(path) = &cli.chrome_path {
        options = options.chrome_path(path);
    }
    if let Some(dir) = &cli.user_data_dir {
        options = options.user_data_dir(dir);
    }

    log::info!("Launching browser ({})", if options.headless { "headless" } else { "headed" });
    let page = ChromePage::launch(options, target).context("Failed to launch browser")?;
    Ok(Arc::new(page))
}
