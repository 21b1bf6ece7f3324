//! CLI for batchsub
//!
//! Subcommands:
//! - `scenario`: walk through subscribe, publish, dispatch and late unsubscribe
//! - `demo`: one publisher, several consumers, a single dispatch round
//! - `watch`: publish on a timer with the background dispatch loop running

use batchsub::broker::{Broker, shared};
use batchsub::client::{Consumer, Producer, ReceiveMode};
use batchsub::config::{Settings, load_config};
use batchsub::runtime::run_dispatch_loop;
use batchsub::scenario::{Transcripts, render_transcripts, run_demo, run_scenario};
use batchsub::utils::logging;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "batchsub")]
enum Command {
    /// Run the news scenario and print what each consumer received
    Scenario {
        /// Print transcripts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the single-publisher demo and print what each consumer received
    Demo {
        #[arg(long)]
        json: bool,
    },
    /// Publish a tick every dispatch interval until Ctrl-C
    Watch {
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let command = Command::parse();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("info");
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    logging::init(&settings.logging.level);

    let result = match command {
        Command::Scenario { json } => run_scenario(settings.consumer.receive_mode)
            .map_err(Into::into)
            .and_then(|t| print_transcripts(&t, json)),
        Command::Demo { json } => run_demo(settings.consumer.receive_mode)
            .map_err(Into::into)
            .and_then(|t| print_transcripts(&t, json)),
        Command::Watch { ticks } => run_watch(&settings, ticks).await,
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

fn print_transcripts(
    transcripts: &Transcripts,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_transcripts(transcripts, json)?);
    Ok(())
}

async fn run_watch(
    settings: &Settings,
    ticks: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let interval = settings.broker.dispatch_interval();
    let broker = shared(Broker::<String>::new());
    let producer = Producer::new("ticks", broker.clone());
    let watcher = Consumer::with_mode("watcher", broker.clone(), ReceiveMode::Log);
    watcher.subscribe("ticks");

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let dispatcher = tokio::spawn(run_dispatch_loop(broker.clone(), interval, shutdown_rx));
    info!("Dispatching every {:?}", interval);

    let publisher = async {
        let mut ticker = tokio::time::interval(interval);
        let mut n = 0u64;
        loop {
            ticker.tick().await;
            if ticks.is_some_and(|limit| n >= limit) {
                break;
            }
            n += 1;
            producer.publish(format!("tick {n}"));
        }
    };

    tokio::select! {
        _ = publisher => {
            info!("Tick limit reached.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    if shutdown_tx.send(()).is_err() {
        warn!("Dispatch loop already stopped");
    }
    let stats = dispatcher.await??;
    info!(
        "Dispatch loop ran {} rounds: {} messages, {} deliveries",
        stats.rounds, stats.messages, stats.deliveries
    );
    info!("watcher received {} ticks", watcher.received_count());
    Ok(())
}
