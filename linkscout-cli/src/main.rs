//! linkscout: passive CDP/LLDP neighbor discovery

use std::error::Error;
use std::sync::Arc;

use linkscout_capture::{CaptureCoordinator, DiscoveryEvent, PcapSource, SystemLinks};
use linkscout_cli::{output, Cli, Commands};
use linkscout_core::LinkEnumerator;
use linkscout_protocols::select_neighbors;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse_args();
    init_logging(&cli);

    let links = Arc::new(SystemLinks::new());
    match cli.command {
        Some(Commands::Interfaces) => list_interfaces(links.as_ref()),
        None => run_capture(&cli, links).await,
    }
}

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn list_interfaces(links: &dyn LinkEnumerator) -> Result<(), Box<dyn Error>> {
    let capture_links = links.capture_links()?;
    if capture_links.is_empty() {
        println!("No capture-capable interfaces found");
        return Ok(());
    }
    for link in capture_links {
        println!("{}", link);
    }
    Ok(())
}

async fn run_capture(cli: &Cli, links: Arc<SystemLinks>) -> Result<(), Box<dyn Error>> {
    let interfaces = if cli.interface.is_empty() {
        links
            .capture_links()?
            .into_iter()
            .map(|link| link.name)
            .collect()
    } else {
        cli.interface.clone()
    };
    if interfaces.is_empty() {
        return Err("no capture-capable interfaces; pass one with -i".into());
    }

    let coordinator = Arc::new(CaptureCoordinator::with_config(
        Arc::new(PcapSource::new(cli.capture_config())),
        links,
        cli.link_config(),
    ));
    let mut events = coordinator.subscribe();

    for interface in &interfaces {
        coordinator.add_interface(interface)?;
    }
    if let Err(e) = coordinator.start_all() {
        warn!(error = %e, "not every interface started");
    }
    info!(interfaces = ?interfaces, mode = %cli.mode, "listening for discovery frames");
    println!(
        "Listening on {} ({} mode), Ctrl-C to stop",
        interfaces.join(", "),
        cli.mode
    );

    let deadline = async {
        match cli.run_for() {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(DiscoveryEvent::Neighbor(neighbor)) => {
                    if cli.mode.captures(neighbor.protocol()) {
                        println!("{}", output::format_event(&neighbor));
                    }
                }
                Some(DiscoveryEvent::CaptureFailed { interface, error }) => {
                    error!(%interface, %error, "capture failed");
                    eprintln!("Capture on {} failed: {}", interface, error);
                    if !coordinator.is_running() {
                        break;
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            _ = &mut deadline => {
                info!("run time elapsed");
                break;
            }
        }
    }

    let stopping = Arc::clone(&coordinator);
    tokio::task::spawn_blocking(move || stopping.stop_all()).await?;

    for interface in coordinator.interfaces() {
        if let Ok(capture) = coordinator.capture(&interface) {
            println!("{}", output::format_link_stats(&interface, &capture.stats()));
        }
    }

    let neighbors = coordinator.get_all_neighbors();
    let shown = select_neighbors(cli.mode, &neighbors);
    println!();
    println!("{} neighbor(s) discovered", shown.len());
    for neighbor in shown {
        println!("{}", output::format_neighbor(neighbor));
    }
    Ok(())
}
