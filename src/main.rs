mod actions;
mod cli;
mod error;
mod telemetry;
mod transport;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use dotenv::dotenv;
use log::{error, info};
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use actions::{led, power, pxe, storage};
use cli::{Cli, Command, ConnectionArgs, LedArgs, PowerArgs, PxeArgs, StorageArgs, TelemetryArgs};
use telemetry::collector::CollectionResult;
use telemetry::{discovery, export, render, CategorySampler, Collector, Scheduler};
use transport::{RedfishTransport, TransportConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenv().ok();

    let cli = Cli::parse();

    let default_filter = if cli.connection().verbose { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(default_filter));

    let transport = build_transport(cli.connection())?;

    match cli.command {
        Command::Telemetry(args) => run_telemetry(transport, args).await,
        Command::Power(args) => run_power(transport, args).await,
        Command::Led(args) => run_led(transport, args).await,
        Command::Storage(args) => run_storage(transport, args).await,
        Command::Pxe(args) => run_pxe(transport, args).await,
    }
}

fn build_transport(args: &ConnectionArgs) -> Result<RedfishTransport> {
    let password = args
        .password
        .clone()
        .or_else(|| env::var("REDFISH_PASSWORD").ok())
        .context("no password given; pass -p or set REDFISH_PASSWORD")?;

    RedfishTransport::new(TransportConfig {
        host: args.host.clone(),
        port: args.port,
        username: args.username.clone(),
        password,
        verify_ssl: args.verify_ssl,
        timeout: Duration::from_secs(args.timeout),
    })
    .context("failed to initialize HTTP transport")
}

fn cancel_flag() -> Result<Arc<AtomicBool>> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .context("failed to install interrupt handler")?;
    Ok(cancel)
}

async fn run_telemetry(transport: RedfishTransport, args: TelemetryArgs) -> Result<()> {
    let categories = args.categories();
    let mut collector = Collector::new(transport);
    let cancel = cancel_flag()?;

    let continuous = args.continuous.is_some();
    let mut scheduler = match args.continuous {
        Some(secs) => {
            if secs == 0 {
                bail!("--continuous interval must be positive");
            }
            info!(
                "starting continuous collection from {} every {}s",
                collector.host(),
                secs
            );
            Scheduler::new(Duration::from_secs(secs), args.count, cancel)
        }
        None => Scheduler::single_shot(cancel),
    };

    let mut source = CategorySampler::new(&mut collector, categories);
    let mut collected_any = false;
    let session = scheduler
        .run(&mut source, |sample, result| {
            collected_any |= result.has_records();
            emit_sample(&args, continuous, sample, result);
        })
        .await
        .context("endpoint discovery failed")?;

    if continuous {
        println!("\nMonitoring stopped. Collected {} sample(s).", session.samples_taken);
    }
    if !collected_any {
        bail!("no telemetry collected from any requested category");
    }
    Ok(())
}

/// Per-sample output: console first, then the optional file exports. An
/// export failure is reported and never discards what was collected.
fn emit_sample(args: &TelemetryArgs, continuous: bool, sample: u64, result: &CollectionResult) {
    if continuous {
        println!("\n[{}] Sample {}", Utc::now().format("%Y-%m-%d %H:%M:%S"), sample);
    }

    if args.json {
        match export::to_json(&result.records) {
            Ok(body) => println!("{}", body),
            Err(err) => error!("{}", err),
        }
    } else {
        match render::render(result) {
            Ok(text) => print!("{}", text),
            Err(err) => error!("{}", err),
        }
    }

    if let Some(path) = &args.export_json {
        let path = if continuous {
            export::numbered_path(path, sample)
        } else {
            path.clone()
        };
        match export::write_json(&result.records, &path) {
            Ok(()) => info!("telemetry exported to {}", path.display()),
            Err(err) => error!("{}", err),
        }
    }

    if let Some(path) = &args.export_csv {
        let path = if continuous {
            export::numbered_path(path, sample)
        } else {
            path.clone()
        };
        match export::write_csv(&result.records, &path) {
            Ok(()) => info!("telemetry exported to {}", path.display()),
            Err(err) => error!("{}", err),
        }
    }
}

async fn run_power(transport: RedfishTransport, args: PowerArgs) -> Result<()> {
    let endpoints = discovery::resolve(&transport)
        .await
        .context("endpoint discovery failed")?;

    if args.get_state {
        let state = power::get_power_state(&transport, &endpoints).await?;
        println!("Current power state: {}", state);
    } else if let Some(action) = args.set_state {
        power::set_power_state(&transport, &endpoints, action).await?;
        println!("Power action {:?} completed successfully", action);
    } else if args.get_actions {
        let available = power::available_actions(&transport, &endpoints).await?;
        println!("Available power actions:");
        for action in available {
            println!("  - {}", action);
        }
    }
    Ok(())
}

async fn run_led(transport: RedfishTransport, args: LedArgs) -> Result<()> {
    let endpoints = discovery::resolve(&transport)
        .await
        .context("endpoint discovery failed")?;

    if args.get_state {
        let state = led::get_led_state(&transport, &endpoints).await?;
        println!("Current LED state: {}", state);
    } else if let Some(state) = args.set_state {
        led::set_led_state(&transport, &endpoints, state).await?;
        println!("LED state set to {:?} successfully", state);
    }
    Ok(())
}

async fn run_storage(transport: RedfishTransport, args: StorageArgs) -> Result<()> {
    let endpoints = discovery::resolve(&transport)
        .await
        .context("endpoint discovery failed")?;

    let inventory = storage::get_inventory(&transport, &endpoints).await?;
    print!("{}", storage::render_inventory(&inventory));

    if let Some(path) = &args.export_csv {
        storage::export_csv(&inventory, path)?;
        println!("Storage inventory exported to {}", path.display());
    }
    Ok(())
}

async fn run_pxe(transport: RedfishTransport, args: PxeArgs) -> Result<()> {
    let endpoints = discovery::resolve(&transport)
        .await
        .context("endpoint discovery failed")?;

    if args.get_boot_info {
        let info = pxe::get_boot_info(&transport, &endpoints).await?;
        print!("{}", pxe::render_boot_info(&info));
    } else if args.pxe_once {
        pxe::set_pxe_once(&transport, &endpoints, args.boot_mode).await?;
        println!("PXE boot configured for next restart (Mode: {:?})", args.boot_mode);
    } else if args.pxe_continuous {
        pxe::set_pxe_continuous(&transport, &endpoints, args.boot_mode).await?;
        println!("PXE boot configured for continuous mode (Mode: {:?})", args.boot_mode);
    } else if args.disable_override {
        pxe::disable_override(&transport, &endpoints).await?;
        println!("Boot override disabled");
    } else if args.get_boot_targets {
        let targets = pxe::available_boot_targets(&transport, &endpoints).await?;
        println!("Available boot targets:");
        for target in targets {
            println!("  - {}", target);
        }
    } else if let Some(target) = &args.set_boot_target {
        pxe::set_boot_override(&transport, &endpoints, target, args.boot_enabled, args.boot_mode)
            .await?;
        println!(
            "Boot target set to '{}' (Mode: {:?}, Enabled: {:?})",
            target, args.boot_mode, args.boot_enabled
        );
    }
    Ok(())
}
