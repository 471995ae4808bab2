//! Command-line argument definitions (clap).

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::actions::led::LedState;
use crate::actions::power::ResetType;
use crate::actions::pxe::{BootMode, OverrideEnabled};
use crate::telemetry::types::Category;
use crate::transport::{DEFAULT_PORT, DEFAULT_TIMEOUT_SECS};

#[derive(Debug, Parser)]
#[command(name = "redfish-controller")]
#[command(version)]
#[command(about = "Out-of-band server management via the Redfish API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn connection(&self) -> &ConnectionArgs {
        match &self.command {
            Command::Telemetry(args) => &args.connection,
            Command::Power(args) => &args.connection,
            Command::Led(args) => &args.connection,
            Command::Storage(args) => &args.connection,
            Command::Pxe(args) => &args.connection,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// System telemetry collection
    Telemetry(TelemetryArgs),
    /// Power management operations
    Power(PowerArgs),
    /// LED indicator control
    Led(LedArgs),
    /// Storage inventory and information
    Storage(StorageArgs),
    /// PXE boot configuration
    Pxe(PxeArgs),
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Server hostname or IP address
    #[arg(short = 'H', long)]
    pub host: String,

    /// Username for authentication
    #[arg(short = 'u', long)]
    pub username: String,

    /// Password for authentication (falls back to REDFISH_PASSWORD)
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// HTTPS port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Verify SSL certificates
    #[arg(long)]
    pub verify_ssl: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct TelemetryArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Collect all telemetry categories (default when none selected)
    #[arg(long)]
    pub all: bool,

    /// Collect system telemetry
    #[arg(long)]
    pub system: bool,

    /// Collect thermal telemetry (temperatures, fans)
    #[arg(long)]
    pub thermal: bool,

    /// Collect power telemetry (power, voltage, power supplies)
    #[arg(long)]
    pub power: bool,

    /// Collect processor telemetry
    #[arg(long)]
    pub processor: bool,

    /// Collect memory telemetry
    #[arg(long)]
    pub memory: bool,

    /// Collect network telemetry
    #[arg(long)]
    pub network: bool,

    /// Collect storage telemetry
    #[arg(long)]
    pub storage: bool,

    /// Print records as JSON instead of the plain-text report
    #[arg(long)]
    pub json: bool,

    /// Export records to a JSON file
    #[arg(long, value_name = "FILE")]
    pub export_json: Option<PathBuf>,

    /// Export records to a CSV file
    #[arg(long, value_name = "FILE")]
    pub export_csv: Option<PathBuf>,

    /// Continuous monitoring with an interval in seconds
    #[arg(long, value_name = "SECONDS")]
    pub continuous: Option<u64>,

    /// Number of samples to collect (use with --continuous)
    #[arg(long, value_name = "N", requires = "continuous")]
    pub count: Option<u64>,
}

impl TelemetryArgs {
    /// The requested category set; no selection means everything.
    pub fn categories(&self) -> BTreeSet<Category> {
        let picks = [
            (self.system, Category::System),
            (self.thermal, Category::Thermal),
            (self.power, Category::Power),
            (self.processor, Category::Processor),
            (self.memory, Category::Memory),
            (self.network, Category::Network),
            (self.storage, Category::Storage),
        ];
        let mut set: BTreeSet<Category> = picks
            .into_iter()
            .filter_map(|(selected, category)| selected.then_some(category))
            .collect();
        if self.all || set.is_empty() {
            set = Category::ALL.into_iter().collect();
        }
        set
    }
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("operation").required(true)))]
pub struct PowerArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Get current power state
    #[arg(long, group = "operation")]
    pub get_state: bool,

    /// Execute a power action
    #[arg(long, group = "operation", value_enum, value_name = "ACTION")]
    pub set_state: Option<ResetType>,

    /// List power actions this server supports
    #[arg(long, group = "operation")]
    pub get_actions: bool,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("operation").required(true)))]
pub struct LedArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Get current LED state
    #[arg(long, group = "operation")]
    pub get_state: bool,

    /// Set LED state
    #[arg(long, group = "operation", value_enum, value_name = "STATE")]
    pub set_state: Option<LedState>,
}

#[derive(Debug, Args)]
pub struct StorageArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Get storage inventory
    #[arg(long, required = true)]
    pub get_inventory: bool,

    /// Export the drive inventory to a CSV file
    #[arg(long, value_name = "FILE")]
    pub export_csv: Option<PathBuf>,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("operation").required(true)))]
pub struct PxeArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Get current boot configuration
    #[arg(long, group = "operation")]
    pub get_boot_info: bool,

    /// PXE boot on the next restart only
    #[arg(long, group = "operation")]
    pub pxe_once: bool,

    /// PXE boot on every restart
    #[arg(long, group = "operation")]
    pub pxe_continuous: bool,

    /// Disable the boot source override
    #[arg(long, group = "operation")]
    pub disable_override: bool,

    /// List boot targets this server supports
    #[arg(long, group = "operation")]
    pub get_boot_targets: bool,

    /// Set a specific boot target
    #[arg(long, group = "operation", value_name = "TARGET")]
    pub set_boot_target: Option<String>,

    /// Boot mode for override operations
    #[arg(long, value_enum, default_value = "UEFI")]
    pub boot_mode: BootMode,

    /// Override duration when setting a boot target
    #[arg(long, value_enum, default_value = "Once")]
    pub boot_enabled: OverrideEnabled,
}
