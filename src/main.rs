use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ontap_rest::config::Config;
use ontap_rest::diagnostics::Diagnostics;
use ontap_rest::kinds::ip_route::{self, Destination, IpRouteBody, SvmRef};
use ontap_rest::kinds::volume_snapshot::{self, VolumeSnapshotBody, VolumeSnapshotPatch};
use ontap_rest::kinds::{cluster, fields_for_kind, KIND_KEYS};
use ontap_rest::ontap::OntapClient;
use ontap_rest::resource::VersionInfo;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Typed client for the ONTAP REST API
#[derive(Parser, Debug)]
#[command(name = "ontap-rest", version, about, long_about = None)]
struct Args {
    /// Connection profile to use
    #[arg(short, long, global = true)]
    profile: Option<String>,

    /// Config file (defaults to <config dir>/ontap-rest/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the cluster name and version
    Version,
    /// Network IP routes
    Route {
        #[command(subcommand)]
        action: RouteAction,
    },
    /// Volume snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },
    /// Print the fields a resource kind requests at a given version (offline)
    Fields {
        kind: String,
        #[arg(long)]
        generation: u32,
        #[arg(long)]
        major: u32,
        #[arg(long, default_value_t = 0)]
        minor: u32,
    },
}

#[derive(Subcommand, Debug)]
enum RouteAction {
    /// Look up routes by destination address (repeatable)
    Get {
        #[arg(long, required = true)]
        destination: Vec<String>,
        #[arg(long)]
        svm: Option<String>,
    },
    /// List routes in a scope
    List {
        #[arg(long)]
        svm: Option<String>,
    },
    Create {
        #[arg(long)]
        destination: String,
        #[arg(long)]
        netmask: String,
        #[arg(long)]
        svm: Option<String>,
        #[arg(long)]
        gateway: Option<String>,
        #[arg(long)]
        metric: Option<i64>,
    },
    Delete {
        #[arg(long)]
        uuid: String,
    },
}

#[derive(Subcommand, Debug)]
enum SnapshotAction {
    Get {
        #[arg(long)]
        volume_uuid: String,
        #[arg(long)]
        name: String,
    },
    Create {
        #[arg(long)]
        volume_uuid: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        expiry_time: Option<String>,
        #[arg(long)]
        snapmirror_label: Option<String>,
    },
    Update {
        #[arg(long)]
        volume_uuid: String,
        #[arg(long)]
        uuid: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        expiry_time: Option<String>,
        #[arg(long)]
        snapmirror_label: Option<String>,
    },
    Delete {
        #[arg(long)]
        volume_uuid: String,
        #[arg(long)]
        uuid: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("ontap-rest started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("ontap-rest").join("ontap-rest.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".ontap-rest").join("ontap-rest.log");
    }
    PathBuf::from("ontap-rest.log")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Record a failed operation; `None` means it was reported
fn reported<T>(diags: &mut Diagnostics, result: ontap_rest::Result<T>) -> Option<T> {
    result.map_err(|e| diags.report(e)).ok()
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let mut diags = Diagnostics::new();
    let result = run(&args, &mut diags).await;

    for diagnostic in diags.iter() {
        eprintln!("{}", diagnostic);
    }

    match result {
        Ok(()) if !diags.has_error() => ExitCode::SUCCESS,
        Ok(()) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn connect(args: &Args) -> Result<OntapClient> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    OntapClient::new(config.profile(args.profile.as_deref())?)
}

async fn run(args: &Args, diags: &mut Diagnostics) -> Result<()> {
    match &args.command {
        Command::Fields {
            kind,
            generation,
            major,
            minor,
        } => {
            let version = VersionInfo::new(*generation, *major, *minor);
            let Some(fields) = fields_for_kind(kind, &version) else {
                bail!("unknown kind '{}', expected one of {}", kind, KIND_KEYS.join(", "));
            };
            print_json(&fields)?;
        }
        Command::Version => {
            let client = connect(args)?;
            if let Some(cluster) = reported(diags, cluster::get_cluster(&client).await) {
                print_json(&cluster)?;
            }
        }
        Command::Route { action } => run_route(&connect(args)?, action, diags).await?,
        Command::Snapshot { action } => run_snapshot(&connect(args)?, action, diags).await?,
    }

    Ok(())
}

async fn run_route(client: &OntapClient, action: &RouteAction, diags: &mut Diagnostics) -> Result<()> {
    match action {
        RouteAction::Get { destination, svm } => {
            let Some(version) = reported(diags, client.cluster_version().await) else {
                return Ok(());
            };

            // Independent reads sharing the cached version
            let lookups = destination
                .iter()
                .map(|d| ip_route::get_ip_route(client, d, svm.as_deref(), &version));
            let results = futures::future::join_all(lookups).await;

            let mut found = Vec::new();
            for (dest, result) in destination.iter().zip(results) {
                match reported(diags, result) {
                    Some(Some(route)) => found.push(route),
                    Some(None) => diags.add_warning(
                        "no route found",
                        format!(
                            "no route to {} in {}",
                            dest,
                            svm.as_deref().map_or("cluster scope".to_string(), |s| format!("svm {}", s))
                        ),
                    ),
                    None => {}
                }
            }
            print_json(&found)?;
        }
        RouteAction::List { svm } => {
            let Some(version) = reported(diags, client.cluster_version().await) else {
                return Ok(());
            };
            if let Some(routes) = reported(diags, ip_route::list_ip_routes(client, svm.as_deref(), &version).await) {
                print_json(&routes)?;
            }
        }
        RouteAction::Create {
            destination,
            netmask,
            svm,
            gateway,
            metric,
        } => {
            let body = IpRouteBody {
                destination: Destination {
                    address: destination.clone(),
                    netmask: netmask.clone(),
                },
                svm: svm.clone().map(|name| SvmRef { name }),
                gateway: gateway.clone(),
                metric: *metric,
            };
            if let Some(route) = reported(diags, ip_route::create_ip_route(client, &body).await) {
                print_json(&route)?;
            }
        }
        RouteAction::Delete { uuid } => {
            if reported(diags, ip_route::delete_ip_route(client, Some(uuid.as_str())).await).is_some() {
                println!("deleted ip_route {}", uuid);
            }
        }
    }
    Ok(())
}

async fn run_snapshot(
    client: &OntapClient,
    action: &SnapshotAction,
    diags: &mut Diagnostics,
) -> Result<()> {
    match action {
        SnapshotAction::Get { volume_uuid, name } => {
            let Some(version) = reported(diags, client.cluster_version().await) else {
                return Ok(());
            };
            let result = volume_snapshot::get_volume_snapshot(
                client,
                Some(volume_uuid.as_str()),
                Some(name.as_str()),
                &version,
            )
            .await;
            match reported(diags, result) {
                Some(Some(snapshot)) => print_json(&snapshot)?,
                Some(None) => diags.add_warning(
                    "No snapshot found",
                    format!("snapshot {} not found on volume {}", name, volume_uuid),
                ),
                None => {}
            }
        }
        SnapshotAction::Create {
            volume_uuid,
            name,
            comment,
            expiry_time,
            snapmirror_label,
        } => {
            let body = VolumeSnapshotBody {
                name: name.clone(),
                comment: comment.clone(),
                expiry_time: expiry_time.clone(),
                snapmirror_label: snapmirror_label.clone(),
            };
            let result =
                volume_snapshot::create_volume_snapshot(client, Some(volume_uuid.as_str()), &body).await;
            if let Some(snapshot) = reported(diags, result) {
                print_json(&snapshot)?;
            }
        }
        SnapshotAction::Update {
            volume_uuid,
            uuid,
            name,
            comment,
            expiry_time,
            snapmirror_label,
        } => {
            let patch = VolumeSnapshotPatch {
                name: name.clone(),
                comment: comment.clone(),
                expiry_time: expiry_time.clone(),
                snapmirror_label: snapmirror_label.clone(),
            };
            let result = volume_snapshot::update_volume_snapshot(
                client,
                Some(volume_uuid.as_str()),
                Some(uuid.as_str()),
                &patch,
            )
            .await;
            if reported(diags, result).is_some() {
                println!("updated snapshot {}", uuid);
            }
        }
        SnapshotAction::Delete { volume_uuid, uuid } => {
            let result = volume_snapshot::delete_volume_snapshot(
                client,
                Some(volume_uuid.as_str()),
                Some(uuid.as_str()),
            )
            .await;
            if reported(diags, result).is_some() {
                println!("deleted snapshot {}", uuid);
            }
        }
    }
    Ok(())
}
