//! Legate CLI - operate agent jobs from the command line
//!
//! A thin stand-in for the upstream request handler: each subcommand maps
//! to one delegation verb. Polling (`status --wait`) lives here, in the
//! caller, never in the library.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use legate::access::AccessContext;
use legate::cluster::{ClusterApi, KubeClusterApi};
use legate::config::Settings;
use legate::status::WorkloadPhase;
use legate::{control, logs, status, submit};

/// Legate - delegate autonomous agent work to Kubernetes Jobs
#[derive(Parser, Debug)]
#[command(name = "legate", version, about, long_about = None)]
struct Cli {
    /// Namespace agent jobs live in
    #[arg(long, env = "LEGATE_NAMESPACE", default_value = "default")]
    namespace: String,

    /// Agent container image
    #[arg(
        long,
        env = "LEGATE_AGENT_IMAGE",
        default_value = "ghcr.io/legate/agent:latest"
    )]
    image: String,

    /// Internal API base address injected into agent containers
    #[arg(long, env = "LEGATE_API_BASE_URL", default_value = "http://localhost:5000")]
    api_base_url: String,

    /// Timeout in seconds for each control-plane request
    #[arg(long, env = "LEGATE_REQUEST_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit a new agent job for a workload
    Submit {
        /// Opaque workload identifier
        workload_id: String,
        /// Owning project reference
        #[arg(long)]
        owner_id: String,
        /// Signed access token injected into the agent container
        #[arg(long, env = "LEGATE_TOKEN")]
        token: String,
    },
    /// Print the unified status of a workload as JSON
    Status {
        /// Opaque workload identifier
        workload_id: String,
        /// Poll until the workload reaches a terminal state
        #[arg(long)]
        wait: bool,
        /// Poll interval in seconds when --wait is set
        #[arg(long, default_value = "5")]
        interval_secs: u64,
    },
    /// Print the current log text of a workload's pod
    Logs {
        /// Opaque workload identifier
        workload_id: String,
    },
    /// Suspend a workload's job
    Pause {
        /// Opaque workload identifier
        workload_id: String,
    },
    /// Resume a suspended workload's job
    Resume {
        /// Opaque workload identifier
        workload_id: String,
    },
    /// Delete a workload's job and, asynchronously, its pods
    Terminate {
        /// Opaque workload identifier
        workload_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install crypto provider before any TLS use; both kube and reqwest
    // link the rustls backend.
    if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
        eprintln!("CRITICAL: failed to install rustls crypto provider: {e:?}");
        std::process::exit(1);
    }

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let settings = Settings {
        namespace: cli.namespace.clone(),
        image: cli.image.clone(),
        api_base_url: cli.api_base_url.clone(),
        request_timeout: Duration::from_secs(cli.timeout_secs),
    };

    let access = AccessContext::resolve(&settings).await?;
    let cluster: Arc<dyn ClusterApi> = Arc::new(KubeClusterApi::new(&access));

    match cli.command {
        Commands::Submit {
            workload_id,
            owner_id,
            token,
        } => {
            let transports = submit::default_transports(&access, &settings, cluster.clone());
            let job =
                submit::submit_workload(&transports, &settings, &workload_id, &owner_id, &token)
                    .await?;
            println!(
                "{}",
                job.metadata.name.as_deref().unwrap_or(&workload_id)
            );
        }
        Commands::Status {
            workload_id,
            wait,
            interval_secs,
        } => {
            loop {
                let status = status::workload_status(cluster.as_ref(), &workload_id).await?;
                println!("{}", serde_json::to_string(&status)?);
                let terminal = matches!(
                    status.phase,
                    WorkloadPhase::Completed | WorkloadPhase::Failed | WorkloadPhase::NotFound
                );
                if !wait || terminal {
                    break;
                }
                tokio::time::sleep(Duration::from_secs(interval_secs)).await;
            }
        }
        Commands::Logs { workload_id } => {
            let text = logs::workload_logs(cluster.as_ref(), &workload_id).await?;
            print!("{text}");
        }
        Commands::Pause { workload_id } => {
            control::pause(cluster.as_ref(), &workload_id).await?;
        }
        Commands::Resume { workload_id } => {
            control::resume(cluster.as_ref(), &workload_id).await?;
        }
        Commands::Terminate { workload_id } => {
            control::terminate(cluster.as_ref(), &workload_id).await?;
        }
    }

    Ok(())
}
