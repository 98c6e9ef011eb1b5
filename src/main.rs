use std::sync::Arc;
use std::sync::atomic::Ordering;

use sigma_digest::config::{DigestConfig, GraphConfig};
use sigma_digest::graph::{ClientCredentialsProvider, GraphClient, build_http_client};
use sigma_digest::pipeline::{DigestPipeline, RunOutcome};
use sigma_digest::scheduler::spawn_digest_scheduler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let run_once = std::env::args().skip(1).any(|arg| arg == "--once");

    // Configuration errors stop start-up before any network call.
    let digest_config = DigestConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export TARGET_USER=me@example.edu");
        std::process::exit(1);
    });
    let graph_config = GraphConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export TENANT_ID=... CLIENT_ID=... CLIENT_SECRET=...");
        std::process::exit(1);
    });

    eprintln!("📬 Sigma Digest v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   User: {}", digest_config.target_user);
    eprintln!("   Timezone: {}", digest_config.timezone);
    eprintln!(
        "   Items: top {} from the last {}h (scoring policy: {})",
        digest_config.max_items,
        digest_config.lookback_hours,
        digest_config.scoring_policy.label()
    );
    eprintln!("   Mailbox API: {}", graph_config.base_url);

    // ── Collaborators ────────────────────────────────────────────────────
    let http = build_http_client(graph_config.http_timeout)?;
    let tokens = Arc::new(ClientCredentialsProvider::new(http.clone(), &graph_config));
    let graph = Arc::new(GraphClient::new(http, &graph_config));

    let pipeline = Arc::new(DigestPipeline::new(
        digest_config.clone(),
        tokens,
        graph.clone(),
        graph,
    ));

    if run_once {
        eprintln!("   Mode: single run\n");
        return match pipeline.run_once().await {
            RunOutcome::Sent(_) => Ok(()),
            RunOutcome::Failed { .. } => std::process::exit(1),
        };
    }

    // ── Scheduler ────────────────────────────────────────────────────────
    eprintln!(
        "   Schedule: {} ({})\n",
        digest_config.schedule.expression(),
        digest_config.timezone
    );
    let (handle, shutdown) = spawn_digest_scheduler(pipeline, digest_config.schedule);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received Ctrl-C, stopping scheduler");
    shutdown.store(true, Ordering::Relaxed);
    handle.abort();

    Ok(())
}
