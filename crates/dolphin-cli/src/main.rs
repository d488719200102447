//! DOLPHIN - Delete On-demand Local Pods Hosted In a Node.
//!
//! This is the entry point for the `kubectl-dolphin` binary. Installed on
//! `PATH` it is picked up by kubectl as `kubectl dolphin`.

mod args;
mod duration;
mod output;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dolphin_core::EvictionRequest;
use dolphin_evict::{ClusterGateway, Evictor, KubeGateway, RunOutcome};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use args::Args;
use output::ConsoleProgress;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    init_tracing(args.debug);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            output::connection_failure(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("dolphin_cli=debug,dolphin_evict=debug,warn")
        } else {
            EnvFilter::new("error")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Connect, evict, and report. Only connection problems surface as `Err`.
async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let request = args.request();
    tracing::debug!(?request, "Parsed eviction request");

    let gateway = KubeGateway::connect(&args.client_config())
        .await
        .context("failed to create Kubernetes client")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping before the next batch");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut evictor = Evictor::new(gateway).with_shutdown(shutdown_rx);
    if request.verbose() {
        evictor = evictor.with_progress(Arc::new(ConsoleProgress));
    }

    Ok(ExitCode::from(execute(&evictor, &request, args.json).await))
}

/// Run one request and print its outcome. Returns the process exit status.
async fn execute<G: ClusterGateway>(
    evictor: &Evictor<G>,
    request: &EvictionRequest,
    json: bool,
) -> u8 {
    match evictor.evict(request).await {
        Ok(outcome) => {
            if let RunOutcome::NoPods { namespace, node } = &outcome {
                output::no_pods(namespace, node);
            }
            if json {
                output::json_summary(&outcome);
            } else {
                output::success();
            }
            0
        }
        Err(e) => {
            output::failure(&e);
            u8::try_from(e.exit_code()).unwrap_or(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dolphin_evict::MockGateway;

    fn cluster() -> MockGateway {
        MockGateway::new()
            .with_node("worker2")
            .with_control_plane_node("kube-control-plane")
            .with_namespace("web")
            .with_pods("web", 5, "web", "worker2")
    }

    fn request(args: &[&str]) -> EvictionRequest {
        Args::try_parse_from(std::iter::once("kubectl-dolphin").chain(args.iter().copied()))
            .unwrap()
            .request()
    }

    #[tokio::test(start_paused = true)]
    async fn successful_run_exits_zero() {
        let evictor = Evictor::new(Arc::new(cluster()));
        let code = execute(
            &evictor,
            &request(&["-w", "worker2", "-n", "web", "-b", "2", "-i", "3s"]),
            true,
        )
        .await;
        assert_eq!(code, 0);
        assert!(evictor.gateway().pods().is_empty());
    }

    #[tokio::test]
    async fn empty_result_exits_zero() {
        let evictor = Evictor::new(Arc::new(cluster().with_node("worker1")));
        for json in [false, true] {
            let code = execute(&evictor, &request(&["-w", "worker1", "-n", "web"]), json).await;
            assert_eq!(code, 0);
        }
        assert_eq!(evictor.gateway().delete_count(), 0);
    }

    #[tokio::test]
    async fn rejections_exit_two() {
        let evictor = Evictor::new(Arc::new(cluster()));
        for args in [
            &["-n", "web"][..],
            &["-w", "kube-control-plane", "-n", "web"][..],
            &["-w", "worker2", "-n", "webi"][..],
            &["-w", "worker2", "-n", "web", "-b", "-3"][..],
        ] {
            assert_eq!(execute(&evictor, &request(args), false).await, 2);
        }
        assert_eq!(evictor.gateway().delete_count(), 0);
    }

    #[tokio::test]
    async fn delete_failure_exits_one() {
        let gateway = Arc::new(cluster().fail_delete("web-1", "forbidden"));
        let evictor = Evictor::new(gateway);
        let code = execute(&evictor, &request(&["-w", "worker2", "-n", "web"]), false).await;
        assert_eq!(code, 1);
        assert_eq!(evictor.gateway().pods().len(), 4);
    }
}
