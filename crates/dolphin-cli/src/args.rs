//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use dolphin_core::{EvictionRequest, DEFAULT_NAMESPACE};
use dolphin_evict::ClientConfig;

use crate::duration::parse_interval;

const EXAMPLES: &str = "\
Delete all pods of a given namespace hosted on a given node.
Very useful when a node is going into maintenance and its pods need to be
scheduled on other nodes. Most effective after cordoning the node.

Examples:
  $ kubectl dolphin -n data -w worker1
  Operation completed successfully! Dolphin is underwater. 🐬

  $ kubectl dolphin --node kube-worker2 --namespace web --batch-size 2 --dry-run -i 3s
  Operation completed successfully! Dolphin is underwater. 🐬

  $ kubectl dolphin --node kube-worker2 --namespace webi -i 3s
  Namespace 'webi' does not exist.

  $ kubectl dolphin --node kube-worker2 --namespace web -i 3s --batch-size -3
  Batch size must be ⩾ 1.
  See 'kubectl dolphin -h' for help and examples.

  $ kubectl dolphin --node kube-control-plane --namespace web
  Can't perform this action on a control-plane node.

  $ kubectl dolphin --node kube-worker3 --namespace web
  nodes \"kube-worker3\" not found.";

/// DOLPHIN: Delete On-demand Local Pods Hosted In a Node.
#[derive(Parser, Debug)]
#[command(name = "kubectl-dolphin", bin_name = "kubectl dolphin")]
#[command(author, version, long_about = None, after_help = EXAMPLES)]
pub struct Args {
    /// Node name on which the pod(s) are scheduled (required).
    #[arg(short = 'w', long, env = "DOLPHIN_NODE")]
    pub node: Option<String>,

    /// Namespace of the pod(s).
    #[arg(short, long, env = "DOLPHIN_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Delete in batches of N pods.
    #[arg(short, long, value_name = "N", default_value_t = 1, allow_negative_numbers = true)]
    pub batch_size: i64,

    /// Wait this long between batches, e.g. 3s or 1m30s (minimum 0s).
    #[arg(
        short,
        long,
        value_name = "DURATION",
        default_value = "0s",
        value_parser = parse_interval,
        allow_hyphen_values = true
    )]
    pub interval: Duration,

    /// Ask the API server to validate deletes without performing them.
    #[arg(long)]
    pub dry_run: bool,

    /// Show pod names and pauses while deleting.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print a JSON summary of the run on stdout.
    #[arg(long)]
    pub json: bool,

    /// Path to a kubeconfig file (defaults to in-cluster config or ~/.kube/config).
    #[arg(long, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use.
    #[arg(long, value_name = "NAME")]
    pub context: Option<String>,

    /// Enable debug logging on stderr.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// The eviction request described by these arguments.
    #[must_use]
    pub fn request(&self) -> EvictionRequest {
        EvictionRequest::builder()
            .namespace(self.namespace.clone())
            .node_opt(self.node.clone())
            .batch_size(self.batch_size)
            .interval(self.interval)
            .dry_run(self.dry_run)
            .verbose(self.verbose)
            .build()
    }

    /// Where to load cluster credentials from.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            kubeconfig: self.kubeconfig.clone(),
            context: self.context.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("kubectl-dolphin").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = parse(&["-w", "worker1"]);
        let request = args.request();
        assert_eq!(request.node_name(), Some("worker1"));
        assert_eq!(request.namespace(), "default");
        assert_eq!(request.batch_size(), 1);
        assert_eq!(request.interval(), Duration::ZERO);
        assert!(!request.dry_run());
        assert!(!request.verbose());
        assert!(args.client_config().is_inferred());
    }

    #[test]
    fn long_flags() {
        let args = parse(&[
            "--node",
            "kube-worker2",
            "--namespace",
            "web",
            "--batch-size",
            "2",
            "--dry-run",
            "-i",
            "3s",
            "--verbose",
            "--context",
            "kind-kube",
        ]);
        let request = args.request();
        assert_eq!(request.node_name(), Some("kube-worker2"));
        assert_eq!(request.namespace(), "web");
        assert_eq!(request.batch_size(), 2);
        assert_eq!(request.interval(), Duration::from_secs(3));
        assert!(request.dry_run());
        assert!(request.verbose());
        assert_eq!(args.client_config().context.as_deref(), Some("kind-kube"));
    }

    #[test]
    fn negative_batch_size_reaches_the_guard() {
        let args = parse(&["-w", "kube-worker2", "-n", "web", "-i", "3s", "-b", "-3"]);
        assert_eq!(args.request().batch_size(), -3);
    }

    #[test]
    fn negative_interval_clamps() {
        let args = parse(&["-w", "worker1", "-i", "-3s"]);
        assert_eq!(args.interval, Duration::ZERO);
    }

    #[test]
    fn missing_node_is_left_to_the_guard() {
        let args = parse(&["-n", "web"]);
        assert_eq!(args.request().node_name(), None);
    }

    #[test]
    fn bad_interval_is_a_parse_error() {
        let result = Args::try_parse_from(["kubectl-dolphin", "-w", "worker1", "-i", "soon"]);
        assert!(result.is_err());
    }
}
