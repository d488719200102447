//! Terminal output.
//!
//! All coloring lives here. The engine reports structured outcomes and this
//! module turns them into the messages users see.

use crossterm::style::Stylize;
use dolphin_evict::{EvictError, Progress, ProgressSink, Rejection, RunOutcome};

use crate::duration::format_interval;

/// Printed after every successful run.
pub const SUCCESS: &str = "Operation completed successfully! Dolphin is underwater. 🐬";

/// Printed after input errors.
pub const HELP_HINT: &str = "See 'kubectl dolphin -h' for help and examples.";

/// Print the success confirmation on stdout.
pub fn success() {
    println!("{}", SUCCESS.green());
}

/// Print a run summary on stdout, keeping the confirmation on stderr so
/// stdout stays a single JSON document.
pub fn json_summary(outcome: &RunOutcome) {
    match summary(outcome) {
        Ok(summary) => println!("{summary}"),
        Err(e) => tracing::warn!(error = %e, "Failed to serialize run summary"),
    }
    eprintln!("{}", SUCCESS.green());
}

/// The `--json` rendering of an outcome.
///
/// # Errors
///
/// Returns an error if the outcome cannot be serialized.
pub fn summary(outcome: &RunOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(outcome)
}

/// Print an informational empty-result notice on stderr.
pub fn no_pods(namespace: &str, node: &str) {
    eprintln!(
        "{}",
        format!("No pods found in namespace {namespace} deployed on node {node}.").red()
    );
}

/// Print a failure on stderr.
pub fn failure(err: &EvictError) {
    eprintln!("{}", error_message(err).red());
    if err.is_input_error() {
        eprintln!("{HELP_HINT}");
    }
}

/// Print a connection problem on stderr.
pub fn connection_failure(err: &anyhow::Error) {
    eprintln!("{}", format!("Error connecting Kubernetes: {err:#}").red());
}

/// The user-facing message for an error.
#[must_use]
pub fn error_message(err: &EvictError) -> String {
    match err {
        EvictError::Rejected(rejection) => rejection_message(rejection),
        EvictError::Execution { deleted, .. } if !deleted.is_empty() => {
            format!("{err}. {} pod(s) had already been deleted.", deleted.len())
        }
        EvictError::List { .. } | EvictError::Execution { .. } | EvictError::Cancelled { .. } => {
            format!("{err}.")
        }
    }
}

/// The user-facing message for a guard rejection.
#[must_use]
pub fn rejection_message(rejection: &Rejection) -> String {
    match rejection {
        Rejection::NodeRequired => "Error: --node NODE_NAME is required".to_string(),
        Rejection::NodeNotFound(name) => format!("nodes \"{name}\" not found."),
        Rejection::NodeLookupFailed { message, .. } => format!("{message}."),
        Rejection::ControlPlaneNode(_) => {
            "Can't perform this action on a control-plane node.".to_string()
        }
        Rejection::NamespaceNotFound(name) => format!("Namespace '{name}' does not exist."),
        Rejection::NamespaceLookupFailed { name, message } => {
            format!("Namespace '{name}' could not be read: {message}.")
        }
        Rejection::SystemNamespace(_) => {
            "Can't perform this action on a system-defined namespace.".to_string()
        }
        Rejection::InvalidBatchSize(_) => "Batch size must be ⩾ 1.".to_string(),
    }
}

/// Prints verbose progress notices on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleProgress;

impl ConsoleProgress {
    /// The line printed for an event.
    #[must_use]
    pub fn line(event: &Progress) -> String {
        match event {
            Progress::Deleting { .. } => format!("{}", "Deleting pods...".yellow()),
            Progress::Pod { name, dry_run } => {
                let suffix = if *dry_run { " (dry run)" } else { "" };
                format!(
                    "{} {} {}{suffix}",
                    "Pod".blue(),
                    name.as_str().cyan(),
                    "is being deleted!".blue()
                )
            }
            Progress::Waiting { interval, .. } => {
                format!("Waiting for {} ...", format_interval(*interval))
            }
        }
    }
}

impl ProgressSink for ConsoleProgress {
    fn notify(&self, event: &Progress) {
        println!("{}", Self::line(event));
    }
}
