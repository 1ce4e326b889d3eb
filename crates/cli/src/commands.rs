//! Subcommands of the `qi` binary.
//!
//! Every command that touches a service starts a fresh [`Session`]: a
//! [`Directory`] holding the demo service and the broadcaster its signals
//! go through.

use crate::convert;
use crate::demo::{self, SERVICE_NAME};
use crate::directory::Directory;
use crate::transport;
use clap::Subcommand;
use corelib::{Signature, Tuple};
use dispatch::{LocalBroadcaster, MemberKind, Object, SignalEvent};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Parse a signature and show its parts
    Parse { signature: String },

    /// List the demo service's members
    Describe {
        /// Print the description as JSON
        #[arg(long)]
        json: bool,
    },

    /// Call a method on the demo service
    Call {
        method: String,
        #[arg(allow_negative_numbers = true)]
        args: Vec<String>,
    },

    /// Emit a signal on the demo service
    Emit {
        signal: String,
        #[arg(allow_negative_numbers = true)]
        args: Vec<String>,
    },
}

/// Text printed for a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub output: String,
}

impl CommandResult {
    fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.output)
    }
}

pub async fn execute(command: &Command, timeout: Duration) -> anyhow::Result<CommandResult> {
    match command {
        Command::Parse { signature } => parse(signature),
        Command::Describe { json } => describe(&Session::start()?, *json),
        Command::Call { method, args } => call(&Session::start()?, method, args, timeout).await,
        Command::Emit { signal, args } => emit(&Session::start()?, signal, args),
    }
}

/// Demo service plus the plumbing around it.
pub struct Session {
    pub directory: Directory,
    pub broadcaster: Arc<LocalBroadcaster>,
}

impl Session {
    pub fn start() -> anyhow::Result<Self> {
        let broadcaster = Arc::new(LocalBroadcaster::new());
        let directory = Directory::new();
        let service = demo::reply_service(Arc::clone(&broadcaster))?;
        directory.register(SERVICE_NAME, Arc::new(service))?;
        Ok(Self {
            directory,
            broadcaster,
        })
    }

    fn service(&self) -> anyhow::Result<Arc<Object>> {
        Ok(self.directory.service(SERVICE_NAME)?)
    }
}

fn parse(text: &str) -> anyhow::Result<CommandResult> {
    let signature = Signature::parse(text)?;
    let params: Vec<String> = signature.params().iter().map(|p| p.tag.to_string()).collect();
    let returns: Vec<String> = signature.returns().iter().map(|t| t.to_string()).collect();

    Ok(CommandResult::new(format!(
        "name: {}\nparams: ({})\nreturns: ({})\ncanonical: {}",
        signature.name(),
        params.join(", "),
        returns.join(", "),
        signature
    )))
}

fn describe(session: &Session, json: bool) -> anyhow::Result<CommandResult> {
    let description = session.service()?.describe();
    if json {
        return Ok(CommandResult::new(serde_json::to_string_pretty(&description)?));
    }

    let mut lines = Vec::with_capacity(description.members.len());
    for member in &description.members {
        let mut line = format!("{} {} {}", member.id, member.kind, member.signature);
        if let Some(text) = &member.description {
            line.push_str(&format!("  # {}", text));
        }
        lines.push(line);
    }
    Ok(CommandResult::new(lines.join("\n")))
}

async fn call(
    session: &Session,
    method: &str,
    args: &[String],
    timeout: Duration,
) -> anyhow::Result<CommandResult> {
    let object = session.service()?;
    let args = read_args(&object, method, MemberKind::Method, args);
    let result = transport::call_with_timeout(object, method, args, timeout).await?;
    Ok(CommandResult::new(result.to_string()))
}

fn emit(session: &Session, signal: &str, args: &[String]) -> anyhow::Result<CommandResult> {
    let delivered = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&delivered);
    let link = session
        .broadcaster
        .subscribe(signal, move |event: &SignalEvent| {
            info!(signal = %event.signature, args = %event.args, "signal received");
            counter.fetch_add(1, Ordering::Relaxed);
        });

    let object = session.service()?;
    let args = read_args(&object, signal, MemberKind::Signal, args);
    let outcome = object.emit(signal, &args);
    session.broadcaster.unsubscribe(link);
    outcome?;

    Ok(CommandResult::new(format!(
        "{}{} delivered to {} subscriber(s)",
        signal,
        args,
        delivered.load(Ordering::Relaxed)
    )))
}

/// Read textual arguments against the first overload that accepts them.
///
/// Falls back to all-string arguments so the dispatcher reports why no
/// overload matched.
fn read_args(object: &Object, name: &str, kind: MemberKind, args: &[String]) -> Tuple {
    for signature in object.lookup(name, kind) {
        match convert::parse_args(&signature, args) {
            Ok(tuple) => {
                debug!(overload = %signature, "arguments read");
                return tuple;
            }
            Err(err) => debug!(overload = %signature, error = %err, "overload skipped"),
        }
    }
    convert::as_strings(args)
}
