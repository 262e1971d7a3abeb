//! Command-line surface for the `vsphere-provider` binary.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about = "vSphere back-end for the VirtRigaud provider abstraction plane")]
pub struct Cli {
    /// Minimum log level; overrides `RUST_LOG` if set.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Override the gRPC listen address (otherwise `GRPC_LISTEN_ADDR` or the default).
    #[arg(long)]
    pub grpc_listen_addr: Option<String>,

    /// Override the admin HTTP listen address (otherwise `ADMIN_LISTEN_ADDR` or the default).
    #[arg(long)]
    pub admin_listen_addr: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Default, PartialEq, Eq)]
pub enum Command {
    /// Run the gRPC provider service and the admin HTTP surface. Default.
    #[default]
    Serve,

    /// Run the Validate RPC logic once against the configured endpoint and exit.
    /// Intended for init containers and preflight checks.
    Validate,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }
}
