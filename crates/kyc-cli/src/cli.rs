use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use kyc_types::FieldKind;

#[derive(Parser)]
#[command(
    name = "kyc",
    about = "Staged identity verification: identity, tax ID and bank account",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Workflow configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check a value against the local format rule
    Check(CheckArgs),
    /// Format-check a value, then verify it against the simulated directory
    Verify(VerifyArgs),
    /// Show the configured stages and their requirements
    Stages,
    /// Walk a whole session from the given inputs and submit it
    Run(RunArgs),
}

#[derive(Args)]
pub struct CheckArgs {
    /// identity-number, tax-id, account-number, routing-code or document-file
    pub kind: FieldKind,
    /// The value; for document-file, a path or NAME:MIME:SIZE
    pub value: String,
}

#[derive(Args)]
pub struct VerifyArgs {
    pub kind: FieldKind,
    pub value: String,
    /// Reject values missing from the directory for every kind
    #[arg(long)]
    pub strict: bool,
    /// Override the simulated gateway latency
    #[arg(long)]
    pub latency_ms: Option<u64>,
}

#[derive(Args)]
pub struct RunArgs {
    #[arg(long)]
    pub identity_number: Option<String>,
    /// Identity document: a path or NAME:MIME:SIZE
    #[arg(long)]
    pub identity_doc: Option<String>,
    #[arg(long)]
    pub tax_id: Option<String>,
    /// Tax document: a path or NAME:MIME:SIZE
    #[arg(long)]
    pub tax_doc: Option<String>,
    #[arg(long)]
    pub account_number: Option<String>,
    #[arg(long)]
    pub routing_code: Option<String>,
    /// Make the simulated submission fail
    #[arg(long)]
    pub fail_submit: bool,
}
