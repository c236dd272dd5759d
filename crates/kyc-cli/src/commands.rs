use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use kyc_gate::{Requirement, StageSpec};
use kyc_gateway::{FallbackConfig, InMemoryRecords, SimulatedGateway, VerificationGateway};
use kyc_session::{Command as SessionCommand, CommandOutcome, Session, SessionSnapshot, WorkflowConfig};
use kyc_types::{DocumentFile, DocumentSlot, FieldKind, FieldStatus, Verdict};
use kyc_validate::FieldValidator;

use crate::cli::*;

/// Runs the parsed command. `Ok(false)` means the command worked but the
/// input did not pass.
pub async fn run_command(cli: Cli) -> anyhow::Result<bool> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Check(args) => cmd_check(&config, args, cli.format),
        Command::Verify(args) => cmd_verify(&config, args, cli.format).await,
        Command::Stages => cmd_stages(&config, cli.format),
        Command::Run(args) => cmd_run(config, args, cli.format).await,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<WorkflowConfig> {
    match path {
        Some(path) => WorkflowConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(WorkflowConfig::default()),
    }
}

fn cmd_check(config: &WorkflowConfig, args: CheckArgs, format: OutputFormat) -> anyhow::Result<bool> {
    let validator = FieldValidator::new(config.documents.clone());
    let verdict = if args.kind == FieldKind::DocumentFile {
        let file = parse_document(&args.value)?;
        validator.validate_document(Some(&file))
    } else {
        validator.validate(args.kind, &args.value)
    };

    print_verdict(args.kind, &verdict, format)?;
    Ok(verdict.is_valid())
}

async fn cmd_verify(config: &WorkflowConfig, args: VerifyArgs, format: OutputFormat) -> anyhow::Result<bool> {
    if !args.kind.requires_verification() {
        bail!("{} is not verified remotely; use `kyc check`", args.kind);
    }

    let validator = FieldValidator::new(config.documents.clone());
    let local = validator.validate(args.kind, &args.value);
    if !local.is_valid() {
        print_verdict(args.kind, &local, format)?;
        return Ok(false);
    }

    let mut gateway_config = config.gateway.clone();
    if args.strict {
        gateway_config.fallback = FallbackConfig::strict();
    }
    if let Some(latency_ms) = args.latency_ms {
        gateway_config.latency_ms = latency_ms;
    }
    let gateway = SimulatedGateway::new(Arc::new(InMemoryRecords::demo()), &gateway_config);

    tracing::debug!(kind = %args.kind, latency = ?gateway.latency(), "calling verification gateway");
    let verdict = gateway.verify(args.kind, &args.value).await?;
    print_verdict(args.kind, &verdict, format)?;
    Ok(verdict.is_valid())
}

fn cmd_stages(config: &WorkflowConfig, format: OutputFormat) -> anyhow::Result<bool> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&config.stages)?);
        return Ok(true);
    }

    for (i, stage) in config.stages.iter().enumerate() {
        println!("{} {}  ({})", format!("{}.", i + 1).bold(), stage.title.bold(), stage.id.dimmed());
        if !stage.description.is_empty() {
            println!("   {}", stage.description);
        }
        for requirement in stage.requirements() {
            let label = match requirement {
                Requirement::Field(kind) => format!("{} (verified)", kind.label()),
                Requirement::Attachment(slot) => format!("{} (attached)", slot.label()),
            };
            println!("   - {label}");
        }
    }
    Ok(true)
}

async fn cmd_run(mut config: WorkflowConfig, args: RunArgs, format: OutputFormat) -> anyhow::Result<bool> {
    if args.fail_submit {
        config.submission.failure_rate = 1.0;
    }
    let fields = run_fields(&args);
    let documents = run_documents(&args)?;

    let mut session = Session::from_config(&config)?;
    let text = format == OutputFormat::Text;
    let total = config.stages.len();

    for (index, stage) in config.stages.iter().enumerate() {
        for kind in &stage.required_fields {
            if let Some(value) = fields.get(kind) {
                session.handle(SessionCommand::input(*kind, value.clone())).await;
            }
        }
        for slot in &stage.required_attachments {
            if let Some(file) = documents.get(slot) {
                session.handle(SessionCommand::attach(*slot, file.clone())).await;
            }
        }
        session.settle().await;

        if text {
            println!("{} {}", format!("[{}/{}]", index + 1, total).dimmed(), stage.title.bold());
            print_stage(&session.snapshot(), stage);
        }

        let passed = match session.handle(SessionCommand::Advance).await {
            CommandOutcome::Advanced(_) => continue,
            CommandOutcome::Submitted(receipt) => {
                if text {
                    println!("{} {}", "✓".green().bold(), receipt.message);
                    println!("  Reference: {}", receipt.reference.to_string().yellow());
                    println!("  Session: {}", receipt.session.short_id().cyan());
                }
                true
            }
            CommandOutcome::SubmissionFailed(err) => {
                if text {
                    println!("{} Submission failed: {err}", "✗".red().bold());
                }
                false
            }
            CommandOutcome::Rejected(_) => {
                if text {
                    println!("{} Cannot continue past {}", "✗".red().bold(), stage.title.bold());
                    for reason in &session.snapshot().blocked_by {
                        println!("  - {reason}");
                    }
                }
                false
            }
            other => bail!("unexpected outcome for advance: {other:?}"),
        };
        return finish(&session.snapshot(), format, passed);
    }

    bail!("the workflow has no stages")
}

fn finish(snapshot: &SessionSnapshot, format: OutputFormat, passed: bool) -> anyhow::Result<bool> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    }
    Ok(passed)
}

fn print_stage(snapshot: &SessionSnapshot, stage: &StageSpec) {
    for kind in &stage.required_fields {
        let Some(field) = snapshot.field(*kind) else {
            continue;
        };
        let mark = match field.status {
            FieldStatus::Valid => "✓".green(),
            FieldStatus::Invalid => "✗".red(),
            FieldStatus::Validating => "…".yellow(),
            FieldStatus::Idle => "-".dimmed(),
        };
        println!("  {} {:<16} {}", mark, field.label, field.message.as_deref().unwrap_or(""));
        if let Some(record) = &field.record {
            for (attribute, value) in record.iter() {
                println!("      {}: {}", attribute.dimmed(), value);
            }
        }
    }

    for slot in &stage.required_attachments {
        let Some(attachment) = snapshot.attachment(*slot) else {
            continue;
        };
        match (&attachment.document, &attachment.error) {
            (Some(doc), _) => println!("  {} {:<16} {} ({})", "✓".green(), slot.label(), doc.name, doc.size),
            (None, Some(error)) => println!("  {} {:<16} {}", "✗".red(), slot.label(), error),
            (None, None) => println!("  {} {:<16} not attached", "-".dimmed(), slot.label()),
        }
    }
}

fn print_verdict(kind: FieldKind, verdict: &Verdict, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        let out = serde_json::json!({ "kind": kind, "verdict": verdict });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if verdict.is_valid() {
        println!("{} {} is valid", "✓".green().bold(), kind.label());
    } else {
        println!(
            "{} {}",
            "✗".red().bold(),
            verdict.message.as_deref().unwrap_or("invalid")
        );
    }
    if let Some(record) = &verdict.record {
        for (attribute, value) in record.iter() {
            println!("  {}: {}", attribute.dimmed(), value);
        }
    }
    Ok(())
}

fn run_fields(args: &RunArgs) -> BTreeMap<FieldKind, String> {
    [
        (FieldKind::IdentityNumber, &args.identity_number),
        (FieldKind::TaxId, &args.tax_id),
        (FieldKind::AccountNumber, &args.account_number),
        (FieldKind::RoutingCode, &args.routing_code),
    ]
    .into_iter()
    .filter_map(|(kind, value)| value.clone().map(|v| (kind, v)))
    .collect()
}

fn run_documents(args: &RunArgs) -> anyhow::Result<BTreeMap<DocumentSlot, DocumentFile>> {
    let mut documents = BTreeMap::new();
    for (slot, arg) in [
        (DocumentSlot::IdentityDocument, &args.identity_doc),
        (DocumentSlot::TaxDocument, &args.tax_doc),
    ] {
        if let Some(arg) = arg {
            documents.insert(slot, parse_document(arg)?);
        }
    }
    Ok(documents)
}

/// Parses a document argument: an existing file path, or `NAME:MIME:SIZE`.
fn parse_document(arg: &str) -> anyhow::Result<DocumentFile> {
    let path = Path::new(arg);
    if path.is_file() {
        let meta = std::fs::metadata(path).with_context(|| format!("cannot read {arg}"))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| arg.to_string());
        return Ok(DocumentFile::new(name, meta.len(), guess_mime(path)));
    }

    let mut parts = arg.rsplitn(3, ':');
    let (Some(size), Some(mime), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("document must be a file path or NAME:MIME:SIZE, got '{arg}'");
    };
    if name.is_empty() {
        bail!("document name is empty in '{arg}'");
    }
    let size: u64 = size
        .parse()
        .with_context(|| format!("invalid document size '{size}'"))?;
    Ok(DocumentFile::new(name, size, mime))
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
