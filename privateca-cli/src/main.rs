use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use log::debug;
use similar::{ChangeTag, TextDiff};

use privateca_core::apply::Reconciliation;
use privateca_core::effect::Effect;
use privateca_core::lifecycle::{ApplyOptions, LifecycleParam};
use privateca_core::resource::Resource;
use privateca_gcp::certificate_authority::wire;
use privateca_gcp::config::{ACCESS_TOKEN_ENV, ENDPOINT_ENV};
use privateca_gcp::{CertificateAuthority, ClientConfig, DeleteOptions, PrivateCaProvider};

#[derive(Parser)]
#[command(name = "privateca")]
#[command(about = "Manage Certificate Authority Service certificate authorities", long_about = None)]
struct Cli {
    /// API base path
    #[arg(long, global = true, env = ENDPOINT_ENV)]
    endpoint: Option<String>,

    /// OAuth access token; the metadata server is asked when unset
    #[arg(long, global = true, env = ACCESS_TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a manifest without contacting the API
    Validate {
        /// Path to the JSON manifest
        file: PathBuf,
    },
    /// Show the changes apply would make
    Plan {
        /// Path to the JSON manifest
        file: PathBuf,

        /// Also show a line diff of the observed and desired documents
        #[arg(long)]
        diff: bool,
    },
    /// Create or update the certificate authority to match the manifest
    Apply {
        /// Path to the JSON manifest
        file: PathBuf,

        #[command(flatten)]
        lifecycle: LifecycleArgs,

        #[command(flatten)]
        delete: DeleteArgs,

        /// Enable the certificate authority once it matches the manifest
        #[arg(long)]
        enable: bool,
    },
    /// Print the current state as JSON
    Get {
        /// Path to the JSON manifest
        file: PathBuf,
    },
    /// List the certificate authorities of a CA pool
    List {
        #[arg(long)]
        project: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        ca_pool: String,
    },
    /// Delete the certificate authority, disabling it first if needed
    Delete {
        /// Path to the JSON manifest
        file: PathBuf,

        #[command(flatten)]
        delete: DeleteArgs,

        /// Skip confirmation prompt (auto-approve)
        #[arg(long)]
        auto_approve: bool,
    },
    /// Enable the certificate authority
    Enable {
        /// Path to the JSON manifest
        file: PathBuf,
    },
    /// Disable the certificate authority
    Disable {
        /// Path to the JSON manifest
        file: PathBuf,
    },
    /// Print the CSR of a subordinate certificate authority awaiting activation
    FetchCsr {
        /// Path to the JSON manifest
        file: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct LifecycleArgs {
    /// Fail if the certificate authority does not exist
    #[arg(long)]
    block_creation: bool,
    /// Fail if the certificate authority already exists
    #[arg(long)]
    block_acquire: bool,
    /// Fail if the certificate authority would have to be recreated
    #[arg(long)]
    block_destruction: bool,
    /// Fail if the certificate authority would be updated in place
    #[arg(long)]
    block_modification: bool,
}

impl LifecycleArgs {
    fn to_options(&self) -> ApplyOptions {
        [
            (self.block_creation, LifecycleParam::BlockCreation),
            (self.block_acquire, LifecycleParam::BlockAcquire),
            (self.block_destruction, LifecycleParam::BlockDestruction),
            (self.block_modification, LifecycleParam::BlockModification),
        ]
        .into_iter()
        .filter(|(set, _)| *set)
        .fold(ApplyOptions::new(), |options, (_, param)| {
            options.with_lifecycle_param(param)
        })
    }
}

#[derive(Args, Debug, Default)]
struct DeleteArgs {
    /// Delete even if the certificate authority has active certificates
    #[arg(long)]
    ignore_active_certificates: bool,
    /// Delete immediately instead of after the grace period
    #[arg(long)]
    skip_grace_period: bool,
}

impl DeleteArgs {
    fn to_options(&self) -> DeleteOptions {
        DeleteOptions {
            ignore_active_certificates: self.ignore_active_certificates,
            skip_grace_period: self.skip_grace_period,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = client_config(cli.endpoint.as_deref(), cli.token.as_deref());
    let result = match cli.command {
        Commands::Validate { file } => run_validate(&file),
        Commands::Plan { file, diff } => run_plan(config, &file, diff).await,
        Commands::Apply {
            file,
            lifecycle,
            delete,
            enable,
        } => run_apply(config, &file, &lifecycle, &delete, enable).await,
        Commands::Get { file } => run_get(config, &file).await,
        Commands::List {
            project,
            location,
            ca_pool,
        } => run_list(config, &project, &location, &ca_pool).await,
        Commands::Delete {
            file,
            delete,
            auto_approve,
        } => run_delete(config, &file, &delete, auto_approve).await,
        Commands::Enable { file } => run_enable(config, &file).await,
        Commands::Disable { file } => run_disable(config, &file).await,
        Commands::FetchCsr { file } => run_fetch_csr(config, &file).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn client_config(endpoint: Option<&str>, token: Option<&str>) -> ClientConfig {
    let mut config = ClientConfig::new();
    if let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) {
        config = config.with_base_path(endpoint);
    }
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        config = config.with_access_token(token);
    }
    config
}

fn get_provider(config: ClientConfig) -> Result<PrivateCaProvider, String> {
    debug!("Using endpoint {}", config.base_path);
    PrivateCaProvider::new(config).map_err(|e| e.to_string())
}

/// Read a JSON manifest describing one certificate authority
fn load_manifest(file: &Path) -> Result<CertificateAuthority, String> {
    let content = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("Parse error in {}: {}", file.display(), e))
}

fn run_validate(file: &Path) -> Result<(), String> {
    let ca = load_manifest(file)?;

    println!("{}", "Validating...".cyan());
    ca.validate()
        .map_err(|e| format!("{}: {}", ca.id(), e))?;

    println!(
        "{}",
        "✓ Certificate authority validated successfully."
            .green()
            .bold()
    );
    println!("  • {}", ca.relative_name());
    Ok(())
}

async fn run_plan(config: ClientConfig, file: &Path, show_diff: bool) -> Result<(), String> {
    let ca = load_manifest(file)?;
    let provider = get_provider(config)?;

    let reconciliation = provider.plan(&ca).await.map_err(|e| e.to_string())?;
    print_plan(&reconciliation);

    if show_diff {
        print_document_diff(&reconciliation)?;
    }
    Ok(())
}

async fn run_apply(
    config: ClientConfig,
    file: &Path,
    lifecycle: &LifecycleArgs,
    delete: &DeleteArgs,
    enable: bool,
) -> Result<(), String> {
    let ca = load_manifest(file)?;
    let provider = get_provider(config)?.with_delete_options(delete.to_options());

    let reconciliation = provider.plan(&ca).await.map_err(|e| e.to_string())?;
    print_plan(&reconciliation);
    if reconciliation.plan.is_empty() && !enable {
        return Ok(());
    }

    println!();
    println!("{}", "Applying changes...".cyan().bold());
    let effects = reconciliation.plan.effects().to_vec();
    let state = provider
        .apply_reconciliation(&ca, reconciliation, &lifecycle.to_options())
        .await
        .map_err(|e| e.to_string())?;

    for effect in &effects {
        println!("  {} {}", "✓".green(), format_effect(effect));
    }

    if enable && !state.is_enabled() {
        provider
            .enable_certificate_authority(&state)
            .await
            .map_err(|e| e.to_string())?;
        println!("  {} enable", "✓".green());
    }

    println!();
    println!("{}", "Apply complete!".green().bold());
    Ok(())
}

async fn run_get(config: ClientConfig, file: &Path) -> Result<(), String> {
    let ca = load_manifest(file)?;
    let provider = get_provider(config)?;

    let observed = provider
        .get_certificate_authority(&ca)
        .await
        .map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&observed).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

async fn run_list(
    config: ClientConfig,
    project: &str,
    location: &str,
    ca_pool: &str,
) -> Result<(), String> {
    let provider = get_provider(config)?;
    let cas = provider
        .list_certificate_authorities(project, location, ca_pool)
        .await
        .map_err(|e| e.to_string())?;

    if cas.is_empty() {
        println!("{}", "No certificate authorities found.".yellow());
        return Ok(());
    }
    for ca in &cas {
        println!("{}", format_list_row(ca));
    }
    Ok(())
}

async fn run_delete(
    config: ClientConfig,
    file: &Path,
    delete: &DeleteArgs,
    auto_approve: bool,
) -> Result<(), String> {
    let ca = load_manifest(file)?;
    let provider = get_provider(config)?;

    println!("  {} {}", "-".red().bold(), ca.relative_name());
    println!();

    if !auto_approve {
        println!(
            "{}",
            "Do you really want to delete this certificate authority?"
                .yellow()
                .bold()
        );
        println!(
            "  {}",
            "Certificates it issued stop validating. Type 'yes' to confirm.".yellow()
        );
        print!("\n  Enter a value: ");
        std::io::Write::flush(&mut std::io::stdout()).map_err(|e| e.to_string())?;

        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .map_err(|e| e.to_string())?;

        if input.trim() != "yes" {
            println!();
            println!("{}", "Delete cancelled.".yellow());
            return Ok(());
        }
        println!();
    }

    provider
        .delete_certificate_authority(&ca, &delete.to_options())
        .await
        .map_err(|e| e.to_string())?;
    println!("{}", "Delete complete!".green().bold());
    Ok(())
}

async fn run_enable(config: ClientConfig, file: &Path) -> Result<(), String> {
    let ca = load_manifest(file)?;
    get_provider(config)?
        .enable_certificate_authority(&ca)
        .await
        .map_err(|e| e.to_string())?;
    println!("{} {}", "✓ Enabled".green().bold(), ca.relative_name());
    Ok(())
}

async fn run_disable(config: ClientConfig, file: &Path) -> Result<(), String> {
    let ca = load_manifest(file)?;
    get_provider(config)?
        .disable_certificate_authority(&ca)
        .await
        .map_err(|e| e.to_string())?;
    println!("{} {}", "✓ Disabled".green().bold(), ca.relative_name());
    Ok(())
}

async fn run_fetch_csr(config: ClientConfig, file: &Path) -> Result<(), String> {
    let ca = load_manifest(file)?;
    let csr = get_provider(config)?
        .fetch_csr(&ca)
        .await
        .map_err(|e| e.to_string())?;
    println!("{}", csr.trim_end());
    Ok(())
}

fn print_plan(reconciliation: &Reconciliation<CertificateAuthority>) {
    let plan = &reconciliation.plan;
    if plan.is_empty() {
        println!(
            "{}",
            "No changes. Certificate authority is up-to-date.".green()
        );
        return;
    }

    println!("{}", "Execution Plan:".cyan().bold());
    println!();

    let symbol = if plan.is_recreate() {
        "-/+".red().bold()
    } else if plan.exists() {
        "~".yellow().bold()
    } else {
        "+".green().bold()
    };
    println!("  {} {}", symbol, reconciliation.desired.relative_name());

    if !plan.exists() {
        if let Ok(document) = to_document(&reconciliation.desired) {
            for line in document.lines() {
                println!("      {}", line.green());
            }
        }
    } else {
        for diff in plan.diffs() {
            let actual = diff.actual.as_deref().unwrap_or("<unset>");
            let desired = diff.desired.as_deref().unwrap_or("<unset>");
            let suffix = if diff.requires_recreate() {
                format!(" {}", "(forces replacement)".red())
            } else {
                String::new()
            };
            println!(
                "      {}: {} → {}{}",
                diff.field_name,
                actual.red(),
                desired.green(),
                suffix
            );
        }
    }

    println!();
    println!("{}", plan.summary());
}

/// Line diff of the request documents for the observed and desired state
fn print_document_diff(reconciliation: &Reconciliation<CertificateAuthority>) -> Result<(), String> {
    let observed = match &reconciliation.initial {
        Some(initial) => to_document(initial)?,
        None => String::new(),
    };
    let desired = to_document(&reconciliation.desired)?;

    println!("\n{}", "Document diff:".cyan().bold());
    let diff = TextDiff::from_lines(&observed, &desired);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-".red(),
            ChangeTag::Insert => "+".green(),
            ChangeTag::Equal => " ".normal(),
        };
        print!("{}{}", sign, change);
    }
    Ok(())
}

fn to_document(ca: &CertificateAuthority) -> Result<String, String> {
    let body = wire::expand(ca).map_err(|e| e.to_string())?;
    let mut json = serde_json::to_string_pretty(&body).map_err(|e| e.to_string())?;
    json.push('\n');
    Ok(json)
}

fn format_effect(effect: &Effect) -> String {
    match effect {
        Effect::Create => format!("{} create", effect.symbol().green().bold()),
        Effect::Update { .. } => format!("{} {}", effect.symbol().yellow().bold(), effect),
        Effect::Delete => format!("{} delete", effect.symbol().red().bold()),
    }
}

fn format_list_row(ca: &CertificateAuthority) -> String {
    format!(
        "{:<32} {:<12} {:<26} {}",
        ca.name.as_deref().unwrap_or("-"),
        ca.ca_type.as_ref().map(|t| t.as_str()).unwrap_or("-"),
        ca.state.as_ref().map(|s| s.as_str()).unwrap_or("-"),
        ca.lifetime.as_deref().unwrap_or("-"),
    )
}
