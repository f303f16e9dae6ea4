use anyhow::{Context, Result};
use article_eater_client::config::{find_config_file, get_config, load_config, Config};
use article_eater_client::models::{JobStatus, JobType, Provider};
use article_eater_client::notify::{report_unhandled, Notifier, Toast, ToastKind};
use article_eater_client::storage::FileStore;
use article_eater_client::ui::{print_section, status_line, TerminalNotifier};
use article_eater_client::utils::{doi_url, extract_doi, mask_key};
use article_eater_client::{ApiError, ArticleEaterClient};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Article Eater - command-line client for the Article Eater research backend
#[derive(Parser, Debug)]
#[command(name = "article-eater")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Command-line client for the Article Eater research backend", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Pretty)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config and ARTICLE_EATER_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Indented JSON under a section header
    Pretty,
    /// Compact JSON (machine-readable)
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the backend is up
    Health,

    /// Submit and inspect processing jobs
    #[command(subcommand)]
    Jobs(JobsCommand),

    /// Browse the article library
    #[command(subcommand)]
    Articles(ArticlesCommand),

    /// Show extracted findings
    Findings {
        /// Only findings for this article
        #[arg(long)]
        article: Option<String>,

        /// Maximum number of findings (default: 100)
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Browse synthesized rules
    #[command(subcommand)]
    Rules(RulesCommand),

    /// Show usage and spend
    Usage {
        /// Usage across all users (requires admin credential)
        #[arg(long)]
        admin: bool,
    },

    /// Show or update the current user's profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Manage provider API keys
    #[command(subcommand)]
    Keys(KeysCommand),

    /// Extract a DOI from free text
    Doi {
        /// Text containing a DOI (e.g. a citation or URL)
        text: String,
    },

    /// Store the access token used for authenticated requests
    Login {
        /// Access token
        token: String,
    },

    /// Remove the stored access token
    Logout,
}

#[derive(Subcommand, Debug)]
enum JobsCommand {
    /// Queue a new job
    Submit {
        /// Job type (L0_harvest, L1_cluster, L2_extract, L3_synthesize, L4_expand, or a stage name)
        job_type: JobType,

        /// Job parameters as a JSON object
        #[arg(long, short, default_value = "{}")]
        params: String,

        /// Queue priority (default: 100)
        #[arg(long)]
        priority: Option<i64>,
    },

    /// Show one job
    Status {
        /// Job ID
        job_id: String,
    },

    /// List jobs
    List {
        /// Filter by status (pending, running, complete, failed)
        #[arg(long, short)]
        status: Option<JobStatus>,

        /// Maximum number of jobs (default: 100)
        #[arg(long, short)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
enum ArticlesCommand {
    /// List articles
    List {
        /// Page size (default: 50)
        #[arg(long, short)]
        limit: Option<usize>,

        /// Offset into the library (default: 0)
        #[arg(long)]
        offset: Option<usize>,
    },

    /// Show one article
    Get {
        /// Article ID
        article_id: String,
    },

    /// Search the library
    #[command(alias = "s")]
    Search {
        /// Search query string
        query: String,
    },
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// List rules
    List {
        /// Maximum number of rules (default: 50)
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Show one rule
    Get {
        /// Rule ID
        rule_id: String,
    },

    /// Show the evidence behind a rule
    Evidence {
        /// Rule ID
        rule_id: String,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Show the profile
    Show,

    /// Update profile fields
    Update {
        /// Fields to change as a JSON object
        data: String,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// List stored provider keys
    List,

    /// Add a provider key
    Add {
        /// Provider (openai, anthropic, google)
        provider: Provider,

        /// The provider's API key
        key: String,
    },

    /// Delete a provider key
    Delete {
        /// Provider (openai, anthropic, google)
        provider: Provider,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from file if specified or found in default locations
    let (mut config, config_path) = if let Some(config_path) = &cli.config {
        (load_config(config_path)?, Some(config_path.clone()))
    } else if let Some(config_path) = find_config_file() {
        (load_config(&config_path)?, Some(config_path))
    } else {
        (get_config()?, None)
    };

    init_tracing(&cli, &config);

    if let Some(path) = config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.api.timeout_secs = timeout;
    }

    let notifier = Arc::new(TerminalNotifier::new());

    if let Err(err) = run(&cli, &config, notifier.clone()).await {
        match err.downcast_ref::<ApiError>() {
            Some(api_err) => notifier.toast(Toast::error(api_err.message())),
            None => report_unhandled(notifier.as_ref(), &format!("{:#}", err)),
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Install the subscriber; `-v`/`-q` beat the configured level, `RUST_LOG` beats both.
fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let json = config.logging.format.as_deref() == Some("json");

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("article_eater_client={},article_eater={}", level, level)),
        ))
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

async fn run(cli: &Cli, config: &Config, notifier: Arc<TerminalNotifier>) -> Result<()> {
    // Commands that never touch the network
    match &cli.command {
        Commands::Doi { text } => return print_doi(text, cli.output),
        Commands::Login { token } => return login(config, token, cli.quiet),
        Commands::Logout => return logout(config, cli.quiet),
        _ => {}
    }

    let client = ArticleEaterClient::from_config(config, notifier)?;
    if !client.has_credential() {
        tracing::debug!("No stored credential; sending unauthenticated requests");
    }

    let (title, value) = match &cli.command {
        Commands::Health => ("Health", client.health_check().await?),

        Commands::Jobs(JobsCommand::Submit {
            job_type,
            params,
            priority,
        }) => {
            let params: Value =
                serde_json::from_str(params).context("--params must be valid JSON")?;
            let job = client.submit_job(job_type.clone(), params, *priority).await?;
            if !cli.quiet {
                eprintln!(
                    "{}",
                    status_line(ToastKind::Success, &format!("Submitted {} job", job_type), color())
                );
            }
            ("Job", job)
        }
        Commands::Jobs(JobsCommand::Status { job_id }) => {
            ("Job", client.get_job_status(job_id).await?)
        }
        Commands::Jobs(JobsCommand::List { status, limit }) => {
            ("Jobs", client.list_jobs(status.as_ref(), *limit).await?)
        }

        Commands::Articles(ArticlesCommand::List { limit, offset }) => {
            ("Articles", client.list_articles(*limit, *offset).await?)
        }
        Commands::Articles(ArticlesCommand::Get { article_id }) => {
            ("Article", client.get_article(article_id).await?)
        }
        Commands::Articles(ArticlesCommand::Search { query }) => {
            ("Search Results", client.search_articles(query).await?)
        }

        Commands::Findings { article, limit } => match article {
            Some(article_id) => ("Findings", client.get_findings(article_id).await?),
            None => ("Findings", client.get_all_findings(*limit).await?),
        },

        Commands::Rules(RulesCommand::List { limit }) => {
            ("Rules", client.list_rules(*limit).await?)
        }
        Commands::Rules(RulesCommand::Get { rule_id }) => {
            ("Rule", client.get_rule(rule_id).await?)
        }
        Commands::Rules(RulesCommand::Evidence { rule_id }) => {
            ("Evidence", client.get_rule_evidence(rule_id).await?)
        }

        Commands::Usage { admin: false } => ("Usage", client.get_usage().await?),
        Commands::Usage { admin: true } => ("Usage (all users)", client.get_usage_admin().await?),

        Commands::Profile(ProfileCommand::Show) => ("Profile", client.get_profile().await?),
        Commands::Profile(ProfileCommand::Update { data }) => {
            let data: Value = serde_json::from_str(data).context("profile data must be valid JSON")?;
            ("Profile", client.update_profile(data).await?)
        }

        Commands::Keys(KeysCommand::List) => ("API Keys", client.list_api_keys().await?),
        Commands::Keys(KeysCommand::Add { provider, key }) => {
            let result = client.add_api_key(provider.clone(), key).await?;
            if !cli.quiet {
                eprintln!(
                    "{}",
                    status_line(
                        ToastKind::Success,
                        &format!("Added {} key {}", provider, mask_key(key)),
                        color()
                    )
                );
            }
            ("API Key", result)
        }
        Commands::Keys(KeysCommand::Delete { provider }) => {
            ("API Key", client.delete_api_key(provider).await?)
        }

        // handled above
        Commands::Doi { .. } | Commands::Login { .. } | Commands::Logout => return Ok(()),
    };

    output_value(title, &value, cli.output)
}

fn color() -> bool {
    article_eater_client::ui::is_terminal()
}

fn output_value(title: &str, value: &Value, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Pretty => {
            print_section(title);
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }
    Ok(())
}

fn print_doi(text: &str, format: OutputFormat) -> Result<()> {
    let doi = extract_doi(text);
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "doi": doi,
                "url": doi.map(doi_url),
            });
            println!("{}", serde_json::to_string(&value)?);
        }
        OutputFormat::Pretty => match doi {
            Some(doi) => {
                println!("{}", doi);
                println!("{}", doi_url(doi));
            }
            None => eprintln!("{}", status_line(ToastKind::Warning, "No DOI found", color())),
        },
    }
    Ok(())
}

fn login(config: &Config, token: &str, quiet: bool) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        anyhow::bail!("Token must not be empty");
    }

    let store = FileStore::new(config.storage.resolved_path());
    store
        .set(&config.storage.credential_key, token)
        .with_context(|| format!("Failed to write {}", store.path().display()))?;

    tracing::debug!("Stored credential in {}", store.path().display());
    if !quiet {
        eprintln!(
            "{}",
            status_line(
                ToastKind::Success,
                &format!("Logged in with token {}", mask_key(token)),
                color()
            )
        );
    }
    Ok(())
}

fn logout(config: &Config, quiet: bool) -> Result<()> {
    let store = FileStore::new(config.storage.resolved_path());
    store
        .remove(&config.storage.credential_key)
        .with_context(|| format!("Failed to update {}", store.path().display()))?;

    if !quiet {
        eprintln!("{}", status_line(ToastKind::Success, "Logged out", color()));
    }
    Ok(())
}
