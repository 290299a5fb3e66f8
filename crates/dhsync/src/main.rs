// # dhsync - one-shot A-record synchronizer
//
// Thin integration layer: reads configuration from the environment, sets up
// logging, runs one sync through `dhsync-core` and maps the outcome to an
// exit code. No DNS logic lives here.
//
// ## Configuration
//
// ### Provider
// - `DHSYNC_API_KEY`: DreamHost API key (required)
// - `DHSYNC_API_URL`: API origin (default: https://api.dreamhost.com/)
// - `DHSYNC_COOLDOWN_SECS`: wait after a rate-limit response (default: 600)
// - `DHSYNC_TIMEOUT_SECS`: HTTP request timeout (default: 30)
//
// ### Record
// - `DHSYNC_RECORD`: hostname to keep up to date (required)
// - `DHSYNC_NEW_IP`: address the hostname should resolve to (required)
// - `DHSYNC_CURRENT_IP`: address to replace; when unset, the published
//   A records are looked up first
// - `DHSYNC_COMMENT`: comment attached to the records
//
// ### Logging
// - `DHSYNC_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export DHSYNC_API_KEY=your_key
// export DHSYNC_RECORD=home.example.com
// export DHSYNC_NEW_IP="$(curl -s https://api.ipify.org)"
//
// dhsync
// ```

use anyhow::{Context, Result};
use dhsync_core::{
    ApiConfig, ReconcileError, ReconcileResult, ReconcileState, ReconciliationEngine,
};
use dhsync_http::ReqwestFetcher;
use std::env;
use std::net::Ipv4Addr;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the possible results of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncExitCode {
    /// Record applied or already up to date
    Applied = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error, or the provider rejected the new record
    RuntimeError = 2,
    /// New record live but the old one is still published
    NeedsCleanup = 3,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<ReconcileState> for SyncExitCode {
    fn from(state: ReconcileState) -> Self {
        match state {
            ReconcileState::Applied => SyncExitCode::Applied,
            ReconcileState::PartiallyApplied => SyncExitCode::NeedsCleanup,
            ReconcileState::NotApplied => SyncExitCode::RuntimeError,
        }
    }
}

/// Application configuration
struct Config {
    api_key: String,
    api_url: Option<String>,
    cooldown_secs: Option<u64>,
    timeout_secs: Option<u64>,
    record: String,
    new_ip: String,
    current_ip: Option<String>,
    comment: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: env::var("DHSYNC_API_KEY").context("DHSYNC_API_KEY is not set")?,
            api_url: env::var("DHSYNC_API_URL").ok(),
            cooldown_secs: parse_optional("DHSYNC_COOLDOWN_SECS")?,
            timeout_secs: parse_optional("DHSYNC_TIMEOUT_SECS")?,
            record: env::var("DHSYNC_RECORD")
                .unwrap_or_default()
                .trim()
                .to_string(),
            new_ip: env::var("DHSYNC_NEW_IP")
                .unwrap_or_default()
                .trim()
                .to_string(),
            current_ip: env::var("DHSYNC_CURRENT_IP")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            comment: env::var("DHSYNC_COMMENT").ok().filter(|s| !s.is_empty()),
            log_level: env::var("DHSYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            anyhow::bail!(
                "DHSYNC_API_KEY is required. \
                Set it via: export DHSYNC_API_KEY=your_key"
            );
        }

        validate_domain_name(&self.record)?;
        self.new_address()?;
        self.current_address()?;

        if let Some(cooldown) = self.cooldown_secs
            && cooldown > 3600
        {
            anyhow::bail!(
                "DHSYNC_COOLDOWN_SECS must be at most 3600 seconds. Got: {}",
                cooldown
            );
        }

        if let Some(timeout) = self.timeout_secs
            && !(1..=300).contains(&timeout)
        {
            anyhow::bail!(
                "DHSYNC_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                timeout
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DHSYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.api_config().validate()?;
        Ok(())
    }

    fn new_address(&self) -> Result<Ipv4Addr> {
        if self.new_ip.is_empty() {
            anyhow::bail!("DHSYNC_NEW_IP is required");
        }
        self.new_ip
            .parse()
            .with_context(|| format!("DHSYNC_NEW_IP is not an IPv4 address: {}", self.new_ip))
    }

    fn current_address(&self) -> Result<Option<Ipv4Addr>> {
        self.current_ip
            .as_deref()
            .map(|ip| {
                ip.parse()
                    .with_context(|| format!("DHSYNC_CURRENT_IP is not an IPv4 address: {}", ip))
            })
            .transpose()
    }

    fn api_config(&self) -> ApiConfig {
        let mut config = ApiConfig::new(self.api_key.clone());
        if let Some(ref url) = self.api_url {
            config = config.with_base_url(url.clone());
        }
        if let Some(secs) = self.cooldown_secs {
            config = config.with_cooldown(Duration::from_secs(secs));
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        config
    }

    fn log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn parse_optional(name: &str) -> Result<Option<u64>> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} must be a number. Got: {}", name, value)),
        Err(_) => Ok(None),
    }
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks; catches common mistakes, not every invalid name.
fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        anyhow::bail!(
            "DHSYNC_RECORD is required. \
            Set it via: export DHSYNC_RECORD=home.example.com"
        );
    }

    if domain.len() > 253 {
        anyhow::bail!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        );
    }

    for label in domain.split('.') {
        if label.is_empty() {
            anyhow::bail!("Domain name has empty label: '{}'", domain);
        }

        if label.len() > 63 {
            anyhow::bail!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            anyhow::bail!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            );
        }

        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            );
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return SyncExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(config)).into()
}

/// Run one sync and report how it ended
async fn run(config: Config) -> SyncExitCode {
    let engine = match build_engine(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return SyncExitCode::ConfigError;
        }
    };

    // Both parsed successfully in validate()
    let (Ok(new_ip), Ok(current_ip)) = (config.new_address(), config.current_address()) else {
        return SyncExitCode::ConfigError;
    };
    let comment = config.comment.as_deref();

    info!("Synchronizing {} -> {}", config.record, new_ip);

    let outcome = match current_ip {
        Some(current) if current == new_ip => {
            info!("DHSYNC_CURRENT_IP equals DHSYNC_NEW_IP, nothing to do");
            return SyncExitCode::Applied;
        }
        Some(current) => engine
            .replace(&config.record, current, new_ip, comment)
            .await
            .map(|result| result.state()),
        None => engine
            .sync(&config.record, new_ip, comment)
            .await
            .map(|report| report.state()),
    };

    match outcome {
        Ok(state) => {
            match state {
                ReconcileState::Applied => info!("{} resolves to {}", config.record, new_ip),
                ReconcileState::PartiallyApplied => warn!(
                    "{} now has {} and its previous address; remove the old record manually",
                    config.record, new_ip
                ),
                ReconcileState::NotApplied => {
                    error!("Provider did not accept {} -> {}", config.record, new_ip)
                }
            }
            state.into()
        }
        Err(e) => report_failure(&config.record, e),
    }
}

fn build_engine(config: &Config) -> Result<ReconciliationEngine> {
    let api = config.api_config();
    let fetcher = ReqwestFetcher::from_config(&api)?;
    Ok(ReconciliationEngine::from_parts(Box::new(fetcher), api)?)
}

fn report_failure(record: &str, err: ReconcileError) -> SyncExitCode {
    let ReconcileError { partial, source } = err;
    error!("Sync of {} failed: {}", record, source);

    if partial.needs_cleanup() {
        log_partial(record, &partial);
        SyncExitCode::NeedsCleanup
    } else {
        SyncExitCode::RuntimeError
    }
}

fn log_partial(record: &str, partial: &ReconcileResult) {
    if let Some(add) = &partial.add_outcome {
        warn!(
            "New A record for {} is live ({}) but the old one was not removed",
            record, add.detail
        );
    }
}
