//! # Configuration
//!
//! Centralizes router and CLI settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.scene-router/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::compiler::{CompileOptions, DEFAULT_ROOT_KEY};
use crate::core::reducer::TabBackPolicy;
use crate::core::scene::Props;
use crate::router::RouterOptions;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub router: RouterSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RouterSection {
    pub root_key: Option<String>,
    pub tab_back: Option<TabBackPolicy>,
    pub wrap_by: Option<String>,
    #[serde(default)]
    pub root_props: Props,
}

/// Values given on the command line. `None` = flag not passed.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub root_key: Option<String>,
    pub tab_back: Option<TabBackPolicy>,
    pub log_level: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;
pub const DEFAULT_LOG_FILE: &str = "scene-router.log";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub root_key: String,
    pub tab_back: TabBackPolicy,
    pub wrap_by: Option<String>,
    pub root_props: Props,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
}

impl ResolvedConfig {
    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            compile: CompileOptions {
                root_key: self.root_key.clone(),
                wrap_by: self.wrap_by.clone(),
                root_props: self.root_props.clone(),
            },
            tab_back: self.tab_back,
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "config I/O error: {e}"),
            LoadError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for LoadError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.scene-router/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".scene-router").join("config.toml"))
}

/// Load config from `~/.scene-router/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `RouterConfig::default()`. If it exists but is malformed,
/// returns `LoadError::Parse`.
pub fn load_config() -> Result<RouterConfig, LoadError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(RouterConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(RouterConfig::default());
    }

    load_config_from(&path)
}

/// Load config from an explicit path. The file must exist.
pub fn load_config_from(path: &Path) -> Result<RouterConfig, LoadError> {
    let contents = fs::read_to_string(path).map_err(LoadError::Io)?;
    let config: RouterConfig = toml::from_str(&contents).map_err(LoadError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# scene-router configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# log_level = "info"                 # "off", "error", "warn", "info", "debug", "trace"
# log_file = "scene-router.log"

# [router]
# root_key = "__root"                # key of the synthetic root wrapping scene lists
# tab_back = "bubble"                # "bubble" or "initial-tab"
# wrap_by = "frame"                  # wrapper applied to scenes without their own

# [router.root_props]
# theme = "dark"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &RouterConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Root key: CLI → env → config → default
    let root_key = cli
        .root_key
        .clone()
        .or_else(|| std::env::var("SCENE_ROUTER_ROOT_KEY").ok())
        .or_else(|| config.router.root_key.clone())
        .unwrap_or_else(|| DEFAULT_ROOT_KEY.to_string());

    // Tab back policy: CLI → env → config → default
    let tab_back = cli
        .tab_back
        .or_else(|| {
            std::env::var("SCENE_ROUTER_TAB_BACK")
                .ok()
                .and_then(|v| parse_tab_back(&v))
        })
        .or(config.router.tab_back)
        .unwrap_or_default();

    // Wrapper: env → config
    let wrap_by = std::env::var("SCENE_ROUTER_WRAP_BY")
        .ok()
        .or_else(|| config.router.wrap_by.clone());

    // Log level: CLI → env → config → default
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| std::env::var("SCENE_ROUTER_LOG_LEVEL").ok())
        .or_else(|| config.general.log_level.clone())
        .and_then(|level| parse_level(&level))
        .unwrap_or(DEFAULT_LOG_LEVEL);

    let log_file = config
        .general
        .log_file
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

    ResolvedConfig {
        root_key,
        tab_back,
        wrap_by,
        root_props: config.router.root_props.clone(),
        log_level,
        log_file: PathBuf::from(log_file),
    }
}

fn parse_tab_back(value: &str) -> Option<TabBackPolicy> {
    match <TabBackPolicy as clap::ValueEnum>::from_str(value, true) {
        Ok(policy) => Some(policy),
        Err(e) => {
            warn!("Ignoring tab back policy {value:?}: {e}");
            None
        }
    }
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    match LevelFilter::from_str(value) {
        Ok(level) => Some(level),
        Err(_) => {
            warn!("Ignoring unknown log level {value:?}");
            None
        }
    }
}
