use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::browser::session::BridgeConfig;
use crate::engine::runtime::DEFAULT_EXPECT_TIMEOUT_MS;

pub const DEFAULT_CONFIG_FILE: &str = "ui-runner.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "ui-scenario-runner",
    version,
    about = "Data-driven UI scenario runner"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: ui-runner.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against a browser
    Run(RunArgs),

    /// List enabled scenarios and their step counts
    List(ScenarioArgs),

    /// Load and check scenario documents without a browser
    Validate(ScenarioArgs),
}

/// Where scenarios come from, and which of them to keep.
#[derive(Args, Debug, Clone, Default)]
pub struct ScenarioArgs {
    /// Scenario file, or directory of *.json scenario files
    #[arg(long)]
    pub scenarios: Option<PathBuf>,

    /// Only scenarios whose description matches this regex
    #[arg(long)]
    pub grep: Option<String>,

    /// Inline scenario JSON; wins over every other source
    #[arg(long, env = "SCENARIOS_JSON", hide = true)]
    pub scenarios_json: Option<String>,

    /// Single scenario file; wins over --scenarios
    #[arg(long, env = "SCENARIOS_FILE", hide = true)]
    pub scenarios_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: ScenarioArgs,

    /// Named environment from the config file
    #[arg(long, env = "ENV")]
    pub env: Option<String>,

    /// Run the browser headless
    #[arg(
        long,
        env = "HEADLESS",
        action = clap::ArgAction::Set,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub headless: Option<bool>,

    /// Origin relative navigation paths are joined to
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// Output format: console, junit, html, json
    #[arg(long)]
    pub format: Option<String>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `ui-runner.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
}

impl AppConfig {
    /// Base URL of the named environment, or of `default` when unnamed.
    pub fn base_url_for(&self, env: Option<&str>) -> Option<String> {
        self.environments
            .get(env.unwrap_or("default"))
            .and_then(|e| e.base_url.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EnvironmentConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_scenario_dir")]
    pub scenario_dir: PathBuf,

    #[serde(default = "default_console")]
    pub format: String,

    pub output: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    /// Retry window for validations that set no `timeout` of their own
    #[serde(default = "default_expect_timeout_ms")]
    pub expect_timeout_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            scenario_dir: default_scenario_dir(),
            format: default_console(),
            output: None,
            headless: true,
            log_dir: default_log_dir(),
            report_dir: default_report_dir(),
            expect_timeout_ms: DEFAULT_EXPECT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_node")]
    pub node: String,

    #[serde(default = "default_script")]
    pub script: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            node: default_node(),
            script: default_script(),
        }
    }
}

impl BrowserConfig {
    pub fn bridge(&self, headless: bool) -> BridgeConfig {
        BridgeConfig {
            node: self.node.clone(),
            script: self.script.clone(),
            headless,
        }
    }
}

// Serde default helpers
fn default_true() -> bool { true }
fn default_console() -> String { "console".to_string() }
fn default_scenario_dir() -> PathBuf { PathBuf::from("scenarios") }
fn default_log_dir() -> PathBuf { PathBuf::from("logs") }
fn default_report_dir() -> PathBuf { PathBuf::from("reports") }
fn default_expect_timeout_ms() -> u64 { DEFAULT_EXPECT_TIMEOUT_MS }
fn default_node() -> String { BridgeConfig::default().node }
fn default_script() -> String { BridgeConfig::default().script }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}
