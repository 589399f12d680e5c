//! Configuration loading, validation, and management for Parley.
//!
//! Loads configuration from `~/.parley/config.toml` (or `$PARLEY_CONFIG`)
//! with environment variable overrides for provider API keys. Validates all
//! settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parley_core::ProviderRole;

/// The root configuration structure.
///
/// Maps directly to `~/.parley/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Provider-specific configurations, keyed by provider id
    #[serde(default = "default_providers")]
    pub providers: HashMap<String, ProviderConfig>,

    /// Role bindings, fallback order and invocation limits
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Conversation memory limits and storage backend
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Topic/summary extraction
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Assistant persona
    #[serde(default)]
    pub agent: AgentConfig,

    /// External tool servers
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Wire protocol spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI chat-completions and every API that mimics it
    OpenaiCompat,
    Anthropic,
    Gemini,
}

impl ProviderKind {
    /// Infer the protocol from a well-known provider id.
    pub fn infer(provider_id: &str) -> Self {
        match provider_id {
            "anthropic" => ProviderKind::Anthropic,
            "gemini" | "google" => ProviderKind::Gemini,
            _ => ProviderKind::OpenaiCompat,
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Protocol; inferred from the provider id when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProviderKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ProviderConfig {
    fn with_model(model: &str) -> Self {
        Self {
            model: Some(model.into()),
            ..Self::default()
        }
    }

    /// The effective protocol for a provider registered under `provider_id`.
    pub fn kind_for(&self, provider_id: &str) -> ProviderKind {
        self.kind.unwrap_or_else(|| ProviderKind::infer(provider_id))
    }
}

/// Provider ids shipped in the default configuration, with their models.
pub const DEFAULT_PROVIDERS: [(&str, &str); 5] = [
    ("openai", "gpt-4"),
    ("anthropic", "claude-3-opus-20240229"),
    ("gemini", "gemini-1.5-pro"),
    ("deepseek", "deepseek-chat"),
    ("mistral", "mistral-large-latest"),
];

fn default_providers() -> HashMap<String, ProviderConfig> {
    DEFAULT_PROVIDERS
        .iter()
        .map(|(id, model)| (id.to_string(), ProviderConfig::with_model(model)))
        .collect()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("providers", &self.providers)
            .field("routing", &self.routing)
            .field("memory", &self.memory)
            .field("summarizer", &self.summarizer)
            .field("agent", &self.agent)
            .field("tools", &self.tools)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish()
    }
}

impl std::fmt::Debug for ToolServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolServerConfig")
            .field("url", &self.url)
            .field("api_key", &redact(&self.api_key))
            .field("description", &self.description)
            .finish()
    }
}

/// Which configured provider fills each selection role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBindings {
    #[serde(default = "default_general")]
    pub general: String,

    #[serde(default = "default_analytic")]
    pub analytic: String,

    #[serde(default = "default_generative")]
    pub generative: String,

    #[serde(default = "default_reasoning")]
    pub reasoning: String,
}

fn default_general() -> String {
    "openai".into()
}
fn default_analytic() -> String {
    "anthropic".into()
}
fn default_generative() -> String {
    "gemini".into()
}
fn default_reasoning() -> String {
    "deepseek".into()
}

impl Default for RoleBindings {
    fn default() -> Self {
        Self {
            general: default_general(),
            analytic: default_analytic(),
            generative: default_generative(),
            reasoning: default_reasoning(),
        }
    }
}

impl RoleBindings {
    pub fn get(&self, role: ProviderRole) -> &str {
        match role {
            ProviderRole::General => &self.general,
            ProviderRole::Analytic => &self.analytic,
            ProviderRole::Generative => &self.generative,
            ProviderRole::Reasoning => &self.reasoning,
        }
    }
}

/// Upper bound for `routing.health_check_interval_secs` (one year).
pub const MAX_HEALTH_CHECK_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Upper bound for `memory.retention_hours` (ten years).
pub const MAX_RETENTION_HOURS: u64 = 10 * 365 * 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default)]
    pub roles: RoleBindings,

    /// Deterministic order used for "first available" selection
    #[serde(default = "default_fallback_order")]
    pub fallback_order: Vec<String>,

    /// Probe a provider again once its last check is older than this
    #[serde(default = "default_health_check_interval")]
    pub health_check_interval_secs: u64,

    /// Deadline for a single provider call
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,

    /// Divisor for the coarse token estimate
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_fallback_order() -> Vec<String> {
    vec![
        "openai".into(),
        "anthropic".into(),
        "gemini".into(),
        "deepseek".into(),
    ]
}
fn default_health_check_interval() -> u64 {
    60
}
fn default_call_timeout() -> u64 {
    120
}
fn default_chars_per_token() -> usize {
    4
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            roles: RoleBindings::default(),
            fallback_order: default_fallback_order(),
            health_check_interval_secs: default_health_check_interval(),
            call_timeout_secs: default_call_timeout(),
            chars_per_token: default_chars_per_token(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Conversation store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Process-local, lost on exit
    Memory,
    /// One JSON document per conversation under `store_path`
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Capacity of the active window
    #[serde(default = "default_active_window")]
    pub active_window: usize,

    /// Log length above which age-based pruning runs
    #[serde(default = "default_cleanup_threshold")]
    pub cleanup_threshold: usize,

    /// Messages older than this are dropped by a pruning pass
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,

    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    #[serde(default = "default_store")]
    pub store: StoreKind,

    /// Directory for the file store; defaults to `~/.parley/conversations`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

fn default_active_window() -> usize {
    50
}
fn default_cleanup_threshold() -> usize {
    800
}
fn default_retention_hours() -> u64 {
    24
}
fn default_max_message_chars() -> usize {
    4000
}
fn default_store() -> StoreKind {
    StoreKind::File
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            active_window: default_active_window(),
            cleanup_threshold: default_cleanup_threshold(),
            retention_hours: default_retention_hours(),
            max_message_chars: default_max_message_chars(),
            store: default_store(),
            store_path: None,
        }
    }
}

impl MemoryConfig {
    pub fn resolved_store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("conversations"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Provider id used for analysis; `"none"` disables summarization
    #[serde(default = "default_summarizer_provider")]
    pub provider: String,

    #[serde(default = "default_summarizer_temperature")]
    pub temperature: f32,
}

fn default_summarizer_provider() -> String {
    "mistral".into()
}
fn default_summarizer_temperature() -> f32 {
    0.3
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            provider: default_summarizer_provider(),
            temperature: default_summarizer_temperature(),
        }
    }
}

impl SummarizerConfig {
    pub fn is_disabled(&self) -> bool {
        self.provider.eq_ignore_ascii_case("none")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Replaces the built-in persona prompt when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,
}

fn default_agent_name() -> String {
    "Parley".into()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            system_prompt_override: None,
        }
    }
}

/// One external tool server, e.g. `[tools.servers.web_search]`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ToolServerConfig {
    pub url: String,

    /// Sent as a bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Servers keyed by the name tool requests target (`web_search`, `run_python`)
    #[serde(default)]
    pub servers: HashMap<String, ToolServerConfig>,

    /// Deadline for a single tool call
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
}

fn default_tool_timeout() -> u64 {
    60
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            servers: HashMap::new(),
            timeout_secs: default_tool_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location, with env var overrides.
    ///
    /// Priority: env vars > config file > defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var("PARLEY_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::config_path());
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // A file that configures some providers still gets the built-in ones
        for (id, provider) in default_providers() {
            config.providers.entry(id).or_insert(provider);
        }

        config.validate()?;
        Ok(config)
    }

    /// Fill missing API keys from `<PROVIDER_ID>_API_KEY` variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (id, provider) in self.providers.iter_mut() {
            if provider.api_key.is_none() {
                let var = format!("{}_API_KEY", id.to_uppercase().replace('-', "_"));
                provider.api_key = lookup(&var).filter(|k| !k.is_empty());
            }
        }
        for (name, server) in self.tools.servers.iter_mut() {
            if server.api_key.is_none() {
                let var = format!("{}_TOOL_API_KEY", name.to_uppercase().replace('-', "_"));
                server.api_key = lookup(&var).filter(|k| !k.is_empty());
            }
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".parley")
    }

    /// Default config file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let routing = &self.routing;
        if !(0.0..=2.0).contains(&routing.temperature) {
            return Err(ConfigError::ValidationError(
                "routing.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if routing.chars_per_token == 0 {
            return Err(ConfigError::ValidationError(
                "routing.chars_per_token must be > 0".into(),
            ));
        }
        if routing.health_check_interval_secs > MAX_HEALTH_CHECK_INTERVAL_SECS {
            return Err(ConfigError::ValidationError(format!(
                "routing.health_check_interval_secs must be <= {MAX_HEALTH_CHECK_INTERVAL_SECS}"
            )));
        }
        if routing.call_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "routing.call_timeout_secs must be > 0".into(),
            ));
        }

        for role in [
            ProviderRole::General,
            ProviderRole::Analytic,
            ProviderRole::Generative,
            ProviderRole::Reasoning,
        ] {
            let id = routing.roles.get(role);
            if !self.providers.contains_key(id) {
                return Err(ConfigError::ValidationError(format!(
                    "routing.roles.{role} names unknown provider '{id}'"
                )));
            }
        }
        if let Some(id) = routing
            .fallback_order
            .iter()
            .find(|id| !self.providers.contains_key(id.as_str()))
        {
            return Err(ConfigError::ValidationError(format!(
                "routing.fallback_order names unknown provider '{id}'"
            )));
        }

        let memory = &self.memory;
        if memory.active_window == 0 || memory.cleanup_threshold == 0 {
            return Err(ConfigError::ValidationError(
                "memory.active_window and memory.cleanup_threshold must be > 0".into(),
            ));
        }
        if memory.retention_hours > MAX_RETENTION_HOURS {
            return Err(ConfigError::ValidationError(format!(
                "memory.retention_hours must be <= {MAX_RETENTION_HOURS}"
            )));
        }
        if memory.max_message_chars == 0 {
            return Err(ConfigError::ValidationError(
                "memory.max_message_chars must be > 0".into(),
            ));
        }

        if self.tools.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "tools.timeout_secs must be > 0".into(),
            ));
        }
        if let Some((name, _)) = self
            .tools
            .servers
            .iter()
            .find(|(_, server)| !server.url.starts_with("http://") && !server.url.starts_with("https://"))
        {
            return Err(ConfigError::ValidationError(format!(
                "tools.servers.{name}.url must be an http(s) URL"
            )));
        }

        if !self.summarizer.is_disabled() && !self.providers.contains_key(&self.summarizer.provider)
        {
            return Err(ConfigError::ValidationError(format!(
                "summarizer.provider names unknown provider '{}'",
                self.summarizer.provider
            )));
        }

        Ok(())
    }

    /// Provider ids that have an API key.
    pub fn keyed_providers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .providers
            .iter()
            .filter(|(_, p)| p.api_key.is_some())
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            routing: RoutingConfig::default(),
            memory: MemoryConfig::default(),
            summarizer: SummarizerConfig::default(),
            agent: AgentConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
