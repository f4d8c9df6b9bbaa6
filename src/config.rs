//! Environment-driven configuration.
//!
//! Values are read from the process environment (after an optional `.env`
//! load by the caller). Unparseable values fall back to their defaults;
//! [`AppConfig::validate`] rejects an enabled provider with missing
//! credentials.

use crate::error::{Result, SwitchyardError};
use std::str::FromStr;
use std::time::Duration;

/// Language model endpoint settings
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: usize,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            max_tokens: 4096,
            temperature: 0.7,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Azure DevOps provider settings
#[derive(Debug, Clone, PartialEq)]
pub struct DevOpsConfig {
    pub enabled: bool,
    pub organization: String,
    pub project: String,
    pub pat: String,
    pub api_version: String,
}

impl Default for DevOpsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            organization: String::new(),
            project: String::new(),
            pat: String::new(),
            api_version: "7.0".to_string(),
        }
    }
}

impl DevOpsConfig {
    /// Enabled explicitly, or implied by a PAT and organization being set
    pub fn is_active(&self) -> bool {
        self.enabled || (!self.pat.is_empty() && !self.organization.is_empty())
    }
}

/// Trello provider settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrelloConfig {
    pub enabled: bool,
    pub api_key: String,
    pub token: String,
}

impl TrelloConfig {
    pub fn is_active(&self) -> bool {
        self.enabled
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub devops: DevOpsConfig,
    pub trello: TrelloConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let llm_defaults = LlmConfig::default();
        let devops_defaults = DevOpsConfig::default();

        Self {
            llm: LlmConfig {
                base_url: get("LLM_BASE_URL").unwrap_or(llm_defaults.base_url),
                model: get("LLM_MODEL").unwrap_or(llm_defaults.model),
                api_key: get("LLM_API_KEY"),
                max_tokens: parse_or(get("LLM_MAX_TOKENS"), llm_defaults.max_tokens),
                temperature: parse_or(get("LLM_TEMPERATURE"), llm_defaults.temperature),
                timeout: Duration::from_secs(parse_or(
                    get("LLM_TIMEOUT"),
                    llm_defaults.timeout.as_secs(),
                )),
            },
            devops: DevOpsConfig {
                enabled: parse_bool_or(get("AZURE_DEVOPS_ENABLED"), false),
                organization: get("AZURE_DEVOPS_ORGANIZATION").unwrap_or_default(),
                project: get("AZURE_DEVOPS_PROJECT").unwrap_or_default(),
                pat: get("AZURE_DEVOPS_PAT").unwrap_or_default(),
                api_version: get("AZURE_DEVOPS_API_VERSION").unwrap_or(devops_defaults.api_version),
            },
            trello: TrelloConfig {
                enabled: parse_bool_or(get("TRELLO_ENABLED"), false),
                api_key: get("TRELLO_API_KEY").unwrap_or_default(),
                token: get("TRELLO_TOKEN").unwrap_or_default(),
            },
        }
    }

    /// Reject active providers that lack credentials.
    ///
    /// Azure DevOps counts as active once a PAT and organization are set, so
    /// the project is required then too.
    pub fn validate(&self) -> Result<()> {
        if self.devops.is_active() {
            require(&self.devops.organization, "AZURE_DEVOPS_ORGANIZATION", "Azure DevOps")?;
            require(&self.devops.project, "AZURE_DEVOPS_PROJECT", "Azure DevOps")?;
            require(&self.devops.pat, "AZURE_DEVOPS_PAT", "Azure DevOps")?;
        }

        if self.trello.enabled {
            require(&self.trello.api_key, "TRELLO_API_KEY", "Trello")?;
            require(&self.trello.token, "TRELLO_TOKEN", "Trello")?;
        }

        Ok(())
    }
}

fn require(value: &str, key: &str, provider: &str) -> Result<()> {
    if value.is_empty() {
        return Err(SwitchyardError::ConfigError(format!(
            "{} is required when {} is enabled",
            key, provider
        )));
    }
    Ok(())
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn parse_bool_or(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::trim) {
        Some("1" | "t" | "T" | "true" | "TRUE" | "True") => true,
        Some("0" | "f" | "F" | "false" | "FALSE" | "False") => false,
        _ => default,
    }
}
