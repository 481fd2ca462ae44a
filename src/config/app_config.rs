use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use serde::Deserialize;

use crate::domain::translation::{PromptPolicy, PromptRule, PromptRuleConfig};
use crate::domain::DomainError;
use crate::infrastructure::cache::CacheConfig;
use crate::infrastructure::llm::UpstreamConfig;
use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    pub translation: TranslationConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    pub cors_allowed_origins: Vec<String>,
    /// Maximum accepted request body size in bytes
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Language every segment is translated into
    pub target_language: String,
    /// Send repeated uncached segments upstream once per request
    pub deduplicate: bool,
    /// Include the built-in code-hosting and documentation prompt rules
    pub builtin_rules: bool,
    /// Extra prompt rules evaluated after the built-in ones
    pub prompt_rules: Vec<PromptRuleConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_allowed_origins: Vec::new(),
            body_limit_bytes: 2 * 1024 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_language: "Simplified Chinese".to_string(),
            deduplicate: false,
            builtin_rules: true,
            prompt_rules: Vec::new(),
        }
    }
}

impl TranslationConfig {
    /// Builds the prompt policy: built-in rules first, then configured ones in order
    pub fn prompt_policy(&self) -> Result<PromptPolicy, DomainError> {
        let mut policy = if self.builtin_rules {
            PromptPolicy::with_defaults(&self.target_language)
        } else {
            PromptPolicy::new(&self.target_language)
        };

        for rule in &self.prompt_rules {
            policy = policy.with_rule(PromptRule::try_from(rule.clone())?);
        }

        Ok(policy)
    }
}

impl AppConfig {
    /// Loads configuration from files, `APP__*` variables and the legacy
    /// `DEEPSEEK_API_KEY`, `DEEPSEEK_URL` and `SERVER_PORT` variables
    pub fn load() -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_allowed_origins")
                    .try_parsing(true),
            )
            .set_override_option("upstream.api_key", env_override("DEEPSEEK_API_KEY"))?
            .set_override_option("upstream.base_url", env_override("DEEPSEEK_URL"))?
            .set_override_option("server.port", env_override("SERVER_PORT"))?;

        Self::load_with(builder)
    }

    /// Deserializes configuration from an already assembled builder
    pub fn load_with(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    /// Checks cross-field constraints the types cannot express
    pub fn validate(&self) -> Result<(), DomainError> {
        self.upstream.validate()?;
        self.cache.validate()?;
        self.translation.prompt_policy()?;

        if self.translation.target_language.trim().is_empty() {
            return Err(DomainError::configuration(
                "translation.target_language must not be empty",
            ));
        }

        if self.server.body_limit_bytes == 0 {
            return Err(DomainError::configuration(
                "server.body_limit_bytes must be greater than zero",
            ));
        }

        if self.metrics.enabled && !self.metrics.path.starts_with('/') {
            return Err(DomainError::configuration(
                "metrics.path must start with '/'",
            ));
        }

        Ok(())
    }
}

fn env_override(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}

/// Treats a set-but-empty variable as unset
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::translation::MatchKind;
    use crate::infrastructure::cache::CacheType;
    use config::{File, FileFormat};

    fn from_toml(toml: &str) -> AppConfig {
        AppConfig::load_with(
            config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(config.server.cors_allowed_origins.is_empty());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.upstream.model, "deepseek-chat");
        assert_eq!(config.cache.backend, CacheType::Sqlite);
        assert_eq!(config.translation.target_language, "Simplified Chinese");
        assert!(!config.translation.deduplicate);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_empty_source_yields_defaults() {
        let config = from_toml("");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.backend, CacheType::Sqlite);
    }

    #[test]
    fn test_partial_sections() {
        let config = from_toml(
            r#"
            [server]
            port = 9090

            [logging]
            format = "json"

            [upstream]
            api_key = "sk-file"
            timeout_secs = 15

            [cache]
            backend = "in_memory"

            [translation]
            deduplicate = true
            "#,
        );

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.upstream.api_key, "sk-file");
        assert_eq!(config.upstream.timeout_secs, 15);
        assert_eq!(config.upstream.model, "deepseek-chat");
        assert_eq!(config.cache.backend, CacheType::InMemory);
        assert!(config.translation.deduplicate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let builder = config::Config::builder()
            .add_source(File::from_str(
                "[upstream]\napi_key = \"from-file\"",
                FileFormat::Toml,
            ))
            .set_override_option("upstream.api_key", Some("from-env"))
            .unwrap()
            .set_override_option("server.port", Some("3000"))
            .unwrap()
            .set_override_option::<&str, String>("upstream.base_url", None)
            .unwrap();

        let config = AppConfig::load_with(builder).unwrap();
        assert_eq!(config.upstream.api_key, "from-env");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upstream.base_url, None);
    }

    #[test]
    fn test_empty_env_value_does_not_override() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("sk-live".to_string())), Some("sk-live".to_string()));

        let builder = config::Config::builder()
            .add_source(File::from_str(
                "[upstream]\napi_key = \"from-file\"",
                FileFormat::Toml,
            ))
            .set_override_option("upstream.api_key", non_empty(Some(String::new())))
            .unwrap();

        let config = AppConfig::load_with(builder).unwrap();
        assert_eq!(config.upstream.api_key, "from-file");
    }

    #[test]
    fn test_prompt_rules_from_config() {
        let config = from_toml(
            r#"
            [translation]
            target_language = "Japanese"

            [[translation.prompt_rules]]
            name = "wikipedia"
            match = "host"
            pattern = "wikipedia.org"
            addendum = "Keep citation markers."
            "#,
        );

        let rule = &config.translation.prompt_rules[0];
        assert_eq!(rule.kind, MatchKind::Host);

        let policy = config.translation.prompt_policy().unwrap();
        assert_eq!(policy.target_language(), "Japanese");
        assert_eq!(
            policy.rules().last().map(|r| r.name.as_str()),
            Some("wikipedia")
        );
        assert!(
            policy
                .system_prompt("https://en.wikipedia.org/wiki/Rust")
                .contains("Keep citation markers.")
        );
    }

    #[test]
    fn test_builtin_rules_can_be_disabled() {
        let translation = TranslationConfig {
            builtin_rules: false,
            ..Default::default()
        };

        assert!(translation.prompt_policy().unwrap().rules().is_empty());
    }

    #[test]
    fn test_validate_requires_api_key() {
        let err = AppConfig::default().validate().unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_rule() {
        let mut config = AppConfig::default();
        config.upstream.api_key = "sk-test".to_string();
        config.translation.prompt_rules.push(PromptRuleConfig {
            name: "broken".to_string(),
            kind: MatchKind::Regex,
            pattern: "(".to_string(),
            addendum: "x".to_string(),
        });

        assert!(config.validate().is_err());
    }
}
