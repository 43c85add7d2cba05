use crate::prelude::*;

/// GitHub access configuration
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_base: String,
    pub raw_base: String,
    pub token: Option<String>,
    /// Git ref the README is read from
    pub readme_ref: String,
    /// README path relative to the repository root
    pub readme_path: String,
}

impl GitHubConfig {
    /// Default GitHub REST API base URL
    pub const DEFAULT_API_BASE: &'static str = "https://api.github.com";
    /// Default static-content host
    pub const DEFAULT_RAW_BASE: &'static str = "https://raw.githubusercontent.com";
    pub const DEFAULT_README_REF: &'static str = "HEAD";
    pub const DEFAULT_README_PATH: &'static str = "README.md";

    /// Load configuration from environment variables
    /// GITHUB_TOKEN is optional unless `require_token` is set
    /// GITHUB_API_URL and GITHUB_RAW_URL fall back to the public hosts
    pub fn from_env(require_token: bool) -> Result<Self, Error> {
        Self::from_lookup(require_token, env_var)
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup(
        require_token: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Error> {
        let non_empty_var = |name: &str| non_empty(lookup(name));
        let token = non_empty_var("GITHUB_TOKEN");

        if require_token && token.is_none() {
            return Err(Error::Config(
                "GITHUB_TOKEN environment variable not set".to_string(),
            ));
        }

        Ok(Self {
            api_base: non_empty_var("GITHUB_API_URL")
                .unwrap_or_else(|| Self::DEFAULT_API_BASE.to_string()),
            raw_base: non_empty_var("GITHUB_RAW_URL")
                .unwrap_or_else(|| Self::DEFAULT_RAW_BASE.to_string()),
            token,
            readme_ref: Self::DEFAULT_README_REF.to_string(),
            readme_path: Self::DEFAULT_README_PATH.to_string(),
        })
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(
        mut self,
        readme_ref: Option<String>,
        readme_path: Option<String>,
    ) -> Self {
        if let Some(git_ref) = readme_ref {
            self.readme_ref = git_ref;
        }
        if let Some(path) = readme_path {
            self.readme_path = path;
        }
        self
    }
}

/// Which completion endpoint to call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ApiFlavor {
    /// `POST /chat/completions` with role-tagged messages
    #[default]
    Chat,
    /// `POST /completions` with a raw prompt
    Legacy,
}

/// Completion provider configuration
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub api: ApiFlavor,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionConfig {
    /// Default OpenAI API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    /// Default model for the chat endpoint
    pub const DEFAULT_CHAT_MODEL: &'static str = "gpt-4o-mini";
    /// Default model for the legacy endpoint
    pub const DEFAULT_LEGACY_MODEL: &'static str = "gpt-3.5-turbo-instruct";

    /// Load configuration through `lookup`, which maps a variable name to its value
    /// OPENAI_API_KEY is required
    /// OPENAI_BASE_URL falls back to the public API
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let non_empty_var = |name: &str| non_empty(lookup(name));
        let api_key = non_empty_var("OPENAI_API_KEY").ok_or_else(|| {
            Error::Config("OPENAI_API_KEY environment variable not set".to_string())
        })?;

        Ok(Self {
            base_url: non_empty_var("OPENAI_BASE_URL")
                .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            api_key,
            model: Self::DEFAULT_CHAT_MODEL.to_string(),
            api: ApiFlavor::Chat,
            max_tokens: None,
            temperature: None,
        })
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(
        mut self,
        api: ApiFlavor,
        model: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Self {
        self.api = api;
        self.model = model.unwrap_or_else(|| match api {
            ApiFlavor::Chat => Self::DEFAULT_CHAT_MODEL.to_string(),
            ApiFlavor::Legacy => Self::DEFAULT_LEGACY_MODEL.to_string(),
        });
        if max_tokens.is_some() {
            self.max_tokens = max_tokens;
        }
        if temperature.is_some() {
            self.temperature = temperature;
        }
        self
    }
}

/// Read a variable from the process environment
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn config() -> CompletionConfig {
        CompletionConfig {
            base_url: CompletionConfig::DEFAULT_BASE_URL.to_string(),
            api_key: "sk-test".to_string(),
            model: CompletionConfig::DEFAULT_CHAT_MODEL.to_string(),
            api: ApiFlavor::Chat,
            max_tokens: None,
            temperature: None,
        }
    }

    #[test]
    fn test_overrides_pick_default_model_per_flavor() {
        let legacy = config().with_overrides(ApiFlavor::Legacy, None, None, None);
        assert_eq!(legacy.model, CompletionConfig::DEFAULT_LEGACY_MODEL);
        assert_eq!(legacy.api, ApiFlavor::Legacy);

        let chat = config().with_overrides(ApiFlavor::Chat, None, None, None);
        assert_eq!(chat.model, CompletionConfig::DEFAULT_CHAT_MODEL);
    }

    #[test]
    fn test_overrides_explicit_values() {
        let overridden = config().with_overrides(
            ApiFlavor::Chat,
            Some("gpt-4.1".to_string()),
            Some(1024),
            Some(0.2),
        );
        assert_eq!(overridden.model, "gpt-4.1");
        assert_eq!(overridden.max_tokens, Some(1024));
        assert_eq!(overridden.temperature, Some(0.2));
        assert_eq!(overridden.api_key, "sk-test");
    }

    #[test]
    fn test_completion_config_requires_api_key() {
        let err = CompletionConfig::from_lookup(vars(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_completion_config_blank_api_key_is_missing() {
        let err = CompletionConfig::from_lookup(vars(&[("OPENAI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_completion_config_reads_key_and_base_url() {
        let config = CompletionConfig::from_lookup(vars(&[
            ("OPENAI_API_KEY", "sk-live"),
            ("OPENAI_BASE_URL", "http://localhost:11434/v1"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "sk-live");
        assert_eq!(config.base_url, "http://localhost:11434/v1");
        assert_eq!(config.model, CompletionConfig::DEFAULT_CHAT_MODEL);

        let config = CompletionConfig::from_lookup(vars(&[
            ("OPENAI_API_KEY", "sk-live"),
            ("OPENAI_BASE_URL", ""),
        ]))
        .unwrap();
        assert_eq!(config.base_url, CompletionConfig::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_github_config_token_optional_by_default() {
        let config = GitHubConfig::from_lookup(false, vars(&[])).unwrap();
        assert!(config.token.is_none());
        assert_eq!(config.api_base, GitHubConfig::DEFAULT_API_BASE);
        assert_eq!(config.raw_base, GitHubConfig::DEFAULT_RAW_BASE);
        assert_eq!(config.readme_ref, GitHubConfig::DEFAULT_README_REF);
    }

    #[test]
    fn test_github_config_required_token_missing() {
        let err = GitHubConfig::from_lookup(true, vars(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("GITHUB_TOKEN"));

        let err = GitHubConfig::from_lookup(true, vars(&[("GITHUB_TOKEN", "")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_github_config_reads_token_and_hosts() {
        let config = GitHubConfig::from_lookup(
            true,
            vars(&[
                ("GITHUB_TOKEN", "ghp_test"),
                ("GITHUB_API_URL", "http://127.0.0.1:9000"),
                ("GITHUB_RAW_URL", "http://127.0.0.1:9001"),
            ]),
        )
        .unwrap();
        assert_eq!(config.token.as_deref(), Some("ghp_test"));
        assert_eq!(config.api_base, "http://127.0.0.1:9000");
        assert_eq!(config.raw_base, "http://127.0.0.1:9001");
    }
}
