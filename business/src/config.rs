use std::env::vars;

use log::info;
use roughcode_states::State;
use serde::Deserialize;
use ustr::Ustr;

/// Page size used by the project list when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 9;

#[derive(Debug, Clone)]
pub struct BusinessConfig {
    pub api_base_url: String,
    /// Session token sent as `Authorization: Bearer ...` when present.
    pub auth_token: Option<String>,
    pub page_size: u32,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    api_base_url: Option<String>,
    auth_token: Option<String>,
    page_size: Option<u32>,
}

impl BusinessConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn api_url(&self) -> Ustr {
        if self.api_base_url.is_empty() {
            Ustr::from("/api/v1")
        } else {
            let base = self.api_base_url.trim_end_matches('/');
            Ustr::from(&format!("{base}/api/v1"))
        }
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Build the configuration from `API_BASE_URL`, `AUTH_TOKEN` and
    /// `PAGE_SIZE`, falling back to the compiled-in defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        info!("Loading client configuration from environment variables");
        let raw: RawConfig = serde_env::from_iter(vars())?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let page_size = raw.page_size.unwrap_or(defaults.page_size);
        if page_size == 0 {
            anyhow::bail!("PAGE_SIZE must be positive");
        }

        Ok(Self {
            api_base_url: raw.api_base_url.unwrap_or(defaults.api_base_url),
            auth_token: raw.auth_token.filter(|t| !t.is_empty()),
            page_size,
        })
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            api_base_url: if cfg!(feature = "env_local") {
                "http://localhost:8080".to_owned()
            } else if cfg!(feature = "env_test") {
                "https://test.roughcode.io".to_owned()
            } else {
                "https://roughcode.io".to_owned()
            },
            auth_token: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl State for BusinessConfig {}
