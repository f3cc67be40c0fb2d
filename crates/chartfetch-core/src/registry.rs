use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapters::{
    KugouClient, KugouConfig, NeteaseClient, NeteaseConfig, QqMusicClient, QqMusicConfig,
    DEFAULT_TIMEOUT_MS,
};
use crate::chart_source::{ChartRequest, ChartSource};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::retry::{fetch_with_retry, RetryConfig};
use crate::{ChartId, PlatformId, SourceError, TrackRecord};

/// Settings handed to every [`SourceFactory`] call.
#[derive(Clone)]
pub struct SourceContext {
    pub http_client: Arc<dyn HttpClient>,
    pub timeout_ms: u64,
    pub user_agent: Option<String>,
    pub surface_failures: bool,
}

/// Constructor for one platform's chart source.
pub type SourceFactory = Arc<dyn Fn(&SourceContext) -> Arc<dyn ChartSource> + Send + Sync>;

/// Maps platform keys to chart source constructors.
///
/// New platforms are added with [`SourceRegistry::register`]; nothing else
/// needs to change.
pub struct SourceRegistry {
    factories: BTreeMap<String, SourceFactory>,
    context: SourceContext,
}

impl SourceRegistry {
    /// Empty registry.
    pub fn new(context: SourceContext) -> Self {
        Self {
            factories: BTreeMap::new(),
            context,
        }
    }

    /// Adds or replaces the factory for `key`.
    pub fn register(&mut self, key: &str, factory: SourceFactory) {
        self.factories.insert(normalize_key(key), factory);
    }

    /// Registered platform keys in sorted order.
    pub fn platforms(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&normalize_key(name))
    }

    /// Builds a fresh chart source for a platform key, alias or display name.
    pub fn create(&self, name: &str) -> Result<Arc<dyn ChartSource>, SourceError> {
        let key = normalize_key(name);
        let factory = self
            .factories
            .get(&key)
            .ok_or_else(|| SourceError::not_registered(name.trim()))?;
        debug!(platform = %key, "creating chart source");
        Ok(factory(&self.context))
    }

    /// Resolves the platform, validates the request and fetches with retry.
    pub async fn fetch(
        &self,
        platform: &str,
        chart_id: &str,
        limit: usize,
        retry: &RetryConfig,
    ) -> Result<Vec<TrackRecord>, SourceError> {
        let source = self.create(platform)?;
        let request = ChartRequest::new(ChartId::parse(chart_id)?, limit)?;
        fetch_with_retry(source.as_ref(), &request, retry).await
    }
}

fn normalize_key(name: &str) -> String {
    name.parse::<PlatformId>()
        .map(|platform| platform.as_str().to_owned())
        .unwrap_or_else(|_| name.trim().to_lowercase())
}

fn builtin_factory(platform: PlatformId) -> SourceFactory {
    match platform {
        PlatformId::QqMusic => Arc::new(|context: &SourceContext| {
            let mut config = QqMusicConfig {
                timeout_ms: context.timeout_ms,
                ..QqMusicConfig::default()
            };
            if let Some(user_agent) = &context.user_agent {
                config.user_agent = user_agent.clone();
            }
            Arc::new(
                QqMusicClient::new(Arc::clone(&context.http_client))
                    .with_config(config)
                    .surface_failures(context.surface_failures),
            ) as Arc<dyn ChartSource>
        }),
        PlatformId::Kugou => Arc::new(|context: &SourceContext| {
            let mut config = KugouConfig {
                timeout_ms: context.timeout_ms,
                ..KugouConfig::default()
            };
            if let Some(user_agent) = &context.user_agent {
                config.user_agent = user_agent.clone();
            }
            Arc::new(
                KugouClient::new(Arc::clone(&context.http_client))
                    .with_config(config)
                    .surface_failures(context.surface_failures),
            ) as Arc<dyn ChartSource>
        }),
        PlatformId::Netease => Arc::new(|context: &SourceContext| {
            let mut config = NeteaseConfig {
                timeout_ms: context.timeout_ms,
                ..NeteaseConfig::default()
            };
            if let Some(user_agent) = &context.user_agent {
                config.user_agent = user_agent.clone();
            }
            Arc::new(
                NeteaseClient::new(Arc::clone(&context.http_client))
                    .with_config(config)
                    .surface_failures(context.surface_failures),
            ) as Arc<dyn ChartSource>
        }),
    }
}

/// Builder for a [`SourceRegistry`] over the built-in platforms.
///
/// # Environment Variables
///
/// | Variable | Effect |
/// |----------|--------|
/// | `CHARTFETCH_TIMEOUT_MS` | Per-request timeout in milliseconds |
/// | `CHARTFETCH_USER_AGENT` | Replaces the desktop browser User-Agent |
///
/// # Example
///
/// ```rust,ignore
/// use chartfetch_core::{RetryConfig, SourceRegistryBuilder};
///
/// let registry = SourceRegistryBuilder::new()
///     .with_env()
///     .surface_failures(true)
///     .build();
/// let tracks = registry.fetch("netease", "3778678", 100, &RetryConfig::default()).await?;
/// ```
pub struct SourceRegistryBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    timeout_ms: u64,
    user_agent: Option<String>,
    surface_failures: bool,
    enable_qqmusic: bool,
    enable_kugou: bool,
    enable_netease: bool,
}

impl Default for SourceRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceRegistryBuilder {
    pub fn new() -> Self {
        Self {
            http_client: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: None,
            surface_failures: false,
            enable_qqmusic: true,
            enable_kugou: true,
            enable_netease: true,
        }
    }

    /// Applies `CHARTFETCH_TIMEOUT_MS` and `CHARTFETCH_USER_AGENT`.
    pub fn with_env(mut self) -> Self {
        if let Some(timeout_ms) = parse_timeout_ms(env::var("CHARTFETCH_TIMEOUT_MS").ok()) {
            self.timeout_ms = timeout_ms;
        }
        if let Some(user_agent) = env::var("CHARTFETCH_USER_AGENT")
            .ok()
            .filter(|value| !value.trim().is_empty())
        {
            self.user_agent = Some(user_agent);
        }
        self
    }

    /// Uses `http_client` instead of a fresh reqwest transport.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn surface_failures(mut self, enabled: bool) -> Self {
        self.surface_failures = enabled;
        self
    }

    pub fn with_qqmusic_enabled(mut self, enabled: bool) -> Self {
        self.enable_qqmusic = enabled;
        self
    }

    pub fn with_kugou_enabled(mut self, enabled: bool) -> Self {
        self.enable_kugou = enabled;
        self
    }

    pub fn with_netease_enabled(mut self, enabled: bool) -> Self {
        self.enable_netease = enabled;
        self
    }

    pub fn build(self) -> SourceRegistry {
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));
        let context = SourceContext {
            http_client,
            timeout_ms: self.timeout_ms,
            user_agent: self.user_agent,
            surface_failures: self.surface_failures,
        };

        let mut registry = SourceRegistry::new(context);
        let enabled = [
            (PlatformId::QqMusic, self.enable_qqmusic),
            (PlatformId::Kugou, self.enable_kugou),
            (PlatformId::Netease, self.enable_netease),
        ];
        for (platform, _) in enabled.into_iter().filter(|(_, on)| *on) {
            registry.register(platform.as_str(), builtin_factory(platform));
        }
        registry
    }
}

fn parse_timeout_ms(value: Option<String>) -> Option<u64> {
    let raw = value?;
    match raw.trim().parse::<u64>() {
        Ok(timeout_ms) if timeout_ms > 0 => Some(timeout_ms),
        _ => {
            warn!(value = %raw, "ignoring invalid CHARTFETCH_TIMEOUT_MS");
            None
        }
    }
}
