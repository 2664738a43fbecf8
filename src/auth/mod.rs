//! Credential resolution.
//!
//! Credentials are resolved through a [`CredentialsProvider`] handed to the
//! client factory, so the authentication path can be swapped out in tests.
//!
//! Against Google Cloud the default chain is Application Default Credentials
//! ([`AdcCredentialsProvider`]) followed by the environment provider. With
//! `PUBSUB_EMULATOR_HOST` set only the environment provider is consulted.

use async_trait::async_trait;
use gcp_auth::TokenProvider;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable naming a local Pub/Sub emulator (`host:port`).
pub const EMULATOR_HOST_ENV: &str = "PUBSUB_EMULATOR_HOST";
/// Environment variable holding the default project ID.
pub const PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";
/// Environment variable holding an OAuth 2.0 access token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
/// Environment variable pointing at a service account key file (read by ADC).
pub const APPLICATION_CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
/// OAuth 2.0 scope requested for publishing.
pub const PUBSUB_SCOPE: &str = "https://www.googleapis.com/auth/pubsub";

/// Resolved credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_token: Option<String>,
    project_id: Option<String>,
    anonymous: bool,
}

impl Credentials {
    /// Bearer token credentials.
    pub fn bearer(token: impl Into<String>, project_id: Option<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            project_id,
            anonymous: false,
        }
    }

    /// Credentials for an emulator, which does not check tokens.
    pub fn anonymous(project_id: Option<String>) -> Self {
        Self {
            access_token: None,
            project_id,
            anonymous: true,
        }
    }

    /// Bearer token, if any.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Project ID associated with the credentials.
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Whether these credentials are usable.
    pub fn is_valid(&self) -> bool {
        self.anonymous || self.access_token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("project_id", &self.project_id)
            .field("anonymous", &self.anonymous)
            .finish()
    }
}

/// Source of credentials.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Resolve credentials for the current execution environment.
    ///
    /// Returns `Ok(None)` when no credentials are available.
    async fn resolve(&self) -> Result<Option<Credentials>>;
}

/// Provider returning a fixed value.
#[derive(Debug, Clone)]
pub struct StaticCredentialsProvider {
    credentials: Option<Credentials>,
}

impl StaticCredentialsProvider {
    /// Provider that always yields `credentials`.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
        }
    }

    /// Provider that never yields credentials.
    pub fn empty() -> Self {
        Self { credentials: None }
    }
}

#[async_trait]
impl CredentialsProvider for StaticCredentialsProvider {
    async fn resolve(&self) -> Result<Option<Credentials>> {
        Ok(self.credentials.clone())
    }
}

/// Provider reading process environment variables.
///
/// `PUBSUB_EMULATOR_HOST` yields anonymous credentials; otherwise
/// `GOOGLE_OAUTH_ACCESS_TOKEN` is used as a bearer token. `GOOGLE_CLOUD_PROJECT`
/// supplies the associated project in both cases.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentCredentialsProvider {
    _private: (),
}

impl EnvironmentCredentialsProvider {
    /// Create a new environment provider.
    pub fn new() -> Self {
        Self::default()
    }

    fn from_lookup<F>(lookup: F) -> Option<Credentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let project_id = non_empty(PROJECT_ENV);

        if let Some(host) = non_empty(EMULATOR_HOST_ENV) {
            debug!("Using emulator credentials for {}", host);
            return Some(Credentials::anonymous(project_id));
        }

        non_empty(ACCESS_TOKEN_ENV).map(|token| Credentials::bearer(token, project_id))
    }
}

#[async_trait]
impl CredentialsProvider for EnvironmentCredentialsProvider {
    async fn resolve(&self) -> Result<Option<Credentials>> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }
}

enum TokenSource {
    /// Discover ADC on first use.
    Discover,
    Provider(Arc<dyn TokenProvider>),
}

/// Provider backed by Google Application Default Credentials.
///
/// Discovery follows the usual ADC order: the key file named by
/// `GOOGLE_APPLICATION_CREDENTIALS`, the gcloud user credentials, then the
/// metadata server. Finding no ADC at all yields `Ok(None)`; ADC that is found
/// but cannot produce a token is an authentication error.
pub struct AdcCredentialsProvider {
    source: TokenSource,
}

impl AdcCredentialsProvider {
    /// Provider that discovers ADC when first resolved.
    pub fn new() -> Self {
        Self {
            source: TokenSource::Discover,
        }
    }

    /// Provider using an explicit service account key file.
    pub fn from_service_account_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let account = gcp_auth::CustomServiceAccount::from_file(path).map_err(|e| {
            Error::Authentication(format!(
                "failed to load service account key {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self::with_token_provider(Arc::new(account)))
    }

    /// Provider wrapping an existing token provider.
    pub fn with_token_provider(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            source: TokenSource::Provider(provider),
        }
    }
}

impl Default for AdcCredentialsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AdcCredentialsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source {
            TokenSource::Discover => "discover",
            TokenSource::Provider(_) => "provider",
        };
        f.debug_struct("AdcCredentialsProvider")
            .field("source", &source)
            .finish()
    }
}

#[async_trait]
impl CredentialsProvider for AdcCredentialsProvider {
    async fn resolve(&self) -> Result<Option<Credentials>> {
        let provider = match &self.source {
            TokenSource::Provider(provider) => provider.clone(),
            TokenSource::Discover => match gcp_auth::provider().await {
                Ok(provider) => provider,
                Err(e) => {
                    debug!("No application default credentials: {}", e);
                    return Ok(None);
                }
            },
        };

        let token = provider
            .token(&[PUBSUB_SCOPE])
            .await
            .map_err(|e| Error::Authentication(format!("failed to obtain access token: {}", e)))?;

        let project_id = match provider.project_id().await {
            Ok(project) => Some(project.to_string()),
            Err(e) => {
                debug!("ADC has no associated project: {}", e);
                None
            }
        };

        Ok(Some(Credentials::bearer(token.as_str(), project_id)))
    }
}

/// Provider trying each inner provider in order.
pub struct ChainCredentialsProvider {
    providers: Vec<Box<dyn CredentialsProvider>>,
}

impl ChainCredentialsProvider {
    /// Chain over `providers`, first match wins.
    pub fn new(providers: Vec<Box<dyn CredentialsProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl CredentialsProvider for ChainCredentialsProvider {
    async fn resolve(&self) -> Result<Option<Credentials>> {
        for provider in &self.providers {
            if let Some(credentials) = provider.resolve().await? {
                return Ok(Some(credentials));
            }
        }
        Ok(None)
    }
}

/// Provider used by the command line.
///
/// `emulator` selects the environment provider alone; otherwise ADC comes
/// first with the environment as a fallback.
pub fn default_provider(emulator: bool) -> Box<dyn CredentialsProvider> {
    if emulator {
        Box::new(EnvironmentCredentialsProvider::new())
    } else {
        Box::new(ChainCredentialsProvider::new(vec![
            Box::new(AdcCredentialsProvider::new()),
            Box::new(EnvironmentCredentialsProvider::new()),
        ]))
    }
}

/// Resolve credentials and require them to be valid.
pub async fn resolve_required(provider: &dyn CredentialsProvider) -> Result<Credentials> {
    match provider.resolve().await? {
        Some(credentials) if credentials.is_valid() => Ok(credentials),
        Some(_) => Err(Error::Authentication(
            "resolved credentials are not valid".to_string(),
        )),
        None => Err(Error::Authentication(format!(
            "no credentials found; run `gcloud auth application-default login`, \
             set {} to a service account key, or set {} / {}",
            APPLICATION_CREDENTIALS_ENV, ACCESS_TOKEN_ENV, EMULATOR_HOST_ENV
        ))),
    }
}
