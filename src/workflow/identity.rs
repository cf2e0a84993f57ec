//! Account and region resolution for workflow targeting.

use async_trait::async_trait;

use crate::config::WorkflowConfig;
use crate::error::{LakeqError, Result};
use crate::workflow::IdentityResolver;

/// The account and region a workflow target lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account: String,
    pub region: String,
}

impl CallerIdentity {
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
        }
    }
}

/// Resolves identity from configuration, falling back to the environment.
///
/// The environment is read on every call, never cached.
#[derive(Debug, Clone, Default)]
pub struct ConfigIdentityResolver {
    account: Option<String>,
    region: Option<String>,
}

impl ConfigIdentityResolver {
    pub fn new(account: Option<String>, region: Option<String>) -> Self {
        Self { account, region }
    }

    /// Picks the first non-empty value among the configured one and the env vars.
    fn first_set(configured: &Option<String>, vars: &[&str]) -> Option<String> {
        configured
            .clone()
            .into_iter()
            .chain(vars.iter().filter_map(|v| std::env::var(v).ok()))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
    }
}

impl From<&WorkflowConfig> for ConfigIdentityResolver {
    fn from(config: &WorkflowConfig) -> Self {
        Self::new(config.account_id.clone(), config.region.clone())
    }
}

#[async_trait]
impl IdentityResolver for ConfigIdentityResolver {
    async fn resolve(&self) -> Result<CallerIdentity> {
        let account = Self::first_set(&self.account, &["AWS_ACCOUNT_ID"])
            .ok_or_else(|| LakeqError::identity("failed to get account id"))?;
        let region = Self::first_set(&self.region, &["AWS_REGION", "AWS_DEFAULT_REGION"])
            .ok_or_else(|| LakeqError::identity("failed to get region"))?;
        Ok(CallerIdentity { account, region })
    }
}
