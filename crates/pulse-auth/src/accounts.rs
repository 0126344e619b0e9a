//! Credential lookup for the login endpoint.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;

use pulse_core::config::AccountConfig;
use pulse_core::error::AppError;
use pulse_core::result::AppResult;
use pulse_core::types::UserId;

use crate::password::PasswordHasher;

/// The identity fields that end up in token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Identity.
    pub id: UserId,
    /// E-mail address.
    pub email: String,
    /// Subscription plan.
    pub plan: String,
}

/// Resolves login credentials to an account.
#[async_trait]
pub trait AccountDirectory: Send + Sync + std::fmt::Debug {
    /// Returns the account when `password` matches, `None` otherwise.
    async fn verify_credentials(&self, email: &str, password: &str) -> AppResult<Option<Account>>;
}

#[derive(Debug, Clone)]
struct StoredAccount {
    account: Account,
    password_hash: String,
}

/// Account directory backed by the `auth.accounts` configuration list.
#[derive(Debug, Clone, Default)]
pub struct StaticAccountDirectory {
    /// Lower-cased e-mail → account.
    accounts: HashMap<String, StoredAccount>,
    hasher: PasswordHasher,
}

impl StaticAccountDirectory {
    /// Builds the directory from configuration entries.
    pub fn new(entries: &[AccountConfig]) -> Self {
        let mut accounts = HashMap::with_capacity(entries.len());
        for entry in entries {
            let key = entry.email.to_lowercase();
            if accounts.contains_key(&key) {
                warn!(email = %entry.email, "Duplicate account e-mail in configuration, keeping first");
                continue;
            }
            accounts.insert(
                key,
                StoredAccount {
                    account: Account {
                        id: UserId::from_uuid(entry.id),
                        email: entry.email.clone(),
                        plan: entry.plan.clone(),
                    },
                    password_hash: entry.password_hash.clone(),
                },
            );
        }

        Self {
            accounts,
            hasher: PasswordHasher::new(),
        }
    }

    /// Number of configured accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether no accounts are configured.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl AccountDirectory for StaticAccountDirectory {
    async fn verify_credentials(&self, email: &str, password: &str) -> AppResult<Option<Account>> {
        let Some(stored) = self.accounts.get(&email.to_lowercase()).cloned() else {
            return Ok(None);
        };

        let hasher = self.hasher.clone();
        let password = password.to_string();
        // Argon2 is CPU-bound.
        let matches = tokio::task::spawn_blocking(move || {
            hasher.verify_password(&password, &stored.password_hash)
        })
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))??;

        Ok(matches.then_some(stored.account))
    }
}
