//! Sources for the speech service subscription key.
//!
//! A node either carries its key inline, points at a shared credential entry
//! registered with the host, or reads it from the process environment.

use crate::error::NodeError;
use golem_speech_translation::config::env_vars;
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

pub trait CredentialProvider: Send + Sync {
    /// The subscription key, or `None` when the source has none to give.
    fn subscription_key(&self) -> Option<String>;

    fn kind(&self) -> &'static str;
}

/// Where a node takes its subscription key from.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CredentialSource {
    Inline(String),
    Shared(String),
    Environment,
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Inline(_) => f.write_str("Inline(<redacted>)"),
            CredentialSource::Shared(id) => f.debug_tuple("Shared").field(id).finish(),
            CredentialSource::Environment => f.write_str("Environment"),
        }
    }
}

impl CredentialSource {
    pub fn into_provider(
        self,
        store: &Arc<CredentialStore>,
    ) -> Result<Box<dyn CredentialProvider>, NodeError> {
        Ok(match self {
            CredentialSource::Inline(key) => Box::new(InlineCredentials::new(key)),
            CredentialSource::Shared(id) => {
                if id.trim().is_empty() {
                    return Err(NodeError::invalid_config(
                        "shared credential id cannot be empty",
                    ));
                }
                Box::new(SharedCredentials::new(id, Arc::clone(store)))
            }
            CredentialSource::Environment => Box::new(EnvCredentials::default()),
        })
    }
}

/// Key entered directly on the node.
pub struct InlineCredentials {
    key: Option<String>,
}

impl InlineCredentials {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            key: (!key.is_empty()).then_some(key),
        }
    }
}

impl CredentialProvider for InlineCredentials {
    fn subscription_key(&self) -> Option<String> {
        self.key.clone()
    }

    fn kind(&self) -> &'static str {
        "inline"
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SharedCredential {
    pub name: Option<String>,
    pub key: String,
}

impl SharedCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            name: None,
            key: key.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Debug for SharedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCredential")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Registry of credential entries shared between nodes, keyed by entry id.
/// Entries can be replaced at runtime; nodes look them up on every message.
#[derive(Debug, Default)]
pub struct CredentialStore {
    entries: RwLock<HashMap<String, SharedCredential>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: impl Into<String>, credential: SharedCredential) {
        let id = id.into();
        trace!("registering shared credential {id}");
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, credential);
    }

    pub fn remove(&self, id: &str) -> Option<SharedCredential> {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
    }

    pub fn get(&self, id: &str) -> Option<SharedCredential> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn resolve(&self, id: &str) -> Result<SharedCredential, NodeError> {
        self.get(id)
            .ok_or_else(|| NodeError::UnknownCredential(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Key taken from a shared credential entry.
pub struct SharedCredentials {
    id: String,
    store: Arc<CredentialStore>,
}

impl SharedCredentials {
    pub fn new(id: impl Into<String>, store: Arc<CredentialStore>) -> Self {
        Self {
            id: id.into(),
            store,
        }
    }
}

impl CredentialProvider for SharedCredentials {
    fn subscription_key(&self) -> Option<String> {
        match self.store.resolve(&self.id) {
            Ok(credential) if !credential.key.is_empty() => Some(credential.key),
            Ok(_) => None,
            Err(e) => {
                warn!("{e}");
                None
            }
        }
    }

    fn kind(&self) -> &'static str {
        "shared"
    }
}

/// Key read from an environment variable at message time.
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(env_vars::AZURE_SPEECH_KEY)
    }
}

impl CredentialProvider for EnvCredentials {
    fn subscription_key(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|key| !key.is_empty())
    }

    fn kind(&self) -> &'static str {
        "environment"
    }
}
