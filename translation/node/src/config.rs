use crate::credentials::CredentialSource;
use crate::error::NodeError;
use serde::{Deserialize, Serialize};

/// Settings of one Translate Speech node, as stored in the flow definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Recognition language tag, e.g. `en-US`
    pub from: String,
    /// Target language tag, e.g. `de-DE`
    pub to: String,
    /// Synthesis voice name, e.g. `de-DE-Hedda`
    pub voice: String,
    pub credentials: CredentialSource,
    /// Overrides the relay's service region when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Log credential presence and language settings for every message.
    #[serde(default)]
    pub debug: bool,
}

impl NodeConfig {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        voice: impl Into<String>,
        credentials: CredentialSource,
    ) -> Self {
        Self {
            name: None,
            from: from.into(),
            to: to.into(),
            voice: voice.into(),
            credentials,
            region: None,
            debug: false,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, NodeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        for (field, value) in [
            ("from", &self.from),
            ("to", &self.to),
            ("voice", &self.voice),
        ] {
            if value.trim().is_empty() {
                return Err(NodeError::invalid_config(format!(
                    "'{field}' cannot be empty"
                )));
            }
        }
        if let Some(region) = &self.region {
            if region.trim().is_empty() {
                return Err(NodeError::invalid_config("region cannot be blank"));
            }
        }
        Ok(())
    }

    /// Name used in log lines.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("translate speech")
    }
}
