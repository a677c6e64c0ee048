use crate::error::RelayError;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// How synthesized audio fragments are turned into relay results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmissionPolicy {
    /// Emit once, on the first audio fragment, carrying fragment 0.
    #[default]
    FirstFragment,
    /// Emit every fragment as it arrives, in order.
    EveryFragment,
}

impl FromStr for EmissionPolicy {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-fragment" | "first" => Ok(EmissionPolicy::FirstFragment),
            "every-fragment" | "every" | "all" => Ok(EmissionPolicy::EveryFragment),
            other => Err(RelayError::invalid_config(format!(
                "unknown emission policy '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Deadline for a whole turn, from accept to the last capability event.
    pub turn_timeout_ms: u64,
    pub max_audio_size_mb: u32,
    pub service_region: String,
    pub emission_policy: EmissionPolicy,
    pub log_level: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            turn_timeout_ms: 30_000,
            max_audio_size_mb: 100,
            service_region: "westus".to_string(),
            emission_policy: EmissionPolicy::FirstFragment,
            log_level: None,
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(secs) = env::var(env_vars::TRANSLATE_TURN_TIMEOUT_SECS)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.turn_timeout_ms = secs.saturating_mul(1000);
        }

        if let Some(mb) = env::var(env_vars::TRANSLATE_MAX_AUDIO_SIZE_MB)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
        {
            config.max_audio_size_mb = mb;
        }

        if let Ok(region) = env::var(env_vars::AZURE_SPEECH_REGION) {
            if !region.trim().is_empty() {
                config.service_region = region;
            }
        }

        if let Ok(policy) = env::var(env_vars::TRANSLATE_EMISSION_POLICY) {
            match policy.parse() {
                Ok(policy) => config.emission_policy = policy,
                Err(e) => log::warn!("ignoring {}: {e}", env_vars::TRANSLATE_EMISSION_POLICY),
            }
        }

        config.log_level = env::var(env_vars::TRANSLATE_LOG_LEVEL).ok();

        config
    }

    pub fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_emission_policy(mut self, policy: EmissionPolicy) -> Self {
        self.emission_policy = policy;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.service_region = region.into();
        self
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_ms)
    }

    pub fn max_audio_bytes(&self) -> usize {
        self.max_audio_size_mb as usize * 1024 * 1024
    }

    pub fn validate(&self) -> Result<(), RelayError> {
        if self.turn_timeout_ms == 0 {
            return Err(RelayError::invalid_config(
                "turn timeout must be greater than 0",
            ));
        }
        if self.max_audio_size_mb == 0 {
            return Err(RelayError::invalid_config(
                "audio size limit must be greater than 0",
            ));
        }
        if self.service_region.trim().is_empty() {
            return Err(RelayError::invalid_config("service region cannot be empty"));
        }
        Ok(())
    }

    pub fn validate_audio_size(&self, audio: &[u8]) -> Result<(), RelayError> {
        let limit = self.max_audio_bytes();
        if audio.len() > limit {
            return Err(RelayError::AudioTooLarge {
                size: audio.len(),
                limit,
            });
        }
        Ok(())
    }

    pub fn print_summary(&self) {
        log::debug!("Speech translation relay configuration:");
        log::debug!("  Turn timeout: {}ms", self.turn_timeout_ms);
        log::debug!("  Max audio size: {}MB", self.max_audio_size_mb);
        log::debug!("  Service region: {}", self.service_region);
        log::debug!("  Emission policy: {:?}", self.emission_policy);
    }
}

/// Environment variable names read by `RelayConfig::from_env`.
pub mod env_vars {
    /// Turn deadline in seconds
    pub const TRANSLATE_TURN_TIMEOUT_SECS: &str = "TRANSLATE_TURN_TIMEOUT_SECS";

    /// Largest accepted inbound audio payload in megabytes
    pub const TRANSLATE_MAX_AUDIO_SIZE_MB: &str = "TRANSLATE_MAX_AUDIO_SIZE_MB";

    /// `first-fragment` or `every-fragment`
    pub const TRANSLATE_EMISSION_POLICY: &str = "TRANSLATE_EMISSION_POLICY";

    pub const TRANSLATE_LOG_LEVEL: &str = "TRANSLATE_LOG_LEVEL";

    /// Region of the speech service, `westus` when unset
    pub const AZURE_SPEECH_REGION: &str = "AZURE_SPEECH_REGION";

    /// Subscription key used by environment-sourced credentials
    pub const AZURE_SPEECH_KEY: &str = "AZURE_SPEECH_KEY";
}
