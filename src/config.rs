//! Board configuration.
//!
//! Every key is optional; missing keys take the defaults below.
//!
//! ```toml
//! actor = "robin"
//! swipe_threshold = 100
//! activity_feed_limit = 50
//! log_filter = "info"
//! ```

use crate::board::domain::{ActorId, DEFAULT_SWIPE_THRESHOLD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default actor stamped on every mutation.
pub const DEFAULT_ACTOR: &str = "robin";

/// Default row limit for the activity feed and per-task history.
pub const DEFAULT_ACTIVITY_FEED_LIMIT: usize = 50;

/// Default tracing directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Errors returned while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("invalid board configuration: {0}")]
    Parse(#[source] Box<toml::de::Error>),

    /// The swipe threshold is zero.
    #[error("swipe_threshold must be greater than zero")]
    ZeroSwipeThreshold,

    /// The activity feed limit is zero.
    #[error("activity_feed_limit must be greater than zero")]
    ZeroFeedLimit,

    /// The actor is blank.
    #[error("actor must not be empty")]
    EmptyActor,
}

/// Runtime settings for a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    /// Actor identifier stamped on tasks, activity records, and comments.
    pub actor: String,
    /// Horizontal displacement a touch swipe must exceed to move a task.
    pub swipe_threshold: u32,
    /// Default limit for activity listings.
    pub activity_feed_limit: usize,
    /// Default tracing directive; `RUST_LOG` takes precedence.
    pub log_filter: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            actor: DEFAULT_ACTOR.to_owned(),
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            activity_feed_limit: DEFAULT_ACTIVITY_FEED_LIMIT,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl BoardConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys,
    /// or a validation error from [`BoardConfig::validate`].
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(document).map_err(|err| ConfigError::Parse(Box::new(err)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroSwipeThreshold`],
    /// [`ConfigError::ZeroFeedLimit`], or [`ConfigError::EmptyActor`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.swipe_threshold == 0 {
            return Err(ConfigError::ZeroSwipeThreshold);
        }
        if self.activity_feed_limit == 0 {
            return Err(ConfigError::ZeroFeedLimit);
        }
        self.actor_id().map(drop)
    }

    /// Returns the configured actor as a validated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyActor`] when the actor is blank.
    pub fn actor_id(&self) -> Result<ActorId, ConfigError> {
        ActorId::new(self.actor.as_str()).map_err(|_| ConfigError::EmptyActor)
    }
}
