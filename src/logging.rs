//! Tracing subscriber bootstrap.
//!
//! Installs a `fmt` subscriber with an `EnvFilter` at most once per
//! process. `RUST_LOG`, when set, overrides the supplied default directive.

use crate::config::BoardConfig;
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

static ACTIVE_FILTER: OnceCell<String> = OnceCell::new();

/// Errors returned by [`init_logging`].
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A filter directive could not be parsed.
    #[error("invalid log filter `{directive}`: {source}")]
    InvalidFilter {
        /// Directive as supplied.
        directive: String,
        /// Parser error.
        #[source]
        source: ParseError,
    },

    /// Another global subscriber was installed outside this module.
    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInstalled(String),
}

/// Installs the global subscriber.
///
/// Returns `Ok(true)` when this call installed it and `Ok(false)` when a
/// previous call already had.
///
/// # Errors
///
/// Returns [`LoggingError::InvalidFilter`] when `default_directive` (or
/// `RUST_LOG`) does not parse, or [`LoggingError::AlreadyInstalled`] when
/// some other code owns the global subscriber.
pub fn init_logging(default_directive: &str) -> Result<bool, LoggingError> {
    parse_filter(default_directive)?;
    if ACTIVE_FILTER.get().is_some() {
        return Ok(false);
    }

    let directive = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default_directive.to_owned());
    let filter = parse_filter(&directive)?;

    let mut installed = false;
    ACTIVE_FILTER.get_or_try_init(|| {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
            .map_err(|err| LoggingError::AlreadyInstalled(err.to_string()))?;
        installed = true;
        Ok::<_, LoggingError>(directive)
    })?;
    Ok(installed)
}

/// Installs the global subscriber with the configured `log_filter` as the
/// default directive.
///
/// # Errors
///
/// Same as [`init_logging`].
pub fn init_from_config(config: &BoardConfig) -> Result<bool, LoggingError> {
    init_logging(&config.log_filter)
}

/// Returns the directive the installed subscriber was built from.
#[must_use]
pub fn active_filter() -> Option<&'static str> {
    ACTIVE_FILTER.get().map(String::as_str)
}

fn parse_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|source| LoggingError::InvalidFilter {
        directive: directive.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn second_initialisation_is_a_no_op() -> eyre::Result<()> {
        init_logging("info")?;
        eyre::ensure!(!init_logging("debug")?);
        eyre::ensure!(active_filter().is_some());
        Ok(())
    }

    #[rstest]
    fn rejects_unparseable_directive() {
        let result = init_logging("taskboard=loudest");
        assert!(matches!(result, Err(LoggingError::InvalidFilter { .. })));
    }

    #[rstest]
    fn configured_filter_is_the_default_directive() -> eyre::Result<()> {
        let config = BoardConfig::from_toml_str("log_filter = \"taskboard=debug\"\n")?;
        init_from_config(&config)?;
        eyre::ensure!(active_filter().is_some());
        Ok(())
    }

    #[rstest]
    fn configured_filter_must_parse() {
        let config = BoardConfig {
            log_filter: "taskboard=loudest".to_owned(),
            ..BoardConfig::default()
        };
        let result = init_from_config(&config);
        assert!(matches!(
            result,
            Err(LoggingError::InvalidFilter { directive, .. }) if directive == "taskboard=loudest"
        ));
    }
}
