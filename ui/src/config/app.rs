use super::{
    LoggingConfig, limits::*, navigation::NavigationConfig, validation::ConfigValidationError,
};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct AppConfig {
    #[serde(default)]
    navigation: NavigationConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl AppConfig {
    /// Validate the configuration against defined limits
    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        if self.navigation.transition_ms() > MAX_TRANSITION_MS {
            errors.push(ConfigValidationError::TransitionDuration {
                configured: self.navigation.transition_ms(),
                limit: MAX_TRANSITION_MS,
            });
        }

        let tick = self.navigation.tick_interval_ms();
        if !(MIN_TICK_INTERVAL_MS..=MAX_TICK_INTERVAL_MS).contains(&tick) {
            errors.push(ConfigValidationError::TickInterval {
                configured: tick,
                min_limit: MIN_TICK_INTERVAL_MS,
                max_limit: MAX_TICK_INTERVAL_MS,
            });
        }

        if self.logging.file().is_some_and(|file| file.trim().is_empty()) {
            errors.push(ConfigValidationError::EmptyLogFile);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn navigation(&self) -> &NavigationConfig {
        &self.navigation
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }
}
