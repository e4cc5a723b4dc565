use super::app::AppConfig;

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid navigation.transition_ms: {configured} (limit: {limit})")]
    TransitionDuration { configured: u64, limit: u64 },
    #[error("Invalid navigation.tick_interval_ms: {configured} (min: {min_limit}, max: {max_limit})")]
    TickInterval {
        configured: u64,
        min_limit: u64,
        max_limit: u64,
    },
    #[error("Invalid logging.file: path is empty")]
    EmptyLogFile,
}

impl ConfigValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigValidationError::TransitionDuration { configured, limit } => {
                format!(
                    "Transition duration too long!\n\n\
                    Your configured value: {configured} ms\n\
                    Maximum: {limit} ms\n\n\
                    Please update transition_ms in the [navigation] section of config.toml."
                )
            }
            ConfigValidationError::TickInterval {
                configured,
                min_limit,
                max_limit,
            } => {
                format!(
                    "Tick interval out of range!\n\n\
                    Your configured value: {configured} ms\n\
                    Valid range: {min_limit} - {max_limit} ms\n\n\
                    Please update tick_interval_ms in the [navigation] section of config.toml."
                )
            }
            ConfigValidationError::EmptyLogFile => "Log file path is empty!\n\n\
                Remove logging.file from config.toml to log to navmail.log, or give it a path."
                .to_string(),
        }
    }
}

/// Configuration loading result
pub enum ConfigLoadResult {
    Success(Box<AppConfig>),
    LoadError(String),
    DeserializeError(String),
}
