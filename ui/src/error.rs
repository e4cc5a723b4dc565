use engine::module_manager::ModuleError;
use std::fmt::Display;

/// Application-wide error types for the navmail shell.
///
/// This enum classifies everything that can go wrong between reading the
/// configuration and the last line of a session: screen navigation refused by
/// the module manager, configuration problems, commands the shell does not
/// understand and terminal I/O failures.
///
/// # Error Categories
///
/// ## Navigation Errors
/// - [`Navigation`] - The module manager or a screen refused a request
///
/// ## User Input Errors
/// - [`Command`] - Unknown command or missing argument
///
/// ## System and Configuration Errors
/// - [`Io`] - Terminal, script file or log file I/O failures
/// - [`Config`] - Configuration loading and validation errors
///
/// # Examples
///
/// ## Reporting Without Ending the Session
/// ```no_run
/// use navmail::error::AppError;
///
/// fn report(error: &AppError) {
///     match error {
///         AppError::Navigation(msg) | AppError::Command(msg) => {
///             // The session goes on; the user just sees what happened
///             println!("error: {msg}");
///         }
///         AppError::Config(_) | AppError::Io(_) => {
///             log::error!("{error}");
///         }
///     }
/// }
/// ```
///
/// ## Error Propagation and Conversion
/// ```no_run
/// use engine::module_manager::ModuleManager;
/// use navmail::error::AppResult;
///
/// fn go_back_to_root(manager: &mut ModuleManager) -> AppResult<()> {
///     if let Some(top) = manager.top_module() {
///         if manager.root_module() != Some(top) {
///             // ModuleError converts into AppError::Navigation
///             manager.destroy_module(top)?;
///         }
///     }
///     Ok(())
/// }
/// ```
///
/// [`Navigation`]: AppError::Navigation
/// [`Command`]: AppError::Command
/// [`Io`]: AppError::Io
/// [`Config`]: AppError::Config
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Screen navigation failures.
    ///
    /// Raised when the module manager rejects an operation (wrong screen on
    /// top, screen already closing, nothing to show) or when a screen itself
    /// refuses a message. The manager leaves its state untouched, so the
    /// session can simply continue.
    ///
    /// # Recovery
    /// - Show the reason to the user
    /// - Keep the session running
    Navigation(String),

    /// Configuration loading and validation errors.
    ///
    /// This error occurs when the configuration file cannot be loaded or
    /// parsed, or contains values outside their limits. Configuration errors
    /// prevent the shell from starting.
    ///
    /// # Recovery
    /// - Print every validation message
    /// - Exit with a failure status
    Config(String),

    /// Input the shell could not turn into a command.
    ///
    /// # Recovery
    /// - Point the user at `help`
    Command(String),

    /// Terminal, script file and log file I/O failures.
    ///
    /// # Recovery
    /// - End the session; the terminal is likely gone
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Navigation(msg) => write!(f, "Navigation Error: {msg}"),
            AppError::Config(msg) => write!(f, "Configuration Error: {msg}"),
            AppError::Command(msg) => write!(f, "Command Error: {msg}"),
            AppError::Io(msg) => write!(f, "IO Error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<ModuleError> for AppError {
    fn from(err: ModuleError) -> Self {
        AppError::Navigation(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
