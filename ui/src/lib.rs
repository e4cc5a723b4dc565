//! # Navmail Shell Library
//!
//! Terminal shell hosting the navmail screen engine. It loads configuration,
//! sets up logging, registers the mail client's screens with the module
//! manager and drives the manager's event loop from typed or scripted
//! commands.
//!
//! ## Features
//!
//! - Mailbox, message viewer, composer, settings and filter screens
//! - Simulated navigation stack with timed push/pop animations
//! - Pause/resume, rotation, language and memory events
//! - Script mode for reproducible sessions
//!
//! ## Modules
//!
//! - [`app`] - Shell, command parsing and application lifecycle
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Application error types
//! - [`logger`] - Logging configuration
//! - [`screens`] - Concrete screens built on the engine
//!
//! This library interface enables integration testing by providing access to internal modules.

pub mod app;
pub mod config;
pub mod error;
pub mod logger;
pub mod screens;

pub use error::{AppError, AppResult};
