//! # Application Module
//!
//! Core application logic of the navmail shell. The shell hosts the screen
//! engine on a simulated navigation stack, feeds it user commands and drives
//! its event loop.
//!
//! ## Architecture
//!
//! The application follows a command-tick loop:
//! - **Commands** - one input line becomes one [`commands::Command`]
//! - **Shell** - turns commands into module manager calls
//! - **Ticks** - the manager runs deferred pops and stack notices every frame,
//!   and stack animations end after the configured transition time
//!
//! ## Core Components
//!
//! - [`application_lifecycle`] - Startup, interactive loop, script runs and shutdown
//! - [`commands`] - Command parsing and help text
//! - [`shell`] - Module manager host and status rendering
//!
//! ## Usage
//!
//! ```no_run
//! use navmail::app::application_lifecycle::ApplicationLifecycle;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut shell = ApplicationLifecycle::initialize(None)?;
//!     ApplicationLifecycle::run_interactive(&mut shell).await?;
//!     ApplicationLifecycle::shutdown_application(shell)?;
//!     Ok(())
//! }
//! ```

/// Application lifecycle management - startup, main loop, and shutdown
pub mod application_lifecycle;
/// Line commands understood by the shell
pub mod commands;
/// Module manager host
pub mod shell;
