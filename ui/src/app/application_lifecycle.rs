//! Application lifecycle management
//!
//! This module handles the initialization, main loop, and shutdown of the shell.
//! It keeps main.rs down to argument parsing.

use super::shell::Shell;
use crate::config::{self, AppConfig, ConfigLoadResult};
use crate::error::{AppError, AppResult};
use crate::logger;

use log::{debug, error, info};
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

const PROMPT: &str = "navmail> ";

/// Lines typed ahead of the event loop before the reader thread waits.
const INPUT_BUFFER: usize = 16;

/// Application initialization and lifecycle management
pub struct ApplicationLifecycle;

impl ApplicationLifecycle {
    /// Load configuration, start logging and open the mailbox
    pub fn initialize(config_path: Option<&Path>) -> AppResult<Shell> {
        let config = Self::load_configuration(config_path)?;
        logger::setup_logger(config.logging())
            .map_err(|e| AppError::Config(format!("Failed to set up logging: {e}")))?;

        info!("Starting navmail shell");
        let shell = Shell::new(&config)?;
        info!("Configuration loaded and validated successfully");
        Ok(shell)
    }

    /// Load and validate the application configuration
    pub fn load_configuration(config_path: Option<&Path>) -> AppResult<AppConfig> {
        match config::load_config(config_path) {
            ConfigLoadResult::Success(config) => Ok(*config),
            ConfigLoadResult::LoadError(error) | ConfigLoadResult::DeserializeError(error) => {
                Err(AppError::Config(error))
            }
        }
    }

    /// Run the interactive loop: manager frames on every tick, one command
    /// per stdin line, until the mailbox closes, `quit` or end of input.
    pub async fn run_interactive(shell: &mut Shell) -> AppResult<()> {
        info!("Entering interactive loop");

        let mut ticker = tokio::time::interval(shell.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut input = Self::spawn_input_reader();
        let mut out = io::stdout();

        writeln!(out, "navmail: type 'help' for commands")?;
        shell.write_status(&mut out)?;
        Self::prompt(&mut out)?;

        while !shell.should_quit() {
            tokio::select! {
                _ = ticker.tick() => shell.advance(Instant::now()),
                line = input.recv() => match line {
                    Some(Ok(line)) => {
                        shell.handle_line(&line, &mut out)?;
                        if !shell.should_quit() {
                            Self::prompt(&mut out)?;
                        }
                    }
                    Some(Err(e)) => {
                        error!("Failed to read input: {e}");
                        return Err(e.into());
                    }
                    None => {
                        debug!("Input closed");
                        break;
                    }
                },
            }
        }

        info!("Leaving interactive loop");
        Ok(())
    }

    /// Run the commands of a script file, printing the output to stdout
    pub fn run_script_file(shell: &mut Shell, path: &Path) -> AppResult<()> {
        info!("Running script {}", path.display());
        let script = std::fs::read_to_string(path).map_err(|e| {
            AppError::Io(format!("Failed to read script '{}': {e}", path.display()))
        })?;
        shell.run_script(&script, &mut io::stdout())
    }

    /// Properly shutdown the application
    pub fn shutdown_application(mut shell: Shell) -> AppResult<()> {
        info!("Application shutdown initiated");
        shell.shutdown()?;
        info!("Application terminated successfully");
        Ok(())
    }

    // Reads stdin on a detached thread; the runtime never waits for it.
    fn spawn_input_reader() -> mpsc::Receiver<io::Result<String>> {
        let (sender, receiver) = mpsc::channel(INPUT_BUFFER);
        std::thread::spawn(move || {
            for line in io::stdin().lines() {
                if sender.blocking_send(line).is_err() {
                    break;
                }
            }
        });
        receiver
    }

    fn prompt(out: &mut impl Write) -> AppResult<()> {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        Ok(())
    }
}
