use clap::Parser;
use navmail::app::application_lifecycle::ApplicationLifecycle;
use std::path::PathBuf;

/// Terminal shell for the navmail screen engine
#[derive(Parser, Debug)]
#[command(name = "navmail", version, about)]
struct Cli {
    /// Configuration file (default: config.toml in the working directory, if present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run the commands of a file instead of reading stdin
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut shell = match ApplicationLifecycle::initialize(cli.config.as_deref()) {
        Ok(shell) => shell,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    match cli.script {
        Some(path) => ApplicationLifecycle::run_script_file(&mut shell, &path)?,
        None => ApplicationLifecycle::run_interactive(&mut shell).await?,
    }

    ApplicationLifecycle::shutdown_application(shell)?;
    Ok(())
}
