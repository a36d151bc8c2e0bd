//! Chimera CLI and REST API entry point.
//!
//! Binary name: `chimera`
//!
//! Parses CLI arguments, loads skill contracts and handlers, then dispatches
//! to the appropriate command or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use chimera_observe::{init_tracing, shutdown_tracing, verbosity_filter};
use cli::{Cli, Commands};
use state::{AppState, Locations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(verbosity_filter(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    let succeeded = run(cli).await;
    shutdown_tracing();

    match succeeded {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => Err(e),
    }
}

/// Run one command. `Ok(false)` means the command reported a failure itself.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    // Commands that don't need a loaded runtime
    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(*shell, &mut cmd, "chimera", &mut std::io::stdout());
            return Ok(true);
        }
        Commands::Check => {
            let (locations, _) =
                Locations::resolve(cli.data_dir.clone(), cli.skills_dir.clone()).await;
            return cli::skill::check_contracts(&locations.skills_dir, cli.json);
        }
        _ => {}
    }

    let state = AppState::init(cli.data_dir.clone(), cli.skills_dir.clone()).await?;

    match cli.command {
        Commands::List => cli::skill::list_skills(&state, cli.json)?,

        Commands::Show { skill_id } => cli::skill::show_skill(&state, &skill_id, cli.json)?,

        Commands::Invoke {
            skill_id,
            input,
            input_file,
        } => {
            let input = cli::skill::read_input(input.as_deref(), input_file.as_ref())?;
            return cli::skill::invoke_skill(&state, &skill_id, &input, cli.json, cli.quiet).await;
        }

        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Chimera API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Completions { .. } | Commands::Check => unreachable!("handled above"),
    }

    Ok(true)
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
