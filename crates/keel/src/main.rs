mod cli;

use clap::Parser;
use keel_core::{BootResult, KernelError};
use log::error;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // The fmt subscriber installs the `log` bridge, so keel-core's `log`
    // macros land here as well.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let args = cli::CliArgs::parse();
    if let Err(e) = run(args.command).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: cli::Commands) -> Result<(), KernelError> {
    match command {
        cli::Commands::Plan => {
            let kernel = cli::demo_kernel().await?;
            let order = kernel.plan().await?;
            println!("Boot order ({} services):", order.len());
            for (i, id) in order.iter().enumerate() {
                println!("  {}. {}", i + 1, id);
            }
            Ok(())
        }
        cli::Commands::Boot => {
            let mut kernel = cli::demo_kernel().await?;
            match kernel.boot().await? {
                BootResult::Ready => {
                    println!("Kernel is ready.");
                    if let Some(routes) = kernel.context().get_data::<Vec<String>>("routes") {
                        println!("Installed routes: {}", routes.join(", "));
                    }
                    for (id, state) in kernel.service_states().await {
                        println!("  {} -> {}", id, state);
                    }
                    // Demonstrate steady-state eventing after boot.
                    kernel
                        .context()
                        .emit("session.created", serde_json::json!({ "user": "demo" }))
                        .await?;
                    Ok(())
                }
                failed => {
                    eprintln!("Boot failed: {}", failed);
                    std::process::exit(1);
                }
            }
        }
    }
}
