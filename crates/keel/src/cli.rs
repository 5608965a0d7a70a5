use clap::{Parser, Subcommand};
use keel_core::event::sync_event_handler;
use keel_core::lifecycle::{hook_fn, sync_hook};
use keel_core::{Kernel, KernelError, ServiceDescriptor};
use log::info;

/// Keel: a service kernel and event-driven extension bus
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Boot the demo services to ready and report the outcome
    Boot,
    /// Print the resolved boot order without running any hook
    Plan,
}

/// Assemble the demo kernel: a small backend of four services wired with
/// dependencies, lifecycle hooks, and a route announcement phase.
pub async fn demo_kernel() -> Result<Kernel, KernelError> {
    let mut kernel = Kernel::new();
    kernel.add_announcement_phase("install.routes")?;

    kernel
        .register(ServiceDescriptor::new("db").with_hook(
            "construct",
            sync_hook(|_ctx| {
                info!("db: opening connection pool");
                Ok(())
            }),
        ))
        .await?;

    // auth subscribes during init and keeps reacting after boot.
    kernel
        .register(
            ServiceDescriptor::new("auth").with_dependency("db").with_hook(
                "init",
                hook_fn(Box::new(|ctx| {
                    Box::pin(async move {
                        let handler = sync_event_handler(|event| {
                            info!(
                                "auth: observed '{}' from '{}'",
                                event.key, event.meta.source
                            );
                            Ok(())
                        });
                        ctx.subscribe("session.*", handler).await?;
                        info!("auth: watching session events");
                        Ok(())
                    })
                })),
            ),
        )
        .await?;

    kernel
        .register(
            ServiceDescriptor::new("api")
                .with_dependencies(&["db", "auth"])
                .with_hook(
                    "install.routes",
                    sync_hook(|ctx| {
                        let mut routes =
                            ctx.take_data::<Vec<String>>("routes").unwrap_or_default();
                        routes.push("/api/v1/session".to_string());
                        ctx.set_data("routes", routes);
                        Ok(())
                    }),
                ),
        )
        .await?;

    kernel
        .register(
            ServiceDescriptor::new("web")
                .with_dependency("api")
                .with_hook(
                    "install.routes",
                    sync_hook(|ctx| {
                        let mut routes =
                            ctx.take_data::<Vec<String>>("routes").unwrap_or_default();
                        routes.push("/".to_string());
                        ctx.set_data("routes", routes);
                        Ok(())
                    }),
                )
                .with_hook(
                    "ready",
                    sync_hook(|_ctx| {
                        info!("web: accepting requests");
                        Ok(())
                    }),
                ),
        )
        .await?;

    Ok(kernel)
}
