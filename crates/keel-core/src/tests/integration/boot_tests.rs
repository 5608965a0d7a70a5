use std::sync::Arc;

use crate::kernel::bootstrap::{Kernel, KernelState};
use crate::lifecycle::{hook_fn, sync_hook};
use crate::service::{ServiceDescriptor, ServiceState};
use crate::tests::integration::common::{new_recorder, traced_service};

/// Full modular-backend boot: filesystem, auth, permissions, extensions,
/// and web routing wired through the kernel, with routes contributed to
/// the shared context during an announcement phase.
#[tokio::test]
async fn test_full_backend_boot_sequence() {
    let recorder = new_recorder();
    let mut kernel = Kernel::new();
    kernel.add_announcement_phase("install.routes").unwrap();

    kernel
        .register(traced_service("fs", &["construct", "init"], &recorder))
        .await
        .unwrap();
    kernel
        .register(
            traced_service("auth", &["construct", "init"], &recorder).with_dependency("fs"),
        )
        .await
        .unwrap();
    kernel
        .register(
            traced_service("perms", &["construct", "init"], &recorder)
                .with_dependency("auth"),
        )
        .await
        .unwrap();
    kernel
        .register(
            traced_service("extensions", &["construct", "init"], &recorder)
                .with_dependencies(&["fs", "perms"]),
        )
        .await
        .unwrap();

    // The web service contributes routes during the announcement phase.
    kernel
        .register(
            ServiceDescriptor::new("web")
                .with_dependencies(&["auth", "perms"])
                .with_hook(
                    "install.routes",
                    sync_hook(|ctx| {
                        ctx.set_data(
                            "routes",
                            vec!["/login".to_string(), "/files".to_string()],
                        );
                        Ok(())
                    }),
                ),
        )
        .await
        .unwrap();

    let result = kernel.boot().await.unwrap();
    assert!(result.is_ready());
    assert_eq!(kernel.state(), KernelState::Ready);

    // Dependency order held for every traced phase
    let trace = recorder.lock().unwrap().clone();
    let construct: Vec<_> = trace
        .iter()
        .filter(|e| e.starts_with("construct:"))
        .collect();
    assert_eq!(
        construct,
        vec![
            "construct:fs",
            "construct:auth",
            "construct:perms",
            "construct:extensions"
        ]
    );

    // Routes landed in the shared context
    let routes: Vec<String> = kernel.context().get_data("routes").unwrap();
    assert_eq!(routes, vec!["/login", "/files"]);

    // Every service reached ready, including hook-less phases
    for (id, state) in kernel.service_states().await {
        assert_eq!(state, ServiceState::Ready, "service {} not ready", id);
    }
}

/// A hook may suspend on asynchronous work; the dispatcher awaits it
/// before the next service's hook starts.
#[tokio::test]
async fn test_async_hooks_complete_before_next_service() {
    let recorder = new_recorder();
    let mut kernel = Kernel::new();

    let slow_recorder = Arc::clone(&recorder);
    kernel
        .register(ServiceDescriptor::new("slow").with_hook(
            "init",
            hook_fn(Box::new(move |_ctx| {
                let recorder = Arc::clone(&slow_recorder);
                Box::pin(async move {
                    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    recorder.lock().unwrap().push("init:slow".to_string());
                    Ok(())
                })
            })),
        ))
        .await
        .unwrap();
    kernel
        .register(traced_service("fast", &["init"], &recorder).with_dependency("slow"))
        .await
        .unwrap();

    assert!(kernel.boot().await.unwrap().is_ready());
    assert_eq!(*recorder.lock().unwrap(), vec!["init:slow", "init:fast"]);
}

/// A transitive self-dependency (`x -> y -> x`) fails boot naming both
/// ids, and the kernel never invokes any hook.
#[tokio::test]
async fn test_transitive_cycle_reported() {
    let recorder = new_recorder();
    let mut kernel = Kernel::new();
    kernel
        .register(traced_service("x", &["construct"], &recorder).with_dependency("y"))
        .await
        .unwrap();
    kernel
        .register(traced_service("y", &["construct"], &recorder).with_dependency("x"))
        .await
        .unwrap();

    let result = kernel.boot().await.unwrap();
    assert!(!result.is_ready());
    let rendered = format!("{}", result);
    assert!(rendered.contains('x') && rendered.contains('y'));
    assert!(recorder.lock().unwrap().is_empty());
    assert_eq!(kernel.state(), KernelState::Failed);
}
