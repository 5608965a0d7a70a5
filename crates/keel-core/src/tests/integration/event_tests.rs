use std::sync::{Arc, Mutex as StdMutex};

use crate::event::{sync_event_handler, EventMeta};
use crate::kernel::bootstrap::Kernel;
use crate::lifecycle::hook_fn;
use crate::service::ServiceDescriptor;

/// Steady-state flow: a service subscribes during `init` and keeps
/// reacting to domain events after boot completes.
#[tokio::test]
async fn test_services_communicate_over_the_bus_after_boot() {
    let seen = Arc::new(StdMutex::new(Vec::new()));
    let mut kernel = Kernel::new();

    kernel
        .register(ServiceDescriptor::new("fs"))
        .await
        .unwrap();

    // auth watches all filesystem events via a wildcard subscription.
    let seen_clone = Arc::clone(&seen);
    kernel
        .register(
            ServiceDescriptor::new("auth")
                .with_dependency("fs")
                .with_hook(
                    "init",
                    hook_fn(Box::new(move |ctx| {
                        let seen = Arc::clone(&seen_clone);
                        Box::pin(async move {
                            let handler = sync_event_handler(move |event| {
                                seen.lock().unwrap().push(format!(
                                    "{}@{}",
                                    event.key, event.meta.source
                                ));
                                Ok(())
                            });
                            ctx.subscribe("fs.*", handler).await?;
                            Ok(())
                        })
                    })),
                ),
        )
        .await
        .unwrap();

    assert!(kernel.boot().await.unwrap().is_ready());

    // Steady state: fs emits domain events; auth reacts, unrelated keys
    // pass it by.
    let bus = kernel.bus().clone();
    bus.emit(
        "fs.write",
        serde_json::json!({"path": "/etc/motd"}),
        EventMeta::new("fs"),
    )
    .await
    .unwrap();
    bus.emit("fs.read", serde_json::Value::Null, EventMeta::new("fs"))
        .await
        .unwrap();
    bus.emit(
        "user.login",
        serde_json::Value::Null,
        EventMeta::new("auth"),
    )
    .await
    .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["fs.write@fs", "fs.read@fs"]);
}

/// A subscriber installed during boot observes `kernel.ready`.
#[tokio::test]
async fn test_boot_subscriber_sees_kernel_ready() {
    let seen = Arc::new(StdMutex::new(Vec::new()));
    let mut kernel = Kernel::new();

    let seen_clone = Arc::clone(&seen);
    kernel
        .register(ServiceDescriptor::new("supervisor").with_hook(
            "init",
            hook_fn(Box::new(move |ctx| {
                let seen = Arc::clone(&seen_clone);
                Box::pin(async move {
                    let handler = sync_event_handler(move |event| {
                        seen.lock().unwrap().push(event.key.to_string());
                        Ok(())
                    });
                    ctx.subscribe("kernel.ready", handler).await?;
                    Ok(())
                })
            })),
        ))
        .await
        .unwrap();

    assert!(kernel.boot().await.unwrap().is_ready());
    assert_eq!(*seen.lock().unwrap(), vec!["kernel.ready"]);
}

/// Steady-state handler failures stay isolated: sibling subscribers run
/// and the emitter sees each outcome independently.
#[tokio::test]
async fn test_steady_state_failure_isolation() {
    let mut kernel = Kernel::new();
    kernel
        .register(ServiceDescriptor::new("fs"))
        .await
        .unwrap();
    assert!(kernel.boot().await.unwrap().is_ready());

    let bus = kernel.bus();
    bus.subscribe(
        "fs.write",
        sync_event_handler(|_| Err("quota check exploded".into())),
    )
    .await
    .unwrap();
    let counter = Arc::new(std::sync::atomic::AtomicU32::new(0));
    let counter_clone = Arc::clone(&counter);
    bus.subscribe(
        "fs.write",
        sync_event_handler(move |_| {
            counter_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }),
    )
    .await
    .unwrap();

    let outcomes = bus
        .emit("fs.write", serde_json::Value::Null, EventMeta::new("fs"))
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].failed());
    assert!(outcomes[1].succeeded());
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
}
