use std::fmt;

use crate::event::bus::SharedEventBus;
use crate::event::EventMeta;
use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::lifecycle::dispatcher::LifecycleDispatcher;
use crate::lifecycle::HookContext;
use crate::service::graph::resolve_boot_order;
use crate::service::registry::SharedServiceRegistry;
use crate::service::error::ServiceRegistryError;
use crate::service::{ServiceDescriptor, ServiceId, ServiceState};

/// Process-wide kernel state. Transitions exactly once from `Booting` to a
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelState {
    Uninitialized,
    Booting,
    Ready,
    Failed,
}

impl KernelState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, KernelState::Ready | KernelState::Failed)
    }
}

/// Terminal outcome of the boot sequence.
#[derive(Debug)]
pub enum BootResult {
    /// All services reached `ready`.
    Ready,
    /// Boot was abandoned. `service`/`phase` pinpoint the failing hook when
    /// the failure happened during phase execution; graph validation
    /// failures carry the cause alone.
    Failed {
        service: Option<ServiceId>,
        phase: Option<String>,
        cause: Error,
    },
}

impl BootResult {
    pub fn is_ready(&self) -> bool {
        matches!(self, BootResult::Ready)
    }
}

impl fmt::Display for BootResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootResult::Ready => write!(f, "ready"),
            BootResult::Failed {
                service,
                phase,
                cause,
            } => write!(
                f,
                "failed (service: {}, phase: {}): {}",
                service.as_deref().unwrap_or("<none>"),
                phase.as_deref().unwrap_or("<none>"),
                cause
            ),
        }
    }
}

/// The boot sequencer coordinating registry, dispatcher, and event bus.
///
/// The kernel owns the only process-wide mutable state of the core (the
/// service registry and the bus subscription table) and hands collaborators
/// references through [`HookContext`], never ownership and never ambient
/// global lookups.
pub struct Kernel {
    state: KernelState,
    /// Fixed global phase order: `construct`, `init`, any announcement
    /// phases inserted by the host, then `ready`.
    phases: Vec<String>,
    registry: SharedServiceRegistry,
    bus: SharedEventBus,
    dispatcher: LifecycleDispatcher,
    /// Boot-wide base context; remains valid for steady-state use.
    context: HookContext,
    /// Resolved topological order, retained for diagnostics after boot.
    boot_order: Option<Vec<ServiceId>>,
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("state", &self.state)
            .field("phases", &self.phases)
            .field("boot_order", &self.boot_order)
            .finish_non_exhaustive()
    }
}

impl Kernel {
    /// Create a kernel with the mandatory phase sequence
    /// `construct`, `init`, `ready`.
    pub fn new() -> Self {
        let registry = SharedServiceRegistry::new();
        let bus = SharedEventBus::new();
        let dispatcher = LifecycleDispatcher::new(registry.clone());
        let context = HookContext::new(registry.clone(), bus.clone());
        Self {
            state: KernelState::Uninitialized,
            phases: vec![
                constants::PHASE_CONSTRUCT.to_string(),
                constants::PHASE_INIT.to_string(),
                constants::PHASE_READY.to_string(),
            ],
            registry,
            bus,
            dispatcher,
            context,
            boot_order: None,
        }
    }

    /// Insert a named announcement phase (e.g. `install.routes`) between
    /// `init` and `ready`. Announcement phases run like any other phase;
    /// after one completes the kernel emits an event whose key is the phase
    /// name. Only legal before `boot()`.
    pub fn add_announcement_phase(&mut self, phase: &str) -> Result<()> {
        if self.state != KernelState::Uninitialized {
            return Err(Error::Configuration(format!(
                "cannot add phase '{}' once boot has started",
                phase
            )));
        }
        // Announcement phases double as event keys, so they must parse as one.
        crate::event::EventKey::parse(phase)?;
        if self.phases.iter().any(|p| p == phase) {
            return Err(Error::Configuration(format!(
                "phase '{}' is already part of the boot sequence",
                phase
            )));
        }
        // Keep `ready` last.
        let insert_at = self.phases.len() - 1;
        self.phases.insert(insert_at, phase.to_string());
        Ok(())
    }

    /// The full phase sequence the kernel will execute.
    pub fn phases(&self) -> &[String] {
        &self.phases
    }

    pub fn state(&self) -> KernelState {
        self.state
    }

    pub fn bus(&self) -> &SharedEventBus {
        &self.bus
    }

    pub fn registry(&self) -> &SharedServiceRegistry {
        &self.registry
    }

    /// The boot-wide context. Valid before, during, and after boot for
    /// steady-state emit/subscribe.
    pub fn context(&self) -> &HookContext {
        &self.context
    }

    /// The topological order the last boot ran with, for diagnostics.
    pub fn boot_order(&self) -> Option<&[ServiceId]> {
        self.boot_order.as_deref()
    }

    /// Per-service construction states, in registration order.
    pub async fn service_states(&self) -> Vec<(ServiceId, ServiceState)> {
        self.registry.states().await
    }

    /// Register a service descriptor with the kernel.
    ///
    /// Hook names are checked against the configured phase sequence so
    /// misspelled phases are rejected at registration rather than silently
    /// never invoked.
    pub async fn register(&self, descriptor: ServiceDescriptor) -> Result<()> {
        for hook in descriptor.hook_names() {
            if !self.phases.iter().any(|p| p == hook) {
                return Err(Error::Registry(ServiceRegistryError::UnknownHook {
                    service: descriptor.id().to_string(),
                    hook: hook.to_string(),
                }));
            }
        }
        self.registry.register(descriptor).await?;
        Ok(())
    }

    /// Register several descriptors in order.
    pub async fn register_all(
        &self,
        descriptors: impl IntoIterator<Item = ServiceDescriptor>,
    ) -> Result<()> {
        for descriptor in descriptors {
            self.register(descriptor).await?;
        }
        Ok(())
    }

    /// Resolve the boot order without running any hook.
    pub async fn plan(&self) -> Result<Vec<ServiceId>> {
        let registry = self.registry.registry();
        let registry = registry.lock().await;
        Ok(resolve_boot_order(&registry)?)
    }

    /// Run the full boot sequence to a terminal state.
    ///
    /// Validates the dependency graph atomically (no hook runs if
    /// validation fails), then executes each configured phase over the
    /// topological order. On success the registry is frozen, `kernel.ready`
    /// is emitted, and the kernel is `Ready`. On any failure boot is
    /// abandoned without rollback and the cause is surfaced in the
    /// returned [`BootResult`].
    ///
    /// Not re-entrant: a second call after a terminal state fails with
    /// [`Error::AlreadyBooted`] and leaves the kernel state unchanged.
    pub async fn boot(&mut self) -> Result<BootResult> {
        if self.state != KernelState::Uninitialized {
            return Err(Error::AlreadyBooted { state: self.state });
        }
        self.state = KernelState::Booting;
        log::info!(
            "Booting {} v{} ({} services, {} phases)",
            constants::APP_NAME,
            constants::APP_VERSION,
            self.registry.count().await,
            self.phases.len()
        );

        // Steps 1-2: validate the graph and compute the order before any
        // hook is invoked.
        let order = {
            let registry = self.registry.registry();
            let registry = registry.lock().await;
            resolve_boot_order(&registry)
        };
        let order = match order {
            Ok(order) => order,
            Err(cause) => {
                log::error!("Dependency graph validation failed: {}", cause);
                return Ok(self.fail(None, None, Error::Dependency(cause)).await);
            }
        };
        log::info!("Boot order: {}", order.join(", "));
        self.boot_order = Some(order.clone());

        // Step 3: run the fixed phase sequence over the topological order.
        let phases = self.phases.clone();
        for phase in &phases {
            log::info!("Running phase '{}'", phase);
            if let Err(err) = self.dispatcher.run_phase(phase, &order, &self.context).await {
                let service = Some(err.service().to_string());
                return Ok(self
                    .fail(service, Some(phase.clone()), Error::Lifecycle(err))
                    .await);
            }
            if self.is_announcement_phase(phase) {
                self.emit_kernel_event(phase).await;
            }
        }

        // Step 4: terminal success.
        self.registry.freeze().await;
        self.state = KernelState::Ready;
        log::info!("{} is ready", constants::APP_NAME);
        self.emit_kernel_event(constants::KERNEL_READY_EVENT).await;
        Ok(BootResult::Ready)
    }

    fn is_announcement_phase(&self, phase: &str) -> bool {
        phase != constants::PHASE_CONSTRUCT
            && phase != constants::PHASE_INIT
            && phase != constants::PHASE_READY
    }

    /// Transition to the terminal failed state. Already-advanced services
    /// are not rolled back (teardown is a host concern).
    async fn fail(
        &mut self,
        service: Option<ServiceId>,
        phase: Option<String>,
        cause: Error,
    ) -> BootResult {
        self.state = KernelState::Failed;
        self.registry.freeze().await;
        BootResult::Failed {
            service,
            phase,
            cause,
        }
    }

    /// Emit a kernel-sourced event, logging handler failures rather than
    /// letting them affect the boot outcome.
    async fn emit_kernel_event(&self, key: &str) {
        match self
            .bus
            .emit(
                key,
                serde_json::Value::Null,
                EventMeta::new(constants::KERNEL_SOURCE),
            )
            .await
        {
            Ok(outcomes) => {
                for outcome in outcomes.iter().filter(|o| o.failed()) {
                    log::warn!(
                        "Subscriber {} failed while handling '{}'",
                        outcome.subscription,
                        key
                    );
                }
            }
            Err(e) => log::warn!("Could not emit '{}': {}", key, e),
        }
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}
