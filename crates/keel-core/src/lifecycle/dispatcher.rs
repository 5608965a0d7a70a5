use crate::kernel::constants::{PHASE_CONSTRUCT, PHASE_INIT, PHASE_READY};
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::HookContext;
use crate::service::registry::SharedServiceRegistry;
use crate::service::{ServiceId, ServiceState};

/// Invokes a named lifecycle hook across services in dependency order.
///
/// Within a phase, hooks run strictly one after another: the dispatcher
/// awaits each hook before starting the next, so later hooks can rely on
/// side effects of earlier ones. The dispatcher does not interpret what a
/// hook does, only that it completes or fails.
#[derive(Clone, Debug)]
pub struct LifecycleDispatcher {
    registry: SharedServiceRegistry,
}

impl LifecycleDispatcher {
    pub fn new(registry: SharedServiceRegistry) -> Self {
        Self { registry }
    }

    /// Run one phase across `order`.
    ///
    /// Services without a hook for the phase are skipped (absence is not an
    /// error) but still advance their state for state-bearing phases. The
    /// first hook failure aborts the phase: remaining services are not
    /// processed, the failing service is marked `failed`, and the failure
    /// is reported with the service id and phase name.
    pub async fn run_phase(
        &self,
        phase: &str,
        order: &[ServiceId],
        ctx: &HookContext,
    ) -> Result<(), LifecycleError> {
        for service_id in order {
            let hook = self
                .registry
                .hook(service_id, phase)
                .await
                .map_err(|source| LifecycleError::ServiceLookup {
                    phase: phase.to_string(),
                    service: service_id.clone(),
                    source,
                })?;

            match hook {
                None => {
                    log::debug!(
                        "Service '{}' has no hook for phase '{}', skipping",
                        service_id,
                        phase
                    );
                }
                Some(hook) => {
                    log::debug!("Running hook '{}' for service '{}'", phase, service_id);
                    let scoped = ctx.scoped(phase, service_id);
                    if let Err(cause) = hook.run(&scoped).await {
                        log::error!(
                            "Hook '{}' failed for service '{}': {}",
                            phase,
                            service_id,
                            cause
                        );
                        // State update failures are secondary to the hook
                        // failure being reported.
                        if let Err(e) = self
                            .registry
                            .set_state(service_id, ServiceState::Failed)
                            .await
                        {
                            log::warn!(
                                "Could not mark service '{}' as failed: {}",
                                service_id,
                                e
                            );
                        }
                        return Err(LifecycleError::HookExecution {
                            phase: phase.to_string(),
                            service: service_id.clone(),
                            source: Box::new(cause),
                        });
                    }
                }
            }

            self.mark_phase_complete(phase, service_id).await?;
        }
        Ok(())
    }

    /// Advance a service's state once it completed (or skipped) a
    /// state-bearing phase. Announcement phases carry no state transition.
    async fn mark_phase_complete(
        &self,
        phase: &str,
        service_id: &str,
    ) -> Result<(), LifecycleError> {
        let state = match phase {
            PHASE_CONSTRUCT => ServiceState::Constructed,
            PHASE_INIT => ServiceState::Initialized,
            PHASE_READY => ServiceState::Ready,
            _ => return Ok(()),
        };
        self.registry
            .set_state(service_id, state)
            .await
            .map_err(|source| LifecycleError::ServiceLookup {
                phase: phase.to_string(),
                service: service_id.to_string(),
                source,
            })
    }
}
