use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex; // Use tokio's Mutex

use crate::lifecycle::Hook;
use crate::service::error::ServiceRegistryError;
use crate::service::{ServiceDescriptor, ServiceId, ServiceState};

/// One registered service: its descriptor plus its construction state.
#[derive(Debug, Clone)]
pub struct ServiceEntry {
    descriptor: ServiceDescriptor,
    state: ServiceState,
}

impl ServiceEntry {
    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }
}

/// Registry owning every registered service for its lifetime.
///
/// Ids are unique; registration preserves order so lifecycle processing and
/// topological tie-breaking stay deterministic. Registration is cheap and
/// side-effect free: dependency existence is only validated at boot.
pub struct ServiceRegistry {
    services: HashMap<ServiceId, ServiceEntry>,
    /// Ids in registration order.
    order: Vec<ServiceId>,
    frozen: bool,
}

// Manual Debug implementation
impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.order)
            .field("frozen", &self.frozen)
            .finish()
    }
}

impl ServiceRegistry {
    /// Create a new empty service registry
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
            order: Vec::new(),
            frozen: false,
        }
    }

    /// Register a service descriptor in state `unconstructed`.
    ///
    /// Rejects duplicate ids, syntactically invalid ids or hook names, and
    /// any registration after the registry was frozen. On rejection the
    /// registry is unchanged.
    pub fn register(
        &mut self,
        descriptor: ServiceDescriptor,
    ) -> Result<(), ServiceRegistryError> {
        if self.frozen {
            return Err(ServiceRegistryError::RegistryFrozen {
                operation: "register".to_string(),
            });
        }

        let id = descriptor.id().to_string();
        if let Err(reason) = validate_identifier(&id) {
            return Err(ServiceRegistryError::InvalidServiceId { id, reason });
        }
        for hook in descriptor.hook_names() {
            if let Err(reason) = validate_identifier(hook) {
                return Err(ServiceRegistryError::InvalidHookName {
                    service: id.clone(),
                    hook: hook.to_string(),
                    reason,
                });
            }
        }
        if self.services.contains_key(&id) {
            return Err(ServiceRegistryError::DuplicateService(id));
        }

        self.order.push(id.clone());
        self.services.insert(
            id,
            ServiceEntry {
                descriptor,
                state: ServiceState::Unconstructed,
            },
        );
        Ok(())
    }

    /// Check if a service with the given id exists
    pub fn contains(&self, id: &str) -> bool {
        self.services.contains_key(id)
    }

    /// Borrow a registered service. Callers never receive ownership.
    pub fn get(&self, id: &str) -> Result<&ServiceEntry, ServiceRegistryError> {
        self.services
            .get(id)
            .ok_or_else(|| ServiceRegistryError::UnknownService(id.to_string()))
    }

    /// Declared dependency ids, as supplied at registration.
    pub fn dependencies_of(&self, id: &str) -> Result<Vec<ServiceId>, ServiceRegistryError> {
        Ok(self.get(id)?.descriptor.dependencies().to_vec())
    }

    /// All service ids in registration order.
    pub fn all_ids(&self) -> Vec<ServiceId> {
        self.order.clone()
    }

    pub fn state_of(&self, id: &str) -> Result<ServiceState, ServiceRegistryError> {
        Ok(self.get(id)?.state)
    }

    pub fn set_state(
        &mut self,
        id: &str,
        state: ServiceState,
    ) -> Result<(), ServiceRegistryError> {
        let entry = self
            .services
            .get_mut(id)
            .ok_or_else(|| ServiceRegistryError::UnknownService(id.to_string()))?;
        entry.state = state;
        Ok(())
    }

    /// This service's hook for a phase, if it opted in.
    pub fn hook(
        &self,
        id: &str,
        phase: &str,
    ) -> Result<Option<Arc<dyn Hook>>, ServiceRegistryError> {
        Ok(self.get(id)?.descriptor.hook(phase))
    }

    /// Current state of every service, in registration order.
    pub fn states(&self) -> Vec<(ServiceId, ServiceState)> {
        self.order
            .iter()
            .filter_map(|id| self.services.get(id).map(|e| (id.clone(), e.state)))
            .collect()
    }

    /// Reject all further registration. Called by the kernel once boot
    /// reaches a terminal state.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Get the number of registered services
    pub fn count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a service id or hook name: non-empty dot segments, no control
/// characters, no wildcard token.
fn validate_identifier(raw: &str) -> Result<(), String> {
    if raw.is_empty() {
        return Err("must not be empty".to_string());
    }
    if raw.chars().any(|c| c.is_control()) {
        return Err("must not contain control characters".to_string());
    }
    for segment in raw.split('.') {
        if segment.is_empty() {
            return Err("must not contain empty segments".to_string());
        }
        if segment == crate::event::WILDCARD {
            return Err("must not contain the wildcard token".to_string());
        }
    }
    Ok(())
}

/// Thread-safe service registry using Tokio's Mutex
#[derive(Clone, Debug)] // Shared can be Clone and Debug as it holds an Arc
pub struct SharedServiceRegistry {
    registry: Arc<Mutex<ServiceRegistry>>,
}

impl SharedServiceRegistry {
    /// Create a new shared service registry
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(ServiceRegistry::new())),
        }
    }

    /// Get a cloned reference to the registry Arc<Mutex>
    pub fn registry(&self) -> Arc<Mutex<ServiceRegistry>> {
        self.registry.clone()
    }

    pub async fn register(
        &self,
        descriptor: ServiceDescriptor,
    ) -> Result<(), ServiceRegistryError> {
        let mut registry = self.registry.lock().await;
        registry.register(descriptor)
    }

    pub async fn contains(&self, id: &str) -> bool {
        let registry = self.registry.lock().await;
        registry.contains(id)
    }

    pub async fn dependencies_of(
        &self,
        id: &str,
    ) -> Result<Vec<ServiceId>, ServiceRegistryError> {
        let registry = self.registry.lock().await;
        registry.dependencies_of(id)
    }

    pub async fn all_ids(&self) -> Vec<ServiceId> {
        let registry = self.registry.lock().await;
        registry.all_ids()
    }

    pub async fn state_of(&self, id: &str) -> Result<ServiceState, ServiceRegistryError> {
        let registry = self.registry.lock().await;
        registry.state_of(id)
    }

    pub async fn set_state(
        &self,
        id: &str,
        state: ServiceState,
    ) -> Result<(), ServiceRegistryError> {
        let mut registry = self.registry.lock().await;
        registry.set_state(id, state)
    }

    pub async fn hook(
        &self,
        id: &str,
        phase: &str,
    ) -> Result<Option<Arc<dyn Hook>>, ServiceRegistryError> {
        let registry = self.registry.lock().await;
        registry.hook(id, phase)
    }

    pub async fn states(&self) -> Vec<(ServiceId, ServiceState)> {
        let registry = self.registry.lock().await;
        registry.states()
    }

    pub async fn freeze(&self) {
        let mut registry = self.registry.lock().await;
        registry.freeze();
    }

    pub async fn is_frozen(&self) -> bool {
        let registry = self.registry.lock().await;
        registry.is_frozen()
    }

    pub async fn count(&self) -> usize {
        let registry = self.registry.lock().await;
        registry.count()
    }
}

impl Default for SharedServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
