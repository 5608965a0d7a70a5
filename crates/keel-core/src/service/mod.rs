pub mod error;
pub mod graph;
pub mod registry;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::lifecycle::Hook;

/// Type for service identifiers.
pub type ServiceId = String;

/// Construction state of a registered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Registered, no lifecycle hook has run yet
    Unconstructed,
    /// The `construct` phase completed for this service
    Constructed,
    /// The `init` phase completed for this service
    Initialized,
    /// The `ready` phase completed for this service
    Ready,
    /// A hook failed for this service; boot was abandoned
    Failed,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceState::Unconstructed => write!(f, "unconstructed"),
            ServiceState::Constructed => write!(f, "constructed"),
            ServiceState::Initialized => write!(f, "initialized"),
            ServiceState::Ready => write!(f, "ready"),
            ServiceState::Failed => write!(f, "failed"),
        }
    }
}

/// Describes a service to be registered with the kernel: a unique id, the
/// ids of services that must complete each phase before it, and an opt-in
/// table mapping phase name to hook callback.
#[derive(Clone)]
pub struct ServiceDescriptor {
    id: ServiceId,
    dependencies: Vec<ServiceId>,
    hooks: HashMap<String, Arc<dyn Hook>>,
}

// Manual Debug implementation: hook callbacks are opaque.
impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hook_names: Vec<&String> = self.hooks.keys().collect();
        hook_names.sort();
        f.debug_struct("ServiceDescriptor")
            .field("id", &self.id)
            .field("dependencies", &self.dependencies)
            .field("hooks", &hook_names)
            .finish()
    }
}

impl ServiceDescriptor {
    /// Start describing a new service with the given id.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            dependencies: Vec::new(),
            hooks: HashMap::new(),
        }
    }

    /// Declare a dependency on another service (by id). Duplicates are
    /// collapsed; existence is validated at boot, not here.
    pub fn with_dependency(mut self, id: &str) -> Self {
        if !self.dependencies.iter().any(|d| d == id) {
            self.dependencies.push(id.to_string());
        }
        self
    }

    /// Declare multiple dependencies at once.
    pub fn with_dependencies(mut self, ids: &[&str]) -> Self {
        for id in ids {
            self = self.with_dependency(id);
        }
        self
    }

    /// Attach a hook for the named phase. Later calls for the same phase
    /// replace the earlier hook.
    pub fn with_hook(mut self, phase: &str, hook: Arc<dyn Hook>) -> Self {
        self.hooks.insert(phase.to_string(), hook);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dependencies(&self) -> &[ServiceId] {
        &self.dependencies
    }

    /// Look up this service's hook for a phase, if it opted in.
    pub fn hook(&self, phase: &str) -> Option<Arc<dyn Hook>> {
        self.hooks.get(phase).cloned()
    }

    /// Names of all phases this service hooks into.
    pub fn hook_names(&self) -> Vec<&str> {
        self.hooks.keys().map(|s| s.as_str()).collect()
    }
}

/// Re-export important types
pub use error::ServiceRegistryError;
pub use graph::{resolve_boot_order, DependencyError};
pub use registry::{ServiceRegistry, SharedServiceRegistry};
