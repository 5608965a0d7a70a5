use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::service::registry::ServiceRegistry;
use crate::service::ServiceId;

/// Error that can occur when resolving the service dependency graph
#[derive(Debug, Error)]
pub enum DependencyError {
    /// A declared dependency id does not resolve to any registered service
    #[error("Service '{service}' depends on unknown service '{dependency}'")]
    MissingDependency {
        service: ServiceId,
        dependency: ServiceId,
    },

    /// Dependency cycle detected
    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    CircularDependency(Vec<String>),
}

/// Validate the dependency graph and compute a deterministic boot order.
///
/// Every declared dependency must resolve and the graph must be acyclic;
/// both checks run before any order is produced, so a failing graph never
/// yields a partial order. The sort is a depth-first topological sort that
/// visits services in registration order, which places every service after
/// all of its dependencies and breaks ties among independent services by
/// registration order.
pub fn resolve_boot_order(
    registry: &ServiceRegistry,
) -> Result<Vec<ServiceId>, DependencyError> {
    let ids = registry.all_ids();

    // Build the adjacency map, rejecting unresolved dependency ids.
    let mut edges: HashMap<ServiceId, Vec<ServiceId>> = HashMap::new();
    for id in &ids {
        let deps = registry
            .dependencies_of(id)
            .map_err(|_| DependencyError::MissingDependency {
                service: id.clone(),
                dependency: id.clone(),
            })?;
        for dep in &deps {
            if !registry.contains(dep) {
                return Err(DependencyError::MissingDependency {
                    service: id.clone(),
                    dependency: dep.clone(),
                });
            }
        }
        edges.insert(id.clone(), deps);
    }

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();
    let mut path = Vec::new();
    let mut order = Vec::with_capacity(ids.len());

    for id in &ids {
        if !visited.contains(id) {
            visit(id, &edges, &mut visited, &mut in_stack, &mut path, &mut order)?;
        }
    }
    Ok(order)
}

/// Visit nodes for topological sort (internal helper). On a back edge the
/// reported cycle path starts and ends with the revisited service id.
fn visit(
    id: &str,
    edges: &HashMap<ServiceId, Vec<ServiceId>>,
    visited: &mut HashSet<ServiceId>,
    in_stack: &mut HashSet<ServiceId>,
    path: &mut Vec<ServiceId>,
    order: &mut Vec<ServiceId>,
) -> Result<(), DependencyError> {
    if in_stack.contains(id) {
        let start = path.iter().position(|p| p == id).unwrap_or(0);
        let mut cycle: Vec<String> = path[start..].to_vec();
        cycle.push(id.to_string());
        return Err(DependencyError::CircularDependency(cycle));
    }
    if visited.contains(id) {
        return Ok(()); // Already placed in the order
    }

    in_stack.insert(id.to_string());
    path.push(id.to_string());

    if let Some(deps) = edges.get(id) {
        for dep in deps {
            visit(dep, edges, visited, in_stack, path, order)?;
        }
    }

    in_stack.remove(id);
    path.pop();
    visited.insert(id.to_string());
    order.push(id.to_string()); // Add after visiting dependencies

    Ok(())
}
