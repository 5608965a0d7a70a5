pub mod event;
pub mod kernel;
pub mod lifecycle;
pub mod service;

// Re-export key public types/traits for easier use by host binaries and
// services.
pub use kernel::bootstrap::{BootResult, Kernel, KernelState};
pub use kernel::error::Error as KernelError;
pub use event::{EventRecord, HandlerOutcome, SharedEventBus};
pub use lifecycle::{Hook, HookContext};
pub use service::{ServiceDescriptor, ServiceState};

// Cross-subsystem scenario tests
#[cfg(test)]
mod tests;
