pub mod bootstrap;
pub mod constants;
pub mod error;

/// Re-export important types
pub use bootstrap::{BootResult, Kernel, KernelState};
pub use error::{Error, Result};
