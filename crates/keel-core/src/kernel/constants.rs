/// Application name
pub const APP_NAME: &str = "Keel";

/// Application version
pub const APP_VERSION: &str = "0.1.0";

/// First mandatory boot phase: services construct their internal state
pub const PHASE_CONSTRUCT: &str = "construct";

/// Second mandatory boot phase: services initialize against their dependencies
pub const PHASE_INIT: &str = "init";

/// Final boot phase: services confirm readiness
pub const PHASE_READY: &str = "ready";

/// Event key emitted once the kernel reaches its ready state
pub const KERNEL_READY_EVENT: &str = "kernel.ready";

/// Source id the kernel stamps on events it emits itself
pub const KERNEL_SOURCE: &str = "kernel";
