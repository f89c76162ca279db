//! Workspace placeholder crate.
//!
//! Host applications can depend on `fitbridge-workspace` alone: the bridge
//! façade is re-exported at the root, with the host contracts and runtime
//! wiring available as `bridge_traits` and `core_runtime`.

pub use core_fitness::*;

pub use bridge_traits;
pub use core_runtime;
