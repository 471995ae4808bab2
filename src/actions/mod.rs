//! Single-shot management actions: power control, LED identification,
//! storage inventory and PXE boot configuration. Thin wrappers over the
//! shared transport and endpoint map; no state machines here.

pub mod led;
pub mod power;
pub mod pxe;
pub mod storage;
