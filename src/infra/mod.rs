// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// File-system concerns kept out of the other layers.
//
//   config_store.rs - HredConfig as a JSON file, implementing
//                     the domain's ConfigSource trait
//
// Weight checkpoints are not written here: training, and with
// it parameter persistence, happens outside this crate.

/// JSON persistence for the model configuration
pub mod config_store;
