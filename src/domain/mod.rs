// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust structs and traits describing what the system
// works with: a model configuration and dialogues made of
// token indices.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only structs, enums, and traits

/// The single hyperparameter structure for all four networks
pub mod hparams;

/// Dialogues and utterances as token indices
pub mod dialogue;

/// Abstractions other layers implement
pub mod traits;
