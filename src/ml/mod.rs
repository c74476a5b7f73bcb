// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All Burn-specific code lives here. Other layers talk to it
// through plain configs (HredConfig) and token indices.
//
//   recurrent.rs    - multi-layer GRU stack shared by every network
//   encoder.rs      - token → hidden (embedding + GRU)
//   context.rs      - utterance encoding → dialogue state (GRU)
//   decoder.rs      - context + prev token → log probs
//   attn_decoder.rs - prev token + encoder history → log probs + attention
//   hierarchy.rs    - the four networks built from one config
//   backend.rs      - CPU / WGPU backend choice, made once by the caller
//   error.rs        - typed failures for bad tokens and shapes
//
// Every network works on batch size 1 and one time step per call.
//
// Reference: Burn Book §3 (Building Blocks)
//            Serban et al. (2016) Hierarchical Recurrent Encoder-Decoder
//            Bahdanau et al. (2015) Neural Machine Translation by Jointly
//            Learning to Align and Translate

pub mod error;

pub mod recurrent;

/// First-level encoder over utterance tokens
pub mod encoder;

/// Second-level encoder over utterances
pub mod context;

/// Context-conditioned decoder
pub mod decoder;

/// Decoder with attention over encoder outputs
pub mod attn_decoder;

pub mod hierarchy;

pub mod backend;
