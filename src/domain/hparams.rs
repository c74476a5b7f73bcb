// ============================================================
// Layer 3 - HredConfig Domain Type
// ============================================================
// The single configuration structure for the whole hierarchy.
// Every size the four networks need lives here, so the CLI,
// the config store, and the ML layer all agree on one shape.
//
// Which network reads which field:
//   Encoder        vocab_size, encoder_hidden
//   Context        encoder_hidden -> context_hidden
//   Decoder        context_hidden, decoder_hidden, output_vocab_size
//   AttnDecoder    encoder_hidden, output_vocab_size, max_length
//   (all of them)  n_layers, dropout, init_range
//
// No framework types here: the ML layer converts this into
// its own per-network burn configs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a configuration cannot build a model.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("'{0}' must be greater than zero")]
    Zero(&'static str),

    #[error("dropout must be in [0, 1), got {0}")]
    Dropout(f64),

    #[error("init_range must be positive and finite, got {0}")]
    InitRange(f64),
}

/// Hyperparameters for the encoder / context / decoder hierarchy.
///
/// Missing fields in a JSON file fall back to [`HredConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HredConfig {
    /// Input vocabulary size (encoder embedding rows)
    pub vocab_size:        usize,
    /// Output vocabulary size (decoder embedding rows and projection width)
    pub output_vocab_size: usize,
    pub encoder_hidden:    usize,
    pub context_hidden:    usize,
    pub decoder_hidden:    usize,
    /// Recurrent depth shared by every network
    pub n_layers:          usize,
    /// Dropout between stacked GRU layers
    pub dropout:           f64,
    /// Number of encoder outputs the attention decoder can attend over
    pub max_length:        usize,
    /// Embeddings and output projection weights start uniform in ±init_range
    pub init_range:        f64,
}

impl Default for HredConfig {
    fn default() -> Self {
        Self {
            vocab_size:        10_000,
            output_vocab_size: 10_000,
            encoder_hidden:    256,
            context_hidden:    256,
            decoder_hidden:    256,
            n_layers:          1,
            dropout:           0.1,
            max_length:        20,
            init_range:        0.1,
        }
    }
}

impl HredConfig {
    /// Check every field is usable before any tensor is allocated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("vocab_size",        self.vocab_size),
            ("output_vocab_size", self.output_vocab_size),
            ("encoder_hidden",    self.encoder_hidden),
            ("context_hidden",    self.context_hidden),
            ("decoder_hidden",    self.decoder_hidden),
            ("n_layers",          self.n_layers),
            ("max_length",        self.max_length),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Zero(name));
        }

        if !(self.dropout.is_finite() && (0.0..1.0).contains(&self.dropout)) {
            return Err(ConfigError::Dropout(self.dropout));
        }

        if !(self.init_range.is_finite() && self.init_range > 0.0) {
            return Err(ConfigError::InitRange(self.init_range));
        }

        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(HredConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_zero_sizes() {
        let cfg = HredConfig { context_hidden: 0, ..HredConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::Zero("context_hidden")));

        let cfg = HredConfig { n_layers: 0, ..HredConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::Zero("n_layers")));
    }

    #[test]
    fn test_rejects_bad_dropout() {
        let cfg = HredConfig { dropout: 1.0, ..HredConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::Dropout(1.0)));

        let cfg = HredConfig { dropout: -0.2, ..HredConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_init_range() {
        let cfg = HredConfig { init_range: 0.0, ..HredConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::InitRange(0.0)));
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let cfg = HredConfig { init_range: f64::INFINITY, ..HredConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::InitRange(f64::INFINITY)));

        let cfg = HredConfig { init_range: f64::NAN, ..HredConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::InitRange(_))));

        let cfg = HredConfig { dropout: f64::NAN, ..HredConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::Dropout(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: HredConfig = serde_json::from_str(r#"{ "vocab_size": 42 }"#).unwrap();
        assert_eq!(cfg.vocab_size, 42);
        assert_eq!(cfg.max_length, HredConfig::default().max_length);
    }
}
