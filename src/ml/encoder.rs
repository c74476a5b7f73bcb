// ============================================================
// Layer 5 - Encoder RNN
// ============================================================
// Turns one token of an utterance into a hidden vector:
//
//   token ─► embedding (1,1,hidden) ─► stacked GRU ─► output (1,1,hidden)
//                                          ▲
//                               hidden (n_layers,1,hidden)
//
// The caller runs this once per token and threads the hidden
// state from call to call.

use burn::{
    nn::{Embedding, EmbeddingConfig, Initializer},
    prelude::*,
};

use crate::ml::error::ModelResult;
use crate::ml::recurrent::{embed_token, StackedGru, StackedGruConfig};

#[derive(Config, Debug)]
pub struct EncoderConfig {
    pub vocab_size:  usize,
    pub hidden_size: usize,
    pub n_layers:    usize,
    pub dropout:     f64,
    #[config(default = 0.1)]
    pub init_range:  f64,
}

impl EncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> EncoderRnn<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.hidden_size)
            .with_initializer(Initializer::Uniform {
                min: -self.init_range,
                max: self.init_range,
            })
            .init(device);
        let gru = StackedGruConfig::new(self.hidden_size, self.hidden_size, self.n_layers)
            .with_dropout(self.dropout)
            .init(device);
        EncoderRnn { embedding, gru, vocab_size: self.vocab_size }
    }
}

#[derive(Module, Debug)]
pub struct EncoderRnn<B: Backend> {
    pub embedding:  Embedding<B>,
    pub gru:        StackedGru<B>,
    pub vocab_size: usize,
}

impl<B: Backend> EncoderRnn<B> {
    pub fn hidden_size(&self) -> usize {
        self.gru.d_hidden
    }

    /// Zeroed (n_layers, 1, hidden_size) state for the start of an utterance.
    pub fn init_hidden(&self) -> Tensor<B, 3> {
        self.gru.init_hidden()
    }

    /// token, hidden (n_layers,1,h) → output (1,1,h), new hidden (n_layers,1,h)
    pub fn forward(
        &self,
        token:  usize,
        hidden: Tensor<B, 3>,
    ) -> ModelResult<(Tensor<B, 3>, Tensor<B, 3>)> {
        let embedded = embed_token(&self.embedding, self.vocab_size, token)?;
        self.gru.step(embedded, hidden)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::error::ModelError;
    use crate::ml::recurrent::to_vec;
    use burn::backend::NdArray;

    type B = NdArray;

    fn encoder(n_layers: usize) -> EncoderRnn<B> {
        EncoderConfig::new(12, 8, n_layers, 0.0).init(&Default::default())
    }

    #[test]
    fn test_init_hidden_shape_and_zeros() {
        let enc    = encoder(2);
        let hidden = enc.init_hidden();
        assert_eq!(hidden.dims(), [2, 1, 8]);
        assert!(to_vec(hidden).unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_forward_shapes() {
        let enc = encoder(2);
        let (out, hidden) = enc.forward(3, enc.init_hidden()).unwrap();
        assert_eq!(out.dims(), [1, 1, 8]);
        assert_eq!(hidden.dims(), [2, 1, 8]);
    }

    #[test]
    fn test_forward_is_deterministic() {
        let enc = encoder(1);
        let (a_out, a_hidden) = enc.forward(5, enc.init_hidden()).unwrap();
        let (b_out, b_hidden) = enc.forward(5, enc.init_hidden()).unwrap();
        assert_eq!(to_vec(a_out).unwrap(), to_vec(b_out).unwrap());
        assert_eq!(to_vec(a_hidden).unwrap(), to_vec(b_hidden).unwrap());
    }

    #[test]
    fn test_embedding_within_init_range() {
        let enc     = encoder(1);
        let weights = to_vec(enc.embedding.weight.val()).unwrap();
        assert!(weights.iter().all(|w| w.abs() <= 0.1));
    }

    #[test]
    fn test_token_out_of_range() {
        let enc = encoder(1);
        assert_eq!(
            enc.forward(12, enc.init_hidden()).unwrap_err(),
            ModelError::TokenOutOfRange { token: 12, vocab_size: 12 }
        );
    }

    #[test]
    fn test_wrong_hidden_depth() {
        let enc    = encoder(1);
        let hidden = Tensor::<B, 3>::zeros([3, 1, 8], &Default::default());
        assert!(matches!(
            enc.forward(0, hidden),
            Err(ModelError::HiddenShape { expected: [1, 1, 8], actual: [3, 1, 8] })
        ));
    }
}
