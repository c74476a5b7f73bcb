// ============================================================
// Layer 5 - Attention Decoder RNN
// ============================================================
// Sequence-to-sequence decoder that attends over a fixed-size
// history of encoder outputs.
//
// One step:
//   1. embed prev token                                 e  (1, h)
//   2. attn([e ‖ hidden[0]]) → softmax                  a  (1, max_length)
//   3. a · history (zero-padded to max_length rows)     c  (1, h)
//   4. attn_combine([e ‖ c])                            combined (1, 1, h)
//   5. GRU step, input = e  (or combined, see below)
//   6. out → log_softmax                                (1, output_size)
//
// Historically the GRU is driven by the raw embedding and the
// combined vector goes nowhere, so attention never reaches the
// recurrent state. That looks like a bug but may be relied on,
// so it stays the default: `feed_attention = false`. Setting it
// to true routes `combined` into the GRU instead. Either way
// `combined` is returned so callers can inspect it.

use burn::{
    nn::{Embedding, EmbeddingConfig, Initializer, Linear, LinearConfig},
    prelude::*,
    tensor::activation::{log_softmax, softmax},
};

use crate::ml::error::{ModelError, ModelResult};
use crate::ml::recurrent::{embed_token, output_projection, StackedGru, StackedGruConfig};

#[derive(Config, Debug)]
pub struct AttnDecoderConfig {
    pub hidden_size:    usize,
    pub output_size:    usize,
    pub n_layers:       usize,
    pub dropout:        f64,
    pub max_length:     usize,
    #[config(default = 0.1)]
    pub init_range:     f64,
    #[config(default = false)]
    pub feed_attention: bool,
}

impl AttnDecoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> AttnDecoderRnn<B> {
        let h       = self.hidden_size;
        let uniform = Initializer::Uniform { min: -self.init_range, max: self.init_range };

        AttnDecoderRnn {
            embedding: EmbeddingConfig::new(self.output_size, h)
                .with_initializer(uniform)
                .init(device),
            attn:         LinearConfig::new(h * 2, self.max_length).init(device),
            attn_combine: LinearConfig::new(h * 2, h).init(device),
            out:          output_projection(h, self.output_size, self.init_range, device),
            gru: StackedGruConfig::new(h, h, self.n_layers)
                .with_dropout(self.dropout)
                .init(device),
            output_size:    self.output_size,
            max_length:     self.max_length,
            feed_attention: self.feed_attention,
        }
    }
}

#[derive(Module, Debug)]
pub struct AttnDecoderRnn<B: Backend> {
    pub embedding:      Embedding<B>,
    pub attn:           Linear<B>,
    pub attn_combine:   Linear<B>,
    pub out:            Linear<B>,
    pub gru:            StackedGru<B>,
    pub output_size:    usize,
    pub max_length:     usize,
    pub feed_attention: bool,
}

/// Everything one attention-decoder step produces.
#[derive(Debug, Clone)]
pub struct AttnDecoderOutput<B: Backend> {
    /// (1, output_size), exponentiates to a distribution
    pub log_probs:    Tensor<B, 2>,
    /// (n_layers, 1, hidden_size)
    pub hidden:       Tensor<B, 3>,
    /// (1, max_length), one weight per history slot
    pub attn_weights: Tensor<B, 2>,
    /// (1, 1, hidden_size), the attn_combine projection
    pub combined:     Tensor<B, 3>,
}

impl<B: Backend> AttnDecoderRnn<B> {
    pub fn hidden_size(&self) -> usize {
        self.gru.d_hidden
    }

    pub fn init_hidden(&self) -> Tensor<B, 3> {
        self.gru.init_hidden()
    }

    /// encoder_outputs: (n, hidden_size) with 1 <= n <= max_length.
    pub fn forward(
        &self,
        prev_token:      usize,
        hidden:          Tensor<B, 3>,
        encoder_outputs: Tensor<B, 2>,
    ) -> ModelResult<AttnDecoderOutput<B>> {
        let h = self.hidden_size();

        let expected = self.gru.hidden_shape();
        let actual   = hidden.dims();
        if actual != expected {
            return Err(ModelError::HiddenShape { expected, actual });
        }
        let history = self.pad_history(encoder_outputs)?;

        let embedded = embed_token(&self.embedding, self.output_size, prev_token)?;
        let e        = embedded.clone().reshape([1, h]);
        let first    = hidden.clone().slice([0..1, 0..1, 0..h]).reshape([1, h]);

        let scores       = self.attn.forward(Tensor::cat(vec![e.clone(), first], 1));
        let attn_weights = softmax(scores, 1);
        let attn_applied = attn_weights.clone().matmul(history);

        let combined = self
            .attn_combine
            .forward(Tensor::cat(vec![e, attn_applied], 1))
            .reshape([1, 1, h]);

        let gru_input = if self.feed_attention { combined.clone() } else { embedded };
        let (output, hidden) = self.gru.step(gru_input, hidden)?;
        let log_probs = log_softmax(self.out.forward(output.reshape([1, h])), 1);

        tracing::debug!(
            feed_attention = self.feed_attention,
            "attention step: log_probs {:?}, weights {:?}",
            log_probs.dims(),
            attn_weights.dims(),
        );

        Ok(AttnDecoderOutput { log_probs, hidden, attn_weights, combined })
    }

    /// Zero-pad the encoder history to exactly max_length rows.
    fn pad_history(&self, encoder_outputs: Tensor<B, 2>) -> ModelResult<Tensor<B, 2>> {
        let h      = self.hidden_size();
        let [n, w] = encoder_outputs.dims();

        if n == 0 || w != h {
            return Err(ModelError::HistoryShape {
                max_length:  self.max_length,
                hidden_size: h,
                actual:      [n, w],
            });
        }
        if n > self.max_length {
            return Err(ModelError::HistoryLength { max_length: self.max_length, actual: n });
        }
        if n == self.max_length {
            return Ok(encoder_outputs);
        }

        let padding = Tensor::zeros([self.max_length - n, h], &encoder_outputs.device());
        Ok(Tensor::cat(vec![encoder_outputs, padding], 0))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::recurrent::to_vec;
    use burn::backend::NdArray;

    type B = NdArray;

    fn attn_decoder(feed_attention: bool) -> AttnDecoderRnn<B> {
        AttnDecoderConfig::new(8, 11, 2, 0.0, 5)
            .with_feed_attention(feed_attention)
            .init(&Default::default())
    }

    fn history(rows: usize, fill: f32) -> Tensor<B, 2> {
        Tensor::<B, 2>::ones([rows, 8], &Default::default()) * fill
    }

    #[test]
    fn test_init_hidden_shape_and_zeros() {
        let dec    = attn_decoder(false);
        let hidden = dec.init_hidden();
        assert_eq!(hidden.dims(), [2, 1, 8]);
        assert!(to_vec(hidden).unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_output_shapes_and_log_prob_mass() {
        let dec = attn_decoder(false);
        let out = dec.forward(3, dec.init_hidden(), history(5, 0.3)).unwrap();

        assert_eq!(out.log_probs.dims(), [1, 11]);
        assert_eq!(out.hidden.dims(), [2, 1, 8]);
        assert_eq!(out.combined.dims(), [1, 1, 8]);

        let total: f32 = to_vec(out.log_probs.exp()).unwrap().iter().sum();
        assert!((total - 1.0).abs() < 1e-4, "probability mass was {total}");
    }

    #[test]
    fn test_attention_weights_form_distribution() {
        let dec = attn_decoder(false);
        let out = dec.forward(1, dec.init_hidden(), history(3, 1.0)).unwrap();

        assert_eq!(out.attn_weights.dims(), [1, 5]);
        let weights = to_vec(out.attn_weights).unwrap();
        assert_eq!(weights.len(), 5);
        assert!(weights.iter().all(|&w| w >= 0.0));
        let total: f32 = weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-4, "attention mass was {total}");
    }

    #[test]
    fn test_history_does_not_reach_hidden_by_default() {
        let dec = attn_decoder(false);
        let a   = dec.forward(2, dec.init_hidden(), history(5, 0.0)).unwrap();
        let b   = dec.forward(2, dec.init_hidden(), history(5, 3.0)).unwrap();
        assert_eq!(to_vec(a.hidden).unwrap(), to_vec(b.hidden).unwrap());
        assert_ne!(to_vec(a.combined).unwrap(), to_vec(b.combined).unwrap());
    }

    #[test]
    fn test_feed_attention_routes_history_into_hidden() {
        let dec = attn_decoder(true);
        let a   = dec.forward(2, dec.init_hidden(), history(5, 0.0)).unwrap();
        let b   = dec.forward(2, dec.init_hidden(), history(5, 3.0)).unwrap();
        assert_ne!(to_vec(a.hidden).unwrap(), to_vec(b.hidden).unwrap());
    }

    #[test]
    fn test_rejects_long_history() {
        let dec = attn_decoder(false);
        assert_eq!(
            dec.forward(0, dec.init_hidden(), history(6, 1.0)).unwrap_err(),
            ModelError::HistoryLength { max_length: 5, actual: 6 }
        );
    }

    #[test]
    fn test_rejects_wrong_history_width() {
        let dec   = attn_decoder(false);
        let wrong = Tensor::<B, 2>::ones([2, 7], &Default::default());
        assert!(matches!(
            dec.forward(0, dec.init_hidden(), wrong),
            Err(ModelError::HistoryShape { actual: [2, 7], .. })
        ));
    }

    #[test]
    fn test_token_and_hidden_errors() {
        let dec = attn_decoder(false);
        assert_eq!(
            dec.forward(11, dec.init_hidden(), history(1, 1.0)).unwrap_err(),
            ModelError::TokenOutOfRange { token: 11, vocab_size: 11 }
        );

        let shallow = Tensor::<B, 3>::zeros([1, 1, 8], &Default::default());
        assert!(matches!(
            dec.forward(0, shallow, history(1, 1.0)),
            Err(ModelError::HiddenShape { .. })
        ));
    }
}
