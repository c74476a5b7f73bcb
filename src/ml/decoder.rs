// ============================================================
// Layer 5 - Decoder RNN
// ============================================================
// Generates the next token distribution conditioned on the
// dialogue context:
//
//   context (context_size) ─┐
//                           ├─ cat (1,1,context_size+hidden) ─► stacked GRU
//   prev token ─► embedding ┘                                        │
//                                                   out linear ◄─────┘
//                                                        │
//                                          log_softmax (1, output_size)
//
// exp(log_probs) sums to 1 over the output vocabulary.

use burn::{
    nn::{Embedding, EmbeddingConfig, Initializer, Linear},
    prelude::*,
    tensor::activation::log_softmax,
};

use crate::ml::context::view_single_step;
use crate::ml::error::ModelResult;
use crate::ml::recurrent::{embed_token, output_projection, StackedGru, StackedGruConfig};

#[derive(Config, Debug)]
pub struct DecoderConfig {
    pub context_output_size: usize,
    pub hidden_size:         usize,
    pub output_size:         usize,
    pub n_layers:            usize,
    pub dropout:             f64,
    #[config(default = 0.1)]
    pub init_range:          f64,
}

impl DecoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DecoderRnn<B> {
        let uniform = Initializer::Uniform { min: -self.init_range, max: self.init_range };
        let embedding = EmbeddingConfig::new(self.output_size, self.hidden_size)
            .with_initializer(uniform)
            .init(device);
        let out = output_projection(self.hidden_size, self.output_size, self.init_range, device);
        let gru = StackedGruConfig::new(
            self.context_output_size + self.hidden_size,
            self.hidden_size,
            self.n_layers,
        )
        .with_dropout(self.dropout)
        .init(device);

        DecoderRnn {
            embedding,
            out,
            gru,
            context_output_size: self.context_output_size,
            output_size:         self.output_size,
        }
    }
}

#[derive(Module, Debug)]
pub struct DecoderRnn<B: Backend> {
    pub embedding:           Embedding<B>,
    pub out:                 Linear<B>,
    pub gru:                 StackedGru<B>,
    pub context_output_size: usize,
    pub output_size:         usize,
}

impl<B: Backend> DecoderRnn<B> {
    pub fn hidden_size(&self) -> usize {
        self.gru.d_hidden
    }

    pub fn init_hidden(&self) -> Tensor<B, 3> {
        self.gru.init_hidden()
    }

    /// context_output (context_output_size values), prev_token, hidden
    /// → log_probs (1, output_size), new hidden (n_layers, 1, hidden_size)
    pub fn forward<const D: usize>(
        &self,
        context_output: Tensor<B, D>,
        prev_token:     usize,
        hidden:         Tensor<B, 3>,
    ) -> ModelResult<(Tensor<B, 2>, Tensor<B, 3>)> {
        let context  = view_single_step(context_output, self.context_output_size)?;
        let embedded = embed_token(&self.embedding, self.output_size, prev_token)?;
        let input    = Tensor::cat(vec![context, embedded], 2);

        let (output, hidden) = self.gru.step(input, hidden)?;
        let logits = self.out.forward(output.reshape([1, self.hidden_size()]));

        Ok((log_softmax(logits, 1), hidden))
    }
}
