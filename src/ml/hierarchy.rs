// ============================================================
// Layer 5 - Hierarchical Model
// ============================================================
// Owns one of each network, all built from a single HredConfig
// on one device chosen by the caller.
//
//   utterance tokens ─► EncoderRnn (token by token) ─► EncodedUtterance
//   EncodedUtterance* ─► ContextRnn (turn by turn)  ─► context state
//   context state    ─► DecoderRnn                  ─► next-token log probs
//   encoder history  ─► AttnDecoderRnn              ─► log probs + weights
//
// The helpers here only thread hidden states. Which token the
// decoders see next (teacher forcing, greedy, sampling) is the
// caller's business.

use burn::prelude::*;

use crate::domain::hparams::HredConfig;
use crate::ml::attn_decoder::{AttnDecoderConfig, AttnDecoderRnn};
use crate::ml::context::{ContextConfig, ContextRnn};
use crate::ml::decoder::{DecoderConfig, DecoderRnn};
use crate::ml::encoder::{EncoderConfig, EncoderRnn};
use crate::ml::error::{ModelError, ModelResult};

/// Per-network burn configs derived from one HredConfig.
pub fn encoder_config(cfg: &HredConfig) -> EncoderConfig {
    EncoderConfig::new(cfg.vocab_size, cfg.encoder_hidden, cfg.n_layers, cfg.dropout)
        .with_init_range(cfg.init_range)
}

pub fn context_config(cfg: &HredConfig) -> ContextConfig {
    ContextConfig::new(cfg.encoder_hidden, cfg.context_hidden, cfg.n_layers, cfg.dropout)
}

pub fn decoder_config(cfg: &HredConfig) -> DecoderConfig {
    DecoderConfig::new(
        cfg.context_hidden,
        cfg.decoder_hidden,
        cfg.output_vocab_size,
        cfg.n_layers,
        cfg.dropout,
    )
    .with_init_range(cfg.init_range)
}

pub fn attn_decoder_config(cfg: &HredConfig) -> AttnDecoderConfig {
    AttnDecoderConfig::new(
        cfg.encoder_hidden,
        cfg.output_vocab_size,
        cfg.n_layers,
        cfg.dropout,
        cfg.max_length,
    )
    .with_init_range(cfg.init_range)
}

/// An utterance after running the encoder over every token.
#[derive(Debug, Clone)]
pub struct EncodedUtterance<B: Backend> {
    /// (n_tokens, encoder_hidden): one encoder output per token,
    /// ready to serve as attention history
    pub outputs: Tensor<B, 2>,
    /// (n_layers, 1, encoder_hidden) after the last token
    pub hidden:  Tensor<B, 3>,
}

impl<B: Backend> EncodedUtterance<B> {
    pub fn len(&self) -> usize {
        self.outputs.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encoder output for the final token, (1, encoder_hidden).
    pub fn last_output(&self) -> Tensor<B, 2> {
        let [n, h] = self.outputs.dims();
        self.outputs.clone().slice([n - 1..n, 0..h])
    }
}

#[derive(Module, Debug)]
pub struct HierarchicalModel<B: Backend> {
    pub encoder:      EncoderRnn<B>,
    pub context:      ContextRnn<B>,
    pub decoder:      DecoderRnn<B>,
    pub attn_decoder: AttnDecoderRnn<B>,
}

/// Parameter counts for each network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ParamCounts {
    pub encoder:      usize,
    pub context:      usize,
    pub decoder:      usize,
    pub attn_decoder: usize,
}

impl ParamCounts {
    pub fn total(&self) -> usize {
        self.encoder + self.context + self.decoder + self.attn_decoder
    }
}

impl<B: Backend> HierarchicalModel<B> {
    /// Build every network on `device`. The config is assumed validated.
    pub fn new(cfg: &HredConfig, device: &B::Device) -> Self {
        let model = Self {
            encoder:      encoder_config(cfg).init(device),
            context:      context_config(cfg).init(device),
            decoder:      decoder_config(cfg).init(device),
            attn_decoder: attn_decoder_config(cfg).init(device),
        };
        tracing::info!(
            "Built hierarchical model: {} parameters, {} layer(s)",
            model.param_counts().total(),
            cfg.n_layers,
        );
        model
    }

    pub fn param_counts(&self) -> ParamCounts {
        ParamCounts {
            encoder:      self.encoder.num_params(),
            context:      self.context.num_params(),
            decoder:      self.decoder.num_params(),
            attn_decoder: self.attn_decoder.num_params(),
        }
    }

    /// Run the encoder over `tokens` starting from a zeroed state.
    pub fn encode_utterance(&self, tokens: &[usize]) -> ModelResult<EncodedUtterance<B>> {
        if tokens.is_empty() {
            return Err(ModelError::EmptyUtterance);
        }

        let h = self.encoder.hidden_size();
        let mut hidden  = self.encoder.init_hidden();
        let mut outputs = Vec::with_capacity(tokens.len());

        for &token in tokens {
            let (output, next) = self.encoder.forward(token, hidden)?;
            outputs.push(output.reshape([1, h]));
            hidden = next;
        }

        tracing::debug!("Encoded utterance of {} tokens", tokens.len());
        Ok(EncodedUtterance { outputs: Tensor::cat(outputs, 0), hidden })
    }

    /// Feed each utterance's final encoder output through the context
    /// network, oldest first. Returns (context output (1,1,h), hidden).
    pub fn fold_context(
        &self,
        utterances: &[EncodedUtterance<B>],
    ) -> ModelResult<(Tensor<B, 3>, Tensor<B, 3>)> {
        let (first, rest) = utterances.split_first().ok_or(ModelError::EmptyDialogue)?;

        let (mut output, mut hidden) =
            self.context.forward(first.last_output(), self.context.init_hidden())?;
        for utterance in rest {
            (output, hidden) = self.context.forward(utterance.last_output(), hidden)?;
        }

        Ok((output, hidden))
    }
}
