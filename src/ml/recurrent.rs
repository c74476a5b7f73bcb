// ============================================================
// Layer 5 - Stacked GRU
// ============================================================
// burn's `Gru` is a single recurrent layer. Every network in
// the hierarchy needs `n_layers` of them stacked, with the
// hidden state carried as one (n_layers, 1, hidden) tensor:
//
//   input (1,1,d_in) ─► layer 0 ─► dropout ─► layer 1 ─► ... ─► output (1,1,h)
//                         ▲                     ▲
//                  hidden[0] (1,h)       hidden[1] (1,h)
//
// Dropout sits between layers only, never after the last one.
// It is a no-op on non-autodiff backends, so inference is
// deterministic.
//
// Batch and sequence length are both fixed at 1: one token,
// one step, one dialogue at a time.

use burn::{
    module::Param,
    nn::{
        gru::{Gru, GruConfig},
        Dropout, DropoutConfig, Embedding, Linear, LinearConfig,
    },
    prelude::*,
    tensor::Distribution,
};

use crate::ml::error::{ModelError, ModelResult};

#[derive(Config, Debug)]
pub struct StackedGruConfig {
    pub d_input:  usize,
    pub d_hidden: usize,
    pub n_layers: usize,
    #[config(default = 0.0)]
    pub dropout:  f64,
}

impl StackedGruConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> StackedGru<B> {
        let layers = (0..self.n_layers)
            .map(|i| {
                let d_in = if i == 0 { self.d_input } else { self.d_hidden };
                GruConfig::new(d_in, self.d_hidden, true).init(device)
            })
            .collect();
        StackedGru {
            layers,
            dropout:  DropoutConfig::new(self.dropout).init(),
            d_input:  self.d_input,
            d_hidden: self.d_hidden,
        }
    }
}

#[derive(Module, Debug)]
pub struct StackedGru<B: Backend> {
    pub layers:   Vec<Gru<B>>,
    pub dropout:  Dropout,
    pub d_input:  usize,
    pub d_hidden: usize,
}

impl<B: Backend> StackedGru<B> {
    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    /// Shape every hidden state handed to [`StackedGru::step`] must have.
    pub fn hidden_shape(&self) -> [usize; 3] {
        [self.n_layers(), 1, self.d_hidden]
    }

    /// Zeroed hidden state on the device the parameters live on.
    pub fn init_hidden(&self) -> Tensor<B, 3> {
        let device = self.devices().into_iter().next().unwrap_or_default();
        Tensor::zeros(self.hidden_shape(), &device)
    }

    /// Advance every layer by one time step.
    ///
    /// input: (1, 1, d_input), hidden: (n_layers, 1, d_hidden)
    /// → (output (1, 1, d_hidden), new hidden (n_layers, 1, d_hidden))
    pub fn step(
        &self,
        input:  Tensor<B, 3>,
        hidden: Tensor<B, 3>,
    ) -> ModelResult<(Tensor<B, 3>, Tensor<B, 3>)> {
        let expected = self.hidden_shape();
        let actual   = hidden.dims();
        if actual != expected {
            return Err(ModelError::HiddenShape { expected, actual });
        }

        let [_, _, width] = input.dims();
        if width != self.d_input {
            return Err(ModelError::InputWidth { expected: self.d_input, actual: width });
        }

        let n_layers = self.n_layers();
        let h        = self.d_hidden;
        let mut x      = input;
        let mut states = Vec::with_capacity(n_layers);

        for (i, gru) in self.layers.iter().enumerate() {
            let state = hidden.clone().slice([i..i + 1, 0..1, 0..h]).reshape([1, h]);
            // seq_len == 1, so the output row is the new hidden state
            let out = gru.forward(x, Some(state));
            states.push(out.clone());
            x = if i + 1 < n_layers { self.dropout.forward(out) } else { out };
        }

        Ok((x, Tensor::cat(states, 0)))
    }
}

/// Look up one token as a single-step single-batch sequence (1, 1, d_model).
pub fn embed_token<B: Backend>(
    embedding:  &Embedding<B>,
    vocab_size: usize,
    token:      usize,
) -> ModelResult<Tensor<B, 3>> {
    if token >= vocab_size {
        return Err(ModelError::TokenOutOfRange { token, vocab_size });
    }
    let device = embedding.weight.val().device();
    let ids    = Tensor::<B, 1, Int>::from_ints([token as i64], &device).reshape([1, 1]);
    Ok(embedding.forward(ids))
}

/// Output projection whose weight starts uniform in ±init_range.
/// The bias keeps the layer's default initialiser.
pub fn output_projection<B: Backend>(
    d_input:    usize,
    d_output:   usize,
    init_range: f64,
    device:     &B::Device,
) -> Linear<B> {
    let mut linear = LinearConfig::new(d_input, d_output).init(device);
    linear.weight = Param::from_tensor(Tensor::random(
        [d_input, d_output],
        Distribution::Uniform(-init_range, init_range),
        device,
    ));
    linear
}

/// Pull a float tensor back to host memory.
pub fn to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> ModelResult<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| ModelError::TensorData(format!("{e:?}")))
}
