// ============================================================
// Layer 5 - Context RNN
// ============================================================
// The second level of the hierarchy. Each call folds one
// utterance encoding into a dialogue-level state:
//
//   encoder output (any shape, encoder_hidden values)
//        └─► view (1,1,encoder_hidden) ─► stacked GRU ─► (1,1,hidden)
//
// No embedding: inputs are continuous vectors.

use burn::prelude::*;

use crate::ml::error::{ModelError, ModelResult};
use crate::ml::recurrent::{StackedGru, StackedGruConfig};

#[derive(Config, Debug)]
pub struct ContextConfig {
    pub encoder_hidden_size: usize,
    pub hidden_size:         usize,
    pub n_layers:            usize,
    pub dropout:             f64,
}

impl ContextConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ContextRnn<B> {
        let gru = StackedGruConfig::new(self.encoder_hidden_size, self.hidden_size, self.n_layers)
            .with_dropout(self.dropout)
            .init(device);
        ContextRnn { gru }
    }
}

#[derive(Module, Debug)]
pub struct ContextRnn<B: Backend> {
    pub gru: StackedGru<B>,
}

impl<B: Backend> ContextRnn<B> {
    pub fn encoder_hidden_size(&self) -> usize {
        self.gru.d_input
    }

    pub fn hidden_size(&self) -> usize {
        self.gru.d_hidden
    }

    pub fn init_hidden(&self) -> Tensor<B, 3> {
        self.gru.init_hidden()
    }

    pub fn forward<const D: usize>(
        &self,
        encoder_output: Tensor<B, D>,
        hidden:         Tensor<B, 3>,
    ) -> ModelResult<(Tensor<B, 3>, Tensor<B, 3>)> {
        let input = view_single_step(encoder_output, self.encoder_hidden_size())?;
        self.gru.step(input, hidden)
    }
}

/// Reshape a tensor holding exactly `width` values into (1, 1, width).
pub(crate) fn view_single_step<B: Backend, const D: usize>(
    tensor: Tensor<B, D>,
    width:  usize,
) -> ModelResult<Tensor<B, 3>> {
    let n = tensor.shape().num_elements();
    if n != width {
        return Err(ModelError::InputWidth { expected: width, actual: n });
    }
    Ok(tensor.reshape([1, 1, width]))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::recurrent::to_vec;
    use burn::backend::NdArray;

    type B = NdArray;

    fn context() -> ContextRnn<B> {
        ContextConfig::new(8, 6, 2, 0.0).init(&Default::default())
    }

    #[test]
    fn test_init_hidden_shape_and_zeros() {
        let ctx    = context();
        let hidden = ctx.init_hidden();
        assert_eq!(hidden.dims(), [2, 1, 6]);
        assert!(to_vec(hidden).unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_accepts_flat_and_3d_inputs() {
        let ctx    = context();
        let device = Default::default();

        let flat = Tensor::<B, 1>::ones([8], &device);
        let (out, hidden) = ctx.forward(flat, ctx.init_hidden()).unwrap();
        assert_eq!(out.dims(), [1, 1, 6]);
        assert_eq!(hidden.dims(), [2, 1, 6]);

        let cube = Tensor::<B, 3>::ones([1, 1, 8], &device);
        let (out3, _) = ctx.forward(cube, ctx.init_hidden()).unwrap();
        assert_eq!(to_vec(out).unwrap(), to_vec(out3).unwrap());
    }

    #[test]
    fn test_rejects_wrong_width() {
        let ctx   = context();
        let input = Tensor::<B, 1>::ones([7], &Default::default());
        assert_eq!(
            ctx.forward(input, ctx.init_hidden()).unwrap_err(),
            ModelError::InputWidth { expected: 8, actual: 7 }
        );
    }

    #[test]
    fn test_rejects_wrong_hidden() {
        let ctx    = context();
        let device = Default::default();
        let input  = Tensor::<B, 1>::ones([8], &device);
        let hidden = Tensor::<B, 3>::zeros([2, 1, 5], &device);
        assert!(matches!(
            ctx.forward(input, hidden),
            Err(ModelError::HiddenShape { .. })
        ));
    }
}
