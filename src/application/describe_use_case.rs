// ============================================================
// Layer 2 - DescribeUseCase
// ============================================================
// Builds the model for a config and reports how the parameters
// split across the four networks. Nothing runs forward.

use anyhow::Result;
use burn::prelude::*;
use serde::Serialize;

use crate::domain::hparams::HredConfig;
use crate::ml::backend::BackendKind;
use crate::ml::hierarchy::{HierarchicalModel, ParamCounts};

#[derive(Debug, Clone, Serialize)]
pub struct ModelDescription {
    pub config: HredConfig,
    pub params: ParamCounts,
}

pub struct DescribeUseCase {
    config:  HredConfig,
    backend: BackendKind,
}

impl DescribeUseCase {
    pub fn new(config: HredConfig, backend: BackendKind) -> Self {
        Self { config, backend }
    }

    pub fn execute(&self) -> Result<ModelDescription> {
        crate::with_backend!(self.backend, |B, device| self.execute_on::<B>(&device))
    }

    pub fn execute_on<B: Backend>(&self, device: &B::Device) -> Result<ModelDescription> {
        self.config.validate()?;
        let model = HierarchicalModel::<B>::new(&self.config, device);
        Ok(ModelDescription { config: self.config.clone(), params: model.param_counts() })
    }
}
