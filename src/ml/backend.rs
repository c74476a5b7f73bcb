// ============================================================
// Layer 5 - Backend Selection
// ============================================================
// The backend is picked once, by the caller, and its device is
// handed to every network at construction. Nothing below this
// point probes for accelerators on its own.

use serde::Serialize;

/// CPU backend; also what the unit tests run on.
pub type CpuBackend = burn::backend::NdArray;

/// GPU backend through WebGPU.
pub type GpuBackend = burn::backend::Wgpu;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// burn-ndarray on the host CPU
    #[default]
    Cpu,
    /// burn-wgpu on the default adapter
    Wgpu,
}

impl BackendKind {
    pub fn cpu_device() -> burn::backend::ndarray::NdArrayDevice {
        burn::backend::ndarray::NdArrayDevice::default()
    }

    pub fn wgpu_device() -> burn::backend::wgpu::WgpuDevice {
        burn::backend::wgpu::WgpuDevice::default()
    }
}

/// Run `$body` generically with `$B` bound to the selected backend
/// type and `$device` to its default device.
#[macro_export]
macro_rules! with_backend {
    ($kind:expr, |$B:ident, $device:ident| $body:expr) => {
        match $kind {
            $crate::ml::backend::BackendKind::Cpu => {
                type $B = $crate::ml::backend::CpuBackend;
                let $device = $crate::ml::backend::BackendKind::cpu_device();
                tracing::info!("Using CPU device: {:?}", $device);
                $body
            }
            $crate::ml::backend::BackendKind::Wgpu => {
                type $B = $crate::ml::backend::GpuBackend;
                let $device = $crate::ml::backend::BackendKind::wgpu_device();
                tracing::info!("Using WGPU device: {:?}", $device);
                $body
            }
        }
    };
}
