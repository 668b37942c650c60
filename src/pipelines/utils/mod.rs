use crate::error::{Result, SentimentError};
use candle_core::Device;

/// Requested compute device, resolved once when a pipeline is built.
#[derive(Clone, Default)]
pub enum DeviceRequest {
    /// Run on CPU (default).
    #[default]
    Cpu,
    /// Run on a specific CUDA GPU.
    Cuda(usize),
}

impl DeviceRequest {
    pub fn resolve(self) -> Result<Device> {
        match self {
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => Device::new_cuda(i).map_err(|e| {
                SentimentError::Device(format!(
                    "Failed to init CUDA device {i}: {e}. Try CPU as fallback."
                ))
            }),
        }
    }
}
