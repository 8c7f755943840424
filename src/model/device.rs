use candle_core::Device;

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::{info, warn};

#[cfg(not(any(feature = "metal", feature = "cuda")))]
use tracing::debug;

use super::error::ModelError;

/// Picks the inference device from the enabled backends, falling back to CPU.
///
/// `force_cpu` skips GPU probing entirely.
pub fn select_device(force_cpu: bool) -> Result<Device, ModelError> {
    if force_cpu {
        return Ok(Device::Cpu);
    }

    #[cfg(any(feature = "metal", feature = "cuda"))]
    let mut failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Running address model on Metal");
                return Ok(device);
            }
            Err(e) => {
                warn!(error = %e, "Metal device unavailable");
                failures.push(format!("metal: {e}"));
            }
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("Running address model on CUDA");
                return Ok(device);
            }
            Err(e) => {
                warn!(error = %e, "CUDA device unavailable");
                failures.push(format!("cuda: {e}"));
            }
        }
    }

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    debug!("No GPU backend compiled, using CPU");

    #[cfg(any(feature = "metal", feature = "cuda"))]
    warn!(reason = %failures.join("; "), "Falling back to CPU device");

    Ok(Device::Cpu)
}
