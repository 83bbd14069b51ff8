//! Device selection for classifier inference

use crate::error::{Result, ResumeScorerError};
use candle_core::Device;
use log::{info, warn};

pub const DEVICE_ENV_VAR: &str = "RESUME_SCORER_DEVICE";

/// Get the best available device for inference (GPU if available, CPU fallback)
pub fn get_best_device() -> Device {
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            info!("Using CUDA GPU for classifier inference");
            return device;
        }
    }

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Using Metal GPU for classifier inference");
                return device;
            }
            Err(e) => warn!("Metal GPU initialization failed: {}", e),
        }
    }

    info!("Using CPU for classifier inference");
    Device::Cpu
}

/// Get device with optional user override from environment variable
pub fn get_device_with_override() -> Result<Device> {
    match std::env::var(DEVICE_ENV_VAR) {
        Ok(preference) => device_from_name(&preference),
        Err(_) => Ok(get_best_device()),
    }
}

pub fn device_from_name(name: &str) -> Result<Device> {
    match name.to_lowercase().as_str() {
        "cpu" => Ok(Device::Cpu),
        "cuda" => {
            #[cfg(feature = "cuda")]
            {
                Device::new_cuda(0).map_err(|e| {
                    ResumeScorerError::ResourceLoad(format!("Failed to initialize CUDA: {}", e))
                })
            }
            #[cfg(not(feature = "cuda"))]
            {
                Err(ResumeScorerError::ResourceLoad(
                    "CUDA support not compiled in".to_string(),
                ))
            }
        }
        "metal" => {
            #[cfg(feature = "metal")]
            {
                Device::new_metal(0).map_err(|e| {
                    ResumeScorerError::ResourceLoad(format!("Failed to initialize Metal: {}", e))
                })
            }
            #[cfg(not(feature = "metal"))]
            {
                Err(ResumeScorerError::ResourceLoad(
                    "Metal support not compiled in".to_string(),
                ))
            }
        }
        other => {
            warn!("Unknown device '{}', falling back to auto-detection", other);
            Ok(get_best_device())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_by_name() {
        assert!(matches!(device_from_name("CPU").unwrap(), Device::Cpu));
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn test_cuda_without_feature_fails() {
        assert!(device_from_name("cuda").is_err());
    }
}
