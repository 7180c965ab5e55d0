//! Simulation error kinds, classified along the four categories in §7:
//! environmental, configuration, numerical, transient.

use thiserror::Error;

/// One variant per named failure path; environmental variants map directly
/// to the exit codes in §6 at the `main()` boundary (see `main.rs`).
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("no compatible GPU adapter was found")]
    NoAdapter,

    #[error("GPU device creation failed: {0}")]
    DeviceCreationFailed(String),

    #[error("GPU resource allocation failed: {0}")]
    ResourceAllocationFailed(String),

    #[error("shader compilation failed: {0}")]
    ShaderCompileFailed(String),

    #[error("GPU device was lost and could not be recovered")]
    DeviceLost,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("requested population {requested} exceeds the configured maximum {max}")]
    PopulationExceedsLimit { requested: u32, max: u32 },
}

impl SimulationError {
    /// Process exit code mapping from §6: 0 clean, 1 no adapter, 2 device
    /// creation failed, 3 resource allocation failed, 4 shader compile
    /// failed, 5 device lost unrecoverably. Configuration errors are
    /// rejected at the boundary rather than exiting the process, so they
    /// are not represented here.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            SimulationError::NoAdapter => Some(1),
            SimulationError::DeviceCreationFailed(_) => Some(2),
            SimulationError::ResourceAllocationFailed(_) => Some(3),
            SimulationError::ShaderCompileFailed(_) => Some(4),
            SimulationError::DeviceLost => Some(5),
            SimulationError::InvalidConfiguration(_)
            | SimulationError::PopulationExceedsLimit { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environmental_errors_map_to_named_exit_codes() {
        assert_eq!(SimulationError::NoAdapter.exit_code(), Some(1));
        assert_eq!(SimulationError::DeviceLost.exit_code(), Some(5));
    }

    #[test]
    fn configuration_errors_have_no_exit_code() {
        assert_eq!(
            SimulationError::PopulationExceedsLimit {
                requested: 20_000,
                max: 15_000
            }
            .exit_code(),
            None
        );
    }
}
