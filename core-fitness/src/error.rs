use bridge_traits::BridgeError;
use std::fmt;
use thiserror::Error;

/// Measurement a period query was asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Steps,
    Distance,
    Weight,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = match self {
            Metric::Steps => "step",
            Metric::Distance => "distance",
            Metric::Weight => "weight",
        };
        f.write_str(noun)
    }
}

#[derive(Error, Debug)]
pub enum FitnessError {
    /// The host rejected the call; the message is the host's, unchanged.
    #[error("{0}")]
    Native(String),

    /// The host answered successfully but had nothing for the period.
    #[error("There is no {0} data for this period")]
    NoData(Metric),

    #[error("Invalid date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },

    #[error("Broadcast channel error: {0}")]
    Broadcast(String),

    #[error(transparent)]
    Config(#[from] core_runtime::Error),
}

impl FitnessError {
    pub fn is_no_data(&self) -> bool {
        matches!(self, FitnessError::NoData(_))
    }

    pub fn is_native(&self) -> bool {
        matches!(self, FitnessError::Native(_))
    }
}

impl From<BridgeError> for FitnessError {
    fn from(err: BridgeError) -> Self {
        FitnessError::Native(err.host_message())
    }
}

pub type Result<T> = std::result::Result<T, FitnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_messages() {
        assert_eq!(
            FitnessError::NoData(Metric::Steps).to_string(),
            "There is no step data for this period"
        );
        assert_eq!(
            FitnessError::NoData(Metric::Distance).to_string(),
            "There is no distance data for this period"
        );
        assert_eq!(
            FitnessError::NoData(Metric::Weight).to_string(),
            "There is no weight data for this period"
        );
    }

    #[test]
    fn test_host_message_passes_through() {
        let err: FitnessError =
            BridgeError::OperationFailed("Fitness API client not connected".to_string()).into();
        assert!(err.is_native());
        assert!(!err.is_no_data());
        assert_eq!(err.to_string(), "Fitness API client not connected");
    }
}
