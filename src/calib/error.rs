use super::ModelKind;

/// Errors reported while fitting a calibration model
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    /// Fewer calibrants than the model has degrees of freedom
    #[error("need at least {required} calibrants for a {kind} model, got {got}")]
    NotEnoughCalibrants {
        /// The requested model shape
        kind: ModelKind,
        /// Minimum calibrants for that shape
        required: usize,
        /// Calibrants actually supplied
        got: usize,
    },

    /// The normal equations are singular (degenerate observed m/z values)
    #[error("calibration fit is singular: observed m/z values are degenerate")]
    SingularFit,
}
