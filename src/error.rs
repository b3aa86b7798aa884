use thiserror::Error;

/// Every failure the engine can report.
///
/// Each variant names the invariant that was violated and carries enough
/// context (codes, indices, sizes) to identify the offending entity.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NucDataError {
    /// Region boundaries are malformed or do not match the interpolation laws.
    #[error("invalid region structure: {0}")]
    InvalidRegionStructure(String),

    /// The x/y grid of a tabulated function is malformed.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// An interpolation code outside 1..=5 was supplied.
    #[error("unsupported interpolation law code {0}")]
    UnsupportedLaw(i64),

    /// A non-positive value was presented to a logarithmic axis.
    #[error("domain error: {axis} value {value} is not positive for {law} interpolation")]
    DomainError {
        law: &'static str,
        axis: &'static str,
        value: f64,
    },

    /// A density integrates to zero or to a non-finite value.
    #[error("degenerate distribution: integral is {integral}")]
    DegenerateDistribution { integral: f64 },

    /// The taxonomy has no classification for this reaction code.
    #[error("unrecognised reaction code {0}")]
    UnrecognisedReactionCode(String),

    /// A summation reaction resolved to no partial reactions.
    #[error("summation reaction {0} resolves to no partial reactions")]
    EmptyPartialSet(String),

    /// A summation refers to a partial reaction the dataset does not hold.
    #[error("summation reaction {summation} refers to missing partial {partial}")]
    MissingPartial { summation: String, partial: String },

    /// Covariance matrix dimensions disagree with the group structures.
    #[error(
        "incompatible covariance block shape: matrix is {matrix_rows}x{matrix_cols}, \
         metadata expects {expected_rows}x{expected_cols}"
    )]
    IncompatibleBlockShape {
        matrix_rows: usize,
        matrix_cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    /// A linearisation or comparison tolerance was not a positive finite number.
    #[error("invalid tolerance {0}")]
    InvalidTolerance(f64),

    /// A textual reaction identifier could not be parsed.
    #[error("malformed reaction identifier '{0}'")]
    MalformedIdentifier(String),

    /// Two reactions with the same identifier were supplied to one dataset.
    #[error("duplicate reaction {0}")]
    DuplicateReaction(String),

    /// A relaxation transition or subshell attribute is invalid.
    #[error("invalid transition data for subshell {subshell}: {reason}")]
    InvalidTransition { subshell: String, reason: String },

    /// Configuration could not be parsed or holds invalid values.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, NucDataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = NucDataError::IncompatibleBlockShape {
            matrix_rows: 3,
            matrix_cols: 4,
            expected_rows: 6,
            expected_cols: 10,
        };
        let message = err.to_string();
        assert!(message.contains("3x4"));
        assert!(message.contains("6x10"));

        let err = NucDataError::DomainError {
            law: "log-log",
            axis: "y",
            value: -1.0,
        };
        assert!(err.to_string().contains("log-log"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NucDataError>();
    }
}
