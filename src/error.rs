//! Error type shared by the model, sampler and encoder.
//!
//! All variants are caller faults raised at the offending call. Schedule
//! infeasibility is not an error; it is reported as
//! [`Violation`](crate::rotation::Violation) data.

use thiserror::Error;

/// Faults raised while building or reading a discrete quadratic model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A variable with this label is already registered.
    #[error("variable exists: {0}")]
    DuplicateVariable(String),

    /// The case labels passed for a new variable are not pairwise distinct.
    #[error("cases for variable {0} are not unique")]
    DuplicateCase(String),

    /// A variable was declared with no cases.
    #[error("variable {0} has no cases")]
    EmptyDomain(String),

    /// Reference to a variable that was never added.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// Reference to a case the variable does not have.
    #[error("unknown case {case} of variable {variable}")]
    UnknownCase {
        /// Variable label.
        variable: String,
        /// Case label or index.
        case: String,
    },

    /// A pairwise bias was requested between two cases of one variable.
    ///
    /// Cases of a variable are mutually exclusive, so such a term is never
    /// active.
    #[error("interaction between cases of the same variable {0}")]
    SelfInteraction(String),

    /// The sampler returned no samples.
    #[error("sampler returned an empty sample set")]
    EmptySampleSet,

    /// The sampler configuration was rejected.
    #[error("invalid sampler configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Renders a label for inclusion in an [`Error`].
pub(crate) fn label<L: std::fmt::Debug + ?Sized>(l: &L) -> String {
    format!("{l:?}")
}
