//! Error types for the MPM core.

use thiserror::Error;

use crate::math::{Real, Vector};

/// Result type alias for MPM operations.
pub type MpmResult<T> = Result<T, MpmError>;

/// Errors that abort a simulation step.
///
/// Configuration errors indicate a defect in the setup and are never worth
/// retrying. Numerical errors mean the step is unstable; the caller may retry
/// with a smaller time step.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MpmError {
    /// Shape-function type outside `1..=4`.
    #[error("incorrect shape function type {0}")]
    InvalidShapeFunctionType(i32),

    /// Shape-function order other than 1 (tent) or 3 (cubic).
    #[error("unsupported shape function order {0}")]
    InvalidShapeOrder(i32),

    /// Constitutive-model tag with no matching model.
    #[error("unknown constitutive model tag {0}")]
    InvalidConstitutiveModel(i32),

    /// A kernel was evaluated outside its support.
    #[error("offset {z} outside the support of shape function type {node_type}")]
    ShapeFunctionOutOfSupport { node_type: i32, z: Real },

    /// Invalid solver parameters.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Only one face of an axis is periodic.
    #[error("axis {axis} has mismatched periodic boundaries")]
    PeriodicMismatch { axis: usize },

    /// A particle references a rigid body that was never configured.
    #[error("unknown rigid body id {0}")]
    UnknownRigidBody(u32),

    /// Deformation gradient inverted or collapsed.
    #[error("particle {particle}: non-positive jacobian {jacobian}")]
    NonPositiveJacobian { particle: usize, jacobian: Real },

    /// NaN or infinity in a particle field.
    #[error("particle {particle}: non-finite {quantity}")]
    NonFinite {
        particle: usize,
        quantity: &'static str,
    },

    /// A particle left the extent of a non-periodic axis.
    #[error("particle {particle} left the domain at {position:?}")]
    ParticleOutsideDomain { particle: usize, position: Vector },
}

impl MpmError {
    /// Create an invalid params error.
    #[must_use]
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::InvalidParams(details.into())
    }

    /// True for failures caused by an unstable step rather than bad setup.
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            Self::NonPositiveJacobian { .. }
                | Self::NonFinite { .. }
                | Self::ParticleOutsideDomain { .. }
        )
    }

    pub fn is_configuration(&self) -> bool {
        !self.is_numerical()
    }
}
