//! Helper functions for materials
//!
//! Math and utility functions that different materials can use.

use crate::math::{Real, SymmetricTensor};

/// Exact zero check inverse (prevents NaN from division by zero)
#[inline(always)]
pub fn inv_exact(e: Real) -> Real {
    if e == 0.0 { 0.0 } else { 1.0 / e }
}

/// Mean compressive stress, `-tr(σ) / 3`.
#[inline]
pub fn pressure(stress: &SymmetricTensor) -> Real {
    -stress.trace() / 3.0
}

/// Frobenius norm of a symmetric stress.
#[inline]
pub fn stress_magnitude(stress: &SymmetricTensor) -> Real {
    stress.double_dot(stress).sqrt()
}

/// Physics parameter conversions shared by every constitutive model.
pub mod physics {
    use crate::math::{DIM, Matrix, Real, SymmetricTensor};

    /// Lamé parameters `(λ, μ)` from Young's modulus and Poisson ratio.
    #[inline]
    pub fn lame_lambda_mu(young_modulus: Real, poisson_ratio: Real) -> (Real, Real) {
        let lambda =
            young_modulus * poisson_ratio / ((1.0 + poisson_ratio) * (1.0 - 2.0 * poisson_ratio));
        let mu = shear_modulus(young_modulus, poisson_ratio);
        (lambda, mu)
    }

    #[inline]
    pub fn shear_modulus(young_modulus: Real, poisson_ratio: Real) -> Real {
        young_modulus / (2.0 * (1.0 + poisson_ratio))
    }

    /// Resistance to compression.
    #[inline]
    pub fn bulk_modulus(young_modulus: Real, poisson_ratio: Real) -> Real {
        young_modulus / (3.0 * (1.0 - 2.0 * poisson_ratio))
    }

    /// Symmetric part of the velocity gradient.
    #[inline]
    pub fn strain_rate(velocity_gradient: &Matrix) -> SymmetricTensor {
        SymmetricTensor::from_matrix(velocity_gradient)
    }

    /// Tensor with its spherical part removed.
    #[inline]
    pub fn deviatoric_part(tensor: &SymmetricTensor) -> SymmetricTensor {
        let spherical = spherical_part(tensor);
        let mut deviatoric = *tensor;
        for d in 0..DIM {
            deviatoric.set(d, d, tensor.get(d, d) - spherical);
        }
        deviatoric
    }

    /// Mean of the diagonal.
    #[inline]
    pub fn spherical_part(tensor: &SymmetricTensor) -> Real {
        tensor.trace() / DIM as Real
    }
}

/// Check if material properties make sense
pub mod check {
    use crate::math::Real;

    #[inline]
    pub fn viscosity_ok(viscosity: Real) -> bool {
        viscosity >= 0.0 && viscosity.is_finite()
    }

    #[inline]
    pub fn deformation_gradient_ok(det: Real) -> bool {
        det > 0.0 && det.is_finite()
    }

    #[inline]
    pub fn young_modulus_ok(e: Real) -> bool {
        e > 0.0 && e.is_finite()
    }

    /// Poisson ratio strictly inside `(-1, 0.5)`.
    #[inline]
    pub fn poisson_ratio_ok(nu: Real) -> bool {
        nu > -1.0 && nu < 0.5 && nu.is_finite()
    }

    #[inline]
    pub fn bulk_modulus_ok(k: Real) -> bool {
        k >= 0.0 && k.is_finite()
    }
}
