//! Linear elastic solid
//!
//! Small-strain Hooke's law on the accumulated strain.

use crate::materials::MaterialParams;
use crate::materials::utils::physics;
use crate::math::{Real, SymmetricTensor};

/// `σ = λ tr(ε) I + 2μ ε`
pub fn stress(params: &MaterialParams, strain: &SymmetricTensor) -> SymmetricTensor {
    let (lambda, mu) = physics::lame_lambda_mu(params.young_modulus, params.poisson_ratio);
    let mut stress = strain.scaled(2.0 * mu);
    stress.add_scaled(&SymmetricTensor::identity(), lambda * strain.trace());
    stress
}

/// P-wave speed `sqrt((λ + 2μ) / ρ)`.
pub fn wave_speed(params: &MaterialParams, density: Real) -> Real {
    let (lambda, mu) = physics::lame_lambda_mu(params.young_modulus, params.poisson_ratio);
    ((lambda + 2.0 * mu) / density).sqrt()
}
