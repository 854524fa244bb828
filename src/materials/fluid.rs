//! Compressible fluid / gas
//!
//! Pressure from the volume ratio, viscosity on the deviatoric strain rate.

use crate::materials::MaterialParams;
use crate::materials::utils::physics;
use crate::math::{Real, SymmetricTensor};

/// Polytropic pressure `p = K (J^-γ - 1)`.
#[inline]
pub fn pressure(params: &MaterialParams, jacobian: Real) -> Real {
    params.bulk_modulus * (jacobian.powf(-params.gamma_pressure) - 1.0)
}

/// `σ = -p I + 2η dev(D)`
pub fn stress(params: &MaterialParams, pressure: Real, strain_rate: &SymmetricTensor) -> SymmetricTensor {
    let mut stress = physics::deviatoric_part(strain_rate).scaled(2.0 * params.dynamic_viscosity);
    stress.add_scaled(&SymmetricTensor::identity(), -pressure);
    stress
}

/// Sound speed `sqrt(K γ / ρ)`.
pub fn wave_speed(params: &MaterialParams, density: Real) -> Real {
    (params.bulk_modulus * params.gamma_pressure.abs() / density).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressure_vanishes_at_rest_volume() {
        let params = MaterialParams::fluid(2e6, 1.4, 1e-3);
        assert_eq!(pressure(&params, 1.0), 0.0);
        assert!(pressure(&params, 0.9) > 0.0);
        assert!(pressure(&params, 1.1) < 0.0);
    }

    #[test]
    fn dilatation_rate_does_not_produce_viscous_stress() {
        let params = MaterialParams::fluid(0.0, 1.0, 2.0);
        let strain_rate = SymmetricTensor::identity();
        let sigma = stress(&params, 0.0, &strain_rate);
        assert!(sigma.0.iter().all(|v| v.abs() < 1e-14));

        let shear = SymmetricTensor([0.0, 0.5, 0.0, 0.0, 0.0, 0.0]);
        let sigma = stress(&params, 3.0, &shear);
        assert_eq!(sigma.get(0, 1), 2.0);
        assert_eq!(sigma.get(2, 2), -3.0);
    }
}
