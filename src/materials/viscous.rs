//! Newtonian viscous material

use crate::materials::MaterialParams;
use crate::math::SymmetricTensor;

/// `σ = 2η D`
pub fn stress(params: &MaterialParams, strain_rate: &SymmetricTensor) -> SymmetricTensor {
    strain_rate.scaled(2.0 * params.dynamic_viscosity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stress_scales_with_viscosity() {
        let params = MaterialParams::viscous(0.25);
        let rate = SymmetricTensor([1.0, 2.0, 0.0, -1.0, 0.0, 4.0]);
        assert_eq!(stress(&params, &rate), SymmetricTensor([0.5, 1.0, 0.0, -0.5, 0.0, 2.0]));
    }
}
