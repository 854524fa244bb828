//! Constitutive-model tags and dispatch

use crate::error::{MpmError, MpmResult};
use crate::materials::{MaterialParams, elastic, fluid, viscous};
use crate::math::{Real, SymmetricTensor};

/// Closed set of stress laws a particle can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstitutiveModel {
    /// Small-strain isotropic elasticity.
    LinearElastic,
    /// Polytropic pressure law plus Newtonian deviatoric viscosity.
    CompressibleFluid,
    /// Newtonian viscous stress.
    Viscous,
}

impl ConstitutiveModel {
    pub fn as_i32(self) -> i32 {
        match self {
            Self::LinearElastic => 0,
            Self::CompressibleFluid => 1,
            Self::Viscous => 2,
        }
    }

    pub fn material_name(self) -> &'static str {
        match self {
            Self::LinearElastic => "linear elastic",
            Self::CompressibleFluid => "compressible fluid",
            Self::Viscous => "viscous",
        }
    }

    /// Cauchy stress from the current kinematic state.
    pub fn stress(
        self,
        params: &MaterialParams,
        strain: &SymmetricTensor,
        strain_rate: &SymmetricTensor,
        jacobian: Real,
    ) -> SymmetricTensor {
        match self {
            Self::LinearElastic => elastic::stress(params, strain),
            Self::CompressibleFluid => {
                let pressure = fluid::pressure(params, jacobian);
                fluid::stress(params, pressure, strain_rate)
            }
            Self::Viscous => viscous::stress(params, strain_rate),
        }
    }

    /// Speed of the fastest elastic/acoustic wave, used for the time-step
    /// estimate.
    pub fn wave_speed(self, params: &MaterialParams, density: Real) -> Real {
        if !(density > 0.0) {
            return 0.0;
        }
        match self {
            Self::LinearElastic => elastic::wave_speed(params, density),
            Self::CompressibleFluid => fluid::wave_speed(params, density),
            Self::Viscous => 0.0,
        }
    }
}

impl TryFrom<i32> for ConstitutiveModel {
    type Error = MpmError;

    fn try_from(value: i32) -> MpmResult<Self> {
        match value {
            0 => Ok(Self::LinearElastic),
            1 => Ok(Self::CompressibleFluid),
            2 => Ok(Self::Viscous),
            other => Err(MpmError::InvalidConstitutiveModel(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for model in [
            ConstitutiveModel::LinearElastic,
            ConstitutiveModel::CompressibleFluid,
            ConstitutiveModel::Viscous,
        ] {
            assert_eq!(ConstitutiveModel::try_from(model.as_i32()), Ok(model));
        }
        assert_eq!(
            ConstitutiveModel::try_from(7),
            Err(MpmError::InvalidConstitutiveModel(7))
        );
    }

    #[test]
    fn dispatch_picks_the_right_law() {
        let params = MaterialParams::new(1e6, 0.25, 1e5, 1.0, 0.5);
        let strain_rate = SymmetricTensor([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let viscous = ConstitutiveModel::Viscous.stress(&params, &SymmetricTensor::ZERO, &strain_rate, 1.0);
        assert_eq!(viscous.get(0, 0), 1.0);

        let fluid = ConstitutiveModel::CompressibleFluid.stress(
            &params,
            &SymmetricTensor::ZERO,
            &SymmetricTensor::ZERO,
            0.5,
        );
        // p = K (J^-1 - 1) = 1e5
        assert!((fluid.get(1, 1) + 1e5).abs() < 1e-6);

        let elastic = ConstitutiveModel::LinearElastic.stress(
            &params,
            &SymmetricTensor::ZERO,
            &strain_rate,
            0.5,
        );
        assert_eq!(elastic, SymmetricTensor::ZERO);
    }

    #[test]
    fn viscous_material_has_no_wave_speed() {
        let params = MaterialParams::defaults();
        assert_eq!(ConstitutiveModel::Viscous.wave_speed(&params, 1000.0), 0.0);
        assert!(ConstitutiveModel::LinearElastic.wave_speed(&params, 1000.0) > 0.0);
        assert_eq!(ConstitutiveModel::LinearElastic.wave_speed(&params, 0.0), 0.0);
    }
}
