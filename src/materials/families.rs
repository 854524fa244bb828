//! Shared parameter packs for material families.
//!
//! One `MaterialParams` is carried by every particle. Each constitutive model
//! reads only the fields it needs, so a pack can be shared between models.

use crate::config::constants;
use crate::error::{MpmError, MpmResult};
use crate::materials::ConstitutiveModel;
use crate::materials::utils::check;
use crate::math::Real;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub young_modulus: Real,
    pub poisson_ratio: Real,
    pub bulk_modulus: Real,
    /// Polytropic exponent of the fluid pressure law.
    pub gamma_pressure: Real,
    pub dynamic_viscosity: Real,
}

impl MaterialParams {
    pub const fn new(
        young_modulus: Real,
        poisson_ratio: Real,
        bulk_modulus: Real,
        gamma_pressure: Real,
        dynamic_viscosity: Real,
    ) -> Self {
        Self {
            young_modulus,
            poisson_ratio,
            bulk_modulus,
            gamma_pressure,
            dynamic_viscosity,
        }
    }

    pub const fn defaults() -> Self {
        Self::new(
            constants::YOUNG_MODULUS,
            constants::POISSON_RATIO,
            constants::BULK_MODULUS,
            constants::GAMMA_PRESSURE,
            constants::DYNAMIC_VISCOSITY,
        )
    }

    pub const fn elastic(young_modulus: Real, poisson_ratio: Real) -> Self {
        let defaults = Self::defaults();
        Self {
            young_modulus,
            poisson_ratio,
            ..defaults
        }
    }

    pub const fn fluid(bulk_modulus: Real, gamma_pressure: Real, dynamic_viscosity: Real) -> Self {
        let defaults = Self::defaults();
        Self {
            bulk_modulus,
            gamma_pressure,
            dynamic_viscosity,
            ..defaults
        }
    }

    pub const fn viscous(dynamic_viscosity: Real) -> Self {
        let defaults = Self::defaults();
        Self {
            dynamic_viscosity,
            ..defaults
        }
    }

    /// Check the fields read by `model`.
    pub fn validate(&self, model: ConstitutiveModel) -> MpmResult<()> {
        match model {
            ConstitutiveModel::LinearElastic => {
                if !check::young_modulus_ok(self.young_modulus) {
                    return Err(MpmError::invalid_params(format!(
                        "Young's modulus {} must be positive",
                        self.young_modulus
                    )));
                }
                if !check::poisson_ratio_ok(self.poisson_ratio) {
                    return Err(MpmError::invalid_params(format!(
                        "Poisson ratio {} outside (-1, 0.5)",
                        self.poisson_ratio
                    )));
                }
            }
            ConstitutiveModel::CompressibleFluid => {
                if !check::bulk_modulus_ok(self.bulk_modulus) {
                    return Err(MpmError::invalid_params(format!(
                        "bulk modulus {} must be non-negative",
                        self.bulk_modulus
                    )));
                }
                if !self.gamma_pressure.is_finite() {
                    return Err(MpmError::invalid_params("pressure exponent must be finite"));
                }
                if !check::viscosity_ok(self.dynamic_viscosity) {
                    return Err(MpmError::invalid_params(format!(
                        "{} viscosity {} must be non-negative",
                        model.material_name(),
                        self.dynamic_viscosity
                    )));
                }
            }
            ConstitutiveModel::Viscous => {
                if !check::viscosity_ok(self.dynamic_viscosity) {
                    return Err(MpmError::invalid_params(format!(
                        "{} viscosity {} must be non-negative",
                        model.material_name(),
                        self.dynamic_viscosity
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self::defaults()
    }
}
