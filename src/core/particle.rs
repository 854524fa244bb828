//! Material particles for MPM simulation
//!
//! Particles carry position, velocity, mass, deformation state and stress.

use crate::config::RigidBodyId;
use crate::error::{MpmError, MpmResult};
use crate::materials::{ConstitutiveModel, MaterialParams};
use crate::math::{
    Matrix, Real, SymmetricTensor, Vector, identity_matrix, matrix_determinant, matrix_is_finite,
    vector_is_finite, zero_matrix, zero_vector,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vector,
    pub velocity: Vector,
    /// Grid velocity interpolated at the last gather.
    pub grid_velocity: Vector,
    pub velocity_gradient: Matrix,
    pub strain_rate: SymmetricTensor,
    pub strain: SymmetricTensor,
    pub stress: SymmetricTensor,
    pub deformation_gradient: Matrix,

    pub mass: Real,
    pub volume0: Real,
    pub volume: Real,
    pub density: Real,
    pub jacobian: Real,
    pub pressure: Real,

    pub material: MaterialParams,
    pub model: ConstitutiveModel,
    pub phase: u32,
    /// `None` for deformable material.
    pub rigid_body: Option<RigidBodyId>,
}

impl Particle {
    /// Unit-mass, unit-volume particle at rest.
    pub fn new(position: Vector, model: ConstitutiveModel) -> Self {
        Self {
            position,
            velocity: zero_vector(),
            grid_velocity: zero_vector(),
            velocity_gradient: zero_matrix(),
            strain_rate: SymmetricTensor::ZERO,
            strain: SymmetricTensor::ZERO,
            stress: SymmetricTensor::ZERO,
            deformation_gradient: identity_matrix(),
            mass: 1.0,
            volume0: 1.0,
            volume: 1.0,
            density: 1.0,
            jacobian: 1.0,
            pressure: 0.0,
            material: MaterialParams::defaults(),
            model,
            phase: 0,
            rigid_body: None,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the mass, keeping the volume.
    pub fn with_mass(mut self, mass: Real) -> Self {
        self.mass = mass;
        self.density = self.density_from_volume(self.volume);
        self
    }

    /// Set both the reference and current volume.
    pub fn with_volume(mut self, volume: Real) -> Self {
        self.volume0 = volume;
        self.volume = volume * self.jacobian;
        self.density = self.density_from_volume(self.volume);
        self
    }

    /// Particle of volume `volume` and density `density`.
    pub fn with_density(self, volume: Real, density: Real) -> Self {
        self.with_volume(volume).with_mass(volume * density)
    }

    pub fn with_material(mut self, material: MaterialParams) -> Self {
        self.material = material;
        self
    }

    pub fn with_phase(mut self, phase: u32) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_rigid_body(mut self, id: RigidBodyId) -> Self {
        self.rigid_body = Some(id);
        self
    }

    pub fn with_stress(mut self, stress: SymmetricTensor) -> Self {
        self.stress = stress;
        self
    }

    /// Start from a pre-deformed state. Volume and density follow `det(F)`.
    pub fn with_deformation_gradient(mut self, deformation_gradient: Matrix) -> Self {
        self.deformation_gradient = deformation_gradient;
        self.jacobian = matrix_determinant(&deformation_gradient);
        self.volume = self.volume0 * self.jacobian;
        self.density = self.density_from_volume(self.volume);
        self
    }

    #[inline(always)]
    pub fn is_rigid(&self) -> bool {
        self.rigid_body.is_some()
    }

    #[inline(always)]
    pub fn density_from_volume(&self, volume: Real) -> Real {
        if volume > 0.0 { self.mass / volume } else { 0.0 }
    }

    #[inline(always)]
    pub fn rest_density(&self) -> Real {
        self.density_from_volume(self.volume0)
    }

    #[inline(always)]
    pub fn kinetic_energy(&self) -> Real {
        0.5 * self.mass * self.velocity.norm_squared()
    }

    /// `½ V σ:ε`
    #[inline(always)]
    pub fn strain_energy(&self) -> Real {
        0.5 * self.volume * self.stress.double_dot(&self.strain)
    }

    /// Check creation-time invariants.
    pub fn validate(&self, index: usize) -> MpmResult<()> {
        if !(self.mass > 0.0 && self.mass.is_finite()) {
            return Err(MpmError::invalid_params(format!(
                "particle {index} has non-positive mass {}",
                self.mass
            )));
        }
        if !(self.volume0 > 0.0 && self.volume0.is_finite()) {
            return Err(MpmError::invalid_params(format!(
                "particle {index} has non-positive volume {}",
                self.volume0
            )));
        }
        if !self.is_rigid() {
            self.material.validate(self.model)?;
        }
        self.check_finite(index)
    }

    /// Fail on NaN/inf in any evolving field.
    pub fn check_finite(&self, index: usize) -> MpmResult<()> {
        let non_finite = |quantity| MpmError::NonFinite {
            particle: index,
            quantity,
        };
        if !vector_is_finite(&self.position) {
            return Err(non_finite("position"));
        }
        if !vector_is_finite(&self.velocity) {
            return Err(non_finite("velocity"));
        }
        if !matrix_is_finite(&self.deformation_gradient) {
            return Err(non_finite("deformation gradient"));
        }
        if !self.stress.is_finite() {
            return Err(non_finite("stress"));
        }
        Ok(())
    }
}
