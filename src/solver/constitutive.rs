//! Deformation and stress update
//!
//! Runs after the gather. Each particle only reads its own velocity gradient,
//! so particles are updated independently.

use crate::core::Particle;
use crate::error::{MpmError, MpmResult};
use crate::materials::physics;
use crate::materials::utils::{self, check};
use crate::math::{Real, identity_matrix, matrix_determinant, matrix_is_finite};
use crate::solver::parallel;

/// Integrate `F`, volume, strain and stress of one deformable particle.
///
/// `F ← (I + L dt) F`. A non-positive `det(F)` aborts the step.
pub fn update_particle(particle: &mut Particle, index: usize, dt: Real) -> MpmResult<()> {
    if particle.is_rigid() {
        return Ok(());
    }

    let increment = identity_matrix() + particle.velocity_gradient * dt;
    let deformation_gradient = increment * particle.deformation_gradient;
    if !matrix_is_finite(&deformation_gradient) {
        return Err(MpmError::NonFinite {
            particle: index,
            quantity: "deformation gradient",
        });
    }
    let jacobian = matrix_determinant(&deformation_gradient);
    if !check::deformation_gradient_ok(jacobian) {
        return Err(MpmError::NonPositiveJacobian {
            particle: index,
            jacobian,
        });
    }

    particle.deformation_gradient = deformation_gradient;
    particle.jacobian = jacobian;
    particle.volume = jacobian * particle.volume0;
    particle.density = particle.mass / particle.volume;

    particle.strain_rate = physics::strain_rate(&particle.velocity_gradient);
    let strain_rate = particle.strain_rate;
    particle.strain.add_scaled(&strain_rate, dt);

    particle.stress = particle.model.stress(
        &particle.material,
        &particle.strain,
        &particle.strain_rate,
        jacobian,
    );
    if !particle.stress.is_finite() {
        return Err(MpmError::NonFinite {
            particle: index,
            quantity: "stress",
        });
    }
    particle.pressure = utils::pressure(&particle.stress);
    Ok(())
}

/// Update every particle in parallel.
pub fn update_stress(particles: &mut [Particle], dt: Real) -> MpmResult<()> {
    parallel::for_each_mut(particles, |index, particle| update_particle(particle, index, dt))
}
