//! Grid-to-Particle (G2P) transfer operations
//!
//! Gathers grid velocity and its gradient back onto particles, blends the PIC
//! and FLIP velocity updates and advects particles with the grid velocity.

use crate::config::SolverParams;
use crate::core::{Grid, Particle, Stencil};
use crate::error::{MpmError, MpmResult};
use crate::math::{Matrix, Real, Vector, outer_product, vector_is_finite, zero_matrix, zero_vector};
use crate::solver::parallel;

/// What one particle sees of the updated grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSample {
    /// `Σ N v`
    pub velocity: Vector,
    /// `Σ N (v - v_old)`
    pub velocity_increment: Vector,
    /// `Σ v ⊗ ∇N`
    pub velocity_gradient: Matrix,
}

/// Interpolate the grid at one particle. Inert nodes are skipped.
pub fn sample_grid(grid: &Grid, stencil: &Stencil, mass_tolerance: Real) -> GridSample {
    let nodes = grid.nodes();
    let mut sample = GridSample {
        velocity: zero_vector(),
        velocity_increment: zero_vector(),
        velocity_gradient: zero_matrix(),
    };
    for entry in stencil.iter() {
        let node = &nodes[entry.index];
        if !node.is_active(mass_tolerance) {
            continue;
        }
        sample.velocity += node.velocity * entry.weight;
        sample.velocity_increment += (node.velocity - node.velocity_old) * entry.weight;
        sample.velocity_gradient += outer_product(&node.velocity, &entry.gradient);
    }
    sample
}

/// `α v_grid + (1 - α)(v_p + Δv)`
#[inline]
pub fn blend_pic_flip(alpha: Real, particle_velocity: &Vector, sample: &GridSample) -> Vector {
    let pic = sample.velocity;
    let flip = particle_velocity + sample.velocity_increment;
    pic * alpha + flip * (1.0 - alpha)
}

/// Gather onto every particle and advance positions by `dt`.
///
/// Rigid particles skip the gather and move with the velocity imposed by the
/// rigid-body pass.
pub fn grid_to_particle(
    grid: &Grid,
    particles: &mut [Particle],
    stencils: &[Stencil],
    params: &SolverParams,
    dt: Real,
) -> MpmResult<()> {
    parallel::for_each_mut(particles, |index, particle| {
        if particle.is_rigid() {
            particle.grid_velocity = particle.velocity;
            particle.velocity_gradient = zero_matrix();
            particle.position += particle.velocity * dt;
        } else {
            let sample = sample_grid(grid, &stencils[index], params.mass_tolerance);
            particle.velocity = blend_pic_flip(params.alpha_pic_flip, &particle.velocity, &sample);
            particle.grid_velocity = sample.velocity;
            particle.velocity_gradient = sample.velocity_gradient;
            particle.position += sample.velocity * dt;
        }

        if !vector_is_finite(&particle.velocity) {
            return Err(MpmError::NonFinite {
                particle: index,
                quantity: "velocity",
            });
        }
        grid.wrap_position(&mut particle.position);
        if !grid.contains(&particle.position) {
            return Err(MpmError::ParticleOutsideDomain {
                particle: index,
                position: particle.position,
            });
        }
        Ok(())
    })
}
