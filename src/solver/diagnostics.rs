//! Read-only aggregates for reporting.

use crate::config::RigidBodyId;
use crate::core::Particle;
use crate::materials::utils::{inv_exact, stress_magnitude};
use crate::math::{Real, Vector, zero_vector};
use crate::solver::rigid::RigidBodySet;

pub fn total_kinetic_energy(particles: &[Particle]) -> Real {
    particles.iter().map(Particle::kinetic_energy).sum()
}

pub fn total_strain_energy(particles: &[Particle]) -> Real {
    particles.iter().map(Particle::strain_energy).sum()
}

/// Mass of the deformable particles.
pub fn material_mass(particles: &[Particle]) -> Real {
    particles
        .iter()
        .filter(|p| !p.is_rigid())
        .map(|p| p.mass)
        .sum()
}

/// Current volume of the deformable particles.
pub fn material_volume(particles: &[Particle]) -> Real {
    particles
        .iter()
        .filter(|p| !p.is_rigid())
        .map(|p| p.volume)
        .sum()
}

pub fn total_momentum(particles: &[Particle]) -> Vector {
    particles
        .iter()
        .fold(zero_vector(), |acc, p| acc + p.velocity * p.mass)
}

/// Mass-weighted mean velocity, zero for an empty set.
pub fn center_of_mass_velocity(particles: &[Particle]) -> Vector {
    let mass: Real = particles.iter().map(|p| p.mass).sum();
    total_momentum(particles) * inv_exact(mass)
}

/// Largest stress norm over the deformable particles.
pub fn peak_stress(particles: &[Particle]) -> Real {
    particles
        .iter()
        .filter(|p| !p.is_rigid())
        .map(|p| stress_magnitude(&p.stress))
        .fold(0.0, Real::max)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidBodyReport {
    pub id: RigidBodyId,
    pub num_particles: usize,
    pub net_force: Vector,
    pub velocity: Vector,
}

/// Snapshot of one step.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostics {
    pub time: Real,
    pub step: u64,
    pub kinetic_energy: Real,
    pub strain_energy: Real,
    pub material_mass: Real,
    pub material_volume: Real,
    pub center_of_mass_velocity: Vector,
    pub peak_stress: Real,
    pub rigid_bodies: Vec<RigidBodyReport>,
}

impl Diagnostics {
    pub fn collect(particles: &[Particle], bodies: &RigidBodySet, time: Real, step: u64) -> Self {
        Self {
            time,
            step,
            kinetic_energy: total_kinetic_energy(particles),
            strain_energy: total_strain_energy(particles),
            material_mass: material_mass(particles),
            material_volume: material_volume(particles),
            center_of_mass_velocity: center_of_mass_velocity(particles),
            peak_stress: peak_stress(particles),
            rigid_bodies: bodies
                .iter()
                .map(|body| RigidBodyReport {
                    id: body.id,
                    num_particles: body.num_particles,
                    net_force: body.net_force(),
                    velocity: body.velocity,
                })
                .collect(),
        }
    }

    pub fn total_energy(&self) -> Real {
        self.kinetic_energy + self.strain_energy
    }
}
