//! Rigid-body coupling
//!
//! Particles tagged with a rigid-body id move as one translating unit. Each
//! step the body collects the force the deformable material exerts on its
//! particles, updates its velocity and writes it back to its particles and to
//! the grid nodes they cover.

use bevy::log::{info, warn};
use indexmap::IndexMap;

use crate::config::{PositionUpdate, RigidBodyId, RigidBodySpec, SolverParams};
use crate::core::{Grid, Particle, Stencil};
use crate::error::{MpmError, MpmResult};
use crate::math::{Real, Vector, zero_vector};
use crate::solver::p2g::{self, particle_external_force};

/// Aggregated state of one rigid body.
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBody {
    pub id: RigidBodyId,
    pub mode: PositionUpdate,
    pub imposed_velocity: Vector,
    pub damping: Real,
    pub enable_weight: bool,
    pub num_particles: usize,
    pub total_mass: Real,
    pub total_volume: Real,
    pub velocity: Vector,
    pub force_internal: Vector,
    pub force_external: Vector,
}

impl RigidBody {
    pub fn from_spec(spec: &RigidBodySpec) -> Self {
        Self {
            id: spec.id,
            mode: spec.mode,
            imposed_velocity: spec.imposed_velocity,
            damping: spec.damping,
            enable_weight: spec.enable_weight,
            num_particles: 0,
            total_mass: 0.0,
            total_volume: 0.0,
            velocity: match spec.mode {
                PositionUpdate::Imposed => spec.imposed_velocity,
                PositionUpdate::Dynamics => zero_vector(),
            },
            force_internal: zero_vector(),
            force_external: zero_vector(),
        }
    }

    #[inline]
    pub fn net_force(&self) -> Vector {
        self.force_internal + self.force_external
    }

    /// One explicit 3-DOF step.
    pub fn update_velocity(&mut self, dt: Real) {
        match self.mode {
            PositionUpdate::Imposed => self.velocity = self.imposed_velocity,
            PositionUpdate::Dynamics => {
                if self.total_mass > 0.0 {
                    let force = self.net_force() - self.velocity * self.damping;
                    self.velocity += force / self.total_mass * dt;
                }
            }
        }
    }
}

/// Insertion-ordered table of rigid bodies keyed by id.
#[derive(Clone, Debug, Default)]
pub struct RigidBodySet {
    bodies: IndexMap<RigidBodyId, RigidBody>,
    aggregated: bool,
}

impl RigidBodySet {
    pub fn from_specs(specs: &[RigidBodySpec]) -> Self {
        Self {
            bodies: specs
                .iter()
                .map(|spec| (spec.id, RigidBody::from_spec(spec)))
                .collect(),
            aggregated: false,
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn contains(&self, id: RigidBodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    pub fn get(&self, id: RigidBodyId) -> Option<&RigidBody> {
        self.bodies.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RigidBody> {
        self.bodies.values()
    }

    pub fn is_aggregated(&self) -> bool {
        self.aggregated
    }

    /// Forget the aggregated totals, e.g. after particles were added.
    pub fn invalidate(&mut self) {
        self.aggregated = false;
    }

    /// Sum particle count, mass and volume per body. Runs once until
    /// [`invalidate`](Self::invalidate) is called.
    pub fn aggregate(&mut self, particles: &[Particle]) -> MpmResult<()> {
        if self.aggregated {
            return Ok(());
        }
        for body in self.bodies.values_mut() {
            body.num_particles = 0;
            body.total_mass = 0.0;
            body.total_volume = 0.0;
        }

        let mut momentum: IndexMap<RigidBodyId, Vector> = IndexMap::new();
        for particle in particles {
            let Some(id) = particle.rigid_body else {
                continue;
            };
            let body = self
                .bodies
                .get_mut(&id)
                .ok_or(MpmError::UnknownRigidBody(id))?;
            body.num_particles += 1;
            body.total_mass += particle.mass;
            body.total_volume += particle.volume;
            *momentum.entry(id).or_insert_with(zero_vector) += particle.velocity * particle.mass;
        }

        for body in self.bodies.values_mut() {
            if body.num_particles == 0 {
                warn!("rigid body {} has no particles", body.id);
                continue;
            }
            // A dynamic body starts from the mean velocity of its particles.
            if body.mode == PositionUpdate::Dynamics {
                if let Some(p) = momentum.get(&body.id) {
                    body.velocity = p / body.total_mass;
                }
            }
            info!(
                "rigid body {}: {} particles, mass {:.6e}, volume {:.6e}",
                body.id, body.num_particles, body.total_mass, body.total_volume
            );
        }
        self.aggregated = true;
        Ok(())
    }

    pub fn reset_forces(&mut self) {
        for body in self.bodies.values_mut() {
            body.force_internal = zero_vector();
            body.force_external = zero_vector();
        }
    }

    /// Collect external loads and the share of nodal internal force each
    /// rigid particle carries, `Σ_I N_I m_p / M_I f_I`.
    pub fn accumulate_forces(
        &mut self,
        grid: &Grid,
        particles: &[Particle],
        stencils: &[Stencil],
        params: &SolverParams,
    ) -> MpmResult<()> {
        let nodes = grid.nodes();
        for (index, particle) in particles.iter().enumerate() {
            let Some(id) = particle.rigid_body else {
                continue;
            };
            let body = self
                .bodies
                .get_mut(&id)
                .ok_or(MpmError::UnknownRigidBody(id))?;

            body.force_external += if body.enable_weight {
                particle_external_force(particle, params)
            } else {
                particle_external_force(particle, params) - params.gravity * particle.mass
            };

            for entry in stencils[index].iter() {
                let node = &nodes[entry.index];
                if node.is_active(params.mass_tolerance) {
                    body.force_internal += node.force_internal * (entry.weight * particle.mass / node.mass);
                }
            }
        }
        Ok(())
    }

    pub fn update_velocities(&mut self, dt: Real) {
        for body in self.bodies.values_mut() {
            body.update_velocity(dt);
        }
    }

    /// Every rigid particle takes its body's velocity.
    pub fn impose_on_particles(&self, particles: &mut [Particle]) -> MpmResult<()> {
        for particle in particles.iter_mut() {
            if let Some(id) = particle.rigid_body {
                let body = self.bodies.get(&id).ok_or(MpmError::UnknownRigidBody(id))?;
                particle.velocity = body.velocity;
            }
        }
        Ok(())
    }
}

/// Nodes covered by rigid mass move with it: `v = p_rigid / m_rigid`.
pub fn impose_on_grid(grid: &mut Grid, mass_tolerance: Real) {
    for node in grid.nodes_mut() {
        if node.rigid_mass > mass_tolerance {
            node.velocity = node.rigid_momentum / node.rigid_mass;
        }
    }
}

/// Full rigid pass, run after the grid force integration.
pub fn couple_rigid_bodies(
    bodies: &mut RigidBodySet,
    grid: &mut Grid,
    particles: &mut [Particle],
    stencils: &[Stencil],
    params: &SolverParams,
    dt: Real,
) -> MpmResult<()> {
    bodies.reset_forces();
    bodies.accumulate_forces(grid, particles, stencils, params)?;
    bodies.update_velocities(dt);
    bodies.impose_on_particles(particles)?;
    p2g::scatter_rigid(grid, particles, stencils)?;
    impose_on_grid(grid, params.mass_tolerance);
    Ok(())
}
