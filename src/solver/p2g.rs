//! Particle-to-Grid (P2G) transfer operations
//!
//! Scatters mass, momentum and forces from particles onto grid nodes. Every
//! pass goes through [`parallel::scatter`], so the nodal sums are independent
//! of the thread count.

use crate::config::SolverParams;
use crate::core::{Grid, GridNode, Particle, Stencil};
use crate::error::MpmResult;
use crate::math::{Real, Vector, zero_vector};
use crate::solver::parallel::{self, NodeBuffer};

#[derive(Clone, Copy, Debug)]
struct MassMomentum {
    mass: Real,
    momentum: Vector,
}

impl Default for MassMomentum {
    fn default() -> Self {
        Self {
            mass: 0.0,
            momentum: zero_vector(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Forces {
    internal: Vector,
    external: Vector,
}

impl Default for Forces {
    fn default() -> Self {
        Self {
            internal: zero_vector(),
            external: zero_vector(),
        }
    }
}

#[inline(always)]
fn deposit_mass_momentum(particle: &Particle, stencil: &Stencil, buffer: &mut NodeBuffer<MassMomentum>) {
    let momentum = particle.velocity * particle.mass;
    for node in stencil.iter() {
        let entry = buffer.entry(node.index).or_default();
        entry.mass += node.weight * particle.mass;
        entry.momentum += momentum * node.weight;
    }
}

/// Nodal mass and momentum from every particle.
pub fn scatter_mass_momentum(
    grid: &mut Grid,
    particles: &[Particle],
    stencils: &[Stencil],
) -> MpmResult<()> {
    parallel::scatter(
        particles,
        grid.nodes_mut(),
        |index, particle, buffer| {
            deposit_mass_momentum(particle, &stencils[index], buffer);
            Ok(())
        },
        |node: &mut GridNode, value: MassMomentum| {
            node.mass += value.mass;
            node.momentum += value.momentum;
        },
    )
}

/// External force acting on one particle: weight plus the slab load.
#[inline]
pub fn particle_external_force(particle: &Particle, params: &SolverParams) -> Vector {
    let mut force = params.gravity * particle.mass;
    if let Some(load) = &params.external_load {
        if load.contains(&particle.position) {
            force += load.force;
        }
    }
    force
}

/// Internal (stress divergence) and external nodal forces.
///
/// `f_int = -V σ·∇N`, `f_ext = N (m g + slab load)`.
pub fn scatter_forces(
    grid: &mut Grid,
    particles: &[Particle],
    stencils: &[Stencil],
    params: &SolverParams,
) -> MpmResult<()> {
    parallel::scatter(
        particles,
        grid.nodes_mut(),
        |index, particle, buffer: &mut NodeBuffer<Forces>| {
            let external = particle_external_force(particle, params);
            let stress = particle.stress.to_matrix();
            for node in stencils[index].iter() {
                let entry = buffer.entry(node.index).or_default();
                entry.internal -= stress * node.gradient * particle.volume;
                entry.external += external * node.weight;
            }
            Ok(())
        },
        |node: &mut GridNode, value: Forces| {
            node.force_internal += value.internal;
            node.force_external += value.external;
        },
    )
}

/// Rigid-only mass and momentum, kept apart from the deformable sums.
pub fn scatter_rigid(grid: &mut Grid, particles: &[Particle], stencils: &[Stencil]) -> MpmResult<()> {
    parallel::scatter(
        particles,
        grid.nodes_mut(),
        |index, particle, buffer| {
            if particle.is_rigid() {
                deposit_mass_momentum(particle, &stencils[index], buffer);
            }
            Ok(())
        },
        |node: &mut GridNode, value: MassMomentum| {
            node.rigid_mass += value.mass;
            node.rigid_momentum += value.momentum;
        },
    )
}

/// Surface normals `n = Σ m ∇N / |Σ m ∇N|` on active nodes, pointing out of
/// the material.
pub fn compute_nodal_normals(
    grid: &mut Grid,
    particles: &[Particle],
    stencils: &[Stencil],
    mass_tolerance: Real,
) -> MpmResult<()> {
    parallel::scatter(
        particles,
        grid.nodes_mut(),
        |index, particle, buffer: &mut NodeBuffer<Vector>| {
            for node in stencils[index].iter() {
                *buffer.entry(node.index).or_insert_with(zero_vector) += node.gradient * particle.mass;
            }
            Ok(())
        },
        |node: &mut GridNode, value: Vector| node.normal += value,
    )?;

    for node in grid.nodes_mut() {
        let norm = node.normal.norm();
        node.normal = if node.is_active(mass_tolerance) && norm > 0.0 {
            node.normal / norm
        } else {
            zero_vector()
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DomainSpec, ExternalLoad};
    use crate::core::ParticleSet;
    use crate::core::kernel::ShapeOrder;
    use crate::materials::ConstitutiveModel;
    use crate::math::SymmetricTensor;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn setup(order: ShapeOrder, count: usize) -> (Grid, ParticleSet, SolverParams) {
        let params = SolverParams::new(DomainSpec::cube(zero_vector(), 0.5, 12))
            .with_uniform_shape_order(order);
        let grid = Grid::new(&params);
        let mut rng = StdRng::seed_from_u64(3);
        let mut set = ParticleSet::new();
        for _ in 0..count {
            let position = Vector::from_fn(|_, _| rng.random_range(1.0..5.0));
            let velocity = Vector::from_fn(|_, _| rng.random_range(-1.0..1.0));
            set.insert(
                Particle::new(position, ConstitutiveModel::LinearElastic)
                    .with_density(0.01, rng.random_range(500.0..2000.0))
                    .with_velocity(velocity),
            );
        }
        set.rebuild_stencils(&grid).unwrap();
        (grid, set, params)
    }

    #[test]
    fn mass_and_momentum_are_conserved() {
        for order in [ShapeOrder::Linear, ShapeOrder::Cubic] {
            let (mut grid, set, _) = setup(order, 700);
            let (particles, stencils) = set.particles_and_stencils();
            scatter_mass_momentum(&mut grid, particles, stencils).unwrap();

            let particle_mass: Real = particles.iter().map(|p| p.mass).sum();
            let particle_momentum = particles
                .iter()
                .fold(zero_vector(), |acc, p| acc + p.velocity * p.mass);
            let grid_mass: Real = grid.nodes().iter().map(|n| n.mass).sum();

            assert!((grid_mass - particle_mass).abs() < 1e-9 * particle_mass);
            assert!((grid.total_momentum() - particle_momentum).norm() < 1e-9 * particle_mass);
        }
    }

    #[test]
    fn stress_free_particles_have_no_internal_force() {
        let (mut grid, set, params) = setup(ShapeOrder::Cubic, 50);
        let (particles, stencils) = set.particles_and_stencils();
        scatter_forces(&mut grid, particles, stencils, &params).unwrap();
        assert!(grid.nodes().iter().all(|n| n.force_internal == zero_vector()));

        let total_external = grid
            .nodes()
            .iter()
            .fold(zero_vector(), |acc, n| acc + n.force_external);
        let weight: Real = particles.iter().map(|p| p.mass).sum::<Real>() * params.gravity.y;
        assert!((total_external.y - weight).abs() < 1e-9 * weight.abs());
    }

    #[test]
    fn internal_forces_sum_to_zero() {
        let (mut grid, mut set, params) = setup(ShapeOrder::Linear, 20);
        for particle in set.iter_mut() {
            particle.stress = SymmetricTensor([1e3, 2e2, -5e1, 4e2, 0.0, -3e2]);
        }
        let (particles, stencils) = set.particles_and_stencils();
        scatter_forces(&mut grid, particles, stencils, &params).unwrap();
        let total = grid
            .nodes()
            .iter()
            .fold(zero_vector(), |acc, n| acc + n.force_internal);
        assert!(total.norm() < 1e-8);
    }

    #[test]
    fn slab_load_only_hits_particles_inside() {
        let params = SolverParams::new(DomainSpec::cube(zero_vector(), 1.0, 8))
            .with_gravity(zero_vector())
            .with_external_load(ExternalLoad {
                slab_lo: Vector::new(0.0, 0.0, 0.0),
                slab_hi: Vector::new(4.0, 8.0, 8.0),
                force: Vector::new(2.0, 0.0, 0.0),
            });
        let inside = Particle::new(Vector::new(2.5, 2.5, 2.5), ConstitutiveModel::Viscous);
        let outside = Particle::new(Vector::new(6.5, 2.5, 2.5), ConstitutiveModel::Viscous);
        assert_eq!(particle_external_force(&inside, &params), Vector::new(2.0, 0.0, 0.0));
        assert_eq!(particle_external_force(&outside, &params), zero_vector());
    }

    #[test]
    fn rigid_pass_ignores_deformable_particles() {
        let (mut grid, mut set, _) = setup(ShapeOrder::Linear, 10);
        if let Some(particle) = set.get_mut(0) {
            particle.rigid_body = Some(1);
        }
        set.rebuild_stencils(&grid).unwrap();
        let (particles, stencils) = set.particles_and_stencils();
        scatter_rigid(&mut grid, particles, stencils).unwrap();
        let rigid_mass: Real = grid.nodes().iter().map(|n| n.rigid_mass).sum();
        assert!((rigid_mass - particles[0].mass).abs() < 1e-12);
    }

    #[test]
    fn normals_point_out_of_a_block() {
        let params = SolverParams::new(DomainSpec::cube(zero_vector(), 1.0, 10));
        let mut grid = Grid::new(&params);
        let mut set = ParticleSet::new();
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    let position = Vector::new(3.25, 3.25, 3.25) + Vector::new(i as Real, j as Real, k as Real) * 0.5;
                    set.insert(Particle::new(position, ConstitutiveModel::Viscous));
                }
            }
        }
        set.rebuild_stencils(&grid).unwrap();
        let (particles, stencils) = set.particles_and_stencils();
        scatter_mass_momentum(&mut grid, particles, stencils).unwrap();
        compute_nodal_normals(&mut grid, particles, stencils, params.mass_tolerance).unwrap();
        // Node on the +x face of the block, mid-height.
        let normal = grid.node(bevy::prelude::IVec3::new(5, 4, 4)).normal;
        assert!(normal.x > 0.9, "{normal:?}");
    }
}
