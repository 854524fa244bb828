use rayon::prelude::*;

use crate::config::RigidBodyId;
use crate::core::Particle;
use crate::core::grid::{Grid, Stencil};
use crate::error::MpmResult;

/// Particle storage plus the per-step interpolation cache.
///
/// Stencils are rebuilt once per step from the particle positions and reused by
/// every transfer of that step.
#[derive(Clone, Default)]
pub struct ParticleSet {
    particles: Vec<Particle>,
    stencils: Vec<Stencil>,
}

impl ParticleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    pub fn insert(&mut self, particle: Particle) -> usize {
        let index = self.particles.len();
        self.particles.push(particle);
        self.invalidate_stencils();
        index
    }

    pub fn insert_batch(&mut self, mut batch: Vec<Particle>) {
        self.particles.append(&mut batch);
        self.invalidate_stencils();
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.invalidate_stencils();
    }

    /// Stencils of the current step, one per particle.
    pub fn stencils(&self) -> &[Stencil] {
        &self.stencils
    }

    pub fn particles_and_stencils(&self) -> (&[Particle], &[Stencil]) {
        (&self.particles, &self.stencils)
    }

    pub fn particles_mut_and_stencils(&mut self) -> (&mut [Particle], &[Stencil]) {
        (&mut self.particles, &self.stencils)
    }

    /// Recompute every particle's stencil against `grid`.
    pub fn rebuild_stencils(&mut self, grid: &Grid) -> MpmResult<()> {
        self.stencils
            .resize(self.particles.len(), Stencil::default());
        self.stencils
            .par_iter_mut()
            .zip(self.particles.par_iter())
            .try_for_each(|(stencil, particle)| {
                *stencil = grid.stencil(&particle.position)?;
                Ok(())
            })
    }

    pub fn has_rigid_particles(&self) -> bool {
        self.particles.iter().any(Particle::is_rigid)
    }

    /// Indices of the particles belonging to rigid body `id`.
    pub fn rigid_indices(&self, id: RigidBodyId) -> impl Iterator<Item = usize> + '_ {
        self.particles
            .iter()
            .enumerate()
            .filter(move |(_, particle)| particle.rigid_body == Some(id))
            .map(|(index, _)| index)
    }

    fn invalidate_stencils(&mut self) {
        self.stencils.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DomainSpec, SolverParams};
    use crate::materials::ConstitutiveModel;
    use crate::math::{Real, Vector, zero_vector};

    fn particle(x: Real) -> Particle {
        Particle::new(Vector::new(x, 2.5, 2.5), ConstitutiveModel::Viscous)
    }

    #[test]
    fn insertion_invalidates_cache() {
        let grid = Grid::new(&SolverParams::new(DomainSpec::cube(zero_vector(), 1.0, 8)));
        let mut set = ParticleSet::new();
        set.insert_batch(vec![particle(1.5), particle(2.5)]);
        set.rebuild_stencils(&grid).unwrap();
        assert_eq!(set.stencils().len(), 2);
        assert_eq!(set.stencils()[0].len(), 8);
        set.insert(particle(3.5));
        assert!(set.stencils().is_empty());
    }

    #[test]
    fn rigid_filter() {
        let mut set = ParticleSet::new();
        set.insert(particle(1.0));
        set.insert(particle(2.0).with_rigid_body(3));
        set.insert(particle(3.0).with_rigid_body(4));
        set.insert(particle(4.0).with_rigid_body(3));
        assert!(set.has_rigid_particles());
        assert_eq!(set.rigid_indices(3).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(set.rigid_indices(9).count(), 0);
    }

    #[test]
    fn out_of_domain_particle_fails_stencil() {
        let grid = Grid::new(&SolverParams::new(DomainSpec::cube(zero_vector(), 1.0, 8)));
        let mut set = ParticleSet::new();
        set.insert(particle(12.0));
        assert!(set.rebuild_stencils(&grid).is_err());
    }
}
