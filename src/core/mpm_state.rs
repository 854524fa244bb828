use std::time::Instant;

use bevy::log::{debug, error, info};
use bevy::prelude::{Fixed, Res, ResMut, Resource, Time};

use crate::config::SolverParams;
use crate::error::{MpmError, MpmResult};
use crate::math::Real;
use crate::solver::boundary::{self, LevelSet};
use crate::solver::diagnostics::Diagnostics;
use crate::solver::rigid::{self, RigidBodySet};
use crate::solver::{constitutive, g2p, grid_update, p2g, timestep};

use super::grid::Grid;
use super::particle::Particle;
use super::particle_set::ParticleSet;

/// Aggregate simulation state for the solver.
#[derive(Resource)]
pub struct MpmState {
    particle_set: ParticleSet,
    grid: Grid,
    solver_params: SolverParams,
    rigid_bodies: RigidBodySet,
    level_set: Option<Box<dyn LevelSet>>,
    time: Real,
    step: u64,
    last_error: Option<MpmError>,
}

impl MpmState {
    pub fn new(solver_params: SolverParams) -> MpmResult<Self> {
        solver_params.validate()?;
        Ok(Self {
            particle_set: ParticleSet::new(),
            grid: Grid::new(&solver_params),
            rigid_bodies: RigidBodySet::from_specs(&solver_params.rigid_bodies),
            solver_params,
            level_set: None,
            time: 0.0,
            step: 0,
            last_error: None,
        })
    }

    pub fn with_level_set(mut self, level_set: impl LevelSet + 'static) -> Self {
        self.set_level_set(level_set);
        self
    }

    pub fn set_level_set(&mut self, level_set: impl LevelSet + 'static) {
        self.level_set = Some(Box::new(level_set));
    }

    pub fn level_set(&self) -> Option<&dyn LevelSet> {
        self.level_set.as_deref()
    }

    pub fn particle_set(&self) -> &ParticleSet {
        &self.particle_set
    }

    pub fn particle_count(&self) -> usize {
        self.particle_set.len()
    }

    pub fn particles(&self) -> &[Particle] {
        self.particle_set.particles()
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        self.rigid_bodies.invalidate();
        self.particle_set.particles_mut()
    }

    /// Validate and insert a particle. Positions on periodic axes are wrapped.
    pub fn add_particle(&mut self, mut particle: Particle) -> MpmResult<usize> {
        let index = self.particle_set.len();
        particle.validate(index)?;
        self.grid.wrap_position(&mut particle.position);
        if !self.grid.contains(&particle.position) {
            return Err(MpmError::ParticleOutsideDomain {
                particle: index,
                position: particle.position,
            });
        }
        if let Some(id) = particle.rigid_body {
            if !self.rigid_bodies.contains(id) {
                return Err(MpmError::UnknownRigidBody(id));
            }
        }
        self.rigid_bodies.invalidate();
        Ok(self.particle_set.insert(particle))
    }

    pub fn add_particles(&mut self, particles: impl IntoIterator<Item = Particle>) -> MpmResult<()> {
        for particle in particles {
            self.add_particle(particle)?;
        }
        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn solver_params(&self) -> &SolverParams {
        &self.solver_params
    }

    pub fn rigid_bodies(&self) -> &RigidBodySet {
        &self.rigid_bodies
    }

    pub fn time(&self) -> Real {
        self.time
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    /// Error of the last failed step, cleared by the next successful one.
    pub fn last_error(&self) -> Option<&MpmError> {
        self.last_error.as_ref()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::collect(self.particles(), &self.rigid_bodies, self.time, self.step)
    }

    /// Advisory CFL step for the current particle state.
    pub fn estimate_timestep(&self) -> Real {
        timestep::estimate_timestep(self.particles(), &self.solver_params)
    }

    /// Advance the simulation by `dt`.
    ///
    /// On failure the step is left half-applied; the caller decides whether
    /// to discard the state or retry from a snapshot with a smaller `dt`.
    pub fn advance(&mut self, dt: Real) -> MpmResult<()> {
        match self.step_once(dt) {
            Ok(()) => {
                self.time += dt;
                self.step += 1;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                error!("step {} (t = {:.6e}) aborted: {err}", self.step, self.time);
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn step_once(&mut self, dt: Real) -> MpmResult<()> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(MpmError::invalid_params(format!(
                "time step must be positive and finite, got {dt}"
            )));
        }
        let params = &self.solver_params;
        let tolerance = params.mass_tolerance;
        let level_set = self.level_set.as_deref();

        self.rigid_bodies.aggregate(self.particle_set.particles())?;

        let start = Instant::now();
        self.particle_set.rebuild_stencils(&self.grid)?;
        self.grid.zero();
        let (particles, stencils) = self.particle_set.particles_and_stencils();
        p2g::scatter_mass_momentum(&mut self.grid, particles, stencils)?;
        grid_update::compute_velocities(&mut self.grid, tolerance);
        boundary::apply_boundaries(&mut self.grid, params, level_set);
        grid_update::store_old_velocities(&mut self.grid);
        p2g::scatter_forces(&mut self.grid, particles, stencils, params)?;
        p2g::compute_nodal_normals(&mut self.grid, particles, stencils, tolerance)?;
        let p2g_ms = start.elapsed().as_secs_f32() * 1000.0;

        let start = Instant::now();
        grid_update::integrate_forces(&mut self.grid, dt, tolerance);
        boundary::apply_boundaries(&mut self.grid, params, level_set);
        let has_rigid = self.particle_set.has_rigid_particles();
        let (particles, stencils) = self.particle_set.particles_mut_and_stencils();
        if has_rigid {
            rigid::couple_rigid_bodies(
                &mut self.rigid_bodies,
                &mut self.grid,
                particles,
                stencils,
                params,
                dt,
            )?;
        }
        let grid_ms = start.elapsed().as_secs_f32() * 1000.0;

        let start = Instant::now();
        g2p::grid_to_particle(&self.grid, particles, stencils, params, dt)?;
        constitutive::update_stress(particles, dt)?;
        let g2p_ms = start.elapsed().as_secs_f32() * 1000.0;

        debug!(
            "step {}: p2g {:.3}ms, grid {:.3}ms, g2p {:.3}ms, active nodes {}",
            self.step,
            p2g_ms,
            grid_ms,
            g2p_ms,
            self.grid.active_node_count(tolerance)
        );
        Ok(())
    }
}

/// Step the state with the fixed timestep. Stops after the first failure.
pub fn advance_system(time: Res<Time<Fixed>>, mut state: ResMut<MpmState>) {
    if state.last_error().is_some() {
        return;
    }
    let dt = time.delta_secs_f64();
    if dt <= 0.0 {
        return;
    }
    if state.advance(dt).is_err() {
        info!("MPM stepping halted at t = {:.6e}", state.time());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DomainSpec, RigidBodySpec};
    use crate::materials::ConstitutiveModel;
    use crate::math::{Vector, zero_vector};

    fn state() -> MpmState {
        let params = SolverParams::new(DomainSpec::cube(zero_vector(), 1.0, 8))
            .with_rigid_body(RigidBodySpec::imposed(1, zero_vector()));
        MpmState::new(params).unwrap()
    }

    #[test]
    fn add_particle_rejects_bad_input() {
        let mut state = state();
        let outside = Particle::new(Vector::new(9.0, 1.0, 1.0), ConstitutiveModel::Viscous);
        assert!(matches!(
            state.add_particle(outside),
            Err(MpmError::ParticleOutsideDomain { particle: 0, .. })
        ));
        let stray = Particle::new(Vector::new(1.0, 1.0, 1.0), ConstitutiveModel::Viscous).with_rigid_body(9);
        assert_eq!(state.add_particle(stray), Err(MpmError::UnknownRigidBody(9)));
        let massless = Particle::new(Vector::new(1.0, 1.0, 1.0), ConstitutiveModel::Viscous).with_mass(0.0);
        assert!(state.add_particle(massless).is_err());
        assert_eq!(state.particle_count(), 0);
    }

    #[test]
    fn invalid_timestep_is_recorded() {
        let mut state = state();
        assert!(state.advance(0.0).is_err());
        assert!(state.last_error().is_some_and(MpmError::is_configuration));
        assert_eq!(state.step(), 0);

        state.advance(1e-3).unwrap();
        assert!(state.last_error().is_none());
        assert_eq!(state.step(), 1);
        assert!((state.time() - 1e-3).abs() < 1e-15);
    }

    #[test]
    fn mismatched_periodic_faces_are_rejected() {
        use crate::config::{AxisBoundaries, BoundaryCondition};
        let params = SolverParams::default().with_axis_boundaries(
            2,
            AxisBoundaries::new(BoundaryCondition::Periodic, BoundaryCondition::no_slip()),
        );
        assert!(matches!(
            MpmState::new(params),
            Err(MpmError::PeriodicMismatch { axis: 2 })
        ));
    }
}
