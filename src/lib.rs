use bevy::log::{error, info};
use bevy::prelude::*;

pub mod config;
pub mod core;
pub mod error;
pub mod materials;
pub mod math;
pub mod solver;

// Public re-exports for clean API
pub use crate::config::{
    AxisBoundaries, BoundaryCondition, DomainSpec, ExternalLoad, LevelSetWall, PositionUpdate,
    RigidBodyId, RigidBodySpec, SolverParams, WallKind,
};
pub use crate::core::{Grid, GridNode, MpmState, Particle, ParticleSet, ShapeOrder};
pub use crate::error::{MpmError, MpmResult};
pub use crate::materials::{ConstitutiveModel, MaterialParams};
pub use crate::solver::{Diagnostics, HalfSpace, LevelSet, RigidBodySet, estimate_timestep};

/// Inserts an [`MpmState`] built from `params` and advances it once per
/// `FixedUpdate` with the fixed timestep.
pub struct MpmPlugin {
    pub params: SolverParams,
}

impl MpmPlugin {
    pub fn new(params: SolverParams) -> Self {
        Self { params }
    }
}

impl Default for MpmPlugin {
    fn default() -> Self {
        Self::new(SolverParams::default())
    }
}

impl Plugin for MpmPlugin {
    fn build(&self, app: &mut App) {
        match MpmState::new(self.params.clone()) {
            Ok(state) => {
                let dims = state.grid().node_dims();
                info!(
                    "MPM grid {}x{}x{} nodes, shape order {:?}, {} rigid bodies",
                    dims[0],
                    dims[1],
                    dims[2],
                    self.params.shape_order,
                    self.params.rigid_bodies.len()
                );
                app.insert_resource(state)
                    .add_systems(FixedUpdate, crate::core::advance_system);
            }
            Err(err) => error!("MPM plugin not started: {err}"),
        }
    }
}
