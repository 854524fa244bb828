// src/solver/mod.rs
pub mod boundary;
pub mod constitutive;
pub mod diagnostics;
pub mod g2p;
pub mod grid_update;
pub mod p2g;
pub mod parallel;
pub mod rigid;
pub mod timestep;

pub use boundary::{HalfSpace, LevelSet, apply_boundaries};
pub use constitutive::update_stress;
pub use diagnostics::{Diagnostics, RigidBodyReport};
pub use g2p::grid_to_particle;
pub use grid_update::{compute_velocities, integrate_forces, store_old_velocities};
pub use p2g::{
    compute_nodal_normals, particle_external_force, scatter_forces, scatter_mass_momentum,
    scatter_rigid,
};
pub use rigid::{RigidBody, RigidBodySet, couple_rigid_bodies};
pub use timestep::estimate_timestep;

// Create a prelude module for easy imports
pub mod prelude {
    pub use super::boundary::{HalfSpace, LevelSet};
    pub use super::diagnostics::Diagnostics;
    pub use super::rigid::{RigidBody, RigidBodySet};
    pub use super::timestep::estimate_timestep;
}
