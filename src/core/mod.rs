pub mod grid;
pub mod kernel;
pub mod mpm_state;
pub mod particle;
pub mod particle_set;

pub use grid::{Grid, GridNode, MAX_STENCIL_NODES, Stencil, StencilNode};
pub use kernel::{AxisBasis, CubicNodeType, ShapeOrder, basis_gradient, basis_value, classify_node};
pub use mpm_state::{MpmState, advance_system};
pub use particle::Particle;
pub use particle_set::ParticleSet;
