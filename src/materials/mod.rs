//! Materials for MPM simulation
//!
//! Three stress laws, selected per particle by [`ConstitutiveModel`]:
//!
//! * `elastic` - small-strain linear elasticity
//! * `fluid` - compressible fluid / gas with viscosity
//! * `viscous` - Newtonian viscous material

pub mod elastic;
pub mod families;
pub mod fluid;
pub mod material_types;
pub mod utils;
pub mod viscous;

pub use families::MaterialParams;
pub use material_types::ConstitutiveModel;

pub use utils::check;
pub use utils::physics;
