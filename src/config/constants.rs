// Default physical and numerical constants for the MPM core
use crate::math::{Real, Vector};

// Global physics
pub const GRAVITY: Vector = Vector::new(0.0, -9.81, 0.0);

// Nodes lighter than this are inert
pub const MASS_TOLERANCE: Real = 1e-8;

// Weight of the PIC path in the PIC/FLIP blend
pub const ALPHA_PIC_FLIP: Real = 0.05;

// Coulomb friction of domain walls and level-set walls
pub const WALL_FRICTION: Real = 0.1;

// Advisory time-step estimate
pub const CFL: Real = 0.1;
pub const DT_MIN: Real = 1e-12;
pub const DT_MAX: Real = 1.0;

// Round-off slack on kernel support limits (in cell units)
pub const SUPPORT_EPSILON: Real = 1e-9;

// Default material parameters
pub const REST_DENSITY: Real = 1000.0;
pub const YOUNG_MODULUS: Real = 1e9;
pub const POISSON_RATIO: Real = 0.1;
pub const BULK_MODULUS: Real = 2e6;
pub const GAMMA_PRESSURE: Real = 1.4;
pub const DYNAMIC_VISCOSITY: Real = 0.001;
