use crate::config::constants;
use crate::core::kernel::ShapeOrder;
use crate::error::{MpmError, MpmResult};
use crate::math::{DIM, Real, Vector, zero_vector};

/// Identifier shared by all particles of one rigid body.
pub type RigidBodyId = u32;

/// Structured background grid extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DomainSpec {
    /// Physical position of node `(0, 0, 0)`.
    pub origin: Vector,
    /// Cell spacing per axis.
    pub cell_size: Vector,
    /// Number of cells per axis.
    pub cells: [usize; DIM],
}

impl DomainSpec {
    pub fn new(origin: Vector, cell_size: Vector, cells: [usize; DIM]) -> Self {
        Self {
            origin,
            cell_size,
            cells,
        }
    }

    /// Cube of `cells³` cells of width `cell_size` starting at `origin`.
    pub fn cube(origin: Vector, cell_size: Real, cells: usize) -> Self {
        Self::new(origin, Vector::repeat(cell_size), [cells; DIM])
    }

    /// Upper physical corner of the domain.
    pub fn upper(&self) -> Vector {
        Vector::from_fn(|d, _| self.origin[d] + self.cells[d] as Real * self.cell_size[d])
    }
}

impl Default for DomainSpec {
    fn default() -> Self {
        Self::cube(zero_vector(), 1.0, 16)
    }
}

/// Boundary treatment of one domain face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundaryCondition {
    /// Wraps onto the opposite face. Both faces of an axis must agree.
    Periodic,
    /// Normal velocity (relative to the wall) removed, tangential velocity
    /// reduced by Coulomb friction.
    SlipWall { friction: Real, wall_velocity: Vector },
    /// Node velocity pinned to the wall velocity.
    NoSlipWall { wall_velocity: Vector },
}

impl BoundaryCondition {
    pub fn slip(friction: Real) -> Self {
        Self::SlipWall {
            friction,
            wall_velocity: zero_vector(),
        }
    }

    pub fn no_slip() -> Self {
        Self::NoSlipWall {
            wall_velocity: zero_vector(),
        }
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self, Self::Periodic)
    }
}

impl Default for BoundaryCondition {
    fn default() -> Self {
        Self::slip(constants::WALL_FRICTION)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisBoundaries {
    pub lo: BoundaryCondition,
    pub hi: BoundaryCondition,
}

impl AxisBoundaries {
    pub fn new(lo: BoundaryCondition, hi: BoundaryCondition) -> Self {
        Self { lo, hi }
    }

    pub fn periodic() -> Self {
        Self::new(BoundaryCondition::Periodic, BoundaryCondition::Periodic)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WallKind {
    Slip,
    NoSlip,
}

/// Boundary applied at nodes inside an embedded level-set geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelSetWall {
    pub kind: WallKind,
    pub friction: Real,
}

impl Default for LevelSetWall {
    fn default() -> Self {
        Self {
            kind: WallKind::NoSlip,
            friction: constants::WALL_FRICTION,
        }
    }
}

/// Force applied to every particle whose position lies in an axis-aligned slab.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExternalLoad {
    pub slab_lo: Vector,
    pub slab_hi: Vector,
    /// Force per particle.
    pub force: Vector,
}

impl ExternalLoad {
    #[inline]
    pub fn contains(&self, position: &Vector) -> bool {
        (0..DIM).all(|d| position[d] >= self.slab_lo[d] && position[d] <= self.slab_hi[d])
    }
}

/// How a rigid body's velocity evolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionUpdate {
    /// Velocity held at the imposed value.
    Imposed,
    /// Velocity integrated from the aggregated force.
    Dynamics,
}

impl TryFrom<i32> for PositionUpdate {
    type Error = MpmError;

    fn try_from(value: i32) -> MpmResult<Self> {
        match value {
            0 => Ok(Self::Imposed),
            1 => Ok(Self::Dynamics),
            other => Err(MpmError::invalid_params(format!(
                "rigid body position update method {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidBodySpec {
    pub id: RigidBodyId,
    pub mode: PositionUpdate,
    pub imposed_velocity: Vector,
    pub damping: Real,
    /// Include the body's weight in its external force.
    pub enable_weight: bool,
}

impl RigidBodySpec {
    pub fn imposed(id: RigidBodyId, velocity: Vector) -> Self {
        Self {
            id,
            mode: PositionUpdate::Imposed,
            imposed_velocity: velocity,
            damping: 0.0,
            enable_weight: true,
        }
    }

    pub fn dynamic(id: RigidBodyId) -> Self {
        Self {
            id,
            mode: PositionUpdate::Dynamics,
            imposed_velocity: zero_vector(),
            damping: 0.0,
            enable_weight: true,
        }
    }

    pub fn with_damping(mut self, damping: Real) -> Self {
        self.damping = damping;
        self
    }

    pub fn without_weight(mut self) -> Self {
        self.enable_weight = false;
        self
    }
}

/// Solver parameters, fixed for the lifetime of a simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverParams {
    pub domain: DomainSpec,

    /// Shape-function order per axis.
    pub shape_order: [ShapeOrder; DIM],

    pub boundaries: [AxisBoundaries; DIM],

    /// Boundary applied inside the level set, when one is attached.
    pub level_set_wall: Option<LevelSetWall>,

    /// Weight of the PIC update (1 = pure PIC, 0 = pure FLIP).
    pub alpha_pic_flip: Real,

    /// Nodes with less mass than this are inert.
    pub mass_tolerance: Real,

    pub gravity: Vector,

    pub external_load: Option<ExternalLoad>,

    pub rigid_bodies: Vec<RigidBodySpec>,

    pub cfl: Real,
    pub dt_min: Real,
    pub dt_max: Real,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self::new(DomainSpec::default())
    }
}

impl SolverParams {
    pub fn new(domain: DomainSpec) -> Self {
        Self {
            domain,
            shape_order: [ShapeOrder::Linear; DIM],
            boundaries: [AxisBoundaries::default(); DIM],
            level_set_wall: None,
            alpha_pic_flip: constants::ALPHA_PIC_FLIP,
            mass_tolerance: constants::MASS_TOLERANCE,
            gravity: constants::GRAVITY,
            external_load: None,
            rigid_bodies: Vec::new(),
            cfl: constants::CFL,
            dt_min: constants::DT_MIN,
            dt_max: constants::DT_MAX,
        }
    }

    pub fn with_shape_order(mut self, order: [ShapeOrder; DIM]) -> Self {
        self.shape_order = order;
        self
    }

    pub fn with_uniform_shape_order(self, order: ShapeOrder) -> Self {
        self.with_shape_order([order; DIM])
    }

    pub fn with_axis_boundaries(mut self, axis: usize, boundaries: AxisBoundaries) -> Self {
        self.boundaries[axis] = boundaries;
        self
    }

    pub fn with_all_boundaries(mut self, condition: BoundaryCondition) -> Self {
        self.boundaries = [AxisBoundaries::new(condition, condition); DIM];
        self
    }

    pub fn with_level_set_wall(mut self, wall: LevelSetWall) -> Self {
        self.level_set_wall = Some(wall);
        self
    }

    /// Set the PIC weight. `validate` rejects values outside `[0, 1]`.
    pub fn with_alpha_pic_flip(mut self, alpha: Real) -> Self {
        self.alpha_pic_flip = alpha;
        self
    }

    pub fn with_mass_tolerance(mut self, tolerance: Real) -> Self {
        self.mass_tolerance = tolerance;
        self
    }

    pub fn with_gravity(mut self, gravity: Vector) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_external_load(mut self, load: ExternalLoad) -> Self {
        self.external_load = Some(load);
        self
    }

    pub fn with_rigid_body(mut self, body: RigidBodySpec) -> Self {
        self.rigid_bodies.push(body);
        self
    }

    pub fn with_timestep_limits(mut self, cfl: Real, dt_min: Real, dt_max: Real) -> Self {
        self.cfl = cfl;
        self.dt_min = dt_min;
        self.dt_max = dt_max;
        self
    }

    #[inline]
    pub fn is_periodic(&self, axis: usize) -> bool {
        self.boundaries[axis].lo.is_periodic()
    }

    pub fn periodic(&self) -> [bool; DIM] {
        [0, 1, 2].map(|axis| self.is_periodic(axis))
    }

    pub fn validate(&self) -> MpmResult<()> {
        for axis in 0..DIM {
            let faces = &self.boundaries[axis];
            if faces.lo.is_periodic() != faces.hi.is_periodic() {
                return Err(MpmError::PeriodicMismatch { axis });
            }
            if self.domain.cells[axis] == 0 {
                return Err(MpmError::invalid_params(format!("axis {axis} has no cells")));
            }
            if !(self.domain.cell_size[axis] > 0.0) {
                return Err(MpmError::invalid_params(format!(
                    "axis {axis} cell size must be positive"
                )));
            }
            let min_cells = match self.shape_order[axis] {
                ShapeOrder::Linear => 1,
                ShapeOrder::Cubic => 4,
            };
            if self.domain.cells[axis] < min_cells {
                return Err(MpmError::invalid_params(format!(
                    "axis {axis} needs at least {min_cells} cells for {:?} shape functions",
                    self.shape_order[axis]
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.alpha_pic_flip) {
            return Err(MpmError::invalid_params("alpha_pic_flip must lie in [0, 1]"));
        }
        if !(self.mass_tolerance >= 0.0) {
            return Err(MpmError::invalid_params("mass tolerance must be non-negative"));
        }
        if !(self.dt_min > 0.0 && self.dt_min <= self.dt_max) {
            return Err(MpmError::invalid_params("time-step limits must satisfy 0 < dt_min <= dt_max"));
        }

        for (i, body) in self.rigid_bodies.iter().enumerate() {
            if self.rigid_bodies[..i].iter().any(|other| other.id == body.id) {
                return Err(MpmError::invalid_params(format!(
                    "rigid body id {} configured twice",
                    body.id
                )));
            }
            if body.damping < 0.0 {
                return Err(MpmError::invalid_params(format!(
                    "rigid body {} has negative damping",
                    body.id
                )));
            }
        }
        Ok(())
    }
}
