//! Nodal boundary conditions
//!
//! Domain walls act on the nodes lying on a non-periodic face. An optional
//! level set marks solid geometry embedded in the domain.

use crate::config::{BoundaryCondition, LevelSetWall, SolverParams, WallKind};
use crate::core::Grid;
use crate::math::{DIM, Real, Vector, zero_vector};

/// Signed-distance description of embedded solid geometry.
///
/// Negative inside the solid. `normal` is the unit gradient of the distance,
/// i.e. it points out of the solid.
pub trait LevelSet: Send + Sync {
    fn signed_distance(&self, position: &Vector) -> Real;
    fn normal(&self, position: &Vector) -> Vector;
}

/// Solid filling everything behind a plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HalfSpace {
    pub point: Vector,
    /// Unit normal pointing away from the solid.
    pub normal: Vector,
}

impl HalfSpace {
    pub fn new(point: Vector, normal: Vector) -> Self {
        let norm = normal.norm();
        Self {
            point,
            normal: if norm > 0.0 { normal / norm } else { normal },
        }
    }
}

impl LevelSet for HalfSpace {
    fn signed_distance(&self, position: &Vector) -> Real {
        (position - self.point).dot(&self.normal)
    }

    fn normal(&self, _position: &Vector) -> Vector {
        self.normal
    }
}

/// Wall response for a node velocity relative to the wall.
///
/// `normal` points from the wall into the material. No-slip removes the
/// relative velocity; slip removes its normal part and shrinks the tangential
/// part by `friction * |v_n|`, never reversing it.
#[inline]
pub fn wall_response(relative: Vector, normal: &Vector, kind: WallKind, friction: Real) -> Vector {
    match kind {
        WallKind::NoSlip => zero_vector(),
        WallKind::Slip => {
            let normal_speed = relative.dot(normal);
            let tangential = relative - normal * normal_speed;
            let tangential_speed = tangential.norm();
            if tangential_speed <= 0.0 {
                return zero_vector();
            }
            let reduced = tangential_speed - friction * normal_speed.abs();
            if reduced > 0.0 {
                tangential * (reduced / tangential_speed)
            } else {
                zero_vector()
            }
        }
    }
}

#[inline]
fn apply_condition(velocity: &mut Vector, normal: &Vector, condition: &BoundaryCondition) {
    match *condition {
        BoundaryCondition::Periodic => {}
        BoundaryCondition::SlipWall {
            friction,
            wall_velocity,
        } => {
            *velocity = wall_velocity
                + wall_response(*velocity - wall_velocity, normal, WallKind::Slip, friction);
        }
        BoundaryCondition::NoSlipWall { wall_velocity } => {
            *velocity = wall_velocity;
        }
    }
}

/// Apply the face conditions to every active node on a non-periodic face.
pub fn apply_domain_walls(grid: &mut Grid, params: &SolverParams) {
    let lo = grid.lo();
    let hi = grid.hi();
    let tolerance = params.mass_tolerance;
    let periodic = params.periodic();
    if periodic.iter().all(|&p| p) {
        return;
    }

    for linear in 0..grid.node_count() {
        let coord = grid.coord_of(linear).to_array();
        let node = &mut grid.nodes_mut()[linear];
        if !node.is_active(tolerance) {
            continue;
        }
        for d in 0..DIM {
            if periodic[d] {
                continue;
            }
            let mut normal = zero_vector();
            if coord[d] == lo.to_array()[d] {
                normal[d] = 1.0;
                apply_condition(&mut node.velocity, &normal, &params.boundaries[d].lo);
            }
            if coord[d] == hi.to_array()[d] + 1 {
                normal[d] = -1.0;
                apply_condition(&mut node.velocity, &normal, &params.boundaries[d].hi);
            }
        }
    }
}

/// Apply the level-set wall to active nodes inside the solid that move into it.
pub fn apply_level_set(grid: &mut Grid, level_set: &dyn LevelSet, wall: &LevelSetWall, mass_tolerance: Real) {
    for linear in 0..grid.node_count() {
        let position = grid.node_position(grid.coord_of(linear));
        let node = &mut grid.nodes_mut()[linear];
        if !node.is_active(mass_tolerance) || level_set.signed_distance(&position) > 0.0 {
            continue;
        }
        let normal = level_set.normal(&position);
        if node.velocity.dot(&normal) < 0.0 {
            node.velocity = wall_response(node.velocity, &normal, wall.kind, wall.friction);
        }
    }
}

/// All configured nodal boundary conditions.
pub fn apply_boundaries(grid: &mut Grid, params: &SolverParams, level_set: Option<&dyn LevelSet>) {
    apply_domain_walls(grid, params);
    if let (Some(level_set), Some(wall)) = (level_set, &params.level_set_wall) {
        apply_level_set(grid, level_set, wall, params.mass_tolerance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AxisBoundaries, DomainSpec};
    use bevy::prelude::IVec3;

    fn grid_with(params: &SolverParams, coord: IVec3, velocity: Vector) -> Grid {
        let mut grid = Grid::new(params);
        let node = grid.node_mut(coord);
        node.mass = 1.0;
        node.velocity = velocity;
        grid
    }

    #[test]
    fn slip_wall_friction() {
        let normal = Vector::new(0.0, 1.0, 0.0);
        let v = wall_response(Vector::new(3.0, -2.0, 0.0), &normal, WallKind::Slip, 0.5);
        assert!((v - Vector::new(2.0, 0.0, 0.0)).norm() < 1e-14);
        let v = wall_response(Vector::new(0.5, -2.0, 0.0), &normal, WallKind::Slip, 0.5);
        assert_eq!(v, zero_vector());
        let v = wall_response(Vector::new(1.0, 4.0, 0.0), &normal, WallKind::NoSlip, 0.5);
        assert_eq!(v, zero_vector());
    }

    #[test]
    fn floor_node_loses_normal_velocity() {
        let params = SolverParams::new(DomainSpec::cube(zero_vector(), 1.0, 4))
            .with_all_boundaries(BoundaryCondition::slip(0.0));
        let coord = IVec3::new(2, 0, 2);
        let mut grid = grid_with(&params, coord, Vector::new(1.0, -3.0, 0.5));
        apply_domain_walls(&mut grid, &params);
        assert_eq!(grid.node(coord).velocity, Vector::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn moving_no_slip_lid() {
        let lid = Vector::new(2.0, 0.0, 0.0);
        let params = SolverParams::new(DomainSpec::cube(zero_vector(), 1.0, 4)).with_axis_boundaries(
            1,
            AxisBoundaries::new(
                BoundaryCondition::no_slip(),
                BoundaryCondition::NoSlipWall { wall_velocity: lid },
            ),
        );
        let coord = IVec3::new(2, 4, 2);
        let mut grid = grid_with(&params, coord, Vector::new(0.0, 1.0, 0.0));
        apply_domain_walls(&mut grid, &params);
        assert_eq!(grid.node(coord).velocity, lid);
    }

    #[test]
    fn periodic_axes_and_interior_nodes_are_untouched() {
        let params = SolverParams::new(DomainSpec::cube(zero_vector(), 1.0, 4))
            .with_axis_boundaries(0, AxisBoundaries::periodic());
        let velocity = Vector::new(-1.0, 2.0, 3.0);
        let mut grid = grid_with(&params, IVec3::new(0, 2, 2), velocity);
        apply_domain_walls(&mut grid, &params);
        assert_eq!(grid.node(IVec3::new(0, 2, 2)).velocity, velocity);
    }

    #[test]
    fn level_set_only_acts_inside_and_inward() {
        let params = SolverParams::new(DomainSpec::cube(zero_vector(), 1.0, 8))
            .with_level_set_wall(LevelSetWall::default());
        let ground = HalfSpace::new(Vector::new(0.0, 2.0, 0.0), Vector::new(0.0, 2.0, 0.0));
        let inside = IVec3::new(4, 1, 4);
        let outside = IVec3::new(4, 3, 4);
        let mut grid = Grid::new(&params);
        for coord in [inside, outside] {
            let node = grid.node_mut(coord);
            node.mass = 1.0;
            node.velocity = Vector::new(1.0, -1.0, 0.0);
        }
        grid.node_mut(IVec3::new(4, 2, 5)).mass = 1.0;
        grid.node_mut(IVec3::new(4, 2, 5)).velocity = Vector::new(0.0, 1.0, 0.0);

        apply_boundaries(&mut grid, &params, Some(&ground));
        assert_eq!(grid.node(inside).velocity, zero_vector());
        assert_eq!(grid.node(outside).velocity, Vector::new(1.0, -1.0, 0.0));
        // Separating from the surface is allowed.
        assert_eq!(grid.node(IVec3::new(4, 2, 5)).velocity, Vector::new(0.0, 1.0, 0.0));
    }
}
