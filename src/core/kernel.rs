//! Grid-node basis functions.
//!
//! Every 3-D weight is the product of three 1-D evaluations, so each axis can
//! pick its own order. Offsets `z` are measured from the node to the particle
//! in cell units: `z = (x_p - x_node) / dx`.
//!
//! The cubic family uses four boundary-aware pieces so that the weights still
//! sum to one next to a non-periodic domain face:
//!
//! | type | node position              | support     |
//! |------|----------------------------|-------------|
//! | 1    | on the low or high face    | `[-2, 2]`   |
//! | 2    | one node in from low face  | `[-1, 2]`   |
//! | 3    | interior / any periodic    | `[-2, 2]`   |
//! | 4    | one node in from high face | `[-2, 1]`   |

use bevy::math::IVec3;

use crate::config::constants::SUPPORT_EPSILON;
use crate::error::{MpmError, MpmResult};
use crate::math::{DIM, Real, Vector};

/// Maximum nodes per axis touched by one particle (cubic).
pub const MAX_AXIS_NODES: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeOrder {
    /// Bilinear/trilinear tent, 2 nodes per axis.
    Linear,
    /// Cubic B-spline, 4 nodes per axis.
    Cubic,
}

impl ShapeOrder {
    #[inline]
    pub fn nodes_per_axis(self) -> usize {
        match self {
            Self::Linear => 2,
            Self::Cubic => 4,
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            Self::Linear => 1,
            Self::Cubic => 3,
        }
    }
}

impl TryFrom<i32> for ShapeOrder {
    type Error = MpmError;

    fn try_from(value: i32) -> MpmResult<Self> {
        match value {
            1 => Ok(Self::Linear),
            3 => Ok(Self::Cubic),
            other => Err(MpmError::InvalidShapeOrder(other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubicNodeType {
    Boundary,
    NearBoundaryLow,
    Interior,
    NearBoundaryHigh,
}

impl CubicNodeType {
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Boundary => 1,
            Self::NearBoundaryLow => 2,
            Self::Interior => 3,
            Self::NearBoundaryHigh => 4,
        }
    }

    /// Closed support interval in cell units.
    pub fn support(self) -> (Real, Real) {
        match self {
            Self::Boundary | Self::Interior => (-2.0, 2.0),
            Self::NearBoundaryLow => (-1.0, 2.0),
            Self::NearBoundaryHigh => (-2.0, 1.0),
        }
    }
}

impl TryFrom<i32> for CubicNodeType {
    type Error = MpmError;

    fn try_from(value: i32) -> MpmResult<Self> {
        match value {
            1 => Ok(Self::Boundary),
            2 => Ok(Self::NearBoundaryLow),
            3 => Ok(Self::Interior),
            4 => Ok(Self::NearBoundaryHigh),
            other => Err(MpmError::InvalidShapeFunctionType(other)),
        }
    }
}

/// Classify node `index` along an axis whose cells span `lo..=hi`.
///
/// Node `hi + 1` is the ghost node on the high face and is grouped with `lo`,
/// while node `hi` alone is the high near-boundary node. Periodic axes are
/// interior everywhere.
#[inline]
pub fn classify_node(index: i32, lo: i32, hi: i32, periodic: bool) -> CubicNodeType {
    if periodic {
        CubicNodeType::Interior
    } else if index == lo || index == hi + 1 {
        CubicNodeType::Boundary
    } else if index == lo + 1 {
        CubicNodeType::NearBoundaryLow
    } else if index == hi {
        CubicNodeType::NearBoundaryHigh
    } else {
        CubicNodeType::Interior
    }
}

/// Snap `z` into `[min, max]` when it only overshoots by round-off.
#[inline]
fn within_support(node_type: i32, z: Real, min: Real, max: Real) -> MpmResult<Real> {
    if z >= min && z <= max {
        Ok(z)
    } else if z >= min - SUPPORT_EPSILON && z <= max + SUPPORT_EPSILON {
        Ok(z.clamp(min, max))
    } else {
        Err(MpmError::ShapeFunctionOutOfSupport { node_type, z })
    }
}

/// 1-D cubic weight of a node of type `node_type` at offset `z`.
pub fn cubic_spline_1d(node_type: CubicNodeType, z: Real) -> MpmResult<Real> {
    let (min, max) = node_type.support();
    let z = within_support(node_type.as_i32(), z, min, max)?;
    let z2 = z * z;
    let z3 = z2 * z;

    let value = match node_type {
        CubicNodeType::Boundary => {
            if z <= -1.0 {
                z3 / 6.0 + z2 + 2.0 * z + 4.0 / 3.0
            } else if z <= 0.0 {
                -z3 / 6.0 + z + 1.0
            } else if z <= 1.0 {
                z3 / 6.0 - z + 1.0
            } else {
                -z3 / 6.0 + z2 - 2.0 * z + 4.0 / 3.0
            }
        }
        CubicNodeType::NearBoundaryLow => {
            if z <= 0.0 {
                -z3 / 3.0 - z2 + 2.0 / 3.0
            } else if z <= 1.0 {
                z3 / 2.0 - z2 + 2.0 / 3.0
            } else {
                -z3 / 6.0 + z2 - 2.0 * z + 4.0 / 3.0
            }
        }
        CubicNodeType::Interior => {
            if z <= -1.0 {
                z3 / 6.0 + z2 + 2.0 * z + 4.0 / 3.0
            } else if z <= 0.0 {
                -z3 / 2.0 - z2 + 2.0 / 3.0
            } else if z <= 1.0 {
                z3 / 2.0 - z2 + 2.0 / 3.0
            } else {
                -z3 / 6.0 + z2 - 2.0 * z + 4.0 / 3.0
            }
        }
        CubicNodeType::NearBoundaryHigh => {
            if z <= -1.0 {
                z3 / 6.0 + z2 + 2.0 * z + 4.0 / 3.0
            } else if z <= 0.0 {
                -z3 / 2.0 - z2 + 2.0 / 3.0
            } else {
                z3 / 3.0 - z2 + 2.0 / 3.0
            }
        }
    };
    Ok(value)
}

/// `d/dz` of [`cubic_spline_1d`], in cell units.
pub fn cubic_spline_1d_derivative(node_type: CubicNodeType, z: Real) -> MpmResult<Real> {
    let (min, max) = node_type.support();
    let z = within_support(node_type.as_i32(), z, min, max)?;
    let z2 = z * z;

    let value = match node_type {
        CubicNodeType::Boundary => {
            if z <= -1.0 {
                z2 / 2.0 + 2.0 * z + 2.0
            } else if z <= 0.0 {
                -z2 / 2.0 + 1.0
            } else if z <= 1.0 {
                z2 / 2.0 - 1.0
            } else {
                -z2 / 2.0 + 2.0 * z - 2.0
            }
        }
        CubicNodeType::NearBoundaryLow => {
            if z <= 0.0 {
                -z2 - 2.0 * z
            } else if z <= 1.0 {
                1.5 * z2 - 2.0 * z
            } else {
                -z2 / 2.0 + 2.0 * z - 2.0
            }
        }
        CubicNodeType::Interior => {
            if z <= -1.0 {
                z2 / 2.0 + 2.0 * z + 2.0
            } else if z <= 0.0 {
                -1.5 * z2 - 2.0 * z
            } else if z <= 1.0 {
                1.5 * z2 - 2.0 * z
            } else {
                -z2 / 2.0 + 2.0 * z - 2.0
            }
        }
        CubicNodeType::NearBoundaryHigh => {
            if z <= -1.0 {
                z2 / 2.0 + 2.0 * z + 2.0
            } else if z <= 0.0 {
                -1.5 * z2 - 2.0 * z
            } else {
                z2 - 2.0 * z
            }
        }
    };
    Ok(value)
}

/// Tent weight `1 - |z|`.
#[inline]
pub fn tent_1d(z: Real) -> MpmResult<Real> {
    let z = within_support(ShapeOrder::Linear.as_i32(), z, -1.0, 1.0)?;
    Ok(1.0 - z.abs())
}

/// Tent slope in cell units: `-1` for the node below the particle, `+1` above.
#[inline]
pub fn tent_1d_derivative(z: Real) -> MpmResult<Real> {
    let z = within_support(ShapeOrder::Linear.as_i32(), z, -1.0, 1.0)?;
    Ok(if z >= 0.0 { -1.0 } else { 1.0 })
}

/// Basis configuration of one axis of the (sub-)domain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisBasis {
    pub order: ShapeOrder,
    pub periodic: bool,
    /// First cell index.
    pub lo: i32,
    /// Last cell index.
    pub hi: i32,
    pub origin: Real,
    pub cell_size: Real,
}

/// One node of a 1-D stencil.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisNode {
    /// Unwrapped node index (may lie outside `lo..=hi+1` on periodic axes).
    pub index: i32,
    pub weight: Real,
    /// Physical derivative `dN/dx`.
    pub derivative: Real,
    /// `x_node - x_p` in physical units.
    pub offset: Real,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AxisStencil {
    pub nodes: [AxisNode; MAX_AXIS_NODES],
    pub len: usize,
}

impl AxisStencil {
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &AxisNode> {
        self.nodes[..self.len].iter()
    }
}

impl AxisBasis {
    #[inline]
    pub fn node_position(&self, index: i32) -> Real {
        self.origin + index as Real * self.cell_size
    }

    /// Cell containing `x`. Non-periodic axes clamp onto `lo..=hi` so a
    /// particle sitting on the high face still owns the last cell.
    #[inline]
    pub fn cell_of(&self, x: Real) -> i32 {
        let cell = ((x - self.origin) / self.cell_size).floor() as i32;
        if self.periodic {
            cell
        } else {
            cell.clamp(self.lo, self.hi)
        }
    }

    /// Weight and physical derivative of `node` for a particle at offset `z`.
    pub fn evaluate(&self, node: i32, z: Real) -> MpmResult<(Real, Real)> {
        let inv_dx = 1.0 / self.cell_size;
        match self.order {
            ShapeOrder::Linear => Ok((tent_1d(z)?, tent_1d_derivative(z)? * inv_dx)),
            ShapeOrder::Cubic => {
                let node_type = classify_node(node, self.lo, self.hi, self.periodic);
                Ok((
                    cubic_spline_1d(node_type, z)?,
                    cubic_spline_1d_derivative(node_type, z)? * inv_dx,
                ))
            }
        }
    }

    /// Nodes along this axis whose support covers `x`.
    pub fn stencil(&self, x: Real) -> MpmResult<AxisStencil> {
        let cell = self.cell_of(x);
        let (first, last) = match self.order {
            ShapeOrder::Linear => (cell, cell + 1),
            ShapeOrder::Cubic if self.periodic => (cell - 1, cell + 2),
            ShapeOrder::Cubic => ((cell - 1).max(self.lo), (cell + 2).min(self.hi + 1)),
        };

        let mut stencil = AxisStencil::default();
        for index in first..=last {
            let node_x = self.node_position(index);
            let z = (x - node_x) / self.cell_size;
            let (weight, derivative) = self.evaluate(index, z)?;
            stencil.nodes[stencil.len] = AxisNode {
                index,
                weight,
                derivative,
                offset: node_x - x,
            };
            stencil.len += 1;
        }
        Ok(stencil)
    }
}

/// Offsets of `node` from `position`, in cell units, per axis.
#[inline]
fn node_offsets(axes: &[AxisBasis; DIM], node: IVec3, position: &Vector) -> [Real; DIM] {
    let node = node.to_array();
    [0, 1, 2].map(|d| (position[d] - axes[d].node_position(node[d])) / axes[d].cell_size)
}

/// 3-D weight of `node` for a particle at `position`.
pub fn basis_value(axes: &[AxisBasis; DIM], node: IVec3, position: &Vector) -> MpmResult<Real> {
    let z = node_offsets(axes, node, position);
    let node = node.to_array();
    let mut value = 1.0;
    for d in 0..DIM {
        value *= axes[d].evaluate(node[d], z[d])?.0;
    }
    Ok(value)
}

/// 3-D gradient of the weight of `node` with respect to position.
///
/// Component `d` uses the derivative kernel on axis `d` and the plain weight
/// on the other two.
pub fn basis_gradient(axes: &[AxisBasis; DIM], node: IVec3, position: &Vector) -> MpmResult<Vector> {
    let z = node_offsets(axes, node, position);
    let node = node.to_array();
    let mut weights = [0.0; DIM];
    let mut derivatives = [0.0; DIM];
    for d in 0..DIM {
        (weights[d], derivatives[d]) = axes[d].evaluate(node[d], z[d])?;
    }
    Ok(Vector::new(
        derivatives[0] * weights[1] * weights[2],
        weights[0] * derivatives[1] * weights[2],
        weights[0] * weights[1] * derivatives[2],
    ))
}

/// Alternative particle-representation kernels used for smoothing and
/// diagnostics. They are not part of the P2G/G2P transfer.
pub mod auxiliary {
    use std::f64::consts::PI;

    use crate::math::{Real, Vector};

    /// Normalized 3-D Gaussian of radius `r0`.
    pub fn spherical_gaussian(xi: &Vector, xp: &Vector, r0: Real) -> Real {
        let r2 = (xi - xp).norm_squared();
        (-r2 / (r0 * r0)).exp() * PI.powf(-1.5) * r0.powi(-3)
    }

    /// Indicator of the open ball of radius `r0`.
    pub fn box_kernel(xi: &Vector, xp: &Vector, r0: Real) -> Real {
        if (xi - xp).norm_squared() < r0 * r0 { 1.0 } else { 0.0 }
    }

    /// Unit-area hat of full width `hat_size`.
    pub fn hat_1d(xi: Real, xp: Real, hat_size: Real) -> Real {
        let zeta = xi - xp;
        let half = 0.5 * hat_size;
        if zeta.abs() >= half {
            return 0.0;
        }
        let peak = 1.0 / half;
        let slope = 4.0 / (hat_size * hat_size);
        peak - slope * zeta.abs()
    }

    pub fn hat_3d(xi: &Vector, xp: &Vector, hat_size: &Vector) -> Real {
        (0..3).map(|d| hat_1d(xi[d], xp[d], hat_size[d])).product()
    }
}
