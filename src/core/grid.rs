//! Background grid for MPM simulation
//!
//! Dense structured grid of `cells + 1` nodes per non-periodic axis and
//! `cells` nodes per periodic axis. Node fields are transient: they are zeroed
//! at the start of every step.

use bevy::prelude::IVec3;

use crate::config::SolverParams;
use crate::core::kernel::{AxisBasis, AxisStencil, MAX_AXIS_NODES};
use crate::error::MpmResult;
use crate::math::{DIM, Real, Vector, zero_vector};

/// Upper bound on nodes touched by one particle (cubic on every axis).
pub const MAX_STENCIL_NODES: usize = MAX_AXIS_NODES * MAX_AXIS_NODES * MAX_AXIS_NODES;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridNode {
    pub mass: Real,
    pub momentum: Vector,
    pub velocity: Vector,
    /// Velocity before force integration, for the FLIP increment.
    pub velocity_old: Vector,
    pub force_internal: Vector,
    pub force_external: Vector,
    /// Unit surface normal, zero in the interior of the material.
    pub normal: Vector,
    pub rigid_mass: Real,
    pub rigid_momentum: Vector,
}

impl GridNode {
    pub const ZERO: Self = Self {
        mass: 0.0,
        momentum: Vector::new(0.0, 0.0, 0.0),
        velocity: Vector::new(0.0, 0.0, 0.0),
        velocity_old: Vector::new(0.0, 0.0, 0.0),
        force_internal: Vector::new(0.0, 0.0, 0.0),
        force_external: Vector::new(0.0, 0.0, 0.0),
        normal: Vector::new(0.0, 0.0, 0.0),
        rigid_mass: 0.0,
        rigid_momentum: Vector::new(0.0, 0.0, 0.0),
    };

    #[inline(always)]
    pub fn zero(&mut self) {
        *self = Self::ZERO;
    }

    /// Nodes at or below the tolerance are inert.
    #[inline(always)]
    pub fn is_active(&self, mass_tolerance: Real) -> bool {
        self.mass > mass_tolerance
    }

    #[inline(always)]
    pub fn total_force(&self) -> Vector {
        self.force_internal + self.force_external
    }
}

impl Default for GridNode {
    fn default() -> Self {
        Self::ZERO
    }
}

/// One node of a particle's interpolation stencil.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StencilNode {
    /// Linear index into the grid's node storage (already wrapped).
    pub index: usize,
    pub weight: Real,
    /// Physical gradient of the weight with respect to particle position.
    pub gradient: Vector,
    /// `x_node - x_p`, unwrapped across periodic faces.
    pub distance: Vector,
}

impl StencilNode {
    pub const EMPTY: Self = Self {
        index: 0,
        weight: 0.0,
        gradient: Vector::new(0.0, 0.0, 0.0),
        distance: Vector::new(0.0, 0.0, 0.0),
    };
}

/// Tensor-product stencil of a single particle.
#[derive(Clone, Copy, Debug)]
pub struct Stencil {
    nodes: [StencilNode; MAX_STENCIL_NODES],
    len: usize,
}

impl Default for Stencil {
    fn default() -> Self {
        Self {
            nodes: [StencilNode::EMPTY; MAX_STENCIL_NODES],
            len: 0,
        }
    }
}

impl Stencil {
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = &StencilNode> {
        self.nodes[..self.len].iter()
    }

    #[inline(always)]
    fn push(&mut self, node: StencilNode) {
        self.nodes[self.len] = node;
        self.len += 1;
    }
}

#[derive(Clone, Debug)]
pub struct Grid {
    axes: [AxisBasis; DIM],
    node_dims: [usize; DIM],
    nodes: Vec<GridNode>,
}

impl Grid {
    /// Allocate the grid described by `params`. Parameters are assumed to be
    /// validated.
    pub fn new(params: &SolverParams) -> Self {
        let domain = &params.domain;
        let axes = [0, 1, 2].map(|d| AxisBasis {
            order: params.shape_order[d],
            periodic: params.is_periodic(d),
            lo: 0,
            hi: domain.cells[d] as i32 - 1,
            origin: domain.origin[d],
            cell_size: domain.cell_size[d],
        });
        let node_dims = [0, 1, 2].map(|d| {
            if axes[d].periodic {
                domain.cells[d]
            } else {
                domain.cells[d] + 1
            }
        });
        let node_count = node_dims.iter().product();

        Self {
            axes,
            node_dims,
            nodes: vec![GridNode::ZERO; node_count],
        }
    }

    pub fn axes(&self) -> &[AxisBasis; DIM] {
        &self.axes
    }

    pub fn node_dims(&self) -> [usize; DIM] {
        self.node_dims
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn cell_size(&self) -> Vector {
        Vector::new(
            self.axes[0].cell_size,
            self.axes[1].cell_size,
            self.axes[2].cell_size,
        )
    }

    pub fn origin(&self) -> Vector {
        Vector::new(self.axes[0].origin, self.axes[1].origin, self.axes[2].origin)
    }

    /// Lowest cell index per axis.
    pub fn lo(&self) -> IVec3 {
        IVec3::new(self.axes[0].lo, self.axes[1].lo, self.axes[2].lo)
    }

    /// Highest cell index per axis.
    pub fn hi(&self) -> IVec3 {
        IVec3::new(self.axes[0].hi, self.axes[1].hi, self.axes[2].hi)
    }

    #[inline(always)]
    pub fn is_periodic(&self, axis: usize) -> bool {
        self.axes[axis].periodic
    }

    /// Map an unwrapped node index onto storage along `axis`.
    #[inline(always)]
    pub fn wrap_index(&self, axis: usize, index: i32) -> usize {
        if self.axes[axis].periodic {
            index.rem_euclid(self.node_dims[axis] as i32) as usize
        } else {
            index as usize
        }
    }

    #[inline(always)]
    pub fn linear_index(&self, coord: IVec3) -> usize {
        let x = self.wrap_index(0, coord.x);
        let y = self.wrap_index(1, coord.y);
        let z = self.wrap_index(2, coord.z);
        x + self.node_dims[0] * (y + self.node_dims[1] * z)
    }

    #[inline(always)]
    pub fn coord_of(&self, linear: usize) -> IVec3 {
        let x = linear % self.node_dims[0];
        let rest = linear / self.node_dims[0];
        let y = rest % self.node_dims[1];
        let z = rest / self.node_dims[1];
        IVec3::new(x as i32, y as i32, z as i32)
    }

    pub fn node_position(&self, coord: IVec3) -> Vector {
        Vector::new(
            self.axes[0].node_position(coord.x),
            self.axes[1].node_position(coord.y),
            self.axes[2].node_position(coord.z),
        )
    }

    pub fn nodes(&self) -> &[GridNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [GridNode] {
        &mut self.nodes
    }

    pub fn node(&self, coord: IVec3) -> &GridNode {
        &self.nodes[self.linear_index(coord)]
    }

    pub fn node_mut(&mut self, coord: IVec3) -> &mut GridNode {
        let index = self.linear_index(coord);
        &mut self.nodes[index]
    }

    pub fn zero(&mut self) {
        self.nodes.iter_mut().for_each(GridNode::zero);
    }

    pub fn active_node_count(&self, mass_tolerance: Real) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.is_active(mass_tolerance))
            .count()
    }

    /// Total nodal momentum.
    pub fn total_momentum(&self) -> Vector {
        self.nodes
            .iter()
            .fold(zero_vector(), |acc, node| acc + node.momentum)
    }

    /// True if `position` lies within the extent of every non-periodic axis.
    pub fn contains(&self, position: &Vector) -> bool {
        (0..DIM).all(|d| {
            let axis = &self.axes[d];
            if axis.periodic {
                return true;
            }
            let upper = axis.node_position(axis.hi + 1);
            position[d] >= axis.origin && position[d] <= upper
        })
    }

    /// Wrap the periodic components of `position` into the domain.
    pub fn wrap_position(&self, position: &mut Vector) {
        for d in 0..DIM {
            let axis = &self.axes[d];
            if axis.periodic {
                let length = self.node_dims[d] as Real * axis.cell_size;
                let mut local = (position[d] - axis.origin).rem_euclid(length);
                // `rem_euclid` can round up to `length` for tiny negative inputs.
                if local >= length {
                    local = 0.0;
                }
                position[d] = axis.origin + local;
            }
        }
    }

    /// Interpolation stencil of a particle at `position`.
    pub fn stencil(&self, position: &Vector) -> MpmResult<Stencil> {
        let mut axis = [AxisStencil::default(); DIM];
        for d in 0..DIM {
            axis[d] = self.axes[d].stencil(position[d])?;
        }

        let mut stencil = Stencil::default();
        for nz in axis[2].iter() {
            for ny in axis[1].iter() {
                for nx in axis[0].iter() {
                    let weight = nx.weight * ny.weight * nz.weight;
                    let gradient = Vector::new(
                        nx.derivative * ny.weight * nz.weight,
                        nx.weight * ny.derivative * nz.weight,
                        nx.weight * ny.weight * nz.derivative,
                    );
                    stencil.push(StencilNode {
                        index: self.linear_index(IVec3::new(nx.index, ny.index, nz.index)),
                        weight,
                        gradient,
                        distance: Vector::new(nx.offset, ny.offset, nz.offset),
                    });
                }
            }
        }
        Ok(stencil)
    }
}
