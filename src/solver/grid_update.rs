use crate::core::Grid;
use crate::math::{Real, zero_vector};

/// Grid velocity from momentum (mass-gated). Inert nodes get zero velocity.
pub fn compute_velocities(grid: &mut Grid, mass_tolerance: Real) {
    for node in grid.nodes_mut() {
        node.velocity = if node.is_active(mass_tolerance) {
            node.momentum / node.mass
        } else {
            zero_vector()
        };
    }
}

/// Keep the pre-force velocity for the FLIP increment.
pub fn store_old_velocities(grid: &mut Grid) {
    for node in grid.nodes_mut() {
        node.velocity_old = node.velocity;
    }
}

/// Grid update stage: `v += f / m * dt` on active nodes.
pub fn integrate_forces(grid: &mut Grid, dt: Real, mass_tolerance: Real) {
    for node in grid.nodes_mut() {
        if node.is_active(mass_tolerance) {
            let acceleration = node.total_force() / node.mass;
            node.velocity += acceleration * dt;
        }
    }
}
