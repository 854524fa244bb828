//! Rigid bodies embedded in the grid.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use mpm3d::math::{Real, Vector, zero_vector};
use mpm3d::{
    ConstitutiveModel, DomainSpec, MaterialParams, MpmError, MpmState, Particle, PositionUpdate,
    RigidBodySpec, SolverParams,
};

const DT: Real = 1e-3;

fn plate(state: &mut MpmState, id: u32, corner: Vector) {
    for i in 0..3 {
        for k in 0..3 {
            let position = corner + Vector::new(i as Real, 0.0, k as Real) * 0.25;
            state
                .add_particle(
                    Particle::new(position, ConstitutiveModel::LinearElastic)
                        .with_density(0.015625, 2700.0)
                        .with_rigid_body(id),
                )
                .unwrap();
        }
    }
}

fn fluid_block(state: &mut MpmState, corner: Vector) {
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                let position = corner + Vector::new(i as Real, j as Real, k as Real) * 0.25;
                state
                    .add_particle(
                        Particle::new(position, ConstitutiveModel::CompressibleFluid)
                            .with_density(0.015625, 1000.0)
                            .with_material(MaterialParams::fluid(1e4, 7.0, 1e-3)),
                    )
                    .unwrap();
            }
        }
    }
}

#[test]
fn prescribed_velocity_holds_under_load() {
    let imposed = Vector::new(0.0, -0.5, 0.0);
    let params = SolverParams::new(DomainSpec::cube(zero_vector(), 0.5, 16))
        .with_rigid_body(RigidBodySpec::imposed(3, imposed));
    let mut state = MpmState::new(params).unwrap();
    fluid_block(&mut state, Vector::new(3.1, 2.6, 3.1));
    plate(&mut state, 3, Vector::new(3.3, 3.7, 3.3));
    let start: Vec<Vector> = state.particles().iter().map(|p| p.position).collect();

    for step in 1..=50 {
        state.advance(DT).unwrap();
        let body = state.rigid_bodies().get(3).unwrap();
        assert_eq!(body.velocity, imposed, "step {step}");
    }

    let body = state.rigid_bodies().get(3).unwrap();
    assert_eq!(body.mode, PositionUpdate::Imposed);
    assert_eq!(body.num_particles, 9);
    assert!((body.total_mass - 9.0 * 0.015625 * 2700.0).abs() < 1e-9);
    // The plate sits on the fluid, which pushes back.
    assert!(body.force_internal.norm() > 0.0);

    let travelled = imposed * (50.0 * DT);
    for (particle, x0) in state.particles().iter().zip(&start) {
        if particle.is_rigid() {
            assert_eq!(particle.velocity, imposed);
            assert!((particle.position - (x0 + travelled)).norm() < 1e-12);
        }
    }

    let report = state.diagnostics();
    assert_eq!(report.rigid_bodies.len(), 1);
    assert_eq!(report.rigid_bodies[0].velocity, imposed);
    assert!((report.material_mass - 64.0 * 15.625).abs() < 1e-9);
}

#[test]
fn isolated_dynamic_body_falls_with_gravity() {
    let params = SolverParams::new(DomainSpec::cube(zero_vector(), 0.5, 16))
        .with_rigid_body(RigidBodySpec::dynamic(0))
        .with_rigid_body(RigidBodySpec::dynamic(1).without_weight());
    let mut state = MpmState::new(params).unwrap();
    plate(&mut state, 0, Vector::new(2.1, 5.1, 2.1));
    plate(&mut state, 1, Vector::new(5.1, 5.1, 5.1));

    for _ in 0..20 {
        state.advance(DT).unwrap();
    }

    let g = state.solver_params().gravity;
    let falling = state.rigid_bodies().get(0).unwrap();
    assert!((falling.velocity - g * (20.0 * DT)).norm() < 1e-12);
    assert!((falling.force_external - g * falling.total_mass).norm() < 1e-9);
    let floating = state.rigid_bodies().get(1).unwrap();
    assert_eq!(floating.velocity, zero_vector());
    for particle in state.particles() {
        match particle.rigid_body {
            Some(0) => assert_eq!(particle.velocity, falling.velocity),
            Some(1) => assert_eq!(particle.velocity, zero_vector()),
            _ => unreachable!(),
        }
    }
}

#[test]
fn grid_nodes_under_a_body_move_with_it() {
    let imposed = Vector::new(0.3, 0.0, 0.0);
    let params = SolverParams::new(DomainSpec::cube(zero_vector(), 0.5, 16))
        .with_rigid_body(RigidBodySpec::imposed(0, imposed));
    let mut state = MpmState::new(params).unwrap();
    plate(&mut state, 0, Vector::new(4.1, 4.1, 4.1));
    state.advance(DT).unwrap();

    let tolerance = state.solver_params().mass_tolerance;
    let covered: Vec<_> = state
        .grid()
        .nodes()
        .iter()
        .filter(|node| node.rigid_mass > tolerance)
        .collect();
    assert!(!covered.is_empty());
    for node in covered {
        assert!((node.velocity - imposed).norm() < 1e-12);
    }
}

#[test]
fn particles_of_unconfigured_bodies_are_rejected() {
    let params = SolverParams::new(DomainSpec::cube(zero_vector(), 0.5, 16));
    let mut state = MpmState::new(params).unwrap();
    let stray = Particle::new(Vector::new(2.0, 2.0, 2.0), ConstitutiveModel::LinearElastic).with_rigid_body(4);
    assert_eq!(state.add_particle(stray), Err(MpmError::UnknownRigidBody(4)));
}
