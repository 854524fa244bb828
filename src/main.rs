use std::time::Duration;

use bevy::app::AppExit;
use bevy::log::{LogPlugin, error, info};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mpm3d::{
    BoundaryCondition, ConstitutiveModel, DomainSpec, MaterialParams, MpmPlugin, MpmState,
    Particle, RigidBodySpec, ShapeOrder, SolverParams,
};
use mpm3d::math::{Real, Vector, zero_vector};

const CELL_SIZE: Real = 0.05;
const CELLS: usize = 24;
const PARTICLES_PER_AXIS: usize = 12;
const STEPS: u64 = 300;
const TIMESTEP: f64 = 1e-4;

fn demo_params() -> SolverParams {
    SolverParams::new(DomainSpec::cube(zero_vector(), CELL_SIZE, CELLS))
        .with_uniform_shape_order(ShapeOrder::Cubic)
        .with_all_boundaries(BoundaryCondition::slip(0.1))
        .with_rigid_body(RigidBodySpec::imposed(0, Vector::new(0.0, -0.5, 0.0)))
}

/// A jittered water block in one corner and a small plate pressing from above.
fn spawn_scene(mut state: ResMut<MpmState>) {
    let mut rng = StdRng::seed_from_u64(42);
    let spacing = CELL_SIZE * 0.5;
    let volume = spacing * spacing * spacing;
    let corner = Vector::repeat(3.0 * CELL_SIZE);
    let water = MaterialParams::fluid(2e5, 7.0, 1e-3);

    let mut block = Vec::new();
    for i in 0..PARTICLES_PER_AXIS {
        for j in 0..PARTICLES_PER_AXIS {
            for k in 0..PARTICLES_PER_AXIS {
                let lattice = Vector::new(i as Real, j as Real, k as Real) + Vector::repeat(0.5);
                let jitter = Vector::from_fn(|_, _| rng.random_range(-0.2..0.2));
                block.push(
                    Particle::new(corner + (lattice + jitter) * spacing, ConstitutiveModel::CompressibleFluid)
                        .with_density(volume, 1000.0)
                        .with_material(water),
                );
            }
        }
    }

    let plate_height = corner.y + (PARTICLES_PER_AXIS as Real + 2.0) * spacing;
    for i in 0..PARTICLES_PER_AXIS {
        for k in 0..PARTICLES_PER_AXIS {
            let position = Vector::new(
                corner.x + (i as Real + 0.5) * spacing,
                plate_height,
                corner.z + (k as Real + 0.5) * spacing,
            );
            block.push(
                Particle::new(position, ConstitutiveModel::LinearElastic)
                    .with_density(volume, 2700.0)
                    .with_rigid_body(0),
            );
        }
    }

    match state.add_particles(block) {
        Ok(()) => {
            info!("spawned {} particles", state.particle_count());
            info!("advisory timestep {:.3e}s", state.estimate_timestep());
        }
        Err(err) => error!("scene setup failed: {err}"),
    }
}

fn report(state: Res<MpmState>, mut exit: MessageWriter<AppExit>) {
    if let Some(err) = state.last_error() {
        error!("simulation failed: {err}");
        exit.write(AppExit::error());
        return;
    }
    if state.step() > 0 && state.step() % 50 == 0 {
        let diagnostics = state.diagnostics();
        info!(
            "step {} t={:.4}s kinetic {:.4e} strain {:.4e} peak stress {:.4e} com velocity {:?}",
            diagnostics.step,
            diagnostics.time,
            diagnostics.kinetic_energy,
            diagnostics.strain_energy,
            diagnostics.peak_stress,
            diagnostics.center_of_mass_velocity
        );
        for body in &diagnostics.rigid_bodies {
            info!("  rigid body {} net force {:?}", body.id, body.net_force);
        }
    }
    if state.step() >= STEPS {
        exit.write(AppExit::Success);
    }
}

fn main() -> AppExit {
    App::new()
        .add_plugins(MinimalPlugins)
        .add_plugins(LogPlugin::default())
        .insert_resource(Time::<Fixed>::from_duration(Duration::from_secs_f64(TIMESTEP)))
        .add_plugins(MpmPlugin::new(demo_params()))
        .add_systems(Startup, spawn_scene)
        .add_systems(Update, report)
        .run()
}
