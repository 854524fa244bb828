/// Simple custom benchmarking without criterion
use std::time::Instant;

use mpm3d::math::{Real, Vector, zero_vector};
use mpm3d::solver::p2g;
use mpm3d::{ConstitutiveModel, DomainSpec, MpmState, Particle, ShapeOrder, SolverParams};

fn time_it<F: FnMut()>(name: &str, iterations: usize, mut f: F) {
    // Warmup
    for _ in 0..5 {
        f();
    }

    let start = Instant::now();
    for _ in 0..iterations {
        f();
    }
    let elapsed = start.elapsed();

    let avg_ms = elapsed.as_secs_f64() * 1000.0 / iterations as f64;
    println!("{}: {:.3}ms avg ({} iterations)", name, avg_ms, iterations);
}

fn create_test_particles(count: usize) -> Vec<Particle> {
    let side = (count as f64).cbrt().ceil() as usize;
    let mut particles = Vec::with_capacity(count);

    'fill: for x in 0..side {
        for y in 0..side {
            for z in 0..side {
                if particles.len() >= count {
                    break 'fill;
                }
                let position = Vector::new(x as Real, y as Real, z as Real) * 0.25 + Vector::repeat(4.0);
                particles.push(
                    Particle::new(position, ConstitutiveModel::CompressibleFluid)
                        .with_density(0.015625, 1000.0)
                        .with_velocity(Vector::new(0.1, -0.2, 0.0)),
                );
            }
        }
    }

    particles
}

fn create_state(count: usize, order: ShapeOrder) -> MpmState {
    let params = SolverParams::new(DomainSpec::cube(zero_vector(), 0.5, 64)).with_uniform_shape_order(order);
    let mut state = match MpmState::new(params) {
        Ok(state) => state,
        Err(err) => panic!("benchmark setup: {err}"),
    };
    if let Err(err) = state.add_particles(create_test_particles(count)) {
        panic!("benchmark setup: {err}");
    }
    state
}

fn main() {
    println!("\n=== MPM3D Benchmarks ===\n");

    println!("--- Mass/momentum scatter ---");
    for order in [ShapeOrder::Linear, ShapeOrder::Cubic] {
        for &count in &[1000, 8000, 27000] {
            let state = create_state(count, order);
            let mut grid = state.grid().clone();
            let mut particle_set = state.particle_set().clone();
            if let Err(err) = particle_set.rebuild_stencils(&grid) {
                panic!("benchmark setup: {err}");
            }

            time_it(&format!("scatter_mass_momentum {:?} (n={})", order, count), 20, || {
                grid.zero();
                let (particles, stencils) = particle_set.particles_and_stencils();
                if let Err(err) = p2g::scatter_mass_momentum(&mut grid, particles, stencils) {
                    panic!("scatter failed: {err}");
                }
            });
        }
    }

    println!("\n--- Full step ---");
    for order in [ShapeOrder::Linear, ShapeOrder::Cubic] {
        for &count in &[1000, 8000, 27000] {
            let mut state = create_state(count, order);

            time_it(&format!("advance {:?} (n={})", order, count), 10, || {
                if let Err(err) = state.advance(1e-5) {
                    panic!("step failed: {err}");
                }
            });
        }
    }

    println!("\n=== Benchmark Complete ===\n");
}
