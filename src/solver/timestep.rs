use rayon::prelude::*;

use crate::config::SolverParams;
use crate::core::Particle;
use crate::math::Real;

/// Largest signal speed `c + |v|` over the deformable particles.
pub fn max_signal_speed(particles: &[Particle]) -> Real {
    particles
        .par_iter()
        .filter(|p| !p.is_rigid())
        .map(|p| p.model.wave_speed(&p.material, p.density) + p.velocity.norm())
        .reduce(|| 0.0, Real::max)
}

/// CFL-limited step size, clamped to `[dt_min, dt_max]`.
///
/// Advisory only: the solver never changes the step it is given.
pub fn estimate_timestep(particles: &[Particle], params: &SolverParams) -> Real {
    let cell = params.domain.cell_size.min();
    let speed = max_signal_speed(particles);
    let dt = if speed > 0.0 {
        params.cfl * cell / speed
    } else {
        params.dt_max
    };
    dt.clamp(params.dt_min, params.dt_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DomainSpec;
    use crate::materials::{ConstitutiveModel, MaterialParams};
    use crate::math::{Vector, zero_vector};

    fn params() -> SolverParams {
        SolverParams::new(DomainSpec::new(
            zero_vector(),
            Vector::new(0.5, 0.25, 1.0),
            [8, 8, 8],
        ))
        .with_timestep_limits(0.5, 1e-6, 1.0)
    }

    #[test]
    fn fluid_sound_speed_limits_the_step() {
        // c = sqrt(K γ / ρ) = sqrt(1e5 * 1 / 1000) = 10
        let particle = Particle::new(zero_vector(), ConstitutiveModel::CompressibleFluid)
            .with_density(1.0, 1000.0)
            .with_material(MaterialParams::fluid(1e5, 1.0, 0.0))
            .with_velocity(Vector::new(0.0, 2.0, 0.0));
        let dt = estimate_timestep(&[particle], &params());
        assert!((dt - 0.5 * 0.25 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn still_viscous_material_takes_the_upper_limit() {
        let particle = Particle::new(zero_vector(), ConstitutiveModel::Viscous).with_density(1.0, 1000.0);
        assert_eq!(estimate_timestep(&[particle], &params()), 1.0);
    }

    #[test]
    fn fast_material_hits_the_lower_limit() {
        let particle = Particle::new(zero_vector(), ConstitutiveModel::Viscous)
            .with_density(1.0, 1000.0)
            .with_velocity(Vector::new(1e9, 0.0, 0.0));
        assert_eq!(estimate_timestep(&[particle], &params()), 1e-6);
    }
}
