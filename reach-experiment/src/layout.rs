//! Target placement by rejection sampling.

use reach_core::{BoundingVolume, TargetPoint, Vec3};

use crate::error::LayoutError;
use crate::random::RandomSource;

/// Draws up to `max_attempts` uniform points in `volume` and keeps those at
/// least `min_separation` away from every point kept so far.
pub fn generate<R: RandomSource + ?Sized>(
    count: usize,
    volume: &BoundingVolume,
    min_separation: f32,
    max_attempts: usize,
    rng: &mut R,
) -> Result<Vec<TargetPoint>, LayoutError> {
    if !min_separation.is_finite() || min_separation < 0.0 {
        return Err(LayoutError::InvalidSeparation(min_separation));
    }
    let mut accepted: Vec<Vec3> = Vec::with_capacity(count);
    let mut attempts = 0;
    while accepted.len() < count && attempts < max_attempts {
        attempts += 1;
        let candidate = random_point(volume, rng);
        if is_separated(&accepted, candidate, min_separation) {
            accepted.push(candidate);
        }
    }
    if accepted.len() < count {
        return Err(LayoutError::InsufficientSpace {
            requested: count,
            placed: accepted.len(),
            attempts,
        });
    }
    Ok(accepted.into_iter().map(TargetPoint::new).collect())
}

/// Runs `generate` from scratch up to `max_retries + 1` times.
pub fn generate_with_retries<R: RandomSource + ?Sized>(
    count: usize,
    volume: &BoundingVolume,
    min_separation: f32,
    max_attempts: usize,
    max_retries: usize,
    rng: &mut R,
) -> Result<Vec<TargetPoint>, LayoutError> {
    let mut round = 0;
    loop {
        match generate(count, volume, min_separation, max_attempts, rng) {
            Ok(points) => {
                if round > 0 {
                    log::info!("layout placed {count} targets after {round} retries");
                }
                return Ok(points);
            }
            Err(err @ LayoutError::InvalidSeparation(_)) => return Err(err),
            Err(err) if round >= max_retries => return Err(err),
            Err(err) => {
                round += 1;
                log::warn!("{err}; retrying layout ({round}/{max_retries})");
            }
        }
    }
}

fn random_point<R: RandomSource + ?Sized>(volume: &BoundingVolume, rng: &mut R) -> Vec3 {
    let c = volume.center();
    let h = volume.half_extents();
    Vec3::new(
        c.x + rng.uniform(-h.x, h.x),
        c.y + rng.uniform(-h.y, h.y),
        c.z + rng.uniform(-h.z, h.z),
    )
}

fn is_separated(accepted: &[Vec3], candidate: Vec3, min_separation: f32) -> bool {
    accepted
        .iter()
        .all(|p| p.distance(candidate) >= min_separation)
}
