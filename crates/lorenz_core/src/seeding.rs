//! Initial-condition generation.
//!
//! Random variants draw from a `StdRng` seeded with the caller's `seed`, so the same
//! `SeedSpec` always resolves to the same states.

use crate::error::{EngineError, EngineResult};
use crate::lorenz::State;
use rand::rngs::StdRng;
use rand::distr::Uniform;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SeedSpec {
    /// Use the listed states verbatim.
    Explicit { seeds: Vec<State> },
    /// Each coordinate uniform in `center ± half_width`.
    Uniform {
        count: usize,
        #[serde(default)]
        center: State,
        half_width: f64,
        seed: u64,
    },
    /// Each coordinate `center + deviation * N(0, 1)`.
    Normal {
        count: usize,
        #[serde(default)]
        center: State,
        deviation: f64,
        seed: u64,
    },
    /// Every seed of `base`, each followed by a copy shifted by `offset` on all axes.
    Perturbed { base: Box<SeedSpec>, offset: f64 },
}

impl Default for SeedSpec {
    fn default() -> Self {
        SeedSpec::Explicit {
            seeds: classic_seeds().to_vec(),
        }
    }
}

/// The three neighbouring starting points used to show a single attractor emerging
/// from several initial conditions.
pub fn classic_seeds() -> [State; 3] {
    [
        State::new(0.0, 1.0, 1.05),
        State::new(1.0, -1.0, 0.5),
        State::new(-1.0, 0.0, 1.5),
    ]
}

impl SeedSpec {
    pub fn resolve(&self) -> EngineResult<Vec<State>> {
        let seeds = match self {
            SeedSpec::Explicit { seeds } => seeds.clone(),
            SeedSpec::Uniform {
                count,
                center,
                half_width,
                seed,
            } => {
                if !half_width.is_finite() || *half_width < 0.0 {
                    return Err(EngineError::InvalidParameter(format!(
                        "Uniform half_width must be finite and non-negative, got {half_width}."
                    )));
                }
                let mut rng = StdRng::seed_from_u64(*seed);
                let spread = if *half_width == 0.0 {
                    None
                } else {
                    let uniform = Uniform::new(-*half_width, *half_width).map_err(|e| {
                        EngineError::InvalidParameter(format!(
                            "Uniform half_width {half_width} is unusable: {e}."
                        ))
                    })?;
                    Some(uniform)
                };
                let mut coord = |c: f64| match &spread {
                    Some(uniform) => c + uniform.sample(&mut rng),
                    None => c,
                };
                (0..*count)
                    .map(|_| {
                        let x = coord(center.x);
                        let y = coord(center.y);
                        let z = coord(center.z);
                        State::new(x, y, z)
                    })
                    .collect()
            }
            SeedSpec::Normal {
                count,
                center,
                deviation,
                seed,
            } => {
                if !deviation.is_finite() || *deviation < 0.0 {
                    return Err(EngineError::InvalidParameter(format!(
                        "Normal deviation must be finite and non-negative, got {deviation}."
                    )));
                }
                let normal = Normal::new(0.0, *deviation).map_err(|e| {
                    EngineError::InvalidParameter(format!(
                        "Normal deviation {deviation} is unusable: {e}."
                    ))
                })?;
                let mut rng = StdRng::seed_from_u64(*seed);
                (0..*count)
                    .map(|_| {
                        let x = center.x + normal.sample(&mut rng);
                        let y = center.y + normal.sample(&mut rng);
                        let z = center.z + normal.sample(&mut rng);
                        State::new(x, y, z)
                    })
                    .collect()
            }
            SeedSpec::Perturbed { base, offset } => {
                if !offset.is_finite() {
                    return Err(EngineError::InvalidParameter(format!(
                        "Perturbation offset must be finite, got {offset}."
                    )));
                }
                base.resolve()?
                    .into_iter()
                    .flat_map(|s| [s, s.offset(*offset)])
                    .collect()
            }
        };

        validate_seeds(&seeds)?;
        Ok(seeds)
    }
}

pub(crate) fn validate_seeds(seeds: &[State]) -> EngineResult<()> {
    if seeds.is_empty() {
        return Err(EngineError::InvalidParameter(
            "At least one seed state is required.".into(),
        ));
    }
    if let Some(index) = seeds.iter().position(|s| !s.is_finite()) {
        return Err(EngineError::InvalidParameter(format!(
            "Seed {index} has non-finite coordinates: {:?}.",
            seeds[index]
        )));
    }
    Ok(())
}

/// Random RGB colours, one per trajectory, reproducible from `seed`.
pub fn random_colors(count: usize, seed: u64) -> Vec<[f32; 3]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| [rng.random(), rng.random(), rng.random()])
        .collect()
}
