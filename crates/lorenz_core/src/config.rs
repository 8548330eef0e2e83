use crate::engine::TrajectoryEngine;
use crate::error::{EngineError, EngineResult};
use crate::lorenz::{Parameters, State};
use crate::seeding::{random_colors, SeedSpec};
use crate::trajectory::TrajectoryTag;
use serde::{Deserialize, Serialize};

/// Everything needed to set up a run. Missing fields fall back to the classic
/// `(10, 28, 8/3)` regime, `dt = 0.01` and a 10 000 step horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default = "EngineConfig::default_dt")]
    pub dt: f64,
    /// Steps precomputed by [`EngineConfig::build`]. Zero leaves only the seeds.
    #[serde(default = "EngineConfig::default_horizon")]
    pub horizon: usize,
    #[serde(default)]
    pub seeding: SeedSpec,
    #[serde(default)]
    pub tags: Vec<TrajectoryTag>,
    #[serde(default)]
    pub halt_on_non_finite: bool,
}

impl EngineConfig {
    fn default_dt() -> f64 {
        0.01
    }
    fn default_horizon() -> usize {
        10_000
    }

    /// Resolves the seeds, constructs the engine and precomputes `horizon` steps.
    pub fn build(&self) -> EngineResult<TrajectoryEngine> {
        let seeds = self.seeding.resolve()?;
        let mut engine = TrajectoryEngine::new(self.parameters, self.dt, seeds)?
            .with_tags(self.tags.clone())?
            .halt_on_non_finite(self.halt_on_non_finite);
        engine.precompute(self.horizon);
        Ok(engine)
    }

    /// Three neighbouring seeds settling onto the same attractor.
    pub fn classic_attractors() -> Self {
        Self::default()
    }

    /// One normally drawn seed around `(0, 0, 20)` plus a copy offset by `1.2e-10`,
    /// tagged blue and yellow.
    pub fn divergence_pair(seed: u64) -> Self {
        Self {
            seeding: SeedSpec::Perturbed {
                base: Box::new(SeedSpec::Normal {
                    count: 1,
                    center: State::new(0.0, 0.0, 20.0),
                    deviation: 5.0,
                    seed,
                }),
                offset: 1.2e-10,
            },
            tags: vec![
                TrajectoryTag::labeled("reference").with_color([0.0, 0.0, 1.0]),
                TrajectoryTag::labeled("perturbed").with_color([1.0, 1.0, 0.0]),
            ],
            ..Self::default()
        }
    }

    /// `count` seeds uniform in `[-10, 10]^3`, each with a random colour, advanced live
    /// rather than precomputed.
    pub fn random_swarm(count: usize, seed: u64) -> EngineResult<Self> {
        if count == 0 {
            return Err(EngineError::InvalidParameter(
                "A swarm needs at least one trajectory.".into(),
            ));
        }
        let tags = random_colors(count, seed.wrapping_add(1))
            .into_iter()
            .map(|color| TrajectoryTag::default().with_color(color))
            .collect();
        Ok(Self {
            horizon: 0,
            seeding: SeedSpec::Uniform {
                count,
                center: State::default(),
                half_width: 10.0,
                seed,
            },
            tags,
            ..Self::default()
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parameters: Parameters::default(),
            dt: Self::default_dt(),
            horizon: Self::default_horizon(),
            seeding: SeedSpec::default(),
            tags: Vec::new(),
            halt_on_non_finite: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EngineConfig;
    use crate::error::EngineError;
    use crate::lorenz::{Parameters, State};
    use crate::seeding::SeedSpec;

    #[test]
    fn empty_json_yields_reference_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").expect("config");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.parameters, Parameters::new(10.0, 28.0, 8.0 / 3.0));
        assert_eq!(config.dt, 0.01);
        assert_eq!(config.horizon, 10_000);
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let config: EngineConfig = serde_json::from_str(
            r#"{ "dt": 0.005, "horizon": 20,
                 "seeding": { "kind": "explicit", "seeds": [ { "x": 1.0, "y": 1.0, "z": 1.0 } ] },
                 "tags": [ { "label": "only" } ] }"#,
        )
        .expect("config");
        assert_eq!(config.dt, 0.005);
        assert!(!config.halt_on_non_finite);

        let engine = config.build().expect("engine");
        assert_eq!(engine.count(), 1);
        assert_eq!(engine.len(), 21);
        let tag = engine.trajectory(0).expect("trajectory").tag();
        assert_eq!(tag.label.as_deref(), Some("only"));
        assert_eq!(tag.color, None);
    }

    #[test]
    fn build_rejects_invalid_inputs() {
        let bad_dt = EngineConfig {
            dt: 0.0,
            horizon: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(bad_dt.build(), Err(EngineError::InvalidParameter(_))));

        let no_seeds = EngineConfig {
            seeding: SeedSpec::Explicit { seeds: Vec::new() },
            ..EngineConfig::default()
        };
        assert!(matches!(no_seeds.build(), Err(EngineError::InvalidParameter(_))));

        assert!(EngineConfig::random_swarm(0, 1).is_err());
    }

    #[test]
    fn divergence_pair_starts_nearly_coincident() {
        let config = EngineConfig {
            horizon: 0,
            ..EngineConfig::divergence_pair(42)
        };
        let engine = config.build().expect("engine");
        assert_eq!(engine.count(), 2);
        let a = engine.full(0).expect("a")[0];
        let b = engine.full(1).expect("b")[0];
        assert!(a != b);
        assert!(a.distance(&b) <= 1e-9);
        assert_eq!(
            engine.trajectory(1).expect("b").tag().color,
            Some([1.0, 1.0, 0.0])
        );
    }

    #[test]
    fn random_swarm_is_live_and_fully_coloured() {
        let config = EngineConfig::random_swarm(10, 5).expect("config");
        let mut engine = config.build().expect("engine");
        assert_eq!(engine.count(), 10);
        assert_eq!(engine.len(), 1);
        assert!(engine.trajectories().iter().all(|t| t.tag().color.is_some()));

        engine.advance_all().expect("advance");
        assert_eq!(engine.len(), 2);
        let seed = engine.full(0).expect("full")[0];
        assert!(seed.to_array().iter().all(|c| (-10.0..10.0).contains(c)));
    }

    #[test]
    fn classic_preset_precomputes_reference_horizon() {
        let engine = EngineConfig::classic_attractors().build().expect("engine");
        assert_eq!(engine.count(), 3);
        assert_eq!(engine.len(), 10_001);
        assert_eq!(engine.full(0).expect("full")[0], State::new(0.0, 1.0, 1.05));
        let bounds = engine.bounds().expect("bounds");
        assert!(bounds.max.z > 30.0);
    }
}
