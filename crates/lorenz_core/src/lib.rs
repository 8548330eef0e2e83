pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod lorenz;
pub mod seeding;
pub mod solvers;
/// The `lorenz_core` crate is the numerical engine behind the Lorenz animations.
/// It integrates one or more trajectories of the Lorenz system with fixed-step forward
/// Euler and hands the recorded states to whatever renders them.
///
/// Key components:
/// - **Traits**: `Scalar`, `DynamicalSystem` (vector fields), `Steppable` (integration schemes).
/// - **Lorenz**: `Parameters`, `State` and the single-step `step` function.
/// - **Engine**: `TrajectoryEngine`, which owns every trajectory and supports both bulk
///   precomputation and frame-by-frame advancing.
/// - **Seeding / Config**: reproducible initial conditions and serde-backed run setup.
/// - **Analysis**: separation of nearby trajectories and a largest-Lyapunov estimate.
pub mod traits;
pub mod trajectory;

pub use config::EngineConfig;
pub use engine::TrajectoryEngine;
pub use error::{EngineError, EngineResult};
pub use lorenz::{step, Parameters, State};
pub use seeding::SeedSpec;
pub use trajectory::{Bounds, Trajectory, TrajectorySet, TrajectoryTag};
