use crate::lorenz::State;
use serde::{Deserialize, Serialize};

/// Display hints carried alongside a trajectory for the renderer's benefit.
///
/// The engine never reads these; they are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryTag {
    #[serde(default)]
    pub label: Option<String>,
    /// RGB components in `[0, 1]`.
    #[serde(default)]
    pub color: Option<[f32; 3]>,
}

impl TrajectoryTag {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            color: None,
        }
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = Some(color);
        self
    }
}

/// Append-only sequence of states. Index `i` holds the state after `i` steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    points: Vec<State>,
    tag: TrajectoryTag,
    first_non_finite: Option<usize>,
}

impl Trajectory {
    pub(crate) fn new(seed: State, tag: TrajectoryTag) -> Self {
        Self {
            points: vec![seed],
            tag,
            first_non_finite: None,
        }
    }

    pub fn seed(&self) -> State {
        self.points[0]
    }

    /// Most recent state. A trajectory always holds at least its seed.
    pub fn last(&self) -> State {
        self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[State] {
        &self.points
    }

    /// First `length` states, or `None` if fewer have been recorded.
    pub fn prefix(&self, length: usize) -> Option<&[State]> {
        self.points.get(..length)
    }

    pub fn tag(&self) -> &TrajectoryTag {
        &self.tag
    }

    /// Index of the first recorded state with a non-finite coordinate, if any.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.first_non_finite
    }

    /// Appends freshly integrated states. Returns the index of the first non-finite
    /// state when this batch is the one that introduced it.
    pub(crate) fn append(&mut self, batch: &[State]) -> Option<usize> {
        let start = self.points.len();
        self.points.reserve(batch.len());
        self.points.extend_from_slice(batch);

        if self.first_non_finite.is_some() {
            return None;
        }
        let offset = batch.iter().position(|s| !s.is_finite())?;
        self.first_non_finite = Some(start + offset);
        self.first_non_finite
    }
}

/// Axis-aligned box spanning the finite points of a trajectory set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: State,
    pub max: State,
}

impl Bounds {
    fn around(point: State) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    fn include(&mut self, p: State) {
        self.min = State::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = State::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }
}

/// Fixed-size ordered collection of trajectories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectorySet {
    trajectories: Vec<Trajectory>,
}

impl TrajectorySet {
    pub(crate) fn new(seeds: Vec<State>, mut tags: Vec<TrajectoryTag>) -> Self {
        tags.resize(seeds.len(), TrajectoryTag::default());
        let trajectories = seeds
            .into_iter()
            .zip(tags)
            .map(|(seed, tag)| Trajectory::new(seed, tag))
            .collect();
        Self { trajectories }
    }

    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Trajectory> {
        self.trajectories.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trajectory> {
        self.trajectories.iter()
    }

    /// Replaces tags front to back; trajectories past the end of `tags` get the default.
    pub(crate) fn retag(&mut self, tags: Vec<TrajectoryTag>) {
        let mut tags = tags.into_iter();
        for trajectory in &mut self.trajectories {
            trajectory.tag = tags.next().unwrap_or_default();
        }
    }

    pub(crate) fn as_slice(&self) -> &[Trajectory] {
        &self.trajectories
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Trajectory] {
        &mut self.trajectories
    }

    /// Bounding box of every finite point recorded so far, or `None` if there are none.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut finite = self
            .trajectories
            .iter()
            .flat_map(|t| t.points.iter().copied())
            .filter(State::is_finite);
        let mut bounds = Bounds::around(finite.next()?);
        for p in finite {
            bounds.include(p);
        }
        Some(bounds)
    }
}
