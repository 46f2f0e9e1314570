//! Path model: an immutable waypoint polyline addressed by arc length.

use serde::{Deserialize, Serialize};

use crate::errors::GeometryError;
use crate::geometry::{heading_between, validate_waypoints};
use crate::types::Point;

/// Result of sampling a path at some progress value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub position: Point,
    /// Radians, `atan2(dy, dx)` of the segment being walked.
    pub heading: f64,
    /// Progress reached (or passed) the end of the path.
    pub goal_reached: bool,
}

/// Ordered waypoints with cached cumulative arc lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Path {
    waypoints: Vec<Point>,
    /// `cumulative[i]` is the arc length from waypoint 0 to waypoint i.
    cumulative: Vec<f64>,
}

impl Path {
    pub fn new(waypoints: Vec<Point>) -> Result<Self, GeometryError> {
        validate_waypoints(&waypoints)?;
        let mut cumulative = Vec::with_capacity(waypoints.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for pair in waypoints.windows(2) {
            total += pair[0].distance(pair[1]);
            cumulative.push(total);
        }
        Ok(Self {
            waypoints,
            cumulative,
        })
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    /// Total arc length.
    pub fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Arc length at which waypoint `index` is reached.
    pub fn progress_of_waypoint(&self, index: usize) -> Option<f64> {
        self.cumulative.get(index).copied()
    }

    pub fn start(&self) -> Point {
        self.waypoints[0]
    }

    pub fn goal(&self) -> Point {
        self.waypoints[self.waypoints.len() - 1]
    }

    /// Arc length left to the goal.
    pub fn remaining(&self, progress: f64) -> f64 {
        (self.length() - progress).max(0.0)
    }

    /// Sample the path at `progress`, clamped to `[0, length]`.
    pub fn position_at(&self, progress: f64) -> PathSample {
        let length = self.length();
        let p = progress.clamp(0.0, length);
        let goal_reached = progress >= length;

        // First segment whose end lies at or beyond `p`, skipping zero-length ones.
        let segment = (1..self.waypoints.len())
            .find(|&i| self.cumulative[i] >= p && self.cumulative[i] > self.cumulative[i - 1]);

        match segment {
            Some(i) => {
                let a = self.waypoints[i - 1];
                let b = self.waypoints[i];
                let seg_len = self.cumulative[i] - self.cumulative[i - 1];
                let t = (p - self.cumulative[i - 1]) / seg_len;
                PathSample {
                    position: a.lerp(b, t),
                    heading: heading_between(a, b),
                    goal_reached,
                }
            }
            None => PathSample {
                position: self.goal(),
                heading: self.final_heading(),
                goal_reached: true,
            },
        }
    }

    fn final_heading(&self) -> f64 {
        self.waypoints
            .windows(2)
            .rev()
            .find(|w| w[0] != w[1])
            .map(|w| heading_between(w[0], w[1]))
            .unwrap_or(0.0)
    }
}

impl TryFrom<Vec<Point>> for Path {
    type Error = GeometryError;

    fn try_from(waypoints: Vec<Point>) -> Result<Self, Self::Error> {
        Path::new(waypoints)
    }
}

impl From<Path> for Vec<Point> {
    fn from(path: Path) -> Self {
        path.waypoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn l_path() -> Path {
        Path::new(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 0.0),
            DVec2::new(4.0, 3.0),
        ])
        .unwrap()
    }

    #[test]
    fn length_is_sum_of_segments() {
        assert_eq!(l_path().length(), 7.0);
        assert_eq!(l_path().progress_of_waypoint(1), Some(4.0));
    }

    #[test]
    fn samples_interpolate_linearly() {
        let path = l_path();
        let s = path.position_at(2.0);
        assert_eq!(s.position, DVec2::new(2.0, 0.0));
        assert_eq!(s.heading, 0.0);
        assert!(!s.goal_reached);

        let s = path.position_at(5.5);
        assert!((s.position - DVec2::new(4.0, 1.5)).length() < 1e-12);
        assert!((s.heading - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn progress_past_end_clamps_and_signals_goal() {
        let s = l_path().position_at(100.0);
        assert_eq!(s.position, DVec2::new(4.0, 3.0));
        assert!(s.goal_reached);
    }

    #[test]
    fn negative_progress_clamps_to_start() {
        let s = l_path().position_at(-3.0);
        assert_eq!(s.position, DVec2::ZERO);
        assert!(!s.goal_reached);
    }

    #[test]
    fn single_waypoint_has_zero_length() {
        let path = Path::new(vec![DVec2::new(1.0, 1.0)]).unwrap();
        assert_eq!(path.length(), 0.0);
        let s = path.position_at(0.0);
        assert_eq!(s.position, DVec2::new(1.0, 1.0));
        assert!(s.goal_reached);
    }

    #[test]
    fn duplicate_waypoints_are_skipped() {
        let path = Path::new(vec![
            DVec2::ZERO,
            DVec2::ZERO,
            DVec2::new(0.0, 2.0),
        ])
        .unwrap();
        let s = path.position_at(0.0);
        assert!((s.heading - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn empty_path_fails() {
        assert!(Path::new(Vec::new()).is_err());
    }

    #[test]
    fn deserialization_validates() {
        let ok: Path = serde_json::from_str("[[0.0,0.0],[1.0,0.0]]").unwrap();
        assert_eq!(ok.length(), 1.0);
        assert!(serde_json::from_str::<Path>("[]").is_err());
    }
}
