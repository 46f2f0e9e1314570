//! Pure geometric helpers over [`Point`].

use crate::errors::GeometryError;
use crate::types::Point;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Whether `point` lies inside or on the circle.
pub fn point_in_circle(point: Point, center: Point, radius: f64) -> bool {
    point.distance_squared(center) <= radius * radius
}

/// Whether `point` lies inside or on the axis-aligned rectangle.
pub fn point_in_rect(point: Point, min: Point, max: Point) -> bool {
    point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
}

/// Heading of the direction `from -> to` in radians, `atan2(dy, dx)`.
/// Zero-length directions report 0.
pub fn heading_between(from: Point, to: Point) -> f64 {
    let d = to - from;
    if d.length_squared() == 0.0 {
        0.0
    } else {
        d.y.atan2(d.x)
    }
}

/// Closest point to `p` on the segment `a..b`.
pub fn segment_closest_point(p: Point, a: Point, b: Point) -> Point {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Position and heading at arc-length `progress` along `waypoints`.
///
/// Progress is clamped to `[0, total length]`. Fails only for an empty or
/// non-finite waypoint list.
pub fn point_on_path_at_progress(
    waypoints: &[Point],
    progress: f64,
) -> Result<(Point, f64), GeometryError> {
    validate_waypoints(waypoints)?;

    let mut remaining = progress.max(0.0);
    let mut heading = 0.0;
    for pair in waypoints.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let seg = a.distance(b);
        if seg == 0.0 {
            continue;
        }
        heading = heading_between(a, b);
        if remaining <= seg {
            return Ok((a.lerp(b, remaining / seg), heading));
        }
        remaining -= seg;
    }

    // Past the end (or a single waypoint): clamp to the final point, keep the
    // heading of the last non-degenerate segment.
    let last = waypoints[waypoints.len() - 1];
    Ok((last, heading))
}

pub(crate) fn validate_waypoints(waypoints: &[Point]) -> Result<(), GeometryError> {
    if waypoints.is_empty() {
        return Err(GeometryError::InvalidPath("path has no waypoints".into()));
    }
    if let Some(i) = waypoints.iter().position(|p| !p.is_finite()) {
        return Err(GeometryError::InvalidPath(format!(
            "waypoint {i} has a non-finite coordinate"
        )));
    }
    Ok(())
}
