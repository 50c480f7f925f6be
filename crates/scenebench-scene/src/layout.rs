//! Pattern layout math and collision checks

use crate::error::ParseEnumError;
use crate::types::Vec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

/// Minimum separation between generated objects
pub const MIN_SEPARATION: f64 = 1.5;

/// Axis a line pattern runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDirection {
    /// Along x
    #[default]
    Horizontal,
    /// Along y
    Vertical,
    /// Along x and y together
    Diagonal,
}

impl LineDirection {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Diagonal => "diagonal",
        }
    }
}

impl fmt::Display for LineDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineDirection {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            "diagonal" => Ok(Self::Diagonal),
            _ => Err(ParseEnumError::new("line direction", s)),
        }
    }
}

/// True when `a` and `b` are closer than `min_distance`
#[inline]
#[must_use]
pub fn collides(a: &Vec3, b: &Vec3, min_distance: f64) -> bool {
    a.distance(b) < min_distance
}

/// True when `candidate` collides with any of `occupied`
#[must_use]
pub fn collides_with_any(candidate: &Vec3, occupied: &[Vec3], min_distance: f64) -> bool {
    occupied.iter().any(|p| collides(candidate, p, min_distance))
}

/// Candidates that collide with none of `occupied`, in candidate order
#[must_use]
pub fn free_positions(candidates: &[Vec3], occupied: &[Vec3], min_distance: f64) -> Vec<Vec3> {
    candidates
        .iter()
        .filter(|c| !collides_with_any(c, occupied, min_distance))
        .copied()
        .collect()
}

/// True when no pair of `positions` collides
#[must_use]
pub fn is_collision_free(positions: &[Vec3], min_distance: f64) -> bool {
    positions.iter().enumerate().all(|(i, a)| {
        positions[i + 1..]
            .iter()
            .all(|b| a.distance(b) >= min_distance - 1e-9)
    })
}

/// `rows * cols` positions on the XY plane, row-major, centered on `center`
#[must_use]
pub fn grid_positions(rows: usize, cols: usize, spacing: f64, center: Vec3) -> Vec<Vec3> {
    let start_x = center.x - (cols.saturating_sub(1) as f64) * spacing / 2.0;
    let start_y = center.y - (rows.saturating_sub(1) as f64) * spacing / 2.0;

    let mut positions = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            positions.push(Vec3::new(
                start_x + col as f64 * spacing,
                start_y + row as f64 * spacing,
                center.z,
            ));
        }
    }
    positions
}

/// `n` positions on a circle in the XY plane, counter-clockwise from +x
#[must_use]
pub fn circle_positions(n: usize, radius: f64, center: Vec3) -> Vec<Vec3> {
    (0..n)
        .map(|i| {
            let angle = i as f64 * TAU / n as f64;
            Vec3::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
                center.z,
            )
        })
        .collect()
}

/// `n` evenly spaced positions centered on `center` along `direction`
#[must_use]
pub fn line_positions(n: usize, spacing: f64, direction: LineDirection, center: Vec3) -> Vec<Vec3> {
    let start = -(n.saturating_sub(1) as f64) * spacing / 2.0;
    (0..n)
        .map(|i| {
            let offset = start + i as f64 * spacing;
            match direction {
                LineDirection::Horizontal => center.offset(offset, 0.0, 0.0),
                LineDirection::Vertical => center.offset(0.0, offset, 0.0),
                LineDirection::Diagonal => center.offset(offset, offset, 0.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_row_major_and_centered() {
        let grid = grid_positions(2, 3, 2.0, Vec3::ZERO);
        assert_eq!(grid.len(), 6);
        assert_eq!(grid[0], Vec3::new(-2.0, -1.0, 0.0));
        assert_eq!(grid[2], Vec3::new(2.0, -1.0, 0.0));
        assert_eq!(grid[3], Vec3::new(-2.0, 1.0, 0.0));
    }

    #[test]
    fn circle_points_lie_on_radius() {
        let center = Vec3::new(1.0, -1.0, 4.0);
        let circle = circle_positions(8, 3.0, center);
        assert_eq!(circle.len(), 8);
        for p in &circle {
            assert!((p.distance(&center) - 3.0).abs() < 1e-6);
            assert!((p.z - 4.0).abs() < f64::EPSILON);
        }
        assert!((circle[0].x - 4.0).abs() < 1e-12);
        // counter-clockwise: second point has positive y offset
        assert!(circle[1].y > center.y);
    }

    #[test]
    fn line_is_symmetric() {
        let xs: Vec<f64> = line_positions(5, 2.0, LineDirection::Horizontal, Vec3::ZERO)
            .iter()
            .map(|p| p.x)
            .collect();
        assert_eq!(xs, vec![-4.0, -2.0, 0.0, 2.0, 4.0]);

        let vertical = line_positions(2, 2.0, LineDirection::Vertical, Vec3::ZERO);
        assert_eq!(vertical, vec![Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0)]);
    }

    #[test]
    fn collision_threshold_is_strict() {
        let a = Vec3::ZERO;
        assert!(collides(&a, &Vec3::new(1.49, 0.0, 0.0), MIN_SEPARATION));
        assert!(!collides(&a, &Vec3::new(1.5, 0.0, 0.0), MIN_SEPARATION));
    }

    #[test]
    fn free_positions_excludes_occupied() {
        let occupied = [Vec3::ZERO];
        let candidates = [Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)];
        assert_eq!(
            free_positions(&candidates, &occupied, MIN_SEPARATION),
            vec![Vec3::new(2.0, 0.0, 0.0)]
        );
    }

    #[test]
    fn direction_parses() {
        assert_eq!("Vertical".parse::<LineDirection>().unwrap(), LineDirection::Vertical);
        assert!("sideways".parse::<LineDirection>().is_err());
    }
}
