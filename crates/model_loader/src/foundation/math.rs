//! Math utilities and types
//!
//! Provides the vector aliases used by material records and the bounding
//! extents used to frame a loaded model.

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Axis-aligned bounds of a set of positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    /// Component-wise minimum
    pub min: Vec3,

    /// Component-wise maximum
    pub max: Vec3,
}

impl Extents {
    /// Compute the extents of a flat `[x, y, z, x, y, z, ...]` position array
    ///
    /// Returns `None` when the array holds no complete position.
    pub fn from_positions(positions: &[f32]) -> Option<Self> {
        let mut points = positions.chunks_exact(3);
        let first = points.next()?;
        let mut min = Vec3::new(first[0], first[1], first[2]);
        let mut max = min;

        for p in points {
            let v = Vec3::new(p[0], p[1], p[2]);
            min = min.inf(&v);
            max = max.sup(&v);
        }

        Some(Self { min, max })
    }

    /// Combine two extents into one enclosing both
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Fold the extents of several position arrays, skipping empty ones
    pub fn from_position_sets<'a, I>(sets: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a [f32]>,
    {
        sets.into_iter()
            .filter_map(Self::from_positions)
            .reduce(|acc, e| acc.union(&e))
    }

    /// Size along each axis
    pub fn range(&self) -> Vec3 {
        self.max - self.min
    }

    /// Center of the box
    pub fn center(&self) -> Vec3 {
        self.min + self.range() * 0.5
    }

    /// Translation that moves the box center to the origin
    pub fn center_offset(&self) -> Vec3 {
        -self.center()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extents_from_positions() {
        let positions = [1.0, -2.0, 3.0, -1.0, 4.0, 0.5];
        let extents = Extents::from_positions(&positions).unwrap();

        assert_eq!(extents.min, Vec3::new(-1.0, -2.0, 0.5));
        assert_eq!(extents.max, Vec3::new(1.0, 4.0, 3.0));
        assert_eq!(extents.center(), Vec3::new(0.0, 1.0, 1.75));
        assert_eq!(extents.center_offset(), Vec3::new(0.0, -1.0, -1.75));
    }

    #[test]
    fn test_extents_empty() {
        assert!(Extents::from_positions(&[]).is_none());
        assert!(Extents::from_position_sets(Vec::<&[f32]>::new()).is_none());
    }

    #[test]
    fn test_extents_union_of_sets() {
        let a = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let b: [f32; 0] = [];
        let c = [-2.0, 0.5, 3.0];
        let extents = Extents::from_position_sets([&a[..], &b[..], &c[..]]).unwrap();

        assert_eq!(extents.min, Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(extents.max, Vec3::new(1.0, 1.0, 3.0));
        assert_eq!(extents.range(), Vec3::new(3.0, 1.0, 3.0));
    }
}
