use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).length()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Linear interpolation, `t` is not clamped.
    pub fn lerp(self, other: Vec3, t: f32) -> Vec3 {
        self + (other - self) * t
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Vec3::new(x, y, z)
    }
}

/// Axis-aligned box that targets are placed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingVolume {
    center: Vec3,
    half_extents: Vec3,
}

impl BoundingVolume {
    pub fn new(center: Vec3, half_extents: Vec3) -> Result<Self, GeometryError> {
        let valid = half_extents.is_finite()
            && half_extents.x >= 0.0
            && half_extents.y >= 0.0
            && half_extents.z >= 0.0;
        if !valid {
            return Err(GeometryError::InvalidHalfExtents(half_extents));
        }
        if !center.is_finite() {
            return Err(GeometryError::InvalidCenter(center));
        }
        let volume = Self {
            center,
            half_extents,
        };
        // corners and edge lengths must stay representable for sampling
        if !(volume.size().is_finite() && volume.min().is_finite() && volume.max().is_finite()) {
            return Err(GeometryError::Unrepresentable { center, half_extents });
        }
        Ok(volume)
    }

    /// Builds the volume from full edge lengths.
    pub fn from_size(center: Vec3, size: Vec3) -> Result<Self, GeometryError> {
        Self::new(center, size * 0.5)
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    pub fn size(&self) -> Vec3 {
        self.half_extents * 2.0
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    pub fn contains(&self, point: Vec3) -> bool {
        let (lo, hi) = (self.min(), self.max());
        (lo.x..=hi.x).contains(&point.x)
            && (lo.y..=hi.y).contains(&point.y)
            && (lo.z..=hi.z).contains(&point.z)
    }

    /// Index of the grid cell containing `point`, counting x fastest, then y,
    /// then z. Points on the max face fall into the last cell of that axis.
    pub fn subregion_index(&self, point: Vec3, subdivision: Subdivision) -> Option<usize> {
        if !self.contains(point) {
            return None;
        }
        let lo = self.min();
        let size = self.size();
        let ix = cell(point.x - lo.x, size.x, subdivision.x);
        let iy = cell(point.y - lo.y, size.y, subdivision.y);
        let iz = cell(point.z - lo.z, size.z, subdivision.z);
        let (nx, ny) = (subdivision.x.max(1) as usize, subdivision.y.max(1) as usize);
        Some(ix + nx * (iy + ny * iz))
    }
}

fn cell(offset: f32, extent: f32, divisions: u32) -> usize {
    let divisions = divisions.max(1);
    if extent <= 0.0 {
        return 0;
    }
    let idx = ((offset / extent) * divisions as f32).floor() as usize;
    idx.min(divisions as usize - 1)
}

/// Per-axis cell counts used to tag targets with a sub-region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subdivision {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Subdivision {
    pub fn new(x: u32, y: u32, z: u32) -> Result<Self, GeometryError> {
        if x == 0 || y == 0 || z == 0 {
            return Err(GeometryError::EmptySubdivision);
        }
        Ok(Self { x, y, z })
    }

    pub fn cell_count(&self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }
}

impl Default for Subdivision {
    fn default() -> Self {
        Self { x: 1, y: 1, z: 1 }
    }
}
