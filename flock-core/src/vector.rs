use core::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Sub};

/// Magnitudes at or below this are treated as zero-length when normalizing.
pub const EPSILON: f32 = 1e-6;

pub(crate) fn sqrt(value: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        value.sqrt()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::sqrtf(value)
    }
}

pub(crate) fn atan2(y: f32, x: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        y.atan2(x)
    }
    #[cfg(not(feature = "std"))]
    {
        libm::atan2f(y, x)
    }
}

/// A fixed-size vector in `D` dimensions, used for positions, velocities and forces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector<const D: usize>(pub [f32; D]);

pub type Vector2D = Vector<2>;
pub type Vector3D = Vector<3>;

impl Vector<2> {
    pub const fn new(x: f32, y: f32) -> Self {
        Self([x, y])
    }

    /// Angle of the vector from the positive x axis, in radians.
    pub fn angle(&self) -> f32 {
        atan2(self.0[1], self.0[0])
    }
}

impl Vector<3> {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self([x, y, z])
    }

    pub fn z(&self) -> f32 {
        self.0[2]
    }
}

impl<const D: usize> Vector<D> {
    pub const fn zero() -> Self {
        Self([0.0; D])
    }

    pub fn x(&self) -> f32 {
        self.0[0]
    }

    pub fn y(&self) -> f32 {
        self.0[1]
    }

    pub fn to_array(self) -> [f32; D] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|c| *c == 0.0)
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum()
    }

    pub fn magnitude_squared(&self) -> f32 {
        self.dot(self)
    }

    /// Euclidean length. Falls back to rescaling by the largest component
    /// when the squared length overflows `f32`.
    pub fn magnitude(&self) -> f32 {
        let squared = self.magnitude_squared();
        if squared.is_finite() {
            return sqrt(squared);
        }
        let largest = self.largest_component();
        if !largest.is_finite() {
            return largest;
        }
        largest * sqrt((*self / largest).magnitude_squared())
    }

    fn largest_component(&self) -> f32 {
        self.0.iter().fold(0.0, |largest, c| largest.max(c.max(-c)))
    }

    /// Unit vector in the same direction, or `None` when the magnitude is
    /// within [`EPSILON`] of zero.
    pub fn try_normalize(&self) -> Option<Self> {
        let mag = self.magnitude();
        if mag > EPSILON {
            Some(*self / mag)
        } else {
            None
        }
    }

    /// Scales the vector down to `max` if it is longer; shorter vectors are
    /// returned untouched.
    pub fn limit(&self, max: f32) -> Self {
        let mag = self.magnitude();
        if mag <= max || mag <= EPSILON {
            return *self;
        }
        if mag.is_finite() {
            *self * (max / mag)
        } else {
            // Longer than f32::MAX: shrink first so the direction survives.
            let shrunk = *self / self.largest_component();
            shrunk * (max / shrunk.magnitude())
        }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        (*self - *other).magnitude()
    }

    /// Clamps every component into `[min, max]`.
    pub fn clamp(&self, min: f32, max: f32) -> Self {
        self.map(|c| c.clamp(min, max))
    }

    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self(core::array::from_fn(|axis| f(self.0[axis])))
    }

    fn zip_with(self, other: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        Self(core::array::from_fn(|axis| f(self.0[axis], other.0[axis])))
    }
}

impl<const D: usize> Index<usize> for Vector<D> {
    type Output = f32;

    fn index(&self, axis: usize) -> &f32 {
        &self.0[axis]
    }
}

impl<const D: usize> IndexMut<usize> for Vector<D> {
    fn index_mut(&mut self, axis: usize) -> &mut f32 {
        &mut self.0[axis]
    }
}

impl<const D: usize> Add for Vector<D> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a + b)
    }
}

impl<const D: usize> Sub for Vector<D> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a - b)
    }
}

impl<const D: usize> Mul<f32> for Vector<D> {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        self.map(|c| c * scalar)
    }
}

impl<const D: usize> Div<f32> for Vector<D> {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        self.map(|c| c / scalar)
    }
}

impl<const D: usize> AddAssign for Vector<D> {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector2d_new() {
        let v = Vector2D::new(3.0, 4.0);
        assert_eq!(v.x(), 3.0);
        assert_eq!(v.y(), 4.0);
    }

    #[test]
    fn test_vector_magnitude() {
        assert_eq!(Vector2D::new(3.0, 4.0).magnitude(), 5.0);
        assert_eq!(Vector3D::new(2.0, 3.0, 6.0).magnitude(), 7.0);
    }

    #[test]
    fn test_vector_normalize() {
        let normalized = Vector3D::new(3.0, 4.0, 12.0).try_normalize().unwrap();
        assert!((normalized.magnitude() - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_normalize_near_zero_is_skipped() {
        assert_eq!(Vector2D::new(1e-8, -1e-8).try_normalize(), None);
    }

    #[test]
    fn test_magnitude_survives_squared_overflow() {
        // 3e19² overflows f32
        let mag = Vector2D::new(3e19, -4e19).magnitude();
        assert!((mag / 5e19 - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_limit_caps_huge_vectors() {
        let capped = Vector2D::new(3e19, 4e19).limit(1e19);
        assert!((capped.x() / 6e18 - 1.0).abs() < 0.0001);
        assert!((capped.y() / 8e18 - 1.0).abs() < 0.0001);

        // Longer than f32::MAX altogether
        let capped = Vector2D::new(3e38, -3e38).limit(2.0);
        assert!((capped.magnitude() - 2.0).abs() < 0.0001);
        assert!(capped.x() > 0.0 && capped.y() < 0.0);

        let untouched = Vector2D::new(3e19, 4e19);
        assert_eq!(untouched.limit(1e20), untouched);
    }

    #[test]
    fn test_limit_only_scales_down() {
        let long = Vector2D::new(30.0, 40.0).limit(5.0);
        assert!((long.magnitude() - 5.0).abs() < 0.0001);
        assert!((long.x() - 3.0).abs() < 0.0001);

        let short = Vector2D::new(0.3, 0.4);
        assert_eq!(short.limit(5.0), short);
    }

    #[test]
    fn test_vector_operations() {
        let v1 = Vector3D::new(1.0, 2.0, 3.0);
        let v2 = Vector3D::new(3.0, 4.0, 5.0);

        assert_eq!(v1 + v2, Vector3D::new(4.0, 6.0, 8.0));
        assert_eq!(v2 - v1, Vector3D::new(2.0, 2.0, 2.0));
        assert_eq!(v1 * 2.0, Vector3D::new(2.0, 4.0, 6.0));
        assert_eq!(v2 / 2.0, Vector3D::new(1.5, 2.0, 2.5));

        let mut acc = v1;
        acc += v2;
        assert_eq!(acc, Vector3D::new(4.0, 6.0, 8.0));
    }

    #[test]
    fn test_vector_clamp() {
        let total = Vector2D::new(5.0, 7.0);
        assert_eq!(total.clamp(0.0, 6.0), Vector2D::new(5.0, 6.0));
        assert_eq!(Vector2D::new(-1.0, 3.0).clamp(0.0, 6.0), Vector2D::new(0.0, 3.0));
    }

    #[test]
    fn test_vector2d_angle() {
        assert!((Vector2D::new(0.0, 1.0).angle() - core::f32::consts::FRAC_PI_2).abs() < 0.0001);
        assert!(Vector2D::new(1.0, 0.0).angle().abs() < 0.0001);
    }

    #[test]
    fn test_distance() {
        let a = Vector3D::new(1.0, 1.0, 1.0);
        let b = Vector3D::new(1.0, 4.0, 5.0);
        assert_eq!(a.distance(&b), 5.0);
    }
}
