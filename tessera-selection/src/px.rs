//! Physical pixel geometry used by the selection engine.
//!
//! All selection geometry (pointer positions, caret anchors, handle rects,
//! toolbar anchors) is expressed in integer physical pixels:
//!
//! - [`Px`] - a single coordinate value, negative values allowed
//! - [`PxPosition`] - a point (x, y)
//! - [`PxSize`] - a size (width, height)
//! - [`PxRect`] - an axis aligned rectangle
//!
//! The origin is the top-left corner, x grows to the right and y grows
//! downward.
//!
//! # Example
//!
//! ```
//! use tessera_selection::px::{Px, PxPosition, PxRect, PxSize};
//!
//! let origin = PxPosition::new(Px::new(10), Px::new(20));
//! let rect = PxRect::from_position_size(origin, PxSize::new(Px::new(100), Px::new(40)));
//! assert!(rect.contains(origin + PxPosition::new(Px::new(5), Px::new(5))));
//! ```

use std::ops::AddAssign;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A physical pixel coordinate value.
///
/// # Examples
///
/// ```
/// use tessera_selection::px::Px;
///
/// let a = Px::new(100);
/// let b = Px::new(-50);
/// assert_eq!(a + b, Px::new(50));
/// assert_eq!(a * 2, Px::new(200));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Px(pub i32);

impl Px {
    /// Zero pixels.
    pub const ZERO: Self = Self(0);

    /// Creates a new `Px` from an i32 value.
    pub const fn new(value: i32) -> Self {
        Px(value)
    }

    /// Converts to f32.
    pub fn to_f32(self) -> f32 {
        self.0 as f32
    }

    /// Returns the smaller of two values.
    pub fn min(self, other: Self) -> Self {
        Px(self.0.min(other.0))
    }

    /// Returns the larger of two values.
    pub fn max(self, other: Self) -> Self {
        Px(self.0.max(other.0))
    }
}

/// A 2D position in physical pixel space.
///
/// # Examples
///
/// ```
/// use tessera_selection::px::{Px, PxPosition};
///
/// let p = PxPosition::new(Px::new(3), Px::new(4));
/// assert_eq!(p.magnitude(), 5.0);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PxPosition {
    /// The x coordinate.
    pub x: Px,
    /// The y coordinate.
    pub y: Px,
}

impl PxPosition {
    /// The origin.
    pub const ZERO: Self = Self { x: Px(0), y: Px(0) };

    /// Creates a new position.
    pub const fn new(x: Px, y: Px) -> Self {
        Self { x, y }
    }

    /// Length of the vector from the origin to this position.
    pub fn magnitude(self) -> f32 {
        let (dx, dy) = (self.x.to_f32(), self.y.to_f32());
        (dx * dx + dy * dy).sqrt()
    }
}

/// A 2D size in physical pixel space.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PxSize {
    /// The width.
    pub width: Px,
    /// The height.
    pub height: Px,
}

impl PxSize {
    /// A zero size.
    pub const ZERO: Self = Self {
        width: Px(0),
        height: Px(0),
    };

    /// Creates a new size.
    pub const fn new(width: Px, height: Px) -> Self {
        Self { width, height }
    }
}

/// An axis aligned rectangle in physical pixel space.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PxRect {
    /// The x coordinate of the top-left corner.
    pub x: Px,
    /// The y coordinate of the top-left corner.
    pub y: Px,
    /// The width.
    pub width: Px,
    /// The height.
    pub height: Px,
}

impl PxRect {
    /// Creates a new rectangle.
    pub const fn new(x: Px, y: Px, width: Px, height: Px) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from a top-left position and a size.
    pub fn from_position_size(position: PxPosition, size: PxSize) -> Self {
        Self {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        }
    }

    /// Whether the point lies inside the rectangle (right/bottom exclusive).
    pub fn contains(&self, point: PxPosition) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

impl std::ops::Add for Px {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Px(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Px {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Px(self.0 - rhs.0)
    }
}

impl std::ops::Mul<i32> for Px {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self::Output {
        Px(self.0 * rhs)
    }
}

impl std::ops::Div<i32> for Px {
    type Output = Self;

    fn div(self, rhs: i32) -> Self::Output {
        Px(self.0 / rhs)
    }
}

impl AddAssign for Px {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::Add for PxPosition {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        PxPosition {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for PxPosition {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        PxPosition {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl AddAssign for PxPosition {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_px_arithmetic() {
        let a = Px(10);
        let b = Px(5);
        assert_eq!(a + b, Px(15));
        assert_eq!(a - b, Px(5));
        assert_eq!(a * 2, Px(20));
        assert_eq!(a / 2, Px(5));
        assert_eq!(a.min(b), b);
        assert_eq!(a.max(b), a);
    }

    #[test]
    fn test_px_position_ops() {
        let p = PxPosition::new(Px(10), Px(20));
        let q = PxPosition::new(Px(3), Px(4));
        assert_eq!(p + q, PxPosition::new(Px(13), Px(24)));
        assert_eq!(p - q, PxPosition::new(Px(7), Px(16)));
        assert_eq!(q.magnitude(), 5.0);

        let mut r = p;
        r += q;
        assert_eq!(r, PxPosition::new(Px(13), Px(24)));
    }

    #[test]
    fn test_px_rect_contains_is_half_open() {
        let rect = PxRect::new(Px(0), Px(0), Px(10), Px(10));
        assert!(rect.contains(PxPosition::new(Px(0), Px(0))));
        assert!(rect.contains(PxPosition::new(Px(9), Px(9))));
        assert!(!rect.contains(PxPosition::new(Px(10), Px(5))));
        assert!(!rect.contains(PxPosition::new(Px(-1), Px(5))));
    }
}
