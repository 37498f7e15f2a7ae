//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;
use cgmath::{Point2, Vector2};

/// A 2D point in world units.
pub type Point2d = Point2<f64>;

/// A 2D vector in world units.
pub type Vector2d = Vector2<f64>;

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval overlaps with the other.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.max > other.min && other.max > self.min
    }

    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T: std::ops::Sub<T, Output = T> + Copy> Interval<T> {
    /// Gets the magnitude of the interval.
    pub fn length(&self) -> T {
        self.max - self.min
    }
}

impl<T: Float> Interval<T> {
    /// Creates an interval with the given centre and radius.
    pub fn disc(centre: T, radius: T) -> Self {
        Self {
            min: centre - radius,
            max: centre + radius,
        }
    }

    /// Returns the centre/mid-point of the interval.
    pub fn midpoint(&self) -> T {
        T::from(0.5).unwrap() * (self.min + self.max)
    }

    /// Computes the distance between a point and the interval.
    /// Will be negative if the point is within the interval.
    pub fn distance(&self, other: T) -> T {
        T::max(other - self.max, self.min - other)
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

/// An axis-aligned box, represented as an interval per axis.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Box2d {
    pub x: Interval<f64>,
    pub y: Interval<f64>,
}

impl Box2d {
    /// Creates a box from its two axis intervals.
    pub const fn new(x: Interval<f64>, y: Interval<f64>) -> Self {
        Self { x, y }
    }

    /// Creates a box with the given centre and half-extents.
    pub fn disc(centre: Point2d, half: Vector2d) -> Self {
        Self {
            x: Interval::disc(centre.x, half.x),
            y: Interval::disc(centre.y, half.y),
        }
    }

    /// Returns true if this box overlaps with the other.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x.overlaps(&other.x) && self.y.overlaps(&other.y)
    }

    /// Returns true if the point lies within the box.
    pub fn contains(&self, point: Point2d) -> bool {
        self.x.contains(point.x) && self.y.contains(point.y)
    }
}
