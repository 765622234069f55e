/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 11/02/2024
Last Modified: 27/08/2024
License: MIT
*/
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A 2-D point, with x and y fields.
///
/// Comparisons that must absorb floating-point noise take an explicit
/// `tolerance` argument rather than consulting any shared tolerance state,
/// so two call sites can compare at different precisions without
/// interfering with one another.
#[derive(Default, Copy, Clone, Debug)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    /// Creates a new Point2D.
    pub fn new(x: f64, y: f64) -> Point2D {
        Point2D { x, y }
    }

    /// Calculates the midpoint between two Point2Ds.
    pub fn midpoint(p1: &Point2D, p2: &Point2D) -> Point2D {
        Point2D::new((p1.x + p2.x) / 2f64, (p1.y + p2.y) / 2f64)
    }

    /// Calculates the Euclidean distance between the point and another.
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Calculates the squared Euclidean distance between the point and another.
    pub fn distance_squared(&self, other: &Self) -> f64 {
        (self.x - other.x) * (self.x - other.x) + (self.y - other.y) * (self.y - other.y)
    }

    /// Calculates the magnitude sqrt(x^2 + y^2) of the point.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// The 2-D cross product (perp dot product) of the point and another,
    /// both treated as vectors from the origin.
    pub fn cross(&self, other: &Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Tests whether the point coincides with `other` within `tolerance`
    /// on each axis.
    pub fn nearly_equals(&self, other: &Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }

    /// Tests whether the point lies on the segment from `p1` to `p2`,
    /// endpoints included. `tolerance` bounds the acceptable cross-product
    /// deviation from collinearity.
    pub fn is_between(&self, p1: &Self, p2: &Self, tolerance: f64) -> bool {
        let cross = (p2.x - p1.x) * (self.y - p1.y) - (p2.y - p1.y) * (self.x - p1.x);
        if cross.abs() > tolerance {
            return false;
        }
        let dot = (p2.x - p1.x) * (self.x - p1.x) + (p2.y - p1.y) * (self.y - p1.y);
        if dot < 0f64 {
            return false;
        }
        dot <= p1.distance_squared(p2)
    }
}

impl PartialEq for Point2D {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl Add for Point2D {
    type Output = Point2D;
    fn add(self, rhs: Self) -> Point2D {
        Point2D {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Point2D {
    type Output = Point2D;
    fn sub(self, rhs: Self) -> Point2D {
        Point2D {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

// dot product
impl Mul for Point2D {
    type Output = f64;
    fn mul(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(x: {}, y: {})", self.x, self.y)
    }
}
