/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 11/02/2024
Last Modified: 03/09/2024
License: MIT
*/
use super::Point2D;

/// An axis-aligned bounding rectangle in 2-D, used as the extent of shapes,
/// parts, and query envelopes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> BoundingBox {
        let (x1, x2) = if min_x < max_x {
            (min_x, max_x)
        } else {
            (max_x, min_x)
        };
        let (y1, y2) = if min_y < max_y {
            (min_y, max_y)
        } else {
            (max_y, min_y)
        };
        BoundingBox {
            min_x: x1,
            min_y: y1,
            max_x: x2,
            max_y: y2,
        }
    }

    pub fn from_two_points(p1: Point2D, p2: Point2D) -> BoundingBox {
        BoundingBox::new(p1.x, p2.x, p1.y, p2.y)
    }

    pub fn get_width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn get_height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// An initialized box has been grown around at least one point; the
    /// default box is inverted and overlaps nothing.
    pub fn is_initialized(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    pub fn overlaps(&self, other: BoundingBox) -> bool {
        !(self.max_y < other.min_y
            || self.max_x < other.min_x
            || self.min_y > other.max_y
            || self.min_x > other.max_x)
    }

    pub fn contains(&self, other: BoundingBox) -> bool {
        other.max_y <= self.max_y
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.min_x >= self.min_x
    }

    pub fn is_point_in_box(&self, x: f64, y: f64) -> bool {
        !(self.max_y < y || self.max_x < x || self.min_y > y || self.min_x > x)
    }

    pub fn intersect(&self, other: BoundingBox) -> BoundingBox {
        let max_y = if self.max_y <= other.max_y {
            self.max_y
        } else {
            other.max_y
        };
        let max_x = if self.max_x <= other.max_x {
            self.max_x
        } else {
            other.max_x
        };
        let min_y = if self.min_y >= other.min_y {
            self.min_y
        } else {
            other.min_y
        };
        let min_x = if self.min_x >= other.min_x {
            self.min_x
        } else {
            other.min_x
        };
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn expand_to(&mut self, other: BoundingBox) {
        if other.max_y > self.max_y {
            self.max_y = other.max_y;
        }
        if other.max_x > self.max_x {
            self.max_x = other.max_x;
        }
        if other.min_y < self.min_y {
            self.min_y = other.min_y;
        }
        if other.min_x < self.min_x {
            self.min_x = other.min_x;
        }
    }

    pub fn expand_to_point(&mut self, x: f64, y: f64) {
        if x < self.min_x {
            self.min_x = x;
        }
        if x > self.max_x {
            self.max_x = x;
        }
        if y < self.min_y {
            self.min_y = y;
        }
        if y > self.max_y {
            self.max_y = y;
        }
    }
}

impl Default for BoundingBox {
    fn default() -> BoundingBox {
        // inverted so that the first expand_to_point establishes the extent
        BoundingBox {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }
}
