/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 14/03/2025
Last Modified: 19/05/2025
License: MIT
*/
use super::BoundingBox;
use rstar::primitives::Rectangle;
use rstar::{RTreeObject, AABB};

type RectangleF64 = Rectangle<[f64; 2]>;

/// An r-tree entry pairing an axis-aligned envelope with caller data,
/// typically a record index. Insert these into an `rstar::RTree` to answer
/// envelope queries over shape extents.
#[derive(Debug, Clone)]
pub struct EnvelopeEntry<T> {
    pub data: T,
    rectangle: RectangleF64,
}

impl<T> EnvelopeEntry<T> {
    pub fn new(data: T, envelope: BoundingBox) -> Self {
        let rectangle = RectangleF64::from_corners(
            [envelope.min_x, envelope.min_y],
            [envelope.max_x, envelope.max_y],
        );
        EnvelopeEntry { data, rectangle }
    }
}

impl<T> RTreeObject for EnvelopeEntry<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.rectangle.envelope()
    }
}
