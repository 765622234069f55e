/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 11/02/2024
Last Modified: 03/09/2024
License: MIT
*/
// private sub-modules defined in other files
mod bounding_box;
mod envelope_entry;
mod line_segment;
mod point2d;

// exports identifiers from private sub-modules in the current module namespace
pub use self::bounding_box::BoundingBox;
pub use self::envelope_entry::EnvelopeEntry;
pub use self::line_segment::{LineSegment, SegmentIntersection};
pub use self::point2d::Point2D;
