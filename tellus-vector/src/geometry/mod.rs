/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 11/02/2024
Last Modified: 19/05/2025
License: MIT
*/
// private sub-modules defined in other files
mod relate;
mod shape;
mod shape_type;

// exports identifiers from private sub-modules in the current module namespace
pub use self::relate::{
    shapes_intersect, LineShape, MultiPointShape, PointShape, PolygonShape, ShapeGeometry,
};
pub use self::shape::{PartRange, PartSpan, SegmentIter, Shape, ShapeRange};
pub use self::shape_type::{FeatureKind, ShapeType, ShapeTypeDimension};
