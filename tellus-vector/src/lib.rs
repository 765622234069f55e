/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 11/02/2024
Last Modified: 19/05/2025
License: MIT
*/

// private sub-modules defined in other files
pub mod geometry;
pub mod shapefile;
pub mod spatial;

// exports identifiers from sub-modules in the current module namespace
pub use crate::geometry::{
    shapes_intersect, FeatureKind, LineShape, MultiPointShape, PartRange, PartSpan, PointShape,
    PolygonShape, SegmentIter, Shape, ShapeGeometry, ShapeRange, ShapeType, ShapeTypeDimension,
};
pub use crate::shapefile::{
    MultiPointShapefileSource, PointShapefileSource, PolyLineShapefileSource,
    PolygonShapefileSource, ShapeHeader, ShapeIndexFile, ShapeSession, ShapefileHeader,
    ShapefileSource, ShapefileWriter,
};
pub use crate::spatial::{RTreeIndex, SpatialIndex};
