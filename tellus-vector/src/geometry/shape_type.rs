/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 11/02/2024
Last Modified: 03/09/2024
License: MIT
*/
use std::fmt;
use std::io::{Error, ErrorKind};

/// The on-disk shape type codes of the shapefile format.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShapeType {
    Null = 0,
    Point = 1,
    PolyLine = 3,
    Polygon = 5,
    MultiPoint = 8,
    PointZ = 11,
    PolyLineZ = 13,
    PolygonZ = 15,
    MultiPointZ = 18,
    PointM = 21,
    PolyLineM = 23,
    PolygonM = 25,
    MultiPointM = 28,
}

impl ShapeType {
    /// Maps an on-disk shape type code onto the enum. Unrecognized codes
    /// are data errors, not panics; shapefiles written by other software
    /// are untrusted input.
    pub fn from_int(value: i32) -> Result<ShapeType, Error> {
        match value {
            0 => Ok(ShapeType::Null),
            1 => Ok(ShapeType::Point),
            3 => Ok(ShapeType::PolyLine),
            5 => Ok(ShapeType::Polygon),
            8 => Ok(ShapeType::MultiPoint),
            11 => Ok(ShapeType::PointZ),
            13 => Ok(ShapeType::PolyLineZ),
            15 => Ok(ShapeType::PolygonZ),
            18 => Ok(ShapeType::MultiPointZ),
            21 => Ok(ShapeType::PointM),
            23 => Ok(ShapeType::PolyLineM),
            25 => Ok(ShapeType::PolygonM),
            28 => Ok(ShapeType::MultiPointM),
            _ => Err(Error::new(
                ErrorKind::InvalidData,
                format!("Unrecognized shape type code: {}", value),
            )),
        }
    }

    pub fn to_int(&self) -> i32 {
        *self as i32
    }

    /// Strips the M/Z dimension, leaving the base geometry class.
    pub fn base_shape_type(&self) -> ShapeType {
        match self {
            ShapeType::Null => ShapeType::Null,
            ShapeType::Point | ShapeType::PointZ | ShapeType::PointM => ShapeType::Point,
            ShapeType::PolyLine | ShapeType::PolyLineZ | ShapeType::PolyLineM => ShapeType::PolyLine,
            ShapeType::Polygon | ShapeType::PolygonZ | ShapeType::PolygonM => ShapeType::Polygon,
            ShapeType::MultiPoint | ShapeType::MultiPointZ | ShapeType::MultiPointM => {
                ShapeType::MultiPoint
            }
        }
    }

    pub fn dimension(&self) -> ShapeTypeDimension {
        match self {
            ShapeType::Null
            | ShapeType::Point
            | ShapeType::PolyLine
            | ShapeType::Polygon
            | ShapeType::MultiPoint => ShapeTypeDimension::XY,
            ShapeType::PointM
            | ShapeType::PolyLineM
            | ShapeType::PolygonM
            | ShapeType::MultiPointM => ShapeTypeDimension::Measure,
            ShapeType::PointZ
            | ShapeType::PolyLineZ
            | ShapeType::PolygonZ
            | ShapeType::MultiPointZ => ShapeTypeDimension::Z,
        }
    }

    /// The feature class a shape of this type belongs to.
    pub fn feature_kind(&self) -> FeatureKind {
        match self.base_shape_type() {
            ShapeType::Point => FeatureKind::Point,
            ShapeType::PolyLine => FeatureKind::Line,
            ShapeType::Polygon => FeatureKind::Polygon,
            ShapeType::MultiPoint => FeatureKind::MultiPoint,
            _ => FeatureKind::Unspecified,
        }
    }
}

impl Default for ShapeType {
    fn default() -> ShapeType {
        ShapeType::Null
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let printable = match *self {
            ShapeType::Null => "Null",
            ShapeType::Point => "Point",
            ShapeType::PolyLine => "PolyLine",
            ShapeType::Polygon => "Polygon",
            ShapeType::MultiPoint => "MultiPoint",
            ShapeType::PointZ => "PointZ",
            ShapeType::PolyLineZ => "PolyLineZ",
            ShapeType::PolygonZ => "PolygonZ",
            ShapeType::MultiPointZ => "MultiPointZ",
            ShapeType::PointM => "PointM",
            ShapeType::PolyLineM => "PolyLineM",
            ShapeType::PolygonM => "PolygonM",
            ShapeType::MultiPointM => "MultiPointM",
        };
        write!(f, "{}", printable)
    }
}

/// Which per-vertex dimensions a shape type carries beyond x and y.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShapeTypeDimension {
    XY,
    Measure,
    Z,
}

/// The in-memory feature class of a shape, independent of the M/Z
/// dimensionality stored on disk.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FeatureKind {
    Point,
    Line,
    Polygon,
    MultiPoint,
    Unspecified,
}

impl Default for FeatureKind {
    fn default() -> FeatureKind {
        FeatureKind::Unspecified
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let printable = match *self {
            FeatureKind::Point => "Point",
            FeatureKind::Line => "Line",
            FeatureKind::Polygon => "Polygon",
            FeatureKind::MultiPoint => "MultiPoint",
            FeatureKind::Unspecified => "Unspecified",
        };
        write!(f, "{}", printable)
    }
}
