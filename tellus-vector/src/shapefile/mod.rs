/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 04/03/2024
Last Modified: 19/05/2025
License: MIT

Notes: The logic behind working with the ESRI Shapefile format. The format
uses mixed endianness: file-structure fields (file code, lengths, record
numbers, index records) are big-endian while everything geometric is
little-endian, and both occur within a single record.
*/

// private sub-modules defined in other files
mod index;
mod source;
mod writer;

// exports identifiers from private sub-modules in the current module namespace
pub use self::index::{ShapeHeader, ShapeIndexFile};
pub use self::source::{
    MultiPointCodec, MultiPointShapefileSource, PointCodec, PointShapefileSource, PolyLineCodec,
    PolyLineShapefileSource, PolygonCodec, PolygonShapefileSource, ShapeCodec, ShapeSession,
    ShapefileSource,
};
pub use self::writer::ShapefileWriter;

use crate::geometry::ShapeType;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Error, ErrorKind, Read, Seek, Write};
use tellus_common::utils::{ByteOrderReader, Endianness};

/// The magic number at offset 0 of every .shp and .shx file.
pub(crate) const FILE_CODE: i32 = 9994;

/// The fixed size of the .shp/.shx file header in bytes.
pub(crate) const HEADER_SIZE: usize = 100;

/// The version value written at offset 28.
pub(crate) const VERSION: i32 = 1000;

/// The fixed 100-byte header shared by the .shp and .shx files.
#[derive(Debug, Default, Clone)]
pub struct ShapefileHeader {
    pub file_code: i32,        // BigEndian; value is 9994
    pub file_length: i32,      // BigEndian; in 16-bit words
    pub version: i32,          // LittleEndian
    pub shape_type: ShapeType, // LittleEndian
    pub x_min: f64,            // LittleEndian
    pub y_min: f64,            // LittleEndian
    pub x_max: f64,            // LittleEndian
    pub y_max: f64,            // LittleEndian
    pub z_min: f64,            // LittleEndian; 0f64 unless the shape type carries z
    pub z_max: f64,            // LittleEndian; 0f64 unless the shape type carries z
    pub m_min: f64,            // LittleEndian; 0f64 unless the shape type carries m
    pub m_max: f64,            // LittleEndian; 0f64 unless the shape type carries m
}

impl ShapefileHeader {
    /// Parses the header from the start of `bor`. Fails with
    /// `InvalidData` when the stream is shorter than 100 bytes, carries
    /// the wrong file code, or names an unrecognized shape type.
    pub fn read_from<R: Read + Seek>(
        bor: &mut ByteOrderReader<R>,
    ) -> Result<ShapefileHeader, Error> {
        if bor.len() < HEADER_SIZE {
            return Err(Error::new(
                ErrorKind::InvalidData,
                "File is shorter than the 100-byte shapefile header.",
            ));
        }
        let mut header = ShapefileHeader::default();
        bor.set_byte_order(Endianness::BigEndian);
        bor.seek(0)?;
        header.file_code = bor.read_i32()?;
        if header.file_code != FILE_CODE {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("Unexpected shapefile code: {}", header.file_code),
            ));
        }
        bor.seek(24)?;
        header.file_length = bor.read_i32()?;

        // the remainder of the header is little-endian
        bor.set_byte_order(Endianness::LittleEndian);
        header.version = bor.read_i32()?;
        header.shape_type = ShapeType::from_int(bor.read_i32()?)?;

        // bounding box
        header.x_min = bor.read_f64()?;
        header.y_min = bor.read_f64()?;
        header.x_max = bor.read_f64()?;
        header.y_max = bor.read_f64()?;
        header.z_min = bor.read_f64()?;
        header.z_max = bor.read_f64()?;
        header.m_min = bor.read_f64()?;
        header.m_max = bor.read_f64()?;
        Ok(header)
    }

    /// Reads the header of the named file.
    pub fn read_file(file_name: &str) -> Result<ShapefileHeader, Error> {
        let f = File::open(file_name)?;
        let mut bor = ByteOrderReader::new(BufReader::new(f), Endianness::BigEndian)?;
        ShapefileHeader::read_from(&mut bor)
    }

    /// Writes the 100 header bytes. `file_length` must already be set to
    /// the final file length in 16-bit words.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        writer.write_i32::<BigEndian>(FILE_CODE)?;
        // unused header bytes
        for _ in 0..5 {
            writer.write_i32::<BigEndian>(0i32)?;
        }
        writer.write_i32::<BigEndian>(self.file_length)?;
        writer.write_i32::<LittleEndian>(VERSION)?;
        writer.write_i32::<LittleEndian>(self.shape_type.to_int())?;
        writer.write_f64::<LittleEndian>(self.x_min)?;
        writer.write_f64::<LittleEndian>(self.y_min)?;
        writer.write_f64::<LittleEndian>(self.x_max)?;
        writer.write_f64::<LittleEndian>(self.y_max)?;
        writer.write_f64::<LittleEndian>(self.z_min)?;
        writer.write_f64::<LittleEndian>(self.z_max)?;
        writer.write_f64::<LittleEndian>(self.m_min)?;
        writer.write_f64::<LittleEndian>(self.m_max)?;
        Ok(())
    }
}

impl fmt::Display for ShapefileHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = format!(
            "file_code: {}
file_length: {}
version: {}
shape_type: {}
x_min: {}
x_max: {}
y_min: {}
y_max: {}
z_min: {}
z_max: {}
m_min: {}
m_max: {}",
            self.file_code,
            self.file_length,
            self.version,
            self.shape_type,
            self.x_min,
            self.x_max,
            self.y_min,
            self.y_max,
            self.z_min,
            self.z_max,
            self.m_min,
            self.m_max
        );
        write!(f, "{}", s)
    }
}
