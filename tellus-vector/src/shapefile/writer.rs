/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 22/04/2024
Last Modified: 19/05/2025
License: MIT
*/
use super::{ShapefileHeader, HEADER_SIZE};
use crate::geometry::{Shape, ShapeType, ShapeTypeDimension};
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::fs::File;
use std::io::{BufWriter, Error, ErrorKind, Write};
use std::path::Path;

/// Assembles a .shp/.shx pair from in-memory shapes. Records are written
/// in the order added; the index file offsets are accumulated alongside.
/// A writer with no records produces a valid, empty 100-byte pair.
pub struct ShapefileWriter {
    file_name: String,
    shape_type: ShapeType,
    records: Vec<Shape>,
}

impl ShapefileWriter {
    pub fn new(file_name: &str, shape_type: ShapeType) -> ShapefileWriter {
        let new_file_name = if file_name.contains(".") {
            file_name.to_string()
        } else {
            // likely no extension provided; default to .shp
            format!("{}.shp", file_name)
        };
        ShapefileWriter {
            file_name: new_file_name,
            shape_type,
            records: vec![],
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn num_records(&self) -> usize {
        self.records.len()
    }

    /// Adds a record. The shape's type must match the file's (null
    /// records are always accepted), and shapes of a Z type must carry z
    /// data; measures are optional even in the M and Z types.
    pub fn add_record(&mut self, shape: Shape) -> Result<(), Error> {
        if shape.range.shape_type != self.shape_type
            && shape.range.shape_type != ShapeType::Null
        {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "Attempted to add a {} record to a {} shapefile.",
                    shape.range.shape_type, self.shape_type
                ),
            ));
        }
        if shape.range.shape_type.dimension() == ShapeTypeDimension::Z && !shape.has_z_data() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Shapes of a z type must carry z data.",
            ));
        }
        if shape.range.shape_type.base_shape_type() == ShapeType::Point
            && shape.range.shape_type.dimension() == ShapeTypeDimension::Measure
            && !shape.has_m_data()
        {
            // a PointM record has no content-length slack to omit the
            // measure from
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "PointM shapes must carry measure data.",
            ));
        }
        self.records.push(shape);
        Ok(())
    }

    /// The record's content length in bytes, including the 4-byte shape
    /// type code, reflecting exactly the fields `write` emits for it.
    fn content_length_bytes(&self, shape: &Shape) -> i32 {
        let num_parts = shape.num_parts() as i32;
        let num_points = shape.num_points() as i32;
        let mut length = match shape.range.shape_type.base_shape_type() {
            ShapeType::Null => 4,
            ShapeType::Point => 4 + 16,
            ShapeType::MultiPoint => 4 + 36 + 16 * num_points,
            _ => 4 + 40 + 4 * num_parts + 16 * num_points,
        };
        if shape.range.shape_type == ShapeType::Null {
            return length;
        }
        match shape.range.shape_type.base_shape_type() {
            ShapeType::Point => {
                if shape.range.shape_type.dimension() == ShapeTypeDimension::Z {
                    length += 8;
                    if shape.has_m_data() {
                        length += 8;
                    }
                }
                if shape.range.shape_type.dimension() == ShapeTypeDimension::Measure {
                    length += 8;
                }
            }
            _ => {
                if shape.range.shape_type.dimension() == ShapeTypeDimension::Z {
                    length += 16 + 8 * num_points;
                }
                if shape.range.shape_type.dimension() != ShapeTypeDimension::XY
                    && shape.has_m_data()
                {
                    length += 16 + 8 * num_points;
                }
            }
        }
        length
    }

    fn calculate_header(&self) -> ShapefileHeader {
        let mut header = ShapefileHeader::default();
        header.shape_type = self.shape_type;
        let mut initialized = false;
        for shape in &self.records {
            if shape.range.shape_type == ShapeType::Null || shape.num_points() == 0 {
                continue;
            }
            if !initialized {
                header.x_min = shape.range.extent.min_x;
                header.y_min = shape.range.extent.min_y;
                header.x_max = shape.range.extent.max_x;
                header.y_max = shape.range.extent.max_y;
                header.z_min = shape.z_min;
                header.z_max = shape.z_max;
                header.m_min = shape.m_min;
                header.m_max = shape.m_max;
                initialized = true;
            } else {
                header.x_min = header.x_min.min(shape.range.extent.min_x);
                header.y_min = header.y_min.min(shape.range.extent.min_y);
                header.x_max = header.x_max.max(shape.range.extent.max_x);
                header.y_max = header.y_max.max(shape.range.extent.max_y);
                header.z_min = header.z_min.min(shape.z_min);
                header.z_max = header.z_max.max(shape.z_max);
                header.m_min = header.m_min.min(shape.m_min);
                header.m_max = header.m_max.max(shape.m_max);
            }
        }
        if !initialized {
            // an empty file gets a zeroed bounding box
            return header;
        }
        if self.shape_type.dimension() != ShapeTypeDimension::Z {
            header.z_min = 0f64;
            header.z_max = 0f64;
        }
        if self.shape_type.dimension() == ShapeTypeDimension::XY
            || !header.m_min.is_finite()
            || !header.m_max.is_finite()
        {
            header.m_min = 0f64;
            header.m_max = 0f64;
        }
        header
    }

    /// Writes the .shp and its .shx companion.
    pub fn write(&self) -> Result<(), Error> {
        let mut header = self.calculate_header();

        let mut size = HEADER_SIZE as i32;
        for shape in &self.records {
            size += 8 + self.content_length_bytes(shape);
        }
        header.file_length = size / 2; // in 16-bit words

        let f = File::create(&self.file_name)?;
        let mut writer = BufWriter::new(f);
        header.write_to(&mut writer)?;

        for (i, shape) in self.records.iter().enumerate() {
            let content_bytes = self.content_length_bytes(shape);
            writer.write_i32::<BigEndian>(i as i32 + 1)?; // record number
            writer.write_i32::<BigEndian>(content_bytes / 2)?; // content length in 16-bit words
            writer.write_i32::<LittleEndian>(shape.range.shape_type.to_int())?;
            if shape.range.shape_type != ShapeType::Null {
                self.write_payload(&mut writer, shape)?;
            }
        }
        writer.flush()?;

        // the index file carries the same 100-byte header, then one
        // (offset, content length) pair per record, in 16-bit words
        let index_file = Path::new(&self.file_name)
            .with_extension("shx")
            .to_string_lossy()
            .to_string();
        let f = File::create(&index_file)?;
        let mut writer = BufWriter::new(f);
        header.file_length = (HEADER_SIZE + 8 * self.records.len()) as i32 / 2;
        header.write_to(&mut writer)?;

        let mut pos = HEADER_SIZE as i32;
        for shape in &self.records {
            let content_bytes = self.content_length_bytes(shape);
            writer.write_i32::<BigEndian>(pos / 2)?;
            writer.write_i32::<BigEndian>(content_bytes / 2)?;
            pos += 8 + content_bytes;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_payload<W: Write>(&self, writer: &mut W, shape: &Shape) -> Result<(), Error> {
        let dimension = shape.range.shape_type.dimension();
        match shape.range.shape_type.base_shape_type() {
            ShapeType::Point => {
                writer.write_f64::<LittleEndian>(shape.vertices[0])?;
                writer.write_f64::<LittleEndian>(shape.vertices[1])?;
                if dimension == ShapeTypeDimension::Z {
                    writer.write_f64::<LittleEndian>(shape.z.as_ref().map_or(0f64, |z| z[0]))?;
                }
                if dimension != ShapeTypeDimension::XY {
                    if let Some(m) = &shape.m {
                        writer.write_f64::<LittleEndian>(m[0])?;
                    }
                }
            }
            ShapeType::MultiPoint => {
                self.write_extent(writer, shape)?;
                writer.write_i32::<LittleEndian>(shape.num_points() as i32)?;
                self.write_points(writer, shape)?;
                self.write_measure_blocks(writer, shape, dimension)?;
            }
            _ => {
                // PolyLine and Polygon share a payload layout
                self.write_extent(writer, shape)?;
                writer.write_i32::<LittleEndian>(shape.num_parts() as i32)?;
                writer.write_i32::<LittleEndian>(shape.num_points() as i32)?;
                for part in &shape.range.parts {
                    writer.write_i32::<LittleEndian>(part.start_vertex as i32)?;
                }
                self.write_points(writer, shape)?;
                self.write_measure_blocks(writer, shape, dimension)?;
            }
        }
        Ok(())
    }

    fn write_extent<W: Write>(&self, writer: &mut W, shape: &Shape) -> Result<(), Error> {
        writer.write_f64::<LittleEndian>(shape.range.extent.min_x)?;
        writer.write_f64::<LittleEndian>(shape.range.extent.min_y)?;
        writer.write_f64::<LittleEndian>(shape.range.extent.max_x)?;
        writer.write_f64::<LittleEndian>(shape.range.extent.max_y)?;
        Ok(())
    }

    fn write_points<W: Write>(&self, writer: &mut W, shape: &Shape) -> Result<(), Error> {
        for value in &shape.vertices {
            writer.write_f64::<LittleEndian>(*value)?;
        }
        Ok(())
    }

    fn write_measure_blocks<W: Write>(
        &self,
        writer: &mut W,
        shape: &Shape,
        dimension: ShapeTypeDimension,
    ) -> Result<(), Error> {
        if dimension == ShapeTypeDimension::Z {
            writer.write_f64::<LittleEndian>(shape.z_min)?;
            writer.write_f64::<LittleEndian>(shape.z_max)?;
            if let Some(z) = &shape.z {
                for value in z {
                    writer.write_f64::<LittleEndian>(*value)?;
                }
            }
        }
        if dimension != ShapeTypeDimension::XY {
            if let Some(m) = &shape.m {
                writer.write_f64::<LittleEndian>(shape.m_min)?;
                writer.write_f64::<LittleEndian>(shape.m_max)?;
                for value in m {
                    writer.write_f64::<LittleEndian>(*value)?;
                }
            }
        }
        Ok(())
    }
}
