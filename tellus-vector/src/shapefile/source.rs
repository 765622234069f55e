/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 14/03/2024
Last Modified: 19/05/2025
License: MIT

Notes: Streams individual shape records out of a .shp file, addressed by
0-based record index through the .shx offset table. One generic source
parameterized by a small geometry codec replaces a subclass per feature
type; the codecs differ only in payload layout.
*/
use super::{ShapeIndexFile, ShapefileHeader, HEADER_SIZE};
use crate::geometry::{FeatureKind, PartSpan, Shape, ShapeType, ShapeTypeDimension};
use crate::spatial::SpatialIndex;
use std::fs;
use std::fs::File;
use std::io::{BufReader, Error, ErrorKind, Read, Seek};
use std::path::Path;
use tellus_common::structures::BoundingBox;
use tellus_common::utils::{ByteOrderReader, Endianness, ProgressHandler};

/// Decodes the payload of one shape record for a particular feature
/// class. The record header and shape type code have already been
/// consumed when `decode` is called; `content_bytes` is the record's
/// content length converted to bytes, from which the presence of the
/// optional M block is inferred.
pub trait ShapeCodec: Default {
    /// The feature class this codec produces.
    fn feature_kind(&self) -> FeatureKind;

    /// Whether a file-level shape type can be decoded by this codec.
    fn supports(&self, shape_type: ShapeType) -> bool;

    /// Decodes one record payload, leaving the reader positioned at the
    /// end of the record.
    fn decode<R: Read + Seek>(
        &self,
        bor: &mut ByteOrderReader<R>,
        shape_type: ShapeType,
        content_bytes: i32,
    ) -> Result<Shape, Error>;
}

/// Codec for Point, PointM, and PointZ records.
#[derive(Default)]
pub struct PointCodec;

impl ShapeCodec for PointCodec {
    fn feature_kind(&self) -> FeatureKind {
        FeatureKind::Point
    }

    fn supports(&self, shape_type: ShapeType) -> bool {
        shape_type.base_shape_type() == ShapeType::Point
    }

    fn decode<R: Read + Seek>(
        &self,
        bor: &mut ByteOrderReader<R>,
        shape_type: ShapeType,
        content_bytes: i32,
    ) -> Result<Shape, Error> {
        let mut shape = Shape::new(shape_type);
        let x = bor.read_f64()?;
        let y = bor.read_f64()?;
        shape.vertices.push(x);
        shape.vertices.push(y);
        shape.range.num_points = 1;
        shape.range.parts.push(PartSpan {
            start_vertex: 0,
            num_vertices: 1,
        });
        shape.range.extent = BoundingBox::new(x, x, y, y);

        match shape_type.dimension() {
            ShapeTypeDimension::XY => {}
            ShapeTypeDimension::Measure => {
                let m = bor.read_f64()?;
                shape.m = Some(vec![m]);
                shape.m_min = m;
                shape.m_max = m;
            }
            ShapeTypeDimension::Z => {
                let z = bor.read_f64()?;
                shape.z = Some(vec![z]);
                shape.z_min = z;
                shape.z_max = z;
                // a PointZ record is 36 content bytes with a measure,
                // 28 without; the z variant nominally stores both
                if content_bytes == 36 {
                    let m = bor.read_f64()?;
                    shape.m = Some(vec![m]);
                    shape.m_min = m;
                    shape.m_max = m;
                }
            }
        }
        Ok(shape)
    }
}

/// Codec for MultiPoint, MultiPointM, and MultiPointZ records.
#[derive(Default)]
pub struct MultiPointCodec;

impl ShapeCodec for MultiPointCodec {
    fn feature_kind(&self) -> FeatureKind {
        FeatureKind::MultiPoint
    }

    fn supports(&self, shape_type: ShapeType) -> bool {
        shape_type.base_shape_type() == ShapeType::MultiPoint
    }

    fn decode<R: Read + Seek>(
        &self,
        bor: &mut ByteOrderReader<R>,
        shape_type: ShapeType,
        content_bytes: i32,
    ) -> Result<Shape, Error> {
        let mut shape = Shape::new(shape_type);
        shape.range.extent = read_extent(bor)?;
        let num_points = read_count(bor, "point")?;
        shape.range.num_points = num_points;
        shape.range.parts.push(PartSpan {
            start_vertex: 0,
            num_vertices: num_points,
        });
        shape.vertices.reserve(num_points * 2);
        for _ in 0..num_points {
            shape.vertices.push(bor.read_f64()?);
            shape.vertices.push(bor.read_f64()?);
        }

        let mut length_without_m = 40 + 16 * num_points as i32;
        if shape_type.dimension() == ShapeTypeDimension::Z {
            read_z_block(bor, num_points, &mut shape)?;
            length_without_m += 16 + 8 * num_points as i32;
        }
        if shape_type.dimension() != ShapeTypeDimension::XY && content_bytes != length_without_m {
            read_m_block(bor, num_points, &mut shape)?;
        }
        Ok(shape)
    }
}

/// Codec for PolyLine, PolyLineM, and PolyLineZ records.
#[derive(Default)]
pub struct PolyLineCodec;

impl ShapeCodec for PolyLineCodec {
    fn feature_kind(&self) -> FeatureKind {
        FeatureKind::Line
    }

    fn supports(&self, shape_type: ShapeType) -> bool {
        shape_type.base_shape_type() == ShapeType::PolyLine
    }

    fn decode<R: Read + Seek>(
        &self,
        bor: &mut ByteOrderReader<R>,
        shape_type: ShapeType,
        content_bytes: i32,
    ) -> Result<Shape, Error> {
        decode_poly(bor, shape_type, content_bytes)
    }
}

/// Codec for Polygon, PolygonM, and PolygonZ records.
#[derive(Default)]
pub struct PolygonCodec;

impl ShapeCodec for PolygonCodec {
    fn feature_kind(&self) -> FeatureKind {
        FeatureKind::Polygon
    }

    fn supports(&self, shape_type: ShapeType) -> bool {
        shape_type.base_shape_type() == ShapeType::Polygon
    }

    fn decode<R: Read + Seek>(
        &self,
        bor: &mut ByteOrderReader<R>,
        shape_type: ShapeType,
        content_bytes: i32,
    ) -> Result<Shape, Error> {
        decode_poly(bor, shape_type, content_bytes)
    }
}

/// The shared PolyLine/Polygon payload: box, part count, point count,
/// part-start offsets, interleaved points, then optional Z and M blocks.
/// The M block has no tag of its own; its presence is inferred by
/// comparing the record's content length against the size of everything
/// mandatory, because the format treats measures as optional even in the
/// nominally measured shape types.
fn decode_poly<R: Read + Seek>(
    bor: &mut ByteOrderReader<R>,
    shape_type: ShapeType,
    content_bytes: i32,
) -> Result<Shape, Error> {
    let mut shape = Shape::new(shape_type);
    shape.range.extent = read_extent(bor)?;
    let num_parts = read_count(bor, "part")?;
    let num_points = read_count(bor, "point")?;
    shape.range.num_points = num_points;

    let mut part_starts = Vec::with_capacity(num_parts);
    for _ in 0..num_parts {
        part_starts.push(bor.read_i32()?);
    }
    shape.vertices.reserve(num_points * 2);
    for _ in 0..num_points {
        shape.vertices.push(bor.read_f64()?);
        shape.vertices.push(bor.read_f64()?);
    }

    // each part runs from its start offset to the next part's start;
    // the last part runs to the end of the point array
    if num_parts == 0 && num_points > 0 {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "Record stores points but no parts.",
        ));
    }
    for i in 0..num_parts {
        let start = part_starts[i];
        let end = if i + 1 < num_parts {
            part_starts[i + 1]
        } else {
            num_points as i32
        };
        if (i == 0 && start != 0) || end < start || end > num_points as i32 {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("Malformed part offset at part {}.", i),
            ));
        }
        shape.range.parts.push(PartSpan {
            start_vertex: start as usize,
            num_vertices: (end - start) as usize,
        });
    }

    let mut length_without_m = 44 + 4 * num_parts as i32 + 16 * num_points as i32;
    if shape_type.dimension() == ShapeTypeDimension::Z {
        read_z_block(bor, num_points, &mut shape)?;
        length_without_m += 16 + 8 * num_points as i32;
    }
    if shape_type.dimension() != ShapeTypeDimension::XY && content_bytes != length_without_m {
        read_m_block(bor, num_points, &mut shape)?;
    }
    Ok(shape)
}

fn read_extent<R: Read + Seek>(bor: &mut ByteOrderReader<R>) -> Result<BoundingBox, Error> {
    let x_min = bor.read_f64()?;
    let y_min = bor.read_f64()?;
    let x_max = bor.read_f64()?;
    let y_max = bor.read_f64()?;
    Ok(BoundingBox::new(x_min, x_max, y_min, y_max))
}

fn read_count<R: Read + Seek>(bor: &mut ByteOrderReader<R>, what: &str) -> Result<usize, Error> {
    let value = bor.read_i32()?;
    if value < 0 {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("Negative {} count in record.", what),
        ));
    }
    Ok(value as usize)
}

fn read_z_block<R: Read + Seek>(
    bor: &mut ByteOrderReader<R>,
    num_points: usize,
    shape: &mut Shape,
) -> Result<(), Error> {
    shape.z_min = bor.read_f64()?;
    shape.z_max = bor.read_f64()?;
    let mut values = Vec::with_capacity(num_points);
    for _ in 0..num_points {
        values.push(bor.read_f64()?);
    }
    shape.z = Some(values);
    Ok(())
}

fn read_m_block<R: Read + Seek>(
    bor: &mut ByteOrderReader<R>,
    num_points: usize,
    shape: &mut Shape,
) -> Result<(), Error> {
    shape.m_min = bor.read_f64()?;
    shape.m_max = bor.read_f64()?;
    let mut values = Vec::with_capacity(num_points);
    for _ in 0..num_points {
        values.push(bor.read_f64()?);
    }
    shape.m = Some(values);
    Ok(())
}

/// A .shp file addressed record by record. Opening a source validates
/// the header and the codec/shape-type pairing; actual record reads go
/// through a `ShapeSession`, which holds the .shx table in memory and an
/// open handle on the .shp for its own lifetime and no longer.
pub struct ShapefileSource<C: ShapeCodec> {
    file_name: String,
    header: ShapefileHeader,
    codec: C,
    spatial_index: Option<Box<dyn SpatialIndex>>,
}

impl<C: ShapeCodec> core::fmt::Debug for ShapefileSource<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ShapefileSource")
            .field("file_name", &self.file_name)
            .field("header", &self.header)
            .field("has_spatial_index", &self.spatial_index.is_some())
            .finish()
    }
}

pub type PointShapefileSource = ShapefileSource<PointCodec>;
pub type MultiPointShapefileSource = ShapefileSource<MultiPointCodec>;
pub type PolyLineShapefileSource = ShapefileSource<PolyLineCodec>;
pub type PolygonShapefileSource = ShapefileSource<PolygonCodec>;

impl<C: ShapeCodec> ShapefileSource<C> {
    /// Opens a source on a .shp file. Fails when the file is missing,
    /// malformed, or of a shape type the codec cannot decode.
    pub fn open(file_name: &str) -> Result<ShapefileSource<C>, Error> {
        let codec = C::default();
        let header = ShapefileHeader::read_file(file_name)?;
        if header.shape_type != ShapeType::Null && !codec.supports(header.shape_type) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "Shape type {} cannot be read as {} features.",
                    header.shape_type,
                    codec.feature_kind()
                ),
            ));
        }
        // projection files are never parsed here, but their absence is
        // worth flagging to the console
        if !Path::new(file_name).with_extension("prj").exists() {
            println!("Warning: Projection file not located.");
        }
        Ok(ShapefileSource {
            file_name: file_name.to_string(),
            header,
            codec,
            spatial_index: None,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn header(&self) -> &ShapefileHeader {
        &self.header
    }

    /// Attaches a spatial index used by envelope-filtered reads.
    pub fn set_spatial_index(&mut self, index: Box<dyn SpatialIndex>) {
        self.spatial_index = Some(index);
    }

    pub fn clear_spatial_index(&mut self) {
        self.spatial_index = None;
    }

    fn index_file_name(&self) -> String {
        Path::new(&self.file_name)
            .with_extension("shx")
            .to_string_lossy()
            .to_string()
    }

    /// The number of records, computed from the .shx file length alone.
    pub fn shape_count(&self) -> Result<usize, Error> {
        let metadata = fs::metadata(self.index_file_name())?;
        let len = metadata.len() as usize;
        if len < HEADER_SIZE {
            return Err(Error::new(
                ErrorKind::InvalidData,
                "Shape index file is shorter than the 100-byte header.",
            ));
        }
        Ok((len - HEADER_SIZE) / 8)
    }

    /// Starts a read session: loads the .shx into memory and opens the
    /// .shp. Dropping the session releases both.
    pub fn begin_session(&self) -> Result<ShapeSession<'_, C>, Error> {
        let shx = ShapeIndexFile::read_file(&self.index_file_name())?;
        let f = File::open(&self.file_name)?;
        let reader = ByteOrderReader::new(BufReader::new(f), Endianness::BigEndian)?;
        Ok(ShapeSession {
            source: self,
            shx,
            reader,
        })
    }

    /// Reads every record of the file, skipping null shapes, reporting
    /// percent progress as it goes.
    pub fn read_all(&self, progress_handler: &mut dyn ProgressHandler) -> Result<Vec<Shape>, Error> {
        let mut session = self.begin_session()?;
        let total = session.shape_count();
        let mut shapes = Vec::with_capacity(total);
        let mut progress: usize;
        let mut old_progress: usize = 1;
        for i in 0..total {
            if let Some(shape) = session.shape_at(i)? {
                shapes.push(shape);
            }
            progress = (100.0_f64 * (i + 1) as f64 / total as f64) as usize;
            if progress != old_progress {
                progress_handler.progress("read_shapes", progress, &self.file_name);
                old_progress = progress;
            }
        }
        Ok(shapes)
    }
}

/// A scoped read session over one shapefile. The .shx offset table is
/// read once at session start; every record read seeks directly to its
/// byte offset. Sessions borrow their source, so a session can never
/// outlive the source configuration it reads with.
pub struct ShapeSession<'a, C: ShapeCodec> {
    source: &'a ShapefileSource<C>,
    shx: ShapeIndexFile,
    reader: ByteOrderReader<BufReader<File>>,
}

impl<'a, C: ShapeCodec> ShapeSession<'a, C> {
    pub fn shape_count(&self) -> usize {
        self.shx.record_count()
    }

    pub fn index(&self) -> &ShapeIndexFile {
        &self.shx
    }

    /// Decodes the record at a 0-based index. Null-shape records decode
    /// to `Ok(None)`.
    pub fn shape_at(&mut self, index: usize) -> Result<Option<Shape>, Error> {
        let record = match self.shx.shapes.get(index) {
            Some(r) => *r,
            None => {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!(
                        "Record {} requested but the index holds {} records.",
                        index,
                        self.shx.record_count()
                    ),
                ));
            }
        };

        self.reader.set_byte_order(Endianness::BigEndian);
        self.reader.seek(record.byte_offset() as usize)?;
        let record_number = self.reader.read_i32()?;
        let content_length = self.reader.read_i32()?;

        self.reader.set_byte_order(Endianness::LittleEndian);
        let code = self.reader.read_i32()?;
        if code == ShapeType::Null.to_int() {
            return Ok(None);
        }
        let shape_type = ShapeType::from_int(code)?;
        if !self.source.codec.supports(shape_type) {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!(
                    "Record {} has shape type {}, which cannot be read as {} features.",
                    index,
                    shape_type,
                    self.source.codec.feature_kind()
                ),
            ));
        }

        let mut shape = self
            .source
            .codec
            .decode(&mut self.reader, shape_type, content_length * 2)?;
        shape.range.record_number = record_number;
        shape.range.content_length = content_length;
        Ok(Some(shape))
    }

    /// Reads up to `count` shapes starting at `*start_index`, optionally
    /// keeping only those whose extent intersects `envelope`. On return,
    /// `*start_index` is one past the last record *tested* (not merely
    /// returned), so repeated calls page through the file without gaps or
    /// duplicates. When the source carries a spatial index and an
    /// envelope is given, only indexed candidates are decoded; records
    /// the index rules out are skipped wholesale.
    pub fn shapes(
        &mut self,
        start_index: &mut usize,
        count: usize,
        envelope: Option<&BoundingBox>,
    ) -> Result<Vec<Shape>, Error> {
        let total = self.shx.record_count();
        let mut shapes = Vec::new();

        let source = self.source;
        if let (Some(index), Some(env)) = (source.spatial_index.as_ref(), envelope) {
            // index query order is unspecified; sorting keeps disk access
            // sequential-ish and paging deterministic
            let mut candidates: Vec<usize> = index
                .query(env)
                .into_iter()
                .filter(|&i| i >= *start_index && i < total)
                .collect();
            candidates.sort_unstable();
            candidates.dedup();

            let mut exhausted = true;
            for i in candidates {
                if shapes.len() >= count {
                    exhausted = false;
                    break;
                }
                if let Some(shape) = self.shape_at(i)? {
                    if shape.range.extent.overlaps(*env) {
                        shapes.push(shape);
                    }
                }
                *start_index = i + 1;
            }
            if exhausted {
                // every remaining record is a known non-match
                *start_index = total;
            }
        } else {
            let mut i = *start_index;
            while i < total && shapes.len() < count {
                if let Some(shape) = self.shape_at(i)? {
                    let keep = match envelope {
                        Some(env) => shape.range.extent.overlaps(*env),
                        None => true,
                    };
                    if keep {
                        shapes.push(shape);
                    }
                }
                i += 1;
            }
            *start_index = i;
        }
        Ok(shapes)
    }

    /// Random-access decode for a caller-supplied index list. No envelope
    /// filtering is applied; null records are skipped.
    pub fn shapes_at(&mut self, indices: &[usize]) -> Result<Vec<Shape>, Error> {
        let mut shapes = Vec::with_capacity(indices.len());
        for &i in indices {
            if let Some(shape) = self.shape_at(i)? {
                shapes.push(shape);
            }
        }
        Ok(shapes)
    }
}
