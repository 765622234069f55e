/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 04/03/2024
Last Modified: 19/05/2025
License: MIT
*/
use super::{ShapefileHeader, HEADER_SIZE};
use std::fs::File;
use std::io::{BufReader, Error, ErrorKind};
use tellus_common::utils::{ByteOrderReader, Endianness};

/// One .shx record: the byte position and length of the matching .shp
/// record, both stored in 16-bit words.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShapeHeader {
    pub offset: i32,         // BigEndian; in 16-bit words
    pub content_length: i32, // BigEndian; in 16-bit words
}

impl ShapeHeader {
    pub fn byte_offset(&self) -> u64 {
        self.offset as u64 * 2
    }

    pub fn byte_length(&self) -> usize {
        self.content_length as usize * 2
    }
}

/// The parsed contents of a .shx index file: the 100-byte header followed
/// by one `ShapeHeader` per record.
#[derive(Clone, Debug)]
pub struct ShapeIndexFile {
    pub header: ShapefileHeader,
    pub shapes: Vec<ShapeHeader>,
}

impl ShapeIndexFile {
    /// Reads and validates a .shx file. Record offsets must be strictly
    /// increasing and must not point inside the file header; a file of
    /// exactly 100 bytes is a valid, empty index.
    pub fn read_file(file_name: &str) -> Result<ShapeIndexFile, Error> {
        let f = File::open(file_name)?;
        let mut bor = ByteOrderReader::new(BufReader::new(f), Endianness::BigEndian)?;
        let header = ShapefileHeader::read_from(&mut bor)?;

        let num_records = (bor.len() - HEADER_SIZE) / 8;
        let mut shapes = Vec::with_capacity(num_records);
        bor.set_byte_order(Endianness::BigEndian);
        bor.seek(HEADER_SIZE)?;
        let mut previous_offset = 0i32;
        for i in 0..num_records {
            let offset = bor.read_i32()?;
            let content_length = bor.read_i32()?;
            if offset * 2 < HEADER_SIZE as i32 {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("Shape index record {} points inside the file header.", i),
                ));
            }
            if offset <= previous_offset {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("Shape index offsets are not increasing at record {}.", i),
                ));
            }
            previous_offset = offset;
            shapes.push(ShapeHeader {
                offset,
                content_length,
            });
        }
        Ok(ShapeIndexFile { header, shapes })
    }

    pub fn record_count(&self) -> usize {
        self.shapes.len()
    }
}
