/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 14/03/2025
Last Modified: 19/05/2025
License: MIT
*/
use crate::shapefile::{ShapeCodec, ShapefileSource};
use rstar::{RTree, AABB};
use std::io::Error;
use tellus_common::structures::{BoundingBox, EnvelopeEntry};
use tellus_common::utils::ProgressHandler;

/// Maps an envelope query onto candidate record indices. The result is a
/// superset of the records whose extents intersect the envelope, in no
/// particular order; callers re-test the decoded extents.
pub trait SpatialIndex {
    fn query(&self, envelope: &BoundingBox) -> Vec<usize>;
}

/// An r-tree over record extents.
pub struct RTreeIndex {
    tree: RTree<EnvelopeEntry<usize>>,
}

impl RTreeIndex {
    /// Bulk-loads an index from (record index, extent) pairs.
    pub fn new(entries: Vec<(usize, BoundingBox)>) -> RTreeIndex {
        let entries = entries
            .into_iter()
            .map(|(record, envelope)| EnvelopeEntry::new(record, envelope))
            .collect();
        RTreeIndex {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Builds an index by decoding every record of a source once and
    /// keeping only the extents. Null records are left out of the tree.
    pub fn build<C: ShapeCodec>(
        source: &ShapefileSource<C>,
        progress_handler: &mut dyn ProgressHandler,
    ) -> Result<RTreeIndex, Error> {
        let mut session = source.begin_session()?;
        let total = session.shape_count();
        let mut entries = Vec::with_capacity(total);
        let mut progress: usize;
        let mut old_progress: usize = 1;
        for i in 0..total {
            if let Some(shape) = session.shape_at(i)? {
                entries.push((i, shape.range.extent));
            }
            progress = (100.0_f64 * (i + 1) as f64 / total as f64) as usize;
            if progress != old_progress {
                progress_handler.progress("build_index", progress, source.file_name());
                old_progress = progress;
            }
        }
        Ok(RTreeIndex::new(entries))
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl SpatialIndex for RTreeIndex {
    fn query(&self, envelope: &BoundingBox) -> Vec<usize> {
        let aabb = AABB::from_corners(
            [envelope.min_x, envelope.min_y],
            [envelope.max_x, envelope.max_y],
        );
        self.tree
            .locate_in_envelope_intersecting(&aabb)
            .map(|entry| entry.data)
            .collect()
    }
}
