/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 22/04/2024
Last Modified: 19/05/2025
License: MIT

Notes: End-to-end tests that write real .shp/.shx pairs into the system
temp directory and read them back through the record sources.
*/
use tellus_common::structures::{BoundingBox, Point2D};
use tellus_common::utils::SilentProgress;
use tellus_vector::{
    MultiPointShapefileSource, PointShapefileSource, PolyLineShapefileSource,
    PolygonShapefileSource, PolygonShape, RTreeIndex, Shape, ShapeIndexFile, ShapeType,
    ShapefileHeader, ShapefileWriter,
};

const TOL: f64 = 1e-9;

fn temp_shp(name: &str) -> String {
    let mut dir = std::env::temp_dir();
    dir.push(format!("tellus_it_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(format!("{}.shp", name))
        .to_string_lossy()
        .to_string()
}

fn cleanup(shp: &str) {
    std::fs::remove_file(shp).ok();
    std::fs::remove_file(shp.replace(".shp", ".shx")).ok();
}

fn square(x0: f64, y0: f64, size: f64) -> Vec<Point2D> {
    vec![
        Point2D::new(x0, y0),
        Point2D::new(x0 + size, y0),
        Point2D::new(x0 + size, y0 + size),
        Point2D::new(x0, y0 + size),
        Point2D::new(x0, y0),
    ]
}

/// A 5x5 grid of 1x1 squares with 1-unit gaps, row-major from the origin.
fn write_polygon_grid(shp: &str) {
    let mut writer = ShapefileWriter::new(shp, ShapeType::Polygon);
    for row in 0..5 {
        for col in 0..5 {
            let ring = square(col as f64 * 2.0, row as f64 * 2.0, 1.0);
            writer.add_record(Shape::polygon(&[&ring])).unwrap();
        }
    }
    writer.write().unwrap();
}

#[test]
fn polygon_round_trip_with_hole() {
    let shp = temp_shp("poly_hole");
    let shell = square(0.0, 0.0, 10.0);
    let mut hole = square(4.0, 4.0, 2.0);
    hole.reverse();
    let donut = Shape::polygon(&[&shell, &hole]);
    let plain = Shape::polygon(&[&square(20.0, 20.0, 5.0)]);

    let mut writer = ShapefileWriter::new(&shp, ShapeType::Polygon);
    writer.add_record(donut.clone()).unwrap();
    writer.add_record(plain).unwrap();
    writer.write().unwrap();

    let source = PolygonShapefileSource::open(&shp).unwrap();
    assert_eq!(source.shape_count().unwrap(), 2);

    let mut session = source.begin_session().unwrap();
    let shape = session.shape_at(0).unwrap().unwrap();
    assert_eq!(shape.range.record_number, 1);
    assert_eq!(shape.num_parts(), 2);
    assert_eq!(shape.num_points(), 10);
    assert_eq!(shape.vertices, donut.vertices);

    // the part spans tile the point array
    let total: usize = shape.range.parts.iter().map(|p| p.num_vertices).sum();
    assert_eq!(total, shape.num_points());
    assert_eq!(
        shape.part(shape.num_parts() - 1).end_index(),
        shape.num_points() - 1
    );
    assert_eq!(shape.part(0).is_hole(), false);
    assert!(shape.part(1).is_hole());

    // the decoded flat arrays answer containment queries directly
    let pg = PolygonShape::new(&shape.range, &shape.vertices).unwrap();
    assert!(pg.contains_point(Point2D::new(1.0, 1.0), TOL));
    assert_eq!(pg.contains_point(Point2D::new(5.0, 5.0), TOL), false);
    assert_eq!(pg.contains_point(Point2D::new(15.0, 5.0), TOL), false);

    cleanup(&shp);
}

#[test]
fn header_and_index_fidelity() {
    let shp = temp_shp("header_fidelity");
    write_polygon_grid(&shp);

    let header = ShapefileHeader::read_file(&shp).unwrap();
    assert_eq!(header.shape_type, ShapeType::Polygon);
    assert_eq!(header.x_min, 0.0);
    assert_eq!(header.y_min, 0.0);
    assert_eq!(header.x_max, 9.0);
    assert_eq!(header.y_max, 9.0);

    // the declared file length is the actual file length
    let metadata = std::fs::metadata(&shp).unwrap();
    assert_eq!(metadata.len(), header.file_length as u64 * 2);

    let shx = ShapeIndexFile::read_file(&shp.replace(".shp", ".shx")).unwrap();
    assert_eq!(shx.record_count(), 25);
    let mut previous = 0u64;
    for record in &shx.shapes {
        assert!(record.byte_offset() >= 100);
        assert!(record.byte_offset() > previous);
        previous = record.byte_offset();
    }

    cleanup(&shp);
}

#[test]
fn paging_visits_every_record_exactly_once() {
    let shp = temp_shp("paging");
    let mut writer = ShapefileWriter::new(&shp, ShapeType::Point);
    for i in 0..25 {
        writer
            .add_record(Shape::point(i as f64, -(i as f64)))
            .unwrap();
    }
    writer.write().unwrap();

    let source = PointShapefileSource::open(&shp).unwrap();
    let mut session = source.begin_session().unwrap();
    let total = session.shape_count();
    assert_eq!(total, 25);

    let mut start_index = 0usize;
    let mut record_numbers: Vec<i32> = Vec::new();
    let mut pages = 0usize;
    while start_index < total {
        let page = session.shapes(&mut start_index, 4, None).unwrap();
        for shape in &page {
            record_numbers.push(shape.range.record_number);
        }
        pages += 1;
    }
    assert_eq!(pages, 7);
    assert_eq!(record_numbers.len(), 25);
    let expected: Vec<i32> = (1..=25).collect();
    assert_eq!(record_numbers, expected);

    cleanup(&shp);
}

#[test]
fn re_reading_a_record_is_idempotent() {
    let shp = temp_shp("idempotent");
    write_polygon_grid(&shp);

    let source = PolygonShapefileSource::open(&shp).unwrap();
    let first = {
        let mut session = source.begin_session().unwrap();
        session.shape_at(7).unwrap().unwrap()
    };
    // the first session is gone; a fresh one re-reads the .shx from disk
    let second = {
        let mut session = source.begin_session().unwrap();
        session.shape_at(7).unwrap().unwrap()
    };
    assert_eq!(first.vertices, second.vertices);
    assert_eq!(first.range.record_number, second.range.record_number);
    assert_eq!(first.range.parts, second.range.parts);

    cleanup(&shp);
}

#[test]
fn envelope_queries_with_and_without_an_index() {
    let shp = temp_shp("envelope");
    write_polygon_grid(&shp);
    let envelope = BoundingBox::new(1.5, 4.5, 1.5, 4.5);

    // linear scan
    let plain = PolygonShapefileSource::open(&shp).unwrap();
    let mut session = plain.begin_session().unwrap();
    let mut start_index = 0usize;
    let scanned = session.shapes(&mut start_index, 100, Some(&envelope)).unwrap();
    assert_eq!(start_index, 25);
    let mut scanned_records: Vec<i32> = scanned.iter().map(|s| s.range.record_number).collect();
    scanned_records.sort_unstable();
    assert_eq!(scanned.len(), 4);
    drop(session);

    // indexed
    let mut indexed = PolygonShapefileSource::open(&shp).unwrap();
    let rtree = RTreeIndex::build(&indexed, &mut SilentProgress).unwrap();
    assert_eq!(rtree.len(), 25);
    indexed.set_spatial_index(Box::new(rtree));
    let mut session = indexed.begin_session().unwrap();
    let mut start_index = 0usize;
    let hits = session.shapes(&mut start_index, 100, Some(&envelope)).unwrap();
    assert_eq!(start_index, 25);
    let mut hit_records: Vec<i32> = hits.iter().map(|s| s.range.record_number).collect();
    hit_records.sort_unstable();
    assert_eq!(hit_records, scanned_records);

    // every returned extent really intersects the envelope
    for shape in &hits {
        assert!(shape.range.extent.overlaps(envelope));
    }

    cleanup(&shp);
}

#[test]
fn random_access_reads() {
    let shp = temp_shp("random_access");
    write_polygon_grid(&shp);

    let source = PolygonShapefileSource::open(&shp).unwrap();
    let mut session = source.begin_session().unwrap();
    assert_eq!(session.index().record_count(), 25);
    let shapes = session.shapes_at(&[7, 2, 11]).unwrap();
    let records: Vec<i32> = shapes.iter().map(|s| s.range.record_number).collect();
    assert_eq!(records, vec![8, 3, 12]);

    // past-the-end indices are caller errors
    assert!(session.shapes_at(&[25]).is_err());

    cleanup(&shp);
}

#[test]
fn measure_presence_is_per_record() {
    let shp = temp_shp("polyline_m");
    let mut writer = ShapefileWriter::new(&shp, ShapeType::PolyLineM);
    let mut with_m = Shape::new(ShapeType::PolyLineM);
    with_m.add_part_m(
        &[Point2D::new(0.0, 0.0), Point2D::new(3.0, 4.0)],
        &[0.0, 5.0],
    );
    writer.add_record(with_m).unwrap();
    let mut without_m = Shape::new(ShapeType::PolyLineM);
    without_m.add_part(&[Point2D::new(1.0, 1.0), Point2D::new(2.0, 2.0)]);
    writer.add_record(without_m).unwrap();
    writer.write().unwrap();

    let source = PolyLineShapefileSource::open(&shp).unwrap();
    let mut session = source.begin_session().unwrap();
    let first = session.shape_at(0).unwrap().unwrap();
    assert_eq!(first.m, Some(vec![0.0, 5.0]));
    assert_eq!(first.m_min, 0.0);
    assert_eq!(first.m_max, 5.0);
    let second = session.shape_at(1).unwrap().unwrap();
    assert!(second.m.is_none());

    cleanup(&shp);
}

#[test]
fn point_z_with_optional_measure() {
    let shp = temp_shp("point_z");
    let mut writer = ShapefileWriter::new(&shp, ShapeType::PointZ);

    let mut with_m = Shape::new(ShapeType::PointZ);
    with_m.add_point(Point2D::new(1.0, 2.0));
    with_m.z = Some(vec![7.5]);
    with_m.z_min = 7.5;
    with_m.z_max = 7.5;
    with_m.m = Some(vec![3.25]);
    with_m.m_min = 3.25;
    with_m.m_max = 3.25;
    writer.add_record(with_m).unwrap();

    let mut without_m = Shape::new(ShapeType::PointZ);
    without_m.add_point(Point2D::new(-1.0, -2.0));
    without_m.z = Some(vec![-7.5]);
    without_m.z_min = -7.5;
    without_m.z_max = -7.5;
    writer.add_record(without_m).unwrap();
    writer.write().unwrap();

    let source = PointShapefileSource::open(&shp).unwrap();
    let mut session = source.begin_session().unwrap();
    let first = session.shape_at(0).unwrap().unwrap();
    assert_eq!(first.z, Some(vec![7.5]));
    assert_eq!(first.m, Some(vec![3.25]));
    let second = session.shape_at(1).unwrap().unwrap();
    assert_eq!(second.z, Some(vec![-7.5]));
    assert!(second.m.is_none());

    cleanup(&shp);
}

#[test]
fn null_records_decode_to_none() {
    let shp = temp_shp("null_records");
    let mut writer = ShapefileWriter::new(&shp, ShapeType::Polygon);
    writer.add_record(Shape::new(ShapeType::Null)).unwrap();
    writer
        .add_record(Shape::polygon(&[&square(0.0, 0.0, 1.0)]))
        .unwrap();
    writer.write().unwrap();

    let source = PolygonShapefileSource::open(&shp).unwrap();
    let mut session = source.begin_session().unwrap();
    assert!(session.shape_at(0).unwrap().is_none());
    assert!(session.shape_at(1).unwrap().is_some());

    // null records do not count against a page's quota
    let mut start_index = 0usize;
    let page = session.shapes(&mut start_index, 10, None).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(start_index, 2);

    let all = session.shapes_at(&[0, 1]).unwrap();
    assert_eq!(all.len(), 1);

    cleanup(&shp);
}

#[test]
fn empty_shapefile_is_zero_shapes() {
    let shp = temp_shp("empty");
    ShapefileWriter::new(&shp, ShapeType::Polygon).write().unwrap();

    assert_eq!(std::fs::metadata(&shp).unwrap().len(), 100);

    let source = PolygonShapefileSource::open(&shp).unwrap();
    assert_eq!(source.shape_count().unwrap(), 0);
    let mut session = source.begin_session().unwrap();
    assert_eq!(session.shape_count(), 0);
    let mut start_index = 0usize;
    let page = session.shapes(&mut start_index, 10, None).unwrap();
    assert!(page.is_empty());
    assert_eq!(start_index, 0);

    cleanup(&shp);
}

#[test]
fn wrong_codec_is_rejected() {
    let shp = temp_shp("wrong_codec");
    write_polygon_grid(&shp);
    let err = PointShapefileSource::open(&shp).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    cleanup(&shp);
}

#[test]
fn missing_files_surface_not_found() {
    let err = PolygonShapefileSource::open("/no/such/dir/missing.shp").unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);

    // a .shp without its .shx fails at session start, not at open
    let shp = temp_shp("orphan");
    write_polygon_grid(&shp);
    std::fs::remove_file(shp.replace(".shp", ".shx")).unwrap();
    let source = PolygonShapefileSource::open(&shp).unwrap();
    assert!(source.begin_session().is_err());
    cleanup(&shp);
}

#[test]
fn multipoint_round_trip() {
    let shp = temp_shp("multipoint");
    let points = [
        Point2D::new(0.0, 0.0),
        Point2D::new(4.0, 1.0),
        Point2D::new(2.0, 8.0),
    ];
    let mut writer = ShapefileWriter::new(&shp, ShapeType::MultiPoint);
    writer.add_record(Shape::multipoint(&points)).unwrap();
    writer.write().unwrap();

    let source = MultiPointShapefileSource::open(&shp).unwrap();
    let mut session = source.begin_session().unwrap();
    let shape = session.shape_at(0).unwrap().unwrap();
    assert_eq!(shape.num_parts(), 1);
    assert_eq!(shape.num_points(), 3);
    let decoded: Vec<Point2D> = shape.points().collect();
    assert_eq!(&decoded[..], &points[..]);
    assert_eq!(shape.range.extent, BoundingBox::new(0.0, 4.0, 0.0, 8.0));

    cleanup(&shp);
}

#[test]
fn read_all_reports_every_shape() {
    let shp = temp_shp("read_all");
    write_polygon_grid(&shp);
    let source = PolygonShapefileSource::open(&shp).unwrap();
    let shapes = source.read_all(&mut SilentProgress).unwrap();
    assert_eq!(shapes.len(), 25);
    cleanup(&shp);
}
