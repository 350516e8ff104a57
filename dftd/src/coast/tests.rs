use std::fs;
use std::path::PathBuf;

use super::loader::tests::encode_png;
use super::*;
use crate::grid::{GridCoord, MapPoint, RasterMap, SEGSCALE};
use crate::log::discard_logger;
use crate::render::{CountingCanvas, MapCanvas, MapVertex};
use crate::triangulate::signed_area2;
use crate::types::*;
use crate::MapError;

// 15 km per pixel, so segments are 4 pixels wide.
const PIXEL_WIDTH: f64 = 15_000.0;

fn build(art: &str) -> CoastMap {
    let raster = RasterMap::from_ascii(art).unwrap();
    let topology = Topology {
        image: "test.png".to_string(),
        realwidth: raster.width() as f64 * PIXEL_WIDTH,
        realoffsetx: 0.0,
        realoffsety: 0.0,
    };
    CoastMap::from_raster(raster, &topology, &discard_logger()).unwrap()
}

fn triangles_area(entry: &CacheEntry) -> f64 {
    entry
        .indices
        .chunks(3)
        .map(|t| {
            let (a, b, c) = (
                entry.points[t[0] as usize],
                entry.points[t[1] as usize],
                entry.points[t[2] as usize],
            );
            ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)) / 2.0
        })
        .sum()
}

fn type_counts(map: &CoastMap) -> (usize, usize, usize) {
    let mut counts = (0, 0, 0);
    for (_, segment) in map.segments().iter() {
        match segment.kind() {
            SegmentType::Sea => counts.0 += 1,
            SegmentType::Land => counts.1 += 1,
            SegmentType::Mixed => counts.2 += 1,
        }
    }
    counts
}

/// Remembers everything drawn.
#[derive(Default)]
struct RecordingCanvas {
    quads: Vec<[MapVertex; 4]>,
    triangles: Vec<(Vec<MapVertex>, Vec<u32>)>,
    strips: Vec<Vec<Pt2>>,
}

impl MapCanvas for RecordingCanvas {
    fn draw_quad(&mut self, corners: &[MapVertex; 4]) {
        self.quads.push(*corners);
    }

    fn draw_triangles(&mut self, vertices: &[MapVertex], indices: &[u32]) {
        self.triangles.push((vertices.to_vec(), indices.to_vec()));
    }

    fn draw_line_strip(&mut self, points: &[Pt2]) {
        self.strips.push(points.to_vec());
    }
}

const SMALL_ISLAND: &str = "
    ....
    .##.
    .##.
    ....
";

// Land in the south west, coast running up x = 6 and along y = 6.
const CORNER_LAND: &str = "
    ........
    ........
    ######..
    ######..
    ######..
    ######..
    ######..
    ######..
";

const ARCHIPELAGO: &str = "
    ................
    ................
    ..######........
    ..#######.......
    ..########......
    ...#######......
    ....#####.......
    ................
    ................
    .........####...
    ........######..
    ........######..
    .........####...
    ................
    ##..............
    ###.............
";

#[test]
fn small_island_is_one_cyclic_piece() {
    let mut map = build(SMALL_ISLAND);
    assert_eq!(4, map.geometry().pixels_per_seg);
    assert_eq!((1, 1), (map.geometry().segs_x, map.geometry().segs_y));

    let segment = map.segment(0, 0);
    assert_eq!(SegmentType::Mixed, segment.kind());
    assert_eq!(1, segment.segcls().len());
    let island = &segment.segcls()[0];
    assert!(island.cyclic);
    assert_eq!(None, island.begin_pos);
    assert_eq!(Some(0), island.next);

    let cache = map.ensure_point_cache(0, 0, 0);
    assert_eq!(1, cache.entries.len());
    let entry = &cache.entries[0];
    let area = signed_area2(&entry.points) / 2.0;
    // Land polygons run counterclockwise, and smoothing only shaves the corners.
    assert!(area > 0.0);
    assert!(area < 4.0 * PIXEL_WIDTH * PIXEL_WIDTH);
    assert!(area > 2.0 * PIXEL_WIDTH * PIXEL_WIDTH);
    assert_relative_eq!(area, triangles_area(entry), max_relative = 1e-6);
}

#[test]
fn island_leaves_neighbors_alone() {
    let map = build(
        "
        ............
        ............
        ............
        ............
        ............
        .....##.....
        .....##.....
        ............
        ............
        ............
        ............
        ............
        ",
    );
    assert_eq!((3, 3), (map.geometry().segs_x, map.geometry().segs_y));
    for ((sx, sy), segment) in map.segments().iter() {
        if (sx, sy) == (1, 1) {
            assert_eq!(SegmentType::Mixed, segment.kind());
            assert_eq!(1, segment.segcls().len());
            assert!(segment.segcls()[0].cyclic);
        } else {
            assert_eq!(0, segment.kind() as u8, "segment ({}, {})", sx, sy);
            assert!(segment.segcls().is_empty());
        }
    }
}

#[test]
fn island_across_four_segments() {
    let mut map = build(
        "
        ........
        ........
        ..####..
        ..####..
        ..####..
        ..####..
        ........
        ........
        ",
    );
    assert_eq!((0, 0, 4), type_counts(&map));

    let mut area = 0.0;
    for (sy, sx) in iproduct!(0..2, 0..2) {
        let segment = map.segment(sx, sy);
        assert_eq!(1, segment.segcls().len(), "segment ({}, {})", sx, sy);
        assert!(!segment.segcls()[0].cyclic);
        let cache = map.ensure_point_cache(sx, sy, 0);
        assert_eq!(1, cache.entries.len());
        area += signed_area2(&cache.entries[0].points) / 2.0;
    }
    let pixels = area / (PIXEL_WIDTH * PIXEL_WIDTH);
    assert!(pixels > 8.0 && pixels < 16.01, "island covers {} pixels", pixels);
}

#[test]
fn straight_coast_splits_segment_in_half() {
    let mut map = build(CORNER_LAND);
    assert_eq!((2, 2), (map.geometry().segs_x, map.geometry().segs_y));
    assert_eq!(SegmentType::Land, map.segment(0, 0).kind());
    assert_eq!((0, 1, 3), type_counts(&map));

    let segw = map.geometry().seg_width_real;
    let cache = map.ensure_point_cache(1, 0, 0);
    assert_eq!(1, cache.entries.len());
    let area = signed_area2(&cache.entries[0].points) / 2.0;
    assert_relative_eq!(0.5 * segw * segw, area, max_relative = 1e-3);
}

#[test]
fn successors_form_closed_chains() {
    let mut map = build(ARCHIPELAGO);
    let (_, _, mixed) = type_counts(&map);
    assert!(mixed > 4);

    let segs_x = map.geometry().segs_x;
    let segs_y = map.geometry().segs_y;
    for (sy, sx) in iproduct!(0..segs_y, 0..segs_x) {
        let segcls = map.segment(sx, sy).segcls().to_vec();
        // Every piece is somebody's successor exactly once.
        let mut targets: Vec<usize> = segcls.iter().map(|segcl| segcl.next.unwrap()).collect();
        targets.sort();
        assert_eq!((0..segcls.len()).collect::<Vec<_>>(), targets);

        let cache = map.ensure_point_cache(sx, sy, 1);
        for entry in &cache.entries {
            let area = signed_area2(&entry.points) / 2.0;
            assert!(area > 0.0, "clockwise land in segment ({}, {})", sx, sy);
            assert_relative_eq!(area, triangles_area(entry), max_relative = 1e-6);
        }
    }
}

#[test]
fn pieces_continue_across_borders() {
    let map = build(ARCHIPELAGO);
    let s = GridCoord::from(SEGSCALE);
    let map_w = map.geometry().segs_x * s;
    let map_h = map.geometry().segs_y * s;
    let on_map_edge = |p: MapPoint| p.x == 0 || p.y == 0 || p.x == map_w || p.y == map_h;

    let mut begins = Vec::new();
    let mut ends = Vec::new();
    for ((sx, sy), segment) in map.segments().iter() {
        for segcl in segment.segcls().iter().filter(|segcl| !segcl.cyclic) {
            begins.push(MapPoint::from_local(sx, sy, segcl.points[0]));
            ends.push(MapPoint::from_local(sx, sy, *segcl.points.last().unwrap()));
        }
    }
    for begin in &begins {
        assert!(ends.contains(begin) || on_map_edge(*begin), "nothing leads into {:?}", begin);
    }
    for end in &ends {
        assert!(begins.contains(end) || on_map_edge(*end), "nothing continues from {:?}", end);
    }
}

#[test]
fn land_query_samples_raster() {
    let map = build(CORNER_LAND);
    assert!(map.is_land_at(Pt2::new(30_000.0, 30_000.0)));
    assert!(!map.is_land_at(Pt2::new(100_000.0, 100_000.0)));
    // Off the map we get the nearest edge cell.
    assert!(map.is_land_at(Pt2::new(-5.0, -5.0)));
    assert!(!map.is_land_at(Pt2::new(1e9, 1e9)));
}

#[test]
fn chart_draws_visible_segments() {
    let mut map = build(CORNER_LAND);
    let mut canvas = CountingCanvas::default();
    map.draw_as_map(Pt2::new(60_000.0, 60_000.0), 1.0 / 1000.0, 0, &mut canvas);
    assert_eq!(1, canvas.quads);
    assert!(canvas.triangles >= 3);
    assert_eq!(0, canvas.line_strips);

    let window = map.visible_segments(Pt2::new(1e8, 1e8), 1.0);
    assert!(window.is_empty());
    let mut far_away = CountingCanvas::default();
    map.draw_as_map(Pt2::new(1e8, 1e8), 1.0, 0, &mut far_away);
    assert_eq!(CountingCanvas::default(), far_away);
}

#[test]
fn visible_window_is_clamped() {
    let map = build(ARCHIPELAGO);
    // Zoomed in on segment (1, 2): 3x3 window around it.
    let segw = map.geometry().seg_width_real;
    let window = map.visible_segments(Pt2::new(1.5 * segw, 2.5 * segw), 1.0);
    assert_eq!(SegmentWindow { x: 0, y: 1, w: 3, h: 3 }, window);
    assert_eq!(9, window.iter().count());

    let corner = map.visible_segments(Pt2::new(0.0, 0.0), 1.0);
    assert_eq!(SegmentWindow { x: 0, y: 0, w: 2, h: 2 }, corner);
}

#[test]
fn render_is_relative_to_viewer() {
    let mut map = build(CORNER_LAND);
    let mut canvas = RecordingCanvas::default();
    map.render(Pt2::new(30_000.0, 30_000.0), 0, true, &mut canvas);
    assert_eq!(1, canvas.quads.len());
    assert_relative_eq!(Pt2::new(-30_000.0, -30_000.0), canvas.quads[0][0].position);
    assert_relative_eq!(Pt2::new(30_000.0, 30_000.0), canvas.quads[0][2].position);
    assert_relative_eq!(Pt2::new(0.0, 1.0), canvas.quads[0][0].texc);

    let mut canvas = RecordingCanvas::default();
    map.render(Pt2::new(90_000.0, 30_000.0), 1, true, &mut canvas);
    assert_eq!(1, canvas.triangles.len());
    assert_eq!(Some(3), map.segment(1, 0).point_cache().map(|cache| cache.detail));

    let mut canvas = RecordingCanvas::default();
    map.render(Pt2::new(90_000.0, 30_000.0), 1, false, &mut canvas);
    assert!(canvas.triangles.is_empty());
    assert_eq!(1, canvas.strips.len());
    // The coast runs straight up through the viewer.
    for p in &canvas.strips[0] {
        assert!(p.x.abs() < 1.0);
    }

    let mut canvas = RecordingCanvas::default();
    map.render(Pt2::new(-1.0, 0.0), 0, true, &mut canvas);
    assert!(canvas.quads.is_empty() && canvas.triangles.is_empty());
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dftd-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn load_from_description() {
    let dir = scratch_dir("load");
    let rows: Vec<&str> = CORNER_LAND.lines().map(str::trim).filter(|line| !line.is_empty()).collect();
    fs::write(dir.join("corner.png"), encode_png(&rows)).unwrap();
    fs::write(
        dir.join("corner.json"),
        r#"{
            "topology": { "image": "corner.png", "realwidth": 120000.0, "realoffsetx": 1000.0 },
            "cities": [ { "name": "Lorient", "x": 100.0, "y": 200.0 } ]
        }"#,
    )
    .unwrap();

    let map = CoastMap::load(&dir.join("corner.json"), &discard_logger()).unwrap();
    assert_eq!(1, map.cities().len());
    assert_eq!("Lorient", map.cities()[0].name);
    assert_relative_eq!(Vec2::new(1000.0, 0.0), map.geometry().real_offset);
    assert_eq!((0, 1, 3), type_counts(&map));
    assert!(map.is_land_at(Pt2::new(31_000.0, 30_000.0)));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn load_reports_bad_data() {
    let dir = scratch_dir("bad");
    fs::write(dir.join("flat.json"), r#"{ "topology": { "image": "flat.png" } }"#).unwrap();
    fs::write(dir.join("lost.json"), r#"{ "topology": { "image": "lost.png", "realwidth": 10.0 } }"#).unwrap();

    match CoastMap::load(&dir.join("flat.json"), &discard_logger()) {
        Err(MapError::ZeroRealWidth { .. }) => {}
        other => panic!("Expected missing width, got {:?}", other.map(|_| ())),
    }
    match CoastMap::load(&dir.join("lost.json"), &discard_logger()) {
        Err(MapError::Io { path, .. }) => assert!(path.ends_with("lost.png")),
        other => panic!("Expected missing image, got {:?}", other.map(|_| ())),
    }
    match CoastMap::load(&dir.join("nothing.json"), &discard_logger()) {
        Err(MapError::Io { path, .. }) => assert!(path.ends_with("nothing.json")),
        other => panic!("Expected missing description, got {:?}", other.map(|_| ())),
    }

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn generated_maps_are_processed() {
    let raster = RasterGen::new(5).generate(32, 32).unwrap();
    let land = raster.land_cell_count();
    let map = CoastMap::with_segment_size(raster, 8, 32.0 * PIXEL_WIDTH, Vec2::zeros(), &discard_logger()).unwrap();
    assert_eq!(16, map.geometry().segment_count());
    let (sea, land_segments, mixed) = type_counts(&map);
    assert_eq!(16, sea + land_segments + mixed);
    if land > 0 && land < 32 * 32 {
        assert!(mixed > 0);
    }
}

fn build_generated(seed: u64, size: GridCoord) -> CoastMap {
    let raster = RasterGen::new(seed).generate(size, size).unwrap();
    let topology = Topology {
        image: "generated.png".to_string(),
        realwidth: size as f64 * PIXEL_WIDTH,
        realoffsetx: 0.0,
        realoffsety: 0.0,
    };
    CoastMap::from_raster(raster, &topology, &discard_logger()).unwrap()
}

// Every mixed segment's successor links must form cycles that each
// visit a piece exactly once, and every segment must triangulate.
fn assert_all_segments_triangulate(map: &mut CoastMap) {
    let geometry = *map.geometry();
    for (sy, sx) in iproduct!(0..geometry.segs_y, 0..geometry.segs_x) {
        let segment = map.segment(sx, sy);
        let mut successors: Vec<usize> = segment.segcls().iter().map(|segcl| segcl.next.unwrap()).collect();
        successors.sort();
        let expected: Vec<usize> = (0..segment.segcls().len()).collect();
        assert_eq!(expected, successors, "segment ({}, {})", sx, sy);
        map.ensure_point_cache(sx, sy, 0);
    }
}

#[test]
fn coast_touching_a_border_at_one_point() {
    // Segment (14, 4) of this map has one piece leaving exactly where
    // another enters.
    let mut map = build_generated(33, 64);
    let touching = map.segment(14, 4).segcls();
    assert!(touching.iter().any(|a| touching
        .iter()
        .any(|b| a.end_pos.is_some() && a.end_pos == b.begin_pos)));
    assert_all_segments_triangulate(&mut map);
}

#[test]
fn larger_generated_maps_triangulate() {
    for &seed in &[10, 11] {
        let mut map = build_generated(seed, 256);
        assert_all_segments_triangulate(&mut map);
    }
}

#[cfg(feature = "nightly")]
pub mod benches {
    use test::Bencher;

    use super::*;

    #[bench]
    fn bench_build_generated_map(b: &mut Bencher) {
        let raster = RasterGen::new(1).generate(128, 128).unwrap();
        let log = discard_logger();
        b.iter(|| {
            CoastMap::with_segment_size(raster.clone(), 16, 128.0 * PIXEL_WIDTH, Vec2::zeros(), &log).unwrap()
        });
    }
}
