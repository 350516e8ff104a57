//! Build a coast map and print what ended up in its segments.
//!
//! ```text
//! mapcheck data/maps/atlantic.json
//! mapcheck --generate 42 --size 256 --detail 2
//! ```

extern crate dftd;
#[macro_use]
extern crate slog;
#[macro_use]
extern crate clap;

use std::path::Path;
use std::process;

use clap::{App, Arg};

use dftd::coast::{CoastMap, RasterGen, SegmentType, Topology};
use dftd::MapError;

// Same scale the campaign maps use.
const GENERATED_PIXEL_WIDTH: f64 = 15_000.0;

fn main() {
    let matches = App::new("mapcheck")
        .about("Builds a coast map and reports per-segment statistics")
        .arg(
            Arg::with_name("description")
                .help("Map description file")
                .required_unless("generate")
                .index(1),
        )
        .arg(
            Arg::with_name("generate")
                .long("generate")
                .value_name("SEED")
                .help("Use a generated raster instead of a description file")
                .takes_value(true)
                .conflicts_with("description"),
        )
        .arg(
            Arg::with_name("size")
                .long("size")
                .value_name("PIXELS")
                .help("Width and height of the generated raster")
                .takes_value(true)
                .default_value("256"),
        )
        .arg(
            Arg::with_name("detail")
                .long("detail")
                .value_name("LEVEL")
                .help("Detail level to triangulate at")
                .takes_value(true)
                .default_value("0"),
        )
        .get_matches();

    let log = dftd::log::terminal_logger();
    let detail = value_t!(matches, "detail", u32).unwrap_or_else(|e| e.exit());

    let built = if matches.is_present("generate") {
        let seed = value_t!(matches, "generate", u64).unwrap_or_else(|e| e.exit());
        let size = value_t!(matches, "size", i64).unwrap_or_else(|e| e.exit());
        generated_map(seed, size, &log)
    } else {
        let path = matches.value_of("description").unwrap_or_default();
        CoastMap::load(Path::new(path), &log)
    };

    let mut map = match built {
        Ok(map) => map,
        Err(err) => {
            crit!(log, "Could not build map"; "error" => format!("{}", err));
            // Let the async drain flush before exiting.
            drop(log);
            process::exit(1);
        }
    };

    report(&mut map, detail);
}

fn generated_map(seed: u64, size: i64, log: &slog::Logger) -> Result<CoastMap, MapError> {
    info!(log, "Generating raster"; "seed" => seed, "size" => size);
    let raster = RasterGen::new(seed).generate(size, size)?;
    let topology = Topology {
        image: format!("generated-{}", seed),
        realwidth: size as f64 * GENERATED_PIXEL_WIDTH,
        realoffsetx: 0.0,
        realoffsety: 0.0,
    };
    CoastMap::from_raster(raster, &topology, log)
}

fn report(map: &mut CoastMap, detail: u32) {
    let geometry = *map.geometry();
    println!(
        "map {}x{} pixels, {}x{} segments of {} pixels ({:.0} m)",
        geometry.map_width,
        geometry.map_height,
        geometry.segs_x,
        geometry.segs_y,
        geometry.pixels_per_seg,
        geometry.seg_width_real
    );

    let mut sea = 0;
    let mut land = 0;
    let mut mixed = 0;
    let mut segcls = 0;
    let mut cyclic = 0;
    for (_, segment) in map.segments().iter() {
        match segment.kind() {
            SegmentType::Sea => sea += 1,
            SegmentType::Land => land += 1,
            SegmentType::Mixed => mixed += 1,
        }
        segcls += segment.segcls().len();
        cyclic += segment.segcls().iter().filter(|segcl| segcl.cyclic).count();
    }
    println!("segments: {} sea, {} land, {} mixed", sea, land, mixed);
    println!("coastline pieces: {} ({} closed within one segment)", segcls, cyclic);

    let mut polygons = 0;
    let mut triangles = 0;
    for sy in 0..geometry.segs_y {
        for sx in 0..geometry.segs_x {
            let cache = map.ensure_point_cache(sx, sy, detail);
            polygons += cache.entries.len();
            triangles += cache.triangle_count();
        }
    }
    println!("detail {}: {} land polygons, {} triangles", detail, polygons, triangles);

    println!("cities: {}", map.cities().len());
    for city in map.cities() {
        let p = city.position();
        println!("  {} at ({:.0}, {:.0}){}", city.name, p.x, p.y, if map.is_land_at(p) { "" } else { " (at sea)" });
    }
}
