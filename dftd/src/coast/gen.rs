use noise;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::grid::{GridCoord, RasterError, RasterMap};

/// Procedural land/sea raster generator.
///
/// Thresholds fractal noise against a sea level, so the same seed
/// always yields the same coastlines. Handy for exercising the
/// coastline code on maps nobody had to draw.
pub struct RasterGen {
    seed: u64,
    sea_level: f64,
    terrain_noise: noise::Fbm,
    // Where in noise space the map's origin sits.
    origin: [f64; 2],
}

impl RasterGen {
    pub fn new(seed: u64) -> RasterGen {
        use noise::MultiFractal;
        use noise::Seedable;

        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        let terrain_noise = noise::Fbm::new()
            .set_octaves(5)
            // Roughly one continent per 40 pixels.
            .set_frequency(1.0 / 40.0)
            .set_seed(rng.gen::<u32>());
        let origin = [rng.gen_range(-1000.0, 1000.0), rng.gen_range(-1000.0, 1000.0)];
        RasterGen {
            seed,
            sea_level: 0.0,
            terrain_noise,
            origin,
        }
    }

    /// Noise values above this are land. Higher means more sea.
    pub fn with_sea_level(mut self, sea_level: f64) -> RasterGen {
        self.sea_level = sea_level;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_land(&self, x: GridCoord, y: GridCoord) -> bool {
        use noise::NoiseFn;

        let sample = [
            self.origin[0] + x as f64 + 0.5,
            self.origin[1] + y as f64 + 0.5,
        ];
        self.terrain_noise.get(sample) > self.sea_level
    }

    pub fn generate(&self, width: GridCoord, height: GridCoord) -> Result<RasterMap, RasterError> {
        RasterMap::from_fn(width, height, |x, y| self.is_land(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_map() {
        let a = RasterGen::new(14).generate(32, 32).unwrap();
        let b = RasterGen::new(14).generate(32, 32).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sea_level_controls_land_fraction() {
        let gen = RasterGen::new(3);
        let lowlands = gen.generate(64, 64).unwrap().land_cell_count();
        let gen = RasterGen::new(3).with_sea_level(10.0);
        let drowned = gen.generate(64, 64).unwrap().land_cell_count();
        assert_eq!(0, drowned);
        assert!(lowlands > 0);
    }
}
