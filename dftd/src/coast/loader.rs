use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::grid::{GridCoord, RasterMap};
use crate::MapError;

/// Load a land/sea raster from a two colour palette PNG.
///
/// Pixels using palette entry 0 are sea; the other entry is land.
pub fn load_raster_png(path: &Path) -> Result<RasterMap, MapError> {
    let file = File::open(path).map_err(|source| MapError::Io {
        path: path.display().to_string(),
        source,
    })?;
    decode_raster_png(BufReader::new(file), &path.display().to_string())
}

/// Decode a land/sea raster from PNG data. `name` identifies the
/// image in errors.
///
/// The image's first row is the north edge of the map, so rows are
/// flipped to put raster row 0 at the south edge.
pub fn decode_raster_png<R: Read>(reader: R, name: &str) -> Result<RasterMap, MapError> {
    let image_error = |source| MapError::Image {
        path: name.to_string(),
        source,
    };
    let not_two_colour = |reason: String| MapError::NotTwoColour {
        path: name.to_string(),
        reason,
    };

    let mut decoder = png::Decoder::new(reader);
    // We want raw palette indexes, not expanded colours.
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info().map_err(image_error)?;

    let (color_type, bit_depth, palette_entries) = {
        let info = reader.info();
        let palette_entries = info.palette.as_ref().map_or(0, |palette| palette.len() / 3);
        (info.color_type, info.bit_depth as u8, palette_entries)
    };
    if color_type != png::ColorType::Indexed {
        return Err(not_two_colour(format!("colour type is {:?}, not indexed", color_type)));
    }
    if palette_entries != 2 {
        return Err(not_two_colour(format!(
            "palette has {} colours, expected 2",
            palette_entries
        )));
    }

    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf).map_err(image_error)?;
    let width = frame.width as usize;
    let height = frame.height as usize;
    let depth = bit_depth as usize;
    let pixels_per_byte = 8 / depth;
    let mask = ((1u16 << depth) - 1) as u8;

    let mut cells = vec![0u8; width * height];
    for row in 0..height {
        let line = &buf[row * frame.line_size..(row + 1) * frame.line_size];
        let y = height - 1 - row;
        for x in 0..width {
            // Sub-byte pixels are packed from the most significant bit down.
            let byte = line[x / pixels_per_byte];
            let shift = 8 - depth * (x % pixels_per_byte + 1);
            let index = (byte >> shift) & mask;
            if index > 1 {
                return Err(not_two_colour(format!(
                    "pixel ({}, {}) uses palette entry {}",
                    x, row, index
                )));
            }
            cells[y * width + x] = index;
        }
    }

    Ok(RasterMap::new(width as GridCoord, height as GridCoord, cells)?)
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Encode a raster as a 1 bit palette PNG, first row north.
    pub fn encode_png(rows: &[&str]) -> Vec<u8> {
        let width = rows[0].len();
        let height = rows.len();
        let stride = (width + 7) / 8;
        let mut data = vec![0u8; stride * height];
        for (row, line) in rows.iter().enumerate() {
            for (x, c) in line.chars().enumerate() {
                if c == '#' {
                    data[row * stride + x / 8] |= 0x80 >> (x % 8);
                }
            }
        }

        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width as u32, height as u32);
            encoder.set_color(png::ColorType::Indexed);
            encoder.set_depth(png::BitDepth::One);
            encoder.set_palette(vec![0, 0, 0, 255, 255, 255]);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&data).unwrap();
        }
        out
    }

    #[test]
    fn decode_flips_rows() {
        let png = encode_png(&["#.........", "..........", ".........#"]);
        let raster = decode_raster_png(&png[..], "test.png").unwrap();
        assert_eq!(10, raster.width());
        assert_eq!(3, raster.height());
        assert!(raster.is_land(0, 2));
        assert!(raster.is_land(9, 0));
        assert_eq!(2, raster.land_cell_count());
    }

    #[test]
    fn reject_true_colour_images() {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, 2, 1);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0, 255]).unwrap();
        }
        match decode_raster_png(&out[..], "grey.png") {
            Err(MapError::NotTwoColour { path, .. }) => assert_eq!("grey.png", path),
            other => panic!("Expected colour error, got {:?}", other),
        }
    }

    #[test]
    fn reject_garbage() {
        match decode_raster_png(&b"not a png"[..], "junk.png") {
            Err(MapError::Image { .. }) => {}
            other => panic!("Expected decoding error, got {:?}", other),
        }
    }
}
