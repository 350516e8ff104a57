mod canvas;
mod counting_canvas;

pub use self::canvas::{MapCanvas, MapVertex};
pub use self::counting_canvas::CountingCanvas;
