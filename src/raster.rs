use crate::color::{Color, ColorModel, Rgba};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Half-open rectangle: `min` is inside, `max` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rectangle {
    pub min: Point,
    pub max: Point,
}

impl Rectangle {
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub const fn width(&self) -> usize {
        self.max.x.saturating_sub(self.min.x)
    }

    pub const fn height(&self) -> usize {
        self.max.y.saturating_sub(self.min.y)
    }

    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.min.x && x < self.max.x && y >= self.min.y && y < self.max.y
    }
}

/// A 2-D grid of colors that can be read and written one pixel at a time.
///
/// Coordinates outside [`Raster::bounds`] are rejected with
/// [`Error::OutOfBounds`](crate::Error::OutOfBounds).
pub trait Raster {
    fn color_model(&self) -> ColorModel;

    fn bounds(&self) -> Rectangle;

    fn get_pixel(&self, x: usize, y: usize) -> Result<Rgba>;

    fn set_pixel(&mut self, x: usize, y: usize, color: &dyn Color) -> Result<()>;
}
