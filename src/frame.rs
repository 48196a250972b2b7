//! Grid framing and the linear cell-index geometry.
//!
//! Cells are numbered row-major from the north-west corner: rows run north to
//! south, columns west to east, and `index = row * cols + col`.

use crate::error::ConfigError;

/// The 5 arc-minute cell size used by SPAM, as published (not exactly 1/12).
pub const SPAM_CELL_SIZE: f64 = 0.083333;

/// Geographic area a grid is meant to cover, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl Extent {
    pub const GLOBAL: Extent = Extent {
        west: -180.0,
        east: 180.0,
        south: -90.0,
        north: 90.0,
    };

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::GLOBAL
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridFrame {
    pub cols: usize,
    pub rows: usize,
    /// Longitude of the north-west corner of the top-left pixel.
    pub origin_lon: f64,
    /// Latitude of the north-west corner of the top-left pixel.
    pub origin_lat: f64,
    pub cell_size: f64,
}

impl GridFrame {
    /// Global 4320 x 2160 grid at 5 arc-minutes.
    pub fn spam_5min() -> Self {
        Self {
            cols: 4320,
            rows: 2160,
            origin_lon: -180.0,
            origin_lat: 90.0,
            cell_size: SPAM_CELL_SIZE,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn cell_count(&self) -> u64 {
        self.rows as u64 * self.cols as u64
    }

    /// Maps a cell index to `(row, col)`, or `None` when the index falls
    /// outside the grid.
    pub fn position(&self, index: u64) -> Option<(usize, usize)> {
        if index >= self.cell_count() {
            return None;
        }
        let cols = self.cols as u64;
        Some(((index / cols) as usize, (index % cols) as usize))
    }

    pub fn index(&self, row: usize, col: usize) -> Option<u64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(row as u64 * self.cols as u64 + col as u64)
    }

    /// GDAL-style affine transform, north-up.
    pub fn geo_transform(&self) -> [f64; 6] {
        [
            self.origin_lon,
            self.cell_size,
            0.0,
            self.origin_lat,
            0.0,
            -self.cell_size,
        ]
    }

    /// `(west, south, east, north)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let east = self.origin_lon + self.cols as f64 * self.cell_size;
        let south = self.origin_lat - self.rows as f64 * self.cell_size;
        (self.origin_lon, south, east, self.origin_lat)
    }

    /// Checks that the frame describes a sensible geographic grid. Extents may
    /// overshoot the domain by at most half a cell to absorb the rounded SPAM
    /// cell size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyGrid {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if !(-180.0..=180.0).contains(&self.origin_lon) || !(-90.0..=90.0).contains(&self.origin_lat)
        {
            return Err(ConfigError::OriginOutOfDomain {
                lon: self.origin_lon,
                lat: self.origin_lat,
            });
        }

        let (west, south, east, north) = self.bounds();
        let slack = self.cell_size / 2.0;
        if east > 180.0 + slack || south < -90.0 - slack {
            return Err(ConfigError::ExtentOutOfDomain {
                west,
                east,
                south,
                north,
            });
        }
        Ok(())
    }

    /// Checks that the frame tiles `extent`: the origin sits on its north-west
    /// corner and `cols * cell_size`, `rows * cell_size` match its width and
    /// height to within half a cell.
    pub fn validate_extent(&self, extent: &Extent) -> Result<(), ConfigError> {
        if !(extent.width() > 0.0 && extent.height() > 0.0) {
            return Err(ConfigError::InvalidExtent {
                west: extent.west,
                east: extent.east,
                south: extent.south,
                north: extent.north,
            });
        }

        let slack = self.cell_size / 2.0;
        if (self.origin_lon - extent.west).abs() > slack
            || (self.origin_lat - extent.north).abs() > slack
        {
            return Err(ConfigError::OriginMismatch {
                lon: self.origin_lon,
                lat: self.origin_lat,
                west: extent.west,
                north: extent.north,
            });
        }

        let width = self.cols as f64 * self.cell_size;
        if (width - extent.width()).abs() > slack {
            return Err(ConfigError::ExtentMismatch {
                axis: "longitude",
                span: width,
                expected: extent.width(),
            });
        }
        let height = self.rows as f64 * self.cell_size;
        if (height - extent.height()).abs() > slack {
            return Err(ConfigError::ExtentMismatch {
                axis: "latitude",
                span: height,
                expected: extent.height(),
            });
        }
        Ok(())
    }
}

impl Default for GridFrame {
    fn default() -> Self {
        Self::spam_5min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_frame() -> GridFrame {
        GridFrame {
            cols: 4,
            rows: 4,
            origin_lon: -180.0,
            origin_lat: 90.0,
            cell_size: 45.0,
        }
    }

    #[test]
    fn test_index_bijection() {
        let frame = GridFrame {
            cols: 7,
            rows: 5,
            origin_lon: 0.0,
            origin_lat: 0.0,
            cell_size: 1.0,
        };
        for i in 0..frame.cell_count() {
            let (row, col) = frame.position(i).unwrap();
            assert!(row < frame.rows && col < frame.cols);
            assert_eq!(row as u64 * frame.cols as u64 + col as u64, i);
            assert_eq!(frame.index(row, col), Some(i));
        }
    }

    #[test]
    fn test_out_of_range_positions() {
        let frame = small_frame();
        assert_eq!(frame.position(15), Some((3, 3)));
        assert_eq!(frame.position(16), None);
        assert_eq!(frame.index(4, 0), None);
        assert_eq!(frame.index(0, 4), None);
    }

    #[test]
    fn test_geo_transform_is_north_up() {
        let gt = GridFrame::spam_5min().geo_transform();
        assert_eq!(gt, [-180.0, 0.083333, 0.0, 90.0, 0.0, -0.083333]);
    }

    #[test]
    fn test_reference_frame_is_valid() {
        let frame = GridFrame::spam_5min();
        assert_eq!(frame.cell_count(), 4320 * 2160);
        frame.validate().unwrap();
    }

    #[test]
    fn test_reference_frame_tiles_the_globe() {
        GridFrame::spam_5min()
            .validate_extent(&Extent::GLOBAL)
            .unwrap();
    }

    #[test]
    fn test_cell_size_must_match_extent() {
        let mut frame = GridFrame::spam_5min();
        frame.cell_size = 0.01;
        // Still inside the domain, but covers only a 43 x 21 degree patch.
        frame.validate().unwrap();
        assert!(matches!(
            frame.validate_extent(&Extent::GLOBAL),
            Err(ConfigError::ExtentMismatch {
                axis: "longitude",
                ..
            })
        ));

        let mut frame = GridFrame::spam_5min();
        frame.rows = 1080;
        assert!(matches!(
            frame.validate_extent(&Extent::GLOBAL),
            Err(ConfigError::ExtentMismatch {
                axis: "latitude",
                ..
            })
        ));
    }

    #[test]
    fn test_origin_and_extent_shape_are_checked() {
        let frame = small_frame();
        let west_half = Extent {
            west: -180.0,
            east: 0.0,
            south: -90.0,
            north: 90.0,
        };
        frame.validate_extent(&west_half).unwrap();

        let shifted = Extent {
            west: -90.0,
            east: 90.0,
            ..west_half
        };
        assert!(matches!(
            frame.validate_extent(&shifted),
            Err(ConfigError::OriginMismatch { .. })
        ));

        let inverted = Extent {
            east: -180.0,
            west: 0.0,
            ..west_half
        };
        assert!(matches!(
            frame.validate_extent(&inverted),
            Err(ConfigError::InvalidExtent { .. })
        ));
    }

    #[test]
    fn test_inconsistent_frame_is_rejected() {
        let mut frame = GridFrame::spam_5min();
        frame.cell_size = 0.1;
        assert!(matches!(
            frame.validate(),
            Err(ConfigError::ExtentOutOfDomain { .. })
        ));

        frame = GridFrame::spam_5min();
        frame.rows = 0;
        assert!(matches!(frame.validate(), Err(ConfigError::EmptyGrid { .. })));

        frame = GridFrame::spam_5min();
        frame.cell_size = f64::NAN;
        assert!(matches!(
            frame.validate(),
            Err(ConfigError::InvalidCellSize(_))
        ));
    }
}
