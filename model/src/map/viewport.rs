//! Web-mercator math, matching the tile pyramid slippy maps use.

use geo::{line_string, Haversine, Length, LineString, Point};
use serde::{Deserialize, Serialize};

use super::{ContainerSize, LatLon};

/// Meters per pixel at the equator, zoom 0, for 256px tiles
const EQUATOR_METERS_PER_PIXEL: f64 = 156_543.033_92;

/// Axis-aligned bounds over finite points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLonBounds {
    pub min: LatLon,
    pub max: LatLon,
}

impl LatLonBounds {
    /// None if there are no finite points. Non-finite points are ignored.
    pub fn from_points<'a, I: IntoIterator<Item = &'a LatLon>>(pts: I) -> Option<Self> {
        let mut result: Option<Self> = None;
        for pt in pts {
            if !pt.is_finite() {
                continue;
            }
            result = Some(match result {
                None => Self {
                    min: *pt,
                    max: *pt,
                },
                Some(b) => Self {
                    min: LatLon::new(b.min.lat.min(pt.lat), b.min.lon.min(pt.lon)),
                    max: LatLon::new(b.max.lat.max(pt.lat), b.max.lon.max(pt.lon)),
                },
            });
        }
        result
    }

    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.min.lat + self.max.lat) / 2.0,
            (self.min.lon + self.max.lon) / 2.0,
        )
    }

    pub fn contains(&self, pt: LatLon) -> bool {
        pt.lat >= self.min.lat
            && pt.lat <= self.max.lat
            && pt.lon >= self.min.lon
            && pt.lon <= self.max.lon
    }

    /// East-west extent, measured along the center latitude
    pub fn width_meters(&self) -> f64 {
        let lat = self.center().lat;
        distance_meters(LatLon::new(lat, self.min.lon), LatLon::new(lat, self.max.lon))
    }

    pub fn height_meters(&self) -> f64 {
        let lon = self.center().lon;
        distance_meters(LatLon::new(self.min.lat, lon), LatLon::new(self.max.lat, lon))
    }
}

/// Great-circle distance. Both points must be finite.
pub fn distance_meters(a: LatLon, b: LatLon) -> f64 {
    let line: LineString<f64> = line_string![
        Point::new(a.lon, a.lat).0,
        Point::new(b.lon, b.lat).0
    ];
    Haversine.length(&line)
}

/// Length of a path, skipping points that aren't finite.
pub fn path_length_meters(pts: &[LatLon]) -> f64 {
    let line: LineString<f64> = pts
        .iter()
        .filter(|pt| pt.is_finite())
        .map(|pt| (pt.lon, pt.lat))
        .collect::<Vec<_>>()
        .into();
    Haversine.length(&line)
}

pub fn meters_per_pixel(lat: f64, zoom: f64) -> f64 {
    EQUATOR_METERS_PER_PIXEL * lat.to_radians().cos() / 2.0_f64.powf(zoom)
}

pub fn zoom_for_meters_per_pixel(lat: f64, meters_per_pixel: f64) -> f64 {
    (EQUATOR_METERS_PER_PIXEL * lat.to_radians().cos() / meters_per_pixel).log2()
}

/// The deepest whole zoom level that shows all of `bounds` inside the container, keeping
/// `padding_px` clear on every side, capped at `max_zoom`.
pub fn fit_zoom(bounds: &LatLonBounds, size: ContainerSize, padding_px: f64, max_zoom: f64) -> f64 {
    let avail_width = (size.width - 2.0 * padding_px).max(1.0);
    let avail_height = (size.height - 2.0 * padding_px).max(1.0);
    let needed = (bounds.width_meters() / avail_width).max(bounds.height_meters() / avail_height);
    if needed <= 0.0 {
        return max_zoom;
    }
    zoom_for_meters_per_pixel(bounds.center().lat, needed)
        .floor()
        .min(max_zoom)
}
