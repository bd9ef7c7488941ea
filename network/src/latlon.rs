use geom::LonLat;
use serde::{Deserialize, Serialize};

/// A WGS84 position in the (latitude, longitude) order the source tables and map widgets use.
/// Nothing guarantees the components are finite; check `is_finite` before drawing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// None for non-finite positions; geom can't represent those.
    pub fn to_lonlat(self) -> Option<LonLat> {
        if self.is_finite() {
            Some(LonLat::new(self.lon, self.lat))
        } else {
            None
        }
    }
}

impl From<[f64; 2]> for LatLon {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl std::fmt::Display for LatLon {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let ns = if self.lat >= 0.0 { "N" } else { "S" };
        let ew = if self.lon >= 0.0 { "E" } else { "W" };
        write!(
            f,
            "{:.4}° {ns}, {:.4}° {ew}",
            self.lat.abs(),
            self.lon.abs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finiteness() {
        assert!(LatLon::new(8.19, 124.21).is_finite());
        assert!(!LatLon::new(f64::NAN, 124.21).is_finite());
        assert!(!LatLon::new(8.19, f64::INFINITY).is_finite());
        assert!(LatLon::new(f64::NAN, 1.0).to_lonlat().is_none());
    }

    #[test]
    fn display_like_the_stop_cards() {
        assert_eq!(
            LatLon::new(8.228, 124.2452).to_string(),
            "8.2280° N, 124.2452° E"
        );
    }
}
