use serde::{Deserialize, Serialize};

pub use network::LatLon;

/// A polyline to draw. Coordinates that aren't finite get dropped when drawing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub name: String,
    /// "#RRGGBB"
    pub color: String,
    pub coordinates: Vec<LatLon>,
}

impl RouteDescriptor {
    pub fn new(name: impl Into<String>, color: impl Into<String>, coordinates: Vec<LatLon>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            coordinates,
        }
    }

    pub fn valid_points(&self) -> Vec<LatLon> {
        self.coordinates
            .iter()
            .copied()
            .filter(|pt| pt.is_finite())
            .collect()
    }

    /// Like `==`, but a NaN coordinate matches the same NaN, so unchanged data is recognized.
    pub fn same_as(&self, other: &RouteDescriptor) -> bool {
        self.name == other.name
            && self.color == other.color
            && self.coordinates.len() == other.coordinates.len()
            && self
                .coordinates
                .iter()
                .zip(&other.coordinates)
                .all(|(a, b)| same_pt(*a, *b))
    }
}

fn same_pt(a: LatLon, b: LatLon) -> bool {
    a.lat.to_bits() == b.lat.to_bits() && a.lon.to_bits() == b.lon.to_bits()
}

/// True if both lists would draw exactly the same thing
pub fn same_layers(
    routes1: &[RouteDescriptor],
    markers1: &[MarkerDescriptor],
    routes2: &[RouteDescriptor],
    markers2: &[MarkerDescriptor],
) -> bool {
    routes1.len() == routes2.len()
        && markers1.len() == markers2.len()
        && routes1.iter().zip(routes2).all(|(a, b)| a.same_as(b))
        && markers1.iter().zip(markers2).all(|(a, b)| a.same_as(b))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerKind {
    Terminal,
    Stop,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerDescriptor {
    pub position: LatLon,
    pub label: String,
    pub kind: MarkerKind,
}

impl MarkerDescriptor {
    pub fn new(position: LatLon, label: impl Into<String>, kind: MarkerKind) -> Self {
        Self {
            position,
            label: label.into(),
            kind,
        }
    }

    pub fn same_as(&self, other: &MarkerDescriptor) -> bool {
        same_pt(self.position, other.position)
            && self.label == other.label
            && self.kind == other.kind
    }
}
