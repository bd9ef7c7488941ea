//! The map core: an engine-agnostic lifecycle around one map instance, and the logic that keeps
//! its drawn layers in sync with plain route and marker descriptors.

mod deferred;
mod descriptor;
mod engine;
mod layers;
mod surface;
#[cfg(test)]
pub mod testing;
mod viewport;

use geom::Duration;
use serde::{Deserialize, Serialize};

pub use self::deferred::DeferredQueue;
pub use self::descriptor::{same_layers, LatLon, MarkerDescriptor, MarkerKind, RouteDescriptor};
pub use self::engine::{ContainerSize, LayerHandle, LineStyle, MapEngine, MapSurface, MarkerStyle};
pub use self::layers::{LayerSet, SyncReport};
pub use self::surface::{SurfaceManager, SurfaceState, SurfaceToken};
pub use self::viewport::{
    distance_meters, fit_zoom, meters_per_pixel, path_length_meters, zoom_for_meters_per_pixel,
    LatLonBounds,
};

/// Tunables for every map in the app
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub center: LatLon,
    pub zoom: f64,
    /// Kept clear around framed routes, in pixels
    pub fit_padding_px: f64,
    /// Framing never zooms in further than this
    pub max_fit_zoom: f64,
    /// How long after a sync the drawn routes get framed
    pub fit_delay: Duration,
    /// Wait between attempts to create a surface while the container has no size
    pub init_retry_delay: Duration,
    pub init_attempts: usize,

    pub route_weight: f64,
    pub route_opacity: f64,
    pub terminal_color: String,
    pub stop_color: String,
    pub terminal_radius: f64,
    pub stop_radius: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            // Barangay Suarez, Iligan City
            center: LatLon::new(8.2280, 124.2452),
            zoom: 13.0,
            fit_padding_px: 50.0,
            max_fit_zoom: 16.0,
            fit_delay: Duration::seconds(0.1),
            init_retry_delay: Duration::seconds(0.1),
            init_attempts: 20,

            route_weight: 4.0,
            route_opacity: 0.7,
            terminal_color: "#2E7D32".to_string(),
            stop_color: "#F9A825".to_string(),
            terminal_radius: 10.0,
            stop_radius: 7.0,
        }
    }
}

impl MapConfig {
    pub fn line_style(&self, route: &RouteDescriptor) -> LineStyle {
        LineStyle {
            color: route.color.clone(),
            weight: self.route_weight,
            opacity: self.route_opacity,
            label: route.name.clone(),
        }
    }

    pub fn marker_style(&self, marker: &MarkerDescriptor) -> MarkerStyle {
        let (color, radius) = match marker.kind {
            MarkerKind::Terminal => (self.terminal_color.clone(), self.terminal_radius),
            MarkerKind::Stop => (self.stop_color.clone(), self.stop_radius),
        };
        MarkerStyle {
            kind: marker.kind,
            color,
            radius,
            label: marker.label.clone(),
        }
    }
}
