use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{LatLon, LatLonBounds, MarkerKind};

/// The measured size of the area a map draws into, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// False before layout has happened, or if the container is collapsed.
    pub fn is_laid_out(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Identifies one line or marker on a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerHandle(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct LineStyle {
    pub color: String,
    /// Pixels
    pub weight: f64,
    pub opacity: f64,
    /// Shown on hover
    pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarkerStyle {
    pub kind: MarkerKind,
    pub color: String,
    /// Pixels
    pub radius: f64,
    pub label: String,
}

/// Creates map surfaces. One engine may create many surfaces over time, but each surface belongs
/// to exactly one mounted view.
pub trait MapEngine {
    type Surface: MapSurface;

    fn create(&mut self, size: ContainerSize, center: LatLon, zoom: f64) -> Result<Self::Surface>;
}

/// A live map instance. Every mutation can fail; callers log and carry on.
pub trait MapSurface {
    /// Jump to a view, without animating.
    fn set_view(&mut self, center: LatLon, zoom: f64) -> Result<()>;
    /// All points are finite.
    fn add_line(&mut self, pts: &[LatLon], style: &LineStyle) -> Result<LayerHandle>;
    fn add_marker(&mut self, pos: LatLon, style: &MarkerStyle) -> Result<LayerHandle>;
    fn remove_layer(&mut self, layer: LayerHandle) -> Result<()>;
    /// Frame the bounds, without animating and without zooming in past `max_zoom`.
    fn fit_bounds(&mut self, bounds: LatLonBounds, padding_px: f64, max_zoom: f64) -> Result<()>;
    /// Tear down the instance. Called exactly once, and nothing is called afterwards.
    fn release(&mut self);
}
