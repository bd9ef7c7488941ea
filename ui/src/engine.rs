//! Draws map layers with widgetry. Surfaces can't touch the `EventCtx` directly, so they record
//! what should be on screen, and `MapPanel` uploads it on the next event.

use std::collections::BTreeMap;

use anyhow::Result;
use geom::{Bounds, GPSBounds, Pt2D};
use widgetry::{Color, EventCtx};

use model::map::{
    meters_per_pixel, ContainerSize, LatLon, LatLonBounds, LayerHandle, LineStyle, MapEngine,
    MapSurface, MarkerKind, MarkerStyle,
};

pub struct WidgetryEngine {
    gps_bounds: GPSBounds,
}

impl WidgetryEngine {
    pub fn new(gps_bounds: GPSBounds) -> Self {
        Self { gps_bounds }
    }
}

impl MapEngine for WidgetryEngine {
    type Surface = WidgetrySurface;

    fn create(&mut self, size: ContainerSize, center: LatLon, zoom: f64) -> Result<WidgetrySurface> {
        let pt = match center.to_lonlat() {
            Some(ll) => ll.to_pt(&self.gps_bounds),
            None => bail!("can't center the map on {:?}", center),
        };
        debug!("New widgetry map surface, {}x{}", size.width, size.height);
        Ok(WidgetrySurface {
            gps_bounds: self.gps_bounds.clone(),
            layers: BTreeMap::new(),
            next_handle: 0,
            dirty: true,
            camera: Some(Camera::Center {
                pt,
                cam_zoom: cam_zoom_for(center.lat, zoom),
            }),
            released: false,
        })
    }
}

pub enum DrawnLayer {
    Line {
        pts: Vec<Pt2D>,
        color: Color,
        weight: f64,
        label: String,
    },
    Marker {
        pt: Pt2D,
        kind: MarkerKind,
        color: Color,
        radius: f64,
        label: String,
    },
}

impl DrawnLayer {
    pub fn label(&self) -> &str {
        match self {
            DrawnLayer::Line { label, .. } | DrawnLayer::Marker { label, .. } => label,
        }
    }
}

pub enum Camera {
    Center { pt: Pt2D, cam_zoom: f64 },
    Fit {
        bounds: Bounds,
        padding_px: f64,
        max_cam_zoom: f64,
    },
}

pub struct WidgetrySurface {
    gps_bounds: GPSBounds,
    pub(crate) layers: BTreeMap<LayerHandle, DrawnLayer>,
    next_handle: usize,
    /// Layers changed since the last upload
    pub(crate) dirty: bool,
    /// Applied on the next event
    pub(crate) camera: Option<Camera>,
    released: bool,
}

impl WidgetrySurface {
    fn check(&self) -> Result<()> {
        if self.released {
            bail!("map surface was already released");
        }
        Ok(())
    }

    fn to_pt(&self, pos: LatLon) -> Result<Pt2D> {
        match pos.to_lonlat() {
            Some(ll) => Ok(ll.to_pt(&self.gps_bounds)),
            None => bail!("can't place {:?}", pos),
        }
    }

    fn insert(&mut self, layer: DrawnLayer) -> LayerHandle {
        self.next_handle += 1;
        let handle = LayerHandle(self.next_handle);
        self.layers.insert(handle, layer);
        self.dirty = true;
        handle
    }
}

impl MapSurface for WidgetrySurface {
    fn set_view(&mut self, center: LatLon, zoom: f64) -> Result<()> {
        self.check()?;
        let pt = self.to_pt(center)?;
        self.camera = Some(Camera::Center {
            pt,
            cam_zoom: cam_zoom_for(center.lat, zoom),
        });
        Ok(())
    }

    fn add_line(&mut self, pts: &[LatLon], style: &LineStyle) -> Result<LayerHandle> {
        self.check()?;
        let color = parse_color(&style.color)?.alpha(style.opacity as f32);
        let pts = pts
            .iter()
            .map(|pt| self.to_pt(*pt))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.insert(DrawnLayer::Line {
            pts,
            color,
            weight: style.weight,
            label: style.label.clone(),
        }))
    }

    fn add_marker(&mut self, pos: LatLon, style: &MarkerStyle) -> Result<LayerHandle> {
        self.check()?;
        let pt = self.to_pt(pos)?;
        let color = parse_color(&style.color)?;
        Ok(self.insert(DrawnLayer::Marker {
            pt,
            kind: style.kind,
            color,
            radius: style.radius,
            label: style.label.clone(),
        }))
    }

    fn remove_layer(&mut self, layer: LayerHandle) -> Result<()> {
        self.check()?;
        if self.layers.remove(&layer).is_none() {
            bail!("no layer {:?}", layer);
        }
        self.dirty = true;
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: LatLonBounds, padding_px: f64, max_zoom: f64) -> Result<()> {
        self.check()?;
        let mut map_bounds = Bounds::new();
        map_bounds.update(self.to_pt(bounds.min)?);
        map_bounds.update(self.to_pt(bounds.max)?);
        self.camera = Some(Camera::Fit {
            bounds: map_bounds,
            padding_px,
            max_cam_zoom: cam_zoom_for(bounds.center().lat, max_zoom),
        });
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
        self.layers.clear();
        self.camera = None;
        self.dirty = true;
    }
}

/// widgetry's zoom is screen pixels per map meter
fn cam_zoom_for(lat: f64, zoom: f64) -> f64 {
    1.0 / meters_per_pixel(lat, zoom)
}

fn parse_color(x: &str) -> Result<Color> {
    let valid = x.len() == 7
        && x.starts_with('#')
        && x.chars().skip(1).all(|c| c.is_ascii_hexdigit());
    if !valid {
        bail!("bad color {x}");
    }
    Ok(Color::hex(x))
}

/// Centers the canvas on a point or frames some bounds
pub fn apply_camera(ctx: &mut EventCtx, camera: Camera) {
    let canvas = &mut ctx.canvas;
    match camera {
        Camera::Center { pt, cam_zoom } => {
            canvas.cam_zoom = cam_zoom;
            canvas.center_on_map_pt(pt);
        }
        Camera::Fit {
            bounds,
            padding_px,
            max_cam_zoom,
        } => {
            let width = bounds.max_x - bounds.min_x;
            let height = bounds.max_y - bounds.min_y;
            let avail_width = (canvas.window_width - 2.0 * padding_px).max(1.0);
            let avail_height = (canvas.window_height - 2.0 * padding_px).max(1.0);
            let mut zoom = max_cam_zoom;
            if width > 0.0 {
                zoom = zoom.min(avail_width / width);
            }
            if height > 0.0 {
                zoom = zoom.min(avail_height / height);
            }
            canvas.cam_zoom = zoom;
            canvas.center_on_map_pt(bounds.center());
        }
    }
}
