use geom::{Circle, Distance, PolyLine};
use widgetry::mapspace::{ObjectID, World, WorldOutcome};
use widgetry::{Color, EventCtx, GeomBatch, GfxCtx, Line, Text, UpdateType};

use model::map::{
    meters_per_pixel, same_layers, ContainerSize, LatLon, LayerHandle, LayerSet, MapConfig,
    MarkerDescriptor, MarkerKind, RouteDescriptor, SurfaceManager,
};

use crate::engine::{apply_camera, DrawnLayer, WidgetryEngine};
use crate::App;

/// Line widths and marker sizes are fixed in map space, sized to look right at this zoom.
const DRAW_ZOOM: f64 = 14.0;

/// The map behind a page. Owns one surface for as long as the page exists.
pub struct MapPanel {
    mgr: SurfaceManager<WidgetryEngine>,
    layers: LayerSet,
    routes: Vec<RouteDescriptor>,
    markers: Vec<MarkerDescriptor>,
    world: World<MapObj>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct MapObj(LayerHandle);
impl ObjectID for MapObj {}

impl MapPanel {
    pub fn new(
        ctx: &mut EventCtx,
        app: &App,
        routes: Vec<RouteDescriptor>,
        markers: Vec<MarkerDescriptor>,
    ) -> Self {
        let config = app.map_config.clone();
        let mut mgr = SurfaceManager::new(
            WidgetryEngine::new(app.model.gps_bounds.clone()),
            config.clone(),
        );
        // The window might not be laid out on the very first frame
        mgr.schedule_initialize(config.center, config.zoom);
        ctx.request_update(UpdateType::Game);

        Self {
            mgr,
            layers: LayerSet::new(),
            routes,
            markers,
            world: World::unbounded(),
        }
    }

    /// Replace what the map shows. Does nothing if the descriptors didn't change.
    pub fn set_layers(
        &mut self,
        ctx: &mut EventCtx,
        routes: Vec<RouteDescriptor>,
        markers: Vec<MarkerDescriptor>,
    ) {
        if same_layers(&routes, &markers, &self.routes, &self.markers) {
            return;
        }
        self.routes = routes;
        self.markers = markers;
        self.sync(ctx);
    }

    /// Jump to a place without animating
    pub fn focus(&mut self, ctx: &mut EventCtx, pos: LatLon, zoom: f64) {
        self.mgr.set_view(pos, zoom);
        self.upload(ctx);
    }

    /// Returns the label of a line or marker that was clicked
    pub fn event(&mut self, ctx: &mut EventCtx) -> Option<String> {
        ctx.canvas_movement();

        if let Some(dt) = ctx.input.nonblocking_is_update_event() {
            ctx.input.use_update_event();
            let container = ContainerSize::new(ctx.canvas.window_width, ctx.canvas.window_height);
            self.mgr.advance(dt, container);
        }
        if self.layers.needs_sync(&self.mgr) {
            self.sync(ctx);
        }
        self.upload(ctx);
        if self.mgr.has_pending_work() {
            ctx.request_update(UpdateType::Game);
        }

        if let WorldOutcome::ClickedObject(MapObj(handle)) = self.world.event(ctx) {
            if let Some((_, surface)) = self.mgr.surface_mut() {
                return surface.layers.get(&handle).map(|l| l.label().to_string());
            }
        }
        None
    }

    pub fn draw(&self, g: &mut GfxCtx) {
        self.world.draw(g);
    }

    fn sync(&mut self, ctx: &mut EventCtx) {
        let report = self.layers.sync(&mut self.mgr, &self.routes, &self.markers);
        if report.skipped_routes + report.skipped_markers + report.engine_errors > 0 {
            warn!(
                "Map sync skipped {} routes and {} markers, with {} engine errors",
                report.skipped_routes, report.skipped_markers, report.engine_errors
            );
        }
        self.upload(ctx);
        if self.mgr.has_pending_work() {
            ctx.request_update(UpdateType::Game);
        }
    }

    /// Moves the camera and redraws layers if the surface recorded changes
    fn upload(&mut self, ctx: &mut EventCtx) {
        let config = self.mgr.config().clone();
        match self.mgr.surface_mut() {
            Some((_, surface)) => {
                if let Some(camera) = surface.camera.take() {
                    apply_camera(ctx, camera);
                }
                if surface.dirty {
                    surface.dirty = false;
                    self.world = build_world(ctx, &config, surface.layers.iter());
                }
            }
            None => {
                if !self.layers.is_empty() {
                    self.layers = LayerSet::new();
                    self.world = World::unbounded();
                }
            }
        }
    }
}

fn build_world<'a>(
    ctx: &mut EventCtx,
    config: &MapConfig,
    layers: impl Iterator<Item = (&'a LayerHandle, &'a DrawnLayer)>,
) -> World<MapObj> {
    let meters_per_px = meters_per_pixel(config.center.lat, DRAW_ZOOM);
    let mut world = World::unbounded();

    // Lines under markers
    let mut markers = Vec::new();
    for (handle, layer) in layers {
        match layer {
            DrawnLayer::Line {
                pts,
                color,
                weight,
                label,
            } => {
                let thickness = Distance::meters(weight * meters_per_px);
                let polygon = match PolyLine::deduping_new(pts.clone()) {
                    Ok(pl) => pl.make_polygons(thickness),
                    // A route with one distinct point
                    Err(_) => match pts.first() {
                        Some(pt) => Circle::new(*pt, thickness).to_polygon(),
                        None => continue,
                    },
                };
                world
                    .add(MapObj(*handle))
                    .hitbox(polygon)
                    .draw_color(*color)
                    .hover_alpha(0.9)
                    .tooltip(Text::from(Line(label)))
                    .clickable()
                    .build(ctx);
            }
            DrawnLayer::Marker { .. } => markers.push((handle, layer)),
        }
    }

    for (handle, layer) in markers {
        if let DrawnLayer::Marker {
            pt,
            kind,
            color,
            radius,
            label,
        } = layer
        {
            let circle = Circle::new(*pt, Distance::meters(radius * meters_per_px));
            let mut batch = GeomBatch::new();
            batch.push(*color, circle.to_polygon());
            if *kind == MarkerKind::Terminal {
                if let Ok(ring) = circle.to_outline(Distance::meters(0.3 * radius * meters_per_px)) {
                    batch.push(Color::WHITE, ring);
                }
            }
            let mut txt = Text::from(Line(label));
            txt.add_line(
                Line(match kind {
                    MarkerKind::Terminal => "Terminal",
                    MarkerKind::Stop => "Stop",
                })
                .secondary(),
            );
            world
                .add(MapObj(*handle))
                .hitbox(circle.to_polygon())
                .draw(batch)
                .hover_alpha(0.5)
                .tooltip(txt)
                .clickable()
                .build(ctx);
        }
    }

    world.initialize_hover(ctx);
    world
}
