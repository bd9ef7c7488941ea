use super::{
    LatLon, LatLonBounds, LayerHandle, MapEngine, MapSurface, MarkerDescriptor, RouteDescriptor,
    SurfaceManager, SurfaceToken,
};

/// The layers drawn by the previous sync. They belong to one surface; if that surface goes away,
/// the handles are simply forgotten.
#[derive(Default)]
pub struct LayerSet {
    token: Option<SurfaceToken>,
    handles: Vec<LayerHandle>,
}

/// What one sync did
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncReport {
    pub lines: usize,
    pub markers: usize,
    /// Valid route points that made it onto the map
    pub route_points: usize,
    /// Non-finite coordinates dropped from routes that were otherwise drawn or skipped
    pub dropped_points: usize,
    pub skipped_routes: usize,
    pub skipped_markers: usize,
    pub engine_errors: usize,
    /// Set when framing the routes was scheduled
    pub fit: Option<LatLonBounds>,
}

impl LayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// True when the map has become ready, or was recreated, since the last sync.
    pub fn needs_sync<E: MapEngine>(&self, mgr: &SurfaceManager<E>) -> bool {
        match mgr.token() {
            Some(token) => self.token != Some(token),
            None => false,
        }
    }

    /// Clear everything from the previous sync, then draw these routes and markers. Invalid
    /// entries and engine failures only affect the one entry. Does nothing if the map isn't
    /// ready.
    pub fn sync<E: MapEngine>(
        &mut self,
        mgr: &mut SurfaceManager<E>,
        routes: &[RouteDescriptor],
        markers: &[MarkerDescriptor],
    ) -> SyncReport {
        let mut report = SyncReport::default();
        let config = mgr.config().clone();
        let (token, surface) = match mgr.surface_mut() {
            Some(pair) => pair,
            None => {
                debug!("Map isn't ready, skipping a layer sync");
                return report;
            }
        };

        if self.token != Some(token) {
            // The surface that owned these is gone
            self.handles.clear();
            self.token = Some(token);
        }
        for handle in std::mem::take(&mut self.handles) {
            if let Err(err) = surface.remove_layer(handle) {
                error!("Couldn't remove map layer {:?}: {err}", handle);
                report.engine_errors += 1;
            }
        }

        let mut drawn_pts: Vec<LatLon> = Vec::new();
        for route in routes {
            let pts = route.valid_points();
            let dropped = route.coordinates.len() - pts.len();
            report.dropped_points += dropped;
            if pts.is_empty() {
                warn!(
                    "Route {} has no usable coordinates ({} given), skipping it",
                    route.name,
                    route.coordinates.len()
                );
                report.skipped_routes += 1;
                continue;
            }
            if dropped > 0 {
                warn!("Dropped {dropped} unusable coordinates from route {}", route.name);
            }
            match surface.add_line(&pts, &config.line_style(route)) {
                Ok(handle) => {
                    self.handles.push(handle);
                    report.lines += 1;
                    drawn_pts.extend(pts);
                }
                Err(err) => {
                    error!("Couldn't draw route {}: {err}", route.name);
                    report.engine_errors += 1;
                }
            }
        }

        for marker in markers {
            if !marker.position.is_finite() {
                warn!(
                    "Marker {} has an unusable position {:?}, skipping it",
                    marker.label, marker.position
                );
                report.skipped_markers += 1;
                continue;
            }
            match surface.add_marker(marker.position, &config.marker_style(marker)) {
                Ok(handle) => {
                    self.handles.push(handle);
                    report.markers += 1;
                }
                Err(err) => {
                    error!("Couldn't place marker {}: {err}", marker.label);
                    report.engine_errors += 1;
                }
            }
        }

        report.route_points = drawn_pts.len();
        if drawn_pts.len() >= 2 {
            if let Some(bounds) = LatLonBounds::from_points(&drawn_pts) {
                mgr.schedule_fit(token, bounds);
                report.fit = Some(bounds);
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::testing::{Call, RecordingEngine};
    use crate::map::{ContainerSize, MapConfig, MarkerKind};

    fn ready_manager() -> (
        SurfaceManager<RecordingEngine>,
        std::rc::Rc<std::cell::RefCell<crate::map::testing::Recording>>,
    ) {
        let (engine, log) = RecordingEngine::new();
        let mut mgr = SurfaceManager::new(engine, MapConfig::default());
        assert!(mgr.initialize(
            ContainerSize::new(800.0, 600.0),
            LatLon::new(8.2280, 124.2452),
            13.0
        ));
        (mgr, log)
    }

    fn route_a() -> RouteDescriptor {
        RouteDescriptor::new(
            "A",
            "#2E7D32",
            vec![LatLon::new(8.19, 124.21), LatLon::new(8.20, 124.22)],
        )
    }

    fn terminal() -> MarkerDescriptor {
        MarkerDescriptor::new(LatLon::new(8.19, 124.21), "Suarez Terminal", MarkerKind::Terminal)
    }

    #[test]
    fn route_and_terminal_then_framed() {
        let (mut mgr, log) = ready_manager();
        let delay = mgr.config().fit_delay;
        let mut layers = LayerSet::new();
        let report = layers.sync(&mut mgr, &[route_a()], &[terminal()]);
        assert_eq!(report.lines, 1);
        assert_eq!(report.markers, 1);
        assert_eq!(report.route_points, 2);

        {
            let log = log.borrow();
            assert_eq!(log.lines.len(), 1);
            let (pts, style) = log.lines.values().next().unwrap();
            assert_eq!(pts.len(), 2);
            assert_eq!(style.color, "#2E7D32");
            assert_eq!(style.label, "A");
            let (_, marker) = log.markers.values().next().unwrap();
            assert_eq!(marker.kind, MarkerKind::Terminal);
            assert_eq!(marker.color, "#2E7D32");
            // Not framed until the delay passes
            assert_eq!(log.count_fits(), 0);
        }

        mgr.advance(delay, ContainerSize::new(800.0, 600.0));
        let fit = log.borrow().last_fit().unwrap();
        assert!(fit.contains(LatLon::new(8.19, 124.21)));
        assert!(fit.contains(LatLon::new(8.20, 124.22)));
        match log.borrow().calls.last() {
            Some(Call::FitBounds {
                padding_px,
                max_zoom,
                ..
            }) => {
                assert_eq!(*padding_px, 50.0);
                assert_eq!(*max_zoom, 16.0);
            }
            x => panic!("expected a fit, got {:?}", x),
        }
    }

    #[test]
    fn route_with_only_bad_points() {
        let (mut mgr, log) = ready_manager();
        let mut layers = LayerSet::new();
        let b = RouteDescriptor::new("B", "#C62828", vec![LatLon::new(f64::NAN, 124.21)]);
        let report = layers.sync(&mut mgr, &[b], &[]);
        assert_eq!(report.lines, 0);
        assert_eq!(report.skipped_routes, 1);
        assert_eq!(report.engine_errors, 0);
        assert!(report.fit.is_none());
        assert!(log.borrow().lines.is_empty());
    }

    #[test]
    fn bad_entries_dont_block_others() {
        let (mut mgr, log) = ready_manager();
        let mut layers = LayerSet::new();
        let mut partial = route_a();
        partial.name = "partial".to_string();
        partial
            .coordinates
            .insert(1, LatLon::new(8.195, f64::INFINITY));
        let routes = vec![
            RouteDescriptor::new("bad", "#000000", vec![LatLon::new(f64::NAN, f64::NAN)]),
            partial,
        ];
        let markers = vec![
            MarkerDescriptor::new(LatLon::new(f64::NAN, 124.2), "lost", MarkerKind::Stop),
            MarkerDescriptor::new(LatLon::new(8.2, 124.22), "Palao", MarkerKind::Stop),
        ];
        let report = layers.sync(&mut mgr, &routes, &markers);
        assert_eq!(report.lines, 1);
        assert_eq!(report.markers, 1);
        assert_eq!(report.skipped_routes, 1);
        assert_eq!(report.skipped_markers, 1);
        assert_eq!(report.dropped_points, 2);
        let log = log.borrow();
        let (pts, _) = log.lines.values().next().unwrap();
        assert_eq!(pts.len(), 2);
        let (_, marker) = log.markers.values().next().unwrap();
        assert_eq!(marker.color, "#F9A825");
    }

    #[test]
    fn second_sync_replaces_the_first() {
        let (mut mgr, log) = ready_manager();
        let mut layers = LayerSet::new();
        layers.sync(&mut mgr, &[route_a()], &[terminal()]);
        let second = RouteDescriptor::new(
            "C",
            "#1565C0",
            vec![LatLon::new(8.21, 124.23), LatLon::new(8.22, 124.24)],
        );
        layers.sync(&mut mgr, &[second], &[]);
        let log = log.borrow();
        assert_eq!(log.lines.len(), 1);
        assert!(log.markers.is_empty());
        assert_eq!(log.lines.values().next().unwrap().1.label, "C");
        assert_eq!(layers.len(), 1);
    }

    #[test]
    fn rapid_syncs_frame_the_latest() {
        let (mut mgr, log) = ready_manager();
        let delay = mgr.config().fit_delay;
        let mut layers = LayerSet::new();
        layers.sync(&mut mgr, &[route_a()], &[]);
        let far = RouteDescriptor::new(
            "far",
            "#1565C0",
            vec![LatLon::new(8.30, 124.30), LatLon::new(8.31, 124.31)],
        );
        layers.sync(&mut mgr, &[far], &[]);
        mgr.advance(delay, ContainerSize::new(800.0, 600.0));
        let log = log.borrow();
        assert_eq!(log.count_fits(), 2);
        assert!(log.last_fit().unwrap().contains(LatLon::new(8.30, 124.30)));
        assert_eq!(log.misuse, 0);
    }

    #[test]
    fn engine_error_on_one_route() {
        let (mut mgr, log) = ready_manager();
        log.borrow_mut().fail_lines.insert("A".to_string());
        let mut layers = LayerSet::new();
        let other = RouteDescriptor::new(
            "C",
            "#1565C0",
            vec![LatLon::new(8.21, 124.23), LatLon::new(8.22, 124.24)],
        );
        let report = layers.sync(&mut mgr, &[route_a(), other], &[terminal()]);
        assert_eq!(report.engine_errors, 1);
        assert_eq!(report.lines, 1);
        assert_eq!(report.markers, 1);
        assert_eq!(report.route_points, 2);
    }

    #[test]
    fn single_point_isnt_framed() {
        let (mut mgr, _log) = ready_manager();
        let mut layers = LayerSet::new();
        let dot = RouteDescriptor::new("dot", "#000000", vec![LatLon::new(8.2, 124.2)]);
        let report = layers.sync(&mut mgr, &[dot], &[]);
        assert_eq!(report.lines, 1);
        assert!(report.fit.is_none());
        assert!(!mgr.has_pending_work());
    }

    #[test]
    fn not_ready_is_a_noop() {
        let (engine, log) = RecordingEngine::new();
        let mut mgr = SurfaceManager::new(engine, MapConfig::default());
        let mut layers = LayerSet::new();
        assert!(!layers.needs_sync(&mgr));
        let report = layers.sync(&mut mgr, &[route_a()], &[terminal()]);
        assert_eq!(report, SyncReport::default());
        assert!(log.borrow().calls.is_empty());

        mgr.initialize(ContainerSize::new(800.0, 600.0), LatLon::new(8.2, 124.2), 13.0);
        assert!(layers.needs_sync(&mgr));
        layers.sync(&mut mgr, &[route_a()], &[terminal()]);
        assert!(!layers.needs_sync(&mgr));
    }

    #[test]
    fn handles_from_an_old_surface_are_forgotten() {
        let (mut mgr, log) = ready_manager();
        let mut layers = LayerSet::new();
        layers.sync(&mut mgr, &[route_a()], &[terminal()]);
        mgr.remount();
        mgr.initialize(ContainerSize::new(800.0, 600.0), LatLon::new(8.2, 124.2), 13.0);
        let report = layers.sync(&mut mgr, &[route_a()], &[]);
        assert_eq!(report.engine_errors, 0);
        assert_eq!(log.borrow().lines.len(), 1);
        assert_eq!(log.borrow().misuse, 0);
    }
}
