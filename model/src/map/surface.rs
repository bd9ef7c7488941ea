use geom::Duration;

use super::{ContainerSize, DeferredQueue, LatLon, LatLonBounds, MapConfig, MapEngine, MapSurface};

/// Lifecycle of the one map instance a view owns. `Initializing` lasts while a deferred attempt
/// is waiting for the container to get a size. `Destroyed` stays that way until `remount`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceState {
    Uninitialized,
    Initializing,
    Ready,
    Destroyed,
}

/// Identifies one created surface. A new one is issued every time a surface is created, so
/// deferred work can tell if the surface it was meant for is gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceToken(u64);

/// Releases the surface when dropped, which happens exactly once no matter how the owner goes
/// away.
struct SurfaceGuard<S: MapSurface> {
    surface: S,
    token: SurfaceToken,
}

impl<S: MapSurface> Drop for SurfaceGuard<S> {
    fn drop(&mut self) {
        debug!("Releasing map surface {:?}", self.token);
        self.surface.release();
    }
}

enum Task {
    Initialize {
        /// Which mount cycle asked for this
        mount: u64,
        attempt: usize,
        center: LatLon,
        zoom: f64,
    },
    FitBounds {
        token: SurfaceToken,
        bounds: LatLonBounds,
    },
}

/// Owns the map instance for one mounted view.
pub struct SurfaceManager<E: MapEngine> {
    engine: E,
    config: MapConfig,
    state: SurfaceState,
    guard: Option<SurfaceGuard<E::Surface>>,
    tokens_issued: u64,
    /// Bumped on every teardown, so initialization queued for an old mount goes stale
    mount: u64,
    queue: DeferredQueue<Task>,
}

impl<E: MapEngine> SurfaceManager<E> {
    pub fn new(engine: E, config: MapConfig) -> Self {
        Self {
            engine,
            config,
            state: SurfaceState::Uninitialized,
            guard: None,
            tokens_issued: 0,
            mount: 0,
            queue: DeferredQueue::new(),
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SurfaceState::Ready
    }

    /// Only while ready
    pub fn token(&self) -> Option<SurfaceToken> {
        if self.is_ready() {
            self.guard.as_ref().map(|g| g.token)
        } else {
            None
        }
    }

    pub fn surface_mut(&mut self) -> Option<(SurfaceToken, &mut E::Surface)> {
        if self.state != SurfaceState::Ready {
            return None;
        }
        self.guard.as_mut().map(|g| (g.token, &mut g.surface))
    }

    /// Create the surface right away. Returns true if the map is now ready. Does nothing if a
    /// surface exists or an attempt is pending. A container without a size or an engine failure
    /// is logged and leaves the manager uninitialized, so a later call can try again.
    pub fn initialize(&mut self, container: ContainerSize, center: LatLon, zoom: f64) -> bool {
        match self.state {
            SurfaceState::Uninitialized => self.try_create(container, center, zoom),
            state => {
                debug!("Ignoring map initialization while {:?}", state);
                false
            }
        }
    }

    /// Create the surface once the container has a size, checking after a delay and retrying a
    /// bounded number of times. Callers don't wait.
    pub fn schedule_initialize(&mut self, center: LatLon, zoom: f64) {
        if self.state != SurfaceState::Uninitialized {
            debug!("Ignoring map initialization while {:?}", self.state);
            return;
        }
        self.state = SurfaceState::Initializing;
        self.queue.schedule(
            self.config.init_retry_delay,
            Task::Initialize {
                mount: self.mount,
                attempt: 1,
                center,
                zoom,
            },
        );
    }

    fn try_create(&mut self, container: ContainerSize, center: LatLon, zoom: f64) -> bool {
        if !container.is_laid_out() {
            warn!(
                "Map container is {}x{}, not creating a map yet",
                container.width, container.height
            );
            self.state = SurfaceState::Uninitialized;
            return false;
        }

        self.state = SurfaceState::Initializing;
        match self.engine.create(container, center, zoom) {
            Ok(surface) => {
                self.tokens_issued += 1;
                let token = SurfaceToken(self.tokens_issued);
                self.guard = Some(SurfaceGuard { surface, token });
                self.state = SurfaceState::Ready;
                info!(
                    "Created map surface {:?} at {} (zoom {})",
                    token, center, zoom
                );
                true
            }
            Err(err) => {
                error!("Couldn't create a map surface: {err}");
                self.state = SurfaceState::Uninitialized;
                false
            }
        }
    }

    /// Reposition the map without animating. Does nothing unless ready.
    pub fn set_view(&mut self, center: LatLon, zoom: f64) {
        if let Some((_, surface)) = self.surface_mut() {
            if let Err(err) = surface.set_view(center, zoom) {
                error!("Couldn't move the map to {center}: {err}");
            }
        }
    }

    /// Frame some bounds after the configured delay, if the same surface is still around then.
    pub fn schedule_fit(&mut self, token: SurfaceToken, bounds: LatLonBounds) {
        self.queue
            .schedule(self.config.fit_delay, Task::FitBounds { token, bounds });
    }

    pub fn has_pending_work(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Let time pass, running any deferred work that came due. `container` is the current size of
    /// the map's container.
    pub fn advance(&mut self, dt: Duration, container: ContainerSize) {
        for task in self.queue.advance(dt) {
            match task {
                Task::Initialize {
                    mount,
                    attempt,
                    center,
                    zoom,
                } => {
                    if mount != self.mount || self.state != SurfaceState::Initializing {
                        debug!("Dropping a stale map initialization (now {:?})", self.state);
                        continue;
                    }
                    if container.is_laid_out() {
                        self.try_create(container, center, zoom);
                    } else if attempt < self.config.init_attempts {
                        self.queue.schedule(
                            self.config.init_retry_delay,
                            Task::Initialize {
                                mount,
                                attempt: attempt + 1,
                                center,
                                zoom,
                            },
                        );
                    } else {
                        warn!("Map container still has no size after {attempt} attempts, giving up");
                        self.state = SurfaceState::Uninitialized;
                    }
                }
                Task::FitBounds { token, bounds } => {
                    let padding = self.config.fit_padding_px;
                    let max_zoom = self.config.max_fit_zoom;
                    match self.surface_mut() {
                        Some((current, surface)) if current == token => {
                            if let Err(err) = surface.fit_bounds(bounds, padding, max_zoom) {
                                error!("Couldn't frame the map: {err}");
                            }
                        }
                        _ => {
                            debug!("Dropping a stale fit for surface {:?}", token);
                        }
                    }
                }
            }
        }
    }

    /// Tear down the surface. Readiness is gone before the engine instance is released, and any
    /// deferred work still queued becomes a no-op.
    pub fn destroy(&mut self) {
        if self.state == SurfaceState::Destroyed {
            return;
        }
        self.state = SurfaceState::Destroyed;
        self.mount += 1;
        self.guard = None;
    }

    /// Start a new mount cycle. Tears down any current surface first.
    pub fn remount(&mut self) {
        self.destroy();
        self.state = SurfaceState::Uninitialized;
    }
}

impl<E: MapEngine> Drop for SurfaceManager<E> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::testing::{Call, RecordingEngine};

    fn center() -> LatLon {
        LatLon::new(8.2280, 124.2452)
    }

    fn size() -> ContainerSize {
        ContainerSize::new(800.0, 600.0)
    }

    #[test]
    fn zero_size_then_retry() {
        let (engine, log) = RecordingEngine::new();
        let mut mgr = SurfaceManager::new(engine, MapConfig::default());
        assert!(!mgr.initialize(ContainerSize::new(0.0, 600.0), center(), 13.0));
        assert_eq!(mgr.state(), SurfaceState::Uninitialized);
        assert_eq!(log.borrow().created, 0);

        assert!(mgr.initialize(size(), center(), 13.0));
        assert_eq!(mgr.state(), SurfaceState::Ready);
        assert_eq!(log.borrow().created, 1);

        // Further calls are no-ops
        assert!(!mgr.initialize(size(), center(), 13.0));
        assert_eq!(log.borrow().created, 1);
    }

    #[test]
    fn engine_failure_leaves_uninitialized() {
        let (engine, log) = RecordingEngine::new();
        log.borrow_mut().fail_next_creates = 1;
        let mut mgr = SurfaceManager::new(engine, MapConfig::default());
        assert!(!mgr.initialize(size(), center(), 13.0));
        assert_eq!(mgr.state(), SurfaceState::Uninitialized);
        assert!(mgr.initialize(size(), center(), 13.0));
    }

    #[test]
    fn deferred_initialize_waits_for_layout() {
        let (engine, log) = RecordingEngine::new();
        let config = MapConfig::default();
        let step = config.init_retry_delay;
        let mut mgr = SurfaceManager::new(engine, config);

        mgr.schedule_initialize(center(), 13.0);
        assert_eq!(mgr.state(), SurfaceState::Initializing);
        // Re-entrant calls are ignored while pending
        mgr.schedule_initialize(center(), 13.0);
        assert!(!mgr.initialize(size(), center(), 13.0));

        mgr.advance(step, ContainerSize::zero());
        mgr.advance(step, ContainerSize::zero());
        assert_eq!(mgr.state(), SurfaceState::Initializing);
        assert_eq!(log.borrow().created, 0);

        mgr.advance(step, size());
        assert_eq!(mgr.state(), SurfaceState::Ready);
        assert_eq!(log.borrow().created, 1);
        assert!(!mgr.has_pending_work());
    }

    #[test]
    fn deferred_initialize_gives_up() {
        let (engine, log) = RecordingEngine::new();
        let mut config = MapConfig::default();
        config.init_attempts = 3;
        let step = config.init_retry_delay;
        let mut mgr = SurfaceManager::new(engine, config);
        mgr.schedule_initialize(center(), 13.0);
        for _ in 0..10 {
            mgr.advance(step, ContainerSize::zero());
        }
        assert_eq!(mgr.state(), SurfaceState::Uninitialized);
        assert!(!mgr.has_pending_work());
        assert_eq!(log.borrow().created, 0);
    }

    #[test]
    fn set_view_only_when_ready() {
        let (engine, log) = RecordingEngine::new();
        let mut mgr = SurfaceManager::new(engine, MapConfig::default());
        mgr.set_view(center(), 15.0);
        assert!(log.borrow().calls.is_empty());

        mgr.initialize(size(), center(), 13.0);
        mgr.set_view(LatLon::new(8.2, 124.2), 15.0);
        assert_eq!(
            log.borrow().calls.last(),
            Some(&Call::SetView {
                center: LatLon::new(8.2, 124.2),
                zoom: 15.0
            })
        );
    }

    #[test]
    fn release_exactly_once() {
        let (engine, log) = RecordingEngine::new();
        {
            let mut mgr = SurfaceManager::new(engine, MapConfig::default());
            mgr.initialize(size(), center(), 13.0);
            mgr.destroy();
            assert!(!mgr.is_ready());
            assert_eq!(mgr.state(), SurfaceState::Destroyed);
            mgr.destroy();
            // Destroyed is terminal until a remount
            assert!(!mgr.initialize(size(), center(), 13.0));
        }
        assert_eq!(log.borrow().released, 1);
        assert_eq!(log.borrow().misuse, 0);
    }

    #[test]
    fn drop_releases() {
        let (engine, log) = RecordingEngine::new();
        let mut mgr = SurfaceManager::new(engine, MapConfig::default());
        mgr.initialize(size(), center(), 13.0);
        drop(mgr);
        assert_eq!(log.borrow().released, 1);
    }

    #[test]
    fn release_while_unwinding() {
        let (engine, log) = RecordingEngine::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut mgr = SurfaceManager::new(engine, MapConfig::default());
            mgr.initialize(size(), center(), 13.0);
            panic!("page blew up");
        }));
        assert!(result.is_err());
        assert_eq!(log.borrow().released, 1);
    }

    #[test]
    fn stale_fit_after_destroy() {
        let (engine, log) = RecordingEngine::new();
        let config = MapConfig::default();
        let delay = config.fit_delay;
        let mut mgr = SurfaceManager::new(engine, config);
        mgr.initialize(size(), center(), 13.0);
        let token = mgr.token().unwrap();
        let bounds =
            LatLonBounds::from_points(&[LatLon::new(8.19, 124.21), LatLon::new(8.2, 124.22)])
                .unwrap();
        mgr.schedule_fit(token, bounds);
        mgr.destroy();
        let before = log.borrow().calls.len();
        mgr.advance(delay, size());
        assert_eq!(log.borrow().calls.len(), before);
        assert_eq!(log.borrow().misuse, 0);
    }

    #[test]
    fn stale_fit_after_remount() {
        let (engine, log) = RecordingEngine::new();
        let config = MapConfig::default();
        let delay = config.fit_delay;
        let mut mgr = SurfaceManager::new(engine, config);
        mgr.initialize(size(), center(), 13.0);
        let old = mgr.token().unwrap();
        let bounds =
            LatLonBounds::from_points(&[LatLon::new(8.19, 124.21), LatLon::new(8.2, 124.22)])
                .unwrap();
        mgr.schedule_fit(old, bounds);

        mgr.remount();
        assert!(mgr.initialize(size(), center(), 13.0));
        assert_ne!(mgr.token(), Some(old));
        mgr.advance(delay, size());
        assert_eq!(log.borrow().count_fits(), 0);
        assert_eq!(log.borrow().created, 2);
        assert_eq!(log.borrow().released, 1);
    }

    #[test]
    fn old_initialize_ignored_after_remount() {
        let (engine, log) = RecordingEngine::new();
        let config = MapConfig::default();
        let step = config.init_retry_delay;
        let mut mgr = SurfaceManager::new(engine, config);

        mgr.schedule_initialize(LatLon::new(1.0, 2.0), 10.0);
        mgr.remount();
        mgr.schedule_initialize(center(), 13.0);
        mgr.advance(step, size());

        assert_eq!(mgr.state(), SurfaceState::Ready);
        assert_eq!(log.borrow().created, 1);
        assert!(log.borrow().calls.iter().any(|call| matches!(
            call,
            Call::Create { center: c, zoom, .. } if *c == center() && *zoom == 13.0
        )));
        assert!(!mgr.has_pending_work());
    }

    #[test]
    fn old_initialize_giving_up_doesnt_cancel_new_mount() {
        let (engine, log) = RecordingEngine::new();
        let mut config = MapConfig::default();
        config.init_attempts = 5;
        let step = config.init_retry_delay;
        let mut mgr = SurfaceManager::new(engine, config);

        mgr.schedule_initialize(LatLon::new(1.0, 2.0), 10.0);
        for _ in 0..4 {
            mgr.advance(step, ContainerSize::zero());
        }
        // The old chain's last attempt and the new mount's first one come due together
        mgr.remount();
        mgr.schedule_initialize(center(), 13.0);
        mgr.advance(step, ContainerSize::zero());
        assert_eq!(mgr.state(), SurfaceState::Initializing);
        assert!(mgr.has_pending_work());

        mgr.advance(step, size());
        assert_eq!(mgr.state(), SurfaceState::Ready);
        assert_eq!(log.borrow().created, 1);
    }
}
