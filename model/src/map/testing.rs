//! A fake engine that records everything done to it.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use anyhow::Result;

use super::{
    ContainerSize, LatLon, LatLonBounds, LayerHandle, LineStyle, MapEngine, MapSurface,
    MarkerStyle,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Create {
        size: ContainerSize,
        center: LatLon,
        zoom: f64,
    },
    SetView {
        center: LatLon,
        zoom: f64,
    },
    AddLine {
        handle: LayerHandle,
        pts: Vec<LatLon>,
        style: LineStyle,
    },
    AddMarker {
        handle: LayerHandle,
        pos: LatLon,
        style: MarkerStyle,
    },
    RemoveLayer(LayerHandle),
    FitBounds {
        bounds: LatLonBounds,
        padding_px: f64,
        max_zoom: f64,
    },
    Release,
}

#[derive(Default)]
pub struct Recording {
    pub calls: Vec<Call>,
    /// What's drawn on the live surface right now
    pub lines: BTreeMap<LayerHandle, (Vec<LatLon>, LineStyle)>,
    pub markers: BTreeMap<LayerHandle, (LatLon, MarkerStyle)>,
    pub created: usize,
    pub released: usize,
    /// Calls made to a surface after its release
    pub misuse: usize,

    /// Make this many upcoming `create` calls fail
    pub fail_next_creates: usize,
    /// Lines with these labels fail to draw
    pub fail_lines: BTreeSet<String>,
    next_handle: usize,
}

impl Recording {
    pub fn count_fits(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::FitBounds { .. }))
            .count()
    }

    pub fn last_fit(&self) -> Option<LatLonBounds> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::FitBounds { bounds, .. } => Some(*bounds),
            _ => None,
        })
    }
}

pub struct RecordingEngine {
    log: Rc<RefCell<Recording>>,
}

impl RecordingEngine {
    pub fn new() -> (Self, Rc<RefCell<Recording>>) {
        let log = Rc::new(RefCell::new(Recording::default()));
        (Self { log: log.clone() }, log)
    }
}

impl MapEngine for RecordingEngine {
    type Surface = RecordingSurface;

    fn create(&mut self, size: ContainerSize, center: LatLon, zoom: f64) -> Result<RecordingSurface> {
        let mut log = self.log.borrow_mut();
        if log.fail_next_creates > 0 {
            log.fail_next_creates -= 1;
            bail!("engine refused to start");
        }
        log.created += 1;
        log.lines.clear();
        log.markers.clear();
        log.calls.push(Call::Create { size, center, zoom });
        Ok(RecordingSurface {
            log: self.log.clone(),
            released: false,
        })
    }
}

pub struct RecordingSurface {
    log: Rc<RefCell<Recording>>,
    released: bool,
}

impl RecordingSurface {
    fn check(&self) -> Result<()> {
        if self.released {
            self.log.borrow_mut().misuse += 1;
            bail!("surface used after release");
        }
        Ok(())
    }

    fn new_handle(&self) -> LayerHandle {
        let mut log = self.log.borrow_mut();
        log.next_handle += 1;
        LayerHandle(log.next_handle)
    }
}

impl MapSurface for RecordingSurface {
    fn set_view(&mut self, center: LatLon, zoom: f64) -> Result<()> {
        self.check()?;
        self.log
            .borrow_mut()
            .calls
            .push(Call::SetView { center, zoom });
        Ok(())
    }

    fn add_line(&mut self, pts: &[LatLon], style: &LineStyle) -> Result<LayerHandle> {
        self.check()?;
        if self.log.borrow().fail_lines.contains(&style.label) {
            bail!("can't draw {}", style.label);
        }
        let handle = self.new_handle();
        let mut log = self.log.borrow_mut();
        log.calls.push(Call::AddLine {
            handle,
            pts: pts.to_vec(),
            style: style.clone(),
        });
        log.lines.insert(handle, (pts.to_vec(), style.clone()));
        Ok(handle)
    }

    fn add_marker(&mut self, pos: LatLon, style: &MarkerStyle) -> Result<LayerHandle> {
        self.check()?;
        let handle = self.new_handle();
        let mut log = self.log.borrow_mut();
        log.calls.push(Call::AddMarker {
            handle,
            pos,
            style: style.clone(),
        });
        log.markers.insert(handle, (pos, style.clone()));
        Ok(handle)
    }

    fn remove_layer(&mut self, layer: LayerHandle) -> Result<()> {
        self.check()?;
        let mut log = self.log.borrow_mut();
        if log.lines.remove(&layer).is_none() && log.markers.remove(&layer).is_none() {
            bail!("no layer {:?}", layer);
        }
        log.calls.push(Call::RemoveLayer(layer));
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: LatLonBounds, padding_px: f64, max_zoom: f64) -> Result<()> {
        self.check()?;
        self.log.borrow_mut().calls.push(Call::FitBounds {
            bounds,
            padding_px,
            max_zoom,
        });
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            self.log.borrow_mut().misuse += 1;
            return;
        }
        self.released = true;
        let mut log = self.log.borrow_mut();
        log.released += 1;
        log.lines.clear();
        log.markers.clear();
        log.calls.push(Call::Release);
    }
}
