#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod components;
mod engine;
mod pages;

use abstutil::Timer;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use structopt::StructOpt;
use widgetry::{Canvas, Color, EventCtx, GfxCtx, Settings, SharedAppState};

use model::map::MapConfig;
use model::navigation::{AppState, Page};
use model::Model;
use network::{Network, Source};

const SAVESTATE_PATH: &str = "data/save.json";

#[derive(StructOpt)]
struct Args {
    /// A directory with routes.csv, stops.csv and the other network tables. The built-in network
    /// is used if this is omitted.
    #[structopt(long)]
    data: Option<String>,
    /// The page to open first, like "routes" or "fares"
    #[structopt(long)]
    start: Option<String>,
    /// A JSON file overriding the map settings
    #[structopt(long)]
    map_config: Option<String>,
}

impl Args {
    // TODO --data only makes sense on native
    fn load(&self) -> Result<Model> {
        let source = match self.data {
            Some(ref dir) => Source::Directory(dir.clone()),
            None => Source::Embedded,
        };
        Model::load(&source)
    }

    fn map_config(&self) -> MapConfig {
        match self.map_config {
            Some(ref path) => {
                match abstio::maybe_read_json::<MapConfig>(path.clone(), &mut Timer::throwaway()) {
                    Ok(config) => config,
                    Err(err) => {
                        error!("Couldn't read {path}: {err}. Using the default map settings.");
                        MapConfig::default()
                    }
                }
            }
            None => MapConfig::default(),
        }
    }

    fn start_page(&self) -> Option<Page> {
        let x = self.start.as_ref()?;
        match x.parse::<Page>() {
            Ok(page) => Some(page),
            Err(err) => {
                warn!("Ignoring --start: {err}");
                None
            }
        }
    }
}

fn run(settings: Settings) {
    abstutil::logger::setup();

    let args = Args::from_iter(abstutil::cli_args());

    widgetry::run(settings, move |ctx| {
        let model = ctx.loading_screen("load network", |_, _| match args.load() {
            Ok(model) => model,
            Err(err) => {
                error!("Couldn't load the network: {err}");
                Model::new(Network::empty())
            }
        });
        info!(
            "Loaded {} routes, {} stops, {} drivers",
            model.network.routes.len(),
            model.network.stops.len(),
            model.network.drivers.len()
        );

        let mut app = App::new(ctx, model, args.map_config());

        let mut start = args.start_page();
        // Only native runs reuse a savestate. before_quit is never called on web.
        if let Ok(savestate) =
            abstio::maybe_read_json::<Savestate>(SAVESTATE_PATH.to_string(), &mut Timer::throwaway())
        {
            ctx.canvas.cam_x = savestate.cam_x;
            ctx.canvas.cam_y = savestate.cam_y;
            ctx.canvas.cam_zoom = savestate.cam_zoom;
            if start.is_none() {
                start = Some(savestate.page);
            }
        }

        let states = vec![pages::open(ctx, &mut app, start.unwrap_or(Page::Landing))];
        (app, states)
    });
}

pub fn main() {
    let settings = Settings::new("Lakbay");
    run(settings);
}

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_wasm() {
    run(Settings::new("Lakbay").root_dom_element_id("loading".to_string()));
}

pub struct App {
    model: Model,
    state: AppState,
    map_config: MapConfig,
}

impl SharedAppState for App {
    fn draw_default(&self, g: &mut GfxCtx) {
        g.clear(Color::hex("#ECEFF1"));
    }

    fn before_quit(&self, canvas: &Canvas) {
        // Nobody should land on a page that needs the session they had last time
        let page = self.state.page();
        let ss = Savestate {
            cam_x: canvas.cam_x,
            cam_y: canvas.cam_y,
            cam_zoom: canvas.cam_zoom,
            page: if page.requires_login() {
                Page::Landing
            } else {
                page
            },
        };
        abstio::write_json(SAVESTATE_PATH.to_string(), &ss);
    }
}

pub type Transition = widgetry::Transition<App>;

impl App {
    pub fn new(ctx: &mut EventCtx, model: Model, map_config: MapConfig) -> Self {
        let bounds = &model.bounds;
        ctx.canvas.map_dims = (bounds.max_x, bounds.max_y);
        ctx.canvas.center_on_map_pt(bounds.center());

        Self {
            model,
            state: AppState::new(),
            map_config,
        }
    }

    pub fn today() -> chrono::NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[derive(Serialize, Deserialize)]
pub struct Savestate {
    cam_x: f64,
    cam_y: f64,
    cam_zoom: f64,
    page: Page,
}
