use widgetry::{Choice, EventCtx, GfxCtx, Outcome, Panel, State, TextBox, TextExt, Widget};

use model::search::filter_stops;
use model::MapFilter;
use network::{StopID, StopKind};

use crate::components::{describe, nav_bar, MapPanel};
use crate::{App, Transition};

pub struct StopsPage {
    panel: Panel,
    map: MapPanel,
    selected: Option<StopID>,
}

impl StopsPage {
    pub fn new_state(
        ctx: &mut EventCtx,
        app: &App,
        selected: Option<StopID>,
    ) -> Box<dyn State<App>> {
        let mut kinds = vec![Choice::new("all stops", None)];
        for kind in [StopKind::Terminal, StopKind::Major, StopKind::Regular] {
            kinds.push(Choice::new(kind.describe(), Some(kind)));
        }
        let contents = Widget::col(vec![
            Widget::row(vec![
                "Search stops".text_widget(ctx).centered_vert(),
                TextBox::widget(ctx, "query", String::new(), false, 20),
                Widget::dropdown(ctx, "kind", None, kinds),
            ]),
            Widget::placeholder(ctx, "results"),
        ]);

        let filter = match selected {
            Some(s) => MapFilter::Stop(s),
            None => MapFilter::Everything,
        };
        let mut state = Self {
            panel: nav_bar::panel(ctx, app, contents),
            map: MapPanel::new(
                ctx,
                app,
                app.model.route_descriptors(filter),
                app.model.stop_markers(filter),
            ),
            selected,
        };
        state.update_results(ctx, app);
        Box::new(state)
    }

    fn update_results(&mut self, ctx: &mut EventCtx, app: &App) {
        let network = &app.model.network;
        let mut col = Vec::new();

        if let Some(stop) = self.selected.and_then(|s| network.stops.get(&s)) {
            col.push(describe::stop(stop, network).into_widget(ctx));
            col.push(Widget::row(vec![
                ctx.style().btn_outline.text("Zoom to stop").build_def(ctx),
                ctx.style().btn_outline.text("Show all stops").build_def(ctx),
            ]));
        } else {
            let query = self.panel.text_box("query");
            let kind: Option<StopKind> = self.panel.dropdown_value("kind");
            let matches = filter_stops(network, &query, kind);
            col.push(
                format!("{} of {} stops", matches.len(), network.stops.len()).text_widget(ctx),
            );
            for s in matches {
                let stop = &network.stops[&s];
                col.push(Widget::row(vec![
                    ctx.style()
                        .btn_outline
                        .text(&stop.name)
                        .build_widget(ctx, &format!("stop {}", s.0)),
                    format!("{}, {} routes", stop.kind.describe(), stop.routes.len())
                        .text_widget(ctx)
                        .centered_vert(),
                ]));
            }
        }

        self.panel
            .replace(ctx, "results", Widget::col(col).section(ctx));
    }
}

impl State<App> for StopsPage {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        if let Some(label) = self.map.event(ctx) {
            return super::open_map_label(ctx, app, &label);
        }

        match self.panel.event(ctx) {
            Outcome::Clicked(x) => {
                if let Some(t) = nav_bar::on_click(ctx, app, &x) {
                    return t;
                }
                if x == "Zoom to stop" {
                    if let Some(stop) = self.selected.and_then(|s| app.model.network.stops.get(&s)) {
                        self.map.focus(ctx, stop.pos, app.map_config.max_fit_zoom);
                    }
                    return Transition::Keep;
                }
                if x == "Show all stops" {
                    return Transition::Replace(Self::new_state(ctx, app, None));
                }
                if let Some(id) = x.strip_prefix("stop ").and_then(|x| x.parse::<usize>().ok()) {
                    return Transition::Replace(Self::new_state(ctx, app, Some(StopID(id))));
                }
                unreachable!()
            }
            Outcome::Changed(_) => {
                self.selected = None;
                self.map.set_layers(
                    ctx,
                    app.model.route_descriptors(MapFilter::Everything),
                    app.model.stop_markers(MapFilter::Everything),
                );
                self.update_results(ctx, app);
            }
            _ => {}
        }

        Transition::Keep
    }

    fn draw(&self, g: &mut GfxCtx, _: &App) {
        self.map.draw(g);
        self.panel.draw(g);
    }

    fn recreate(&mut self, ctx: &mut EventCtx, app: &mut App) -> Box<dyn State<App>> {
        Self::new_state(ctx, app, self.selected)
    }
}
