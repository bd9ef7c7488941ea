use widgetry::{EventCtx, GfxCtx, Line, Outcome, Panel, State, TextBox, TextExt, Widget};

use model::feedback::FeedbackTarget;
use model::navigation::Page;
use model::search::filter_routes;
use model::MapFilter;
use network::{Role, RouteID};

use super::FeedbackPage;
use crate::components::{describe, nav_bar, MapPanel};
use crate::{App, Transition};

pub struct RoutesPage {
    panel: Panel,
    map: MapPanel,
    selected: Option<RouteID>,
}

impl RoutesPage {
    pub fn new_state(
        ctx: &mut EventCtx,
        app: &App,
        selected: Option<RouteID>,
    ) -> Box<dyn State<App>> {
        let contents = Widget::col(vec![
            Widget::row(vec![
                "Search routes".text_widget(ctx).centered_vert(),
                TextBox::widget(ctx, "query", String::new(), false, 20),
                ctx.style()
                    .btn_outline
                    .text("Search everything")
                    .build_def(ctx),
            ]),
            Widget::placeholder(ctx, "results"),
        ]);
        let filter = match selected {
            Some(r) => MapFilter::Route(r),
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

        if let Some(r) = self.selected {
            let route = &network.routes[&r];
            let now = chrono::Local::now().time();
            col.push(describe::route(route, network, now).into_widget(ctx));
            col.push(
                Line(format!(
                    "{:.1} km measured along the route",
                    app.model.route_length_km(r)
                ))
                .secondary()
                .into_widget(ctx),
            );
            let drivers: Vec<&str> = network
                .drivers_on_route(r)
                .into_iter()
                .map(|d| d.name.as_str())
                .collect();
            if !drivers.is_empty() {
                col.push(format!("Drivers: {}", drivers.join(", ")).text_widget(ctx));
            }

            let mut buttons = vec![ctx.style().btn_outline.text("Show all routes").build_def(ctx)];
            if cfg!(not(target_arch = "wasm32")) {
                buttons.push(ctx.style().btn_outline.text("Export GeoJSON").build_def(ctx));
            }
            if app.state.role() == Some(Role::Commuter) {
                buttons.push(ctx.style().btn_outline.text("Rate this route").build_def(ctx));
            }
            col.push(Widget::row(buttons));

            let feedback = app.model.feedback.for_route(r);
            if !feedback.is_empty() {
                col.push(Line("What commuters say").small_heading().into_widget(ctx));
                for entry in feedback.into_iter().take(3) {
                    col.push(describe::feedback(entry, network).into_widget(ctx));
                }
            }
        } else {
            let query = self.panel.text_box("query");
            let matches = filter_routes(network, &query);
            col.push(
                format!("{} of {} routes", matches.len(), network.routes.len()).text_widget(ctx),
            );
            for r in matches {
                let route = &network.routes[&r];
                col.push(Widget::row(vec![
                    ctx.style()
                        .btn_outline
                        .text(&route.name)
                        .build_widget(ctx, &format!("route {}", r.0)),
                    Line(format!("{}, {}", route.fare_range(), route.duration))
                        .secondary()
                        .into_widget(ctx)
                        .centered_vert(),
                ]));
            }
        }

        self.panel
            .replace(ctx, "results", Widget::col(col).section(ctx));
    }
}

impl State<App> for RoutesPage {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        if let Some(label) = self.map.event(ctx) {
            return super::open_map_label(ctx, app, &label);
        }

        match self.panel.event(ctx) {
            Outcome::Clicked(x) => {
                if let Some(t) = nav_bar::on_click(ctx, app, &x) {
                    return t;
                }
                match x.as_ref() {
                    "Search everything" => {
                        return Transition::Push(super::search::Search::new_state(ctx, app));
                    }
                    "Show all routes" => {
                        return Transition::Replace(Self::new_state(ctx, app, None));
                    }
                    "Export GeoJSON" => {
                        if let Some(r) = self.selected {
                            let route = &app.model.network.routes[&r];
                            let path = format!("{}.geojson", route.orig_id.0);
                            return match route.export_to_geojson(path.clone(), &app.model.network)
                            {
                                Ok(()) => super::info_popup(ctx, "Exported", format!("Wrote {path}")),
                                Err(err) => super::error_popup(ctx, err),
                            };
                        }
                    }
                    "Rate this route" => {
                        if let Some(r) = self.selected {
                            app.state.navigate(Page::Feedback);
                            return Transition::Replace(FeedbackPage::new_state(
                                ctx,
                                app,
                                Some(FeedbackTarget::Route(r)),
                            ));
                        }
                    }
                    x => {
                        if let Some(id) = x.strip_prefix("route ") {
                            if let Ok(id) = id.parse::<usize>() {
                                return Transition::Replace(Self::new_state(
                                    ctx,
                                    app,
                                    Some(RouteID(id)),
                                ));
                            }
                        }
                        unreachable!()
                    }
                }
            }
            Outcome::Changed(_) => {
                // Typing a search goes back to the list
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
