use widgetry::{
    DrawBaselayer, EventCtx, GfxCtx, Line, Outcome, Panel, State, TextBox, TextExt, Widget,
};

use model::navigation::Page;
use model::search::{search, SearchResult};
use network::{RouteID, StopID};

use super::{RoutesPage, StopsPage};
use crate::{App, Transition};

/// Searches routes and stops together, on top of the current page
pub struct Search {
    panel: Panel,
}

impl Search {
    pub fn new_state(ctx: &mut EventCtx, _: &App) -> Box<dyn State<App>> {
        Box::new(Self {
            panel: Panel::new_builder(Widget::col(vec![
                Widget::row(vec![
                    Line("Search routes and stops")
                        .small_heading()
                        .into_widget(ctx),
                    ctx.style().btn_close_widget(ctx),
                ]),
                TextBox::widget(ctx, "query", String::new(), true, 30),
                Widget::placeholder(ctx, "results"),
            ]))
            .build(ctx),
        })
    }

    fn update_results(&mut self, ctx: &mut EventCtx, app: &App) {
        let network = &app.model.network;
        let query = self.panel.text_box("query");
        let results = search(network, &query);
        let mut col = Vec::new();
        if results.is_empty() && !query.trim().is_empty() {
            col.push(format!("Nothing matches {query}").text_widget(ctx));
        }
        for result in results {
            let (label, action) = match result {
                SearchResult::Route(r) => (
                    format!("Route: {}", network.routes[&r].name),
                    format!("route {}", r.0),
                ),
                SearchResult::Stop(s) => (
                    format!("Stop: {}", network.stops[&s].name),
                    format!("stop {}", s.0),
                ),
            };
            col.push(
                ctx.style()
                    .btn_plain
                    .text(label)
                    .build_widget(ctx, &action),
            );
        }
        self.panel.replace(ctx, "results", Widget::col(col));
    }
}

impl State<App> for Search {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        match self.panel.event(ctx) {
            Outcome::Clicked(x) => {
                if x == "close" {
                    return Transition::Pop;
                }
                let role = app.state.role();
                if let Some(id) = x.strip_prefix("route ").and_then(|x| x.parse::<usize>().ok()) {
                    if Page::Routes.allowed(role) {
                        app.state.navigate(Page::Routes);
                        return Transition::Multi(vec![
                            Transition::Pop,
                            Transition::Replace(RoutesPage::new_state(ctx, app, Some(RouteID(id)))),
                        ]);
                    }
                } else if let Some(id) = x.strip_prefix("stop ").and_then(|x| x.parse::<usize>().ok())
                {
                    if Page::Stops.allowed(role) {
                        app.state.navigate(Page::Stops);
                        return Transition::Multi(vec![
                            Transition::Pop,
                            Transition::Replace(StopsPage::new_state(ctx, app, Some(StopID(id)))),
                        ]);
                    }
                }
                return Transition::Pop;
            }
            Outcome::Changed(_) => {
                self.update_results(ctx, app);
            }
            _ => {}
        }

        Transition::Keep
    }

    fn draw(&self, g: &mut GfxCtx, _: &App) {
        self.panel.draw(g);
    }

    fn draw_baselayer(&self) -> DrawBaselayer {
        DrawBaselayer::PreviousState
    }
}
