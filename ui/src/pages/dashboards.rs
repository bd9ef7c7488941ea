use widgetry::{EventCtx, GfxCtx, Line, Outcome, Panel, State, Text, TextExt, Widget};

use model::navigation::Page;
use model::MapFilter;
use network::{Popularity, RouteID};

use super::RoutesPage;
use crate::components::{describe, nav_bar, MapPanel};
use crate::{App, Transition};

pub struct CommuterDashboard {
    panel: Panel,
    map: MapPanel,
}

impl CommuterDashboard {
    pub fn new_state(ctx: &mut EventCtx, app: &App) -> Box<dyn State<App>> {
        let network = &app.model.network;
        let name = app
            .state
            .session()
            .map(|s| s.name.clone())
            .unwrap_or_default();
        let now = chrono::Local::now().time();

        let mut col = vec![
            Line(format!("Welcome back, {name}"))
                .small_heading()
                .into_widget(ctx),
            Widget::row(vec![
                ctx.style().btn_outline.text("Find a route").build_def(ctx),
                ctx.style().btn_outline.text("Calculate a fare").build_def(ctx),
                ctx.style().btn_outline.text("Scan a driver").build_def(ctx),
                ctx.style().btn_outline.text("Give feedback").build_def(ctx),
            ]),
            Line("Popular routes").small_heading().into_widget(ctx),
        ];
        for route in network
            .routes
            .values()
            .filter(|r| r.popularity == Popularity::High)
        {
            let next = match route.next_departure(now) {
                Some(t) => format!("next at {}", t.format("%H:%M")),
                None => "done for today".to_string(),
            };
            col.push(Widget::row(vec![
                ctx.style()
                    .btn_plain
                    .text(&route.name)
                    .build_widget(ctx, &format!("route {}", route.id.0)),
                Line(format!("{}, {next}", route.fare_range()))
                    .secondary()
                    .into_widget(ctx)
                    .centered_vert(),
            ]));
        }

        Box::new(Self {
            panel: nav_bar::panel(ctx, app, Widget::col(col)),
            map: MapPanel::new(
                ctx,
                app,
                app.model.route_descriptors(MapFilter::Everything),
                app.model.stop_markers(MapFilter::Everything),
            ),
        })
    }
}

impl State<App> for CommuterDashboard {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        if let Some(label) = self.map.event(ctx) {
            return super::open_map_label(ctx, app, &label);
        }

        if let Outcome::Clicked(x) = self.panel.event(ctx) {
            if let Some(t) = nav_bar::on_click(ctx, app, &x) {
                return t;
            }
            let page = match x.as_ref() {
                "Find a route" => Page::Routes,
                "Calculate a fare" => Page::Fares,
                "Scan a driver" => Page::ScanDriver,
                "Give feedback" => Page::Feedback,
                x => {
                    if let Some(id) = x.strip_prefix("route ").and_then(|x| x.parse::<usize>().ok())
                    {
                        app.state.navigate(Page::Routes);
                        return Transition::Replace(RoutesPage::new_state(
                            ctx,
                            app,
                            Some(RouteID(id)),
                        ));
                    }
                    unreachable!()
                }
            };
            return Transition::Replace(super::open(ctx, app, page));
        }

        Transition::Keep
    }

    fn draw(&self, g: &mut GfxCtx, _: &App) {
        self.map.draw(g);
        self.panel.draw(g);
    }

    fn recreate(&mut self, ctx: &mut EventCtx, app: &mut App) -> Box<dyn State<App>> {
        Self::new_state(ctx, app)
    }
}

pub struct DriverDashboard {
    panel: Panel,
    map: MapPanel,
}

impl DriverDashboard {
    pub fn new_state(ctx: &mut EventCtx, app: &App) -> Box<dyn State<App>> {
        let network = &app.model.network;
        let driver = app
            .state
            .session()
            .and_then(|s| s.driver)
            .and_then(|d| network.drivers.get(&d));

        let mut col = Vec::new();
        let mut filter = MapFilter::Nothing;
        match driver {
            Some(driver) => {
                col.push(
                    Line(format!("Good day, {}", driver.name))
                        .small_heading()
                        .into_widget(ctx),
                );
                let mut txt = Text::new();
                txt.add_line(Line(format!(
                    "{} trips, rated {:.1} / 5",
                    abstutil::prettyprint_usize(driver.total_trips),
                    driver.rating
                )));
                if let Some(avg) = app.model.feedback.driver_average(driver.id) {
                    txt.add_line(Line(format!("Commuter feedback averages {avg:.1} stars")));
                }
                txt.add_line(
                    Line(format!(
                        "Your code is {}. Keep the sticker visible.",
                        driver.qr_code()
                    ))
                    .secondary(),
                );
                col.push(txt.into_widget(ctx));

                if let Some(route) = network.routes.get(&driver.route) {
                    filter = MapFilter::Route(route.id);
                    col.push(Line("Your route").small_heading().into_widget(ctx));
                    col.push(
                        describe::route(route, network, chrono::Local::now().time())
                            .into_widget(ctx),
                    );
                }
                col.push(
                    ctx.style()
                        .btn_outline
                        .text("See your feedback")
                        .build_def(ctx),
                );
            }
            None => {
                col.push("This account isn't linked to a driver".text_widget(ctx));
            }
        }
        col.push(Line("Announcements").small_heading().into_widget(ctx));
        col.push(super::feedback::notices(ctx, app));

        Box::new(Self {
            panel: nav_bar::panel(ctx, app, Widget::col(col)),
            map: MapPanel::new(
                ctx,
                app,
                app.model.route_descriptors(filter),
                app.model.stop_markers(filter),
            ),
        })
    }
}

impl State<App> for DriverDashboard {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        if let Some(label) = self.map.event(ctx) {
            return super::open_map_label(ctx, app, &label);
        }

        if let Outcome::Clicked(x) = self.panel.event(ctx) {
            if let Some(t) = nav_bar::on_click(ctx, app, &x) {
                return t;
            }
            if x == "See your feedback" {
                return Transition::Replace(super::open(ctx, app, Page::DriverFeedback));
            }
            unreachable!()
        }

        Transition::Keep
    }

    fn draw(&self, g: &mut GfxCtx, _: &App) {
        self.map.draw(g);
        self.panel.draw(g);
    }

    fn recreate(&mut self, ctx: &mut EventCtx, app: &mut App) -> Box<dyn State<App>> {
        Self::new_state(ctx, app)
    }
}
