use widgetry::{EventCtx, GfxCtx, Line, Outcome, Panel, State, Text, Widget};

use model::feedback::FeedbackTarget;
use model::navigation::Page;
use model::MapFilter;
use network::{DriverID, Role};

use super::FeedbackPage;
use crate::components::{describe, nav_bar, txt_table, MapPanel};
use crate::{App, Transition};

pub struct DriversPage {
    panel: Panel,
    map: MapPanel,
    selected: Option<DriverID>,
}

impl DriversPage {
    pub fn new_state(
        ctx: &mut EventCtx,
        app: &App,
        selected: Option<DriverID>,
    ) -> Box<dyn State<App>> {
        let network = &app.model.network;
        let mut col = Vec::new();

        let rows = network
            .drivers
            .values()
            .map(|d| {
                (
                    format!("driver {}", d.id.0),
                    vec![
                        Text::from(Line(&d.name)),
                        Text::from(Line(
                            network
                                .routes
                                .get(&d.route)
                                .map(|r| r.name.as_str())
                                .unwrap_or("no route"),
                        )),
                        Text::from(Line(format!("{:.1}", d.rating))),
                        Text::from(Line(abstutil::prettyprint_usize(d.total_trips))),
                        Text::from(Line(d.years_of_service.to_string())),
                    ],
                )
            })
            .collect::<Vec<_>>();
        col.push(txt_table(
            ctx,
            vec!["Driver", "Route", "Rating", "Trips", "Years"],
            rows,
            0.45,
        ));

        let mut filter = MapFilter::Nothing;
        if let Some(driver) = selected.and_then(|d| network.drivers.get(&d)) {
            filter = MapFilter::Route(driver.route);
            col.push(
                describe::driver(
                    driver,
                    network,
                    app.model.feedback.driver_average(driver.id),
                )
                .into_widget(ctx),
            );
            let feedback = app.model.feedback.for_driver(driver.id);
            if !feedback.is_empty() {
                col.push(Line("What commuters say").small_heading().into_widget(ctx));
                for entry in feedback.into_iter().take(3) {
                    col.push(describe::feedback(entry, network).into_widget(ctx));
                }
            }
            if app.state.role() == Some(Role::Commuter) {
                col.push(
                    ctx.style()
                        .btn_solid
                        .text("Rate this driver")
                        .build_def(ctx),
                );
            }
        }

        Box::new(Self {
            panel: nav_bar::panel(ctx, app, Widget::col(col)),
            map: MapPanel::new(
                ctx,
                app,
                app.model.route_descriptors(filter),
                app.model.stop_markers(filter),
            ),
            selected,
        })
    }
}

impl State<App> for DriversPage {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        if let Some(label) = self.map.event(ctx) {
            return super::open_map_label(ctx, app, &label);
        }

        if let Outcome::Clicked(x) = self.panel.event(ctx) {
            if let Some(t) = nav_bar::on_click(ctx, app, &x) {
                return t;
            }
            if x == "Rate this driver" {
                if let Some(d) = self.selected {
                    app.state.navigate(Page::Feedback);
                    return Transition::Replace(FeedbackPage::new_state(
                        ctx,
                        app,
                        Some(FeedbackTarget::Driver(d)),
                    ));
                }
                return Transition::Keep;
            }
            if let Some(id) = x.strip_prefix("driver ").and_then(|x| x.parse::<usize>().ok()) {
                return Transition::Replace(Self::new_state(ctx, app, Some(DriverID(id))));
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
        Self::new_state(ctx, app, self.selected)
    }
}
