use widgetry::{EventCtx, GfxCtx, Line, Outcome, Panel, State, Text, Widget};

use model::navigation::Page;
use model::MapFilter;

use crate::components::{nav_bar, MapPanel};
use crate::{App, Transition};

pub struct Landing {
    panel: Panel,
    map: MapPanel,
}

impl Landing {
    pub fn new_state(ctx: &mut EventCtx, app: &App) -> Box<dyn State<App>> {
        let network = &app.model.network;
        let mut buttons = vec![
            ctx.style().btn_solid.text("Explore routes").build_def(ctx),
            ctx.style().btn_outline.text("Check fares").build_def(ctx),
        ];
        if app.state.session().is_none() {
            buttons.push(ctx.style().btn_outline.text("Log in or sign up").build_def(ctx));
        }

        let contents = Widget::col(vec![
            Text::from_multiline(vec![
                Line("Jeepney routes, fares and stops around Barangay Suarez, Iligan City"),
                Line(format!(
                    "{} routes, {} stops and {} registered drivers",
                    network.routes.len(),
                    network.stops.len(),
                    network.drivers.len()
                ))
                .secondary(),
            ])
            .into_widget(ctx),
            Widget::row(buttons),
            Text::from_multiline(vec![
                Line("Find the jeepney that goes where you need, see what it costs before you"),
                Line("ride, and rate your driver by scanning the code on the windshield."),
            ])
            .into_widget(ctx),
        ]);

        Box::new(Self {
            panel: nav_bar::panel(ctx, app, contents),
            map: MapPanel::new(
                ctx,
                app,
                app.model.route_descriptors(MapFilter::Everything),
                app.model.stop_markers(MapFilter::Everything),
            ),
        })
    }
}

impl State<App> for Landing {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        if let Some(label) = self.map.event(ctx) {
            return super::open_map_label(ctx, app, &label);
        }

        if let Outcome::Clicked(x) = self.panel.event(ctx) {
            if let Some(t) = nav_bar::on_click(ctx, app, &x) {
                return t;
            }
            let page = match x.as_ref() {
                "Explore routes" => Page::Routes,
                "Check fares" => Page::Fares,
                "Log in or sign up" => Page::Login,
                _ => unreachable!(),
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
