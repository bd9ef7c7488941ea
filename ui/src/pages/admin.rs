use anyhow::Result;
use widgetry::{Choice, EventCtx, GfxCtx, Line, Outcome, Panel, State, Text, TextBox, TextExt, Widget};

use model::admin::{self, UserEdit};
use model::navigation::Page;
use model::MapFilter;
use network::{AccountStatus, LatLon, Role, Severity, StopKind};

use crate::components::{nav_bar, MapPanel};
use crate::{App, Transition};

pub struct AdminDashboard {
    panel: Panel,
    map: MapPanel,
}

impl AdminDashboard {
    pub fn new_state(ctx: &mut EventCtx, app: &App) -> Box<dyn State<App>> {
        let stats = admin::dashboard_stats(&app.model);
        let mut overview = Text::new();
        overview.add_line(Line(format!(
            "{} users ({} commuters), {} drivers",
            stats.users, stats.commuters, stats.drivers
        )));
        overview.add_line(Line(format!(
            "{} routes, {} stops",
            stats.routes, stats.stops
        )));
        overview.add_line(Line(format!(
            "{} feedback entries waiting for review{}",
            stats.pending_feedback,
            match stats.average_rating {
                Some(avg) => format!(", average rating {avg:.1}"),
                None => String::new(),
            }
        )));

        let col = vec![
            overview.into_widget(ctx),
            ctx.style()
                .btn_outline
                .text("Review feedback")
                .build_def(ctx),
            add_stop_form(ctx),
            add_route_form(ctx),
            notice_form(ctx),
            users_form(ctx, app),
        ];

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

    fn add_stop(&self, app: &mut App) -> Result<String> {
        let name = self.panel.text_box("stop name");
        let pos = LatLon::new(
            parse_number(&self.panel.text_box("lat"), "latitude")?,
            parse_number(&self.panel.text_box("lon"), "longitude")?,
        );
        let kind: StopKind = self.panel.dropdown_value("stop kind");
        admin::add_stop(&mut app.model, &name, kind, pos)?;
        Ok(format!("Added {} at {pos}", name.trim()))
    }

    fn add_route(&self, app: &mut App) -> Result<String> {
        let distance_km = parse_number(&self.panel.text_box("distance"), "distance")?;
        let id = admin::add_route(
            &mut app.model,
            &self.panel.text_box("origin"),
            &self.panel.text_box("destination"),
            self.panel.text_box("color").trim(),
            distance_km,
        )?;
        let route = &app.model.network.routes[&id];
        Ok(format!("Added {}, fare {}", route.name, route.fare_range()))
    }

    fn save_user(&self, app: &mut App) -> Result<String> {
        let email: String = self.panel.dropdown_value("user");
        let edit = UserEdit {
            name: None,
            role: Some(self.panel.dropdown_value("role")),
            status: Some(self.panel.dropdown_value("status")),
        };
        admin::edit_user(&mut app.model, &email, edit)?;
        Ok(format!("Saved {email}"))
    }
}

fn parse_number(x: &str, what: &str) -> Result<f64> {
    x.trim()
        .parse::<f64>()
        .map_err(|_| anyhow!("The {what} should be a number, not \"{x}\""))
}

fn add_stop_form(ctx: &mut EventCtx) -> Widget {
    Widget::col(vec![
        Line("Add a stop").small_heading().into_widget(ctx),
        Widget::row(vec![
            "Name".text_widget(ctx).centered_vert(),
            TextBox::widget(ctx, "stop name", String::new(), false, 20),
            Widget::dropdown(
                ctx,
                "stop kind",
                StopKind::Regular,
                [StopKind::Terminal, StopKind::Major, StopKind::Regular]
                    .into_iter()
                    .map(|k| Choice::new(k.describe(), k))
                    .collect(),
            ),
        ]),
        Widget::row(vec![
            "Latitude".text_widget(ctx).centered_vert(),
            TextBox::widget(ctx, "lat", String::new(), false, 10),
            "Longitude".text_widget(ctx).centered_vert(),
            TextBox::widget(ctx, "lon", String::new(), false, 10),
        ]),
        ctx.style().btn_solid.text("Add stop").build_def(ctx),
    ])
    .section(ctx)
}

fn add_route_form(ctx: &mut EventCtx) -> Widget {
    Widget::col(vec![
        Line("Add a route").small_heading().into_widget(ctx),
        Widget::row(vec![
            "From".text_widget(ctx).centered_vert(),
            TextBox::widget(ctx, "origin", String::new(), false, 15),
            "to".text_widget(ctx).centered_vert(),
            TextBox::widget(ctx, "destination", String::new(), false, 15),
        ]),
        Widget::row(vec![
            "Color".text_widget(ctx).centered_vert(),
            TextBox::widget(ctx, "color", "#455A64".to_string(), false, 8),
            "Distance (km)".text_widget(ctx).centered_vert(),
            TextBox::widget(ctx, "distance", String::new(), false, 6),
        ]),
        Line("The fare range comes from the current fare rules")
            .secondary()
            .into_widget(ctx),
        ctx.style().btn_solid.text("Add route").build_def(ctx),
    ])
    .section(ctx)
}

fn notice_form(ctx: &mut EventCtx) -> Widget {
    Widget::col(vec![
        Line("Announce to drivers").small_heading().into_widget(ctx),
        Widget::row(vec![
            Widget::dropdown(
                ctx,
                "severity",
                Severity::Info,
                vec![
                    Choice::new("Info", Severity::Info),
                    Choice::new("Warning", Severity::Warning),
                ],
            ),
            TextBox::widget(ctx, "notice", String::new(), false, 40),
        ]),
        ctx.style().btn_solid.text("Post notice").build_def(ctx),
    ])
    .section(ctx)
}

fn users_form(ctx: &mut EventCtx, app: &App) -> Widget {
    let accounts = app.model.accounts.all();
    let mut col = vec![Line("Users").small_heading().into_widget(ctx)];
    let mut txt = Text::new();
    for a in accounts {
        let line = Line(format!(
            "{} <{}>: {}, {:?}",
            a.name,
            a.email,
            a.role.describe(),
            a.status
        ));
        txt.add_line(if a.status == AccountStatus::Suspended {
            line.secondary()
        } else {
            line
        });
    }
    col.push(txt.into_widget(ctx));

    if let Some(first) = accounts.first() {
        col.push(Widget::row(vec![
            Widget::dropdown(
                ctx,
                "user",
                first.email.clone(),
                accounts
                    .iter()
                    .map(|a| Choice::new(a.email.clone(), a.email.clone()))
                    .collect(),
            ),
            Widget::dropdown(
                ctx,
                "role",
                first.role,
                Role::all()
                    .into_iter()
                    .map(|r| Choice::new(r.describe(), r))
                    .collect(),
            ),
            Widget::dropdown(
                ctx,
                "status",
                first.status,
                vec![
                    Choice::new("Active", AccountStatus::Active),
                    Choice::new("Suspended", AccountStatus::Suspended),
                ],
            ),
        ]));
        col.push(ctx.style().btn_solid.text("Save user").build_def(ctx));
    }
    Widget::col(col).section(ctx)
}

impl State<App> for AdminDashboard {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        if let Some(label) = self.map.event(ctx) {
            return super::open_map_label(ctx, app, &label);
        }

        if let Outcome::Clicked(x) = self.panel.event(ctx) {
            if let Some(t) = nav_bar::on_click(ctx, app, &x) {
                return t;
            }
            let result = match x.as_ref() {
                "Review feedback" => {
                    return Transition::Replace(super::open(ctx, app, Page::Feedback));
                }
                "Add stop" => self.add_stop(app),
                "Add route" => self.add_route(app),
                "Post notice" => {
                    let severity: Severity = self.panel.dropdown_value("severity");
                    let msg = self.panel.text_box("notice");
                    admin::post_notice(&mut app.model, severity, &msg, App::today())
                        .map(|_| "Drivers will see this on their dashboard".to_string())
                }
                "Save user" => self.save_user(app),
                _ => unreachable!(),
            };
            return match result {
                Ok(msg) => Transition::Multi(vec![
                    Transition::Replace(Self::new_state(ctx, app)),
                    super::info_popup(ctx, "Done", msg),
                ]),
                Err(err) => super::error_popup(ctx, err),
            };
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
