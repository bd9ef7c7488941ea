use widgetry::{
    Choice, EventCtx, GfxCtx, Line, Outcome, Panel, Spinner, State, Text, TextExt, Widget,
};

use model::admin;
use model::fares::{matrix, quote, Discount, DistanceCategory, FareSource};
use network::{Role, StopID};

use crate::components::{nav_bar, txt_table};
use crate::{App, Transition};

pub struct FaresPage {
    panel: Panel,
}

impl FaresPage {
    pub fn new_state(ctx: &mut EventCtx, app: &App) -> Box<dyn State<App>> {
        let stops: Vec<StopID> = app.model.network.stops.keys().cloned().collect();
        let mut col = Vec::new();

        col.push(Line("Fare calculator").small_heading().into_widget(ctx));
        if stops.len() < 2 {
            col.push("There aren't enough stops to calculate a fare".text_widget(ctx));
        } else {
            col.push(Widget::row(vec![
                "From".text_widget(ctx).centered_vert(),
                Widget::dropdown(ctx, "origin", stops[0], stop_choices(app)),
                "to".text_widget(ctx).centered_vert(),
                Widget::dropdown(ctx, "destination", stops[stops.len() - 1], stop_choices(app)),
            ]));
            col.push(Widget::row(vec![
                "Passenger".text_widget(ctx).centered_vert(),
                Widget::dropdown(
                    ctx,
                    "discount",
                    Discount::None,
                    Discount::all()
                        .into_iter()
                        .map(|d| Choice::new(d.describe(), d))
                        .collect(),
                ),
            ]));
            col.push(Widget::placeholder(ctx, "quote"));
        }

        col.push(Line("Fare rules").small_heading().into_widget(ctx));
        col.push(fare_rules(ctx, app));

        col.push(Line("Published fares").small_heading().into_widget(ctx));
        let mut categories = vec![Choice::new("all distances", None)];
        for c in DistanceCategory::all() {
            categories.push(Choice::new(c.describe(), Some(c)));
        }
        col.push(Widget::dropdown(ctx, "category", None, categories));
        col.push(Widget::placeholder(ctx, "matrix"));

        let mut state = Self {
            panel: nav_bar::panel(ctx, app, Widget::col(col)),
        };
        state.update(ctx, app);
        Box::new(state)
    }

    fn update(&mut self, ctx: &mut EventCtx, app: &App) {
        if self.panel.has_widget("quote") {
            let origin: StopID = self.panel.dropdown_value("origin");
            let destination: StopID = self.panel.dropdown_value("destination");
            let discount: Discount = self.panel.dropdown_value("discount");
            let txt = match quote(
                &app.model.network,
                &app.model.fare_table,
                origin,
                destination,
                discount,
            ) {
                Ok(q) => {
                    let mut txt = Text::from(Line(format!("₱{}", q.fare)).small_heading());
                    if q.savings() > 0 {
                        txt.add_line(Line(format!(
                            "Regular fare ₱{}, you save ₱{}",
                            q.regular_fare,
                            q.savings()
                        )));
                    }
                    txt.add_line(
                        Line(match q.source {
                            FareSource::Published => {
                                format!("Published fare for {:.1} km", q.distance_km)
                            }
                            FareSource::Estimated => format!(
                                "Estimated from a straight-line distance of {:.1} km",
                                q.distance_km
                            ),
                        })
                        .secondary(),
                    );
                    txt
                }
                Err(err) => Text::from(Line(err.to_string()).secondary()),
            };
            self.panel.replace(ctx, "quote", txt.into_widget(ctx));
        }

        let category: Option<DistanceCategory> = self.panel.dropdown_value("category");
        let network = &app.model.network;
        let rows = matrix(network, category)
            .into_iter()
            .map(|entry| {
                (
                    format!("fare {} {}", entry.origin.0, entry.destination.0),
                    vec![
                        Text::from(Line(&network.stops[&entry.origin].name)),
                        Text::from(Line(&network.stops[&entry.destination].name)),
                        Text::from(Line(format!("{:.1} km", entry.distance_km))),
                        Text::from(Line(format!("₱{}", entry.fare))),
                    ],
                )
            })
            .collect::<Vec<_>>();
        let table = if rows.is_empty() {
            "No published fares in this range".text_widget(ctx)
        } else {
            txt_table(ctx, vec!["From", "To", "Distance", "Fare"], rows, 0.4)
        };
        self.panel.replace(ctx, "matrix", table);
    }
}

fn fare_rules(ctx: &mut EventCtx, app: &App) -> Widget {
    let table = &app.model.fare_table;
    let admin = app.state.role() == Some(Role::Admin);
    let mut col = vec![format!(
        "₱{} covers the first {} km",
        table.base_fare, table.base_km
    )
    .text_widget(ctx)];
    for (idx, bracket) in table.brackets.iter().enumerate() {
        let range = match bracket.max_km {
            Some(max) => format!("{} to {} km", bracket.min_km, max),
            None => format!("{}+ km", bracket.min_km),
        };
        if admin {
            col.push(Widget::row(vec![
                format!("{} ({range}): ₱/km", bracket.name)
                    .text_widget(ctx)
                    .centered_vert(),
                Spinner::widget(ctx, &format!("per_km {idx}"), (0, 20), bracket.per_km, 1),
                "cap ₱".text_widget(ctx).centered_vert(),
                Spinner::widget(ctx, &format!("cap {idx}"), (0, 200), bracket.cap, 1),
            ]));
        } else if bracket.per_km == 0 {
            col.push(format!("{} ({range}): ₱{}", bracket.name, bracket.cap).text_widget(ctx));
        } else {
            col.push(
                format!(
                    "{} ({range}): +₱{} per km, at most ₱{}",
                    bracket.name, bracket.per_km, bracket.cap
                )
                .text_widget(ctx),
            );
        }
    }
    col.push(
        Line("Students, seniors and PWDs get 20% off. Children ride free.")
            .secondary()
            .into_widget(ctx),
    );
    if admin {
        col.push(ctx.style().btn_solid.text("Update fares").build_def(ctx));
    }
    Widget::col(col).section(ctx)
}

impl State<App> for FaresPage {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        match self.panel.event(ctx) {
            Outcome::Clicked(x) => {
                if let Some(t) = nav_bar::on_click(ctx, app, &x) {
                    return t;
                }
                if x == "Update fares" {
                    for idx in 0..app.model.fare_table.brackets.len() {
                        let per_km: usize = self.panel.spinner(&format!("per_km {idx}"));
                        let cap: usize = self.panel.spinner(&format!("cap {idx}"));
                        if let Err(err) = admin::update_fare_bracket(&mut app.model, idx, per_km, cap)
                        {
                            return super::error_popup(ctx, err);
                        }
                    }
                    return Transition::Multi(vec![
                        Transition::Replace(Self::new_state(ctx, app)),
                        super::info_popup(ctx, "Fares updated", "New trips use the new fares".to_string()),
                    ]);
                }
                // A row of the published fares picks that trip in the calculator
                if let Some(pair) = x.strip_prefix("fare ") {
                    let ids: Vec<usize> = pair.split(' ').filter_map(|x| x.parse().ok()).collect();
                    if ids.len() == 2 && self.panel.has_widget("quote") {
                        let origin = StopID(ids[0]);
                        let destination = StopID(ids[1]);
                        self.panel.replace(
                            ctx,
                            "origin",
                            Widget::dropdown(ctx, "origin", origin, stop_choices(app)),
                        );
                        self.panel.replace(
                            ctx,
                            "destination",
                            Widget::dropdown(ctx, "destination", destination, stop_choices(app)),
                        );
                        self.update(ctx, app);
                    }
                    return Transition::Keep;
                }
                unreachable!()
            }
            Outcome::Changed(_) => {
                self.update(ctx, app);
            }
            _ => {}
        }

        Transition::Keep
    }

    fn draw(&self, g: &mut GfxCtx, _: &App) {
        self.panel.draw(g);
    }

    fn recreate(&mut self, ctx: &mut EventCtx, app: &mut App) -> Box<dyn State<App>> {
        Self::new_state(ctx, app)
    }
}

fn stop_choices(app: &App) -> Vec<Choice<StopID>> {
    app.model
        .network
        .stops
        .values()
        .map(|s| Choice::new(s.name.clone(), s.id))
        .collect()
}
