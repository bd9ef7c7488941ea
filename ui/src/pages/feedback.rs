use widgetry::{
    Choice, Color, EventCtx, GfxCtx, Line, Outcome, Panel, Spinner, State, Text, TextBox, TextExt,
    Toggle, Widget,
};

use model::feedback::{FeedbackDraft, FeedbackTarget};
use network::{FeedbackCategory, FeedbackID, FeedbackStatus, Role, Severity};

use crate::components::{describe, nav_bar};
use crate::{App, Transition};

/// How many entries the feedback list shows
const RECENT: usize = 10;
const ANONYMOUS: &str = "Post anonymously";

pub struct FeedbackPage {
    panel: Panel,
}

impl FeedbackPage {
    /// `target` preselects what the feedback is about
    pub fn new_state(
        ctx: &mut EventCtx,
        app: &App,
        target: Option<FeedbackTarget>,
    ) -> Box<dyn State<App>> {
        let mut col = vec![Line("Share your experience").small_heading().into_widget(ctx)];
        col.push(form(ctx, app, target.unwrap_or(FeedbackTarget::General)));

        let stats = app.model.feedback.stats();
        let mut txt = Text::from(Line(format!(
            "{} reviews{}",
            stats.total,
            match stats.average_rating {
                Some(avg) => format!(", averaging {avg:.1} stars"),
                None => String::new(),
            }
        )));
        for category in FeedbackCategory::all() {
            let count = stats.per_category.get(category);
            if count > 0 {
                txt.add_line(Line(format!("{}: {count}", category.describe())).secondary());
            }
        }
        col.push(txt.into_widget(ctx));

        let admin = app.state.role() == Some(Role::Admin);
        if admin {
            col.push(format!("{} waiting for review", stats.pending).text_widget(ctx));
        }
        col.push(Line("Recent feedback").small_heading().into_widget(ctx));
        for entry in app.model.feedback.all().into_iter().take(RECENT) {
            let mut buttons = vec![ctx
                .style()
                .btn_plain
                .text(format!("Helpful ({})", entry.helpful))
                .build_widget(ctx, &format!("helpful {}", entry.id.0))];
            if admin && entry.status == FeedbackStatus::Pending {
                buttons.push(
                    ctx.style()
                        .btn_outline
                        .text("Mark reviewed")
                        .build_widget(ctx, &format!("reviewed {}", entry.id.0)),
                );
            }
            col.push(
                Widget::col(vec![
                    describe::feedback(entry, &app.model.network).into_widget(ctx),
                    Widget::row(buttons),
                ])
                .section(ctx),
            );
        }

        Box::new(Self {
            panel: nav_bar::panel(ctx, app, Widget::col(col)),
        })
    }

    fn submit(&self, app: &mut App) -> anyhow::Result<FeedbackID> {
        let anonymous = if self.panel.has_widget(ANONYMOUS) {
            self.panel.is_checked(ANONYMOUS)
        } else {
            true
        };
        let draft = FeedbackDraft {
            author: app.state.session().map(|s| s.name.clone()),
            anonymous,
            rating: self.panel.spinner::<usize>("rating") as u8,
            category: self.panel.dropdown_value("category"),
            target: self.panel.dropdown_value("target"),
            message: self.panel.text_box("message"),
        };
        app.model
            .feedback
            .submit(draft, &app.model.network, App::today())
    }
}

fn form(ctx: &mut EventCtx, app: &App, target: FeedbackTarget) -> Widget {
    let network = &app.model.network;
    let mut targets = vec![Choice::new("In general", FeedbackTarget::General)];
    for route in network.routes.values() {
        targets.push(Choice::new(
            format!("Route: {}", route.name),
            FeedbackTarget::Route(route.id),
        ));
    }
    for driver in network.drivers.values() {
        targets.push(Choice::new(
            format!("Driver: {}", driver.name),
            FeedbackTarget::Driver(driver.id),
        ));
    }

    let mut col = vec![
        Widget::row(vec![
            "About".text_widget(ctx).centered_vert(),
            Widget::dropdown(ctx, "target", target, targets),
        ]),
        Widget::row(vec![
            "Category".text_widget(ctx).centered_vert(),
            Widget::dropdown(
                ctx,
                "category",
                match target {
                    FeedbackTarget::Driver(_) => FeedbackCategory::DriverService,
                    FeedbackTarget::Route(_) => FeedbackCategory::RouteInformation,
                    FeedbackTarget::General => FeedbackCategory::Overall,
                },
                FeedbackCategory::all()
                    .into_iter()
                    .map(|c| Choice::new(c.describe(), c))
                    .collect(),
            ),
        ]),
        Widget::row(vec![
            "Stars".text_widget(ctx).centered_vert(),
            Spinner::widget(ctx, "rating", (1, 5), 5_usize, 1),
        ]),
        Widget::row(vec![
            "Message".text_widget(ctx).centered_vert(),
            TextBox::widget(ctx, "message", String::new(), false, 40),
        ]),
    ];
    if let Some(session) = app.state.session() {
        col.push(Toggle::checkbox(ctx, ANONYMOUS, None, false));
        col.push(
            Line(format!("Unless anonymous, this is posted as {}", session.name))
                .secondary()
                .into_widget(ctx),
        );
    } else {
        col.push(
            Line("Log in to post under your name. Until then, feedback is anonymous.")
                .secondary()
                .into_widget(ctx),
        );
    }
    col.push(ctx.style().btn_solid.text("Submit feedback").build_def(ctx));
    Widget::col(col).section(ctx)
}

impl State<App> for FeedbackPage {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        if let Outcome::Clicked(x) = self.panel.event(ctx) {
            if let Some(t) = nav_bar::on_click(ctx, app, &x) {
                return t;
            }
            if x == "Submit feedback" {
                return match self.submit(app) {
                    Ok(_) => Transition::Multi(vec![
                        Transition::Replace(Self::new_state(ctx, app, None)),
                        super::info_popup(
                            ctx,
                            "Thank you",
                            "Your feedback was submitted and will be reviewed".to_string(),
                        ),
                    ]),
                    Err(err) => super::error_popup(ctx, err),
                };
            }

            let result = if let Some(id) = parse_id(&x, "helpful ") {
                app.model.feedback.mark_helpful(id)
            } else if let Some(id) = parse_id(&x, "reviewed ") {
                app.model.feedback.mark_reviewed(id)
            } else {
                unreachable!()
            };
            return match result {
                Ok(()) => Transition::Replace(Self::new_state(ctx, app, None)),
                Err(err) => super::error_popup(ctx, err),
            };
        }

        Transition::Keep
    }

    fn draw(&self, g: &mut GfxCtx, _: &App) {
        self.panel.draw(g);
    }

    fn recreate(&mut self, ctx: &mut EventCtx, app: &mut App) -> Box<dyn State<App>> {
        let target = self.panel.dropdown_value("target");
        Self::new_state(ctx, app, Some(target))
    }
}

fn parse_id(action: &str, prefix: &str) -> Option<FeedbackID> {
    action
        .strip_prefix(prefix)
        .and_then(|x| x.parse::<usize>().ok())
        .map(FeedbackID)
}

/// What commuters said about the logged-in driver, and announcements for drivers
pub struct DriverFeedback {
    panel: Panel,
}

impl DriverFeedback {
    pub fn new_state(ctx: &mut EventCtx, app: &App) -> Box<dyn State<App>> {
        let network = &app.model.network;
        let mut col = Vec::new();

        match app
            .state
            .session()
            .and_then(|s| s.driver)
            .and_then(|d| network.drivers.get(&d))
        {
            Some(driver) => {
                let feedback = app.model.feedback.for_driver(driver.id);
                col.push(
                    match app.model.feedback.driver_average(driver.id) {
                        Some(avg) => format!(
                            "{} reviews from commuters, averaging {avg:.1} stars",
                            feedback.len()
                        ),
                        None => "Nobody has reviewed you yet".to_string(),
                    }
                    .text_widget(ctx),
                );
                for entry in feedback {
                    col.push(describe::feedback(entry, network).into_widget(ctx).section(ctx));
                }
            }
            None => {
                col.push("This account isn't linked to a driver".text_widget(ctx));
            }
        }

        col.push(Line("Announcements").small_heading().into_widget(ctx));
        col.push(notices(ctx, app));

        Box::new(Self {
            panel: nav_bar::panel(ctx, app, Widget::col(col)),
        })
    }
}

/// Newest first
pub fn notices(ctx: &mut EventCtx, app: &App) -> Widget {
    let mut txt = Text::new();
    for notice in &app.model.network.notices {
        let line = Line(format!("{}  {}", notice.posted, notice.message));
        txt.add_line(match notice.severity {
            Severity::Info => line,
            Severity::Warning => line.fg(Color::hex("#E65100")),
        });
    }
    if app.model.network.notices.is_empty() {
        txt.add_line(Line("No announcements").secondary());
    }
    txt.into_widget(ctx)
}

impl State<App> for DriverFeedback {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        if let Outcome::Clicked(x) = self.panel.event(ctx) {
            if let Some(t) = nav_bar::on_click(ctx, app, &x) {
                return t;
            }
            unreachable!()
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
