use widgetry::{EventCtx, GfxCtx, Line, Outcome, Panel, State, Text, TextBox, TextExt, Widget};

use crate::components::nav_bar;
use crate::{App, Transition};

pub struct Login {
    panel: Panel,
    registering: bool,
}

impl Login {
    pub fn new_state(ctx: &mut EventCtx, app: &App, registering: bool) -> Box<dyn State<App>> {
        let mut col = Vec::new();
        if registering {
            col.push(Widget::row(vec![
                "Name".text_widget(ctx).centered_vert(),
                TextBox::widget(ctx, "name", String::new(), true, 30),
            ]));
        }
        col.push(Widget::row(vec![
            "Email".text_widget(ctx).centered_vert(),
            TextBox::widget(ctx, "email", String::new(), !registering, 30),
        ]));
        col.push(Widget::row(vec![
            "Password".text_widget(ctx).centered_vert(),
            TextBox::widget(ctx, "password", String::new(), false, 30),
        ]));
        if registering {
            col.push(ctx.style().btn_solid.text("Create account").build_def(ctx));
            col.push(
                ctx.style()
                    .btn_plain
                    .text("I already have an account")
                    .build_def(ctx),
            );
        } else {
            col.push(ctx.style().btn_solid.text("Log in").build_def(ctx));
            col.push(ctx.style().btn_plain.text("Sign up instead").build_def(ctx));
            col.push(
                Text::from_multiline(vec![
                    Line("Demo accounts").secondary(),
                    Line("user@lakbay.ph / user123").secondary(),
                    Line("driver@lakbay.ph / driver123").secondary(),
                    Line("admin@lakbay.ph / admin123").secondary(),
                ])
                .into_widget(ctx),
            );
        }

        Box::new(Self {
            panel: nav_bar::panel(ctx, app, Widget::col(col).section(ctx)),
            registering,
        })
    }
}

impl State<App> for Login {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        if let Outcome::Clicked(x) = self.panel.event(ctx) {
            if let Some(t) = nav_bar::on_click(ctx, app, &x) {
                return t;
            }
            let email = self.panel.text_box("email");
            let password = self.panel.text_box("password");
            let result = match x.as_ref() {
                "Log in" => app.model.accounts.authenticate(&email, &password),
                "Create account" => {
                    let name = self.panel.text_box("name");
                    app.model
                        .accounts
                        .register(&name, &email, &password, App::today())
                }
                "Sign up instead" => {
                    return Transition::Replace(Self::new_state(ctx, app, true));
                }
                "I already have an account" => {
                    return Transition::Replace(Self::new_state(ctx, app, false));
                }
                _ => unreachable!(),
            };
            return match result {
                Ok(session) => {
                    let page = app.state.login(session);
                    Transition::Replace(super::open(ctx, app, page))
                }
                Err(err) => {
                    warn!("Login failed for {email}: {err}");
                    super::error_popup(ctx, err)
                }
            };
        }

        Transition::Keep
    }

    fn draw(&self, g: &mut GfxCtx, _: &App) {
        self.panel.draw(g);
    }

    fn recreate(&mut self, ctx: &mut EventCtx, app: &mut App) -> Box<dyn State<App>> {
        Self::new_state(ctx, app, self.registering)
    }
}
