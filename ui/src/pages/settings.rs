use widgetry::{EventCtx, GfxCtx, Line, Outcome, Panel, State, TextBox, TextExt, Widget};

use crate::components::nav_bar;
use crate::{App, Transition};

pub struct SettingsPage {
    panel: Panel,
}

impl SettingsPage {
    pub fn new_state(ctx: &mut EventCtx, app: &App) -> Box<dyn State<App>> {
        let mut col = Vec::new();
        if let Some(session) = app.state.session() {
            let joined = app
                .model
                .accounts
                .get(&session.email)
                .map(|a| format!(", member since {}", a.joined))
                .unwrap_or_default();
            col.push(
                Line(format!("{}{joined}", session.role.describe()))
                    .secondary()
                    .into_widget(ctx),
            );
            col.push(
                Widget::col(vec![
                    Line("Profile").small_heading().into_widget(ctx),
                    Widget::row(vec![
                        "Name".text_widget(ctx).centered_vert(),
                        TextBox::widget(ctx, "name", session.name.clone(), false, 30),
                    ]),
                    Widget::row(vec![
                        "Email".text_widget(ctx).centered_vert(),
                        TextBox::widget(ctx, "email", session.email.clone(), false, 30),
                    ]),
                    ctx.style().btn_solid.text("Save profile").build_def(ctx),
                ])
                .section(ctx),
            );
            col.push(
                Widget::col(vec![
                    Line("Password").small_heading().into_widget(ctx),
                    Widget::row(vec![
                        "Current".text_widget(ctx).centered_vert(),
                        TextBox::widget(ctx, "current password", String::new(), false, 20),
                    ]),
                    Widget::row(vec![
                        "New".text_widget(ctx).centered_vert(),
                        TextBox::widget(ctx, "new password", String::new(), false, 20),
                    ]),
                    ctx.style().btn_solid.text("Change password").build_def(ctx),
                ])
                .section(ctx),
            );
        } else {
            col.push("Log in to change your settings".text_widget(ctx));
        }

        Box::new(Self {
            panel: nav_bar::panel(ctx, app, Widget::col(col)),
        })
    }
}

impl State<App> for SettingsPage {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        if let Outcome::Clicked(x) = self.panel.event(ctx) {
            if let Some(t) = nav_bar::on_click(ctx, app, &x) {
                return t;
            }
            let email = match app.state.session() {
                Some(s) => s.email.clone(),
                None => return Transition::Keep,
            };
            match x.as_ref() {
                "Save profile" => {
                    let name = self.panel.text_box("name");
                    let new_email = self.panel.text_box("email");
                    return match app.model.accounts.update_profile(&email, &name, &new_email) {
                        Ok(session) => {
                            app.state.refresh_session(session);
                            Transition::Multi(vec![
                                Transition::Replace(Self::new_state(ctx, app)),
                                super::info_popup(ctx, "Saved", "Your profile was updated".to_string()),
                            ])
                        }
                        Err(err) => super::error_popup(ctx, err),
                    };
                }
                "Change password" => {
                    let current = self.panel.text_box("current password");
                    let new = self.panel.text_box("new password");
                    return match app.model.accounts.change_password(&email, &current, &new) {
                        Ok(()) => Transition::Multi(vec![
                            Transition::Replace(Self::new_state(ctx, app)),
                            super::info_popup(ctx, "Saved", "Your password was changed".to_string()),
                        ]),
                        Err(err) => super::error_popup(ctx, err),
                    };
                }
                _ => unreachable!(),
            }
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
