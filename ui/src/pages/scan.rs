use widgetry::{EventCtx, GfxCtx, Line, Outcome, Panel, State, TextBox, TextExt, Widget};

use model::feedback::FeedbackTarget;
use model::navigation::Page;
use model::scan::lookup_driver;
use network::DriverID;

use super::FeedbackPage;
use crate::components::{describe, nav_bar};
use crate::{App, Transition};

/// Type in the code printed under a jeepney's QR sticker to see who's driving
pub struct ScanDriver {
    panel: Panel,
    found: Option<DriverID>,
}

impl ScanDriver {
    pub fn new_state(
        ctx: &mut EventCtx,
        app: &App,
        found: Option<DriverID>,
    ) -> Box<dyn State<App>> {
        let mut col = vec![
            Line("Every jeepney shows its driver's code, like DRIVER-1")
                .secondary()
                .into_widget(ctx),
            Widget::row(vec![
                "Driver code".text_widget(ctx).centered_vert(),
                TextBox::widget(ctx, "code", String::new(), true, 20),
                ctx.style().btn_solid.text("Look up").build_def(ctx),
            ]),
        ];
        if let Some(driver) = found.and_then(|d| app.model.network.drivers.get(&d)) {
            col.push(
                describe::driver(
                    driver,
                    &app.model.network,
                    app.model.feedback.driver_average(driver.id),
                )
                .into_widget(ctx),
            );
            col.push(ctx.style().btn_outline.text("Rate this driver").build_def(ctx));
        }

        Box::new(Self {
            panel: nav_bar::panel(ctx, app, Widget::col(col).section(ctx)),
            found,
        })
    }
}

impl State<App> for ScanDriver {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        if let Outcome::Clicked(x) = self.panel.event(ctx) {
            if let Some(t) = nav_bar::on_click(ctx, app, &x) {
                return t;
            }
            match x.as_ref() {
                "Look up" => {
                    let code = self.panel.text_box("code");
                    return match lookup_driver(&app.model.network, &code) {
                        Ok(driver) => {
                            info!("Scanned {}", driver.qr_code());
                            let id = driver.id;
                            Transition::Replace(Self::new_state(ctx, app, Some(id)))
                        }
                        Err(err) => super::error_popup(ctx, err),
                    };
                }
                "Rate this driver" => {
                    if let Some(d) = self.found {
                        app.state.navigate(Page::Feedback);
                        return Transition::Replace(FeedbackPage::new_state(
                            ctx,
                            app,
                            Some(FeedbackTarget::Driver(d)),
                        ));
                    }
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
        Self::new_state(ctx, app, self.found)
    }
}
