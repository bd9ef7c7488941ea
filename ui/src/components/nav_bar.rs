use widgetry::{EventCtx, HorizontalAlignment, Line, Panel, TextExt, VerticalAlignment, Widget};

use model::navigation::Page;

use crate::{pages, App, Transition};

/// The page title and the links for the current role across the top of every page, then whatever
/// the page shows. Pages replace the "contents" placeholder when they change.
pub fn panel(ctx: &mut EventCtx, app: &App, contents: Widget) -> Panel {
    Panel::new_builder(Widget::col(vec![
        header(ctx, app),
        contents.named("contents"),
    ]))
    .aligned(HorizontalAlignment::Left, VerticalAlignment::Top)
    .build(ctx)
}

fn header(ctx: &mut EventCtx, app: &App) -> Widget {
    let current = app.state.page();
    let mut row = vec![Line(format!("Lakbay: {}", current.describe()))
        .small_heading()
        .into_widget(ctx)];
    for page in Page::nav_links(app.state.role()) {
        let btn = if page == current {
            ctx.style().btn_solid.text(page.describe())
        } else {
            ctx.style().btn_outline.text(page.describe())
        };
        row.push(btn.build_widget(ctx, &action(page)));
    }
    if let Some(session) = app.state.session() {
        row.push(
            format!("{} ({})", session.name, session.role.describe())
                .text_widget(ctx)
                .centered_vert(),
        );
        row.push(ctx.style().btn_plain.text("Log out").build_def(ctx));
    }
    Widget::row(row)
}

fn action(page: Page) -> String {
    format!("go to {}", page.slug())
}

/// Handles the buttons from `panel`. Anything else is left to the page.
pub fn on_click(ctx: &mut EventCtx, app: &mut App, x: &str) -> Option<Transition> {
    if x == "Log out" {
        if let Some(session) = app.state.session() {
            info!("{} logged out", session.email);
        }
        app.state.logout();
        return Some(Transition::Replace(pages::open(ctx, app, Page::Landing)));
    }
    let slug = x.strip_prefix("go to ")?;
    let page = slug.parse::<Page>().ok()?;
    Some(Transition::Replace(pages::open(ctx, app, page)))
}
