mod admin;
mod dashboards;
mod drivers;
mod fares;
mod feedback;
mod landing;
mod login;
mod routes;
mod scan;
mod search;
mod settings;
mod stops;

use widgetry::tools::PopupMsg;
use widgetry::{EventCtx, State};

use model::navigation::Page;

use crate::{App, Transition};

pub use self::feedback::FeedbackPage;
pub use self::routes::RoutesPage;
pub use self::stops::StopsPage;

/// Builds the page the app state actually lands on. Pages the current role can't see redirect to
/// the login page or the role's dashboard.
pub fn open(ctx: &mut EventCtx, app: &mut App, page: Page) -> Box<dyn State<App>> {
    let page = app.state.navigate(page);
    debug!("Showing {:?}", page);
    match page {
        Page::Landing => landing::Landing::new_state(ctx, app),
        Page::Login => login::Login::new_state(ctx, app, false),
        Page::CommuterDashboard => dashboards::CommuterDashboard::new_state(ctx, app),
        Page::DriverDashboard => dashboards::DriverDashboard::new_state(ctx, app),
        Page::AdminDashboard => admin::AdminDashboard::new_state(ctx, app),
        Page::Routes => RoutesPage::new_state(ctx, app, None),
        Page::Fares => fares::FaresPage::new_state(ctx, app),
        Page::Stops => StopsPage::new_state(ctx, app, None),
        Page::Drivers => drivers::DriversPage::new_state(ctx, app, None),
        Page::Feedback => FeedbackPage::new_state(ctx, app, None),
        Page::DriverFeedback => feedback::DriverFeedback::new_state(ctx, app),
        Page::ScanDriver => scan::ScanDriver::new_state(ctx, app, None),
        Page::Settings => settings::SettingsPage::new_state(ctx, app),
    }
}

fn error_popup(ctx: &mut EventCtx, err: anyhow::Error) -> Transition {
    Transition::Push(PopupMsg::new_state(ctx, "Error", vec![err.to_string()]))
}

fn info_popup(ctx: &mut EventCtx, title: &str, msg: String) -> Transition {
    Transition::Push(PopupMsg::new_state(ctx, title, vec![msg]))
}

/// Clicking a line or marker on a map opens that route or stop
fn open_map_label(ctx: &mut EventCtx, app: &mut App, label: &str) -> Transition {
    let network = &app.model.network;
    let role = app.state.role();
    if let Some(route) = network.routes.values().find(|r| r.name == label) {
        let id = route.id;
        if !Page::Routes.allowed(role) {
            return Transition::Keep;
        }
        app.state.navigate(Page::Routes);
        return Transition::Replace(RoutesPage::new_state(ctx, app, Some(id)));
    }
    if let Some(stop) = network.stops.values().find(|s| s.name == label) {
        let id = stop.id;
        if !Page::Stops.allowed(role) {
            return Transition::Keep;
        }
        app.state.navigate(Page::Stops);
        return Transition::Replace(StopsPage::new_state(ctx, app, Some(id)));
    }
    warn!("Nothing on the map is called {label}");
    Transition::Keep
}
