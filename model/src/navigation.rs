use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use network::Role;

use crate::auth::Session;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Page {
    Landing,
    Login,
    CommuterDashboard,
    DriverDashboard,
    AdminDashboard,
    Routes,
    Fares,
    Stops,
    Drivers,
    Feedback,
    DriverFeedback,
    ScanDriver,
    Settings,
}

impl Page {
    pub fn all() -> Vec<Page> {
        use Page::*;
        vec![
            Landing,
            Login,
            CommuterDashboard,
            DriverDashboard,
            AdminDashboard,
            Routes,
            Fares,
            Stops,
            Drivers,
            Feedback,
            DriverFeedback,
            ScanDriver,
            Settings,
        ]
    }

    pub fn dashboard(role: Role) -> Page {
        match role {
            Role::Commuter => Page::CommuterDashboard,
            Role::Driver => Page::DriverDashboard,
            Role::Admin => Page::AdminDashboard,
        }
    }

    pub fn requires_login(self) -> bool {
        !matches!(
            self,
            Page::Landing
                | Page::Login
                | Page::Routes
                | Page::Fares
                | Page::Stops
                | Page::Drivers
                | Page::Feedback
        )
    }

    /// Can someone with this role (or nobody logged in) see the page?
    pub fn allowed(self, role: Option<Role>) -> bool {
        match self {
            Page::Login => role.is_none(),
            Page::CommuterDashboard | Page::ScanDriver => role == Some(Role::Commuter),
            Page::DriverDashboard | Page::DriverFeedback => role == Some(Role::Driver),
            Page::AdminDashboard => role == Some(Role::Admin),
            Page::Settings => role.is_some(),
            Page::Landing
            | Page::Routes
            | Page::Fares
            | Page::Stops
            | Page::Drivers
            | Page::Feedback => true,
        }
    }

    /// The links in the navigation bar
    pub fn nav_links(role: Option<Role>) -> Vec<Page> {
        match role {
            None => vec![
                Page::Landing,
                Page::Routes,
                Page::Fares,
                Page::Stops,
                Page::Drivers,
                Page::Feedback,
                Page::Login,
            ],
            Some(Role::Commuter) => vec![
                Page::CommuterDashboard,
                Page::Routes,
                Page::Fares,
                Page::Stops,
                Page::Drivers,
                Page::ScanDriver,
                Page::Feedback,
                Page::Settings,
            ],
            Some(Role::Driver) => vec![
                Page::DriverDashboard,
                Page::Routes,
                Page::DriverFeedback,
                Page::Settings,
            ],
            Some(Role::Admin) => vec![
                Page::AdminDashboard,
                Page::Routes,
                Page::Stops,
                Page::Fares,
                Page::Drivers,
                Page::Feedback,
                Page::Settings,
            ],
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Page::Landing => "Home",
            Page::Login => "Log in",
            Page::CommuterDashboard | Page::DriverDashboard | Page::AdminDashboard => "Dashboard",
            Page::Routes => "Routes",
            Page::Fares => "Fares",
            Page::Stops => "Stops",
            Page::Drivers => "Drivers",
            Page::Feedback => "Feedback",
            Page::DriverFeedback => "My Feedback",
            Page::ScanDriver => "Scan Driver",
            Page::Settings => "Settings",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Page::Landing => "landing",
            Page::Login => "login",
            Page::CommuterDashboard => "commuter-dashboard",
            Page::DriverDashboard => "driver-dashboard",
            Page::AdminDashboard => "admin-dashboard",
            Page::Routes => "routes",
            Page::Fares => "fares",
            Page::Stops => "stops",
            Page::Drivers => "drivers",
            Page::Feedback => "feedback",
            Page::DriverFeedback => "driver-feedback",
            Page::ScanDriver => "scan-driver",
            Page::Settings => "settings",
        }
    }
}

impl FromStr for Page {
    type Err = anyhow::Error;

    fn from_str(x: &str) -> Result<Self> {
        let x = x.trim().to_ascii_lowercase();
        Page::all()
            .into_iter()
            .find(|p| p.slug() == x)
            .ok_or_else(|| anyhow!("Unknown page {x}"))
    }
}

/// Which page is showing and who's logged in
#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    page: Page,
    session: Option<Session>,
    /// Where to go after logging in, if someone tried to open a page that needs a session
    after_login: Option<Page>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            page: Page::Landing,
            session: None,
            after_login: None,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().map(|s| s.role)
    }

    /// Go to a page, or wherever makes sense instead. Returns the page actually shown.
    pub fn navigate(&mut self, page: Page) -> Page {
        let role = self.role();
        self.page = if page.allowed(role) {
            page
        } else if let Some(role) = role {
            debug!("{:?} can't see {:?}", role, page);
            Page::dashboard(role)
        } else if page.requires_login() {
            self.after_login = Some(page);
            Page::Login
        } else {
            Page::Landing
        };
        self.page
    }

    /// Returns the page shown after logging in
    pub fn login(&mut self, session: Session) -> Page {
        let role = session.role;
        self.session = Some(session);
        let target = match self.after_login.take() {
            Some(page) if page.allowed(Some(role)) => page,
            _ => Page::dashboard(role),
        };
        self.navigate(target)
    }

    /// Keeps the user logged in, with new profile details
    pub fn refresh_session(&mut self, session: Session) {
        if self.session.is_some() {
            self.session = Some(session);
        }
    }

    pub fn logout(&mut self) {
        self.session = None;
        self.after_login = None;
        self.page = Page::Landing;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session {
            email: "x@lakbay.ph".to_string(),
            name: "X".to_string(),
            role,
            driver: None,
        }
    }

    #[test]
    fn public_pages() {
        let mut state = AppState::new();
        assert_eq!(state.page(), Page::Landing);
        assert_eq!(state.navigate(Page::Routes), Page::Routes);
        assert_eq!(state.navigate(Page::Fares), Page::Fares);
    }

    #[test]
    fn login_required() {
        let mut state = AppState::new();
        assert_eq!(state.navigate(Page::ScanDriver), Page::Login);
        // Continues where they were headed
        assert_eq!(state.login(session(Role::Commuter)), Page::ScanDriver);
    }

    #[test]
    fn pending_page_the_role_cant_see() {
        let mut state = AppState::new();
        state.navigate(Page::AdminDashboard);
        assert_eq!(state.login(session(Role::Driver)), Page::DriverDashboard);
    }

    #[test]
    fn roles_stay_in_their_lane() {
        let mut state = AppState::new();
        assert_eq!(state.login(session(Role::Driver)), Page::DriverDashboard);
        assert_eq!(state.navigate(Page::AdminDashboard), Page::DriverDashboard);
        assert_eq!(state.navigate(Page::Login), Page::DriverDashboard);
        assert_eq!(state.navigate(Page::DriverFeedback), Page::DriverFeedback);
        state.logout();
        assert_eq!(state.page(), Page::Landing);
        assert!(state.session().is_none());
    }

    #[test]
    fn nav_links_are_allowed() {
        for role in [None, Some(Role::Commuter), Some(Role::Driver), Some(Role::Admin)] {
            for page in Page::nav_links(role) {
                assert!(page.allowed(role), "{:?} for {:?}", page, role);
            }
        }
    }

    #[test]
    fn parse() {
        for page in Page::all() {
            assert_eq!(page.slug().parse::<Page>().unwrap(), page);
        }
        assert_eq!("Routes".parse::<Page>().unwrap(), Page::Routes);
        assert!("nowhere".parse::<Page>().is_err());
    }
}
