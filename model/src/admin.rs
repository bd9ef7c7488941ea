//! What the admin dashboard can change. Edits only live as long as the app does.

use anyhow::Result;
use chrono::NaiveDate;

use network::{
    orig, AccountStatus, LatLon, NewRoute, Notice, Role, RouteID, Severity, StopID, StopKind,
};

use crate::Model;

pub struct DashboardStats {
    pub users: usize,
    pub commuters: usize,
    pub drivers: usize,
    pub routes: usize,
    pub stops: usize,
    pub pending_feedback: usize,
    pub average_rating: Option<f64>,
}

pub fn dashboard_stats(model: &Model) -> DashboardStats {
    let feedback = model.feedback.stats();
    DashboardStats {
        users: model.accounts.all().len(),
        commuters: model.accounts.count(Role::Commuter),
        drivers: model.network.drivers.len(),
        routes: model.network.routes.len(),
        stops: model.network.stops.len(),
        pending_feedback: feedback.pending,
        average_rating: feedback.average_rating,
    }
}

/// "Villa Verde Junction" becomes "villa_verde_junction"
pub fn slugify(name: &str) -> String {
    let mut slug = String::new();
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_end_matches('_').to_string()
}

pub fn add_stop(model: &mut Model, name: &str, kind: StopKind, pos: LatLon) -> Result<StopID> {
    let slug = slugify(name);
    if slug.is_empty() {
        bail!("A stop needs a name");
    }
    let id = model
        .network
        .add_stop(orig::StopID(slug), name.trim().to_string(), kind, pos)?;
    info!("Added stop {} at {}", name.trim(), pos);
    refresh_bounds(model);
    Ok(id)
}

/// The route has no shape or stops yet, so it won't show up on maps.
pub fn add_route(
    model: &mut Model,
    origin: &str,
    destination: &str,
    color: &str,
    distance_km: f64,
) -> Result<RouteID> {
    let origin = origin.trim();
    let destination = destination.trim();
    if origin.is_empty() || destination.is_empty() {
        bail!("A route needs an origin and a destination");
    }
    check_color(color)?;
    let fare = model.fare_table.estimate(distance_km)?;
    let id = model.network.add_route(NewRoute {
        orig_id: orig::RouteID(slugify(&format!("{origin} to {destination}"))),
        name: format!("{origin} to {destination}"),
        origin: origin.to_string(),
        destination: destination.to_string(),
        color: color.to_uppercase(),
        distance_km,
        fare_min: model.fare_table.base_fare,
        fare_max: fare,
    })?;
    info!("Added route {origin} to {destination}");
    Ok(id)
}

pub fn update_fare_bracket(model: &mut Model, idx: usize, per_km: usize, cap: usize) -> Result<()> {
    model.fare_table.update_bracket(idx, per_km, cap)
}

pub fn post_notice(
    model: &mut Model,
    severity: Severity,
    message: &str,
    today: NaiveDate,
) -> Result<()> {
    let message = message.trim();
    if message.is_empty() {
        bail!("The notice is empty");
    }
    model.network.notices.insert(
        0,
        Notice {
            posted: today,
            severity,
            message: message.to_string(),
        },
    );
    Ok(())
}

/// Changes to one account. Fields left as None stay as they are.
#[derive(Clone, Debug, Default)]
pub struct UserEdit {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
}

pub fn edit_user(model: &mut Model, email: &str, edit: UserEdit) -> Result<()> {
    let account = match model.accounts.get(email) {
        Some(a) => a.clone(),
        None => bail!("No account for {email}"),
    };
    if let Some(name) = edit.name {
        model
            .accounts
            .update_profile(&account.email, &name, &account.email)?;
    }
    if let Some(role) = edit.role {
        model.accounts.set_role(&account.email, role)?;
    }
    if let Some(status) = edit.status {
        model.accounts.set_status(&account.email, status)?;
    }
    info!("Edited account {}", account.email);
    Ok(())
}

fn check_color(color: &str) -> Result<()> {
    let hex = match color.strip_prefix('#') {
        Some(x) => x,
        None => bail!("Colors look like #2E7D32"),
    };
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("Colors look like #2E7D32");
    }
    Ok(())
}

fn refresh_bounds(model: &mut Model) {
    model.gps_bounds = model.network.gps_bounds();
    model.bounds = model.gps_bounds.to_bounds();
}

#[cfg(test)]
mod tests {
    use super::*;
    use network::Source;

    fn model() -> Model {
        Model::load(&Source::Embedded).unwrap()
    }

    #[test]
    fn stats() {
        let model = model();
        let stats = dashboard_stats(&model);
        assert_eq!(stats.routes, 7);
        assert_eq!(stats.stops, 12);
        assert_eq!(stats.drivers, 6);
        assert_eq!(stats.users, 5);
        assert_eq!(stats.commuters, 3);
        assert_eq!(stats.pending_feedback, 3);
        assert!(stats.average_rating.is_some());
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("Villa Verde Junction"), "villa_verde_junction");
        assert_eq!(slugify("  Pala-o (Market)  "), "pala_o_market");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn new_stop() {
        let mut model = model();
        let id = add_stop(
            &mut model,
            "Tambo Junction",
            StopKind::Major,
            LatLon::new(8.21, 124.23),
        )
        .unwrap();
        assert_eq!(model.network.stops[&id].orig_id.0, "tambo_junction");
        assert!(add_stop(&mut model, "Tambo Junction", StopKind::Major, LatLon::new(8.2, 124.2)).is_err());
        assert!(add_stop(&mut model, "  ", StopKind::Major, LatLon::new(8.2, 124.2)).is_err());
    }

    #[test]
    fn new_route() {
        let mut model = model();
        let id = add_route(&mut model, "Suarez", "Tubod", "#455a64", 6.0).unwrap();
        let route = &model.network.routes[&id];
        assert_eq!(route.name, "Suarez to Tubod");
        assert_eq!(route.color, "#455A64");
        assert_eq!(route.fare_max, 12);
        assert!(add_route(&mut model, "Suarez", "Tubod", "#455a64", 6.0).is_err());
        assert!(add_route(&mut model, "Suarez", "Dalipuga", "blue", 6.0).is_err());
        assert!(add_route(&mut model, "Suarez", "", "#455A64", 6.0).is_err());
    }

    #[test]
    fn notices() {
        let mut model = model();
        let today = NaiveDate::from_ymd_opt(2025, 11, 6).unwrap();
        post_notice(&mut model, Severity::Warning, "Road closed at Palao", today).unwrap();
        assert_eq!(model.network.notices[0].message, "Road closed at Palao");
        assert!(post_notice(&mut model, Severity::Info, " ", today).is_err());
    }

    #[test]
    fn users() {
        let mut model = model();
        edit_user(
            &mut model,
            "maria@example.com",
            UserEdit {
                name: Some("Maria S.".to_string()),
                status: Some(AccountStatus::Suspended),
                ..Default::default()
            },
        )
        .unwrap();
        let account = model.accounts.get("maria@example.com").unwrap();
        assert_eq!(account.name, "Maria S.");
        assert_eq!(account.status, AccountStatus::Suspended);
        assert!(edit_user(&mut model, "ghost@example.com", UserEdit::default()).is_err());
    }
}
