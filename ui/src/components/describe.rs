use chrono::NaiveTime;
use widgetry::{Line, Text};

use network::{Driver, Feedback, FeedbackStatus, Network, Route, Stop};

pub fn route(route: &Route, network: &Network, now: NaiveTime) -> Text {
    let mut txt = Text::from(Line(&route.name).small_heading());
    txt.add_line(Line(format!(
        "{} to {}",
        route.origin, route.destination
    )));
    txt.add_line(Line(format!(
        "Fare {}, {} km, about {}",
        route.fare_range(),
        route.distance_km,
        route.duration
    )));
    txt.add_line(Line(format!(
        "Every {} minutes from {} to {}",
        route.headway_minutes,
        route.first_trip.format("%H:%M"),
        route.last_trip.format("%H:%M")
    )));
    match route.next_departure(now) {
        Some(t) => txt.add_line(Line(format!("Next jeepney at {}", t.format("%H:%M")))),
        None => txt.add_line(Line("No more trips today").secondary()),
    }
    txt.add_line(Line(format!("Popularity: {:?}", route.popularity)).secondary());
    if !route.landmarks.is_empty() {
        txt.add_line(Line(format!("Passes {}", route.landmarks.join(", "))).secondary());
    }

    if !route.stops.is_empty() {
        txt.add_line(Line(""));
        txt.add_line(Line("Stops"));
        for rs in &route.stops {
            if let Some(stop) = network.stops.get(&rs.stop) {
                txt.add_line(Line(format!("  +{} min  {}", rs.minutes_from_start, stop.name)));
            }
        }
    }
    txt
}

pub fn stop(stop: &Stop, network: &Network) -> Text {
    let mut txt = Text::from(Line(&stop.name).small_heading());
    txt.add_line(Line(format!("{} at {}", stop.kind.describe(), stop.pos)).secondary());
    if !stop.landmarks.is_empty() {
        txt.add_line(Line(format!("Near {}", stop.landmarks.join(", "))));
    }
    if !stop.facilities.is_empty() {
        txt.add_line(Line(format!("Facilities: {}", stop.facilities.join(", "))));
    }
    if !stop.tips.is_empty() {
        txt.add_line(Line(format!("Tip: {}", stop.tips)));
    }
    let routes: Vec<&str> = stop
        .routes
        .iter()
        .filter_map(|r| network.routes.get(r))
        .map(|r| r.name.as_str())
        .collect();
    if routes.is_empty() {
        txt.add_line(Line("No routes stop here").secondary());
    } else {
        txt.add_line(Line(format!("Served by {}", routes.join(", "))));
    }
    txt
}

/// `community` is the average rating from feedback, if anyone rated them
pub fn driver(driver: &Driver, network: &Network, community: Option<f64>) -> Text {
    let mut txt = Text::from(Line(&driver.name).small_heading());
    if let Some(route) = network.routes.get(&driver.route) {
        txt.add_line(Line(format!("Drives {}", route.name)));
    }
    txt.add_line(Line(format!(
        "Rated {:.1} / 5 over {} trips",
        driver.rating, driver.total_trips
    )));
    if let Some(avg) = community {
        txt.add_line(Line(format!("Commuters rate them {avg:.1} / 5")).secondary());
    }
    txt.add_line(Line(format!(
        "{} years of service, plate {}",
        driver.years_of_service, driver.plate
    )));
    txt.add_line(Line(format!("License {}", driver.license)).secondary());
    txt.add_line(Line(format!("Code {}", driver.qr_code())).secondary());
    txt
}

pub fn feedback(entry: &Feedback, network: &Network) -> Text {
    let mut txt = Text::from(Line(format!(
        "{} {}",
        stars(entry.rating),
        entry.category.describe()
    )));
    let mut about = Vec::new();
    if let Some(route) = entry.route.and_then(|r| network.routes.get(&r)) {
        about.push(route.name.clone());
    }
    if let Some(driver) = entry.driver.and_then(|d| network.drivers.get(&d)) {
        about.push(driver.name.clone());
    }
    if !about.is_empty() {
        txt.add_line(Line(about.join(", ")).secondary());
    }
    txt.add_line(Line(&entry.message));
    txt.add_line(
        Line(format!(
            "{} on {}, {} found this helpful{}",
            entry.author.as_deref().unwrap_or("Anonymous"),
            entry.date,
            entry.helpful,
            if entry.status == FeedbackStatus::Pending {
                ", pending review"
            } else {
                ""
            }
        ))
        .secondary(),
    );
    txt
}

pub fn stars(rating: u8) -> String {
    let rating = rating.min(5) as usize;
    format!("{}{}", "★".repeat(rating), "☆".repeat(5 - rating))
}
