use anyhow::Result;
use serde::{Deserialize, Serialize};

use network::{FareEntry, Network, StopID};

use crate::map::distance_meters;

/// How fares grow with distance. The base fare covers the first `base_km`; past that, every
/// started kilometre costs the rate of the bracket the trip ends in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FareTable {
    pub base_fare: usize,
    pub base_km: f64,
    /// Sorted by `min_km`. The last bracket has no upper limit.
    pub brackets: Vec<FareBracket>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FareBracket {
    pub name: String,
    pub min_km: f64,
    pub max_km: Option<f64>,
    pub per_km: usize,
    /// Nobody pays more than this for a trip ending in this bracket
    pub cap: usize,
}

impl Default for FareTable {
    fn default() -> Self {
        Self {
            base_fare: 10,
            base_km: 5.0,
            brackets: vec![
                FareBracket {
                    name: "Short trip".to_string(),
                    min_km: 0.0,
                    max_km: Some(5.0),
                    per_km: 0,
                    cap: 10,
                },
                FareBracket {
                    name: "Medium trip".to_string(),
                    min_km: 5.0,
                    max_km: Some(10.0),
                    per_km: 2,
                    cap: 25,
                },
                FareBracket {
                    name: "Long trip".to_string(),
                    min_km: 10.0,
                    max_km: None,
                    per_km: 3,
                    cap: 40,
                },
            ],
        }
    }
}

impl FareTable {
    pub fn bracket(&self, distance_km: f64) -> Option<&FareBracket> {
        self.brackets
            .iter()
            .find(|b| distance_km >= b.min_km && b.max_km.map(|max| distance_km < max).unwrap_or(true))
    }

    /// The regular fare in pesos
    pub fn estimate(&self, distance_km: f64) -> Result<usize> {
        if !distance_km.is_finite() || distance_km < 0.0 {
            bail!("Can't price a trip of {distance_km} km");
        }
        if distance_km <= self.base_km {
            return Ok(self.base_fare);
        }
        let bracket = match self.bracket(distance_km) {
            Some(b) => b,
            None => bail!("No fare bracket covers {distance_km} km"),
        };
        let extra_km = (distance_km - self.base_km).ceil() as usize;
        // Huge distances saturate to the cap instead of overflowing
        Ok(extra_km
            .saturating_mul(bracket.per_km)
            .saturating_add(self.base_fare)
            .min(bracket.cap)
            .max(self.base_fare))
    }

    pub fn update_bracket(&mut self, idx: usize, per_km: usize, cap: usize) -> Result<()> {
        if cap < self.base_fare {
            bail!(
                "The cap ₱{cap} can't be below the base fare ₱{}",
                self.base_fare
            );
        }
        let bracket = match self.brackets.get_mut(idx) {
            Some(b) => b,
            None => bail!("No fare bracket #{idx}"),
        };
        bracket.per_km = per_km;
        bracket.cap = cap;
        info!("{} now costs ₱{per_km}/km, capped at ₱{cap}", bracket.name);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Discount {
    None,
    Student,
    Senior,
    Pwd,
    Child,
}

impl Discount {
    pub fn all() -> Vec<Self> {
        vec![
            Discount::None,
            Discount::Student,
            Discount::Senior,
            Discount::Pwd,
            Discount::Child,
        ]
    }

    pub fn describe(self) -> &'static str {
        match self {
            Discount::None => "Regular",
            Discount::Student => "Student (20% off)",
            Discount::Senior => "Senior citizen (20% off)",
            Discount::Pwd => "PWD (20% off)",
            Discount::Child => "Child (free)",
        }
    }

    /// Whole pesos, rounding half up
    pub fn apply(self, fare: usize) -> usize {
        match self {
            Discount::None => fare,
            Discount::Student | Discount::Senior | Discount::Pwd => (fare * 80 + 50) / 100,
            Discount::Child => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FareSource {
    /// From the published fare matrix
    Published,
    /// From the fare table, using the straight-line distance
    Estimated,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Quote {
    pub origin: StopID,
    pub destination: StopID,
    pub distance_km: f64,
    pub regular_fare: usize,
    pub discount: Discount,
    pub fare: usize,
    pub source: FareSource,
}

impl Quote {
    pub fn savings(&self) -> usize {
        self.regular_fare - self.fare
    }
}

pub fn quote(
    network: &Network,
    table: &FareTable,
    origin: StopID,
    destination: StopID,
    discount: Discount,
) -> Result<Quote> {
    if origin == destination {
        bail!("Pick two different stops");
    }
    let from = network
        .stops
        .get(&origin)
        .ok_or_else(|| anyhow!("Unknown {:?}", origin))?;
    let to = network
        .stops
        .get(&destination)
        .ok_or_else(|| anyhow!("Unknown {:?}", destination))?;

    let (distance_km, regular_fare, source) =
        if let Some(entry) = network.fares.iter().find(|e| e.connects(origin, destination)) {
            (entry.distance_km, entry.fare, FareSource::Published)
        } else {
            if !from.pos.is_finite() || !to.pos.is_finite() {
                bail!("No published fare between {} and {}", from.name, to.name);
            }
            let km = distance_meters(from.pos, to.pos) / 1000.0;
            (km, table.estimate(km)?, FareSource::Estimated)
        };

    Ok(Quote {
        origin,
        destination,
        distance_km,
        regular_fare,
        discount,
        fare: discount.apply(regular_fare),
        source,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceCategory {
    Short,
    Medium,
    Long,
}

impl DistanceCategory {
    pub fn all() -> Vec<Self> {
        vec![
            DistanceCategory::Short,
            DistanceCategory::Medium,
            DistanceCategory::Long,
        ]
    }

    pub fn classify(distance_km: f64) -> Self {
        if distance_km < 5.0 {
            DistanceCategory::Short
        } else if distance_km < 10.0 {
            DistanceCategory::Medium
        } else {
            DistanceCategory::Long
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            DistanceCategory::Short => "Short (< 5 km)",
            DistanceCategory::Medium => "Medium (5-10 km)",
            DistanceCategory::Long => "Long (10+ km)",
        }
    }
}

/// Published fares, optionally only one distance category, shortest first
pub fn matrix(network: &Network, category: Option<DistanceCategory>) -> Vec<&FareEntry> {
    let mut entries: Vec<&FareEntry> = network
        .fares
        .iter()
        .filter(|e| {
            category
                .map(|c| DistanceCategory::classify(e.distance_km) == c)
                .unwrap_or(true)
        })
        .collect();
    entries.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use network::orig;

    fn stop(network: &Network, id: &str) -> StopID {
        network.stop_id(&orig::StopID(id.to_string())).unwrap()
    }

    #[test]
    fn table() {
        let t = FareTable::default();
        assert_eq!(t.estimate(0.0).unwrap(), 10);
        assert_eq!(t.estimate(4.9).unwrap(), 10);
        assert_eq!(t.estimate(5.0).unwrap(), 10);
        assert_eq!(t.estimate(5.2).unwrap(), 12);
        assert_eq!(t.estimate(6.2).unwrap(), 14);
        assert_eq!(t.estimate(7.0).unwrap(), 14);
        // 10 + 7 * 3
        assert_eq!(t.estimate(12.0).unwrap(), 31);
        assert_eq!(t.estimate(50.0).unwrap(), 40);
        assert_eq!(t.estimate(1e20).unwrap(), 40);
        assert_eq!(t.estimate(f64::MAX).unwrap(), 40);
        assert!(t.estimate(-1.0).is_err());
        assert!(t.estimate(f64::NAN).is_err());
    }

    #[test]
    fn deterministic() {
        let t = FareTable::default();
        assert_eq!(t.estimate(8.3).unwrap(), t.estimate(8.3).unwrap());
    }

    #[test]
    fn published_matrix_agrees_with_the_table() {
        let network = Network::load_embedded().unwrap();
        let t = FareTable::default();
        for entry in &network.fares {
            assert_eq!(t.estimate(entry.distance_km).unwrap(), entry.fare);
        }
    }

    #[test]
    fn discounts() {
        assert_eq!(Discount::Student.apply(12), 10);
        assert_eq!(Discount::Senior.apply(14), 11);
        assert_eq!(Discount::Pwd.apply(10), 8);
        assert_eq!(Discount::Child.apply(14), 0);
        assert_eq!(Discount::None.apply(14), 14);
        // 8.8 and 10.4
        assert_eq!(Discount::Student.apply(11), 9);
        assert_eq!(Discount::Student.apply(13), 10);
    }

    #[test]
    fn quote_uses_published_fare_both_ways() {
        let network = Network::load_embedded().unwrap();
        let t = FareTable::default();
        let a = stop(&network, "suarez_terminal");
        let b = stop(&network, "poblacion");
        let q = quote(&network, &t, b, a, Discount::Student).unwrap();
        assert_eq!(q.source, FareSource::Published);
        assert_eq!(q.regular_fare, 14);
        assert_eq!(q.fare, 11);
        assert_eq!(q.savings(), 3);
        assert!(quote(&network, &t, a, a, Discount::None).is_err());
    }

    #[test]
    fn quote_falls_back_to_distance() {
        let network = Network::load_embedded().unwrap();
        let t = FareTable::default();
        let a = stop(&network, "robinsons");
        let b = stop(&network, "octagon");
        let q = quote(&network, &t, a, b, Discount::None).unwrap();
        assert_eq!(q.source, FareSource::Estimated);
        assert!(q.distance_km > 0.0);
        assert_eq!(q.regular_fare, t.estimate(q.distance_km).unwrap());
    }

    #[test]
    fn categories() {
        let network = Network::load_embedded().unwrap();
        let medium = matrix(&network, Some(DistanceCategory::Medium));
        assert!(!medium.is_empty());
        assert!(medium
            .iter()
            .all(|e| e.distance_km >= 5.0 && e.distance_km < 10.0));
        let all = matrix(&network, None);
        assert_eq!(all.len(), network.fares.len());
        assert!(all.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
    }

    #[test]
    fn admin_can_change_brackets() {
        let mut t = FareTable::default();
        t.update_bracket(1, 3, 30).unwrap();
        assert_eq!(t.estimate(7.0).unwrap(), 16);
        assert!(t.update_bracket(1, 3, 5).is_err());
        assert!(t.update_bracket(9, 3, 30).is_err());
    }
}
