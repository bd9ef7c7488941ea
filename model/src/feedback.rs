use abstutil::Counter;
use anyhow::Result;
use chrono::NaiveDate;

use network::{
    DriverID, Feedback, FeedbackCategory, FeedbackID, FeedbackStatus, Network, RouteID,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedbackTarget {
    General,
    Route(RouteID),
    Driver(DriverID),
}

/// What someone fills out in the feedback form
#[derive(Clone, Debug)]
pub struct FeedbackDraft {
    /// Dropped if `anonymous`
    pub author: Option<String>,
    pub anonymous: bool,
    pub rating: u8,
    pub category: FeedbackCategory,
    pub target: FeedbackTarget,
    pub message: String,
}

pub struct FeedbackStore {
    entries: Vec<Feedback>,
}

pub struct FeedbackStats {
    pub total: usize,
    pub pending: usize,
    pub average_rating: Option<f64>,
    pub per_category: Counter<FeedbackCategory>,
}

impl FeedbackStore {
    pub fn new(entries: Vec<Feedback>) -> Self {
        Self { entries }
    }

    /// Newest first
    pub fn all(&self) -> Vec<&Feedback> {
        let mut list: Vec<&Feedback> = self.entries.iter().collect();
        list.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        list
    }

    pub fn get(&self, id: FeedbackID) -> Option<&Feedback> {
        self.entries.iter().find(|f| f.id == id)
    }

    pub fn submit(
        &mut self,
        draft: FeedbackDraft,
        network: &Network,
        today: NaiveDate,
    ) -> Result<FeedbackID> {
        if !(1..=5).contains(&draft.rating) {
            bail!("Please pick a rating from 1 to 5 stars");
        }
        let message = draft.message.trim();
        if message.is_empty() {
            bail!("Please write a message");
        }
        let (route, driver) = match draft.target {
            FeedbackTarget::General => (None, None),
            FeedbackTarget::Route(r) => {
                if !network.routes.contains_key(&r) {
                    bail!("Unknown {:?}", r);
                }
                (Some(r), None)
            }
            FeedbackTarget::Driver(d) => match network.drivers.get(&d) {
                Some(driver) => (Some(driver.route), Some(d)),
                None => bail!("Unknown {:?}", d),
            },
        };
        let author = if draft.anonymous {
            None
        } else {
            draft
                .author
                .map(|x| x.trim().to_string())
                .filter(|x| !x.is_empty())
        };

        let id = FeedbackID(self.entries.len());
        self.entries.push(Feedback {
            id,
            author,
            rating: draft.rating,
            category: draft.category,
            route,
            driver,
            message: message.to_string(),
            date: today,
            status: FeedbackStatus::Pending,
            helpful: 0,
        });
        info!("Feedback {:?} submitted ({} stars)", id, draft.rating);
        Ok(id)
    }

    fn get_mut(&mut self, id: FeedbackID) -> Result<&mut Feedback> {
        self.entries
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| anyhow!("Unknown {:?}", id))
    }

    pub fn mark_reviewed(&mut self, id: FeedbackID) -> Result<()> {
        self.get_mut(id)?.status = FeedbackStatus::Reviewed;
        Ok(())
    }

    pub fn mark_helpful(&mut self, id: FeedbackID) -> Result<()> {
        self.get_mut(id)?.helpful += 1;
        Ok(())
    }

    pub fn pending(&self) -> Vec<&Feedback> {
        self.all()
            .into_iter()
            .filter(|f| f.status == FeedbackStatus::Pending)
            .collect()
    }

    pub fn for_driver(&self, driver: DriverID) -> Vec<&Feedback> {
        self.all()
            .into_iter()
            .filter(|f| f.driver == Some(driver))
            .collect()
    }

    pub fn for_route(&self, route: RouteID) -> Vec<&Feedback> {
        self.all()
            .into_iter()
            .filter(|f| f.route == Some(route))
            .collect()
    }

    pub fn stats(&self) -> FeedbackStats {
        let mut per_category = Counter::new();
        for f in &self.entries {
            per_category.inc(f.category);
        }
        FeedbackStats {
            total: self.entries.len(),
            pending: self
                .entries
                .iter()
                .filter(|f| f.status == FeedbackStatus::Pending)
                .count(),
            average_rating: average(self.entries.iter()),
            per_category,
        }
    }

    pub fn driver_average(&self, driver: DriverID) -> Option<f64> {
        average(self.entries.iter().filter(|f| f.driver == Some(driver)))
    }
}

fn average<'a, I: Iterator<Item = &'a Feedback>>(entries: I) -> Option<f64> {
    let mut sum = 0;
    let mut count = 0;
    for f in entries {
        sum += f.rating as usize;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum as f64 / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Network, FeedbackStore) {
        let mut network = Network::load_embedded().unwrap();
        let store = FeedbackStore::new(std::mem::take(&mut network.feedback));
        (network, store)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 6).unwrap()
    }

    fn draft(rating: u8, message: &str) -> FeedbackDraft {
        FeedbackDraft {
            author: Some("Lito".to_string()),
            anonymous: false,
            rating,
            category: FeedbackCategory::Safety,
            target: FeedbackTarget::General,
            message: message.to_string(),
        }
    }

    #[test]
    fn validation() {
        let (network, mut store) = setup();
        assert!(store.submit(draft(0, "hi"), &network, today()).is_err());
        assert!(store.submit(draft(6, "hi"), &network, today()).is_err());
        assert!(store.submit(draft(4, "   "), &network, today()).is_err());
        let mut bad_target = draft(4, "hi");
        bad_target.target = FeedbackTarget::Driver(DriverID(99));
        assert!(store.submit(bad_target, &network, today()).is_err());
    }

    #[test]
    fn submit_and_review() {
        let (network, mut store) = setup();
        let before = store.stats();
        let mut d = draft(2, " Brakes squeak ");
        d.target = FeedbackTarget::Driver(DriverID(3));
        d.anonymous = true;
        let id = store.submit(d, &network, today()).unwrap();

        let f = store.get(id).unwrap();
        assert_eq!(f.author, None);
        assert_eq!(f.message, "Brakes squeak");
        assert_eq!(f.status, FeedbackStatus::Pending);
        assert_eq!(f.driver, Some(DriverID(3)));
        assert_eq!(f.route, Some(network.drivers[&DriverID(3)].route));
        // Newest first
        assert_eq!(store.all()[0].id, id);

        let after = store.stats();
        assert_eq!(after.total, before.total + 1);
        assert_eq!(after.pending, before.pending + 1);
        assert_eq!(after.per_category.get(FeedbackCategory::Safety), 1);

        store.mark_reviewed(id).unwrap();
        assert_eq!(store.stats().pending, before.pending);
        store.mark_helpful(id).unwrap();
        assert_eq!(store.get(id).unwrap().helpful, 1);
        assert!(store.mark_reviewed(FeedbackID(999)).is_err());
    }

    #[test]
    fn driver_average() {
        let (network, mut store) = setup();
        // Seeded with one 5 star review
        assert_eq!(store.driver_average(DriverID(1)), Some(5.0));
        let mut d = draft(3, "Late today");
        d.target = FeedbackTarget::Driver(DriverID(1));
        store.submit(d, &network, today()).unwrap();
        assert_eq!(store.driver_average(DriverID(1)), Some(4.0));
        assert_eq!(store.for_driver(DriverID(1)).len(), 2);
        assert_eq!(store.driver_average(DriverID(4)), None);
    }
}
