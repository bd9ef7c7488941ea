use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// The IDs used by the source tables.
pub mod orig {
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    pub struct StopID(pub String);

    #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    pub struct RouteID(pub String);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StopID(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RouteID(pub usize);

/// Drivers keep the numeric ID printed on their QR code, so there's no mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DriverID(pub usize);

impl CheapID for StopID {
    fn new(x: usize) -> Self {
        Self(x)
    }
}
impl CheapID for RouteID {
    fn new(x: usize) -> Self {
        Self(x)
    }
}

pub trait CheapID: Copy {
    fn new(x: usize) -> Self;
}

#[derive(Clone, Serialize, Deserialize)]
pub struct IDMapping<K: Ord, V> {
    orig_to_cheap: BTreeMap<K, V>,
    // We don't need to store the inverse. It's more convenient for each object to own that.
}

impl<K: Clone + std::fmt::Debug + Ord, V: CheapID> IDMapping<K, V> {
    pub fn new() -> Self {
        Self {
            orig_to_cheap: BTreeMap::new(),
        }
    }

    pub fn insert_new(&mut self, orig: K) -> Result<V> {
        let cheap = V::new(self.orig_to_cheap.len());
        if self.orig_to_cheap.insert(orig.clone(), cheap).is_some() {
            bail!("IDMapping::insert_new has duplicate input for {:?}", orig);
        }
        Ok(cheap)
    }

    pub fn lookup(&self, orig: &K) -> Result<V> {
        match self.orig_to_cheap.get(orig) {
            Some(x) => Ok(*x),
            None => bail!("IDMapping lookup of {:?} failed", orig),
        }
    }

    pub fn len(&self) -> usize {
        self.orig_to_cheap.len()
    }

    pub fn borrow(&self) -> &BTreeMap<K, V> {
        &self.orig_to_cheap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut ids: IDMapping<orig::StopID, StopID> = IDMapping::new();
        let a = ids.insert_new(orig::StopID("a".to_string())).unwrap();
        let b = ids.insert_new(orig::StopID("b".to_string())).unwrap();
        assert_eq!(a, StopID(0));
        assert_eq!(b, StopID(1));
        assert!(ids.insert_new(orig::StopID("a".to_string())).is_err());
        assert_eq!(ids.lookup(&orig::StopID("b".to_string())).unwrap(), b);
        assert!(ids.lookup(&orig::StopID("zzz".to_string())).is_err());
    }
}
