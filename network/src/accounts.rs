use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DriverID;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Commuter,
    Driver,
    Admin,
}

impl Role {
    pub fn all() -> Vec<Self> {
        vec![Role::Commuter, Role::Driver, Role::Admin]
    }

    pub fn describe(self) -> &'static str {
        match self {
            Role::Commuter => "Commuter",
            Role::Driver => "Driver",
            Role::Admin => "Admin",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Suspended,
}

/// A seed account. Passwords are plain text; this is demo data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub status: AccountStatus,
    pub joined: NaiveDate,
    /// Only for drivers
    pub driver: Option<DriverID>,
}

pub fn load<R: std::io::Read>(reader: R) -> Result<Vec<Account>> {
    let mut accounts: Vec<Account> = Vec::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        if accounts
            .iter()
            .any(|a| a.email.eq_ignore_ascii_case(&rec.email))
        {
            bail!("Duplicate account {}", rec.email);
        }
        if rec.role == Role::Driver && rec.driver_id.is_none() {
            warn!("Driver account {} isn't linked to a driver", rec.email);
        }
        accounts.push(Account {
            email: rec.email,
            password: rec.password,
            name: rec.name,
            role: rec.role,
            status: rec.status,
            joined: rec.joined,
            driver: rec.driver_id.map(DriverID),
        });
    }
    Ok(accounts)
}

#[derive(Deserialize)]
struct Record {
    email: String,
    password: String,
    name: String,
    role: Role,
    status: AccountStatus,
    joined: NaiveDate,
    driver_id: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_unique_ignoring_case() {
        let input = "email,password,name,role,status,joined,driver_id\n\
                     a@x.ph,secret1,A,commuter,active,2025-01-01,\n\
                     A@X.ph,secret2,B,admin,active,2025-01-01,\n";
        assert!(load(input.as_bytes()).is_err());
    }

    #[test]
    fn optional_driver() {
        let input = "email,password,name,role,status,joined,driver_id\n\
                     a@x.ph,secret1,A,commuter,suspended,2025-01-01,\n\
                     d@x.ph,secret2,D,driver,active,2025-02-03,4\n";
        let accounts = load(input.as_bytes()).unwrap();
        assert_eq!(accounts[0].driver, None);
        assert_eq!(accounts[0].status, AccountStatus::Suspended);
        assert_eq!(accounts[1].driver, Some(DriverID(4)));
        assert_eq!(accounts[1].role, Role::Driver);
    }
}
