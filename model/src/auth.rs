//! Demo-grade accounts. Everything lives in memory and passwords are compared in plain text; the
//! point is that a role only ever comes from an account record.

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use network::{Account, AccountStatus, DriverID, Role};

const MIN_PASSWORD_LENGTH: usize = 6;

/// Who's logged in
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub driver: Option<DriverID>,
}

impl Session {
    fn new(account: &Account) -> Self {
        Self {
            email: account.email.clone(),
            name: account.name.clone(),
            role: account.role,
            driver: account.driver,
        }
    }
}

pub struct AccountStore {
    accounts: Vec<Account>,
}

impl AccountStore {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }

    pub fn all(&self) -> &Vec<Account> {
        &self.accounts
    }

    pub fn get(&self, email: &str) -> Option<&Account> {
        let email = email.trim();
        self.accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
    }

    fn get_mut(&mut self, email: &str) -> Result<&mut Account> {
        let email = email.trim();
        self.accounts
            .iter_mut()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .ok_or_else(|| anyhow!("No account for {email}"))
    }

    pub fn authenticate(&self, email: &str, password: &str) -> Result<Session> {
        let account = match self.get(email) {
            Some(a) if a.password == password => a,
            _ => bail!("Invalid email or password"),
        };
        if account.status == AccountStatus::Suspended {
            bail!("This account is suspended. Contact an administrator.");
        }
        info!("{} logged in as {:?}", account.email, account.role);
        Ok(Session::new(account))
    }

    /// New accounts are always active commuters.
    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        today: NaiveDate,
    ) -> Result<Session> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            bail!("Please enter your name");
        }
        check_email(email)?;
        check_password(password)?;
        if self.get(email).is_some() {
            bail!("An account for {email} already exists");
        }
        self.accounts.push(Account {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            role: Role::Commuter,
            status: AccountStatus::Active,
            joined: today,
            driver: None,
        });
        info!("Registered {email}");
        Ok(Session::new(&self.accounts[self.accounts.len() - 1]))
    }

    /// Returns the updated session
    pub fn update_profile(&mut self, email: &str, name: &str, new_email: &str) -> Result<Session> {
        let name = name.trim();
        let new_email = new_email.trim();
        if name.is_empty() {
            bail!("Name can't be empty");
        }
        check_email(new_email)?;
        if !new_email.eq_ignore_ascii_case(email.trim()) && self.get(new_email).is_some() {
            bail!("An account for {new_email} already exists");
        }
        let account = self.get_mut(email)?;
        account.name = name.to_string();
        account.email = new_email.to_string();
        Ok(Session::new(account))
    }

    pub fn change_password(&mut self, email: &str, current: &str, new: &str) -> Result<()> {
        check_password(new)?;
        let account = self.get_mut(email)?;
        if account.password != current {
            bail!("Current password is wrong");
        }
        account.password = new.to_string();
        Ok(())
    }

    pub fn set_status(&mut self, email: &str, status: AccountStatus) -> Result<()> {
        if status == AccountStatus::Suspended {
            self.check_not_last_admin(email)?;
        }
        self.get_mut(email)?.status = status;
        Ok(())
    }

    pub fn set_role(&mut self, email: &str, role: Role) -> Result<()> {
        if role != Role::Admin {
            self.check_not_last_admin(email)?;
        }
        let account = self.get_mut(email)?;
        if role == Role::Driver && account.driver.is_none() {
            bail!("{} isn't linked to a driver record", account.email);
        }
        account.role = role;
        Ok(())
    }

    pub fn count(&self, role: Role) -> usize {
        self.accounts.iter().filter(|a| a.role == role).count()
    }

    fn check_not_last_admin(&self, email: &str) -> Result<()> {
        let is_active_admin =
            |a: &Account| a.role == Role::Admin && a.status == AccountStatus::Active;
        if let Some(account) = self.get(email) {
            if is_active_admin(account)
                && self.accounts.iter().filter(|a| is_active_admin(a)).count() == 1
            {
                bail!("{} is the last active admin", account.email);
            }
        }
        Ok(())
    }
}

fn check_email(email: &str) -> Result<()> {
    let valid = match email.split_once('@') {
        Some((user, domain)) => {
            !user.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        bail!("{email} isn't a valid email address");
    }
    Ok(())
}

fn check_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        bail!("Passwords need at least {MIN_PASSWORD_LENGTH} characters");
    }
    Ok(())
}
