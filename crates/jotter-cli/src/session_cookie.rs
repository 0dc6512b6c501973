//! Per-profile session cookie persistence in the OS keychain.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use crate::error::CliError;

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "jotter-cli";

struct CookieStore {
    username: String,
}

impl CookieStore {
    fn new(profile_name: &str) -> Self {
        Self {
            username: format!("session_cookie:{profile_name}"),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> Result<Entry, CliError> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username)
            .map_err(|error| CliError::SecureStorage(error.to_string()))
    }

    #[cfg(not(test))]
    fn load(&self) -> Result<Option<String>, CliError> {
        match self.entry()?.get_password() {
            Ok(cookie) => Ok(Some(cookie)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(CliError::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn load(&self) -> Result<Option<String>, CliError> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| CliError::SecureStorage(error.to_string()))?;
        Ok(guard.get(&self.username).cloned())
    }

    #[cfg(not(test))]
    fn save(&self, cookie: &str) -> Result<(), CliError> {
        self.entry()?
            .set_password(cookie)
            .map_err(|error| CliError::SecureStorage(error.to_string()))
    }

    #[cfg(test)]
    fn save(&self, cookie: &str) -> Result<(), CliError> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| CliError::SecureStorage(error.to_string()))?;
        guard.insert(self.username.clone(), cookie.to_string());
        Ok(())
    }

    #[cfg(not(test))]
    fn clear(&self) -> Result<(), CliError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(CliError::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn clear(&self) -> Result<(), CliError> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| CliError::SecureStorage(error.to_string()))?;
        guard.remove(&self.username);
        Ok(())
    }
}

pub fn load_session_cookie(profile_name: &str) -> Result<Option<String>, CliError> {
    CookieStore::new(profile_name).load()
}

/// Store the cookie, or forget it when the gateway no longer holds one.
pub fn store_session_cookie(profile_name: &str, cookie: Option<&str>) -> Result<(), CliError> {
    let store = CookieStore::new(profile_name);
    match cookie {
        Some(cookie) => store.save(cookie),
        None => store.clear(),
    }
}

pub fn clear_session_cookie(profile_name: &str) -> Result<(), CliError> {
    CookieStore::new(profile_name).clear()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn cookies_are_scoped_per_profile() {
        store_session_cookie("cookie-test-a", Some("token-a")).unwrap();
        store_session_cookie("cookie-test-b", Some("token-b")).unwrap();

        assert_eq!(
            load_session_cookie("cookie-test-a").unwrap().as_deref(),
            Some("token-a")
        );

        clear_session_cookie("cookie-test-a").unwrap();
        assert_eq!(load_session_cookie("cookie-test-a").unwrap(), None);
        assert_eq!(
            load_session_cookie("cookie-test-b").unwrap().as_deref(),
            Some("token-b")
        );
    }

    #[test]
    fn storing_none_forgets_the_cookie() {
        store_session_cookie("cookie-test-none", Some("token")).unwrap();
        store_session_cookie("cookie-test-none", None).unwrap();
        assert_eq!(load_session_cookie("cookie-test-none").unwrap(), None);
        clear_session_cookie("cookie-test-none").unwrap();
    }
}
