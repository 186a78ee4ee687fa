use std::{
    fs, io,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use cookie::Cookie;
use time::{Duration, OffsetDateTime};

use crate::{SessionError, storage::write_atomic};

/// Where the session cookie lives. Writing an expired cookie clears it.
pub trait CookieStore: Send + Sync {
    fn set(&self, cookie: Cookie<'static>) -> Result<(), SessionError>;
    fn get(&self, name: &str) -> Option<String>;
}

/// `expires` is left out when `now + max_age` is not a representable date;
/// `max-age` alone still bounds the cookie.
pub fn session_cookie(name: &str, token: &str, max_age: Duration) -> Cookie<'static> {
    let mut cookie = Cookie::build((name.to_owned(), token.to_owned()))
        .path("/")
        .max_age(max_age)
        .build();

    if let Some(expires) = OffsetDateTime::now_utc().checked_add(max_age) {
        cookie.set_expires(expires);
    }

    cookie
}

/// `name=; path=/; expires=Thu, 01 Jan 1970 00:00:01 GMT`
pub fn expired_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_owned(), String::new()))
        .path("/")
        .expires(OffsetDateTime::UNIX_EPOCH + Duration::seconds(1))
        .build()
}

pub fn is_expired(cookie: &Cookie<'_>, now: OffsetDateTime) -> bool {
    if cookie.max_age().is_some_and(|max_age| max_age <= Duration::ZERO) {
        return true;
    }

    cookie
        .expires_datetime()
        .is_some_and(|expires| expires <= now)
}

/// Cookie jar kept on disk as one `Set-Cookie` line per cookie.
#[derive(Clone, Debug)]
pub struct FileCookieJar {
    path: PathBuf,
}

impl FileCookieJar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> io::Result<Vec<Cookie<'static>>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(err),
        };

        Ok(content
            .lines()
            .filter_map(|line| match Cookie::parse(line.to_owned()) {
                Ok(cookie) => Some(cookie),
                Err(err) => {
                    tracing::warn!(err = %err, "skipping unreadable cookie line");
                    None
                }
            })
            .collect())
    }
}

impl CookieStore for FileCookieJar {
    fn set(&self, cookie: Cookie<'static>) -> Result<(), SessionError> {
        let mut cookies = self.read()?;
        cookies.retain(|existing| existing.name() != cookie.name());
        cookies.push(cookie);

        let content = cookies
            .iter()
            .map(|cookie| format!("{cookie}\n"))
            .collect::<String>();

        write_atomic(&self.path, content.as_bytes())?;

        Ok(())
    }

    fn get(&self, name: &str) -> Option<String> {
        let cookies = match self.read() {
            Ok(cookies) => cookies,
            Err(err) => {
                tracing::warn!(err = %err, "cookie jar unreadable");
                return None;
            }
        };

        let now = OffsetDateTime::now_utc();
        cookies
            .into_iter()
            .find(|cookie| cookie.name() == name && !is_expired(cookie, now))
            .map(|cookie| cookie.value().to_owned())
            .filter(|value| !value.is_empty())
    }
}

/// In-memory jar that remembers every cookie written to it.
#[derive(Clone, Debug, Default)]
pub struct MemoryCookieJar {
    history: Arc<Mutex<Vec<Cookie<'static>>>>,
}

impl MemoryCookieJar {
    pub fn history(&self) -> Vec<Cookie<'static>> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CookieStore for MemoryCookieJar {
    fn set(&self, cookie: Cookie<'static>) -> Result<(), SessionError> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(cookie);
        Ok(())
    }

    fn get(&self, name: &str) -> Option<String> {
        let now = OffsetDateTime::now_utc();
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|cookie| cookie.name() == name)
            .filter(|cookie| !is_expired(cookie, now))
            .map(|cookie| cookie.value().to_owned())
            .filter(|value| !value.is_empty())
    }
}
