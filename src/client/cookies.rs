//! Client-side cookie storage for the session identity.

use std::fmt;

pub const ROOT_PATH: &str = "/";

pub const COOKIE_EMAIL: &str = "email";
pub const COOKIE_TOKEN: &str = "token";
pub const COOKIE_NOMBRES: &str = "nombres";
pub const COOKIE_APELLIDOS: &str = "apellidos";

#[derive(Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
}

impl Cookie {
    /// Session cookie scoped to `/` with no expiry.
    #[must_use]
    pub fn session(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            path: ROOT_PATH.to_string(),
        }
    }
}

/// `name=value; Path=/`, value percent-encoded like `encodeURIComponent`.
impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}; Path={}", self.name, encode_value(&self.value), self.path)
    }
}

impl fmt::Debug for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.name == COOKIE_TOKEN {
            "***"
        } else {
            self.value.as_str()
        };
        f.debug_struct("Cookie")
            .field("name", &self.name)
            .field("value", &value)
            .field("path", &self.path)
            .finish()
    }
}

/// Insertion-ordered cookies; setting an existing name replaces it in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, cookie: Cookie) {
        if let Some(existing) = self
            .cookies
            .iter_mut()
            .find(|existing| existing.name == cookie.name && existing.path == cookie.path)
        {
            *existing = cookie;
        } else {
            self.cookies.push(cookie);
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|cookie| cookie.name == name)
            .map(|cookie| cookie.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    /// One `Set-Cookie`-style line per cookie.
    #[must_use]
    pub fn render(&self) -> String {
        self.cookies
            .iter()
            .map(|cookie| format!("{cookie}\n"))
            .collect()
    }
}

fn encode_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&byte) {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_root_scoped() {
        let cookie = Cookie::session(COOKIE_EMAIL, "ana@x.com");
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.to_string(), "email=ana%40x.com; Path=/");
    }

    #[test]
    fn values_are_uri_component_encoded() {
        let cookie = Cookie::session(COOKIE_NOMBRES, "María José");
        assert_eq!(cookie.to_string(), "nombres=Mar%C3%ADa%20Jos%C3%A9; Path=/");
    }

    #[test]
    fn set_replaces_same_name() {
        let mut jar = CookieJar::new();
        jar.set(Cookie::session(COOKIE_TOKEN, "first"));
        jar.set(Cookie::session(COOKIE_EMAIL, "ana@x.com"));
        jar.set(Cookie::session(COOKIE_TOKEN, "second"));

        assert_eq!(jar.len(), 2);
        assert_eq!(jar.get(COOKIE_TOKEN), Some("second"));
        assert_eq!(
            jar.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec![COOKIE_TOKEN, COOKIE_EMAIL]
        );
    }

    #[test]
    fn render_emits_one_line_per_cookie() {
        let mut jar = CookieJar::new();
        jar.set(Cookie::session(COOKIE_EMAIL, "a@b.co"));
        jar.set(Cookie::session(COOKIE_APELLIDOS, "Lopez"));
        assert_eq!(
            jar.render(),
            "email=a%40b.co; Path=/\napellidos=Lopez; Path=/\n"
        );

        jar.clear();
        assert!(jar.is_empty());
        assert_eq!(jar.render(), "");
    }

    #[test]
    fn debug_hides_token() {
        let rendered = format!("{:?}", Cookie::session(COOKIE_TOKEN, "abc.def"));
        assert!(!rendered.contains("abc.def"));
    }
}
