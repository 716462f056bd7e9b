//! JDBC-style connection URLs
//!
//! Callers configure engines with URLs of the form
//! `jdbc:<subprotocol>://host[:port][/database][?key=value&...]`.
//! This module rewrites the database segment of such URLs and parses them
//! into the pieces a native driver needs. Only single-host URLs are
//! supported; failover lists such as `host1:4000,host2:4000` are rejected.
//!
//! Database names, user names and passwords are percent-encoded inside the
//! URL and decoded when parsed.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

use crate::error::{Error, Result};

/// Optional `jdbc:` scheme prefix
pub const JDBC_PREFIX: &str = "jdbc:";

/// Bytes escaped in a database path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn reject_multi_host(authority: &str) -> Result<()> {
    let hosts = authority.rsplit('@').next().unwrap_or_default();
    if hosts.contains(',') {
        Err(Error::config(format!(
            "multi-host jdbc urls are not supported: {}",
            hosts
        )))
    } else {
        Ok(())
    }
}

fn decode(component: &str, what: &str) -> Result<String> {
    percent_decode_str(component)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| Error::config(format!("jdbc url {} is not valid utf-8: {}", what, e)))
}

/// Replace (or add) the database segment of a URL, keeping its query string.
///
/// Returns the URL unchanged when `database` is `None`. The database name is
/// percent-encoded, so [`JdbcUrl::parse`] recovers it verbatim.
///
/// ```
/// use rivven_datasource::jdbc_url::replace_database;
///
/// assert_eq!(
///     replace_database("jdbc:mysql://host:4000/", Some("d")).unwrap(),
///     "jdbc:mysql://host:4000/d"
/// );
/// assert_eq!(
///     replace_database("jdbc:mysql://host:4000/old?useSSL=false", Some("d")).unwrap(),
///     "jdbc:mysql://host:4000/d?useSSL=false"
/// );
/// assert_eq!(
///     replace_database("jdbc:mysql://host:4000/", Some("my db")).unwrap(),
///     "jdbc:mysql://host:4000/my%20db"
/// );
/// ```
pub fn replace_database(url: &str, database: Option<&str>) -> Result<String> {
    let Some(database) = database else {
        return Ok(url.to_string());
    };

    let (scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| Error::config(format!("jdbc url has no '://' separator: {}", url)))?;

    let (base, query) = match rest.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (rest, None),
    };
    let authority = base.split('/').next().unwrap_or_default();
    reject_multi_host(authority)?;

    let mut rewritten = format!(
        "{}://{}/{}",
        scheme,
        authority,
        utf8_percent_encode(database, PATH_SEGMENT)
    );
    if let Some(query) = query {
        rewritten.push('?');
        rewritten.push_str(query);
    }
    Ok(rewritten)
}

/// Split off the `jdbc:` prefix (matched case-insensitively), if any
fn split_prefix(raw: &str) -> (&str, &str) {
    match raw.get(..JDBC_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(JDBC_PREFIX) => raw.split_at(JDBC_PREFIX.len()),
        _ => ("", raw),
    }
}

/// Mask passwords embedded in a URL (userinfo or `password` property) for logging.
///
/// Unparseable URLs are masked entirely.
pub fn redact(raw: &str) -> String {
    let (prefix, rest) = split_prefix(raw);
    let Ok(mut parsed) = Url::parse(rest) else {
        return "***".to_string();
    };

    if parsed.password().is_some() {
        let _ = parsed.set_password(Some("***"));
    }

    if parsed.query_pairs().any(|(k, _)| k == "password") {
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == "password" { "***".into() } else { v.into_owned() };
                (k.into_owned(), v)
            })
            .collect();
        parsed.query_pairs_mut().clear().extend_pairs(pairs);
    }

    format!("{}{}", prefix, parsed)
}

/// Components of a parsed JDBC URL
#[derive(Clone, PartialEq, Eq)]
pub struct JdbcUrl {
    /// Subprotocol, e.g. `mysql`
    pub subprotocol: String,
    /// Host name or address
    pub host: String,
    /// Port, when given
    pub port: Option<u16>,
    /// Database segment, when given
    pub database: Option<String>,
    /// User embedded in the URL (userinfo or `user` property)
    pub user: Option<String>,
    /// Password embedded in the URL (userinfo or `password` property)
    pub password: Option<String>,
    /// Remaining query properties, in URL order
    pub properties: Vec<(String, String)>,
}

impl JdbcUrl {
    /// Parse a URL with or without the `jdbc:` prefix
    pub fn parse(raw: &str) -> Result<Self> {
        let (_, stripped) = split_prefix(raw.trim());
        if let Some((_, rest)) = stripped.split_once("://") {
            reject_multi_host(rest.split(['/', '?']).next().unwrap_or_default())?;
        }
        let url = Url::parse(stripped)
            .map_err(|e| Error::config(format!("invalid jdbc url: {}", e)))?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::config("jdbc url has no host"))?
            .to_string();

        let database = url
            .path()
            .trim_start_matches('/')
            .split('/')
            .next()
            .filter(|db| !db.is_empty())
            .map(|db| decode(db, "database"))
            .transpose()?;

        let mut user = match url.username() {
            "" => None,
            name => Some(decode(name, "user")?),
        };
        let mut password = url.password().map(|p| decode(p, "password")).transpose()?;
        let mut properties = Vec::new();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "user" => user = Some(value.into_owned()),
                "password" => password = Some(value.into_owned()),
                _ => properties.push((key.into_owned(), value.into_owned())),
            }
        }

        Ok(Self {
            subprotocol: url.scheme().to_string(),
            host,
            port: url.port(),
            database,
            user,
            password,
            properties,
        })
    }

    /// Look up a query property
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl std::fmt::Debug for JdbcUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JdbcUrl")
            .field("subprotocol", &self.subprotocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("properties", &self.properties)
            .finish()
    }
}
