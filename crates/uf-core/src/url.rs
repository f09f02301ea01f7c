//! URL normalizer
//!
//! Structural URL parsing that keeps every component apart: scheme, opaque
//! part, userinfo, host (with port), decoded path plus its raw encoding hint,
//! raw query and fragment. Nothing is validated beyond syntax, so an empty
//! host is a perfectly good result.
//!
//! # Examples
//!
//! ```
//! use uf_core::url::parse;
//!
//! let url = parse("example.com:8080/a/b?x=1").unwrap();
//! // "example.com" looks like a scheme here, so no defaulting happens.
//! assert_eq!(url.scheme, "example.com");
//!
//! let url = parse("sub.example.com/path?x=1").unwrap();
//! assert_eq!(url.scheme, "http");
//! assert_eq!(url.hostname(), "sub.example.com");
//! assert_eq!(url.to_string(), "http://sub.example.com/path?x=1");
//! ```

use std::fmt;

/// Prefix inserted in front of inputs that parse without a scheme.
pub const DEFAULT_SCHEME_PREFIX: &str = "http://";

/// Error type for URL parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed URL {input:?}: {reason}")]
    Malformed { input: String, reason: String },
}

// =============================================================================
// Parsed URL
// =============================================================================

/// Username and optional password from the authority.
///
/// A password that is present but empty (`user:@host`) is distinct from no
/// password at all (`user@host`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Userinfo {
    username: String,
    password: Option<String>,
}

impl Userinfo {
    /// Userinfo from decoded parts.
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// Decoded username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Decoded password, `None` when no `:` was present.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

impl fmt::Display for Userinfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&escape(&self.username, Encoding::UserPassword))?;
        if let Some(password) = &self.password {
            write!(f, ":{}", escape(password, Encoding::UserPassword))?;
        }
        Ok(())
    }
}

/// A URL split into its raw components.
///
/// `path` and `fragment` are stored decoded; `raw_path` and `raw_fragment`
/// hold the original text only when it differs from the default encoding.
/// `raw_query` is stored exactly as it appeared, without the `?`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUrl {
    pub scheme: String,
    pub opaque: String,
    pub user: Option<Userinfo>,
    /// Host or host:port
    pub host: String,
    pub path: String,
    pub raw_path: String,
    /// A scheme was followed directly by `/` with no `//` authority.
    pub omit_host: bool,
    /// The input ended in a lone `?`.
    pub force_query: bool,
    pub raw_query: String,
    pub fragment: String,
    pub raw_fragment: String,
}

impl ParsedUrl {
    /// Host without port and without IPv6 brackets.
    pub fn hostname(&self) -> &str {
        split_host_port(&self.host).0
    }

    /// Port digits, empty when the host carries no port.
    pub fn port(&self) -> &str {
        split_host_port(&self.host).1
    }

    /// The path in percent-encoded form, preferring the original encoding.
    pub fn escaped_path(&self) -> String {
        if !self.raw_path.is_empty() && valid_encoded(&self.raw_path, Encoding::Path) {
            if let Ok(path) = unescape(&self.raw_path, Encoding::Path) {
                if path == self.path {
                    return self.raw_path.clone();
                }
            }
        }
        if self.path == "*" {
            return "*".to_string();
        }
        escape(&self.path, Encoding::Path)
    }

    /// The fragment in percent-encoded form, preferring the original encoding.
    pub fn escaped_fragment(&self) -> String {
        if !self.raw_fragment.is_empty() && valid_encoded(&self.raw_fragment, Encoding::Fragment) {
            if let Ok(fragment) = unescape(&self.raw_fragment, Encoding::Fragment) {
                if fragment == self.fragment {
                    return self.raw_fragment.clone();
                }
            }
        }
        escape(&self.fragment, Encoding::Fragment)
    }

    fn set_path(&mut self, raw: &str) -> Result<(), String> {
        self.path = unescape(raw, Encoding::Path)?;
        self.raw_path = if escape(&self.path, Encoding::Path) == raw {
            String::new()
        } else {
            raw.to_string()
        };
        Ok(())
    }

    fn set_fragment(&mut self, raw: &str) -> Result<(), String> {
        self.fragment = unescape(raw, Encoding::Fragment)?;
        self.raw_fragment = if escape(&self.fragment, Encoding::Fragment) == raw {
            String::new()
        } else {
            raw.to_string()
        };
        Ok(())
    }
}

impl fmt::Display for ParsedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = String::new();

        if !self.scheme.is_empty() {
            buf.push_str(&self.scheme);
            buf.push(':');
        }

        if !self.opaque.is_empty() {
            buf.push_str(&self.opaque);
        } else {
            let has_authority = !self.scheme.is_empty() || !self.host.is_empty() || self.user.is_some();
            let omitted = self.omit_host && self.host.is_empty() && self.user.is_none();
            if has_authority && !omitted {
                if !self.host.is_empty() || !self.path.is_empty() || self.user.is_some() {
                    buf.push_str("//");
                }
                if let Some(user) = &self.user {
                    buf.push_str(&user.to_string());
                    buf.push('@');
                }
                if !self.host.is_empty() {
                    buf.push_str(&escape(&self.host, Encoding::Host));
                }
            }

            let path = self.escaped_path();
            if !path.is_empty() && !path.starts_with('/') && !self.host.is_empty() {
                buf.push('/');
            }
            // A colon in the first segment of a relative path would read as a scheme
            if buf.is_empty() && path.split('/').next().unwrap_or("").contains(':') {
                buf.push_str("./");
            }
            buf.push_str(&path);
        }

        if self.force_query || !self.raw_query.is_empty() {
            buf.push('?');
            buf.push_str(&self.raw_query);
        }
        if !self.fragment.is_empty() {
            buf.push('#');
            buf.push_str(&self.escaped_fragment());
        }

        f.write_str(&buf)
    }
}

// =============================================================================
// Entry Point
// =============================================================================

/// Parse a raw URL, defaulting the scheme to `http` when none is present.
///
/// A syntax error in the first parse fails immediately; a schemeless result
/// is re-parsed once with [`DEFAULT_SCHEME_PREFIX`] prepended.
pub fn parse(raw: &str) -> Result<ParsedUrl, ParseError> {
    let url = parse_structure(raw).map_err(|reason| malformed(raw, reason))?;
    if !url.scheme.is_empty() {
        return Ok(url);
    }

    let defaulted = format!("{}{}", DEFAULT_SCHEME_PREFIX, raw);
    log::debug!("no scheme in {:?}, re-parsing as {:?}", raw, defaulted);
    parse_structure(&defaulted).map_err(|reason| malformed(&defaulted, reason))
}

fn malformed(input: &str, reason: String) -> ParseError {
    ParseError::Malformed {
        input: input.to_string(),
        reason,
    }
}

/// Parse without scheme defaulting. The fragment is split off first.
fn parse_structure(raw: &str) -> Result<ParsedUrl, String> {
    match raw.split_once('#') {
        Some((rest, fragment)) => {
            let mut url = parse_reference(rest)?;
            url.set_fragment(fragment)?;
            Ok(url)
        }
        None => parse_reference(raw),
    }
}

fn parse_reference(raw: &str) -> Result<ParsedUrl, String> {
    if raw.bytes().any(|b| b < 0x20 || b == 0x7f) {
        return Err("invalid control character in URL".to_string());
    }

    let mut url = ParsedUrl::default();
    if raw == "*" {
        url.path = "*".to_string();
        return Ok(url);
    }

    let (scheme, mut rest) = split_scheme(raw)?;
    url.scheme = scheme.to_ascii_lowercase();

    if rest.ends_with('?') && rest.matches('?').count() == 1 {
        url.force_query = true;
        rest = &rest[..rest.len() - 1];
    } else if let Some((before, query)) = rest.split_once('?') {
        url.raw_query = query.to_string();
        rest = before;
    }

    if !rest.starts_with('/') {
        if !url.scheme.is_empty() {
            url.opaque = rest.to_string();
            return Ok(url);
        }
        if let Some(colon) = rest.find(':') {
            if rest.find('/').map_or(true, |slash| colon < slash) {
                return Err("first path segment in URL cannot contain colon".to_string());
            }
        }
    }

    if (!url.scheme.is_empty() || !rest.starts_with("///")) && rest.starts_with("//") {
        let after = &rest[2..];
        let (authority, tail) = match after.find('/') {
            Some(i) => (&after[..i], &after[i..]),
            None => (after, ""),
        };
        let (user, host) = parse_authority(authority)?;
        url.user = user;
        url.host = host;
        rest = tail;
    } else if !url.scheme.is_empty() && rest.starts_with('/') {
        url.omit_host = true;
    }

    url.set_path(rest)?;
    Ok(url)
}

// =============================================================================
// Scheme / Authority
// =============================================================================

/// Split `scheme:rest`. Returns an empty scheme when the prefix is not a
/// valid scheme name.
fn split_scheme(raw: &str) -> Result<(&str, &str), String> {
    for (i, b) in raw.bytes().enumerate() {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' => {}
            b'0'..=b'9' | b'+' | b'-' | b'.' => {
                if i == 0 {
                    return Ok(("", raw));
                }
            }
            b':' => {
                if i == 0 {
                    return Err("missing protocol scheme".to_string());
                }
                return Ok((&raw[..i], &raw[i + 1..]));
            }
            _ => return Ok(("", raw)),
        }
    }
    Ok(("", raw))
}

fn parse_authority(authority: &str) -> Result<(Option<Userinfo>, String), String> {
    let at = authority.rfind('@');
    let host = match at {
        Some(i) => parse_host(&authority[i + 1..])?,
        None => parse_host(authority)?,
    };
    let Some(at) = at else {
        return Ok((None, host));
    };

    let userinfo = &authority[..at];
    if !valid_userinfo(userinfo) {
        return Err("invalid userinfo".to_string());
    }
    let user = match userinfo.split_once(':') {
        Some((username, password)) => Userinfo::new(
            unescape(username, Encoding::UserPassword)?,
            Some(unescape(password, Encoding::UserPassword)?),
        ),
        None => Userinfo::new(unescape(userinfo, Encoding::UserPassword)?, None),
    };
    Ok((Some(user), host))
}

fn parse_host(host: &str) -> Result<String, String> {
    if host.starts_with('[') {
        let close = host
            .rfind(']')
            .ok_or_else(|| "missing ']' in host".to_string())?;
        let colon_port = &host[close + 1..];
        if !valid_optional_port(colon_port) {
            return Err(format!("invalid port {:?} after host", colon_port));
        }

        // IPv6 zone identifiers are introduced by an escaped percent sign
        if let Some(zone) = host[..close].find("%25") {
            let mut out = unescape(&host[..zone], Encoding::Host)?;
            out.push_str(&unescape(&host[zone..close], Encoding::Zone)?);
            out.push_str(&unescape(&host[close..], Encoding::Host)?);
            return Ok(out);
        }
    } else if let Some(colon) = host.rfind(':') {
        let colon_port = &host[colon..];
        if !valid_optional_port(colon_port) {
            return Err(format!("invalid port {:?} after host", colon_port));
        }
    }

    unescape(host, Encoding::Host)
}

#[inline]
fn valid_optional_port(port: &str) -> bool {
    match port.strip_prefix(':') {
        Some(digits) => digits.bytes().all(|b| b.is_ascii_digit()),
        None => port.is_empty(),
    }
}

fn valid_userinfo(s: &str) -> bool {
    s.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || matches!(
                c,
                '-' | '.' | '_' | ':' | '~' | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ','
                    | ';' | '=' | '%' | '@'
            )
    })
}

/// Split `host:port`, removing IPv6 brackets from the host.
fn split_host_port(host_port: &str) -> (&str, &str) {
    let mut host = host_port;
    let mut port = "";

    if let Some(colon) = host_port.rfind(':') {
        if valid_optional_port(&host_port[colon..]) {
            host = &host_port[..colon];
            port = &host_port[colon + 1..];
        }
    }

    if host.len() >= 2 && host.starts_with('[') && host.ends_with(']') {
        host = &host[1..host.len() - 1];
    }

    (host, port)
}

// =============================================================================
// Percent Encoding
// =============================================================================

/// Component being encoded or decoded; each has its own reserved set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoding {
    Path,
    Host,
    Zone,
    UserPassword,
    QueryComponent,
    Fragment,
}

const UPPER_HEX: &[u8; 16] = b"0123456789ABCDEF";

#[inline]
fn unhex(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

fn should_escape(c: u8, mode: Encoding) -> bool {
    if c.is_ascii_alphanumeric() {
        return false;
    }

    if matches!(mode, Encoding::Host | Encoding::Zone)
        && matches!(
            c,
            b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=' | b':'
                | b'[' | b']' | b'<' | b'>' | b'"'
        )
    {
        return false;
    }

    match c {
        b'-' | b'_' | b'.' | b'~' => return false,
        b'$' | b'&' | b'+' | b',' | b'/' | b':' | b';' | b'=' | b'?' | b'@' => {
            return match mode {
                Encoding::Path => c == b'?',
                Encoding::UserPassword => matches!(c, b'@' | b'/' | b'?' | b':'),
                Encoding::QueryComponent => true,
                Encoding::Fragment => false,
                Encoding::Host | Encoding::Zone => true,
            };
        }
        _ => {}
    }

    if mode == Encoding::Fragment && matches!(c, b'!' | b'(' | b')' | b'*') {
        return false;
    }

    true
}

pub(crate) fn escape(s: &str, mode: Encoding) -> String {
    let mut out = String::with_capacity(s.len());
    for &c in s.as_bytes() {
        if !should_escape(c, mode) {
            out.push(c as char);
        } else if c == b' ' && mode == Encoding::QueryComponent {
            out.push('+');
        } else {
            out.push('%');
            out.push(UPPER_HEX[(c >> 4) as usize] as char);
            out.push(UPPER_HEX[(c & 0x0f) as usize] as char);
        }
    }
    out
}

/// Decode percent escapes. Bytes that do not form valid UTF-8 after decoding
/// are replaced with U+FFFD.
pub(crate) fn unescape(s: &str, mode: Encoding) -> Result<String, String> {
    let bytes = s.as_bytes();
    let mut escapes = 0usize;
    let mut has_plus = false;

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                escapes += 1;
                if i + 2 >= bytes.len()
                    || !bytes[i + 1].is_ascii_hexdigit()
                    || !bytes[i + 2].is_ascii_hexdigit()
                {
                    let end = (i + 3).min(bytes.len());
                    return Err(format!(
                        "invalid URL escape {:?}",
                        String::from_utf8_lossy(&bytes[i..end])
                    ));
                }
                let escaped = &bytes[i..i + 3];
                // Hosts may only escape non-ASCII bytes, with %25 as the one exception
                if mode == Encoding::Host && unhex(bytes[i + 1]) < 8 && escaped != b"%25" {
                    return Err(format!("invalid URL escape {:?}", String::from_utf8_lossy(escaped)));
                }
                if mode == Encoding::Zone {
                    let v = unhex(bytes[i + 1]) << 4 | unhex(bytes[i + 2]);
                    if escaped != b"%25" && v != b' ' && should_escape(v, Encoding::Host) {
                        return Err(format!("invalid URL escape {:?}", String::from_utf8_lossy(escaped)));
                    }
                }
                i += 3;
            }
            b'+' => {
                has_plus = mode == Encoding::QueryComponent;
                i += 1;
            }
            c => {
                if matches!(mode, Encoding::Host | Encoding::Zone) && c < 0x80 && should_escape(c, mode) {
                    return Err(format!("invalid character {:?} in host name", c as char));
                }
                i += 1;
            }
        }
    }

    if escapes == 0 && !has_plus {
        return Ok(s.to_string());
    }

    let mut out = Vec::with_capacity(bytes.len() - 2 * escapes);
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                out.push(unhex(bytes[i + 1]) << 4 | unhex(bytes[i + 2]));
                i += 3;
            }
            b'+' if mode == Encoding::QueryComponent => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Whether `s` is already a valid encoding of some string in `mode`.
fn valid_encoded(s: &str, mode: Encoding) -> bool {
    s.bytes().all(|c| {
        matches!(
            c,
            b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=' | b':'
                | b'@' | b'[' | b']' | b'%'
        ) || !should_escape(c, mode)
    })
}

/// Decode one query key or value (`+` means space).
#[inline]
pub(crate) fn query_unescape(s: &str) -> Result<String, String> {
    unescape(s, Encoding::QueryComponent)
}
