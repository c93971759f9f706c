//! SSH public key syntax checks for authorized_keys entries.
//!
//! An entry is `[options] keytype base64-blob [comment]`. The blob is decoded
//! and walked as SSH wire format so that a key whose body does not match its
//! declared type is rejected.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const PLAIN_KEY_TYPES: &[&str] = &[
    "ssh-rsa",
    "ssh-dss",
    "ecdsa-sha2-nistp256",
    "ecdsa-sha2-nistp384",
    "ecdsa-sha2-nistp521",
    "ssh-ed25519",
    "sk-ecdsa-sha2-nistp256@openssh.com",
    "sk-ssh-ed25519@openssh.com",
];

const CERT_KEY_TYPES: &[&str] = &[
    "ssh-rsa-cert-v01@openssh.com",
    "ssh-dss-cert-v01@openssh.com",
    "ecdsa-sha2-nistp256-cert-v01@openssh.com",
    "ecdsa-sha2-nistp384-cert-v01@openssh.com",
    "ecdsa-sha2-nistp521-cert-v01@openssh.com",
    "ssh-ed25519-cert-v01@openssh.com",
    "sk-ecdsa-sha2-nistp256-cert-v01@openssh.com",
    "sk-ssh-ed25519-cert-v01@openssh.com",
];

const ED25519_KEY_LEN: usize = 32;

/// Returns true if `line` is a single well-formed authorized_keys entry
pub fn valid_authorized_key(line: &str) -> bool {
    parse_authorized_key(line).is_some()
}

/// The parts of an authorized_keys entry that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedKey<'a> {
    pub options: Option<&'a str>,
    pub key_type: &'a str,
    pub comment: Option<&'a str>,
}

pub fn parse_authorized_key(line: &str) -> Option<AuthorizedKey<'_>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.contains(['\n', '\r']) {
        return None;
    }

    let (options, rest) = match first_token(line) {
        (token, _) if is_key_type(token) => (None, line),
        _ => {
            let (options, rest) = split_options(line)?;
            (Some(options), rest)
        }
    };

    let (key_type, rest) = first_token(rest);
    if !is_key_type(key_type) {
        return None;
    }

    let (blob, rest) = first_token(rest);
    if blob.is_empty() {
        return None;
    }

    let decoded = STANDARD.decode(blob).ok()?;
    if !valid_key_blob(key_type, &decoded) {
        return None;
    }

    let comment = Some(rest.trim()).filter(|c| !c.is_empty());
    Some(AuthorizedKey {
        options,
        key_type,
        comment,
    })
}

fn is_key_type(token: &str) -> bool {
    PLAIN_KEY_TYPES.contains(&token) || CERT_KEY_TYPES.contains(&token)
}

fn is_separator(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Split off the first whitespace-delimited token
fn first_token(s: &str) -> (&str, &str) {
    let s = s.trim_start_matches(is_separator);
    match s.find(is_separator) {
        Some(idx) => (&s[..idx], s[idx..].trim_start_matches(is_separator)),
        None => (s, ""),
    }
}

/// The options field runs to the first separator outside double quotes
fn split_options(line: &str) -> Option<(&str, &str)> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            c if is_separator(c) && !in_quotes => {
                return Some((&line[..idx], line[idx..].trim_start_matches(is_separator)));
            }
            _ => {}
        }
    }
    None
}

fn valid_key_blob(key_type: &str, blob: &[u8]) -> bool {
    let mut reader = WireReader::new(blob);
    match reader.read_string() {
        Some(embedded) if embedded == key_type.as_bytes() => {}
        _ => return false,
    }

    if CERT_KEY_TYPES.contains(&key_type) {
        // nonce and the certified key follow; only the framing type is checked
        return !reader.is_empty();
    }

    let body_ok = match key_type {
        "ssh-rsa" => reader.read_fields(2),
        "ssh-dss" => reader.read_fields(4),
        "ssh-ed25519" => reader.read_ed25519(),
        "sk-ssh-ed25519@openssh.com" => reader.read_ed25519() && reader.read_fields(1),
        "sk-ecdsa-sha2-nistp256@openssh.com" => {
            reader.read_ecdsa("nistp256") && reader.read_fields(1)
        }
        other => match other.strip_prefix("ecdsa-sha2-") {
            Some(curve) => reader.read_ecdsa(curve),
            None => false,
        },
    };

    body_ok && reader.is_empty()
}

struct WireReader<'a> {
    buf: &'a [u8],
}

impl<'a> WireReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Length-prefixed string (also the framing for mpint)
    fn read_string(&mut self) -> Option<&'a [u8]> {
        let (len, rest) = self.buf.split_first_chunk::<4>()?;
        let len = u32::from_be_bytes(*len) as usize;
        if rest.len() < len {
            return None;
        }
        let (value, rest) = rest.split_at(len);
        self.buf = rest;
        Some(value)
    }

    fn read_fields(&mut self, count: usize) -> bool {
        (0..count).all(|_| self.read_string().is_some())
    }

    fn read_ed25519(&mut self) -> bool {
        matches!(self.read_string(), Some(key) if key.len() == ED25519_KEY_LEN)
    }

    fn read_ecdsa(&mut self, curve: &str) -> bool {
        let curve_ok = matches!(self.read_string(), Some(name) if name == curve.as_bytes());
        // uncompressed point
        curve_ok && matches!(self.read_string(), Some(point) if point.first() == Some(&0x04))
    }
}
