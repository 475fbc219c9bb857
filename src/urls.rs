use percent_encoding::percent_decode_str;
use regex::Regex;
use reqwest::Url;
use std::{borrow::Cow, sync::OnceLock};

pub const DEFAULT_SCHEME: &str = "http";

/// `scheme:` per RFC 3986, unless the colon is followed by a digit,
/// in which case it is a `host:port` pair.
fn scheme_prefix() -> &'static Regex {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    SCHEME.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:(?:$|[^0-9])").expect("scheme regex is valid")
    })
}

pub fn has_scheme(raw: &str) -> bool {
    scheme_prefix().is_match(raw)
}

/// Prepend `http://` to input that carries no scheme of its own.
///
/// `www.example.com` becomes `http://www.example.com`;
/// `ftp://host` is left alone for the scheme check to reject.
pub fn normalize(raw: &str) -> String {
    if has_scheme(raw) {
        raw.to_owned()
    } else {
        format!("{DEFAULT_SCHEME}://{raw}")
    }
}

pub fn is_web_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// The last `/`-delimited component of the path,
/// `None` for an empty path or one ending in `/`.
pub fn terminal_segment(url: &Url) -> Option<&str> {
    url.path_segments()?
        .last()
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
}

/// [`terminal_segment`] percent-decoded for use as a local file name.
///
/// `my%20file.txt` becomes `my file.txt`. A segment that decodes to
/// something with a path separator or NUL, to `.`/`..`, or to invalid
/// UTF-8 is kept encoded, which never contains a separator.
pub fn file_name(url: &Url) -> Option<Cow<'_, str>> {
    let segment = terminal_segment(url)?;
    match percent_decode_str(segment).decode_utf8() {
        Ok(decoded) if is_plain_file_name(&decoded) => Some(decoded),
        _ => Some(Cow::Borrowed(segment)),
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !matches!(name, "" | "." | "..") && !name.contains(&['/', '\\', '\0'][..])
}
