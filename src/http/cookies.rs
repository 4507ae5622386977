//! Set-Cookie relay and session cookie clearing.
//!
//! Cookies issued by the backend are copied onto the gateway's response with
//! every attribute untouched. A backend (or an intermediary) may fold several
//! cookies into one comma-joined header line; those are split only at commas
//! followed by `token=`, because `Expires` dates contain commas too.

use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue};

/// Split a comma-joined `Set-Cookie` value into individual cookies.
///
/// `"a=1, Expires=Wed, 09 Jun 2025 10:18:14 GMT; b=2"` yields
/// `["a=1", "Expires=Wed, 09 Jun 2025 10:18:14 GMT; b=2"]`.
pub fn split_combined_set_cookie(raw: &str) -> Vec<String> {
    let mut cookies = Vec::new();
    let mut start = 0;

    for (idx, ch) in raw.char_indices() {
        if ch == ',' && starts_with_cookie_pair(&raw[idx + 1..]) {
            push_trimmed(&mut cookies, &raw[start..idx]);
            start = idx + 1;
        }
    }
    push_trimmed(&mut cookies, &raw[start..]);

    cookies
}

fn push_trimmed(cookies: &mut Vec<String>, part: &str) {
    let part = part.trim();
    if !part.is_empty() {
        cookies.push(part.to_string());
    }
}

/// True if `rest` (after optional whitespace) begins with `token=`.
fn starts_with_cookie_pair(rest: &str) -> bool {
    let rest = rest.trim_start();
    let name_len = rest.bytes().take_while(|b| is_token_byte(*b)).count();
    name_len > 0 && rest.as_bytes().get(name_len) == Some(&b'=')
}

/// RFC 7230 `tchar`.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// Every cookie set by `headers`, one directive per entry.
///
/// Several `Set-Cookie` lines are taken as-is; a single line is split as a
/// possibly comma-joined value.
pub fn collect_set_cookies(headers: &HeaderMap) -> Vec<HeaderValue> {
    let values: Vec<&HeaderValue> = headers.get_all(SET_COOKIE).iter().collect();

    match values.as_slice() {
        [] => Vec::new(),
        [single] => match single.to_str() {
            Ok(raw) => split_combined_set_cookie(raw)
                .into_iter()
                .filter_map(|cookie| HeaderValue::from_str(&cookie).ok())
                .collect(),
            Err(_) => vec![(*single).clone()],
        },
        many => many
            .iter()
            .filter(|v| !v.is_empty())
            .map(|v| (*v).clone())
            .collect(),
    }
}

/// Append every cookie set by `source` onto `dest`.
///
/// A missing side or a source without cookies is a no-op. Returns the number
/// of cookies relayed.
pub fn relay_set_cookies(source: Option<&HeaderMap>, dest: Option<&mut HeaderMap>) -> usize {
    let (Some(source), Some(dest)) = (source, dest) else {
        return 0;
    };

    let cookies = collect_set_cookies(source);
    let count = cookies.len();
    for cookie in cookies {
        dest.append(SET_COOKIE, cookie);
    }
    count
}

/// A directive that expires `name` in the browser.
///
/// Production needs `Secure; SameSite=None` for cross-site delivery between
/// the admin site and the API origin; elsewhere `SameSite=Lax` over plain HTTP.
pub fn clearing_cookie(name: &str, production: bool) -> String {
    let site = if production {
        "; Secure; SameSite=None"
    } else {
        "; SameSite=Lax"
    };
    format!("{name}=; Path=/; Max-Age=0; HttpOnly{site}")
}
