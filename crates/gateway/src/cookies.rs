//! Reading and writing the persisted credential slots as cookies.
//!
//! Values are percent-encoded on write and decoded on read so script-side
//! cookie libraries and the gateway agree on the stored bytes.

use std::borrow::Cow;

use axum::http::{HeaderMap, header::COOKIE};
use chrono::Duration;

use portalguard_core::{Credential, CredentialPolicy, CredentialSlot};

/// First non-blank cookie called `name` across all `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<Credential> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, _)| key.trim() == name)
        .find_map(|(_, value)| {
            let value = value.trim().trim_matches('"');
            let decoded = urlencoding::decode(value)
                .map(Cow::into_owned)
                .unwrap_or_else(|_| value.to_string());
            Credential::parse(decoded)
        })
}

pub fn read_slot(headers: &HeaderMap, policy: &CredentialPolicy, slot: CredentialSlot) -> Option<Credential> {
    read_cookie(headers, policy.slot_name(slot))
}

/// `Set-Cookie` value storing `credential` in `slot` for `lifetime`.
pub fn set_cookie(
    policy: &CredentialPolicy,
    slot: CredentialSlot,
    credential: &Credential,
    lifetime: Duration,
) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; SameSite={}",
        policy.slot_name(slot),
        urlencoding::encode(credential.as_str()),
        policy.path,
        lifetime.num_seconds().max(0),
        policy.same_site.as_str(),
    );
    if policy.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that deletes `slot`.
pub fn clear_cookie(policy: &CredentialPolicy, slot: CredentialSlot) -> String {
    let mut cookie = format!(
        "{}=; Path={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; SameSite={}",
        policy.slot_name(slot),
        policy.path,
        policy.same_site.as_str(),
    );
    if policy.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(values: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for v in values {
            headers.append(COOKIE, HeaderValue::from_str(v).unwrap());
        }
        headers
    }

    #[test]
    fn reads_named_cookie_across_headers() {
        let h = headers(&["theme=dark; other=1", "auth_token=abc.def%3D; x=y"]);
        assert_eq!(read_cookie(&h, "auth_token").unwrap().as_str(), "abc.def=");
        assert!(read_cookie(&h, "refresh_token").is_none());
    }

    #[test]
    fn blank_cookie_is_absent() {
        let h = headers(&["auth_token=; auth_token=real"]);
        assert_eq!(read_cookie(&h, "auth_token").unwrap().as_str(), "real");
        assert!(read_cookie(&headers(&["auth_token="]), "auth_token").is_none());
    }

    #[test]
    fn set_cookie_is_script_readable_and_lax() {
        let policy = CredentialPolicy::default();
        let credential = Credential::parse("tok en").unwrap();
        let cookie = set_cookie(&policy, CredentialSlot::Primary, &credential, Duration::days(7));

        assert_eq!(cookie, "auth_token=tok%20en; Path=/; Max-Age=604800; SameSite=Lax");
        assert!(!cookie.contains("HttpOnly"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let policy = CredentialPolicy {
            secure: true,
            ..CredentialPolicy::default()
        };
        let cookie = clear_cookie(&policy, CredentialSlot::Refresh);
        assert!(cookie.starts_with("refresh_token=; Path=/; Max-Age=0;"));
        assert!(cookie.ends_with("; Secure"));
    }
}
