//! Session token inspection.
//!
//! The session token is a JWT issued by the backend. The client only reads
//! its payload to decide navigation; the signature is never checked and
//! every decision made here is re-enforced server-side.

use crate::clock::Clock;
use crate::error::{Error, Result};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "accessToken";

/// Role granting access to `/admin` pages.
pub const ADMIN_ROLE: &str = "ADMIN";

/// URL-safe alphabet, accepting payloads with or without `=` padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims the client cares about.
///
/// Every field is read leniently: a claim of an unexpected type reads as
/// absent.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Claims {
    /// Username.
    #[serde(default, deserialize_with = "string_or_number")]
    pub sub: Option<String>,
    #[serde(rename = "userId", default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    /// Granted roles. The backend joins them with commas into one string;
    /// a JSON list of names or of `{"authority": ...}` objects is accepted
    /// as well.
    #[serde(default, deserialize_with = "roles_from_string_or_list")]
    pub roles: Vec<String>,
    /// Expiry in seconds since the Unix epoch.
    #[serde(default, deserialize_with = "numeric")]
    pub exp: Option<f64>,
}

impl Claims {
    /// `exp` is present and strictly in the future.
    pub fn is_live(&self, now_secs: f64) -> bool {
        matches!(self.exp, Some(exp) if exp > now_secs)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn numeric<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        _ => None,
    })
}

fn roles_from_string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(role) => Some(role),
                Value::Object(mut grant) => match grant.remove("authority") {
                    Some(Value::String(role)) => Some(role),
                    _ => None,
                },
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Decode the payload segment of `token` without verifying it.
///
/// # Errors
///
/// Returns `Error::InvalidToken` when the token has no payload segment, the
/// segment is not base64url, or it does not hold a JSON object.
pub fn decode_claims(token: &str) -> Result<Claims> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| Error::InvalidToken("missing payload segment".to_string()))?;

    let bytes = URL_SAFE_LENIENT
        .decode(payload)
        .map_err(|e| Error::InvalidToken(format!("payload is not base64url: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| Error::InvalidToken(format!("payload is not a claims object: {}", e)))
}

/// True if `token` decodes and its `exp` lies after `clock`'s now.
///
/// Never fails: undecodable tokens are logged and reported invalid.
pub fn is_valid(token: &str, clock: &dyn Clock) -> bool {
    match decode_claims(token) {
        Ok(claims) => claims.is_live(clock.now_secs()),
        Err(e) => {
            warn!("Error validating token: {}", e);
            false
        }
    }
}

/// True if `token` carries the admin role. Expiry is not checked.
pub fn is_admin(token: &str) -> bool {
    match decode_claims(token) {
        Ok(claims) => claims.is_admin(),
        Err(e) => {
            warn!("Error validating admin role: {}", e);
            false
        }
    }
}

/// Username (`sub`) from `token`, if decodable.
pub fn username(token: &str) -> Option<String> {
    decode_claims(token).ok()?.sub
}

/// Backend user id (`userId`) from `token`, if decodable.
pub fn user_id(token: &str) -> Option<String> {
    decode_claims(token).ok()?.user_id
}

/// Build an unsigned token around `claims_json`. For tests and fixtures.
pub fn unsigned_token(claims_json: &str) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    format!(
        "{}.{}.",
        engine.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        engine.encode(claims_json)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const NOW_MILLIS: i64 = 1_700_000_000_000;

    fn token_expiring_at(exp: i64) -> String {
        unsigned_token(&format!(
            r#"{{"sub":"ronan","userId":"u-1","roles":"USER","exp":{}}}"#,
            exp
        ))
    }

    #[test]
    fn test_expiry_boundaries() {
        let clock = ManualClock::new(NOW_MILLIS);
        let now = NOW_MILLIS / 1000;

        assert!(is_valid(&token_expiring_at(now + 1), &clock));
        assert!(!is_valid(&token_expiring_at(now - 1), &clock));
        assert!(!is_valid(&token_expiring_at(now), &clock));
    }

    #[test]
    fn test_missing_exp_is_invalid() {
        let clock = ManualClock::new(NOW_MILLIS);
        let token = unsigned_token(r#"{"sub":"ronan"}"#);
        assert!(!is_valid(&token, &clock));
    }

    #[test]
    fn test_garbage_is_invalid_without_panic() {
        let clock = ManualClock::new(NOW_MILLIS);
        for token in ["", "abc", "a.%%%%.c", "a..c", "a.bm90IGpzb24.c"] {
            assert!(!is_valid(token, &clock), "{:?} should be invalid", token);
        }
        assert!(matches!(
            decode_claims("a.%%%%.c"),
            Err(Error::InvalidToken(_))
        ));
    }

    #[test]
    fn test_padded_payload_accepted() {
        let engine = base64::engine::general_purpose::URL_SAFE;
        let token = format!("h.{}.s", engine.encode(r#"{"sub":"ab"}"#));
        assert!(token.contains('='));
        assert_eq!(username(&token).as_deref(), Some("ab"));
    }

    #[test]
    fn test_roles_joined_or_listed() {
        let joined = unsigned_token(r#"{"roles":"USER,ADMIN"}"#);
        let listed = unsigned_token(r#"{"roles":["ADMIN"]}"#);
        let plain = unsigned_token(r#"{"roles":"USER"}"#);

        assert!(is_admin(&joined));
        assert!(is_admin(&listed));
        assert!(!is_admin(&plain));
        assert!(!is_admin("not-a-token"));
    }

    #[test]
    fn test_admin_requires_exact_role() {
        for roles in [r#"["SUPERADMIN"]"#, r#""NOT_ADMIN,USER""#, r#"["admin"]"#] {
            let token = unsigned_token(&format!(r#"{{"roles":{}}}"#, roles));
            assert!(!is_admin(&token), "{} should not be admin", roles);
        }
        let token = unsigned_token(r#"{"roles":["SUPERADMIN","ADMIN"]}"#);
        assert!(is_admin(&token));
    }

    #[test]
    fn test_unexpected_claim_types_do_not_invalidate() {
        let clock = ManualClock::new(NOW_MILLIS);
        let exp = NOW_MILLIS / 1000 + 3600;

        let numeric_id = unsigned_token(&format!(
            r#"{{"sub":"ronan","userId":42,"roles":"USER","exp":{}}}"#,
            exp
        ));
        assert!(is_valid(&numeric_id, &clock));
        assert_eq!(user_id(&numeric_id).as_deref(), Some("42"));

        let authorities = unsigned_token(&format!(
            r#"{{"roles":[{{"authority":"USER"}},{{"authority":"ADMIN"}}],"exp":{}}}"#,
            exp
        ));
        assert!(is_valid(&authorities, &clock));
        assert!(is_admin(&authorities));

        let odd = unsigned_token(&format!(
            r#"{{"sub":{{"name":"x"}},"userId":null,"roles":7,"exp":{}}}"#,
            exp
        ));
        let claims = decode_claims(&odd).expect("Failed to decode claims");
        assert!(claims.is_live(clock.now_secs()));
        assert_eq!(claims.sub, None);
        assert!(claims.roles.is_empty());

        let text_exp = unsigned_token(r#"{"exp":"1700003600"}"#);
        assert!(!is_valid(&text_exp, &clock));
    }

    #[test]
    fn test_claim_helpers() {
        let token = token_expiring_at(0);
        assert_eq!(username(&token).as_deref(), Some("ronan"));
        assert_eq!(user_id(&token).as_deref(), Some("u-1"));
        assert_eq!(username("junk"), None);
    }
}
