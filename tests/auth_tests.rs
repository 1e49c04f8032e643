//! Access token issuance and verification tests

use chrono::{Duration, Utc};
use serde_json::json;
use shelter_guru::auth::{Claims, Identity, TokenKeys};
use shelter_guru::config::AuthConfig;
use shelter_guru::error::Error;

fn keys() -> TokenKeys {
    TokenKeys::new(b"auth-tests-secret", Duration::days(1))
}

#[test]
fn test_jwt_token_creation() {
    let token = keys()
        .issue(&Identity::new("a@x.com", "guest"))
        .expect("Failed to create token");
    assert!(!token.is_empty());
    assert_eq!(token.split('.').count(), 3); // JWT format: header.payload.signature
}

#[test]
fn test_token_round_trips_claim() {
    let keys = keys();
    let identity = Identity::new("a@x.com", "guest");
    let token = keys.issue(&identity).unwrap();
    let claims = keys.verify(&token).expect("Failed to validate token");

    assert_eq!(claims.identity.email, "a@x.com");
    assert_eq!(claims.identity.role.as_deref(), Some("guest"));
    assert!(claims.identity.extra.is_empty());
}

#[test]
fn test_token_expires_after_one_day() {
    let keys = keys();
    let identity = Identity::new("a@x.com", "guest");

    // Still valid a minute before the day is up
    let fresh = keys
        .issue_at(&identity, Utc::now() - Duration::hours(23) - Duration::minutes(59))
        .unwrap();
    assert!(keys.verify(&fresh).is_ok());

    let stale = keys
        .issue_at(&identity, Utc::now() - Duration::days(1) - Duration::seconds(1))
        .unwrap();
    assert!(matches!(keys.verify(&stale), Err(Error::InvalidToken(_))));
}

#[test]
fn test_tokens_differ_but_claims_match() {
    let keys = keys();
    let identity = Identity::new("a@x.com", "guest");

    let first = keys
        .issue_at(&identity, Utc::now() - Duration::minutes(10))
        .unwrap();
    let second = keys.issue(&identity).unwrap();
    assert_ne!(first, second);

    let a = keys.verify(&first).unwrap();
    let b = keys.verify(&second).unwrap();
    assert_eq!(a.identity, b.identity);
    assert!(a.exp < b.exp);
}

#[test]
fn test_tampered_token_rejected() {
    let keys = keys();
    let token = keys.issue(&Identity::new("a@x.com", "guest")).unwrap();

    // Splice an admin payload signed elsewhere onto the genuine signature
    let attacker = TokenKeys::new(b"attacker-secret", Duration::days(1));
    let admin = attacker.issue(&Identity::new("admin@x.com", "admin")).unwrap();

    let genuine: Vec<&str> = token.split('.').collect();
    let forged_payload = admin.split('.').nth(1).unwrap();
    let forged = format!("{}.{}.{}", genuine[0], forged_payload, genuine[2]);

    assert!(matches!(keys.verify(&forged), Err(Error::InvalidToken(_))));
}

#[test]
fn test_wrong_secret_rejected() {
    let token = keys().issue(&Identity::new("a@x.com", "guest")).unwrap();
    let other = TokenKeys::new(b"some-other-secret", Duration::days(1));
    assert!(matches!(other.verify(&token), Err(Error::InvalidToken(_))));
}

#[test]
fn test_malformed_token_rejection() {
    assert!(keys().verify("not-a-jwt-token").is_err());
    assert!(keys().verify("").is_err());
}

#[test]
fn test_claims_new() {
    let identity = Identity::new("a@x.com", "host");
    let now = Utc::now();
    let claims = Claims::new(identity.clone(), now, Duration::days(1));

    assert_eq!(claims.identity, identity);
    assert_eq!(claims.iat, now.timestamp());
    assert_eq!(claims.exp, now.timestamp() + 86_400);
}

#[test]
fn test_keys_from_config() {
    let config = AuthConfig {
        access_token_secret: "from-config".to_string(),
        token_ttl_secs: 3600,
    };
    let keys = TokenKeys::from_config(&config);
    assert_eq!(keys.ttl(), Duration::hours(1));

    let token = keys.issue(&Identity::new("a@x.com", "guest")).unwrap();
    let claims = keys.verify(&token).unwrap();
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[test]
fn test_record_fields_become_claims() {
    let keys = keys();
    let record = json!({ "email": "a@x.com", "role": "host", "name": "Alice", "exp": 1 });
    let identity = Identity::from_record("a@x.com", record.as_object().unwrap());

    let claims = keys.verify(&keys.issue(&identity).unwrap()).unwrap();
    assert_eq!(claims.identity.extra.get("name"), Some(&json!("Alice")));
    assert!(claims.exp > 1);
}

#[test]
fn test_record_with_registered_claim_names_still_verifies() {
    let keys = keys();
    let record = json!({
        "email": "a@x.com",
        "role": "guest",
        "aud": "web",
        "iss": "somewhere",
        "nbf": Utc::now().timestamp() + 3600,
        "phone": "555",
    });
    let identity = Identity::from_record("a@x.com", record.as_object().unwrap());

    let claims = keys
        .verify(&keys.issue(&identity).unwrap())
        .expect("token issued for a stored user must verify");
    assert_eq!(claims.identity.email, "a@x.com");
    assert_eq!(claims.identity.extra.get("phone"), Some(&json!("555")));
}
