// Unit tests for credential issuance

use crate::auth::{Claims, TOKEN_LIFETIME, issue_token, issue_token_at};
use crate::error::TokenError;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

const SECRET_HEX: &str = "deadbeef";

/// **VALUE**: Verifies every issued credential expires exactly 600 seconds after issuance.
///
/// **WHY THIS MATTERS**: Execution-layer nodes reject tokens whose `iat` drifts too far
/// or whose lifetime is wrong. The subscriber never renews its token, so the window must
/// be exactly what the node expects.
///
/// **BUG THIS CATCHES**: Would catch an off-by-unit lifetime (ms vs s) or a hard-coded `exp`.
#[test]
fn given_valid_hex_secrets_when_token_issued_then_exp_minus_iat_is_600() {
    // GIVEN: Several valid hex secrets
    let secrets = [
        "deadbeef",
        "00",
        "0123456789abcdefABCDEF",
        "f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0",
    ];

    for secret in secrets {
        // WHEN: Issuing a token
        let credential = issue_token(secret).expect("valid secret should sign");

        // THEN: Lifetime is exactly 600 seconds
        let claims = credential.claims();
        assert_eq!(claims.exp - claims.iat, 600, "secret {secret}");
        assert_eq!(TOKEN_LIFETIME.as_secs(), 600);
    }
}

/// **VALUE**: Verifies the compact token really is HS256-signed with the decoded key bytes.
///
/// **WHY THIS MATTERS**: The node verifies with the raw key, not with the hex string. Signing
/// with the hex text would produce a token every node rejects with 401.
///
/// **BUG THIS CATCHES**: Would catch `EncodingKey::from_secret(secret.as_bytes())`.
#[test]
fn given_secret_when_token_issued_then_verifies_with_raw_key_bytes() {
    // GIVEN: A token issued at a fixed time in the future of any test clock
    let now = 4_000_000_000;
    let credential = issue_token_at(SECRET_HEX, now).expect("should sign");

    // WHEN: Verifying with the raw key bytes
    let key = hex::decode(SECRET_HEX).unwrap();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_aud = false;
    let decoded = decode::<Claims>(credential.token(), &DecodingKey::from_secret(&key), &validation)
        .expect("token should verify with raw key");

    // THEN: Header and claims match
    let header = decode_header(credential.token()).unwrap();
    assert_eq!(header.alg, Algorithm::HS256);
    assert_eq!(decoded.claims, Claims { iat: now, exp: now + 600 });
    assert_eq!(credential.token().matches('.').count(), 2, "compact JWS form");
}

/// **VALUE**: Verifies a non-hex secret fails with a decode error.
///
/// **WHY THIS MATTERS**: A mistyped SECRET_KEY must stop the run before any network
/// action; nothing after issuance is attempted.
///
/// **BUG THIS CATCHES**: Would catch falling back to signing with the raw string.
#[test]
fn given_non_hex_secret_when_token_issued_then_returns_decode_error() {
    for secret in ["not-hex", "abc", "zz", "0x1234"] {
        let result = issue_token(secret);

        assert!(
            matches!(result, Err(TokenError::Decode { .. })),
            "secret {secret:?} should fail to decode, got {result:?}"
        );
    }
}

/// **VALUE**: Verifies an empty key fails with a signing error.
///
/// **BUG THIS CATCHES**: Would catch issuing tokens signed with a zero-length HMAC key.
#[test]
fn given_empty_secret_when_token_issued_then_returns_signing_error() {
    let result = issue_token("");

    assert!(matches!(result, Err(TokenError::Signing { .. })));
}

/// **VALUE**: Verifies the credential never prints its token.
///
/// **BUG THIS CATCHES**: Would catch a derived Debug leaking the bearer token into logs.
#[test]
fn given_credential_when_formatted_then_token_is_hidden() {
    let credential = issue_token_at(SECRET_HEX, 1_700_000_000).unwrap();

    let debug = format!("{credential:?}");
    let display = format!("{credential}");

    assert!(!debug.contains(credential.token()));
    assert!(!display.contains(credential.token()));
    assert!(display.contains("exp=1700000600"));
    assert_eq!(credential.bearer(), format!("Bearer {}", credential.token()));
}

#[test]
fn given_claims_when_checked_against_clock_then_expire_at_exp() {
    let claims = Claims::issued_at(100);

    assert!(!claims.is_expired_at(699));
    assert!(claims.is_expired_at(700));
}
