//! Key material and token builders shared by unit tests.

use jsonwebtoken::jwk::Jwk;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

pub const ISSUER: &str = "https://id.example.com/";
pub const AUDIENCE: &str = "https://api.example.com";

pub const PRIVATE_KEY_A: &str = include_str!("../tests/testdata/private_a.pem");
pub const PRIVATE_KEY_B: &str = include_str!("../tests/testdata/private_b.pem");

/// Base64url RSA modulus of `private_a.pem`.
pub const MODULUS_A: &str = "3CMpYWP2yhRk7siDBPKXcsdtnqGZsmh-3BgxbBCihUNWbj9ldyPhrYUEc6kkn2HxNgVjDyRPuP0TkFXS4wy1Zbhor0yZMSpwimuXYhiteBXnq3Fs1Orw_bFvmoMti73GvQ3b0guJQKgOUeqKhW7v-VnB5F77wIVq8xbgerbf7cmFSORV_PWM1_yIHGuQafNC3JJMSyES0wLekOu0WdY_h-TvbXlqqgpaUXY2357IeMNssBwO3kpH0CkuqN1LePv_MCU_H-EmnmeJ48f5WVrWCPThViMOCWN2Knt78Jk5kmCeNzefMUpSx-U-fY7kK-gqjI5JogBZZqudo5toxH14PQ";

pub fn jwk(kid: &str, modulus: &str) -> Jwk {
    serde_json::from_value(json!({
        "kty": "RSA",
        "kid": kid,
        "alg": "RS256",
        "use": "sig",
        "n": modulus,
        "e": "AQAB",
    }))
    .unwrap()
}

pub fn claims_expiring_at(exp: i64) -> Value {
    json!({
        "iss": ISSUER,
        "sub": "abcdef0123456789",
        "aud": [AUDIENCE],
        "iat": 1_522_994_598,
        "exp": exp,
        "azp": "some-client-id",
        "scope": "openid offline_access",
    })
}

pub fn sign(kid: &str, private_pem: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_owned());
    let key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).unwrap();
    jsonwebtoken::encode(&header, claims, &key).unwrap()
}

pub fn sign_hs256(kid: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(kid.to_owned());
    jsonwebtoken::encode(&header, claims, &EncodingKey::from_secret(b"shared-secret")).unwrap()
}
