#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use authkit::{JwksClient, JwksConfig};
use axum::Router;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

pub const ISSUER: &str = "https://id.example.com/";
pub const AUDIENCE: &str = "https://api.example.com";

pub const PRIVATE_KEY_A: &str = include_str!("../testdata/private_a.pem");
pub const PRIVATE_KEY_B: &str = include_str!("../testdata/private_b.pem");

/// Base64url RSA modulus of `private_a.pem`.
pub const MODULUS_A: &str = "3CMpYWP2yhRk7siDBPKXcsdtnqGZsmh-3BgxbBCihUNWbj9ldyPhrYUEc6kkn2HxNgVjDyRPuP0TkFXS4wy1Zbhor0yZMSpwimuXYhiteBXnq3Fs1Orw_bFvmoMti73GvQ3b0guJQKgOUeqKhW7v-VnB5F77wIVq8xbgerbf7cmFSORV_PWM1_yIHGuQafNC3JJMSyES0wLekOu0WdY_h-TvbXlqqgpaUXY2357IeMNssBwO3kpH0CkuqN1LePv_MCU_H-EmnmeJ48f5WVrWCPThViMOCWN2Knt78Jk5kmCeNzefMUpSx-U-fY7kK-gqjI5JogBZZqudo5toxH14PQ";

/// Base64url RSA modulus of `private_b.pem`.
pub const MODULUS_B: &str = "v_FvbgqfZSwHJNakEeCRyeccyU0IY-_tao2SATITytwNJYvk69jHwkm7Lqc48v-_xWUJEtE2DmX5eZ20Bc2QGwQ6ZKjV9GBLkujVIvJzGWj0YVBQqYLvnbfvrXZorIyN0Rc2SUVKv8ysl7ZDMMYuQcZaJQOpmI8lldFykYLxOu1q5LrUesCs8FoB5umAjgTL0lGYOJ8Jnh6DDkOHRtOeZPUTzg0aZrFO_Fkx91Bzdnk4vi9aqzdKRdzoWoP-fW9gzQ3C6PROh6lAzcKQ6nVVVSbhYtM0xs1mkgs7u_q7_0Vseecx6Tdzb4neKa0fi-jsi2XNMwuzDnXGgjpTuvP8lw";

pub fn jwk_json(kid: &str, modulus: &str) -> Value {
    json!({
        "kty": "RSA",
        "kid": kid,
        "alg": "RS256",
        "use": "sig",
        "n": modulus,
        "e": "AQAB",
    })
}

pub fn jwks_document(keys: &[(&str, &str)]) -> Value {
    let keys: Vec<Value> = keys
        .iter()
        .map(|(kid, modulus)| jwk_json(kid, modulus))
        .collect();
    json!({ "keys": keys })
}

pub fn json_response(body: &Value) -> Response {
    axum::Json(body.clone()).into_response()
}

pub fn now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

pub fn claims(aud: &[&str], exp: i64) -> Value {
    json!({
        "https://claims.example.com/username": "johndoe",
        "iss": ISSUER,
        "sub": "abcdef0123456789",
        "aud": aud,
        "iat": now() - 60,
        "exp": exp,
        "azp": "some-client-id",
        "scope": "openid offline_access",
        "gty": "password",
    })
}

pub fn sign(kid: &str, private_pem: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_owned());
    let key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).unwrap();
    jsonwebtoken::encode(&header, claims, &key).unwrap()
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

type Responder = Arc<dyn Fn(usize) -> Response + Send + Sync>;

/// In-process JWK Set endpoint that counts requests.
pub struct JwksServer {
    pub uri: String,
    hits: Arc<AtomicUsize>,
}

impl JwksServer {
    /// Serve `respond(n)` for the n-th request (zero based).
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(usize) -> Response + Send + Sync + 'static,
    {
        Self::start_with_delay(Duration::ZERO, respond).await
    }

    /// Same as [`JwksServer::start`], answering each request after `delay`.
    pub async fn start_with_delay<F>(delay: Duration, respond: F) -> Self
    where
        F: Fn(usize) -> Response + Send + Sync + 'static,
    {
        init_tracing();

        let hits = Arc::new(AtomicUsize::new(0));
        let respond: Responder = Arc::new(respond);

        let counter = hits.clone();
        let app = Router::new().route(
            "/.well-known/jwks.json",
            get(move || {
                let counter = counter.clone();
                let respond = respond.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(delay).await;
                    respond(n)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            uri: format!("http://{addr}/.well-known/jwks.json"),
            hits,
        }
    }

    /// Serve the same document for every request.
    pub async fn serving(document: Value) -> Self {
        Self::start(move |_| json_response(&document)).await
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn client(&self) -> JwksClient {
        JwksClient::new(&JwksConfig::new(self.uri.clone())).unwrap()
    }
}
