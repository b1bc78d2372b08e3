use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::Algorithm;
use jsonwebtoken::jwk::Jwk;
use tracing::debug;

use crate::errors::AuthError;
use crate::jwks::JwksClient;
use crate::token::ParsedToken;
use crate::traits::KeyResolver;

/// Resolves keys for tokens of one algorithm from a [`JwksClient`].
#[derive(Debug, Clone)]
pub struct JwksKeyResolver {
    client: Arc<JwksClient>,
    algorithm: Algorithm,
}

impl JwksKeyResolver {
    #[must_use]
    pub fn new(client: Arc<JwksClient>, algorithm: Algorithm) -> Self {
        Self { client, algorithm }
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub fn client(&self) -> &Arc<JwksClient> {
        &self.client
    }
}

#[async_trait]
impl KeyResolver for JwksKeyResolver {
    async fn key_for_token(&self, token: &ParsedToken) -> Result<Jwk, AuthError> {
        let header = token.header()?;

        if let Err(err) = header.ensure_algorithm(self.algorithm) {
            debug!(alg = %header.alg, "Rejected token algorithm before key lookup");
            return Err(err);
        }

        self.client.resolve(header.key_id()).await
    }
}
