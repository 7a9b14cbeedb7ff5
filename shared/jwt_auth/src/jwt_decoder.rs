use crate::{dto::Claims, error::Error, util};
use anyhow::anyhow;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

///
/// Verifies access tokens and extracts their claims.
///
pub struct JwtDecoder {
    key: DecodingKey,
    validation: Validation,
}

impl JwtDecoder {
    ///
    /// Algorithms must belong to the same family
    /// because all of them are verified with the same key.
    ///
    pub fn new(algorithms: Vec<Algorithm>, key: DecodingKey) -> anyhow::Result<Self> {
        let algorithm = algorithms
            .first()
            .ok_or(anyhow!("at least one jwt algorithm is required"))?;

        let mut validation = Validation::new(*algorithm);
        validation.algorithms = algorithms;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self { key, validation })
    }

    ///
    /// Parses both values the way they are stored in environment variables.
    ///
    pub fn parse(jwt_algorithms: String, jwt_key: String) -> anyhow::Result<Self> {
        let algorithms = util::parse_jwt_algorithms(jwt_algorithms)?;
        let algorithm = algorithms
            .first()
            .ok_or(anyhow!("at least one jwt algorithm is required"))?;
        let key = util::parse_jwt_key(algorithm, jwt_key)?;

        Self::new(algorithms, key)
    }

    ///
    /// ### Errors
    /// - [Error::InvalidToken] when
    ///     - signature does not match
    ///     - token expired
    ///     - `sub` or `exp` claim is missing
    ///
    pub fn decode(&self, token: &str) -> Result<Claims, Error> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)?;
        tracing::trace!(sub = %data.claims.sub, "decoded jwt");

        Ok(data.claims)
    }
}
