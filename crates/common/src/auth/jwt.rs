use crate::auth::{CredentialProvider, JwtConfig};
use crate::domain::{Credential, CredentialError, Identity};
use chrono::{SubsecRound, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Claims carried by a device JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceJwtClaims {
    pub iat: i64, // issued at timestamp
    pub exp: i64, // expiration timestamp
    pub aud: String, // project id
}

/// Signing algorithms accepted for device credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningAlgorithm {
    Rs256,
    Es256,
}

impl SigningAlgorithm {
    pub fn parse(name: &str) -> Result<Self, CredentialError> {
        match name.trim().to_ascii_uppercase().as_str() {
            "RS256" => Ok(SigningAlgorithm::Rs256),
            "ES256" => Ok(SigningAlgorithm::Es256),
            _ => Err(CredentialError::UnsupportedAlgorithm(name.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SigningAlgorithm::Rs256 => "RS256",
            SigningAlgorithm::Es256 => "ES256",
        }
    }

    fn jwt_algorithm(self) -> Algorithm {
        match self {
            SigningAlgorithm::Rs256 => Algorithm::RS256,
            SigningAlgorithm::Es256 => Algorithm::ES256,
        }
    }

    fn encoding_key(self, pem: &[u8]) -> Result<EncodingKey, CredentialError> {
        let key = match self {
            SigningAlgorithm::Rs256 => EncodingKey::from_rsa_pem(pem),
            SigningAlgorithm::Es256 => EncodingKey::from_ec_pem(pem),
        };
        key.map_err(|e| CredentialError::InvalidKeyMaterial {
            algorithm: self.as_str().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Issues Cloud IoT style device JWTs signed with a PEM private key read from disk
pub struct JwtCredentialProvider {
    config: JwtConfig,
}

impl JwtCredentialProvider {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    fn read_key_material(&self, reference: &str) -> Result<Vec<u8>, CredentialError> {
        let path = self.config.key_path(reference);
        std::fs::read(&path).map_err(|e| CredentialError::KeyUnreadable {
            reference: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl CredentialProvider for JwtCredentialProvider {
    #[instrument(skip_all, fields(device_id = %identity.device_id, algorithm = %identity.algorithm))]
    fn issue(&self, identity: &Identity) -> Result<Credential, CredentialError> {
        let algorithm = SigningAlgorithm::parse(&identity.algorithm)?;
        let pem = self.read_key_material(&identity.private_key_reference)?;
        let key = algorithm.encoding_key(&pem)?;

        // JWT timestamps have second resolution
        let issued_at = Utc::now().trunc_subsecs(0);
        let expires_at = issued_at
            .checked_add_signed(self.config.token_lifetime())
            .ok_or_else(|| {
                CredentialError::SigningFailed("token expiry out of range".to_string())
            })?;

        let claims = DeviceJwtClaims {
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            aud: identity.project_id.clone(),
        };

        let token = encode(&Header::new(algorithm.jwt_algorithm()), &claims, &key)
            .map_err(|e| CredentialError::SigningFailed(e.to_string()))?;

        debug!(expires_at = %expires_at, "issued device credential");
        Ok(Credential::new(token, issued_at, expires_at))
    }
}
