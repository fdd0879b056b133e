//! Public JWK set document for external verifiers.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use serde::{Deserialize, Serialize};

/// One published RSA public key, RFC 7517 shaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type, always `RSA`
    pub kty: String,

    /// Usage, always `sig`
    #[serde(rename = "use")]
    pub use_: String,

    /// Signing algorithm, always `RS256`
    pub alg: String,

    /// Key identifier matching the JWT header `kid`
    pub kid: String,

    /// Modulus, base64url without padding, leading zeros stripped
    pub n: String,

    /// Public exponent, base64url without padding
    pub e: String,
}

/// The published key set document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Builds the document from `(kid, public key)` pairs.
    pub fn from_rsa_public_keys<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a RsaPublicKey)>,
    {
        let keys = keys
            .into_iter()
            .map(|(kid, public_key)| Jwk {
                kty: "RSA".to_string(),
                use_: "sig".to_string(),
                alg: "RS256".to_string(),
                kid: kid.to_string(),
                // to_bytes_be yields the minimal big-endian magnitude, so
                // no explicit leading-zero strip is needed
                n: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
                e: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
            })
            .collect();

        Self { keys }
    }

    /// Looks up a published key by id.
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|key| key.kid == kid)
    }
}
