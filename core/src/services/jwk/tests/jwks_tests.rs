//! Published JWK set tests

use care_shared::config::KeyRotationConfig;

use crate::repositories::MockKeyStore;
use crate::services::jwk::JwkKeyManager;

fn is_base64url(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[tokio::test]
async fn jwk_set_publishes_every_retained_key() {
    let manager = JwkKeyManager::new(MockKeyStore::new(), KeyRotationConfig::default());
    manager.initialize().await.unwrap();
    let first = manager.current_key_id().await.unwrap();
    let second = manager.rotate_key().await.unwrap();

    let set = manager.public_jwk_set().await;

    assert_eq!(set.keys.len(), 2);
    assert!(set.find(&first).is_some());
    assert!(set.find(&second).is_some());
}

#[tokio::test]
async fn published_keys_have_the_rfc7517_shape() {
    let manager = JwkKeyManager::new(MockKeyStore::new(), KeyRotationConfig::default());
    manager.initialize().await.unwrap();

    let set = manager.public_jwk_set().await;
    let jwk = &set.keys[0];

    assert_eq!(jwk.kty, "RSA");
    assert_eq!(jwk.use_, "sig");
    assert_eq!(jwk.alg, "RS256");
    assert!(is_base64url(&jwk.n));
    // F4 exponent 65537
    assert_eq!(jwk.e, "AQAB");

    // 2048-bit modulus is 256 bytes, 342 base64url chars unpadded.
    assert_eq!(jwk.n.len(), 342);
}

#[tokio::test]
async fn serialized_form_uses_the_use_member_name() {
    let manager = JwkKeyManager::new(MockKeyStore::new(), KeyRotationConfig::default());
    manager.initialize().await.unwrap();

    let set = manager.public_jwk_set().await;
    let json = serde_json::to_string(&set).unwrap();

    assert!(json.contains("\"use\":\"sig\""));
    assert!(!json.contains("use_"));
    assert!(!json.contains("PRIVATE KEY"));
}

#[tokio::test]
async fn uninitialized_manager_publishes_an_empty_set() {
    let manager = JwkKeyManager::new(MockKeyStore::new(), KeyRotationConfig::default());

    let set = manager.public_jwk_set().await;

    assert!(set.keys.is_empty());
}

#[tokio::test]
async fn find_misses_on_unknown_kid() {
    let manager = JwkKeyManager::new(MockKeyStore::new(), KeyRotationConfig::default());
    manager.initialize().await.unwrap();

    let set = manager.public_jwk_set().await;

    assert!(set.find("no-such-key").is_none());
}
