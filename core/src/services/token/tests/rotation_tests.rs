//! Verification behavior across key rotation

use std::sync::Arc;

use care_shared::config::{JwtConfig, KeyRotationConfig};
use jsonwebtoken::decode_header;

use crate::domain::entities::claims::ClaimSet;
use crate::errors::{DomainError, TokenError};
use crate::repositories::MockKeyStore;
use crate::services::jwk::JwkKeyManager;
use crate::services::token::TokenService;

async fn manager_with(config: KeyRotationConfig) -> Arc<JwkKeyManager<MockKeyStore>> {
    let manager = JwkKeyManager::new(MockKeyStore::new(), config);
    manager.initialize().await.unwrap();
    Arc::new(manager)
}

#[tokio::test]
async fn token_issued_before_rotation_still_verifies() {
    let manager = manager_with(KeyRotationConfig::default()).await;
    let service = TokenService::new(Arc::clone(&manager), JwtConfig::default());

    let old_token = service
        .issue_access_token(42, &ClaimSet::with_roles(["PARENT"]))
        .await
        .unwrap();
    let old_kid = decode_header(&old_token).unwrap().kid.unwrap();

    manager.rotate_key().await.unwrap();

    let new_token = service
        .issue_access_token(42, &ClaimSet::default())
        .await
        .unwrap();
    let new_kid = decode_header(&new_token).unwrap().kid.unwrap();

    assert_ne!(old_kid, new_kid);
    assert_eq!(service.verify(&old_token).await.unwrap().sub, "42");
    assert_eq!(service.verify(&new_token).await.unwrap().sub, "42");
}

#[tokio::test]
async fn token_signed_by_unknown_key_is_rejected() {
    let foreign_manager = manager_with(KeyRotationConfig::default()).await;
    let foreign = TokenService::new(foreign_manager, JwtConfig::default());

    let local_manager = manager_with(KeyRotationConfig::default()).await;
    let local = TokenService::new(local_manager, JwtConfig::default());

    let token = foreign
        .issue_access_token(42, &ClaimSet::default())
        .await
        .unwrap();
    let result = local.verify(&token).await;

    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::UnknownKey))
    ));
}

#[tokio::test]
async fn token_of_pruned_key_is_rejected() {
    let config = KeyRotationConfig {
        max_keys: 1,
        ..KeyRotationConfig::default()
    };
    let manager = manager_with(config).await;
    let service = TokenService::new(Arc::clone(&manager), JwtConfig::default());

    let old_token = service
        .issue_access_token(42, &ClaimSet::default())
        .await
        .unwrap();

    manager.rotate_key().await.unwrap();

    let result = service.verify(&old_token).await;

    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::UnknownKey))
    ));
}

#[tokio::test]
async fn signature_from_another_key_is_rejected() {
    let manager = manager_with(KeyRotationConfig::default()).await;
    let service = TokenService::new(Arc::clone(&manager), JwtConfig::default());

    let old_token = service
        .issue_access_token(42, &ClaimSet::default())
        .await
        .unwrap();

    manager.rotate_key().await.unwrap();

    let new_token = service
        .issue_access_token(42, &ClaimSet::default())
        .await
        .unwrap();

    // Header and payload reference the new key, signature comes from the
    // old one.
    let mut parts: Vec<&str> = new_token.split('.').collect();
    let old_signature = old_token.rsplit('.').next().unwrap();
    parts[2] = old_signature;
    let forged = parts.join(".");

    let result = service.verify(&forged).await;

    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidSignature))
    ));
}
