//! Issuance and verification round-trip tests

use std::sync::Arc;

use care_shared::config::{JwtConfig, KeyRotationConfig};

use crate::domain::entities::claims::ClaimSet;
use crate::errors::{DomainError, TokenError};
use crate::repositories::MockKeyStore;
use crate::services::jwk::JwkKeyManager;
use crate::services::token::TokenService;

async fn manager() -> Arc<JwkKeyManager<MockKeyStore>> {
    let manager = JwkKeyManager::new(MockKeyStore::new(), KeyRotationConfig::default());
    manager.initialize().await.unwrap();
    Arc::new(manager)
}

fn service(
    manager: Arc<JwkKeyManager<MockKeyStore>>,
    config: JwtConfig,
) -> TokenService<MockKeyStore> {
    TokenService::new(manager, config)
}

#[tokio::test]
async fn access_token_round_trip_preserves_claims() {
    let service = service(manager().await, JwtConfig::default());
    let claims = ClaimSet::with_roles(["PARENT"]);

    let token = service.issue_access_token(42, &claims).await.unwrap();
    let verified = service.verify(&token).await.unwrap();

    assert_eq!(verified.sub, "42");
    assert_eq!(verified.iss, "parent-care-service");
    assert_eq!(verified.roles, vec!["PARENT"]);
    assert_eq!(verified.exp - verified.iat, 900);
    assert_eq!(verified.user_id().unwrap(), 42);
}

#[tokio::test]
async fn impersonator_claim_survives_round_trip() {
    let service = service(manager().await, JwtConfig::default());
    let claims = ClaimSet {
        roles: vec![String::from("ADMIN")],
        impersonator_id: Some(7),
    };

    let token = service.issue_access_token(42, &claims).await.unwrap();
    let verified = service.verify(&token).await.unwrap();

    assert_eq!(verified.impersonator_id.as_deref(), Some("7"));
}

#[tokio::test]
async fn refresh_token_uses_refresh_ttl() {
    let service = service(manager().await, JwtConfig::default());

    let token = service
        .issue_refresh_token(42, &ClaimSet::default())
        .await
        .unwrap();
    let verified = service.verify(&token).await.unwrap();

    assert_eq!(verified.exp - verified.iat, 14 * 24 * 60 * 60);
}

#[tokio::test]
async fn garbage_input_is_malformed() {
    let service = service(manager().await, JwtConfig::default());

    let result = service.verify("not-a-jwt").await;

    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::Malformed))
    ));
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let config = JwtConfig {
        access_token_ttl_secs: -5,
        ..JwtConfig::default()
    };
    let service = service(manager().await, config);

    let token = service
        .issue_access_token(42, &ClaimSet::default())
        .await
        .unwrap();
    let result = service.verify(&token).await;

    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::Expired))
    ));
}

#[tokio::test]
async fn foreign_issuer_is_rejected() {
    let manager = manager().await;
    let issuing = service(
        Arc::clone(&manager),
        JwtConfig {
            issuer: String::from("someone-else"),
            ..JwtConfig::default()
        },
    );
    let verifying = service(manager, JwtConfig::default());

    let token = issuing
        .issue_access_token(42, &ClaimSet::default())
        .await
        .unwrap();
    let result = verifying.verify(&token).await;

    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::IssuerMismatch))
    ));
}

#[tokio::test]
async fn extract_subject_returns_user_id() {
    let service = service(manager().await, JwtConfig::default());

    let token = service
        .issue_access_token(42, &ClaimSet::default())
        .await
        .unwrap();

    assert_eq!(service.extract_subject(&token).await.unwrap(), "42");
}
