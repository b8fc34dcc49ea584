//! # Wallet Login Flow
//!
//! Drives lc-01 through the node runtime container the way an HTTP layer
//! would: request a nonce, sign the challenge with a wallet key, log in,
//! then present the bearer credential.
//!
//! ## Flow Tested:
//!
//! 1. **Nonce issuance**: challenge message embeds nonce and timestamp
//! 2. **Login**: EIP-191 signature recovered to the claimed address
//! 3. **Session**: bearer credential authenticates until expiry
//! 4. **Rejections**: replay, stale timestamp, tampered message, wrong signer

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lc_01_wallet_auth::{
        AuthError, LoginRequest, WalletAuthApi, WalletKey, recover_address,
    };
    use lc_02_heartbeat::{InMemoryVaultDirectory, RecordingChainGateway};
    use node_runtime::container::{NodeConfig, SubsystemContainer};
    use shared_types::{ManualTimeSource, TimeSource};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const NOW: i64 = 1_700_000_000;
    const SECRET: &[u8] = b"integration-secret-integration-secret";

    /// Well-known development key and its checksummed address
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    struct Node {
        clock: Arc<ManualTimeSource>,
        container: SubsystemContainer,
    }

    async fn node() -> Node {
        let clock = Arc::new(ManualTimeSource::new(NOW));
        let time: Arc<dyn TimeSource> = clock.clone();
        let container = SubsystemContainer::with_ports(
            NodeConfig::with_secret(SECRET.to_vec()),
            Arc::new(RecordingChainGateway::with_clock(time.clone())),
            Arc::new(InMemoryVaultDirectory::new()),
            time,
        )
        .await
        .expect("container wiring");
        Node { clock, container }
    }

    async fn signed_request(node: &Node, wallet: &WalletKey) -> LoginRequest {
        let issuance = node.container.auth.request_nonce().await.unwrap();
        let signature = wallet.sign_personal(&issuance.message).unwrap();
        LoginRequest {
            address: wallet.address().to_checksum(),
            signature: signature.to_hex(),
            message: issuance.message,
            nonce: issuance.nonce,
            timestamp: issuance.timestamp,
        }
    }

    // =============================================================================
    // HAPPY PATH
    // =============================================================================

    #[tokio::test]
    async fn test_login_issues_working_session() {
        let node = node().await;
        let wallet = WalletKey::from_hex(DEV_KEY).unwrap();
        assert_eq!(wallet.address().to_checksum(), DEV_ADDRESS);

        let request = signed_request(&node, &wallet).await;
        assert!(request.message.starts_with("Login to LegacyChain\nNonce: "));
        assert!(request.message.ends_with(&format!("Timestamp: {NOW}")));

        let response = node.container.auth.login(request).await.unwrap();
        assert_eq!(response.identity.address, wallet.address());
        assert_eq!(response.identity.created_at, NOW);
        assert_eq!(response.expires_at, NOW + 86_400);

        let claims = node
            .container
            .auth
            .authenticate_bearer(&format!("Bearer {}", response.token))
            .unwrap();
        assert_eq!(claims.address, wallet.address());
        assert_eq!(claims.expires_at, response.expires_at);

        let identity = node
            .container
            .auth
            .current_identity(&claims.address)
            .await
            .unwrap();
        assert_eq!(identity.address, wallet.address());
    }

    #[tokio::test]
    async fn test_relogin_keeps_first_seen_time() {
        let node = node().await;
        let wallet = WalletKey::random();

        let request = signed_request(&node, &wallet).await;
        node.container.auth.login(request).await.unwrap();

        node.clock.advance(120);
        let request = signed_request(&node, &wallet).await;
        let response = node.container.auth.login(request).await.unwrap();

        assert_eq!(response.identity.created_at, NOW);
        assert_eq!(response.expires_at, NOW + 120 + 86_400);
    }

    #[tokio::test]
    async fn test_login_response_serializes_camel_case() {
        let node = node().await;
        let wallet = WalletKey::random();
        let request = signed_request(&node, &wallet).await;

        let response = node.container.auth.login(request).await.unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["expiresAt"], NOW + 86_400);
        assert_eq!(json["identity"]["createdAt"], NOW);
        assert!(json["token"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn test_signature_recovers_through_free_functions() {
        let wallet = WalletKey::from_hex(DEV_KEY).unwrap();
        let signature = wallet.sign_personal("Hello World").unwrap();

        let recovered = recover_address("Hello World", &signature.to_hex()).unwrap();
        assert_eq!(recovered.to_checksum(), DEV_ADDRESS);
    }

    // =============================================================================
    // REJECTIONS
    // =============================================================================

    #[tokio::test]
    async fn test_replayed_login_rejected() {
        let node = node().await;
        let wallet = WalletKey::random();
        let request = signed_request(&node, &wallet).await;

        node.container.auth.login(request.clone()).await.unwrap();
        let err = node.container.auth.login(request).await.unwrap_err();

        assert_eq!(err, AuthError::Replay);
        assert_eq!(err.public_message(), "unauthorized");
    }

    #[tokio::test]
    async fn test_stale_challenge_rejected() {
        let node = node().await;
        let wallet = WalletKey::random();
        let request = signed_request(&node, &wallet).await;

        node.clock.advance(301);
        let err = node.container.auth.login(request).await.unwrap_err();
        assert!(matches!(err, AuthError::Expired { age: 301, max_age: 300 }));
    }

    #[tokio::test]
    async fn test_tampered_message_burns_nonce() {
        let node = node().await;
        let wallet = WalletKey::random();
        let request = signed_request(&node, &wallet).await;

        let mut tampered = request.clone();
        tampered.message.push_str("\nAmount: 1000");
        let err = node.container.auth.login(tampered).await.unwrap_err();
        assert_eq!(err, AuthError::MessageMismatch);

        // The nonce was consumed by the failed attempt
        let err = node.container.auth.login(request).await.unwrap_err();
        assert_eq!(err, AuthError::Replay);
    }

    #[tokio::test]
    async fn test_signature_from_other_wallet_rejected() {
        let node = node().await;
        let claimed = WalletKey::random();
        let signer = WalletKey::random();

        let mut request = signed_request(&node, &signer).await;
        request.address = claimed.address().to_lower_hex();

        let err = node.container.auth.login(request).await.unwrap_err();
        assert_eq!(err, AuthError::AddressMismatch);
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_session_expires() {
        let node = node().await;
        let wallet = WalletKey::random();
        let request = signed_request(&node, &wallet).await;
        let response = node.container.auth.login(request).await.unwrap();
        let header = format!("Bearer {}", response.token);

        node.clock.advance(86_399);
        assert!(node.container.auth.authenticate_bearer(&header).is_ok());

        node.clock.advance(1);
        let err = node.container.auth.authenticate_bearer(&header).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredential(_)));
    }

    #[tokio::test]
    async fn test_credential_from_other_secret_rejected() {
        let node = node().await;
        let other = {
            let clock: Arc<dyn TimeSource> = Arc::new(ManualTimeSource::new(NOW));
            SubsystemContainer::with_ports(
                NodeConfig::with_secret(b"another-secret-another-secret-another".to_vec()),
                Arc::new(RecordingChainGateway::with_clock(clock.clone())),
                Arc::new(InMemoryVaultDirectory::new()),
                clock,
            )
            .await
            .unwrap()
        };

        let wallet = WalletKey::random();
        let issuance = other.auth.request_nonce().await.unwrap();
        let signature = wallet.sign_personal(&issuance.message).unwrap();
        let response = other
            .auth
            .login(LoginRequest {
                address: wallet.address().to_lower_hex(),
                signature: signature.to_hex(),
                message: issuance.message,
                nonce: issuance.nonce,
                timestamp: issuance.timestamp,
            })
            .await
            .unwrap();

        let err = node
            .container
            .auth
            .authenticate_bearer(&format!("Bearer {}", response.token))
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredential(_)));
    }

    #[tokio::test]
    async fn test_malformed_bearer_header_rejected() {
        let node = node().await;
        for header in ["", "Bearer", "Basic abc", "bearer abc.def.ghi"] {
            let err = node.container.auth.authenticate_bearer(header).unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredential(_)), "{header:?}");
        }
    }
}
