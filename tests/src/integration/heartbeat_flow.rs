//! # Heartbeat Flow
//!
//! An owner authenticated through lc-01 proves liveness for their vault
//! through lc-02, with the chain played by the recording gateway.
//!
//! ## Flow Tested:
//!
//! 1. **Login (1)**: bearer credential yields the owner address
//! 2. **Commit (2)**: `keccak256(owner || nonce)` submitted on-chain
//! 3. **Reveal (2)**: nonce packed to `bytes32` matches the commitment
//! 4. **Status (2)**: contract's last heartbeat rendered for the owner

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use lc_01_wallet_auth::{LoginRequest, WalletAuthApi, WalletKey};
    use lc_02_heartbeat::{
        build_reveal_preimage, nonce_to_bytes, reveal_matches_commit, CallContext, ChainCall,
        HeartbeatApi, HeartbeatError, HeartbeatStatus, InMemoryVaultDirectory,
        RecordingChainGateway,
    };
    use node_runtime::container::{NodeConfig, SubsystemContainer};
    use shared_types::{Address, ManualTimeSource, TimeSource};
    use uuid::Uuid;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const NOW: i64 = 1_700_000_000;

    struct Node {
        clock: Arc<ManualTimeSource>,
        chain: Arc<RecordingChainGateway>,
        vaults: Arc<InMemoryVaultDirectory>,
        container: SubsystemContainer,
    }

    async fn node() -> Node {
        let clock = Arc::new(ManualTimeSource::new(NOW));
        let time: Arc<dyn TimeSource> = clock.clone();
        let chain = Arc::new(RecordingChainGateway::with_clock(time.clone()));
        let vaults = Arc::new(InMemoryVaultDirectory::new());

        let mut config = NodeConfig::with_secret(b"integration-secret-integration-secret".to_vec());
        config.heartbeat.chain_timeout_secs = 1;

        let container =
            SubsystemContainer::with_ports(config, chain.clone(), vaults.clone(), time)
                .await
                .expect("container wiring");
        Node {
            clock,
            chain,
            vaults,
            container,
        }
    }

    /// Log `wallet` in and return the owner address from its bearer credential.
    async fn authenticated_owner(node: &Node, wallet: &WalletKey) -> Address {
        let issuance = node.container.auth.request_nonce().await.unwrap();
        let signature = wallet.sign_personal(&issuance.message).unwrap();
        let response = node
            .container
            .auth
            .login(LoginRequest {
                address: wallet.address().to_checksum(),
                signature: signature.to_hex(),
                message: issuance.message,
                nonce: issuance.nonce,
                timestamp: issuance.timestamp,
            })
            .await
            .unwrap();

        node.container
            .auth
            .authenticate_bearer(&format!("Bearer {}", response.token))
            .unwrap()
            .address
    }

    fn register_vault(node: &Node, owner: Address) -> (Uuid, Address) {
        let vault_id = Uuid::new_v4();
        let contract = Address::from([0xC0; 20]);
        node.vaults.register(vault_id, owner, contract);
        (vault_id, contract)
    }

    fn random_nonce() -> String {
        hex::encode(rand::random::<[u8; 32]>())
    }

    // =============================================================================
    // HAPPY PATH
    // =============================================================================

    #[tokio::test]
    async fn test_login_commit_reveal_status() {
        let node = node().await;
        let wallet = WalletKey::random();
        let owner = authenticated_owner(&node, &wallet).await;
        let (vault_id, contract) = register_vault(&node, owner);
        let nonce = random_nonce();

        let before = node.container.heartbeat.status(&owner, vault_id).await.unwrap();
        assert_eq!(before.on_chain_status, "No heartbeat recorded on-chain yet");
        assert!(before.latest_commitment.is_none());

        let commit = node
            .container
            .heartbeat
            .commit(node.container.heartbeat_context(), &owner, vault_id, &nonce)
            .await
            .unwrap();
        assert!(commit.commit_hash.starts_with("0x"));
        assert_eq!(commit.commit_hash.len(), 66);

        node.clock.advance(60);
        let reveal = node
            .container
            .heartbeat
            .reveal(node.container.heartbeat_context(), &owner, vault_id, &nonce)
            .await
            .unwrap();
        assert_eq!(reveal.commitment_id, commit.commitment_id);

        // The contract would accept this reveal
        let calls = node.chain.calls();
        assert_eq!(calls.len(), 2);
        let ChainCall::Commit { vault, commitment } = &calls[0] else {
            panic!("expected commit, got {:?}", calls[0]);
        };
        assert_eq!(*vault, contract);
        let ChainCall::Reveal { nonce: revealed, .. } = &calls[1] else {
            panic!("expected reveal, got {:?}", calls[1]);
        };
        assert_eq!(*revealed, build_reveal_preimage(&nonce_to_bytes(&nonce)));
        assert!(reveal_matches_commit(&owner, revealed, commitment));

        let status = node.container.heartbeat.status(&owner, vault_id).await.unwrap();
        assert_eq!(status.last_heartbeat, Some(NOW + 60));
        assert_eq!(status.on_chain_status, "Last heartbeat: 2023-11-14T22:14:20Z");

        let latest = status.latest_commitment.unwrap();
        assert_eq!(latest.status, HeartbeatStatus::Revealed);
        assert_eq!(latest.committed_at, NOW);
        assert_eq!(latest.revealed_at, Some(NOW + 60));
        assert_eq!(latest.reveal_tx_hash.as_deref(), Some(reveal.tx_hash.as_str()));
    }

    #[tokio::test]
    async fn test_history_lists_newest_first() {
        let node = node().await;
        let owner = authenticated_owner(&node, &WalletKey::random()).await;
        let (vault_id, _) = register_vault(&node, owner);

        let mut ids = Vec::new();
        for _ in 0..3 {
            let nonce = random_nonce();
            let receipt = node
                .container
                .heartbeat
                .commit(CallContext::background(), &owner, vault_id, &nonce)
                .await
                .unwrap();
            node.container
                .heartbeat
                .reveal(CallContext::background(), &owner, vault_id, &nonce)
                .await
                .unwrap();
            ids.push(receipt.commitment_id);
            node.clock.advance(3_600);
        }

        let history = node.container.heartbeat.list(&owner, vault_id).await.unwrap();
        let listed: Vec<_> = history.iter().map(|c| c.id).collect();
        ids.reverse();
        assert_eq!(listed, ids);
        assert!(history.iter().all(|c| c.status == HeartbeatStatus::Revealed));
    }

    // =============================================================================
    // REJECTIONS
    // =============================================================================

    #[tokio::test]
    async fn test_other_wallet_cannot_touch_vault() {
        let node = node().await;
        let owner = authenticated_owner(&node, &WalletKey::random()).await;
        let intruder = authenticated_owner(&node, &WalletKey::random()).await;
        let (vault_id, _) = register_vault(&node, owner);

        let err = node
            .container
            .heartbeat
            .commit(CallContext::background(), &intruder, vault_id, &random_nonce())
            .await
            .unwrap_err();
        assert_eq!(err, HeartbeatError::VaultNotFound);

        let err = node.container.heartbeat.status(&intruder, vault_id).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(node.chain.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reveal_is_single_use() {
        let node = node().await;
        let owner = authenticated_owner(&node, &WalletKey::random()).await;
        let (vault_id, _) = register_vault(&node, owner);
        let nonce = random_nonce();

        node.container
            .heartbeat
            .commit(CallContext::background(), &owner, vault_id, &nonce)
            .await
            .unwrap();
        node.container
            .heartbeat
            .reveal(CallContext::background(), &owner, vault_id, &nonce)
            .await
            .unwrap();

        let err = node
            .container
            .heartbeat
            .reveal(CallContext::background(), &owner, vault_id, &nonce)
            .await
            .unwrap_err();
        assert_eq!(err, HeartbeatError::CommitmentNotFound);
        assert_eq!(node.chain.reveal_count(), 1);
    }

    #[tokio::test]
    async fn test_slow_chain_hits_configured_deadline() {
        let node = node().await;
        let owner = authenticated_owner(&node, &WalletKey::random()).await;
        let (vault_id, _) = register_vault(&node, owner);

        node.chain.set_latency(Some(Duration::from_secs(5)));
        let err = node
            .container
            .heartbeat
            .commit(node.container.heartbeat_context(), &owner, vault_id, &random_nonce())
            .await
            .unwrap_err();
        assert_eq!(err, HeartbeatError::Cancelled);

        let history = node.container.heartbeat.list(&owner, vault_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, HeartbeatStatus::Failed);
    }

    #[tokio::test]
    async fn test_chain_read_failure_reported_in_status() {
        let node = node().await;
        let owner = authenticated_owner(&node, &WalletKey::random()).await;
        let (vault_id, _) = register_vault(&node, owner);

        node.chain.fail_reads(Some("rpc unavailable"));
        let status = node.container.heartbeat.status(&owner, vault_id).await.unwrap();
        assert_eq!(status.last_heartbeat, None);
        assert_eq!(status.on_chain_status, "error: rpc unavailable");
    }
}
