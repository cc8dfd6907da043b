//! Chain and engine doubles shared by the integration tests.
#![allow(dead_code)]

use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ghost_relayer::blockchain::{
    BlockchainError, BlockchainResult, ChainBackend, ChainConnector, ChainId, ConfirmationPolicy,
    SignedTransaction, TxReceiptSummary, Wallet,
};
use ghost_relayer::config::RelayerConfig;
use ghost_relayer::engine::{
    EngineError, EngineResult, ProgressCallback, ProofArtifact, ShieldParams, ShieldedEngine,
    TransactionDescriptor, UnshieldParams, WalletInfo,
};
use ghost_relayer::fees::GasPolicy;
use ghost_relayer::paymaster::gateway::{
    calculateFeeCall, feeBasisPointsCall, ownerCall, relayerCall,
};
use ghost_relayer::RelayerContext;

/// Anvil's first development key.
pub const RELAYER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const CHAIN_ID: u64 = 97;
pub const GAS_USED: u64 = 250_000;
pub const MIN_GAS_PRICE: u128 = 3_000_000_000;
pub const PAYMASTER_FEE_BPS: u64 = 50;

pub const POOL: Address = Address::repeat_byte(0x11);
pub const WRAPPED_TOKEN: Address = Address::repeat_byte(0x22);
pub const PAYMASTER: Address = Address::repeat_byte(0x33);
pub const OWNER: Address = Address::repeat_byte(0x44);
pub const DESTINATION: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

/// A transaction the mock network accepted.
#[derive(Debug, Clone)]
pub struct Broadcast {
    pub tx_hash: TxHash,
    pub nonce: u64,
}

/// In-memory chain that mines every accepted transaction immediately.
pub struct MockChain {
    account_nonce: Mutex<u64>,
    broadcasts: Mutex<Vec<Broadcast>>,
    receipts: Mutex<HashMap<TxHash, TxReceiptSummary>>,
    balances: Mutex<HashMap<Address, U256>>,
    revert_nonces: Mutex<HashSet<u64>>,
    head: AtomicU64,
    /// Accept transactions but never produce receipts.
    pub withhold_receipts: AtomicBool,
    /// Fail every balance query.
    pub balance_reads_fail: AtomicBool,
    /// Fail every RPC call.
    pub offline: AtomicBool,
    pub reject_next: AtomicBool,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            account_nonce: Mutex::new(0),
            broadcasts: Mutex::new(Vec::new()),
            receipts: Mutex::new(HashMap::new()),
            balances: Mutex::new(HashMap::new()),
            revert_nonces: Mutex::new(HashSet::new()),
            head: AtomicU64::new(1_000),
            withhold_receipts: AtomicBool::new(false),
            balance_reads_fail: AtomicBool::new(false),
            offline: AtomicBool::new(false),
            reject_next: AtomicBool::new(false),
        })
    }

    pub fn set_balance(&self, address: Address, amount: U256) {
        self.balances.lock().unwrap().insert(address, amount);
    }

    /// The transaction sent with `nonce` will mine but revert.
    pub fn revert_nonce(&self, nonce: u64) {
        self.revert_nonces.lock().unwrap().insert(nonce);
    }

    pub fn broadcasts(&self) -> Vec<Broadcast> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub fn broadcast_nonces(&self) -> Vec<u64> {
        self.broadcasts().iter().map(|b| b.nonce).collect()
    }

    fn check_online(&self) -> BlockchainResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(BlockchainError::Rpc("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainBackend for MockChain {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.check_online()?;
        Ok(ChainId(CHAIN_ID))
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        self.check_online()?;
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn latest_base_fee(&self) -> BlockchainResult<Option<u128>> {
        self.check_online()?;
        Ok(None)
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        self.check_online()?;
        // Below the protocol floor, as on BSC testnet.
        Ok(1_000_000_000)
    }

    async fn balance(&self, address: Address) -> BlockchainResult<U256> {
        self.check_online()?;
        if self.balance_reads_fail.load(Ordering::SeqCst) {
            return Err(BlockchainError::Rpc("balance unavailable".to_string()));
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or_default())
    }

    async fn pending_nonce(&self, _address: Address) -> BlockchainResult<u64> {
        self.check_online()?;
        Ok(*self.account_nonce.lock().unwrap())
    }

    async fn send_raw_transaction(&self, tx: &SignedTransaction) -> BlockchainResult<TxHash> {
        self.check_online()?;
        if self.reject_next.swap(false, Ordering::SeqCst) {
            return Err(BlockchainError::Rpc("insufficient funds for gas".to_string()));
        }

        let mut nonce = self.account_nonce.lock().unwrap();
        if tx.nonce != *nonce {
            return Err(BlockchainError::Rpc(format!(
                "nonce mismatch: expected {}, got {}",
                *nonce, tx.nonce
            )));
        }
        *nonce += 1;

        let block = self.head.fetch_add(1, Ordering::SeqCst) + 1;
        self.broadcasts.lock().unwrap().push(Broadcast {
            tx_hash: tx.tx_hash,
            nonce: tx.nonce,
        });

        if !self.withhold_receipts.load(Ordering::SeqCst) {
            let success = !self.revert_nonces.lock().unwrap().contains(&tx.nonce);
            self.receipts.lock().unwrap().insert(
                tx.tx_hash,
                TxReceiptSummary {
                    tx_hash: tx.tx_hash,
                    block_number: block,
                    gas_used: GAS_USED,
                    effective_gas_price: MIN_GAS_PRICE,
                    success,
                },
            );
        }
        Ok(tx.tx_hash)
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TxReceiptSummary>> {
        self.check_online()?;
        Ok(self.receipts.lock().unwrap().get(&tx_hash).cloned())
    }

    async fn call(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        self.check_online()?;
        if to != PAYMASTER || data.len() < 4 {
            return Err(BlockchainError::Rpc("execution reverted".to_string()));
        }

        let selector: [u8; 4] = [data[0], data[1], data[2], data[3]];
        let encoded = if selector == relayerCall::SELECTOR {
            relayer_address().abi_encode()
        } else if selector == ownerCall::SELECTOR {
            OWNER.abi_encode()
        } else if selector == feeBasisPointsCall::SELECTOR {
            U256::from(PAYMASTER_FEE_BPS).abi_encode()
        } else if selector == calculateFeeCall::SELECTOR {
            let call = calculateFeeCall::abi_decode(&data)
                .map_err(|e| BlockchainError::Abi(e.to_string()))?;
            (call.amount * U256::from(PAYMASTER_FEE_BPS) / U256::from(10_000u64)).abi_encode()
        } else {
            return Err(BlockchainError::Rpc("unknown selector".to_string()));
        };
        Ok(Bytes::from(encoded))
    }
}

/// Engine double. Proofs take `proof_delay` and report progress in three steps.
pub struct MockEngine {
    pub gas_estimate: u64,
    pub proof_delay: Duration,
    pub fail_proof: AtomicBool,
    pub fail_scan: AtomicBool,
    pub fail_balance: AtomicBool,
    pub shielded_balance: Mutex<U256>,
    pub estimates: AtomicUsize,
    pub proofs: AtomicUsize,
    pub populations: AtomicUsize,
    pub scans: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_parallel_proofs: AtomicUsize,
    wallets: Mutex<HashMap<String, WalletInfo>>,
    pub last_shield: Mutex<Option<ShieldParams>>,
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        Self::with_proof_delay(Duration::from_millis(10))
    }

    pub fn with_proof_delay(proof_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            gas_estimate: 1_200_000,
            proof_delay,
            fail_proof: AtomicBool::new(false),
            fail_scan: AtomicBool::new(false),
            fail_balance: AtomicBool::new(false),
            shielded_balance: Mutex::new(U256::ZERO),
            estimates: AtomicUsize::new(0),
            proofs: AtomicUsize::new(0),
            populations: AtomicUsize::new(0),
            scans: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_parallel_proofs: AtomicUsize::new(0),
            wallets: Mutex::new(HashMap::new()),
            last_shield: Mutex::new(None),
        })
    }
}

#[async_trait]
impl ShieldedEngine for MockEngine {
    async fn estimate_unproven_gas(
        &self,
        _params: &UnshieldParams,
        _gas: &GasPolicy,
    ) -> EngineResult<u64> {
        self.estimates.fetch_add(1, Ordering::SeqCst);
        Ok(self.gas_estimate)
    }

    async fn generate_proof(
        &self,
        params: &UnshieldParams,
        gas_price: u128,
        progress: ProgressCallback,
    ) -> EngineResult<ProofArtifact> {
        self.proofs.fetch_add(1, Ordering::SeqCst);
        progress(0.0);
        if self.fail_proof.load(Ordering::SeqCst) {
            return Err(EngineError::Proof("merkle tree not synced".to_string()));
        }

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_parallel_proofs.fetch_max(running, Ordering::SeqCst);
        tokio::time::sleep(self.proof_delay / 2).await;
        progress(0.5);
        tokio::time::sleep(self.proof_delay / 2).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        progress(1.0);

        Ok(ProofArtifact {
            params: params.clone(),
            gas_price,
            payload: serde_json::json!({ "proof": "mock" }),
        })
    }

    async fn populate_proved_transaction(
        &self,
        proof: &ProofArtifact,
        _gas: &GasPolicy,
    ) -> EngineResult<TransactionDescriptor> {
        self.populations.fetch_add(1, Ordering::SeqCst);
        Ok(TransactionDescriptor {
            to: POOL,
            data: Bytes::from(proof.params.amount.to_be_bytes_vec()),
            value: U256::ZERO,
        })
    }

    async fn derive_wallet_from_mnemonic(&self, mnemonic: &str) -> EngineResult<WalletInfo> {
        if mnemonic.split_whitespace().count() < 12 {
            return Err(EngineError::Wallet("invalid mnemonic".to_string()));
        }
        let digest = keccak256(mnemonic.as_bytes());
        let id = alloy::hex::encode(digest);
        let wallet = WalletInfo {
            railgun_address: format!("0zk{}", &id[..40]),
            id: id.clone(),
        };
        self.wallets.lock().unwrap().insert(id, wallet.clone());
        Ok(wallet)
    }

    async fn wallet_address(&self, wallet_id: &str) -> EngineResult<WalletInfo> {
        self.wallets
            .lock()
            .unwrap()
            .get(wallet_id)
            .cloned()
            .ok_or_else(|| EngineError::Wallet(format!("wallet {wallet_id} not loaded")))
    }

    async fn scan_incrementally(&self, _wallet_ids: &[String]) -> EngineResult<()> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        if self.fail_scan.load(Ordering::SeqCst) {
            return Err(EngineError::Scan("quick sync unavailable".to_string()));
        }
        Ok(())
    }

    async fn read_balance(&self, _wallet_id: &str, _asset: Address) -> EngineResult<U256> {
        if self.fail_balance.load(Ordering::SeqCst) {
            return Err(EngineError::Balance("wallet not loaded".to_string()));
        }
        Ok(*self.shielded_balance.lock().unwrap())
    }

    async fn populate_shield(&self, params: &ShieldParams) -> EngineResult<TransactionDescriptor> {
        *self.last_shield.lock().unwrap() = Some(params.clone());
        Ok(TransactionDescriptor {
            to: POOL,
            data: Bytes::from(params.shield_private_key.to_vec()),
            value: U256::ZERO,
        })
    }
}

pub const MNEMONIC: &str =
    "test test test test test test test test test test test junk";

pub fn relayer_address() -> Address {
    Wallet::from_private_key(RELAYER_KEY, CHAIN_ID)
        .unwrap()
        .address()
}

/// Config wired to the mock addresses, with short confirmation bounds.
pub fn test_config(with_paymaster: bool) -> RelayerConfig {
    let mut config = RelayerConfig::default();
    config.blockchain.chain_id = CHAIN_ID;
    config.blockchain.confirmation_timeout_secs = 1;
    config.blockchain.poll_interval_ms = 10;
    config.blockchain.min_gas_price_wei = MIN_GAS_PRICE as u64;
    config.contracts.railgun_proxy = POOL.to_string();
    config.contracts.relay_adapt = POOL.to_string();
    config.contracts.wrapped_token = WRAPPED_TOKEN.to_string();
    config.contracts.paymaster = with_paymaster.then(|| PAYMASTER.to_string());
    config
}

pub struct Harness {
    pub chain: Arc<MockChain>,
    pub engine: Arc<MockEngine>,
    pub ctx: Arc<RelayerContext>,
}

impl Harness {
    pub fn new(config: RelayerConfig, engine: Arc<MockEngine>) -> Self {
        let chain = MockChain::new();
        let wallet = Wallet::from_private_key(RELAYER_KEY, CHAIN_ID).unwrap();
        let connector = ChainConnector::new(
            chain.clone(),
            wallet,
            ConfirmationPolicy::from_config(&config.blockchain),
            config.blockchain.submission_queue_depth,
        );
        let ctx = RelayerContext::new(config, connector, engine.clone()).unwrap();
        Self {
            chain,
            engine,
            ctx: Arc::new(ctx),
        }
    }

    pub fn with_paymaster() -> Self {
        Self::new(test_config(true), MockEngine::new())
    }

    pub fn without_paymaster() -> Self {
        Self::new(test_config(false), MockEngine::new())
    }
}

/// Serve the relayer router on an ephemeral port and return its base URL.
pub async fn serve(ctx: Arc<RelayerContext>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = ghost_relayer::HttpServer::build_router(ctx);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
