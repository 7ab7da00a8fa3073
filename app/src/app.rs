//! The block lifecycle: genesis, transaction delivery, end-of-block
//! resolution and commit.
//!
//! The whole ledger shares one ordered key space, split by prefix:
//! `bank/`, `stake/`, `gov/` for module state and `app/` for block metadata.
//! A block's writes are buffered until `commit`, which persists them together
//! with the block metadata in one batch. Each transaction runs in its own
//! [`CacheKv`] nested in the block buffer and is folded in only if it
//! succeeds. A fatal error aborts the block and leaves the store untouched.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use simplegov_governance::{
    export_genesis, handle_msg, init_genesis, CoinKeeper, GovParams, GovernanceError,
    HandlerOutcome, Keeper, Proposal, Resolution, StakeKeeper, Vote,
};
use simplegov_store::{decode, encode, BatchOp, CacheKv, KvStore, Prefixed, StoreError, WriteSet};
use simplegov_types::{Address, AppHash, BlockHeight, Coins, ProposalId};
use simplegov_utils::StatsCounter;

use crate::bank::KvBank;
use crate::block::{Block, BlockOutcome};
use crate::genesis::{AppGenesis, GenesisAccount, GenesisStake, StakeGenesis};
use crate::stake::{KvStake, StakeRecord};
use crate::tx::{AppMsg, Tx, TxResult};
use crate::AppError;

pub const BANK_PREFIX: &[u8] = b"bank/";
pub const STAKE_PREFIX: &[u8] = b"stake/";
pub const GOV_PREFIX: &[u8] = b"gov/";
const META_PREFIX: &[u8] = b"app/";
const LAST_HEIGHT_KEY: &[u8] = b"app/last_height";
const LAST_HASH_KEY: &[u8] = b"app/last_hash";

pub const STAT_TXS_DELIVERED: &str = "txs_delivered";
pub const STAT_TXS_REJECTED: &str = "txs_rejected";
pub const STAT_PROPOSALS_RESOLVED: &str = "proposals_resolved";
pub const STAT_BLOCKS_COMMITTED: &str = "blocks_committed";

type Blake2b256 = Blake2b<U32>;

type GovKeeper<'a, T> = Keeper<Prefixed<&'a T>, KvBank<Prefixed<&'a T>>, KvStake<Prefixed<&'a T>>>;

fn bank<T: KvStore>(store: &T) -> KvBank<Prefixed<&T>> {
    KvBank::new(Prefixed::new(store, BANK_PREFIX))
}

fn stake<T: KvStore>(store: &T) -> KvStake<Prefixed<&T>> {
    KvStake::new(Prefixed::new(store, STAKE_PREFIX))
}

fn gov_keeper<T: KvStore>(store: &T) -> Result<GovKeeper<'_, T>, GovernanceError> {
    Keeper::load(Prefixed::new(store, GOV_PREFIX), bank(store), stake(store))
}

/// Blake2b-256 over every module entry in key order. Block metadata under
/// `app/` is excluded so the hash depends only on ledger state.
pub fn compute_app_hash<T: KvStore>(store: &T) -> Result<AppHash, StoreError> {
    let mut hasher = Blake2b256::new();
    for (key, value) in store.iter_prefix(&[])? {
        if key.starts_with(META_PREFIX) {
            continue;
        }
        hasher.update((key.len() as u64).to_be_bytes());
        hasher.update(&key);
        hasher.update((value.len() as u64).to_be_bytes());
        hasher.update(&value);
    }
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    Ok(AppHash::new(output))
}

/// The replicated state machine hosting the governance module.
pub struct GovApp<S> {
    store: S,
    last_height: Option<BlockHeight>,
    last_hash: AppHash,
    current: Option<BlockHeight>,
    /// Writes of the block in progress, not yet persisted.
    block_writes: WriteSet,
    stats: StatsCounter,
}

impl<S: KvStore> GovApp<S> {
    /// Resume from whatever `store` holds; an empty store awaits `init_chain`.
    pub fn new(store: S) -> Result<Self, AppError> {
        let last_height = store
            .get(LAST_HEIGHT_KEY)?
            .map(|bytes| decode(&bytes))
            .transpose()?;
        let last_hash = store
            .get(LAST_HASH_KEY)?
            .map(|bytes| decode(&bytes))
            .transpose()?
            .unwrap_or_default();
        Ok(Self {
            store,
            last_height,
            last_hash,
            current: None,
            block_writes: WriteSet::default(),
            stats: StatsCounter::new(&[
                STAT_TXS_DELIVERED,
                STAT_TXS_REJECTED,
                STAT_PROPOSALS_RESOLVED,
                STAT_BLOCKS_COMMITTED,
            ]),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn stats(&self) -> &StatsCounter {
        &self.stats
    }

    pub fn is_initialized(&self) -> bool {
        self.last_height.is_some()
    }

    /// Height of the last committed block (genesis counts as height 0).
    pub fn last_height(&self) -> Option<BlockHeight> {
        self.last_height
    }

    pub fn last_hash(&self) -> AppHash {
        self.last_hash
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Load `genesis` into an empty store and commit it as height 0.
    pub fn init_chain(&mut self, genesis: &AppGenesis) -> Result<AppHash, AppError> {
        if let Some(height) = self.last_height {
            return Err(AppError::AlreadyInitialized(height));
        }
        genesis.validate()?;

        let cache = CacheKv::new(&self.store);
        {
            let bank = bank(&cache);
            for account in &genesis.accounts {
                bank.set_balance(&account.address, &account.coins)?;
            }
            let stake = stake(&cache);
            stake.set_params(&genesis.stake.params)?;
            for entry in &genesis.stake.stakes {
                stake.set_record(
                    &entry.address,
                    &StakeRecord {
                        power: entry.power,
                        bonded: entry.bonded.clone(),
                    },
                )?;
            }
            init_genesis(&Prefixed::new(&cache, GOV_PREFIX), &genesis.gov)?;
        }
        let writes = cache.into_writes();

        tracing::info!(
            accounts = genesis.accounts.len(),
            stakers = genesis.stake.stakes.len(),
            proposals = genesis.gov.proposals.len(),
            "genesis loaded"
        );
        self.finish_block(BlockHeight::GENESIS, writes)
    }

    pub fn begin_block(&mut self, height: BlockHeight) -> Result<(), AppError> {
        if let Some(current) = self.current {
            return Err(AppError::BlockInProgress(current));
        }
        let last = self
            .last_height
            .ok_or_else(|| AppError::Genesis("chain has not been initialised".into()))?;
        if height <= last {
            return Err(AppError::InvalidHeight { last, got: height });
        }
        self.current = Some(height);
        self.block_writes = WriteSet::default();
        tracing::debug!(height = %height, "block started");
        Ok(())
    }

    /// Apply one transaction atomically.
    ///
    /// A rejected transaction leaves no trace in the store and is reported
    /// through the returned [`TxResult`]. An `Err` means the store itself
    /// failed; the block has been aborted.
    pub fn deliver_tx(&mut self, tx: &Tx) -> Result<TxResult, AppError> {
        let height = self.current.ok_or(AppError::NoBlockInProgress)?;
        let route = tx.msg.route();

        let block = CacheKv::with_writes(&self.store, std::mem::take(&mut self.block_writes));
        let cache = CacheKv::new(&block);
        let applied = tx
            .check_signers()
            .and_then(|()| apply_msg(&cache, height, &tx.msg))
            .and_then(|log| {
                cache.commit()?;
                Ok(log)
            });
        let writes = block.into_writes();

        match applied {
            Ok(log) => {
                self.block_writes = writes;
                self.stats.increment(STAT_TXS_DELIVERED);
                tracing::debug!(height = %height, route = %route, "{log}");
                Ok(TxResult::ok(log))
            }
            Err(e) if e.is_fatal() => {
                tracing::error!(height = %height, route = %route, error = %e, "transaction hit a fatal error");
                self.abort_block();
                Err(e)
            }
            Err(e) => {
                self.block_writes = writes;
                self.stats.increment(STAT_TXS_REJECTED);
                tracing::warn!(
                    height = %height,
                    route = %route,
                    code = e.code(),
                    codespace = e.codespace(),
                    error = %e,
                    "transaction rejected"
                );
                Ok(TxResult::from_error(&e))
            }
        }
    }

    /// Resolve every proposal whose voting window has elapsed. Any error is
    /// fatal to the block, which is aborted.
    pub fn end_block(&mut self) -> Result<Vec<Resolution>, AppError> {
        let height = self.current.ok_or(AppError::NoBlockInProgress)?;
        let block = CacheKv::with_writes(&self.store, std::mem::take(&mut self.block_writes));
        let resolved = gov_keeper(&block).and_then(|keeper| keeper.end_block(height));
        let writes = block.into_writes();
        match resolved {
            Ok(resolutions) => {
                self.block_writes = writes;
                self.stats
                    .add(STAT_PROPOSALS_RESOLVED, resolutions.len() as u64);
                Ok(resolutions)
            }
            Err(e) => {
                tracing::error!(height = %height, error = %e, "end of block failed");
                self.abort_block();
                Err(e.into())
            }
        }
    }

    /// Persist the block in progress. On failure the block is aborted and
    /// the store keeps the previous block's state.
    pub fn commit(&mut self) -> Result<AppHash, AppError> {
        let height = self.current.ok_or(AppError::NoBlockInProgress)?;
        let writes = std::mem::take(&mut self.block_writes);
        match self.finish_block(height, writes) {
            Ok(hash) => {
                self.current = None;
                Ok(hash)
            }
            Err(e) => {
                tracing::error!(height = %height, error = %e, "block commit failed");
                self.abort_block();
                Err(e)
            }
        }
    }

    /// Drop every pending write of the block in progress. The same height
    /// can then be started again.
    pub fn abort_block(&mut self) {
        if let Some(height) = self.current.take() {
            let dropped = std::mem::take(&mut self.block_writes);
            tracing::warn!(height = %height, writes = dropped.len(), "block aborted");
        }
    }

    /// Run a whole block: begin, every transaction in order, end, commit.
    pub fn apply_block(&mut self, block: &Block) -> Result<BlockOutcome, AppError> {
        self.begin_block(block.height)?;
        let mut results = Vec::with_capacity(block.txs.len());
        for tx in &block.txs {
            results.push(self.deliver_tx(tx)?);
        }
        let resolutions = self.end_block()?;
        let app_hash = self.commit()?;
        Ok(BlockOutcome {
            height: block.height,
            results,
            resolutions,
            app_hash,
        })
    }

    /// Write `writes` and the block metadata in one batch.
    fn finish_block(&mut self, height: BlockHeight, writes: WriteSet) -> Result<AppHash, AppError> {
        let hash = compute_app_hash(&CacheKv::with_writes(&self.store, writes.clone()))?;
        let mut batch = writes.into_batch();
        batch.push(BatchOp::Put(LAST_HEIGHT_KEY.to_vec(), encode(&height)?));
        batch.push(BatchOp::Put(LAST_HASH_KEY.to_vec(), encode(&hash)?));
        self.store.write_batch(batch)?;

        self.last_height = Some(height);
        self.last_hash = hash;
        self.stats.increment(STAT_BLOCKS_COMMITTED);
        tracing::info!(height = %height, app_hash = %hash, "block committed");
        Ok(hash)
    }

    // ── Export & queries ────────────────────────────────────────────────

    pub fn export_genesis(&self) -> Result<AppGenesis, AppError> {
        let accounts = bank(&self.store)
            .accounts()?
            .into_iter()
            .map(|(address, coins)| GenesisAccount { address, coins })
            .collect();
        let stake = stake(&self.store);
        let stakes = stake
            .records()?
            .into_iter()
            .map(|(address, record)| GenesisStake {
                address,
                power: record.power,
                bonded: record.bonded,
            })
            .collect();
        Ok(AppGenesis {
            accounts,
            stake: StakeGenesis {
                params: stake.params()?,
                stakes,
            },
            gov: export_genesis(&Prefixed::new(&self.store, GOV_PREFIX))?,
        })
    }

    pub fn query_proposal(&self, id: ProposalId) -> Result<Option<Proposal>, AppError> {
        Ok(gov_keeper(&self.store)?.proposal(id)?)
    }

    pub fn query_votes(&self, id: ProposalId) -> Result<Vec<Vote>, AppError> {
        Ok(gov_keeper(&self.store)?.proposal_votes(id)?)
    }

    pub fn query_open_proposals(&self) -> Result<Vec<ProposalId>, AppError> {
        Ok(gov_keeper(&self.store)?.open_proposals()?)
    }

    pub fn query_gov_params(&self) -> Result<GovParams, AppError> {
        Ok(gov_keeper(&self.store)?.params().clone())
    }

    pub fn query_balance(&self, address: &Address) -> Result<Coins, AppError> {
        Ok(bank(&self.store).balance(address)?)
    }

    pub fn query_voting_power(&self, address: &Address) -> Result<u64, AppError> {
        Ok(stake(&self.store).voting_power_of(address)?)
    }
}

/// Route `msg` to its module against `store`. Returns the success log line.
fn apply_msg<T: KvStore>(store: &T, height: BlockHeight, msg: &AppMsg) -> Result<String, AppError> {
    match msg {
        AppMsg::Send(send) => {
            bank(store).send(send)?;
            Ok(format!("sent {} from {} to {}", send.amount, send.from, send.to))
        }
        AppMsg::Bond(bond) => {
            let power = stake(store).bond(&bank(store), bond)?;
            Ok(format!("{} bonded {}, power {power}", bond.address, bond.amount))
        }
        AppMsg::Unbond(unbond) => {
            let returned = stake(store).unbond(&bank(store), unbond)?;
            Ok(format!("{} unbonded, returned {returned}", unbond.address))
        }
        AppMsg::Gov(gov) => {
            let keeper = gov_keeper(store)?;
            match handle_msg(&keeper, height, gov)? {
                HandlerOutcome::ProposalSubmitted(id) => Ok(format!("proposal {id} submitted")),
                HandlerOutcome::VoteCast {
                    proposal_id,
                    weight,
                } => Ok(format!("vote on proposal {proposal_id} recorded with weight {weight}")),
            }
        }
    }
}
