//! Scenario runner
//!
//! A scenario is a genesis state plus a list of blocks, each carrying the
//! messages to deliver in it. The runner drives the committee module the way
//! a chain would: begin blocker first, then each message in order, every
//! message applied atomically.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration as ChronoDuration;
use icn_config::NodeConfig;
use icn_core::{CacheStore, Context, Event, KVStore, MemoryStore, Timestamp};
use icn_governance::abci::begin_blocker;
use icn_governance::{
    export_genesis, handle_msg, init_genesis, GovernanceError, Msg, MsgOutcome, ProposalContent,
    StandardGenesis, StandardKeeper,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::handlers::{param_key, standard_router};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Scenario has no genesis and no genesis file is configured")]
    MissingGenesis,

    #[error("Block {height} time {time} is before the previous block time {previous}")]
    TimeWentBackwards {
        height: u64,
        time: Timestamp,
        previous: Timestamp,
    },

    #[error("Block time overflowed after height {0}")]
    TimeOverflow(u64),

    #[error("Governance error: {0}")]
    Governance(#[from] GovernanceError),

    #[error("Storage error: {0}")]
    Storage(#[from] icn_core::StorageError),
}

pub type Result<T> = std::result::Result<T, ScenarioError>;

/// One block of messages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Absolute block time; defaults to the previous block time plus the
    /// configured block interval
    #[serde(default)]
    pub time: Option<Timestamp>,
    #[serde(default)]
    pub msgs: Vec<Msg<ProposalContent>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Initial parameters, by subspace then key
    #[serde(default)]
    pub params: BTreeMap<String, BTreeMap<String, String>>,
    /// Falls back to the configured genesis file when absent
    #[serde(default)]
    pub genesis: Option<StandardGenesis>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Scenario {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_yaml(&read(path.as_ref())?)
    }

    /// The scenario's own genesis, or the one named by `config`
    pub fn resolve_genesis(&self, config: &NodeConfig) -> Result<StandardGenesis> {
        match (&self.genesis, &config.genesis_file) {
            (Some(genesis), _) => Ok(genesis.clone()),
            (None, Some(path)) => load_genesis(path),
            (None, None) => Err(ScenarioError::MissingGenesis),
        }
    }
}

/// Read and validate a genesis YAML file
pub fn load_genesis<P: AsRef<Path>>(path: P) -> Result<StandardGenesis> {
    let genesis: StandardGenesis = serde_yaml::from_str(&read(path.as_ref())?)?;
    genesis.validate()?;
    Ok(genesis)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ScenarioError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Result of delivering one message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MsgResult {
    Ok { outcome: String },
    Failed { error: String },
}

/// An event tagged with the block that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub height: u64,
    pub time: Timestamp,
    #[serde(flatten)]
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockOutput {
    pub height: u64,
    pub time: Timestamp,
    pub events: Vec<Event>,
    pub results: Vec<MsgResult>,
}

impl BlockOutput {
    pub fn event_records(&self) -> impl Iterator<Item = EventRecord> + '_ {
        self.events.iter().map(|event| EventRecord {
            height: self.height,
            time: self.time,
            event: event.clone(),
        })
    }
}

/// Committee state machine over an in-memory store
pub struct Runner {
    keeper: StandardKeeper,
    store: MemoryStore,
    height: u64,
    time: Timestamp,
    block_interval: ChronoDuration,
}

impl Runner {
    /// Load `params` and `genesis` at height 0 and the configured genesis time
    pub fn new(
        params: &BTreeMap<String, BTreeMap<String, String>>,
        genesis: &StandardGenesis,
        config: &NodeConfig,
    ) -> Result<Self> {
        // init_genesis panics on a bad genesis; report it instead
        genesis.validate()?;

        let keeper = StandardKeeper::new(standard_router()?);
        let mut store = MemoryStore::new();
        for (subspace, values) in params {
            for (key, value) in values {
                store.set(&param_key(subspace, key), value.as_bytes())?;
            }
        }
        {
            let mut ctx = Context::new(&mut store, 0, config.genesis_time);
            init_genesis(&mut ctx, &keeper, genesis)?;
        }

        let block_interval = i64::try_from(config.block_time_secs)
            .ok()
            .and_then(ChronoDuration::try_seconds)
            .ok_or(ScenarioError::TimeOverflow(0))?;

        Ok(Self {
            keeper,
            store,
            height: 0,
            time: config.genesis_time,
            block_interval,
        })
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn time(&self) -> Timestamp {
        self.time
    }

    pub fn keeper(&self) -> &StandardKeeper {
        &self.keeper
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Execute the next block
    pub fn run_block(&mut self, block: &Block) -> Result<BlockOutput> {
        let height = self.height + 1;
        let time = match block.time {
            Some(time) if time < self.time => {
                return Err(ScenarioError::TimeWentBackwards {
                    height,
                    time,
                    previous: self.time,
                })
            }
            Some(time) => time,
            None => self
                .time
                .checked_add_signed(self.block_interval)
                .ok_or(ScenarioError::TimeOverflow(self.height))?,
        };

        let mut events = {
            let mut ctx = Context::new(&mut self.store, height, time);
            begin_blocker(&mut ctx, &self.keeper)?;
            ctx.take_events()
        };

        let mut results = Vec::with_capacity(block.msgs.len());
        for (index, msg) in block.msgs.iter().enumerate() {
            match self.deliver(height, time, msg.clone())? {
                (Ok(outcome), msg_events) => {
                    debug!("Block {} msg {}: {:?}", height, index, outcome);
                    events.extend(msg_events);
                    results.push(MsgResult::Ok {
                        outcome: describe(&outcome),
                    });
                }
                (Err(err), _) => {
                    warn!("Block {} msg {} from {} failed: {}", height, index, msg.signer(), err);
                    results.push(MsgResult::Failed { error: err.to_string() });
                }
            }
        }

        self.height = height;
        self.time = time;
        info!("Executed block {} at {} with {} msgs", height, time, block.msgs.len());
        Ok(BlockOutput {
            height,
            time,
            events,
            results,
        })
    }

    /// Run one message over a cache, committing writes only if it succeeds
    fn deliver(
        &mut self,
        height: u64,
        time: Timestamp,
        msg: Msg<ProposalContent>,
    ) -> Result<(std::result::Result<MsgOutcome, GovernanceError>, Vec<Event>)> {
        let (result, changes, events) = {
            let mut cache = CacheStore::new(&self.store);
            let (result, events) = {
                let mut ctx = Context::new(&mut cache, height, time);
                let result = handle_msg(&mut ctx, &self.keeper, msg);
                (result, ctx.take_events())
            };
            (result, cache.into_changes(), events)
        };

        if result.is_ok() {
            changes.apply(&mut self.store)?;
        }
        Ok((result, events))
    }

    /// Dump the committee module's state
    pub fn export(&mut self) -> Result<StandardGenesis> {
        let ctx = Context::new(&mut self.store, self.height, self.time);
        Ok(export_genesis(&ctx, &self.keeper)?)
    }
}

fn describe(outcome: &MsgOutcome) -> String {
    match outcome {
        MsgOutcome::Submitted { proposal_id } => format!("submitted proposal {}", proposal_id),
        MsgOutcome::Voted {
            proposal_id,
            closed: None,
        } => format!("voted on proposal {}", proposal_id),
        MsgOutcome::Voted {
            proposal_id,
            closed: Some(status),
        } => format!("voted on proposal {}, closed with {}", proposal_id, status),
    }
}

/// Everything a scenario run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub blocks: Vec<BlockOutput>,
    pub genesis: StandardGenesis,
}

pub fn run_scenario(scenario: &Scenario, config: &NodeConfig) -> Result<ScenarioReport> {
    let genesis = scenario.resolve_genesis(config)?;
    let mut runner = Runner::new(&scenario.params, &genesis, config)?;

    let blocks = scenario
        .blocks
        .iter()
        .map(|block| runner.run_block(block))
        .collect::<Result<Vec<_>>>()?;

    Ok(ScenarioReport {
        blocks,
        genesis: runner.export()?,
    })
}
