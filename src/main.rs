use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use containers::{hash_tree_root, Block, BlockBody, Root, Slot, State, ValidatorIndex};
use stategen::{CancelSignal, MemoryStore, StateGen, StateGenConfig};
use tracing::info;

#[derive(Parser, Debug)]
struct Args {
    /// Number of validators in the generated genesis state.
    #[arg(long, default_value_t = 64)]
    validators: u64,

    /// Bound on recently processed states kept in memory.
    #[arg(long, default_value_t = 64)]
    hot_cache_capacity: u32,

    /// Bound on retained epoch-boundary states.
    #[arg(long, default_value_t = 32)]
    boundary_cache_capacity: u32,

    /// Slots between persisted full-state snapshots.
    #[arg(long, default_value_t = 2048)]
    slots_per_archived_point: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let genesis_time = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let genesis_state = State::genesis_with_validator_count(genesis_time, args.validators);
    let genesis_block = Block {
        slot: Slot(0),
        proposer_index: ValidatorIndex(0),
        parent_root: Root::zero(),
        state_root: hash_tree_root(&genesis_state),
        body: BlockBody::default(),
    };

    let db = Arc::new(MemoryStore::new());
    let genesis_root = db.put_block(genesis_block);
    db.mark_finalized(genesis_root);

    let config = StateGenConfig::default()
        .with_hot_cache_capacity(args.hot_cache_capacity)
        .with_boundary_cache_capacity(args.boundary_cache_capacity)
        .with_slots_per_archived_point(args.slots_per_archived_point);
    let engine = Arc::new(StateGen::new(db, config));

    engine.save_state(genesis_root, &genesis_state)?;
    engine.save_finalized_state(genesis_root, Slot(0), &genesis_state);

    info!(
        root = %genesis_root,
        validators = args.validators,
        genesis_time,
        "Genesis state initialized"
    );

    let cancel = CancelSignal::new();
    let state = engine.state_by_root(&cancel, genesis_root)?;
    let stats = engine.stats();
    info!(
        slot = state.slot.0,
        hot_states = stats.hot_states,
        boundary_states = stats.boundary_states,
        "State reconstruction engine ready"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    Ok(())
}
