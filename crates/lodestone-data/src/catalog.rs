//! Resolution pipeline: reads a data directory and builds a type catalog.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use lodestone_core::id::{BlockTypeId, WorldId};
use lodestone_core::registry::{BlockProperties, TypeCatalog, TypeCatalogBuilder};
use lodestone_core::world::{World, WorldConfig};
use lodestone_signal::{Toggle, TorchConfig, make_behavior};
use tracing::{debug, warn};

use crate::loader::{
    DataLoadError, check_duplicate, deserialize_file, deserialize_list, find_data_file,
    require_data_file, resolve_name,
};
use crate::schema::{BlockData, SignalData};

/// Everything a data directory describes.
#[derive(Debug)]
pub struct BlockSet {
    pub catalog: TypeCatalog,
    pub torch: TorchConfig,
    pub world: WorldConfig,
}

impl BlockSet {
    /// A world using this block set's catalog and configuration.
    pub fn new_world(self, id: WorldId) -> World {
        World::with_config(id, Arc::new(self.catalog), self.world)
    }
}

/// Load `blocks.*` (required), `signal.*` and `world.*` (optional) from
/// `dir`.
pub fn load_block_set(dir: &Path) -> Result<BlockSet, DataLoadError> {
    let torch = match find_data_file(dir, "signal")? {
        Some(path) => deserialize_file::<SignalData>(&path)?.torch,
        None => TorchConfig::default(),
    };
    let world = match find_data_file(dir, "world")? {
        Some(path) => deserialize_file::<WorldConfig>(&path)?,
        None => WorldConfig::default(),
    };

    let blocks_path = require_data_file(dir, "blocks")?;
    let blocks: Vec<BlockData> = deserialize_list(&blocks_path, "blocks")?;
    let catalog = build_catalog(&blocks, &blocks_path, torch)?;

    debug!(
        dir = %dir.display(),
        blocks = catalog.len(),
        torch_window = torch.window,
        torch_threshold = torch.threshold,
        "Loaded block set"
    );
    Ok(BlockSet {
        catalog,
        torch,
        world,
    })
}

/// Register `blocks` and attach their behaviors. `file` is only used in
/// error messages.
pub fn build_catalog(
    blocks: &[BlockData],
    file: &Path,
    torch: TorchConfig,
) -> Result<TypeCatalog, DataLoadError> {
    let mut builder = TypeCatalogBuilder::new();
    let mut names: HashMap<String, BlockTypeId> = HashMap::new();

    // Pass 1: register every type so pairs can refer forward.
    for block in blocks {
        check_duplicate(&names, &block.name, file)?;
        let properties = BlockProperties {
            solid: block.solid,
            liquid: block.liquid,
        };
        if block.solid && block.liquid {
            warn!(name = %block.name, "Block is both solid and liquid");
        }
        let id = builder.register(BlockTypeId(block.id), &block.name, properties)?;
        names.insert(block.name.clone(), id);
    }

    // Pass 2: behaviors.
    for block in blocks {
        let Some(behavior) = &block.behavior else {
            continue;
        };
        let toggle = if behavior.kind.needs_toggle() {
            let pair_name = behavior.pair.as_deref().ok_or_else(|| DataLoadError::MissingPair {
                file: file.to_path_buf(),
                name: block.name.clone(),
            })?;
            let pair = *resolve_name(&names, pair_name, file, "block")?;
            let this = *resolve_name(&names, &block.name, file, "block")?;
            check_pair(blocks, block, pair_name);
            Some(if behavior.active {
                Toggle {
                    active: true,
                    on: this,
                    off: pair,
                }
            } else {
                Toggle {
                    active: false,
                    on: pair,
                    off: this,
                }
            })
        } else {
            if behavior.pair.is_some() {
                warn!(name = %block.name, kind = ?behavior.kind, "Ignoring pair on untoggled block");
            }
            None
        };
        builder.attach_behavior(&block.name, make_behavior(behavior.kind, toggle, torch)?)?;
    }

    Ok(builder.build())
}

/// Warn when two toggled types are paired inconsistently.
fn check_pair(blocks: &[BlockData], block: &BlockData, pair_name: &str) {
    let Some(partner) = blocks.iter().find(|b| b.name == pair_name) else {
        return;
    };
    let (Some(ours), Some(theirs)) = (&block.behavior, &partner.behavior) else {
        warn!(name = %block.name, pair = pair_name, "Pair has no behavior");
        return;
    };
    if ours.kind != theirs.kind || ours.active == theirs.active {
        warn!(
            name = %block.name,
            pair = pair_name,
            "Pair does not hold the opposite state of the same kind"
        );
    }
}
