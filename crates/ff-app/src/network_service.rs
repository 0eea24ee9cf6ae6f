//! Network selection, data discovery and compilation.

use std::path::{Path, PathBuf};

use ff_network::{
    GeoModel, NetworkId, NetworkModel, NetworkSummary, Sheet, compile, load_tables,
};
use ff_profiles::{COMMERCIAL_POOL_FILE, RESIDENTIAL_POOL_FILE};
use tracing::info;

use crate::error::{AppError, AppResult};

/// A compiled network with its derived views.
#[derive(Debug, Clone)]
pub struct LoadedNetwork {
    pub id: NetworkId,
    pub dir: PathBuf,
    pub model: NetworkModel,
    pub geo: GeoModel,
    pub summary: NetworkSummary,
}

/// What `check_data` found under a data root.
#[derive(Debug, Clone)]
pub struct DataInventory {
    pub networks: Vec<(NetworkId, PathBuf)>,
    pub pools: Vec<PathBuf>,
}

/// Parse a user's network choice ("1" to "4").
pub fn select_network(input: &str) -> AppResult<NetworkId> {
    Ok(NetworkId::parse(input)?)
}

/// Find the directory for `id` under `root` by its `Network_<n>_` prefix.
pub fn locate_network_dir(root: &Path, id: NetworkId) -> AppResult<PathBuf> {
    let entries = std::fs::read_dir(root).map_err(|e| {
        AppError::MissingData(format!("data root {} is unreadable: {}", root.display(), e))
    })?;

    let prefix = id.prefix();
    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with(&prefix) && entry.path().is_dir() {
            matches.push(entry.path());
        }
    }
    matches.sort();

    matches.into_iter().next().ok_or_else(|| {
        AppError::MissingData(format!(
            "no {}* directory for {} under {}",
            prefix,
            id,
            root.display()
        ))
    })
}

/// Verify every network directory, its required sheets and both profile pools.
pub fn check_data(root: &Path) -> AppResult<DataInventory> {
    let mut networks = Vec::with_capacity(NetworkId::ALL.len());
    for id in NetworkId::ALL {
        let dir = locate_network_dir(root, id)?;
        for sheet in Sheet::ALL {
            if sheet.is_required() && !sheet.path_in(&dir).is_file() {
                return Err(AppError::MissingData(format!(
                    "{}: required sheet '{}' not found",
                    id,
                    sheet.name()
                )));
            }
        }
        networks.push((id, dir));
    }

    let mut pools = Vec::with_capacity(2);
    for file in [RESIDENTIAL_POOL_FILE, COMMERCIAL_POOL_FILE] {
        let path = root.join(file);
        if !path.is_file() {
            return Err(AppError::MissingData(format!(
                "profile pool not found at {}",
                path.display()
            )));
        }
        pools.push(path);
    }

    info!(root = %root.display(), networks = networks.len(), "data root verified");
    Ok(DataInventory { networks, pools })
}

/// Read, compile and summarize one network.
pub fn load_network(root: &Path, id: NetworkId) -> AppResult<LoadedNetwork> {
    let dir = locate_network_dir(root, id)?;
    let tables = load_tables(&dir)?;
    let model = compile(id, &tables)?;
    let geo = GeoModel::from_model(&model);
    let summary = NetworkSummary::from_model(&model);

    info!(
        network = %id,
        buses = model.buses.len(),
        lines = model.lines.len(),
        transformers = model.transformers.len(),
        loads = model.loads.len(),
        "network compiled"
    );

    Ok(LoadedNetwork {
        id,
        dir,
        model,
        geo,
        summary,
    })
}
