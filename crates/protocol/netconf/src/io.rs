//! Loading and saving a [Network] as JSON.

use crate::{NetconfError, NetconfResult, Network};
use std::{fs, io::Write, path::Path};
use tracing::{debug, warn};

/// Loads a [Network] from the JSON file at `path`.
///
/// The network is not validated, call [`Network::validate`] on the result.
pub fn load(path: impl AsRef<Path>) -> NetconfResult<Network> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).map_err(|source| NetconfError::Io { path: path.to_path_buf(), source })?;

    let network: Network = serde_json::from_slice(&bytes).map_err(NetconfError::Decode)?;
    debug!(target: "netconf", path = %path.display(), network = %network.id, chains = network.chains.len(), "Loaded network config");

    Ok(network)
}

/// Saves the [Network] as indented JSON to `path`, readable by the owner only.
///
/// EVM chains without a deployed portal are saved as-is, with a warning.
pub fn save(network: &Network, path: impl AsRef<Path>) -> NetconfResult<()> {
    let path = path.as_ref();

    for chain in network.evm_chains().filter(|chain| !chain.has_portal()) {
        warn!(target: "netconf", chain = %chain.name, chain_id = chain.id, "Saving network config with empty portal address");
    }

    let mut bytes = serde_json::to_vec_pretty(network).map_err(NetconfError::Encode)?;
    bytes.push(b'\n');

    let io_err = |source| NetconfError::Io { path: path.to_path_buf(), source };

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(io_err)?;
    file.write_all(&bytes).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Chain, FinalizationStrat, NetworkId, omni_consensus_chain_id};
    use alloy_primitives::Address;
    use core::time::Duration;

    fn network() -> Network {
        Network::new(
            NetworkId::Staging,
            vec![
                Chain {
                    id: omni_consensus_chain_id(NetworkId::Staging),
                    name: "omni_consensus".to_string(),
                    portal_address: Address::ZERO,
                    deploy_height: 0,
                    block_period: Duration::from_secs(1),
                    finalization_strat: FinalizationStrat::Finalized,
                },
                Chain {
                    id: 100,
                    name: "mock_l1".to_string(),
                    portal_address: Address::ZERO,
                    deploy_height: 7,
                    block_period: Duration::from_secs(12),
                    finalization_strat: FinalizationStrat::Finalized,
                },
                Chain {
                    id: 200,
                    name: "mock_op".to_string(),
                    portal_address: Address::repeat_byte(0x11),
                    deploy_height: 42,
                    block_period: Duration::from_millis(500),
                    finalization_strat: FinalizationStrat::Latest,
                },
            ],
        )
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.json");

        let network = network();
        save(&network, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, network);
        assert!(loaded.validate().is_ok());
        assert!(!loaded.chain(100).unwrap().has_portal());
    }

    #[test]
    fn test_saved_document_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.json");
        save(&network(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["name"], "staging");
        assert_eq!(value["chains"][1]["portal_address"], "");
        assert_eq!(value["chains"][2]["finalization_start"], "latest");
        assert_eq!(value["chains"][2]["block_period"], "500ms");
    }

    #[cfg(unix)]
    #[test]
    fn test_save_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.json");
        save(&network(), &path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, NetconfError::Io { .. }));
    }

    #[test]
    fn test_load_rejects_unknown_network() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.json");
        fs::write(&path, r#"{"name":"devnet","chains":[]}"#).unwrap();

        assert!(matches!(load(&path), Err(NetconfError::Decode(_))));
    }
}
