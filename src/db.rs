//! Chain-id → network name/token lookup.
//!
//! Carried as a literal table (generated, not hand-derived, in the
//! source); not worth re-deriving by hand here either.

use crate::error::{Error, Result};

struct Network {
    chain_id: u32,
    name: &'static str,
    token: &'static str,
}

const NETWORKS: &[Network] = &[
    Network { chain_id: 1, name: "mainnet", token: "ETH" },
    Network { chain_id: 10, name: "Optimism", token: "ETH" },
    Network { chain_id: 137, name: "Polygon", token: "POL" },
    Network { chain_id: 8453, name: "Base", token: "ETH" },
    Network { chain_id: 42161, name: "Arbitrum", token: "ETH" },
    Network { chain_id: 59144, name: "Linea", token: "ETH" },
    Network { chain_id: 11155111, name: "Sepolia", token: "sETH" },
];

fn find(chain_id: u32) -> Result<&'static Network> {
    NETWORKS.iter().find(|n| n.chain_id == chain_id).ok_or(Error::NotFound)
}

/// The network name for a chain id (e.g. `1` → `"mainnet"`).
pub fn network_name(chain_id: u32) -> Result<&'static str> {
    find(chain_id).map(|n| n.name)
}

/// The native gas token symbol for a chain id (e.g. `137` → `"POL"`).
pub fn network_token(chain_id: u32) -> Result<&'static str> {
    find(chain_id).map(|n| n.token)
}
