//! Network names and chain endpoints.

use std::collections::HashMap;

/// Network endpoints (WebSocket URLs)
pub const FINNEY_ENTRYPOINT: &str = "wss://entrypoint-finney.opentensor.ai:443";
pub const FINNEY_TEST_ENTRYPOINT: &str = "wss://test.finney.opentensor.ai:443";
pub const ARCHIVE_ENTRYPOINT: &str = "wss://archive.chain.opentensor.ai:443";
pub const LATENT_LITE_ENTRYPOINT: &str = "wss://lite.sub.latent.to:443";
pub const LOCAL_ENTRYPOINT: &str = "ws://127.0.0.1:9944";

/// Default network
pub const DEFAULT_NETWORK: &str = "finney";

/// Network name -> endpoint
fn network_map() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("finney", FINNEY_ENTRYPOINT),
        ("test", FINNEY_TEST_ENTRYPOINT),
        ("archive", ARCHIVE_ENTRYPOINT),
        ("local", LOCAL_ENTRYPOINT),
        ("latent-lite", LATENT_LITE_ENTRYPOINT),
    ])
}

/// Determine chain endpoint and network name from a network string or URL.
///
/// `ws://` and `wss://` strings are used as the endpoint directly and named
/// after the matching known network, or `custom`. Anything else is looked up
/// as a network name; unknown names fall back to the finney endpoint.
pub fn determine_chain_endpoint_and_network(network: &str) -> (String, String) {
    if network.starts_with("ws://") || network.starts_with("wss://") {
        let network_name = network_map()
            .iter()
            .find(|(_, endpoint)| **endpoint == network)
            .map(|(name, _)| name.to_string())
            .unwrap_or_else(|| "custom".to_string());
        (network.to_string(), network_name)
    } else {
        let name = network.to_lowercase();
        let endpoint = network_map()
            .get(name.as_str())
            .copied()
            .unwrap_or(FINNEY_ENTRYPOINT);
        (endpoint.to_string(), name)
    }
}
