//! Address discovery: operational metadata ops, not part of the compaction
//! core itself, but owned by the publisher since it is the component that
//! advertises a dialable address to peers.

use crate::error::PublisherError;
use idc_common::NodeAddressConfig;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

/// This node's public `(ip, port)`, read from `config/node-address.config`
/// plus the application-configured `pubsub_port`.
pub fn local_address(
    config_path: impl AsRef<Path>,
    pubsub_port: u16,
) -> Result<(Ipv4Addr, u16), PublisherError> {
    let config = NodeAddressConfig::load(config_path)?;
    Ok((config.public_ip, pubsub_port))
}

/// Derives a broadcast-capable address list from the host's network
/// interfaces, excluding loopback. One candidate per non-loopback IP the
/// host owns, paired with `pubsub_port`; a peer dials whichever one is
/// reachable from its side of the network.
pub fn broadcast_capable_addresses(pubsub_port: u16) -> Result<Vec<(IpAddr, u16)>, PublisherError> {
    let addresses: Vec<(IpAddr, u16)> = pnet_datalink::interfaces()
        .into_iter()
        .filter(|iface| !iface.is_loopback())
        .flat_map(|iface| iface.ips)
        .map(|ip_network| (ip_network.ip(), pubsub_port))
        .collect();

    if addresses.is_empty() {
        return Err(PublisherError::NoBroadcastAddress);
    }
    Ok(addresses)
}
