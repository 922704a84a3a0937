use crate::error::TransportError;
use async_trait::async_trait;
use idc_common::DcId;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::RwLock;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

/// The wire-level pub/sub boundary: bind one outbound endpoint, send bytes
/// to a named destination, and close. Modeled as a trait so the compaction
/// core's publisher logic never depends on a concrete socket stack — per
/// spec §6 the transport is an external collaborator.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `bytes` addressed to `dcid`. At-least-once, no retry: the
    /// surrounding replication protocol (out of scope here) is responsible
    /// for redelivery if this call fails.
    async fn send(&self, dcid: &DcId, bytes: Vec<u8>) -> Result<(), TransportError>;

    /// Releases any resources (listener, connections) held by this
    /// transport. Called once, on publisher shutdown.
    async fn close(&self);
}

/// A `tokio`-backed `Transport`. Binds one `TcpListener` on `PUB` (best-effort
/// inbound acks; the core never reads from it) and dials a fresh
/// `TcpStream` per outbound send — matching the spec's "at-least-once, no
/// retry" framing rather than holding long-lived per-peer connections.
pub struct TcpTransport {
    _listener: TcpListener,
    peer_addresses: RwLock<HashMap<DcId, SocketAddr>>,
}

impl TcpTransport {
    /// Binds the publish endpoint on `port`. `peer_addresses` resolves a
    /// `DcId` to the socket address to dial; it is expected to be kept in
    /// sync with the `MetadataService`'s DC list by the surrounding
    /// deployment (address resolution itself is out of scope for this
    /// core, per spec §1).
    pub async fn bind(
        port: u16,
        peer_addresses: HashMap<DcId, SocketAddr>,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .map_err(|source| TransportError::Bind { port, source })?;
        Ok(Self {
            _listener: listener,
            peer_addresses: RwLock::new(peer_addresses),
        })
    }

    /// Registers or updates the dial address for a peer datacenter.
    pub fn set_peer_address(&self, dcid: DcId, addr: SocketAddr) {
        self.peer_addresses
            .write()
            .expect("peer address map lock poisoned")
            .insert(dcid, addr);
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&self, dcid: &DcId, bytes: Vec<u8>) -> Result<(), TransportError> {
        let addr = {
            let peers = self.peer_addresses.read().expect("peer address map lock poisoned");
            peers.get(dcid).copied()
        };
        let Some(addr) = addr else {
            return Err(TransportError::Send {
                dcid: dcid.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no known address for destination datacenter",
                ),
            });
        };

        let mut stream = TcpStream::connect(addr)
            .await
            .map_err(|source| TransportError::Send {
                dcid: dcid.to_string(),
                source,
            })?;
        stream
            .write_all(&bytes)
            .await
            .map_err(|source| TransportError::Send {
                dcid: dcid.to_string(),
                source,
            })
    }

    async fn close(&self) {
        // TcpListener and any per-send TcpStreams drop on their own; nothing
        // to flush or deregister explicitly.
    }
}
