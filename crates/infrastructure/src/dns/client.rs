//! UDP DNS client for PTR lookups and cache warming.
//!
//! Queries are built and parsed with `hickory-proto` directly; there is no
//! resolver library in between because every lookup targets one explicit
//! server.

use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RData, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use powerblockade_application::ports::DnsClient;
use powerblockade_domain::DomainError;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

const PTR_TIMEOUT: Duration = Duration::from_secs(2);
const WARM_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

pub struct UdpDnsClient;

impl UdpDnsClient {
    pub fn new() -> Self {
        Self
    }

    fn build_query(name: &str, record_type: RecordType) -> Result<(u16, Vec<u8>), DomainError> {
        let name = Name::from_str(name).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid query name '{name}': {e}"))
        })?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(record_type);
        query.set_query_class(DNSClass::IN);

        let id = fastrand::u16(..);
        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);

        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);
        message
            .emit(&mut encoder)
            .map_err(|e| DomainError::IoError(format!("Failed to serialize DNS query: {e}")))?;
        Ok((id, buf))
    }

    async fn exchange(
        &self,
        server: &str,
        query: &[u8],
        id: u16,
        timeout: Duration,
    ) -> Result<Message, DomainError> {
        let server_addr = resolve_server(server).await?;
        let bind_addr: SocketAddr = if server_addr.is_ipv4() {
            "0.0.0.0:0".parse().unwrap_or(server_addr)
        } else {
            "[::]:0".parse().unwrap_or(server_addr)
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| DomainError::IoError(format!("UDP bind failed: {e}")))?;

        tokio::time::timeout(timeout, socket.send_to(query, server_addr))
            .await
            .map_err(|_| DomainError::LookupTimeout)?
            .map_err(|e| DomainError::IoError(format!("UDP send to {server_addr} failed: {e}")))?;

        let mut buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        loop {
            let (len, from) = tokio::time::timeout(timeout, socket.recv_from(&mut buf))
                .await
                .map_err(|_| DomainError::LookupTimeout)?
                .map_err(|e| DomainError::IoError(format!("UDP recv failed: {e}")))?;
            if from != server_addr {
                continue;
            }

            let message = Message::from_vec(&buf[..len]).map_err(|e| {
                DomainError::IoError(format!("Failed to parse DNS response: {e}"))
            })?;
            if message.id() != id {
                debug!(expected = id, got = message.id(), "Mismatched DNS response id");
                continue;
            }
            return Ok(message);
        }
    }
}

impl Default for UdpDnsClient {
    fn default() -> Self {
        Self::new()
    }
}

/// `host[:port]` → socket address; hostnames resolve through the system.
async fn resolve_server(server: &str) -> Result<SocketAddr, DomainError> {
    let with_port = if server.contains(':') && !server.starts_with('[') {
        server.to_string()
    } else {
        format!("{server}:53")
    };

    if let Ok(addr) = with_port.parse::<SocketAddr>() {
        return Ok(addr);
    }
    tokio::net::lookup_host(&with_port)
        .await
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| DomainError::InvalidIpAddress(format!("Unresolvable server '{server}'")))
}

/// `10.1.2.3` → `3.2.1.10.in-addr.arpa.` (nibble form for IPv6).
pub fn reverse_name(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => {
            let o = v4.octets();
            format!("{}.{}.{}.{}.in-addr.arpa.", o[3], o[2], o[1], o[0])
        }
        IpAddr::V6(v6) => {
            let mut out = String::with_capacity(74);
            for byte in v6.octets().iter().rev() {
                out.push_str(&format!("{:x}.{:x}.", byte & 0x0f, byte >> 4));
            }
            out.push_str("ip6.arpa.");
            out
        }
    }
}

#[async_trait]
impl DnsClient for UdpDnsClient {
    async fn lookup_ptr(
        &self,
        ip: IpAddr,
        nameserver: &str,
    ) -> Result<Option<String>, DomainError> {
        let (id, query) = Self::build_query(&reverse_name(ip), RecordType::PTR)?;
        let message = self.exchange(nameserver, &query, id, PTR_TIMEOUT).await?;

        for record in message.answers() {
            if let RData::PTR(ptr) = record.data() {
                let hostname = ptr.0.to_utf8();
                return Ok(Some(hostname.trim_end_matches('.').to_string()));
            }
        }
        Ok(None)
    }

    async fn warm_a(&self, domain: &str, resolver: &str) -> Result<Option<u32>, DomainError> {
        let name = format!("{}.", domain.trim_end_matches('.'));
        let (id, query) = Self::build_query(&name, RecordType::A)?;
        let message = self.exchange(resolver, &query, id, WARM_TIMEOUT).await?;

        let mut min_ttl: Option<u32> = None;
        for record in message.answers() {
            if matches!(record.data(), RData::A(_)) {
                let ttl = record.ttl();
                min_ttl = Some(min_ttl.map_or(ttl, |cur| cur.min(ttl)));
            }
        }
        Ok(min_ttl)
    }
}
