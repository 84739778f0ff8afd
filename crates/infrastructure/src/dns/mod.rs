pub mod client;

pub use client::UdpDnsClient;
