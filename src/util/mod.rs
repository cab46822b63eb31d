use std::net::{IpAddr, Ipv4Addr};

use local_ip_address::local_ip;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Installs the global log subscriber. `RUST_LOG` overrides the default
/// `info` level.
pub fn init_log() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Only the first subscriber installed in a process wins.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// The address other machines on the LAN can reach this host on.
///
/// Falls back to loopback when no routable interface is found, which only
/// affects the URL printed at startup.
pub fn lan_address() -> IpAddr {
    match local_ip() {
        Ok(ip) if !ip.is_loopback() => ip,
        Ok(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
        Err(e) => {
            debug!(error = %e, "no routable interface found");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}
