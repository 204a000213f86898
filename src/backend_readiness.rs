use std::{
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Readiness {
    /// No probe ran; the elapsed interval is the only signal.
    Assumed,
    Reachable,
    Unreachable,
}

pub(crate) fn ping_backend(backend_url: &Url, timeout: Duration) -> bool {
    let Some(host) = backend_url.host_str() else {
        return false;
    };
    let port = backend_url.port_or_known_default().unwrap_or(80);
    let timeout = timeout.max(Duration::from_millis(50));

    let addrs = match (host, port).to_socket_addrs() {
        Ok(addrs) => addrs.collect::<Vec<_>>(),
        Err(_) => return false,
    };
    addrs
        .iter()
        .any(|address| TcpStream::connect_timeout(address, timeout).is_ok())
}

pub(crate) fn probe_readiness(backend_url: &Url, timeout: Duration) -> Readiness {
    if ping_backend(backend_url, timeout) {
        Readiness::Reachable
    } else {
        Readiness::Unreachable
    }
}
