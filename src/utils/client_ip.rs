//! Client IP extraction from proxy headers.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Resolves the client IP used for geo lookup, sticky keying, and rate
/// limiting.
///
/// When `behind_proxy` is set, `X-Real-IP` wins, then the first entry of
/// `X-Forwarded-For`, then the transport peer address. Without a trusted
/// proxy the headers are attacker-controlled and only the peer address is
/// used.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy {
        if let Some(ip) = header_value(headers, "x-real-ip")
            && !ip.is_empty()
        {
            return ip.to_string();
        }

        if let Some(forwarded) = header_value(headers, "x-forwarded-for")
            && let Some(first) = forwarded.split(',').next()
        {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    peer.ip().to_string()
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}
