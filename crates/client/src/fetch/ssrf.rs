//! Private network guard.
//!
//! Input URLs and harvested candidate links are user-controlled, so targets
//! resolving to loopback, private or reserved addresses are refused.

use std::net::IpAddr;
use url::{Host, Url};

/// Error type for private network guard failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SsrfError {
    #[error("blocked IP: {0} (private/reserved)")]
    BlockedIp(IpAddr),

    #[error("DNS resolution failed for {host}: {reason}")]
    DnsError { host: String, reason: String },

    #[error("URL has no host")]
    MissingHost,
}

impl From<SsrfError> for ladle_core::Error {
    fn from(err: SsrfError) -> Self {
        match err {
            SsrfError::DnsError { .. } => ladle_core::Error::HttpError(err.to_string()),
            SsrfError::MissingHost => ladle_core::Error::InvalidInput(err.to_string()),
            SsrfError::BlockedIp(_) => ladle_core::Error::PrivateAddress(err.to_string()),
        }
    }
}

/// Loopback, RFC 1918, link-local, multicast, broadcast, unspecified,
/// `0.0.0.0/8`, and IPv6 unique-local addresses.
pub fn is_private_or_reserved(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_multicast()
                || v4.is_broadcast()
                || v4.is_unspecified()
                || v4.octets()[0] == 0
        }
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_private_or_reserved(IpAddr::V4(mapped));
            }
            v6.is_loopback()
                || v6.is_multicast()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

/// True when the URL's host is an IP literal in a private range or `localhost`.
///
/// Used on redirect hops, where no DNS lookup is done.
pub fn is_private_literal(url: &Url) -> bool {
    match url.host() {
        Some(Host::Ipv4(v4)) => is_private_or_reserved(IpAddr::V4(v4)),
        Some(Host::Ipv6(v6)) => is_private_or_reserved(IpAddr::V6(v6)),
        Some(Host::Domain(d)) => d.eq_ignore_ascii_case("localhost") || d.ends_with(".localhost"),
        None => false,
    }
}

/// Resolve the URL's host and fail if any answer is private or reserved.
pub async fn ensure_public(url: &Url) -> Result<(), SsrfError> {
    let host = url.host().ok_or(SsrfError::MissingHost)?;
    let port = url.port_or_known_default().unwrap_or(443);

    let addrs: Vec<IpAddr> = match host {
        Host::Ipv4(v4) => vec![IpAddr::V4(v4)],
        Host::Ipv6(v6) => vec![IpAddr::V6(v6)],
        Host::Domain(domain) => tokio::net::lookup_host((domain, port))
            .await
            .map_err(|e| SsrfError::DnsError { host: domain.to_string(), reason: e.to_string() })?
            .map(|sa| sa.ip())
            .collect(),
    };

    match addrs.into_iter().find(|ip| is_private_or_reserved(*ip)) {
        Some(ip) => Err(SsrfError::BlockedIp(ip)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_private_v4_ranges() {
        for ip in [[127, 0, 0, 1], [10, 1, 2, 3], [172, 16, 0, 1], [192, 168, 1, 1], [169, 254, 0, 1], [0, 0, 0, 0]] {
            assert!(is_private_or_reserved(IpAddr::V4(Ipv4Addr::from(ip))), "{ip:?}");
        }
    }

    #[test]
    fn test_public_addresses_pass() {
        assert!(!is_private_or_reserved(IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34))));
        assert!(!is_private_or_reserved(IpAddr::V6(Ipv6Addr::new(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8888))));
    }

    #[test]
    fn test_private_v6_and_mapped() {
        assert!(is_private_or_reserved(IpAddr::V6(Ipv6Addr::LOCALHOST)));
        assert!(is_private_or_reserved(IpAddr::V6(Ipv6Addr::new(0xfd00, 0, 0, 0, 0, 0, 0, 1))));
        assert!(is_private_or_reserved(IpAddr::V6(Ipv4Addr::new(10, 0, 0, 1).to_ipv6_mapped())));
    }

    #[test]
    fn test_private_literal_hosts() {
        assert!(is_private_literal(&Url::parse("http://127.0.0.1:8080/x").unwrap()));
        assert!(is_private_literal(&Url::parse("http://localhost/x").unwrap()));
        assert!(is_private_literal(&Url::parse("http://[::1]/x").unwrap()));
        assert!(!is_private_literal(&Url::parse("https://example.com/x").unwrap()));
    }

    #[tokio::test]
    async fn test_ensure_public_rejects_loopback_literal() {
        let url = Url::parse("http://127.0.0.1/recipe").unwrap();
        assert!(matches!(ensure_public(&url).await, Err(SsrfError::BlockedIp(_))));
    }

    #[test]
    fn test_blocked_ip_maps_to_private_address() {
        let err: ladle_core::Error = SsrfError::BlockedIp(IpAddr::V4(Ipv4Addr::LOCALHOST)).into();
        assert!(matches!(err, ladle_core::Error::PrivateAddress(_)));
    }
}
