//! Stream proxy URL utilities
//!
//! CDNs behind the stream providers enforce referer allow-lists, so players
//! cannot fetch media URLs directly. This crate derives the referer a media
//! URL expects and wraps the URL in a request to the proxy service, which
//! replays it with that referer.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::info;

/// Proxy service endpoint used when no other base is configured.
pub const DEFAULT_PROXY_BASE: &str = "https://working-hianime.vercel.app/api/v1/proxy";

/// Referer origin used when a media URL cannot be parsed.
pub const DEFAULT_REFERER: &str = "https://megacloud.tv";

/// Characters left unescaped by JavaScript's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encoding for URL query parameter values.
#[must_use]
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

/// Derive the referer origin for a direct media URL.
///
/// Falls back to [`DEFAULT_REFERER`] when the URL cannot be parsed.
#[must_use]
pub fn resolve_referer(direct_url: &str) -> String {
    ProxyRewriter::default().referer_for(direct_url)
}

/// Build a proxied URL for `direct_url` on [`DEFAULT_PROXY_BASE`].
#[must_use]
pub fn build_proxy_url(direct_url: &str, referer: &str) -> String {
    ProxyRewriter::default().build_url(direct_url, referer)
}

/// Rewrites direct media URLs into proxy-service URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRewriter {
    base: String,
    default_referer: String,
}

impl ProxyRewriter {
    #[must_use]
    pub fn new(base: impl Into<String>, default_referer: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            default_referer: default_referer.into(),
        }
    }

    /// `<scheme>://<host>[:<port>]` of `direct_url`.
    ///
    /// A port written in the URL is kept even when it is the scheme default,
    /// since CDNs compare the referer against the origin they were given.
    #[must_use]
    pub fn referer_for(&self, direct_url: &str) -> String {
        let parsed = match url::Url::parse(direct_url) {
            Ok(parsed) => parsed,
            Err(e) => {
                info!(
                    "Could not parse stream URL for referer ({}), using default {}",
                    e, self.default_referer
                );
                return self.default_referer.clone();
            }
        };

        let Some(host) = parsed.host_str() else {
            info!(
                "Stream URL has no host, using default referer {}",
                self.default_referer
            );
            return self.default_referer.clone();
        };

        match written_port(direct_url, &parsed).or_else(|| parsed.port()) {
            Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
            None => format!("{}://{host}", parsed.scheme()),
        }
    }

    /// `{base}?url={direct_url}&referer={referer}`, both values percent-encoded.
    #[must_use]
    pub fn build_url(&self, direct_url: &str, referer: &str) -> String {
        format!(
            "{}?url={}&referer={}",
            self.base,
            percent_encode(direct_url),
            percent_encode(referer)
        )
    }

    /// Resolve the referer for `direct_url` and build its proxied URL.
    #[must_use]
    pub fn rewrite(&self, direct_url: &str) -> String {
        let referer = self.referer_for(direct_url);
        self.build_url(direct_url, &referer)
    }
}

impl Default for ProxyRewriter {
    fn default() -> Self {
        Self::new(DEFAULT_PROXY_BASE, DEFAULT_REFERER)
    }
}

// ------------------------------------------------------------------
// Internal helpers
// ------------------------------------------------------------------

/// Port as written in the authority of `raw`, including scheme defaults
/// that `url::Url` normalizes away.
///
/// Only accepted when the written `host:port` is the authority `parsed`
/// reports and the port agrees with it.
fn written_port(raw: &str, parsed: &url::Url) -> Option<u16> {
    let host = parsed.host_str()?;
    let (_, rest) = raw.split_once("://")?;
    let authority = rest
        .split(['/', '?', '#', '\\'])
        .next()
        .unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or(authority);
    let (written_host, port) = host_port.rsplit_once(':')?;
    let port: u16 = port.parse().ok()?;

    (written_host.eq_ignore_ascii_case(host) && parsed.port_or_known_default() == Some(port))
        .then_some(port)
}
