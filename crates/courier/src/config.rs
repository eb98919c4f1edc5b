//! Settings for the reqwest client behind [`ReqwestTransport`](crate::effects::ReqwestTransport).

use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy, redirect};
use url::Url;

use crate::error::{Error, Result};

/// Client-wide transport settings.
///
/// Per-request overrides (`connect_timeout_ms`, `local_address`, `proxy`,
/// `user_agent`) are layered on top of these by the transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Explicit proxies. `https` proxies carry https traffic, everything else
    /// carries plain http traffic.
    pub proxies: Vec<Url>,

    /// Honour `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` from the environment.
    ///
    /// Default: true
    pub use_env_proxy: bool,

    pub connect_timeout: Option<Duration>,

    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxies: Vec::new(),
            use_env_proxy: true,
            connect_timeout: None,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn proxy(mut self, url: Url) -> Self {
        self.proxies.push(url);
        self
    }

    #[must_use]
    pub fn use_env_proxy(mut self, enabled: bool) -> Self {
        self.use_env_proxy = enabled;
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// A reqwest builder carrying these settings, with redirects disabled.
    pub fn builder(&self) -> Result<ClientBuilder> {
        let mut cb = Client::builder().redirect(redirect::Policy::none());

        if !self.use_env_proxy {
            cb = cb.no_proxy();
        }

        let (secure, insecure): (Vec<&Url>, Vec<&Url>) =
            self.proxies.iter().partition(|u| u.scheme() == "https");

        for u in secure {
            cb = cb.proxy(Proxy::https(u.as_str()).map_err(|_| proxy_error(u))?);
        }
        for u in insecure {
            cb = cb.proxy(Proxy::http(u.as_str()).map_err(|_| proxy_error(u))?);
        }

        if let Some(timeout) = self.connect_timeout {
            cb = cb.connect_timeout(timeout);
        }
        if let Some(agent) = &self.user_agent {
            cb = cb.user_agent(agent.as_str());
        }

        Ok(cb)
    }

    pub fn build(&self) -> Result<Client> {
        self.builder()?.build().map_err(Error::transport)
    }
}

fn proxy_error(url: &Url) -> Error {
    Error::InvalidOption {
        name: "proxy".to_string(),
        value: url.to_string(),
    }
}
