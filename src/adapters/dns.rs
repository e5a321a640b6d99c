use crate::domain::ports::DnsResolver;
use crate::utils::error::{LookupError, LookupResult};
use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;
use std::time::Duration;

/// Resolves A/AAAA records with hickory, configured from the host's
/// resolv.conf when it can be read.
#[derive(Clone)]
pub struct SystemResolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl SystemResolver {
    pub fn new(timeout: Duration) -> Self {
        let (config, mut opts) = hickory_resolver::system_conf::read_system_conf()
            .unwrap_or_else(|e| {
                tracing::debug!("system resolver config unavailable, using defaults: {}", e);
                (ResolverConfig::default(), ResolverOpts::default())
            });
        opts.timeout = timeout;
        opts.attempts = 1;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout,
        }
    }

    fn classify(&self, domain: &str, error: ResolveError) -> LookupResult<Vec<IpAddr>> {
        match error.kind() {
            // NXDOMAIN 或沒有位址記錄：查詢成功但無結果
            ResolveErrorKind::NoRecordsFound { .. } => {
                tracing::debug!("{} has no address records", domain);
                Ok(Vec::new())
            }
            ResolveErrorKind::Timeout => Err(LookupError::Timeout(self.timeout)),
            _ => Err(LookupError::Dns(error.to_string())),
        }
    }
}

#[async_trait]
impl DnsResolver for SystemResolver {
    async fn resolve(&self, domain: &str) -> LookupResult<Vec<IpAddr>> {
        if domain.is_empty() {
            return Err(LookupError::InvalidTarget(domain.to_string()));
        }

        let lookup = tokio::time::timeout(self.timeout, self.resolver.lookup_ip(domain))
            .await
            .map_err(|_| LookupError::Timeout(self.timeout))?;

        match lookup {
            Ok(found) => {
                let mut ips: Vec<IpAddr> = found.iter().collect();
                ips.dedup();
                tracing::debug!("{} resolved to {:?}", domain, ips);
                Ok(ips)
            }
            Err(e) => self.classify(domain, e),
        }
    }
}
