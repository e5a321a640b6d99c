// Adapters layer: concrete implementations of the lookup ports (http, whois, dns, search).

pub mod dns;
pub mod http;
pub mod search;
pub mod whois;

pub use dns::SystemResolver;
pub use http::HttpPageFetcher;
pub use search::WebSearch;
pub use whois::WhoisClient;
