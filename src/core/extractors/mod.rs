//! Per-feature heuristics.
//!
//! Every extractor returns a [`Signal`](crate::domain::model::Signal); lookup
//! failures become `Signal::Indeterminate` and never escape as errors.

pub mod content;
pub mod lexical;
pub mod registry;

pub use content::{
    count_links_in_anchors, count_links_in_scripts, count_links_pointing_to_page,
    disable_right_click, has_favicon, has_iframe, has_info_email, has_popup_window,
    status_bar_customization, website_forwarding,
};
pub use lexical::{
    abnormal_url, check_https, check_https_in_domain, check_ip_in_url, check_non_standard_port,
    check_shortening_service, contains_symbol, count_subdomains, get_url_length,
    registered_domain, DomainParts,
};
pub use registry::{dns_record_exists, domain_registration_length, google_index, website_traffic};
