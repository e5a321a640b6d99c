use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 訊號偏向哪一類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lean {
    Legitimate,
    Phishing,
}

impl Lean {
    pub fn opposite(self) -> Self {
        match self {
            Lean::Legitimate => Lean::Phishing,
            Lean::Phishing => Lean::Legitimate,
        }
    }
}

/// Output of a single heuristic.
///
/// `Indeterminate` means the lookup behind the heuristic failed or did not
/// apply. It is encoded as 0 only when the vector is handed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Resolved(Lean),
    Indeterminate,
}

impl Signal {
    /// `lean` when the indicator is present, the opposite lean otherwise.
    pub fn indicator(present: bool, lean: Lean) -> Self {
        if present {
            Signal::Resolved(lean)
        } else {
            Signal::Resolved(lean.opposite())
        }
    }

    pub fn encode(self) -> i8 {
        match self {
            Signal::Resolved(Lean::Legitimate) => 1,
            Signal::Resolved(Lean::Phishing) => -1,
            Signal::Indeterminate => 0,
        }
    }
}

/// Canonical feature names, in the order the model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureName {
    UsingIP,
    LongURL,
    ShortURL,
    #[serde(rename = "Symbol@")]
    SymbolAt,
    #[serde(rename = "Redirecting//")]
    RedirectingSlashes,
    #[serde(rename = "PrefixSuffix-")]
    PrefixSuffix,
    SubDomains,
    HTTPS,
    DomainRegLen,
    Favicon,
    NonStdPort,
    HTTPSDomainURL,
    RequestURL,
    AnchorURL,
    LinksInScriptTags,
    ServerFormHandler,
    InfoEmail,
    AbnormalURL,
    WebsiteForwarding,
    StatusBarCust,
    DisableRightClick,
    UsingPopupWindow,
    IframeRedirection,
    AgeofDomain,
    DNSRecording,
    WebsiteTraffic,
    PageRank,
    GoogleIndex,
    LinksPointingToPage,
    StatsReport,
}

impl FeatureName {
    pub const COUNT: usize = 30;

    pub const ALL: [FeatureName; Self::COUNT] = [
        FeatureName::UsingIP,
        FeatureName::LongURL,
        FeatureName::ShortURL,
        FeatureName::SymbolAt,
        FeatureName::RedirectingSlashes,
        FeatureName::PrefixSuffix,
        FeatureName::SubDomains,
        FeatureName::HTTPS,
        FeatureName::DomainRegLen,
        FeatureName::Favicon,
        FeatureName::NonStdPort,
        FeatureName::HTTPSDomainURL,
        FeatureName::RequestURL,
        FeatureName::AnchorURL,
        FeatureName::LinksInScriptTags,
        FeatureName::ServerFormHandler,
        FeatureName::InfoEmail,
        FeatureName::AbnormalURL,
        FeatureName::WebsiteForwarding,
        FeatureName::StatusBarCust,
        FeatureName::DisableRightClick,
        FeatureName::UsingPopupWindow,
        FeatureName::IframeRedirection,
        FeatureName::AgeofDomain,
        FeatureName::DNSRecording,
        FeatureName::WebsiteTraffic,
        FeatureName::PageRank,
        FeatureName::GoogleIndex,
        FeatureName::LinksPointingToPage,
        FeatureName::StatsReport,
    ];

    /// 訓練資料集中的欄位名稱
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureName::UsingIP => "UsingIP",
            FeatureName::LongURL => "LongURL",
            FeatureName::ShortURL => "ShortURL",
            FeatureName::SymbolAt => "Symbol@",
            FeatureName::RedirectingSlashes => "Redirecting//",
            FeatureName::PrefixSuffix => "PrefixSuffix-",
            FeatureName::SubDomains => "SubDomains",
            FeatureName::HTTPS => "HTTPS",
            FeatureName::DomainRegLen => "DomainRegLen",
            FeatureName::Favicon => "Favicon",
            FeatureName::NonStdPort => "NonStdPort",
            FeatureName::HTTPSDomainURL => "HTTPSDomainURL",
            FeatureName::RequestURL => "RequestURL",
            FeatureName::AnchorURL => "AnchorURL",
            FeatureName::LinksInScriptTags => "LinksInScriptTags",
            FeatureName::ServerFormHandler => "ServerFormHandler",
            FeatureName::InfoEmail => "InfoEmail",
            FeatureName::AbnormalURL => "AbnormalURL",
            FeatureName::WebsiteForwarding => "WebsiteForwarding",
            FeatureName::StatusBarCust => "StatusBarCust",
            FeatureName::DisableRightClick => "DisableRightClick",
            FeatureName::UsingPopupWindow => "UsingPopupWindow",
            FeatureName::IframeRedirection => "IframeRedirection",
            FeatureName::AgeofDomain => "AgeofDomain",
            FeatureName::DNSRecording => "DNSRecording",
            FeatureName::WebsiteTraffic => "WebsiteTraffic",
            FeatureName::PageRank => "PageRank",
            FeatureName::GoogleIndex => "GoogleIndex",
            FeatureName::LinksPointingToPage => "LinksPointingToPage",
            FeatureName::StatsReport => "StatsReport",
        }
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, named signals for one URL.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(FeatureName, Signal)>,
}

impl FeatureVector {
    pub fn new(entries: Vec<(FeatureName, Signal)>) -> Self {
        Self { entries }
    }

    /// Every lookup failed.
    pub fn indeterminate() -> Self {
        Self::new(
            FeatureName::ALL
                .iter()
                .map(|name| (*name, Signal::Indeterminate))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: FeatureName) -> Option<Signal> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, signal)| *signal)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(FeatureName, Signal)> {
        self.entries.iter()
    }

    pub fn encoded(&self) -> Vec<i8> {
        self.entries.iter().map(|(_, signal)| signal.encode()).collect()
    }

    /// 交給模型的數值向量
    pub fn values(&self) -> Vec<f64> {
        self.encoded().into_iter().map(f64::from).collect()
    }
}

/// Serialized as an ordered `{"UsingIP": -1, ...}` map.
impl Serialize for FeatureVector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, signal) in &self.entries {
            map.serialize_entry(name.as_str(), &signal.encode())?;
        }
        map.end()
    }
}

/// Classifier output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Label {
    Phishing,
    Legitimate,
}

impl Label {
    pub fn class(self) -> i8 {
        match self {
            Label::Phishing => -1,
            Label::Legitimate => 1,
        }
    }

    pub fn from_class(class: i64) -> Option<Self> {
        match class {
            -1 => Some(Label::Phishing),
            1 => Some(Label::Legitimate),
            _ => None,
        }
    }

    pub fn verdict(self) -> &'static str {
        match self {
            Label::Phishing => "Phishing",
            Label::Legitimate => "Not Phishing",
        }
    }
}

impl From<Label> for i8 {
    fn from(label: Label) -> Self {
        label.class()
    }
}

impl TryFrom<i8> for Label {
    type Error = String;

    fn try_from(class: i8) -> std::result::Result<Self, Self::Error> {
        Label::from_class(i64::from(class)).ok_or_else(|| format!("unknown class label {}", class))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verdict())
    }
}

/// A fetched page after redirects were followed.
#[derive(Debug, Clone)]
pub struct Page {
    pub final_url: String,
    pub status: u16,
    pub redirects: usize,
    pub body: String,
}

/// Registration dates parsed from a WHOIS response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainRecord {
    pub creation_date: Option<NaiveDateTime>,
    pub expiration_date: Option<NaiveDateTime>,
}

impl DomainRecord {
    pub fn registration_days(&self) -> Option<i64> {
        match (self.creation_date, self.expiration_date) {
            (Some(created), Some(expires)) => Some((expires - created).num_days()),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.creation_date.is_some() && self.expiration_date.is_some()
    }

    /// Fills only the dates still missing.
    pub fn fill_from(&mut self, other: DomainRecord) {
        self.creation_date = self.creation_date.or(other.creation_date);
        self.expiration_date = self.expiration_date.or(other.expiration_date);
    }
}
