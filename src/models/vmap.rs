use super::vast::VastDocument;
use super::{Content, Parsed, Symbol};
use serde::Serialize;

/// Represents a VMAP document (Video Multiple Ad Playlist)
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct VmapDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Ad breaks, in document order
    pub breaks: Vec<AdBreak>,
}

/// A single placement opportunity in the playlist
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdBreak {
    /// `hh:mm:ss[.mmm]`, `n%`, `start`, `end` or `#m`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_offset: Option<String>,

    /// Kinds of ads the break accepts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_types: Option<Vec<Parsed<AdBreakType>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<AdSource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trackings: Option<Vec<BreakTracking>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<BreakExtension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Replay the break every time this duration elapses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_after: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum AdBreakType {
    Linear,
    Nonlinear,
    Display,
}

impl Symbol for AdBreakType {
    const ALL: &'static [Self] = &[
        AdBreakType::Linear,
        AdBreakType::Nonlinear,
        AdBreakType::Display,
    ];

    fn name(self) -> &'static str {
        match self {
            AdBreakType::Linear => "linear",
            AdBreakType::Nonlinear => "nonlinear",
            AdBreakType::Display => "display",
        }
    }
}

/// Break-level tracking uri
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct BreakTracking {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    pub level: Parsed<BreakEvent>,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum BreakEvent {
    BreakStart,
    BreakEnd,
    Error,
}

impl Symbol for BreakEvent {
    const ALL: &'static [Self] = &[BreakEvent::BreakStart, BreakEvent::BreakEnd, BreakEvent::Error];

    fn name(self) -> &'static str {
        match self {
            BreakEvent::BreakStart => "breakStart",
            BreakEvent::BreakEnd => "breakEnd",
            BreakEvent::Error => "error",
        }
    }
}

/// Information VMAP itself does not define
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BreakExtension {
    /// Generally a uri
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension_type: Option<String>,

    pub value: Content,
}

/// The ad data used to fill a break
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdSource {
    #[serde(flatten)]
    pub data: AdSourceData,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Whether several ads may play in the break; `true` once validated if
    /// the document leaves it out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_multiple_ads: Option<Parsed<bool>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_redirects: Option<Parsed<bool>>,
}

/// The three mutually exclusive payloads of an ad source
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(tag = "dataType")]
pub enum AdSourceData {
    /// An inline VAST 3 document
    #[serde(rename = "VAST3")]
    Vast3 {
        #[serde(rename = "VASTAdData")]
        vast_ad_data: VastDocument,
    },

    /// An inline ad response that is not VAST 3
    #[serde(rename = "custom", rename_all = "camelCase")]
    Custom {
        #[serde(skip_serializing_if = "Option::is_none")]
        custom_ad_data: Option<Content>,

        #[serde(skip_serializing_if = "Option::is_none")]
        ad_data_type: Option<Parsed<CustomTemplate>>,
    },

    /// A uri to a secondary ad server
    #[serde(rename = "adTagURI")]
    AdTagUri {
        #[serde(rename = "adTagURI", skip_serializing_if = "Option::is_none")]
        ad_tag_uri: Option<String>,

        #[serde(rename = "adDataType", skip_serializing_if = "Option::is_none")]
        ad_data_type: Option<Parsed<AdTagTemplate>>,
    },
}

impl AdSourceData {
    pub fn kind(&self) -> AdSourceKind {
        match self {
            AdSourceData::Vast3 { .. } => AdSourceKind::Vast3,
            AdSourceData::Custom { .. } => AdSourceKind::Custom,
            AdSourceData::AdTagUri { .. } => AdSourceKind::AdTagUri,
        }
    }
}

/// Discriminant of [`AdSourceData`]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AdSourceKind {
    Vast3,
    Custom,
    AdTagUri,
}

/// `templateType` of `<CustomAdData>`
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum CustomTemplate {
    Vast1,
    Vast2,
    Proprietary,
}

impl Symbol for CustomTemplate {
    const ALL: &'static [Self] = &[
        CustomTemplate::Vast1,
        CustomTemplate::Vast2,
        CustomTemplate::Proprietary,
    ];

    fn name(self) -> &'static str {
        match self {
            CustomTemplate::Vast1 => "vast1",
            CustomTemplate::Vast2 => "vast2",
            CustomTemplate::Proprietary => "proprietary",
        }
    }
}

/// `templateType` of `<AdTagURI>`
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum AdTagTemplate {
    Vast1,
    Vast2,
    Vast3,
    Proprietary,
}

impl Symbol for AdTagTemplate {
    const ALL: &'static [Self] = &[
        AdTagTemplate::Vast1,
        AdTagTemplate::Vast2,
        AdTagTemplate::Vast3,
        AdTagTemplate::Proprietary,
    ];

    fn name(self) -> &'static str {
        match self {
            AdTagTemplate::Vast1 => "vast1",
            AdTagTemplate::Vast2 => "vast2",
            AdTagTemplate::Vast3 => "vast3",
            AdTagTemplate::Proprietary => "proprietary",
        }
    }
}
