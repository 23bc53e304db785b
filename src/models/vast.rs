use super::{Content, Parsed, Symbol};
use crate::tree::Node;
use serde::Serialize;

/// Represents a VAST document (Video Ad Serving Template)
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct VastDocument {
    /// The VAST version ("2.0", "3.0", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// The Ad elements, in document order
    pub ads: Vec<Ad>,
}

/// An Ad: either carries its own creatives (inline) or redirects to another
/// ad server (wrapper). Decided by which of `<InLine>` / `<Wrapper>` is present.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(tag = "adType")]
pub enum Ad {
    #[serde(rename = "inline")]
    Inline(InlineAd),

    #[serde(rename = "wrapper")]
    Wrapper(WrapperAd),
}

impl Ad {
    pub fn kind(&self) -> AdKind {
        match self {
            Ad::Inline(_) => AdKind::Inline,
            Ad::Wrapper(_) => AdKind::Wrapper,
        }
    }

    pub fn base(&self) -> &AdBase {
        match self {
            Ad::Inline(ad) => &ad.base,
            Ad::Wrapper(ad) => &ad.base,
        }
    }
}

/// Discriminant of [`Ad`]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AdKind {
    Inline,
    Wrapper,
}

/// Fields shared by inline and wrapper ads
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdBase {
    /// Source ad server
    pub ad_system: AdSystem,

    /// Impression trackers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impressions: Option<Vec<Impression>>,

    /// Creatives of the ad
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creatives: Option<Vec<Creative>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Position in an ad pod
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i64>,

    /// Uri to request if the ad does not play
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// `<Extension>` elements, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<Node>>,
}

/// Represents an InLine ad, which carries all of its creatives
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InlineAd {
    #[serde(flatten)]
    pub base: AdBase,

    /// Common name of the ad; empty when the document has none
    pub ad_title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertiser: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,

    /// Uri of the survey vendor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survey: Option<String>,
}

/// Represents a Wrapper ad, which references another VAST document
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct WrapperAd {
    #[serde(flatten)]
    pub base: AdBase,

    /// The URL of the downstream VAST document
    #[serde(rename = "VASTAdTagURI", skip_serializing_if = "Option::is_none")]
    pub vast_ad_tag_uri: Option<String>,
}

/// Represents the ad system information
#[derive(Debug, Serialize, PartialEq, Clone, Default)]
pub struct AdSystem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Represents an impression tracking URL
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Impression {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Represents pricing information
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Pricing {
    pub value: Parsed<f64>,

    pub model: Parsed<PricingModel>,

    /// ISO 4217 currency code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum PricingModel {
    /// Cost per click
    Cpc,
    /// Cost per mille
    Cpm,
    /// Cost per engagement
    Cpe,
    /// Cost per view
    Cpv,
}

impl Symbol for PricingModel {
    const ALL: &'static [Self] = &[
        PricingModel::Cpc,
        PricingModel::Cpm,
        PricingModel::Cpe,
        PricingModel::Cpv,
    ];

    fn name(self) -> &'static str {
        match self {
            PricingModel::Cpc => "cpc",
            PricingModel::Cpm => "cpm",
            PricingModel::Cpe => "cpe",
            PricingModel::Cpv => "cpv",
        }
    }
}

/// Represents a creative element. Only linear creatives are modelled.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Creative {
    pub creative_type: CreativeType,

    /// Duration as `hh:mm:ss[.mmm]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_parameters: Option<AdParameters>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trackings: Option<Vec<TrackingEvent>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_clicks: Option<VideoClicks>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_files: Option<Vec<MediaFile>>,

    /// Time at which the ad becomes skippable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipoffset: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<Parsed<i64>>,

    /// Ad-ID of the creative (formerly ISCI)
    #[serde(rename = "adID", skip_serializing_if = "Option::is_none")]
    pub ad_id: Option<String>,

    /// `<CreativeExtension>` elements, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<Node>>,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum CreativeType {
    Linear,
}

/// Data passed into the video ad
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdParameters {
    pub xml_encoded: bool,

    /// Text, re-serialized markup, or (when XML-encoded) the raw fragment
    pub value: Content,
}

/// Represents a tracking event
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct TrackingEvent {
    pub event: Parsed<TrackingEventType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Only for `progress` events: time or percentage of play
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum TrackingEventType {
    CreativeView,
    Start,
    FirstQuartile,
    Midpoint,
    ThirdQuartile,
    Complete,
    Mute,
    Unmute,
    Pause,
    Rewind,
    Resume,
    Fullscreen,
    ExitFullscreen,
    Expand,
    Collapse,
    AcceptInvitation,
    Close,
    Skip,
    Progress,
}

impl Symbol for TrackingEventType {
    const ALL: &'static [Self] = &[
        TrackingEventType::CreativeView,
        TrackingEventType::Start,
        TrackingEventType::FirstQuartile,
        TrackingEventType::Midpoint,
        TrackingEventType::ThirdQuartile,
        TrackingEventType::Complete,
        TrackingEventType::Mute,
        TrackingEventType::Unmute,
        TrackingEventType::Pause,
        TrackingEventType::Rewind,
        TrackingEventType::Resume,
        TrackingEventType::Fullscreen,
        TrackingEventType::ExitFullscreen,
        TrackingEventType::Expand,
        TrackingEventType::Collapse,
        TrackingEventType::AcceptInvitation,
        TrackingEventType::Close,
        TrackingEventType::Skip,
        TrackingEventType::Progress,
    ];

    fn name(self) -> &'static str {
        match self {
            TrackingEventType::CreativeView => "creativeView",
            TrackingEventType::Start => "start",
            TrackingEventType::FirstQuartile => "firstQuartile",
            TrackingEventType::Midpoint => "midpoint",
            TrackingEventType::ThirdQuartile => "thirdQuartile",
            TrackingEventType::Complete => "complete",
            TrackingEventType::Mute => "mute",
            TrackingEventType::Unmute => "unmute",
            TrackingEventType::Pause => "pause",
            TrackingEventType::Rewind => "rewind",
            TrackingEventType::Resume => "resume",
            TrackingEventType::Fullscreen => "fullscreen",
            TrackingEventType::ExitFullscreen => "exitFullscreen",
            TrackingEventType::Expand => "expand",
            TrackingEventType::Collapse => "collapse",
            TrackingEventType::AcceptInvitation => "acceptInvitation",
            TrackingEventType::Close => "close",
            TrackingEventType::Skip => "skip",
            TrackingEventType::Progress => "progress",
        }
    }
}

/// Represents video click-through and click-tracking URLs
#[derive(Debug, Serialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoClicks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_through: Option<Click>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_trackings: Option<Vec<Click>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_clicks: Option<Vec<Click>>,
}

/// A click destination or tracker
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Click {
    pub uri: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Represents a media file
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    pub uri: String,

    pub delivery: Parsed<DeliveryType>,

    pub mimetype: String,

    pub width: Parsed<i64>,

    pub height: Parsed<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Kbps; excludes `min_bitrate`/`max_bitrate`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<Parsed<i64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_bitrate: Option<Parsed<i64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bitrate: Option<Parsed<i64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scalable: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintain_aspect_ratio: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_framework: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum DeliveryType {
    Streaming,
    Progressive,
}

impl Symbol for DeliveryType {
    const ALL: &'static [Self] = &[DeliveryType::Streaming, DeliveryType::Progressive];

    fn name(self) -> &'static str {
        match self {
            DeliveryType::Streaming => "streaming",
            DeliveryType::Progressive => "progressive",
        }
    }
}
