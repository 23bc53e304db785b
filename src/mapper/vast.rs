//! Attributed tree → [`VastDocument`].

use crate::error::ParseFailure;
use crate::models::vast::*;
use crate::models::{lenient_flag, Content, Parsed};
use crate::tree::Node;
use log::{debug, warn};

const ROOT: &str = "VAST";

/// Map a tree whose root element is `<VAST>`.
///
/// Fails on structural problems only; bad enumeration tokens, numbers and
/// missing required values are kept for the validator to report.
pub fn map(tree: &Node) -> Result<VastDocument, ParseFailure> {
    let root = match tree.children(ROOT) {
        [] => return Err(ParseFailure::structure("No <VAST> root tag")),
        [root] => root,
        _ => return Err(ParseFailure::structure("Only one <VAST> tag is allowed")),
    };

    let ads = root
        .children("Ad")
        .iter()
        .map(map_ad)
        .collect::<Result<Vec<_>, _>>()?;
    debug!("Mapped VAST document with {} ad(s)", ads.len());

    Ok(VastDocument {
        version: root.attr("version").map(str::to_string),
        ads,
    })
}

/// Map a single `<Ad>`; the InLine/Wrapper child decides the variant
fn map_ad(container: &Node) -> Result<Ad, ParseFailure> {
    let inline = container.first("InLine");
    let wrapper = container.first("Wrapper");

    match (inline, wrapper) {
        (Some(_), Some(_)) => Err(ParseFailure::structure(
            "<Ad> cannot contain a <InLine> AND a <Wrapper> element",
        )),
        (Some(element), None) => Ok(Ad::Inline(InlineAd {
            base: map_ad_base(container, element)?,
            ad_title: element.child_text("AdTitle").unwrap_or_default().to_string(),
            description: child_string(element, "Description"),
            advertiser: child_string(element, "Advertiser"),
            pricing: map_pricing(element)?,
            survey: child_string(element, "Survey"),
        })),
        (None, Some(element)) => Ok(Ad::Wrapper(WrapperAd {
            base: map_ad_base(container, element)?,
            vast_ad_tag_uri: child_string(element, "VASTAdTagURI"),
        })),
        (None, None) => Err(ParseFailure::structure(
            "<Ad> element does not contain an <InLine> or <Wrapper> element",
        )),
    }
}

fn map_ad_base(container: &Node, element: &Node) -> Result<AdBase, ParseFailure> {
    let ad_system = element
        .first("AdSystem")
        .map(|system| AdSystem {
            name: system.text().map(str::to_string),
            version: system.attr("version").map(str::to_string),
        })
        .unwrap_or_default();

    // a zero or unreadable sequence is treated as absent
    let sequence = container
        .attr("sequence")
        .and_then(|raw| Parsed::<i64>::leading_integer(raw).valid().copied())
        .filter(|sequence| *sequence != 0);

    let extensions = element
        .first("Extensions")
        .map(|extensions| extensions.children("Extension"))
        .filter(|list| !list.is_empty())
        .map(<[Node]>::to_vec);

    Ok(AdBase {
        ad_system,
        impressions: map_impressions(element),
        creatives: map_creatives(element)?,
        id: container.attr("id").map(str::to_string),
        sequence,
        error: child_string(element, "Error"),
        extensions,
    })
}

fn map_impressions(element: &Node) -> Option<Vec<Impression>> {
    let impressions: Vec<Impression> = element
        .children("Impression")
        .iter()
        .map(|impression| Impression {
            uri: impression.text().map(str::to_string),
            id: impression.attr("id").map(str::to_string),
        })
        .collect();
    (!impressions.is_empty()).then_some(impressions)
}

fn map_pricing(element: &Node) -> Result<Option<Pricing>, ParseFailure> {
    let Some(pricing) = element.single("Pricing", "<InLine> can contain only one <Pricing>")? else {
        return Ok(None);
    };
    Ok(Some(Pricing {
        value: Parsed::<f64>::leading_number(pricing.text().unwrap_or_default()),
        model: Parsed::symbol(pricing.attr("model").unwrap_or_default()),
        currency: pricing.attr("currency").map(str::to_string),
    }))
}

fn map_creatives(element: &Node) -> Result<Option<Vec<Creative>>, ParseFailure> {
    let Some(container) = element.first("Creatives") else {
        return Ok(None);
    };
    let mut creatives = Vec::new();
    for creative in container.children("Creative") {
        if let Some(creative) = map_creative(creative)? {
            creatives.push(creative);
        }
    }
    Ok(Some(creatives))
}

/// Map a `<Creative>`. Only `<Linear>` creatives are modelled: a creative
/// holding only companion or non-linear ads yields `None`.
fn map_creative(container: &Node) -> Result<Option<Creative>, ParseFailure> {
    let linear = match container.children("Linear") {
        [] => {
            if container.has_child("CompanionAds") || container.has_child("NonLinearAds") {
                warn!("Skipping <Creative> without <Linear>: companion and non-linear ads are not supported");
                return Ok(None);
            }
            return Err(ParseFailure::structure(
                "<Creative> should contain one <Linear>, <CompanionAds> or <NonLinearAds>",
            ));
        }
        [linear] => linear,
        _ => return Err(ParseFailure::structure("<Creative> can contain only one <Linear>")),
    };

    let extensions = match linear.single(
        "CreativeExtensions",
        "<Creative> can contain only one <CreativeExtensions>",
    )? {
        Some(container) => {
            let list = container.children("CreativeExtension");
            (!list.is_empty()).then(|| list.to_vec())
        }
        None => None,
    };

    Ok(Some(Creative {
        creative_type: CreativeType::Linear,
        duration: child_string(linear, "Duration"),
        ad_parameters: map_ad_parameters(linear)?,
        trackings: map_trackings(linear)?,
        video_clicks: map_video_clicks(linear)?,
        media_files: map_media_files(linear),
        skipoffset: linear.attr("skipoffset").map(str::to_string),
        id: container.attr("id").map(str::to_string),
        sequence: container.attr("sequence").map(Parsed::<i64>::exact_integer),
        ad_id: container.attr("AdID").map(str::to_string),
        extensions,
    }))
}

/// Ad parameters travel either as text or as nested markup. XML-encoded
/// parameters keep the raw fragment; otherwise the text wins, and markup is
/// re-serialized to a string.
fn map_ad_parameters(linear: &Node) -> Result<Option<AdParameters>, ParseFailure> {
    let Some(parameters) = linear.single("AdParameters", "<Creative> can contain only one <AdParameters>")?
    else {
        return Ok(None);
    };
    let xml_encoded = parameters.attr("xmlEncoded") == Some("true");
    let value = if xml_encoded {
        Content::Fragment(parameters.clone())
    } else if let Some(text) = parameters.text() {
        Content::Text(text.to_string())
    } else {
        Content::Text(parameters.children_to_xml()?)
    };
    Ok(Some(AdParameters { xml_encoded, value }))
}

fn map_trackings(linear: &Node) -> Result<Option<Vec<TrackingEvent>>, ParseFailure> {
    let Some(container) = linear.single("TrackingEvents", "<Creative> can contain only one <TrackingEvents>")?
    else {
        return Ok(None);
    };
    let trackings: Vec<TrackingEvent> = container
        .children("Tracking")
        .iter()
        .map(|tracking| TrackingEvent {
            event: Parsed::symbol(tracking.attr("event").unwrap_or_default()),
            uri: tracking.text().map(str::to_string),
            offset: tracking.attr("offset").map(str::to_string),
        })
        .collect();
    Ok((!trackings.is_empty()).then_some(trackings))
}

fn map_video_clicks(linear: &Node) -> Result<Option<VideoClicks>, ParseFailure> {
    let Some(container) = linear.single("VideoClicks", "<Creative> can contain only one <VideoClicks>")?
    else {
        return Ok(None);
    };
    let click_through = container
        .single("ClickThrough", "<VideoClicks> can contain only one <ClickThrough>")?
        .and_then(map_click);

    let clicks = |tag: &str| {
        let list: Vec<Click> = container.children(tag).iter().filter_map(map_click).collect();
        (!list.is_empty()).then_some(list)
    };
    let video_clicks = VideoClicks {
        click_through,
        click_trackings: clicks("ClickTracking"),
        custom_clicks: clicks("CustomClick"),
    };

    let empty = video_clicks.click_through.is_none()
        && video_clicks.click_trackings.is_none()
        && video_clicks.custom_clicks.is_none();
    Ok((!empty).then_some(video_clicks))
}

fn map_click(node: &Node) -> Option<Click> {
    let uri = node.text().filter(|uri| !uri.is_empty())?;
    Some(Click {
        uri: uri.to_string(),
        id: node.attr("id").map(str::to_string),
    })
}

/// Only the first `<MediaFiles>` container is read
fn map_media_files(linear: &Node) -> Option<Vec<MediaFile>> {
    let media_files: Vec<MediaFile> = linear
        .first("MediaFiles")?
        .children("MediaFile")
        .iter()
        .filter_map(map_media_file)
        .collect();
    (!media_files.is_empty()).then_some(media_files)
}

/// A `<MediaFile>` lacking any of delivery, type, width, height or its uri
/// is skipped.
fn map_media_file(node: &Node) -> Option<MediaFile> {
    let present = |name: &str| node.attr(name).filter(|value| !value.is_empty());
    let (Some(delivery), Some(mime), Some(width), Some(height), Some(uri)) = (
        present("delivery"),
        present("type"),
        present("width"),
        present("height"),
        node.text().filter(|uri| !uri.is_empty()),
    ) else {
        warn!("Skipping incomplete <MediaFile>");
        return None;
    };

    let attr = |name: &str| node.attr(name).map(str::to_string);
    let integer = |name: &str| node.attr(name).map(Parsed::<i64>::leading_integer);
    let flag = |name: &str| node.attr(name).map(lenient_flag);

    Some(MediaFile {
        uri: uri.to_string(),
        delivery: Parsed::symbol(delivery),
        // an explicit mimetype attribute takes over from type
        mimetype: node.attr("mimetype").unwrap_or(mime).to_string(),
        width: Parsed::<i64>::leading_integer(width),
        height: Parsed::<i64>::leading_integer(height),
        id: attr("id"),
        bitrate: integer("bitrate"),
        min_bitrate: integer("minBitrate"),
        max_bitrate: integer("maxBitrate"),
        scalable: flag("scalable"),
        maintain_aspect_ratio: flag("maintainAspectRatio"),
        api_framework: attr("apiFramework"),
        codec: attr("codec"),
    })
}

fn child_string(element: &Node, tag: &str) -> Option<String> {
    element.child_text(tag).map(str::to_string)
}
