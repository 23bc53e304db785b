//! Rules for mapped VAST documents.

use super::{Checker, TIME, TIME_OR_PERCENT};
use crate::error::ValidationError;
use crate::models::vast::*;
use crate::models::{Content, Parsed};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[23](?:\.\d+)?$").expect("Invalid VAST version regex"));

static CURRENCY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]{3}$").expect("Invalid currency regex"));

/// How a creative field is treated for a given kind of ad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    Optional,
    /// Accepted as is, never checked
    Tolerated,
}

impl Presence {
    fn checked(self) -> bool {
        self != Presence::Tolerated
    }
}

/// Creative rules that depend on the kind of the enclosing ad
#[derive(Debug)]
struct CreativeRules {
    duration: Presence,
    skipoffset: Presence,
    media_files: Presence,
    ad_parameters: Presence,
}

const INLINE_CREATIVE: CreativeRules = CreativeRules {
    duration: Presence::Required,
    skipoffset: Presence::Optional,
    media_files: Presence::Optional,
    ad_parameters: Presence::Optional,
};

// fields a wrapper creative does not declare pass through unchecked
const WRAPPER_CREATIVE: CreativeRules = CreativeRules {
    duration: Presence::Tolerated,
    skipoffset: Presence::Tolerated,
    media_files: Presence::Tolerated,
    ad_parameters: Presence::Tolerated,
};

fn creative_rules(kind: AdKind) -> &'static CreativeRules {
    match kind {
        AdKind::Inline => &INLINE_CREATIVE,
        AdKind::Wrapper => &WRAPPER_CREATIVE,
    }
}

/// Validate a VAST document, reporting every violation found
pub fn validate(doc: &VastDocument) -> Result<(), ValidationError> {
    let mut checker = Checker::new();
    check(doc, &mut checker);
    let result = checker.finish();
    match &result {
        Ok(()) => debug!("VAST document is valid"),
        Err(err) => debug!("VAST document has {} violation(s)", err.details().len()),
    }
    result
}

/// Check `doc` at the checker's current path
pub(crate) fn check(doc: &VastDocument, checker: &mut Checker) {
    let version = checker.required("version", doc.version.as_deref());
    checker.pattern("version", version, &VERSION, "VAST version");
    checker.items("ads", &doc.ads, check_ad);
}

fn check_ad(checker: &mut Checker, ad: &Ad) {
    check_ad_base(checker, ad.base(), ad.kind());
    match ad {
        Ad::Inline(inline) => {
            if let Some(pricing) = &inline.pricing {
                checker.field("pricing", |checker| check_pricing(checker, pricing));
            }
            checker.http_uri("survey", inline.survey.as_deref());
        }
        Ad::Wrapper(wrapper) => {
            let uri = checker.required("VASTAdTagURI", wrapper.vast_ad_tag_uri.as_deref());
            checker.http_uri("VASTAdTagURI", uri);
        }
    }
}

fn check_ad_base(checker: &mut Checker, base: &AdBase, kind: AdKind) {
    checker.field("adSystem", |checker| {
        let name = checker.required("name", base.ad_system.name.as_deref());
        checker.non_empty("name", name);
        checker.non_empty("version", base.ad_system.version.as_deref());
    });

    match &base.impressions {
        None => checker.fail_at("impressions", "is required"),
        Some(impressions) if impressions.is_empty() => {
            checker.fail_at("impressions", "must contain at least 1 item")
        }
        Some(impressions) => checker.items("impressions", impressions, |checker, impression| {
            let uri = checker.required("uri", impression.uri.as_deref());
            checker.http_uri("uri", uri);
        }),
    }

    match &base.creatives {
        None => checker.fail_at("creatives", "is required"),
        Some(creatives) => {
            let rules = creative_rules(kind);
            checker.items("creatives", creatives, |checker, creative| {
                check_creative(checker, creative, rules)
            });
        }
    }

    checker.http_uri("error", base.error.as_deref());
}

fn check_pricing(checker: &mut Checker, pricing: &Pricing) {
    match &pricing.value {
        Parsed::Valid(value) if !value.is_finite() => {
            checker.fail_at("value", format!("{value} must be a number"))
        }
        Parsed::Valid(value) if *value < 0.0 => {
            checker.fail_at("value", format!("{value} must be greater than or equal to 0"))
        }
        Parsed::Invalid(raw) => checker.fail_at("value", format!("\"{raw}\" must be a number")),
        Parsed::Valid(_) => (),
    }
    checker.symbol("model", &pricing.model);
    let currency = checker.required("currency", pricing.currency.as_deref());
    checker.pattern("currency", currency, &CURRENCY, "ISO 4217 currency");
}

fn check_creative(checker: &mut Checker, creative: &Creative, rules: &CreativeRules) {
    let duration = match rules.duration {
        Presence::Required => checker.required("duration", creative.duration.as_deref()),
        Presence::Optional => creative.duration.as_deref(),
        Presence::Tolerated => None,
    };
    checker.pattern("duration", duration, &TIME, "hh:mm:ss[.mmm]");

    if rules.skipoffset.checked() {
        checker.pattern(
            "skipoffset",
            creative.skipoffset.as_deref(),
            &TIME_OR_PERCENT,
            "hh:mm:ss[.mmm] or n%",
        );
    }

    if rules.media_files.checked() {
        match &creative.media_files {
            Some(files) if files.is_empty() => {
                checker.fail_at("mediaFiles", "must contain at least 1 item")
            }
            Some(files) => checker.items("mediaFiles", files, check_media_file),
            None if rules.media_files == Presence::Required => {
                checker.fail_at("mediaFiles", "is required")
            }
            None => (),
        }
    }

    if rules.ad_parameters.checked() {
        if let Some(parameters) = &creative.ad_parameters {
            checker.field("adParameters", |checker| check_ad_parameters(checker, parameters));
        }
    }

    if let Some(trackings) = &creative.trackings {
        checker.items("trackings", trackings, check_tracking);
    }

    if let Some(clicks) = &creative.video_clicks {
        checker.field("videoClicks", |checker| {
            if let Some(click) = &clicks.click_through {
                checker.field("clickThrough", |checker| check_click(checker, click));
            }
            if let Some(trackings) = &clicks.click_trackings {
                checker.items("clickTrackings", trackings, check_click);
            }
            if let Some(custom) = &clicks.custom_clicks {
                checker.items("customClicks", custom, check_click);
            }
        });
    }

    if let Some(sequence) = &creative.sequence {
        checker.integer("sequence", sequence);
    }
}

fn check_ad_parameters(checker: &mut Checker, parameters: &AdParameters) {
    match (&parameters.value, parameters.xml_encoded) {
        (Content::Text(_), true) => checker.fail_at("value", "must be a document fragment when xmlEncoded"),
        (Content::Fragment(_), false) => checker.fail_at("value", "must be a string unless xmlEncoded"),
        _ => (),
    }
}

fn check_tracking(checker: &mut Checker, tracking: &TrackingEvent) {
    let event = checker.symbol("event", &tracking.event);
    let uri = checker.required("uri", tracking.uri.as_deref());
    checker.http_uri("uri", uri);

    let offset = tracking.offset.as_deref();
    if event == Some(TrackingEventType::Progress) {
        let offset = checker.required("offset", offset);
        checker.pattern("offset", offset, &TIME_OR_PERCENT, "hh:mm:ss[.mmm] or n%");
    } else {
        checker.forbidden("offset", offset, "unless event is progress");
    }
}

fn check_click(checker: &mut Checker, click: &Click) {
    checker.http_uri("uri", Some(click.uri.as_str()));
}

fn check_media_file(checker: &mut Checker, file: &MediaFile) {
    checker.non_empty("uri", Some(file.uri.as_str()));
    checker.symbol("delivery", &file.delivery);
    checker.non_empty("mimetype", Some(file.mimetype.as_str()));
    checker.integer("width", &file.width);
    checker.integer("height", &file.height);

    let bitrates = [
        ("bitrate", &file.bitrate),
        ("minBitrate", &file.min_bitrate),
        ("maxBitrate", &file.max_bitrate),
    ];
    for (name, value) in bitrates {
        if let Some(value) = value {
            checker.positive(name, value);
        }
    }

    // bitrate XOR (minBitrate AND maxBitrate)
    if file.bitrate.is_some() {
        if file.min_bitrate.is_some() {
            checker.fail_at("bitrate", "conflicts with forbidden peer minBitrate");
        }
        if file.max_bitrate.is_some() {
            checker.fail_at("bitrate", "conflicts with forbidden peer maxBitrate");
        }
    }
    match (&file.min_bitrate, &file.max_bitrate) {
        (Some(_), None) => checker.fail_at("maxBitrate", "is required with minBitrate"),
        (None, Some(_)) => checker.fail_at("minBitrate", "is required with maxBitrate"),
        _ => (),
    }
}
