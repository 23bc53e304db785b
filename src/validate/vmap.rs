//! Rules for mapped VMAP documents.

use super::{vast, Checker, POSITION, TIME, TIME_OR_PERCENT};
use crate::error::ValidationError;
use crate::models::vmap::*;
use crate::models::Parsed;
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1(?:\.\d+)?$").expect("Invalid VMAP version regex"));

/// Validate a VMAP document. On success, ad sources that leave
/// `allowMultipleAds` out get the default `true`; on failure the document is
/// left untouched.
pub fn validate(doc: &mut VmapDocument) -> Result<(), ValidationError> {
    let mut checker = Checker::new();
    check(doc, &mut checker);
    if checker.is_clean() {
        apply_defaults(doc);
        debug!("VMAP document is valid");
    }
    checker.finish()
}

fn apply_defaults(doc: &mut VmapDocument) {
    for source in doc.breaks.iter_mut().filter_map(|adbreak| adbreak.source.as_mut()) {
        source.allow_multiple_ads.get_or_insert(Parsed::Valid(true));
    }
}

fn check(doc: &VmapDocument, checker: &mut Checker) {
    let version = checker.required("version", doc.version.as_deref());
    checker.pattern("version", version, &VERSION, "VMAP version");
    checker.items("breaks", &doc.breaks, check_break);
}

fn is_time_offset(offset: &str) -> bool {
    matches!(offset, "start" | "end") || TIME_OR_PERCENT.is_match(offset) || POSITION.is_match(offset)
}

fn check_break(checker: &mut Checker, adbreak: &AdBreak) {
    if let Some(offset) = checker.required("timeOffset", adbreak.time_offset.as_deref()) {
        if !is_time_offset(offset) {
            checker.fail_at(
                "timeOffset",
                format!("\"{offset}\" must be hh:mm:ss[.mmm], n%, start, end or #m"),
            );
        }
    }

    match &adbreak.break_types {
        None => checker.fail_at("breakTypes", "is required"),
        Some(types) if types.is_empty() => checker.fail_at("breakTypes", "must contain at least 1 item"),
        Some(types) => checker.items("breakTypes", types, |checker, value| {
            checker.symbol_here(value);
        }),
    }

    checker.pattern("repeatAfter", adbreak.repeat_after.as_deref(), &TIME, "hh:mm:ss[.mmm]");

    if let Some(source) = &adbreak.source {
        checker.field("source", |checker| check_source(checker, source));
    }

    if let Some(trackings) = &adbreak.trackings {
        checker.items("trackings", trackings, |checker, tracking| {
            let uri = checker.required("uri", tracking.uri.as_deref());
            checker.url("uri", uri);
            checker.symbol("level", &tracking.level);
        });
    }

    if let Some(extensions) = &adbreak.extensions {
        checker.items("extensions", extensions, |checker, extension| {
            let extension_type = checker.required("extensionType", extension.extension_type.as_deref());
            checker.non_empty("extensionType", extension_type);
        });
    }
}

fn check_source(checker: &mut Checker, source: &AdSource) {
    match &source.data {
        AdSourceData::Vast3 { vast_ad_data } => {
            checker.field("VASTAdData", |checker| vast::check(vast_ad_data, checker));
        }
        AdSourceData::Custom {
            custom_ad_data,
            ad_data_type,
        } => {
            checker.required("customAdData", custom_ad_data.as_ref());
            if let Some(template) = checker.required("adDataType", ad_data_type.as_ref()) {
                checker.symbol("adDataType", template);
            }
        }
        AdSourceData::AdTagUri {
            ad_tag_uri,
            ad_data_type,
        } => {
            let uri = checker.required("adTagURI", ad_tag_uri.as_deref());
            checker.url("adTagURI", uri);
            if let Some(template) = checker.required("adDataType", ad_data_type.as_ref()) {
                checker.symbol("adDataType", template);
            }
        }
    }

    checker.non_empty("id", source.id.as_deref());
    if let Some(flag) = &source.allow_multiple_ads {
        checker.flag("allowMultipleAds", flag);
    }
    if let Some(flag) = &source.follow_redirects {
        checker.flag("followRedirects", flag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::vmap::map;
    use crate::tree::parse_xml;
    use pretty_assertions::assert_eq;

    fn document(breaks: &str) -> VmapDocument {
        let xml = format!(
            r#"<vmap:VMAP xmlns:vmap="http://www.iab.net/videosuite/vmap" version="1.0">{breaks}</vmap:VMAP>"#
        );
        map(&parse_xml(&xml).unwrap()).unwrap()
    }

    fn paths(doc: &mut VmapDocument) -> Vec<String> {
        match validate(doc) {
            Ok(()) => Vec::new(),
            Err(err) => err.details().iter().map(|v| v.path.clone()).collect(),
        }
    }

    const AD_TAG: &str = r#"<vmap:AdSource id="tag"><vmap:AdTagURI templateType="vast3">http://x/tag</vmap:AdTagURI></vmap:AdSource>"#;

    #[test]
    fn default_allow_multiple_ads_on_success() {
        let mut doc = document(&format!(
            r##"<vmap:AdBreak timeOffset="start" breakType="linear">{AD_TAG}</vmap:AdBreak>
            <vmap:AdBreak timeOffset="end" breakType="linear"><vmap:AdSource allowMultipleAds="false">
            <vmap:CustomAdData templateType="proprietary">data</vmap:CustomAdData></vmap:AdSource></vmap:AdBreak>
            <vmap:AdBreak timeOffset="#1" breakType="display"/>"##
        ));
        assert!(doc.breaks[0].source.as_ref().unwrap().allow_multiple_ads.is_none());

        validate(&mut doc).unwrap();
        let flags: Vec<_> = doc
            .breaks
            .iter()
            .map(|adbreak| adbreak.source.as_ref().map(|s| s.allow_multiple_ads.clone()))
            .collect();
        assert_eq!(
            flags,
            vec![
                Some(Some(Parsed::Valid(true))),
                Some(Some(Parsed::Valid(false))),
                None,
            ]
        );

        // a second pass changes nothing
        let before = doc.clone();
        validate(&mut doc).unwrap();
        assert_eq!(doc, before);
    }

    #[test]
    fn failure_leaves_document_untouched() {
        let mut doc = document(&format!(
            r#"<vmap:AdBreak timeOffset="start" breakType="linear">{AD_TAG}</vmap:AdBreak>
            <vmap:AdBreak timeOffset="later" breakType="linear"/>"#
        ));
        let before = doc.clone();
        assert_eq!(paths(&mut doc), vec!["breaks[1].timeOffset"]);
        assert_eq!(doc, before);
    }

    #[test]
    fn time_offset_shapes() {
        for valid in ["start", "end", "#1", "#12", "0%", "50%", "100%", "00:00:10", "01:00:00.000"] {
            let mut doc = document(&format!(r#"<vmap:AdBreak timeOffset="{valid}" breakType="linear"/>"#));
            assert!(validate(&mut doc).is_ok(), "{valid}");
        }
        for invalid in ["middle", "#a", "101%", "10", "0:00:10"] {
            let mut doc = document(&format!(r#"<vmap:AdBreak timeOffset="{invalid}" breakType="linear"/>"#));
            assert_eq!(paths(&mut doc), vec!["breaks[0].timeOffset"], "{invalid}");
        }
    }

    #[test]
    fn unknown_break_type_fails_validation() {
        let mut doc = document(r#"<vmap:AdBreak timeOffset="start" breakType="linear,popup"/>"#);
        let err = validate(&mut doc).unwrap_err();
        assert_eq!(
            err.details()[0].to_string(),
            "breaks[0].breakTypes[1]: \"popup\" must be one of [linear, nonlinear, display]"
        );

        let mut doc = document(r#"<vmap:AdBreak timeOffset="start"/>"#);
        assert_eq!(paths(&mut doc), vec!["breaks[0].breakTypes"]);
    }

    #[test]
    fn embedded_vast_paths_are_prefixed() {
        let mut doc = document(
            r#"<vmap:AdBreak timeOffset="start" breakType="linear"><vmap:AdSource><vmap:VASTAdData>
            <VAST version="3.0"><Ad><InLine><AdSystem>s</AdSystem><Creatives/></InLine></Ad></VAST>
            </vmap:VASTAdData></vmap:AdSource></vmap:AdBreak>"#,
        );
        assert_eq!(
            paths(&mut doc),
            vec!["breaks[0].source.VASTAdData.ads[0].impressions"]
        );
    }

    #[test]
    fn source_payload_rules() {
        let mut doc = document(
            r#"<vmap:AdBreak timeOffset="start" breakType="linear"><vmap:AdSource id="" followRedirects="yes">
            <vmap:AdTagURI templateType="vast4">not a url</vmap:AdTagURI></vmap:AdSource></vmap:AdBreak>
            <vmap:AdBreak timeOffset="end" breakType="linear"><vmap:AdSource allowMultipleAds="1">
            <vmap:CustomAdData/></vmap:AdSource></vmap:AdBreak>"#,
        );
        assert_eq!(
            paths(&mut doc),
            vec![
                "breaks[0].source.adTagURI",
                "breaks[0].source.adDataType",
                "breaks[0].source.id",
                "breaks[0].source.followRedirects",
                "breaks[1].source.customAdData",
                "breaks[1].source.adDataType",
                "breaks[1].source.allowMultipleAds",
            ]
        );
        // a malformed flag is never replaced by the default
        assert_eq!(
            doc.breaks[1].source.as_ref().unwrap().allow_multiple_ads,
            Some(Parsed::Invalid("1".to_string()))
        );
    }

    #[test]
    fn trackings_and_extensions() {
        let mut doc = document(
            r#"<vmap:AdBreak timeOffset="start" breakType="linear" repeatAfter="00:10:00">
            <vmap:TrackingEvents><vmap:Tracking event="breakStart">http://x/start</vmap:Tracking>
            <vmap:Tracking event="breakMiddle">http://x/middle</vmap:Tracking>
            <vmap:Tracking event="error">relative/path</vmap:Tracking></vmap:TrackingEvents>
            <vmap:Extensions><vmap:Extension type="http://x/ext">a</vmap:Extension>
            <vmap:Extension>b</vmap:Extension></vmap:Extensions></vmap:AdBreak>"#,
        );
        assert_eq!(
            paths(&mut doc),
            vec![
                "breaks[0].trackings[1].level",
                "breaks[0].trackings[2].uri",
                "breaks[0].extensions[1].extensionType",
            ]
        );
    }

    #[test]
    fn version_must_be_one() {
        let mut doc = document("");
        doc.version = Some("2.0".to_string());
        assert_eq!(paths(&mut doc), vec!["version"]);
        doc.version = Some("1.0.1".to_string());
        assert_eq!(paths(&mut doc), vec!["version"]);
        doc.version = Some("1".to_string());
        assert!(validate(&mut doc).is_ok());
    }
}
