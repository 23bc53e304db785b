//! Attributed tree → [`VmapDocument`].

use super::text_or_fragment;
use crate::error::ParseFailure;
use crate::mapper::vast;
use crate::models::vmap::*;
use crate::models::{Content, Parsed};
use crate::tree::Node;
use log::debug;
use rayon::prelude::*;

const ROOT: &str = "vmap:VMAP";
const AD_BREAK: &str = "vmap:AdBreak";
const AD_SOURCE: &str = "vmap:AdSource";
const VAST_AD_DATA: &str = "vmap:VASTAdData";
const CUSTOM_AD_DATA: &str = "vmap:CustomAdData";
const AD_TAG_URI: &str = "vmap:AdTagURI";
const TRACKING_EVENTS: &str = "vmap:TrackingEvents";
const TRACKING: &str = "vmap:Tracking";
const EXTENSIONS: &str = "vmap:Extensions";
const EXTENSION: &str = "vmap:Extension";

/// Map a tree whose root element is `<vmap:VMAP>`.
///
/// Breaks are independent of each other and are mapped in parallel; the
/// result keeps document order.
pub fn map(tree: &Node) -> Result<VmapDocument, ParseFailure> {
    let root = match tree.children(ROOT) {
        [] => return Err(ParseFailure::structure("No <vmap:VMAP> root tag")),
        [root] => root,
        _ => return Err(ParseFailure::structure("Only one <vmap:VMAP> tag is allowed")),
    };

    let breaks = root
        .children(AD_BREAK)
        .par_iter()
        .map(map_break)
        .collect::<Result<Vec<_>, _>>()?;
    debug!("Mapped VMAP document with {} ad break(s)", breaks.len());

    Ok(VmapDocument {
        version: root.attr("version").map(str::to_string),
        breaks,
    })
}

fn map_break(node: &Node) -> Result<AdBreak, ParseFailure> {
    Ok(AdBreak {
        time_offset: node.attr("timeOffset").map(str::to_string),
        break_types: node.attr("breakType").map(map_break_types),
        source: map_source(node)?,
        trackings: map_trackings(node)?,
        extensions: map_extensions(node)?,
        id: node.attr("breakId").map(str::to_string),
        repeat_after: node.attr("repeatAfter").map(str::to_string),
    })
}

/// `breakType` is a comma separated list; unknown tokens are kept raw
fn map_break_types(raw: &str) -> Vec<Parsed<AdBreakType>> {
    raw.trim()
        .split(',')
        .map(|token| Parsed::symbol(token.trim()))
        .collect()
}

fn map_source(node: &Node) -> Result<Option<AdSource>, ParseFailure> {
    let Some(source) = node.single(AD_SOURCE, "There can be only one <AdSource> per <AdBreak>")? else {
        return Ok(None);
    };

    let payloads = [
        (AdSourceKind::Vast3, source.children(VAST_AD_DATA)),
        (AdSourceKind::Custom, source.children(CUSTOM_AD_DATA)),
        (AdSourceKind::AdTagUri, source.children(AD_TAG_URI)),
    ];
    let mut present = payloads.iter().flat_map(|(kind, nodes)| nodes.iter().map(move |node| (*kind, node)));
    let (kind, payload) = match (present.next(), present.next()) {
        (Some(only), None) => only,
        _ => {
            return Err(ParseFailure::structure(
                "There should be exactly one of <VASTAdData>, <CustomAdData> or <AdTagURI> ad data",
            ));
        }
    };

    let data = match kind {
        AdSourceKind::Vast3 => AdSourceData::Vast3 {
            vast_ad_data: vast::map(payload).map_err(|err| ParseFailure::EmbeddedVast(Box::new(err)))?,
        },
        AdSourceKind::Custom => AdSourceData::Custom {
            custom_ad_data: text_or_fragment(payload, &["templateType"]),
            ad_data_type: payload.attr("templateType").map(Parsed::symbol),
        },
        AdSourceKind::AdTagUri => AdSourceData::AdTagUri {
            ad_tag_uri: payload.text().map(str::to_string),
            ad_data_type: payload.attr("templateType").map(Parsed::symbol),
        },
    };

    Ok(Some(AdSource {
        data,
        id: source.attr("id").map(str::to_string),
        allow_multiple_ads: source.attr("allowMultipleAds").map(Parsed::<bool>::flag),
        follow_redirects: source.attr("followRedirects").map(Parsed::<bool>::flag),
    }))
}

fn map_trackings(node: &Node) -> Result<Option<Vec<BreakTracking>>, ParseFailure> {
    let Some(container) = node.single(TRACKING_EVENTS, "There can be only one <TrackingEvents> per <AdBreak>")?
    else {
        return Ok(None);
    };
    let trackings: Vec<BreakTracking> = container
        .children(TRACKING)
        .iter()
        .map(|tracking| BreakTracking {
            uri: tracking.text().map(str::to_string),
            level: Parsed::symbol(tracking.attr("event").unwrap_or_default()),
        })
        .collect();
    Ok((!trackings.is_empty()).then_some(trackings))
}

fn map_extensions(node: &Node) -> Result<Option<Vec<BreakExtension>>, ParseFailure> {
    let Some(container) = node.single(EXTENSIONS, "There can be only one <Extensions> per <AdBreak>")? else {
        return Ok(None);
    };
    let extensions: Vec<BreakExtension> = container
        .children(EXTENSION)
        .iter()
        .map(|extension| BreakExtension {
            extension_type: extension.attr("type").map(str::to_string),
            value: text_or_fragment(extension, &["type"]).unwrap_or_else(|| Content::Text(String::new())),
        })
        .collect();
    Ok((!extensions.is_empty()).then_some(extensions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vast::AdKind;
    use crate::tree::parse_xml;

    fn map_str(xml: &str) -> Result<VmapDocument, ParseFailure> {
        map(&parse_xml(xml).unwrap())
    }

    fn with_break(inner: &str) -> String {
        format!(
            r#"<vmap:VMAP xmlns:vmap="http://www.iab.net/videosuite/vmap" version="1.0">
            <vmap:AdBreak timeOffset="start" breakType="linear">{inner}</vmap:AdBreak></vmap:VMAP>"#
        )
    }

    fn source(doc: &VmapDocument) -> &AdSource {
        doc.breaks[0].source.as_ref().unwrap()
    }

    #[test]
    fn root_is_prefixed() {
        assert!(map_str(r#"<VMAP version="1.0"/>"#).is_err());
        let doc = map_str(r#"<vmap:VMAP version="1.0"/>"#).unwrap();
        assert_eq!(doc.version.as_deref(), Some("1.0"));
        assert!(doc.breaks.is_empty());
    }

    #[test]
    fn breaks_keep_document_order() {
        let breaks: String = (0..20)
            .map(|i| format!(r#"<vmap:AdBreak breakId="b{i}" timeOffset="00:00:{i:02}" breakType="linear"/>"#))
            .collect();
        let doc = map_str(&format!(r#"<vmap:VMAP version="1.0">{breaks}</vmap:VMAP>"#)).unwrap();
        let ids: Vec<_> = doc.breaks.iter().map(|b| b.id.clone().unwrap()).collect();
        let expected: Vec<_> = (0..20).map(|i| format!("b{i}")).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn break_types_are_split_and_kept_raw() {
        let doc = map_str(
            r#"<vmap:VMAP version="1.0"><vmap:AdBreak timeOffset="end" breakType=" linear , display,popup "/></vmap:VMAP>"#,
        )
        .unwrap();
        assert_eq!(
            doc.breaks[0].break_types,
            Some(vec![
                Parsed::Valid(AdBreakType::Linear),
                Parsed::Valid(AdBreakType::Display),
                Parsed::Invalid("popup".to_string()),
            ])
        );
    }

    #[test]
    fn source_payload_must_be_unique() {
        let none = with_break("<vmap:AdSource/>");
        assert!(map_str(&none).is_err());

        let two = with_break(
            r#"<vmap:AdSource><vmap:AdTagURI templateType="vast3">http://x/a</vmap:AdTagURI>
            <vmap:CustomAdData templateType="proprietary">x</vmap:CustomAdData></vmap:AdSource>"#,
        );
        assert!(map_str(&two).is_err());

        let twice = with_break(
            r#"<vmap:AdSource><vmap:AdTagURI>http://x/a</vmap:AdTagURI><vmap:AdTagURI>http://x/b</vmap:AdTagURI></vmap:AdSource>"#,
        );
        assert!(map_str(&twice).is_err());

        let two_sources = with_break("<vmap:AdSource/><vmap:AdSource/>");
        assert!(map_str(&two_sources).is_err());
    }

    #[test]
    fn ad_tag_uri_source() {
        let doc = map_str(&with_break(
            r#"<vmap:AdSource id="s" allowMultipleAds="false" followRedirects="maybe">
            <vmap:AdTagURI templateType="vast3"><![CDATA[http://x/tag]]></vmap:AdTagURI></vmap:AdSource>"#,
        ))
        .unwrap();
        let source = source(&doc);
        assert_eq!(source.data.kind(), AdSourceKind::AdTagUri);
        assert_eq!(
            source.data,
            AdSourceData::AdTagUri {
                ad_tag_uri: Some("http://x/tag".to_string()),
                ad_data_type: Some(Parsed::Valid(AdTagTemplate::Vast3)),
            }
        );
        assert_eq!(source.id.as_deref(), Some("s"));
        assert_eq!(source.allow_multiple_ads, Some(Parsed::Valid(false)));
        assert_eq!(source.follow_redirects, Some(Parsed::Invalid("maybe".to_string())));
    }

    #[test]
    fn custom_source_text_or_fragment() {
        let doc = map_str(&with_break(
            r#"<vmap:AdSource><vmap:CustomAdData templateType="proprietary">payload</vmap:CustomAdData></vmap:AdSource>"#,
        ))
        .unwrap();
        assert_eq!(
            source(&doc).data,
            AdSourceData::Custom {
                custom_ad_data: Some(Content::Text("payload".to_string())),
                ad_data_type: Some(Parsed::Valid(CustomTemplate::Proprietary)),
            }
        );

        let doc = map_str(&with_break(
            r#"<vmap:AdSource><vmap:CustomAdData templateType="vast2"><VAST version="2.0"/></vmap:CustomAdData></vmap:AdSource>"#,
        ))
        .unwrap();
        match &source(&doc).data {
            AdSourceData::Custom { custom_ad_data, .. } => {
                let fragment = custom_ad_data.as_ref().and_then(Content::as_fragment).unwrap();
                assert!(fragment.has_child("VAST"));
            }
            other => panic!("expected custom data, got {other:?}"),
        }
    }

    #[test]
    fn embedded_vast_is_mapped() {
        let doc = map_str(&with_break(
            r#"<vmap:AdSource><vmap:VASTAdData><VAST version="3.0"><Ad id="1"><InLine>
            <AdSystem>s</AdSystem></InLine></Ad></VAST></vmap:VASTAdData></vmap:AdSource>"#,
        ))
        .unwrap();
        match &source(&doc).data {
            AdSourceData::Vast3 { vast_ad_data } => {
                assert_eq!(vast_ad_data.version.as_deref(), Some("3.0"));
                assert_eq!(vast_ad_data.ads[0].kind(), AdKind::Inline);
            }
            other => panic!("expected VAST3 data, got {other:?}"),
        }
    }

    #[test]
    fn embedded_vast_failure_is_wrapped() {
        let err = map_str(&with_break(
            "<vmap:AdSource><vmap:VASTAdData><VAST><Ad/></VAST></vmap:VASTAdData></vmap:AdSource>",
        ))
        .unwrap_err();
        assert!(matches!(err, ParseFailure::EmbeddedVast(_)));

        let err = map_str(&with_break("<vmap:AdSource><vmap:VASTAdData/></vmap:AdSource>")).unwrap_err();
        assert!(matches!(err, ParseFailure::EmbeddedVast(_)));
    }

    #[test]
    fn trackings_and_extensions() {
        let doc = map_str(&with_break(
            r#"<vmap:TrackingEvents><vmap:Tracking event="breakStart">http://x/start</vmap:Tracking>
            <vmap:Tracking event="breakMiddle">http://x/middle</vmap:Tracking></vmap:TrackingEvents>
            <vmap:Extensions><vmap:Extension type="http://x/ext">plain</vmap:Extension>
            <vmap:Extension type="http://x/ext"><Data a="1"/></vmap:Extension>
            <vmap:Extension type="http://x/empty"/></vmap:Extensions>"#,
        ))
        .unwrap();
        let adbreak = &doc.breaks[0];

        let trackings = adbreak.trackings.as_ref().unwrap();
        assert_eq!(trackings[0].level, Parsed::Valid(BreakEvent::BreakStart));
        assert_eq!(trackings[0].uri.as_deref(), Some("http://x/start"));
        assert_eq!(trackings[1].level, Parsed::Invalid("breakMiddle".to_string()));

        let extensions = adbreak.extensions.as_ref().unwrap();
        assert_eq!(extensions[0].value, Content::Text("plain".to_string()));
        assert!(extensions[1].value.as_fragment().unwrap().has_child("Data"));
        assert_eq!(extensions[2].value, Content::Text(String::new()));
        assert_eq!(extensions[2].extension_type.as_deref(), Some("http://x/empty"));
    }

    #[test]
    fn duplicated_break_containers() {
        assert!(map_str(&with_break("<vmap:TrackingEvents/><vmap:TrackingEvents/>")).is_err());
        assert!(map_str(&with_break("<vmap:Extensions/><vmap:Extensions/>")).is_err());
    }
}
