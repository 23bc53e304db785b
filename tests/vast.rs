mod common;

use common::{document, documents, expected_json, name, read, violation_paths};
use pretty_assertions::assert_eq;
use vast_vmap::models::vast::{Ad, AdKind, DeliveryType};
use vast_vmap::models::Parsed;
use vast_vmap::{async_api, parse_vast, ParseFailure, ParseOptions, VastDocument, VastParser};

const SKIP_VALIDATION: ParseOptions = ParseOptions {
    skip_validation: true,
};

#[test]
fn valid_documents_match_golden_json() {
    for path in documents("VAST3", "valid") {
        let doc = parse_vast(&read(&path)).unwrap_or_else(|err| panic!("{}: {err:?}", name(&path)));
        let actual = serde_json::to_value(&doc).unwrap();
        assert_eq!(actual, expected_json(&path), "{}", name(&path));
    }
}

#[test]
fn structural_problems_are_parsing_errors() {
    for path in documents("VAST3", "invalid/parsing") {
        let err = parse_vast(&read(&path)).expect_err(&name(&path));
        assert!(err.is_parsing(), "{}: {err:?}", name(&path));
    }
}

#[test]
fn rule_violations_are_validation_errors() {
    for path in documents("VAST3", "invalid/validation") {
        let xml = read(&path);
        let err = parse_vast(&xml).expect_err(&name(&path));
        assert!(err.is_validation(), "{}: {err:?}", name(&path));

        let mut parser = VastParser::new(xml).unwrap();
        assert!(parser.parse(SKIP_VALIDATION).is_ok(), "{}", name(&path));
        assert!(!parser.is_valid());
    }
}

#[test]
fn violations_point_at_the_offending_field() {
    let cases = [
        ("bad-currency.xml", vec!["ads[0].pricing.currency"]),
        ("bad-skipoffset.xml", vec!["ads[0].creatives[0].skipoffset"]),
        ("bad-version.xml", vec!["version"]),
        (
            "bitrate-conflict.xml",
            vec![
                "ads[0].creatives[0].mediaFiles[0].bitrate",
                "ads[0].creatives[0].mediaFiles[0].bitrate",
            ],
        ),
        ("min-bitrate-alone.xml", vec!["ads[0].creatives[0].mediaFiles[0].maxBitrate"]),
        ("missing-duration.xml", vec!["ads[0].creatives[0].duration"]),
        ("missing-impression.xml", vec!["ads[0].impressions"]),
        ("offset-on-start.xml", vec!["ads[0].creatives[0].trackings[0].offset"]),
        ("progress-without-offset.xml", vec!["ads[0].creatives[0].trackings[0].offset"]),
        ("unknown-delivery.xml", vec!["ads[0].creatives[0].mediaFiles[0].delivery"]),
        ("unknown-event.xml", vec!["ads[0].creatives[0].trackings[0].event"]),
        ("wrapper-without-tag-uri.xml", vec!["ads[0].VASTAdTagURI"]),
    ];
    for (file, expected) in cases {
        let err = parse_vast(&document("VAST3", "invalid/validation", file)).unwrap_err();
        assert_eq!(violation_paths(&err), expected, "{file}");
    }
}

#[test]
fn every_violation_is_reported() {
    let xml = r#"<VAST version="5">
      <Ad><InLine><AdSystem></AdSystem><Creatives><Creative><Linear>
        <MediaFiles><MediaFile delivery="fast" type="video/mp4" width="640" height="360"
          maxBitrate="-2">http://x.example.com/v.mp4</MediaFile></MediaFiles>
      </Linear></Creative></Creatives></InLine></Ad></VAST>"#;
    let err = parse_vast(xml).unwrap_err();
    assert_eq!(
        violation_paths(&err),
        vec![
            "version",
            "ads[0].adSystem.name",
            "ads[0].impressions",
            "ads[0].creatives[0].duration",
            "ads[0].creatives[0].mediaFiles[0].delivery",
            "ads[0].creatives[0].mediaFiles[0].maxBitrate",
            "ads[0].creatives[0].mediaFiles[0].minBitrate",
        ]
    );
}

#[test]
fn inline_ad_with_incomplete_media_file() {
    let doc = parse_vast(&document("VAST3", "valid", "inline-linear.xml")).unwrap();
    assert_eq!(doc.ads.len(), 1);
    assert_eq!(doc.ads[0].kind(), AdKind::Inline);

    let creatives = doc.ads[0].base().creatives.as_ref().unwrap();
    // the companion-only creative is dropped
    assert_eq!(creatives.len(), 1);
    let media_files = creatives[0].media_files.as_ref().unwrap();
    assert_eq!(media_files.len(), 2);
    assert_eq!(media_files[1].delivery, Parsed::Valid(DeliveryType::Streaming));
    assert_eq!(media_files[1].min_bitrate, Some(Parsed::Valid(300)));
}

#[test]
fn malformed_scalable_flag_reads_as_true() {
    let doc = parse_vast(&document("VAST3", "valid", "ad-pod.xml")).unwrap();
    let Ad::Inline(ad) = &doc.ads[0] else {
        panic!("expected an inline ad");
    };
    let file = &ad.base.creatives.as_ref().unwrap()[0].media_files.as_ref().unwrap()[0];
    assert_eq!(file.scalable, Some(true));
    assert_eq!(file.width, Parsed::Valid(640));
}

#[test]
fn handle_parses_once() {
    let mut parser = VastParser::new(document("VAST3", "valid", "wrapper.xml")).unwrap();
    let first: *const VastDocument = parser.parse(ParseOptions::default()).unwrap();
    let snapshot = parser.document().unwrap().clone();
    assert!(parser.is_valid());

    let second = parser.parse(SKIP_VALIDATION).unwrap();
    assert!(std::ptr::eq(first, second));
    let third = parser.parse(ParseOptions::default()).unwrap();
    assert!(std::ptr::eq(first, third));

    parser.validate().unwrap();
    assert!(parser.is_valid());
    assert_eq!(parser.document().unwrap(), &snapshot);
}

#[test]
fn conflicting_ad_types_explain_the_cause() {
    let err = parse_vast("<VAST><Ad><InLine/><Wrapper/></Ad></VAST>").unwrap_err();
    match err {
        vast_vmap::Error::Parsing(err) => {
            assert_eq!(
                err.cause().to_string(),
                "<Ad> cannot contain a <InLine> AND a <Wrapper> element"
            );
            assert!(matches!(err.cause(), ParseFailure::Structure(_)));
        }
        other => panic!("expected parsing error, got {other:?}"),
    }
}

#[tokio::test]
async fn parses_on_the_blocking_pool() {
    let xml = document("VAST3", "valid", "wrapper.xml");
    let doc = async_api::parse_vast(xml.clone(), ParseOptions::default()).await.unwrap();
    assert_eq!(doc, parse_vast(&xml).unwrap());

    let xml = document("VAST3", "invalid/validation", "bad-version.xml");
    let err = async_api::parse_vast(xml, ParseOptions::default()).await.unwrap_err();
    assert!(err.is_validation());
}
