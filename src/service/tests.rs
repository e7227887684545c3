//! # Source-Map Service Tests
//!
//! Covers envelope validation, position resolution against the envelope
//! arrays, snippet extraction, concatenation offsets and staging, stable
//! serialization, and the builder.


use crate::error::MapError;
use crate::mappings::{Bias, Segment};
use crate::service::{
    SnippetConfig, SourceMapBuilder, SourceMapEnvelope, SourceMapService, SourceQuery,
};

/// Parse a service from JSON or panic with the error.
fn service(json: &str) -> SourceMapService {
    SourceMapService::from_json(json.as_bytes(), None).unwrap()
}

/// An envelope with one source and the given mappings.
fn envelope(source: &str, mappings: &str) -> SourceMapEnvelope {
    SourceMapEnvelope {
        sources: vec![source.to_string()],
        mappings: mappings.to_string(),
        ..SourceMapEnvelope::empty()
    }
}

mod construction {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_a_complete_envelope() {
        let service = service(
            r#"{
                "version": 3,
                "file": "bundle.js",
                "sourceRoot": "src/",
                "sources": ["app.ts"],
                "sourcesContent": ["let x = 1;"],
                "names": ["x"],
                "mappings": "AAAAA"
            }"#,
        );

        assert_eq!(service.file(), Some("bundle.js"));
        assert_eq!(service.source_root(), Some("src/"));
        assert_eq!(service.sources(), ["app.ts"]);
        assert_eq!(service.names(), ["x"]);
        assert_eq!(service.source_content(0), Some("let x = 1;"));
    }

    #[test]
    fn explicit_file_overrides_the_envelope() {
        let service = SourceMapService::from_json(
            br#"{"version":3,"file":"a.js","sources":[],"names":[],"mappings":""}"#,
            Some("b.js"),
        )
        .unwrap();
        assert_eq!(service.file(), Some("b.js"));
    }

    #[test]
    fn missing_version_is_tolerated() {
        let service = service(r#"{"sources":["a.ts"],"names":[],"mappings":"AAAA"}"#);
        assert_eq!(service.sources(), ["a.ts"]);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let service = service(
            r#"{"version":3,"sources":[],"names":[],"mappings":"","x_custom":[1,2]}"#,
        );
        assert!(service.sources().is_empty());
    }

    #[test]
    fn null_sources_content_reads_as_absent() {
        let service =
            service(r#"{"version":3,"sources":["a.ts"],"names":[],"mappings":"","sourcesContent":null}"#);
        assert_eq!(service.source_content(0), None);
    }

    #[test]
    fn accepts_a_pre_parsed_envelope() {
        let service = SourceMapService::new(envelope("a.ts", "AAAA"), None).unwrap();
        assert_eq!(service.sources(), ["a.ts"]);
    }
}

mod invalid_envelopes {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_error(json: &str) -> MapError {
        SourceMapService::from_json(json.as_bytes(), None).unwrap_err()
    }

    #[test]
    fn reports_each_missing_required_key() {
        for (json, expected) in [
            (r#"{"names":[],"mappings":""}"#, "sources"),
            (r#"{"sources":[],"names":[]}"#, "mappings"),
            (r#"{"sources":[],"mappings":""}"#, "names"),
        ] {
            match parse_error(json) {
                MapError::MissingRequiredKey { key } => assert_eq!(key, expected),
                other => panic!("expected missing key '{expected}', got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_non_object_json() {
        assert!(matches!(
            parse_error("[1,2,3]"),
            MapError::MissingRequiredKey { .. }
        ));
    }

    #[test]
    fn rejects_a_non_array_sources_key() {
        match parse_error(r#"{"sources":"a.ts","names":[],"mappings":""}"#) {
            MapError::NotAnArray { context } => assert_eq!(context, "sources"),
            other => panic!("expected NotAnArray, got {other:?}"),
        }
    }

    #[test]
    fn rejects_a_non_string_mappings_key() {
        assert!(matches!(
            parse_error(r#"{"sources":[],"names":[],"mappings":42}"#),
            MapError::Json(_)
        ));
    }

    #[test]
    fn rejects_wrong_versions() {
        let error = parse_error(r#"{"version":2,"sources":[],"names":[],"mappings":""}"#);
        assert!(matches!(error, MapError::UnsupportedVersion { version: 2 }));
    }

    #[test]
    fn rejects_bytes_outside_the_mappings_charset() {
        let error = parse_error(r#"{"version":3,"sources":[],"names":[],"mappings":"AA!A"}"#);
        assert!(matches!(error, MapError::InvalidMappingsCharset));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(parse_error("{not json"), MapError::Json(_)));
    }
}

mod queries {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mapped_service() -> SourceMapService {
        // Generated (1,1) and (1,5) map into app.ts lines 1 and 3; the first
        // segment carries the name "handler".
        service(
            r#"{
                "version": 3,
                "sources": ["src/app.ts"],
                "names": ["handler"],
                "mappings": "AAAAA,IAEA"
            }"#,
        )
    }

    #[test]
    fn resolves_a_generated_position() {
        let position = mapped_service()
            .position_by_generated(1, 1, Bias::Exact)
            .unwrap();

        assert_eq!(position.source, "src/app.ts");
        assert_eq!(position.source_index, 0);
        assert_eq!(position.name.as_deref(), Some("handler"));
        assert_eq!(position.original_line, 1);
        assert_eq!(position.original_column, 1);
        assert_eq!(position.generated_line, 1);
        assert_eq!(position.generated_column, 1);
    }

    #[test]
    fn unnamed_segments_resolve_without_a_name() {
        let position = mapped_service()
            .position_by_generated(1, 5, Bias::Exact)
            .unwrap();
        assert_eq!(position.name, None);
        assert_eq!(position.original_line, 3);
    }

    #[test]
    fn bias_applies_between_segments() {
        let service = mapped_service();
        let floor = service.position_by_generated(1, 3, Bias::Floor).unwrap();
        assert_eq!(floor.generated_column, 1);

        let ceiling = service.position_by_generated(1, 3, Bias::Ceiling).unwrap();
        assert_eq!(ceiling.generated_column, 5);

        assert!(service.position_by_generated(1, 3, Bias::Exact).is_none());
    }

    #[test]
    fn unmapped_lines_resolve_to_none() {
        assert!(mapped_service().position_by_generated(7, 1, Bias::Floor).is_none());
    }

    #[test]
    fn resolves_an_original_position_by_index() {
        let position = mapped_service()
            .position_by_original(3, 1, 0u32, Bias::Exact)
            .unwrap()
            .unwrap();
        assert_eq!(position.generated_column, 5);
    }

    #[test]
    fn resolves_an_original_position_by_substring() {
        let position = mapped_service()
            .position_by_original(3, 1, "app.ts", Bias::Exact)
            .unwrap()
            .unwrap();
        assert_eq!(position.generated_column, 5);
    }

    #[test]
    fn out_of_range_index_is_an_ordinary_miss() {
        assert!(
            mapped_service()
                .position_by_original(1, 1, 9u32, Bias::Exact)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn unmatched_substring_is_an_error() {
        let error = mapped_service()
            .position_by_original(1, 1, "missing.ts", Bias::Exact)
            .unwrap_err();
        match error {
            MapError::SourceNotFound { query } => assert_eq!(query, "missing.ts"),
            other => panic!("expected SourceNotFound, got {other:?}"),
        }
    }

    #[test]
    fn source_query_conversions() {
        assert_eq!(SourceQuery::from(2u32), SourceQuery::Index(2));
        assert_eq!(
            SourceQuery::from("app"),
            SourceQuery::Path("app".to_string())
        );
    }

    #[test]
    fn unattributed_segments_resolve_to_none() {
        // A single-field segment knows its generated column and nothing else.
        let service = service(r#"{"version":3,"sources":[],"names":[],"mappings":"I"}"#);
        assert!(service.engine().get_by_generated(1, 5, Bias::Exact).is_some());
        assert!(service.position_by_generated(1, 5, Bias::Exact).is_none());
    }
}

mod snippets {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONTENT: &str = "function name(data) {\n  console.log('x');\n  throw new Error('e');\n}\n";

    fn content_service() -> SourceMapService {
        // Generated (1,1) maps to original line 3 of the only source.
        let json = serde_json::json!({
            "version": 3,
            "sources": ["app.js"],
            "sourcesContent": [CONTENT],
            "names": [],
            "mappings": "AAEA",
        });
        service(&json.to_string())
    }

    #[test]
    fn extracts_the_window_around_the_resolved_line() {
        let snippet = content_service()
            .position_with_snippet(
                1,
                1,
                Bias::Exact,
                &SnippetConfig {
                    lines_before: 2,
                    lines_after: 1,
                },
            )
            .unwrap();

        assert_eq!(snippet.position.original_line, 3);
        assert_eq!(snippet.start_line, 1);
        assert_eq!(snippet.end_line, 4);
        assert_eq!(
            snippet.code,
            ["  console.log('x');", "  throw new Error('e');", "}"]
        );
    }

    #[test]
    fn default_window_clamps_to_the_content() {
        let snippet = content_service()
            .position_with_snippet(1, 1, Bias::Exact, &SnippetConfig::default())
            .unwrap();

        assert_eq!(snippet.start_line, 0);
        assert_eq!(snippet.end_line, 5);
        assert_eq!(snippet.code.len(), 5);
        assert_eq!(snippet.code[0], "function name(data) {");
    }

    #[test]
    fn missing_content_yields_none() {
        let service = service(r#"{"version":3,"sources":["a.js"],"names":[],"mappings":"AAEA"}"#);
        assert!(
            service
                .position_with_snippet(1, 1, Bias::Exact, &SnippetConfig::default())
                .is_none()
        );
    }

    #[test]
    fn full_content_rides_along_with_the_position() {
        let with_content = content_service()
            .position_with_content(1, 1, Bias::Exact)
            .unwrap();
        assert_eq!(with_content.content, CONTENT);
        assert_eq!(with_content.position.original_line, 3);
    }
}

mod concatenation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shifts_lines_and_source_indices() {
        let mut combined = SourceMapService::new(envelope("a.js", "AAAA"), None).unwrap();
        combined.concat(&[envelope("b.js", "AAAA,AAAA")]).unwrap();

        assert_eq!(combined.to_envelope().mappings, "AAAA;ACAA,AAAA");
        assert_eq!(combined.sources(), ["a.js", "b.js"]);
    }

    #[test]
    fn concat_new_map_leaves_the_original_untouched() {
        let base = SourceMapService::new(envelope("a.js", "AAAA"), None).unwrap();
        let combined = base.concat_new_map(&[envelope("b.js", "AAAA")]).unwrap();

        assert_eq!(base.sources(), ["a.js"]);
        assert_eq!(base.to_envelope().mappings, "AAAA");
        assert_eq!(combined.sources(), ["a.js", "b.js"]);
        assert_eq!(combined.to_envelope().mappings, "AAAA;ACAA");
    }

    #[test]
    fn one_call_matches_sequential_calls() {
        let b = envelope("b.js", "AAAA");
        let c = envelope("c.js", "AAAA,CAAC");

        let mut batched = SourceMapService::new(envelope("a.js", "AAAA"), None).unwrap();
        batched.concat(&[b.clone(), c.clone()]).unwrap();

        let mut sequential = SourceMapService::new(envelope("a.js", "AAAA"), None).unwrap();
        sequential.concat(&[b]).unwrap();
        sequential.concat(&[c]).unwrap();

        assert_eq!(batched.to_envelope(), sequential.to_envelope());
    }

    #[test]
    fn names_are_offset_per_appended_map() {
        let mut left = SourceMapService::new(
            SourceMapEnvelope {
                names: vec!["alpha".to_string()],
                ..envelope("a.js", "AAAAA")
            },
            None,
        )
        .unwrap();

        left.concat(&[SourceMapEnvelope {
            names: vec!["beta".to_string()],
            ..envelope("b.js", "AAAAA")
        }])
        .unwrap();

        let position = left.position_by_generated(2, 1, Bias::Exact).unwrap();
        assert_eq!(position.name.as_deref(), Some("beta"));
        assert_eq!(position.source, "b.js");
    }

    #[test]
    fn right_hand_content_pads_the_left_for_alignment() {
        let mut left = SourceMapService::new(envelope("a.js", "AAAA"), None).unwrap();
        left.concat(&[SourceMapEnvelope {
            sources_content: vec![Some("let b;".to_string())],
            ..envelope("b.js", "AAAA")
        }])
        .unwrap();

        assert_eq!(left.source_content(0), Some(""));
        assert_eq!(left.source_content(1), Some("let b;"));
    }

    #[test]
    fn empty_right_hand_content_preserves_left_arity() {
        let mut left = SourceMapService::new(
            SourceMapEnvelope {
                sources_content: vec![Some("let a;".to_string())],
                ..envelope("a.js", "AAAA")
            },
            None,
        )
        .unwrap();
        left.concat(&[envelope("b.js", "AAAA")]).unwrap();

        assert_eq!(left.to_envelope().sources_content.len(), 1);
        assert_eq!(left.source_content(0), Some("let a;"));
        assert_eq!(left.source_content(1), None);
    }

    #[test]
    fn zero_maps_is_an_error() {
        let mut service = SourceMapService::new(envelope("a.js", "AAAA"), None).unwrap();
        assert!(matches!(service.concat(&[]), Err(MapError::EmptyConcat)));
    }

    #[test]
    fn a_failing_map_leaves_the_service_unchanged() {
        let mut service = SourceMapService::new(envelope("a.js", "AAAA"), None).unwrap();
        let before = service.to_json().unwrap();

        let result = service.concat(&[envelope("b.js", "AAAA"), envelope("c.js", "D")]);
        assert!(matches!(
            result,
            Err(MapError::NegativeCoordinate { .. })
        ));
        assert_eq!(service.to_json().unwrap(), before);
    }

    #[test]
    fn rejects_an_appended_map_with_a_bad_version() {
        let mut service = SourceMapService::new(envelope("a.js", "AAAA"), None).unwrap();
        let bad = SourceMapEnvelope {
            version: 2,
            ..envelope("b.js", "AAAA")
        };
        assert!(matches!(
            service.concat(&[bad]),
            Err(MapError::UnsupportedVersion { version: 2 })
        ));
    }
}

mod serialization {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn emits_keys_in_stable_order() {
        let service = SourceMapService::new(
            SourceMapEnvelope {
                file: Some("out.js".to_string()),
                ..envelope("a.js", "AAAA")
            },
            None,
        )
        .unwrap();

        assert_eq!(
            service.to_json().unwrap(),
            r#"{"version":3,"file":"out.js","names":[],"sources":["a.js"],"mappings":"AAAA","sourcesContent":[]}"#
        );
    }

    #[test]
    fn optional_keys_are_omitted_when_absent() {
        let json = SourceMapService::new(envelope("a.js", ""), None)
            .unwrap()
            .to_json()
            .unwrap();
        assert!(!json.contains("file"));
        assert!(!json.contains("sourceRoot"));
    }

    #[test]
    fn mappings_survive_a_parse_and_emit_cycle() {
        for mappings in ["AAAA", "AAAA;;;AACA", "AAAAA,CAACA;A", ""] {
            let service = SourceMapService::new(envelope("a.js", mappings), None).unwrap();
            assert_eq!(
                service.to_envelope().mappings,
                mappings,
                "mappings {mappings:?}"
            );
        }
    }

    #[test]
    fn inline_data_url_wraps_the_base64_json() {
        use base64::Engine as _;

        let service = SourceMapService::new(envelope("a.js", "AAAA"), None).unwrap();
        let expected = format!(
            "data:application/json;charset=utf-8;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(service.to_json().unwrap())
        );
        assert_eq!(service.to_inline_data_url().unwrap(), expected);
    }

    #[test]
    fn source_mapping_url_comment_points_at_the_map() {
        assert_eq!(
            SourceMapService::source_mapping_url_comment("out.js.map"),
            "//# sourceMappingURL=out.js.map"
        );
    }
}

mod builder {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deduplicates_sources_and_names() {
        let mut builder = SourceMapBuilder::new();
        assert_eq!(builder.add_source("a.ts"), 0);
        assert_eq!(builder.add_source("b.ts"), 1);
        assert_eq!(builder.add_source("a.ts"), 0);
        assert_eq!(builder.add_name("run"), 0);
        assert_eq!(builder.add_name("run"), 0);
    }

    #[test]
    fn builds_a_queryable_envelope() {
        let mut builder = SourceMapBuilder::new().with_file("out.js");
        let source = builder.add_source("a.ts");
        builder.set_source_content(source, "let x;\nlet y;\n");
        let name = builder.add_name("x");

        builder
            .add_segment(
                Segment::new(1, 1)
                    .unwrap()
                    .with_origin(i64::from(source), 2, 1)
                    .unwrap()
                    .with_name(i64::from(name))
                    .unwrap(),
            )
            .unwrap();

        let envelope = builder.build();
        assert_eq!(envelope.file.as_deref(), Some("out.js"));
        assert_eq!(envelope.mappings, "AACAA");

        let service = SourceMapService::new(envelope, None).unwrap();
        let position = service.position_by_generated(1, 1, Bias::Exact).unwrap();
        assert_eq!(position.original_line, 2);
        assert_eq!(position.name.as_deref(), Some("x"));
    }

    #[test]
    fn orders_segments_within_a_frame_by_column() {
        let mut builder = SourceMapBuilder::new();
        let source = builder.add_source("a.ts");

        for column in [9, 1, 5] {
            builder
                .add_segment(
                    Segment::new(1, column)
                        .unwrap()
                        .with_origin(i64::from(source), 1, column)
                        .unwrap(),
                )
                .unwrap();
        }

        let engine = SourceMapService::new(builder.build(), None)
            .unwrap()
            .engine()
            .clone();
        let columns: Vec<u32> = engine.frames()[0]
            .iter()
            .map(|segment| segment.generated_column)
            .collect();
        assert_eq!(columns, [1, 5, 9]);
    }

    #[test]
    fn fills_skipped_lines_with_empty_frames() {
        let mut builder = SourceMapBuilder::new();
        let source = builder.add_source("a.ts");
        builder
            .add_segment(
                Segment::new(3, 1)
                    .unwrap()
                    .with_origin(i64::from(source), 1, 1)
                    .unwrap(),
            )
            .unwrap();

        assert_eq!(builder.build().mappings, ";;AAAA");
    }

    #[test]
    fn rejects_dangling_indices() {
        let mut builder = SourceMapBuilder::new();
        let error = builder
            .add_segment(
                Segment::new(1, 1)
                    .unwrap()
                    .with_origin(0, 1, 1)
                    .unwrap(),
            )
            .unwrap_err();
        assert!(matches!(
            error,
            MapError::InvalidSegmentField {
                field: "sourceIndex",
                received: 0,
            }
        ));
    }

    #[test]
    fn content_array_is_dropped_when_never_filled() {
        let mut builder = SourceMapBuilder::new();
        builder.add_source("a.ts");
        assert!(builder.build().sources_content.is_empty());
    }
}
