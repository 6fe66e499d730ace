//! Integration tests for the tagged payload codec and validated construction.
//!
//! These tests drive the public API only:
//! - Content encode/decode, including the annotated text scenario
//! - ErrorInfo dispatch on `(code, errorType)`
//! - Construction rules of the resource, completion and progress types

use mcpwire_protocol::{
    Annotations, AnnotationsStep, CompleteResult, CompleteStep, Content, ContentType, DecodeError,
    ErrorData, ErrorDataRegistry, ErrorInfo, INTERNAL_ERROR, INVALID_PARAMS, ProgressNotification,
    ProgressStep, Reference, ReferenceKind, ResourceContent, ResourceContentStep, Role,
    ValidationFailure,
};
use serde_json::{Value, json};

// ============================================================================
// Content
// ============================================================================

#[test]
fn test_annotated_text_scenario() {
    let annotations = Annotations::new([
        AnnotationsStep::Audience(Role::Assistant),
        AnnotationsStep::Priority(0.8),
    ])
    .unwrap();
    let content = Content::text_annotated("Hello, world!", annotations);

    let bytes = content.encode().unwrap();
    let wire: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        wire,
        json!({
            "type": "text",
            "text": "Hello, world!",
            "annotations": {"audience": ["assistant"], "priority": 0.8}
        })
    );
    assert!(bytes.starts_with(br#"{"type":"text""#));
    assert_eq!(Content::decode(&bytes).unwrap(), content);
}

#[test]
fn test_each_variant_round_trips() {
    let resource = ResourceContent::new(
        "file:///logo.png",
        [
            ResourceContentStep::MimeType("image/png".into()),
            ResourceContentStep::Blob("iVBORw0KGgo=".into()),
        ],
    )
    .unwrap();
    for content in [
        Content::text("plain"),
        Content::image("iVBORw0KGgo=", "image/png"),
        Content::resource(resource),
    ] {
        let back = Content::decode(&content.encode().unwrap()).unwrap();
        assert_eq!(back.content_type(), content.content_type());
        assert_eq!(back, content);
    }
}

#[test]
fn test_resource_fields_are_flattened() {
    let content: Content = serde_json::from_value(json!({
        "type": "resource",
        "uri": "file:///notes.txt",
        "mimeType": "text/plain",
        "text": "remember the milk"
    }))
    .unwrap();
    match content {
        Content::Resource(r) => {
            assert_eq!(r.uri(), "file:///notes.txt");
            assert_eq!(r.text(), Some("remember the milk"));
            assert_eq!(r.blob(), None);
        }
        other => panic!("expected resource content, got {other:?}"),
    }
}

#[test]
fn test_unknown_content_type_is_rejected() {
    let err = Content::decode(br#"{"type":"audio","data":"AAAA"}"#).unwrap_err();
    assert!(err.is_unknown_discriminator());
    assert!(matches!(
        err,
        DecodeError::UnknownDiscriminator { field: "type", ref value } if value == "audio"
    ));
}

#[test]
fn test_malformed_and_missing_discriminators() {
    assert!(matches!(
        Content::decode(br#"{"text":"no tag"}"#),
        Err(DecodeError::MissingDiscriminator { field: "type" })
    ));
    assert!(matches!(
        Content::decode(br#"{"type":7,"text":"numeric tag"}"#),
        Err(DecodeError::MissingDiscriminator { .. })
    ));
    match Content::decode(br#"{"type":"image","data":"AAAA"}"#) {
        Err(DecodeError::MalformedVariant { discriminator, .. }) => {
            assert_eq!(discriminator, ContentType::Image.as_str());
        }
        other => panic!("expected malformed variant, got {other:?}"),
    }
    assert!(matches!(
        Content::decode(br#"["type","text"]"#),
        Err(DecodeError::Json(_))
    ));
}

#[test]
fn test_decoded_content_is_validated() {
    let err = Content::decode(
        br#"{"type":"text","text":"x","annotations":{"priority":1.5}}"#,
    )
    .unwrap_err();
    match err {
        DecodeError::InvalidVariant { discriminator, source } => {
            assert_eq!(discriminator, "text");
            assert_eq!(source.field(), "annotations.priority");
        }
        other => panic!("expected invalid variant, got {other:?}"),
    }
    assert!(
        Content::decode(br#"{"type":"resource","uri":"file:///a","text":"t","blob":"Yg=="}"#)
            .is_err()
    );
}

// ============================================================================
// ErrorInfo
// ============================================================================

#[test]
fn test_validation_error_from_wire() {
    let info = ErrorInfo::decode(
        br#"{"code":-32602,"message":"Invalid params","data":{"errorType":"validation","validation":[{"field":"uri","error":"required"}]}}"#,
    )
    .unwrap();
    assert_eq!(info.code(), INVALID_PARAMS);
    match info.data() {
        Some(ErrorData::Validation(details)) => {
            assert_eq!(details.failures(), [ValidationFailure::new("uri", "required")]);
        }
        other => panic!("expected validation data, got {other:?}"),
    }
    assert_eq!(ErrorInfo::decode(&info.encode().unwrap()).unwrap(), info);
}

#[test]
fn test_tool_execution_error_from_wire() {
    let info = ErrorInfo::decode(
        br#"{"code":-32603,"message":"Tool execution failed","data":{"errorType":"toolExecution","toolName":"search","errorKind":"timeout","details":"Operation timed out after 30s"}}"#,
    )
    .unwrap();
    assert_eq!(info.code(), INTERNAL_ERROR);
    match info.data() {
        Some(ErrorData::ToolExecution(details)) => {
            assert_eq!(details.tool_name(), "search");
            assert_eq!(details.error_kind(), "timeout");
            assert_eq!(details.details(), "Operation timed out after 30s");
        }
        other => panic!("expected tool execution data, got {other:?}"),
    }
}

#[test]
fn test_structured_constructors_round_trip() {
    for info in [
        ErrorInfo::validation(vec![ValidationFailure::new("name", "must not be empty")]).unwrap(),
        ErrorInfo::tool_execution("write_file", "permission_denied", "cannot write /tmp/x")
            .unwrap(),
    ] {
        let back = ErrorInfo::decode(&info.encode().unwrap()).unwrap();
        assert_eq!(back, info);
    }
}

#[test]
fn test_unknown_error_type_for_known_code() {
    let err = ErrorInfo::decode(
        br#"{"code":-32602,"message":"bad","data":{"errorType":"schema","path":"/a"}}"#,
    )
    .unwrap_err();
    assert!(err.is_unknown_discriminator());
    assert!(matches!(
        err,
        DecodeError::UnknownErrorType { code: -32602, ref error_type } if error_type == "schema"
    ));
}

#[test]
fn test_code_and_data_kind_must_agree() {
    let err = ErrorInfo::decode(
        br#"{"code":-32603,"message":"x","data":{"errorType":"validation","validation":[{"field":"a","error":"b"}]}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, DecodeError::UnknownErrorType { code: -32603, .. }));
}

#[test]
fn test_absent_error_type() {
    // -32602 carries a single kind, so the tag may be left out.
    let info = ErrorInfo::decode(
        br#"{"code":-32602,"message":"Invalid params","data":{"validation":[{"field":"a","error":"b"}]}}"#,
    )
    .unwrap();
    assert!(matches!(info.data(), Some(ErrorData::Validation(_))));

    // -32603 has no default kind; the data is dropped.
    let info = ErrorInfo::decode(br#"{"code":-32603,"message":"boom","data":{"toolName":"x"}}"#)
        .unwrap();
    assert_eq!(info.message(), "boom");
    assert!(info.data().is_none());
}

#[test]
fn test_unregistered_code_keeps_message() {
    let info = ErrorInfo::decode(
        br#"{"code":-32000,"message":"server busy","data":{"errorType":"whatever","retry":true}}"#,
    )
    .unwrap();
    assert_eq!(info.code(), -32000);
    assert!(info.data().is_none());
}

#[test]
fn test_registry_extension_keeps_builtins() {
    let registry = ErrorDataRegistry::builtin().clone().register(
        -32001,
        "rateLimit",
        ErrorData::decode_extension,
    );
    let info = ErrorInfo::decode_with(
        br#"{"code":-32001,"message":"slow down","data":{"errorType":"rateLimit","retryAfter":30}}"#,
        &registry,
    )
    .unwrap();
    match info.data() {
        Some(ErrorData::Extension(ext)) => {
            assert_eq!(ext.error_type(), "rateLimit");
            assert_eq!(ext.fields().get("retryAfter"), Some(&json!(30)));
            assert!(!ext.fields().contains_key("errorType"));
        }
        other => panic!("expected extension data, got {other:?}"),
    }

    let builtin = ErrorInfo::decode_with(
        br#"{"code":-32602,"message":"m","data":{"errorType":"validation","validation":[{"field":"a","error":"b"}]}}"#,
        &registry,
    )
    .unwrap();
    assert!(matches!(builtin.data(), Some(ErrorData::Validation(_))));
    assert!(!ErrorDataRegistry::builtin().knows_code(-32001));
}

// ============================================================================
// Construction rules
// ============================================================================

#[test]
fn test_resource_content_body_exclusivity() {
    assert!(ResourceContent::new("file:///a", [ResourceContentStep::Text("t".into())]).is_ok());
    assert!(ResourceContent::new("file:///a", [ResourceContentStep::Blob("Yg==".into())]).is_ok());
    assert!(ResourceContent::new("file:///a", []).is_err());
    assert!(
        ResourceContent::new(
            "file:///a",
            [
                ResourceContentStep::Text("t".into()),
                ResourceContentStep::Blob("Yg==".into()),
            ],
        )
        .is_err()
    );
}

#[test]
fn test_completion_value_limit() {
    let values = |n: usize| (0..n).map(|i| format!("v{i}")).collect::<Vec<_>>();
    assert!(CompleteResult::new(values(100), []).is_ok());
    assert!(CompleteResult::new(values(101), []).is_err());
    assert!(CompleteResult::new(values(3), [CompleteStep::Total(2)]).is_err());
    assert!(CompleteResult::new(values(3), [CompleteStep::Total(3)]).is_ok());
}

#[test]
fn test_progress_rules() {
    assert!(ProgressNotification::new("t", -0.5, []).is_err());
    assert!(ProgressNotification::new("t", 8.0, [ProgressStep::Total(4.0)]).is_err());
    assert!(ProgressNotification::new("t", 4.0, [ProgressStep::Total(8.0)]).is_ok());
}

#[test]
fn test_priority_boundaries() {
    assert!(Annotations::new([AnnotationsStep::Priority(1.5)]).is_err());
    assert!(Annotations::new([AnnotationsStep::Priority(0.0)]).is_ok());
    assert!(Annotations::new([AnnotationsStep::Priority(1.0)]).is_ok());
    assert!(Annotations::new([AnnotationsStep::Priority(f64::NAN)]).is_err());
}

#[test]
fn test_reference_rules() {
    assert!(Reference::prompt("summarize").is_ok());
    assert!(Reference::resource("file:///a").is_ok());
    assert!(
        Reference::new(
            ReferenceKind::Prompt,
            Some("summarize".into()),
            Some("file:///a".into())
        )
        .is_err()
    );
    assert!(
        Reference::new(
            ReferenceKind::Resource,
            Some("summarize".into()),
            Some("file:///a".into())
        )
        .is_err()
    );
    assert!(Reference::new(ReferenceKind::Prompt, None, None).is_err());
}
