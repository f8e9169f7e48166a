#[cfg(test)]
mod tests {
    use hyper::{Body, Method, Request, Response};
    use proptest::prelude::*;
    use recording::{
        build_response, capture_request, capture_response, split_lines, CodecConfiguration,
        ContentClassifier, HeaderBag, InteractionRecord, JsonEscaping, MessageBody, RecordCodec,
        RecordSession, TextEncoding,
    };
    use serde_json::{json, Value};
    use std::{sync::Arc, thread};

    const LEGACY_SESSION: &str = include_str!("../fixtures/legacy_session.json");

    fn headers(pairs: &[(&str, &str)]) -> HeaderBag {
        pairs.iter().cloned().collect()
    }

    fn record_with_response(content_type: &str, body: &[u8]) -> InteractionRecord {
        InteractionRecord::from_exchange(
            Method::GET,
            "https://example.com/resource",
            MessageBody::new(HeaderBag::new(), None),
            200,
            MessageBody::new(headers(&[("Content-Type", content_type)]), Some(body.to_vec())),
        )
    }

    fn round_trip(codec: &RecordCodec, record: &InteractionRecord) -> InteractionRecord {
        let bytes = codec.to_vec(record).unwrap();
        codec.from_slice(&bytes).unwrap()
    }

    #[test]
    fn plain_text_round_trips_byte_for_byte() {
        let codec = RecordCodec::default();
        let record = record_with_response("text/plain", "caf\u{e9}\r\nsecond line\nno end".as_bytes());

        assert_eq!(round_trip(&codec, &record), record);
    }

    #[test]
    fn structured_json_is_stored_as_a_document_and_is_idempotent() {
        let codec = RecordCodec::default();
        let record = record_with_response("application/json", br#"{"a":1,"b":[2,3]}"#);

        let encoded = codec.encode(&record).unwrap();
        assert_eq!(encoded["ResponseBody"], json!({"a": 1, "b": [2, 3]}));

        let first = codec.decode(&encoded).unwrap();
        let second = codec.decode(&codec.encode(&first).unwrap()).unwrap();
        assert_eq!(first.response.body.as_deref(), Some(&br#"{"a":1,"b":[2,3]}"#[..]));
        assert_eq!(second, first);
    }

    #[test]
    fn reformatted_json_is_idempotent_after_normalization() {
        let codec = RecordCodec::default();
        let record = record_with_response("application/json", b"[\n  1,\n  {\"x\": \"y\"}\n]\n");

        let encoded = codec.encode(&record).unwrap();
        assert_eq!(encoded["ResponseBody"], json!(["[\n", "  1,\n", "  {\"x\": \"y\"}\n", "]\n"]));

        let first = round_trip(&codec, &record);
        let second = round_trip(&codec, &first);
        assert_eq!(first.response.body.as_deref(), Some(&br#"[1,{"x":"y"}]"#[..]));
        assert_eq!(second, first);
    }

    #[test]
    fn null_and_empty_bodies_are_not_conflated() {
        let codec = RecordCodec::default();
        let mut record = record_with_response("application/octet-stream", b"");
        record.request.body = None;

        let encoded = codec.encode(&record).unwrap();
        assert_eq!(encoded["RequestBody"], Value::Null);
        assert_eq!(encoded["ResponseBody"], json!([]));

        let decoded = codec.decode(&encoded).unwrap();
        assert_eq!(decoded.request.body, None);
        assert_eq!(decoded.response.body, Some(Vec::new()));
    }

    #[test]
    fn multi_value_headers_round_trip() {
        let codec = RecordCodec::default();
        let mut record = record_with_response("text/plain", b"ok");
        record
            .request
            .headers
            .insert("Accept", vec!["application/json", "text/plain"]);
        record.request.headers.insert("Host", vec!["example.com"]);

        let encoded = codec.encode(&record).unwrap();
        assert_eq!(
            encoded["RequestHeaders"],
            json!({"Accept": ["application/json", "text/plain"], "Host": "example.com"})
        );

        let decoded = codec.decode(&encoded).unwrap();
        assert_eq!(
            decoded.request.headers.get("accept"),
            Some(&["application/json".to_string(), "text/plain".to_string()][..])
        );
    }

    #[test]
    fn line_splitting_keeps_terminators() {
        let codec = RecordCodec::default();
        let record = record_with_response("text/plain", b"line1\r\nline2\n");

        let encoded = codec.encode(&record).unwrap();
        assert_eq!(encoded["ResponseBody"], json!(["line1\r\n", "line2\n"]));
    }

    #[test]
    fn clone_for_sanitizing_leaves_source_untouched() {
        let codec = RecordCodec::default();
        let mut source = record_with_response("text/plain", b"secret");
        source.request.headers.insert("Authorization", vec!["Bearer abc"]);
        let before = codec.encode(&source).unwrap();

        let mut sanitized = source.clone_for_sanitizing();
        sanitized.request.headers.get_mut("authorization").unwrap()[0] = "Sanitized".into();
        sanitized.response.body = Some(b"Sanitized".to_vec());

        assert_eq!(codec.encode(&source).unwrap(), before);
        assert_eq!(sanitized.request_uri, source.request_uri);
    }

    #[test]
    fn content_length_follows_normalization() {
        let codec = RecordCodec::default();
        let body = b"{ \"a\" : 1 }";
        let mut record = record_with_response("application/json", body);
        record
            .response
            .headers
            .insert("Content-Length", vec![body.len().to_string()]);

        let decoded = round_trip(&codec, &record);

        assert_eq!(decoded.response.body.as_deref(), Some(&br#"{"a":1}"#[..]));
        assert_eq!(decoded.response.headers.first("Content-Length"), Some("7"));
    }

    #[test]
    fn multipart_record_round_trips() {
        let codec = RecordCodec::default();
        let body = "--batch_a\r\n\
Content-Type: application/http\r\n\
Content-Transfer-Encoding: binary\r\n\
\r\n\
GET /items HTTP/1.1\r\n\
Accept: application/json\r\n\
\r\n\
--batch_a\r\n\
Content-Type: text/plain\r\n\
\r\n\
note\r\n\
--batch_a--\r\n";
        let record = record_with_response("multipart/mixed; boundary=batch_a", body.as_bytes());

        let encoded = codec.encode(&record).unwrap();
        let parts = encoded["ResponseBody"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["Body"], json!("note"));

        assert_eq!(codec.decode(&encoded).unwrap(), record);
    }

    #[test]
    fn legacy_session_fixture_loads() {
        let codec = RecordCodec::default();
        let session = RecordSession::from_slice(LEGACY_SESSION.as_bytes(), &codec).unwrap();

        assert_eq!(session.entries.len(), 2);
        assert_eq!(session.variables["RandomSeed"], "1740637158");

        let create = &session.entries[0];
        assert!(create.is_legacy_format);
        assert_eq!(create.request_method, Method::POST);
        assert_eq!(create.status_code, 201);
        assert_eq!(create.request.headers.get("accept").map(<[String]>::len), Some(2));
        assert_eq!(
            create.request.body.as_deref(),
            Some(&br#"{"TableName":"testtable16"}"#[..])
        );
        assert_eq!(create.request.headers.first("content-length"), Some("27"));
        assert_eq!(
            create.response.body.as_deref(),
            Some(&b"created\r\ntesttable16\n"[..])
        );

        let download = &session.entries[1];
        assert_eq!(download.request.body, None);
        assert!(download.request.headers.is_empty());
        assert_eq!(download.response.body, Some(vec![0xDE, 0xAD, 0xBE, 0xEF]));
    }

    #[test]
    fn legacy_session_is_rewritten_without_the_legacy_marker() {
        let codec = RecordCodec::default();
        let session = RecordSession::from_slice(LEGACY_SESSION.as_bytes(), &codec).unwrap();

        let rewritten = session.encode(&codec).unwrap();
        let first = &rewritten["Entries"][0];
        assert!(first.get("EncodedRequestUri").is_none());
        assert_eq!(first["RequestBody"], json!({"TableName": "testtable16"}));

        let reloaded = RecordSession::decode(&rewritten, &codec).unwrap();
        assert!(!reloaded.entries[0].is_legacy_format);
        assert_eq!(reloaded.entries[0].request, session.entries[0].request);
        assert_eq!(reloaded.entries[1], {
            let mut download = session.entries[1].clone();
            download.is_legacy_format = false;
            download
        });
    }

    fn nested_object(depth: usize) -> String {
        format!("{}1{}", "{\"a\":".repeat(depth), "}".repeat(depth))
    }

    #[test]
    fn deeply_nested_json_reads_back() {
        let codec = RecordCodec::default();

        for depth in &[124, 126, 127] {
            let body = nested_object(*depth);
            let record = record_with_response("application/json", body.as_bytes());
            assert_eq!(round_trip(&codec, &record), record);

            let mut session = RecordSession::new();
            session.record(record);
            let bytes = session.to_vec(&codec).unwrap();
            assert_eq!(RecordSession::from_slice(&bytes, &codec).unwrap(), session);
        }
    }

    #[test]
    fn strict_escaping_leaves_bodies_intact() {
        let mut configuration = CodecConfiguration::new();
        configuration.set_json_escaping(JsonEscaping::Strict);
        let codec = RecordCodec::new(configuration);
        let record = record_with_response("text/plain", "{\"a\":\"caf\u{e9}\"}".as_bytes());

        let bytes = codec.to_vec(&record).unwrap();

        assert!(bytes.is_ascii());
        assert_eq!(codec.from_slice(&bytes).unwrap(), record);
    }

    #[test]
    fn indented_output_reads_back() {
        let mut configuration = CodecConfiguration::new();
        configuration.set_indented(true);
        let codec = RecordCodec::new(configuration);
        let record = record_with_response("text/plain", b"a\nb");

        let bytes = codec.to_vec(&record).unwrap();
        assert!(String::from_utf8(bytes.clone()).unwrap().contains("\n  \"RequestUri\""));
        assert_eq!(codec.from_slice(&bytes).unwrap(), record);
    }

    #[tokio::test]
    async fn captured_exchange_plays_back() {
        let codec = RecordCodec::default();
        let request = Request::builder()
            .method(Method::PUT)
            .uri("https://example.com/tables/t1")
            .header("content-type", "application/json")
            .header("content-length", "13")
            .body(Body::from("{ \"id\" : 1 }\n"))
            .unwrap();
        let response = Response::builder()
            .status(200)
            .header("content-type", "application/json")
            .header("x-ms-request-id", "abc")
            .body(Body::from("{\"id\":1,\"ok\":true}"))
            .unwrap();

        let captured = capture_request(request).await.unwrap();
        let record = captured.into_record(capture_response(response).await.unwrap());
        let mut session = RecordSession::new();
        session.record(record);

        let bytes = session.to_vec(&codec).unwrap();
        let session = RecordSession::from_slice(&bytes, &codec).unwrap();
        let replayed = &session.entries[0];

        assert_eq!(replayed.request.body.as_deref(), Some(&br#"{"id":1}"#[..]));
        assert_eq!(replayed.request.headers.first("content-length"), Some("8"));

        let response = build_response(replayed).unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["x-ms-request-id"], "abc");
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&body[..], br#"{"id":1,"ok":true}"#);
    }

    #[derive(Debug)]
    struct EverythingIsBinary;

    impl ContentClassifier for EverythingIsBinary {
        fn text_encoding(&self, _: &HeaderBag) -> Option<TextEncoding> {
            None
        }

        fn multipart_boundary(&self, _: &HeaderBag) -> Option<String> {
            None
        }

        fn is_manifest_content_type(&self, _: &str) -> bool {
            false
        }
    }

    #[test]
    fn classifier_can_be_substituted() {
        let mut configuration = CodecConfiguration::new();
        configuration.set_content_classifier(Arc::new(EverythingIsBinary));
        let codec = RecordCodec::new(configuration);
        let record = record_with_response("application/json", br#"{"a":1}"#);

        let encoded = codec.encode(&record).unwrap();
        assert_eq!(encoded["ResponseBody"], json!("eyJhIjoxfQ=="));
        assert_eq!(codec.decode(&encoded).unwrap(), record);
    }

    #[test]
    fn codec_is_shared_across_threads() {
        let codec = Arc::new(RecordCodec::default());

        let handles: Vec<_> = (0..4)
            .map(|index| {
                let codec = codec.clone();
                thread::spawn(move || {
                    let body = format!("{{\"worker\":{}}}", index);
                    let record = record_with_response("application/json", body.as_bytes());
                    round_trip(&codec, &record)
                })
            })
            .collect();

        for (index, handle) in handles.into_iter().enumerate() {
            let record = handle.join().unwrap();
            assert_eq!(
                record.response.body,
                Some(format!("{{\"worker\":{}}}", index).into_bytes())
            );
        }
    }

    proptest! {
        #[test]
        fn any_plain_text_round_trips(text in "[A-Z][a-z0-9 \t\r\n.,;:!?\u{e9}\u{4e2d}]{0,200}") {
            let codec = RecordCodec::default();
            let record = record_with_response("text/plain; charset=utf-8", text.as_bytes());

            prop_assert_eq!(round_trip(&codec, &record), record);
        }

        #[test]
        fn split_lines_partitions_text(text in "[ab\r\n]{0,64}") {
            let lines = split_lines(&text);

            prop_assert_eq!(lines.concat(), text.clone());
            prop_assert!(lines.iter().all(|line| !line.is_empty()));
            if let Some((_, init)) = lines.split_last() {
                prop_assert!(init.iter().all(|line| line.ends_with('\r') || line.ends_with('\n')));
            }
        }
    }
}
