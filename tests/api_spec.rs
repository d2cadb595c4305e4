use axum::http::StatusCode;
use axum_test::TestServer;
use cadlink::api::create_router;
use cadlink::api::response::{ErrorBody, SuccessBody};
use cadlink::document::Document;
use serde_json::{json, Value};

fn setup() -> (TestServer, Document) {
    let document = Document::open_memory();
    let app = create_router(document.clone());
    let server = TestServer::new(app).expect("Failed to create test server");
    (server, document)
}

async fn ok(server: &TestServer, body: Value) -> String {
    let response = server.post("/").json(&body).await;
    response.assert_status_ok();
    response.json::<SuccessBody>().result
}

async fn rejected(server: &TestServer, body: Value) -> String {
    let response = server.post("/").json(&body).expect_failure().await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.json::<ErrorBody>().error
}

mod wire_contract {
    use super::*;

    #[tokio::test]
    async fn success_is_200_with_result_only() {
        let (server, _) = setup();

        let response = server
            .post("/")
            .json(&json!({"command": "create_sketch", "plane": "xy"}))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({"result": "Created sketch on xy plane"}));
    }

    #[tokio::test]
    async fn failure_is_400_with_error_only() {
        let (server, _) = setup();

        let response = server
            .post("/")
            .json(&json!({"command": "create_circle"}))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "No active sketch found"}));
    }

    #[tokio::test]
    async fn any_path_is_accepted() {
        let (server, document) = setup();

        let response = server
            .post("/some/where")
            .json(&json!({"command": "create_sketch"}))
            .await;

        response.assert_status_ok();
        assert_eq!(document.snapshot().sketches.len(), 1);
    }

    #[tokio::test]
    async fn body_without_content_type_is_parsed() {
        let (server, _) = setup();

        let response = server
            .post("/")
            .text(r#"{"command": "create_sketch", "plane": "yz"}"#)
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<SuccessBody>().result,
            "Created sketch on yz plane"
        );
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let (server, _) = setup();

        let response = server.post("/").text("not json").expect_failure().await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<ErrorBody>().error.starts_with("Invalid JSON"));
    }

    #[tokio::test]
    async fn non_object_json_is_400() {
        let (server, _) = setup();
        let error = rejected(&server, json!([1, 2, 3])).await;
        assert_eq!(error, "Request body must be a JSON object");
    }

    #[tokio::test]
    async fn unknown_command_is_400() {
        let (server, document) = setup();

        assert_eq!(rejected(&server, json!({"command": "explode"})).await, "Unknown command");
        assert_eq!(rejected(&server, json!({})).await, "Unknown command");
        assert!(document.snapshot().is_empty());
    }

    #[tokio::test]
    async fn failures_do_not_leak_identifiers() {
        let (server, _) = setup();
        ok(&server, json!({"command": "create_sketch"})).await;

        let error = rejected(&server, json!({"command": "extrude"})).await;

        assert_eq!(error, "No profiles found in sketch");
        let response: Value = server
            .post("/")
            .json(&json!({"command": "split_body"}))
            .expect_failure()
            .await
            .json();
        assert_eq!(response.as_object().map(|o| o.len()), Some(1));
    }
}

mod modeling_session {
    use super::*;

    #[tokio::test]
    async fn sketch_rectangle_extrude_fillet_export() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let document = Document::with_export_dir(dir.path());
        let server =
            TestServer::new(create_router(document.clone())).expect("Failed to create test server");

        assert_eq!(
            ok(&server, json!({"command": "create_sketch", "plane": "xy", "name": "S1"})).await,
            "Created sketch on xy plane"
        );
        assert_eq!(
            ok(
                &server,
                json!({"command": "draw_rectangle", "width": 10, "height": 5, "x": 0, "y": 0})
            )
            .await,
            "Drew rectangle at (0.0, 0.0) with width 10.0, height 5.0"
        );
        assert_eq!(
            ok(&server, json!({"command": "extrude", "distance": 2.5})).await,
            "Extruded profile by 2.5 cm"
        );
        assert_eq!(
            ok(&server, json!({"command": "fillet", "radius": 0.5})).await,
            "Added fillet with radius 0.5"
        );
        assert_eq!(
            ok(&server, json!({"command": "export_stl", "filename": "part.stl"})).await,
            "Exported STL to part.stl"
        );

        let state = document.snapshot();
        assert_eq!(state.sketches[0].name, "S1");
        assert_eq!(state.feature_names(), vec!["Extrude1", "Fillet1"]);
        assert!(dir.path().join("part.stl").exists());
    }

    #[tokio::test]
    async fn pattern_then_measure() {
        let (server, _) = setup();
        ok(&server, json!({"command": "create_sketch"})).await;
        ok(&server, json!({"command": "draw_rectangle", "width": 4, "height": 4})).await;
        ok(&server, json!({"command": "extrude"})).await;

        assert_eq!(
            ok(&server, json!({"command": "pattern", "quantity": 2.0, "distance": 10})).await,
            "Created rectangular pattern with 2 instances"
        );
        assert_eq!(
            ok(&server, json!({"command": "measure_distance"})).await,
            "Minimum distance: 6.0 cm"
        );
    }

    #[tokio::test]
    async fn oversized_pattern_is_rejected_without_mutation() {
        let (server, document) = setup();
        ok(&server, json!({"command": "create_sketch"})).await;
        ok(&server, json!({"command": "draw_rectangle"})).await;
        ok(&server, json!({"command": "extrude"})).await;

        let error = rejected(&server, json!({"command": "pattern", "quantity": 3000000})).await;

        assert_eq!(error, "Invalid geometry: pattern quantity exceeds 1000 instances");
        assert_eq!(document.snapshot().bodies.len(), 1);
    }

    #[tokio::test]
    async fn export_outside_export_dir_is_rejected() {
        let (server, _) = setup();

        let error = rejected(&server, json!({"command": "export_stl", "filename": "/tmp/part.stl"})).await;

        assert!(error.starts_with("Export failed"), "got {}", error);
    }

    #[tokio::test]
    async fn offset_plane_then_split() {
        let (server, document) = setup();
        ok(&server, json!({"command": "create_sketch"})).await;
        ok(&server, json!({"command": "create_circle", "radius": 3})).await;
        ok(&server, json!({"command": "extrude", "distance": 10})).await;

        assert_eq!(
            rejected(&server, json!({"command": "split_body"})).await,
            "No plane for splitting"
        );
        assert_eq!(
            ok(&server, json!({"command": "create_offset_plane", "offset": 4})).await,
            "Created offset plane at 4.0 cm"
        );
        assert_eq!(
            ok(&server, json!({"command": "split_body"})).await,
            "Split body into halves"
        );
        assert_eq!(document.snapshot().bodies.len(), 2);
    }

    #[tokio::test]
    async fn undo_on_fresh_document_fails() {
        let (server, _) = setup();
        assert_eq!(
            rejected(&server, json!({"command": "undo"})).await,
            "Nothing to undo"
        );
    }

    #[tokio::test]
    async fn capability_failures_are_reported_as_400() {
        let (server, document) = setup();
        ok(&server, json!({"command": "create_sketch"})).await;

        let error = rejected(&server, json!({"command": "create_circle", "radius": -1})).await;

        assert!(error.starts_with("Invalid geometry"), "got {}", error);
        assert_eq!(document.snapshot().sketches[0].curves.len(), 0);
    }
}
