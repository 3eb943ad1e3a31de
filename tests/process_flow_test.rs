use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use process_core::{
    models::candidate::CandidateStatus, routes, services::candidate_service::NewCandidate, AppState,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

async fn setup() -> (Router, AppState) {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("API_RPS", "100");
    env::set_var("EXTRACT_DEBUG", "true");
    let _ = process_core::config::init_config();

    let pool = process_core::database::pool::create_pool()
        .await
        .expect("pool");
    process_core::database::pool::run_migrations(&pool)
        .await
        .expect("migrations");

    let state = AppState::new(pool).expect("app state");
    let app = routes::api_routes().with_state(state.clone());
    (app, state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<JsonValue>) -> (StatusCode, JsonValue) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
#[ignore = "requires postgres via DATABASE_URL"]
async fn process_lifecycle_end_to_end() {
    let (app, state) = setup().await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/processes",
        Some(json!({
            "name": "Ejecutivo comercial",
            "area": "Ventas",
            "modality": "Híbrido",
            "required_skills": [{"value": "crm", "label": "CRM"}],
            "start_date": "2026-10-19",
            "job_functions": "<p>Atender&nbsp;clientes</p>",
            "job_requirements": "<ul><li>Excel</li></ul>"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "Activo");
    assert_eq!(created["start_date_display"], "19 de octubre de 2026");
    assert_eq!(created["required_skills"][0]["level"], 3);
    let process_id = Uuid::parse_str(created["id"].as_str().unwrap()).unwrap();

    let mut candidate_ids = Vec::new();
    for (name, product) in [
        ("Ana", json!({"cupo_total": 100, "cupo_utilizado": 40}).to_string()),
        ("Luis", json!({"cupo_total": 200, "cupo_utilizado": 60}).to_string()),
        ("Rota", "{not json".to_string()),
    ] {
        let candidate = state
            .candidate_service
            .create(NewCandidate {
                process_id,
                name: name.to_string(),
                ai_score: 72,
                product: Some(product),
                ..Default::default()
            })
            .await
            .expect("candidate");
        candidate_ids.push(candidate.id);
    }

    let (status, totals) = send(&app, "GET", &format!("/api/processes/{}/totals", process_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(totals["cupo_total"], 300.0);
    assert_eq!(totals["cupo_utilizado"], 100.0);
    assert_eq!(totals["malformed"], 1);
    assert_eq!(totals["display"]["cupo_total"], "$300");

    let (_, detail) = send(&app, "GET", &format!("/api/processes/{}", process_id), None).await;
    assert_eq!(detail["process"]["candidate_count"], 3);
    assert_eq!(detail["candidates"].as_array().unwrap().len(), 3);

    for allowed in CandidateStatus::ALL.map(|s| s.as_str()) {
        let (status, candidate) = send(
            &app,
            "POST",
            &format!("/api/candidates/{}/status", candidate_ids[0]),
            Some(json!({"status": allowed})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(candidate["status"], allowed);

        let (_, stored) = send(&app, "GET", &format!("/api/candidates/{}", candidate_ids[0]), None).await;
        assert_eq!(stored["status"], allowed);
    }

    let (status, edited) = send(
        &app,
        "PATCH",
        &format!("/api/candidates/{}", candidate_ids[1]),
        Some(json!({"phone": "9 8765 4321", "linkedin_url": "linkedin.com/in/luis"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["phone"], "+56987654321");
    assert_eq!(edited["linkedin_url"], "https://www.linkedin.com/in/luis");

    let (_, description) = send(
        &app,
        "GET",
        &format!("/api/processes/{}/job-description", process_id),
        None,
    )
    .await;
    assert_eq!(description["job_functions"], "Atender clientes");

    let (status, finished) = send(
        &app,
        "POST",
        &format!("/api/processes/{}/actions", process_id),
        Some(json!({"action": "finish"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finished["status"], "Finalizado");
    assert_eq!(finished["accepts_uploads"], false);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/candidates/{}/status", candidate_ids[1]),
        Some(json!({"status": "Aprobado"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/processes/{}/actions", process_id),
        Some(json!({"action": "pause"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, reactivated) = send(
        &app,
        "POST",
        &format!("/api/processes/{}/actions", process_id),
        Some(json!({"action": "reactivate"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reactivated["status"], "Activo");

    let (_, listed) = send(&app, "GET", &format!("/api/processes/{}/candidates", process_id), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 3);
    let (status, _) = send(&app, "DELETE", &format!("/api/candidates/{}", candidate_ids[2]), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, deleted) = send(&app, "DELETE", &format!("/api/processes/{}", process_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted"], true);
    assert_eq!(deleted["redirect_to"], "/");

    let (status, _) = send(&app, "GET", &format!("/api/processes/{}", process_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", &format!("/api/candidates/{}", candidate_ids[0]), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires postgres via DATABASE_URL"]
async fn skills_are_created_once_case_insensitively() {
    let (app, _) = setup().await;
    let name = format!("Rust {}", Uuid::new_v4());

    let (status, first) = send(&app, "POST", "/api/skills", Some(json!({"name": name}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["created"], true);

    let (status, second) = send(
        &app,
        "POST",
        "/api/skills",
        Some(json!({"name": name.to_uppercase()})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["created"], false);
    assert_eq!(second["skill"]["value"], first["skill"]["value"]);

    let (_, banks) = send(&app, "GET", "/api/banks", None).await;
    let names: Vec<&str> = banks
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|b| b["name"].as_str())
        .collect();
    assert!(names.len() >= 7);
    assert!(names.contains(&"Itaú"));
}

#[tokio::test]
#[ignore = "requires postgres via DATABASE_URL"]
async fn mixed_upload_batch_stores_nothing() {
    let (app, _) = setup().await;
    let (_, created) = send(&app, "POST", "/api/processes", Some(json!({"name": "Cartolas mixtas"}))).await;
    let process_id = created["id"].as_str().unwrap().to_string();

    let boundary = "mixed-batch-boundary";
    let mut body = String::new();
    for (name, value) in [("process_id", process_id.as_str()), ("user_id", "7")] {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            boundary, name, value
        ));
    }
    for (filename, content) in [("ok.pdf", "%PDF-1.4"), ("bad.csv", "a,b,c")] {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n\r\n{}\r\n",
            boundary, filename, content
        ));
    }
    body.push_str(&format!("--{}--\r\n", boundary));

    let req = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let (_, candidates) = send(&app, "GET", &format!("/api/processes/{}/candidates", process_id), None).await;
    assert!(candidates.as_array().unwrap().is_empty());
    let (status, _) = send(&app, "DELETE", &format!("/api/processes/{}", process_id), None).await;
    assert_eq!(status, StatusCode::OK);
}
