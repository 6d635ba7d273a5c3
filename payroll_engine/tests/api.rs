use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use payroll_engine::api::router;
use payroll_engine::models::PayrollRecord;
use payroll_engine::source::JsonDirSource;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn records() -> Vec<PayrollRecord> {
    serde_json::from_value(json!([
        {
            "userId": "ana", "month": 1, "year": 2024,
            "baseRemuneration": 3000,
            "performanceLevel": 2,
            "position": {"id": "p1", "bonifiable": true},
            "bonus": {"baseBonus": 400, "bonusDiscounts": [{"percentage": 10, "calculationOrder": 1, "reference": "IR"}]},
            "discounts": [{"percentage": 10, "calculationOrder": 1, "reference": "INSS"}]
        },
        {
            "userId": "ana", "month": 2, "year": 2024,
            "performanceLevel": 0,
            "position": {"id": "p1", "bonifiable": true, "remuneration": 3100},
            "bonus": {"baseBonus": 400}
        },
        {
            "userId": "bruno", "month": 1, "year": 2024,
            "baseRemuneration": "2.000,00",
            "position": {"id": "p2", "bonifiable": false},
            "bonusAmount": 250
        }
    ]))
    .unwrap()
}

fn app() -> axum::Router {
    router(Arc::new(JsonDirSource::new(records())))
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn cascade_endpoint_compounds_percentages() {
    let (status, body) = send(post(
        "/api/discounts/cascade",
        json!({
            "baseAmount": 100,
            "rules": [
                {"percentage": 10, "calculationOrder": 2, "reference": "b"},
                {"percentage": 10, "calculationOrder": 1, "reference": "a"}
            ]
        }),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["remainingAmount"], json!(81.0));
    assert_eq!(body["totalDeducted"], json!(19.0));
    assert_eq!(body["lines"][0]["reference"], "a");
}

#[tokio::test]
async fn compute_endpoint_returns_breakdown() {
    let record = serde_json::to_value(&records()[0]).unwrap();
    let (status, body) = send(post("/api/payroll/compute", record)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalGross"], json!(3400.0));
    // 10% of 3400 plus 10% of 400
    assert_eq!(body["totalDiscounts"], json!(380.0));
    assert_eq!(body["totalNet"], json!(3020.0));
    assert_eq!(body["bonusEligible"], json!(true));
}

#[tokio::test]
async fn aggregate_endpoint_deduplicates_single_month() {
    let payload = json!([
        {"userId": "u1", "baseRemuneration": 1000},
        {"userId": "u1", "baseRemuneration": 1000}
    ]);
    let (status, body) = send(post("/api/payroll/aggregate", payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uniqueUsersCount"], json!(1));
    assert_eq!(body["totalRemuneration"], json!(1000.0));
    assert_eq!(body["isMultiMonth"], json!(false));
}

#[tokio::test]
async fn payroll_lookup_and_not_found() {
    let (status, body) = send(get("/api/payrolls/ana/2024/2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["baseRemuneration"], json!(3100.0));
    assert_eq!(body["bonusAmount"], json!(0.0));

    let (status, body) = send(get("/api/payrolls/carla/2024/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("carla"));
}

#[tokio::test]
async fn listing_spans_months_and_totals() {
    let (status, body) = send(get("/api/payrolls?year=2024&months=1,2")).await;
    assert_eq!(status, StatusCode::OK);

    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["monthLabel"], "01/2024");
    assert_eq!(rows[2]["monthLabel"], "02/2024");

    let totals = &body["totals"];
    assert_eq!(totals["isMultiMonth"], json!(true));
    assert_eq!(totals["monthCount"], json!(2));
    assert_eq!(totals["uniqueUsersCount"], json!(2));
    assert_eq!(totals["totalRemuneration"], json!(8100.0));
    assert_eq!(totals["totalBonus"], json!(400.0));
    assert_eq!(totals["bonusEligibleCount"], json!(1));
    assert_eq!(totals["averagePerUser"], json!(2833.33));
}

#[tokio::test]
async fn listing_rejects_bad_months() {
    let (status, body) = send(get("/api/payrolls?months=13")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("13"));
}
