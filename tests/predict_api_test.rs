mod common;

use axum::{body::Body, http::Request, http::StatusCode};
use common::TestApp;
use serde_json::json;

fn product_payload() -> serde_json::Value {
    json!({
        "category": "Electronics",
        "material": "Plastic",
        "brand": "EcoTech",
        "price": 40,
        "rating": 4.5,
        "reviewsCount": 150,
        "carbonFootprint": 20,
        "waterUsage": 500,
        "wasteProduction": 5,
        "avgPrice": 60
    })
}

#[tokio::test]
async fn product_reference_payload_scores_full_marks() {
    let app = TestApp::new().await;
    let (status, body) = app.post_json("/api/predict/product", &product_payload()).await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["prediction"]["sustainabilityScore"], 100);
    assert_eq!(body["prediction"]["purchaseLikelihood"], 95);
    let factors = &body["prediction"]["factors"];
    assert_eq!(factors["lowCarbonFootprint"], 25);
    assert_eq!(factors["affordablePrice"], 10);
    assert!(body["id"].as_i64().unwrap() >= 1);
}

#[tokio::test]
async fn packaging_prediction_stays_in_range() {
    let app = TestApp::new().await;
    let payload = json!({
        "materialType": "Plastic",
        "productWeight": 420,
        "fragility": "High",
        "recyclable": "No",
        "transportMode": "Air",
        "lcaEmission": 3.2
    });

    for _ in 0..10 {
        let (status, body) = app.post_json("/api/predict/packaging", &payload).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        let score = body["prediction"]["sustainabilityScore"].as_u64().unwrap();
        assert!((60..=100).contains(&score));
        let packaging_type = body["prediction"]["packagingType"].as_str().unwrap();
        assert!(ecoscore_api::ml::packaging::PACKAGING_OPTIONS.contains(&packaging_type));
    }
}

#[tokio::test]
async fn carbon_breakdown_sums_to_about_one_hundred() {
    let app = TestApp::new().await;
    let payload = json!({
        "totalPurchases": 10,
        "avgDistance": 300,
        "preferredPackaging": "Cardboard",
        "returnsPercent": 2,
        "electricity": 250,
        "travel": 800,
        "serviceUsage": 20
    });
    let (status, body) = app.post_json("/api/predict/carbon", &payload).await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let prediction = &body["prediction"];
    assert_eq!(prediction["totalEmissions"], 903);
    let sum: i64 = ["transportation", "packaging", "electricity", "other"]
        .iter()
        .map(|k| prediction["breakdown"][*k].as_i64().unwrap())
        .sum();
    assert!((97..=103).contains(&sum));
    assert!(!prediction["suggestions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn esg_category_follows_score() {
    let app = TestApp::new().await;
    let payload = json!({
        "productName": "Bamboo Toothbrush",
        "sentence": "Compostable handle",
        "sentiment": "Positive",
        "environmentalScore": 75
    });
    let (status, body) = app.post_json("/api/predict/esg", &payload).await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let score = body["prediction"]["esgScore"].as_u64().unwrap();
    let expected = if score >= 70 { "Eco-friendly" } else { "Non Eco-friendly" };
    assert_eq!(body["prediction"]["category"], expected);
    assert_eq!(body["prediction"]["sentiment"], "Positive");
}

#[tokio::test]
async fn malformed_and_invalid_bodies_are_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app.post_raw("/api/predict/esg", b"{oops".to_vec()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    let mut payload = product_payload();
    payload["rating"] = json!(9);
    let (status, body) = app.post_json("/api/predict/product", &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("rating"));
    assert!(body["request_id"].is_string());

    let (status, _) = app
        .post_json("/api/predict/carbon", &json!({ "totalPurchases": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, history) = app.get("/api/predictions").await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn history_is_newest_first_and_filterable() {
    let app = TestApp::new().await;
    app.post_json("/api/predict/product", &product_payload()).await;
    let esg = json!({
        "productName": "Kettle",
        "sentence": "Fine",
        "sentiment": "Neutral",
        "environmentalScore": 40
    });
    let (_, latest) = app.post_json("/api/predict/esg", &esg).await;

    let (status, all) = app.get("/api/predictions").await;
    assert_eq!(status, StatusCode::OK);
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["id"], latest["id"]);
    assert_eq!(all[0]["modelType"], "esg");
    assert_eq!(all[0]["inputData"]["productName"], "Kettle");

    let (_, products) = app.get("/api/predictions?modelType=product").await;
    let products = products.as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["confidence"], 0.95);

    let (status, body) = app.get("/api/predictions?modelType=weather").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation error: Invalid model type: weather");
}

#[tokio::test]
async fn request_id_is_echoed_on_errors() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/predict/esg")
        .header("x-request-id", "req-fixed-1")
        .body(Body::from("not json"))
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["request_id"], "req-fixed-1");
}
