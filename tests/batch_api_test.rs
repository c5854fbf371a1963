mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use common::TestApp;
use ecoscore_api::models::{BatchJobStatus, BatchRowResult, ModelType};

const PRODUCT_CSV: &str = "category,material,brand,price,rating,Reviews,carbon,water,waste,avg_price\n\
Apparel,Cotton,EcoWear,45,4.5,150,20,500,5,60\n\
Toys,Plastic,FunCo,80,3.9,12,75,1500,14,60\n\
Home,Bamboo,Leafy,30,4.8,300,10,200,2,40\n";

#[tokio::test]
async fn three_row_upload_completes() {
    let app = TestApp::new().await;
    let (status, body) = app
        .upload("products.csv", "text/csv", PRODUCT_CSV, Some("product"))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["totalRows"], 3);

    let job = app.wait_for_job(body["jobId"].as_i64().unwrap()).await;
    assert_eq!(job.status, BatchJobStatus::Completed);
    assert_eq!(job.model_type, ModelType::Product);
    assert_eq!(job.filename, "products.csv");
    assert_eq!(job.total_rows, 3);
    assert_eq!(job.processed_rows, 3);
    assert!(job.completed_at.is_some());
    assert!(job.error_message.is_none());

    let results = job.results.expect("completed job carries results");
    assert_eq!(results.len(), 3);
    assert_matches!(&results[0], BatchRowResult::Success { prediction, .. } => {
        assert_eq!(prediction["sustainabilityScore"], 100);
    });
    assert_matches!(&results[1], BatchRowResult::Success { input, .. } => {
        assert_eq!(input["category"], "Toys");
        assert_eq!(input["reviewsCount"], 12.0);
    });
}

#[tokio::test]
async fn bad_rows_are_captured_without_failing_the_job() {
    let app = TestApp::new().await;
    let csv = "Product Name,Sentiment,Environmental Score\nSoap,Positive,80\nLamp,Neutral,180\n";
    let (status, body) = app.upload("esg.csv", "text/csv", csv, Some("esg")).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let job = app.wait_for_job(body["jobId"].as_i64().unwrap()).await;
    assert_eq!(job.status, BatchJobStatus::Completed);
    let results = job.results.unwrap();
    assert!(results[0].is_success());
    assert_matches!(&results[1], BatchRowResult::Error { input, error } => {
        assert_eq!(input["Product Name"], "Lamp");
        assert!(!error.is_empty());
    });
}

#[tokio::test]
async fn csv_is_identified_by_extension_when_mime_is_generic() {
    let app = TestApp::new().await;
    let (status, _) = app
        .upload(
            "rows.csv",
            "application/octet-stream",
            "Total_Purchases\n3\n",
            Some("carbon"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn upload_rejections() {
    let app = TestApp::new().await;

    let (status, body) = app
        .upload("rows.json", "application/json", "{}", Some("esg"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Bad request: Only CSV files are allowed");

    let (status, _) = app
        .upload("rows.csv", "text/csv", PRODUCT_CSV, Some("weather"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.upload("rows.csv", "text/csv", PRODUCT_CSV, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Bad request: modelType is required");

    let (status, body) = app
        .upload("rows.csv", "text/csv", "category,material", Some("product"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Bad request: CSV must have at least a header and one data row"
    );

    let (_, jobs) = app.get("/api/batch/jobs").await;
    assert!(jobs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_file_is_a_bad_request() {
    let app = TestApp::new().await;
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"modelType\"\r\n\r\nesg\r\n--{b}--\r\n",
        b = common::BOUNDARY
    );
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/batch/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", common::BOUNDARY),
        )
        .body(axum::body::Body::from(body))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Bad request: No file uploaded");
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = TestApp::new().await;
    let limit = app.state.config.max_upload_bytes;
    let mut csv = String::from("Sentiment,Environmental Score\n");
    while csv.len() <= limit {
        csv.push_str("Positive,80\n");
    }

    let (status, _) = app.upload("big.csv", "text/csv", &csv, Some("esg")).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn jobs_are_listed_newest_first() {
    let app = TestApp::new().await;
    let (_, first) = app
        .upload("a.csv", "text/csv", PRODUCT_CSV, Some("product"))
        .await;
    let (_, second) = app
        .upload("b.csv", "text/csv", "Sentiment\nPositive\n", Some("esg"))
        .await;
    app.wait_for_job(first["jobId"].as_i64().unwrap()).await;
    app.wait_for_job(second["jobId"].as_i64().unwrap()).await;

    let (status, jobs) = app.get("/api/batch/jobs").await;
    assert_eq!(status, StatusCode::OK);
    let jobs = jobs.as_array().unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0]["id"], second["jobId"]);
    assert_eq!(jobs[1]["filename"], "a.csv");
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/batch/jobs/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found: Batch job 999 not found");
}
