use crate::{
    errors::ServiceError,
    models::{BatchJob, ModelType},
    services::batch::BatchSubmission,
    AppState,
};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::info;
use utoipa::ToSchema;

const DEFAULT_FILENAME: &str = "upload.csv";

/// Multipart form accepted by `POST /api/batch/upload`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct BatchUploadForm {
    /// CSV file with a header row
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    /// packaging, carbon, product or esg
    #[schema(example = "esg")]
    model_type: String,
}

struct CsvUpload {
    filename: String,
    content: Bytes,
}

fn multipart_error(err: MultipartError) -> ServiceError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::PayloadTooLarge("Uploaded file exceeds the size limit".to_string())
    } else {
        ServiceError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

fn is_csv(content_type: Option<&str>, filename: Option<&str>) -> bool {
    let by_mime = content_type
        .map(|mime| mime.split(';').next().unwrap_or(mime).trim())
        .is_some_and(|mime| mime.eq_ignore_ascii_case("text/csv"));
    let by_name = filename.is_some_and(|name| name.to_ascii_lowercase().ends_with(".csv"));
    by_mime || by_name
}

#[utoipa::path(
    post,
    path = "/api/batch/upload",
    request_body(content = BatchUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Batch job queued", body = BatchSubmission),
        (status = 400, description = "Missing or invalid file or model type", body = crate::errors::ErrorResponse),
        (status = 413, description = "File too large", body = crate::errors::ErrorResponse)
    ),
    tag = "batch"
)]
pub async fn upload_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BatchSubmission>, ServiceError> {
    let max_bytes = state.config.max_upload_bytes;
    let mut upload: Option<CsvUpload> = None;
    let mut model_type: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                if !is_csv(field.content_type(), field.file_name()) {
                    return Err(ServiceError::BadRequest(
                        "Only CSV files are allowed".to_string(),
                    ));
                }
                let filename = field
                    .file_name()
                    .unwrap_or(DEFAULT_FILENAME)
                    .to_string();
                let content = field.bytes().await.map_err(multipart_error)?;
                if content.len() > max_bytes {
                    return Err(ServiceError::PayloadTooLarge(format!(
                        "Uploaded file exceeds {} bytes",
                        max_bytes
                    )));
                }
                upload = Some(CsvUpload { filename, content });
            }
            Some("modelType") => {
                model_type = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let upload =
        upload.ok_or_else(|| ServiceError::BadRequest("No file uploaded".to_string()))?;
    let model_type = model_type
        .ok_or_else(|| ServiceError::BadRequest("modelType is required".to_string()))?;
    let model_type = ModelType::parse(model_type.trim())?;
    let csv = std::str::from_utf8(&upload.content)
        .map_err(|_| ServiceError::BadRequest("CSV must be UTF-8 text".to_string()))?;

    info!(filename = %upload.filename, bytes = upload.content.len(), "batch upload received");
    let (submission, _handle) = state
        .services
        .batch
        .submit(&upload.filename, model_type, csv)
        .await?;
    Ok(Json(submission))
}

#[utoipa::path(
    get,
    path = "/api/batch/jobs",
    responses(
        (status = 200, description = "Batch jobs, newest first", body = [BatchJob])
    ),
    tag = "batch"
)]
pub async fn list_batch_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<BatchJob>>, ServiceError> {
    let jobs = state.services.batch.list().await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    get,
    path = "/api/batch/jobs/:id",
    params(
        ("id" = i32, Path, description = "Batch job id")
    ),
    responses(
        (status = 200, description = "Batch job with results once completed", body = BatchJob),
        (status = 404, description = "Batch job not found", body = crate::errors::ErrorResponse)
    ),
    tag = "batch"
)]
pub async fn get_batch_job(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<BatchJob>, ServiceError> {
    let job = state.services.batch.get(id).await?;
    Ok(Json(job))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_is_recognised_by_mime_or_extension() {
        assert!(is_csv(Some("text/csv"), None));
        assert!(is_csv(Some("text/csv; charset=utf-8"), Some("rows")));
        assert!(is_csv(Some("application/octet-stream"), Some("Rows.CSV")));
        assert!(!is_csv(Some("application/json"), Some("rows.json")));
        assert!(!is_csv(None, None));
    }
}
