use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::foundation::error::{ShortsError, ShortsResult};
use crate::render::{CancelFlag, OUTPUT_FILE, RenderRequest, RequestForm};

use super::AppState;
use super::error::ApiError;

/// `POST /generate`: multipart form in, `shorts.mp4` attachment out.
pub async fn generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let req = read_form(multipart).await?;

    let cancel = CancelFlag::new();
    let timeout = state.render_timeout;
    let rendered = match tokio::time::timeout(timeout, state.pipeline.render(req, cancel.clone()))
        .await
    {
        Ok(result) => result?,
        Err(_) => {
            cancel.cancel();
            return Err(ShortsError::render(format!(
                "render exceeded {}s and was aborted",
                timeout.as_secs()
            ))
            .into());
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, "video/mp4".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{OUTPUT_FILE}\""),
            ),
        ],
        rendered.bytes,
    )
        .into_response())
}

/// Collect every part, then decode. Nothing touches disk here.
async fn read_form(mut multipart: Multipart) -> ShortsResult<RenderRequest> {
    let mut form = RequestForm::new();
    let mut background = None;
    let mut images = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ShortsError::validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let key = name.strip_suffix("[]").unwrap_or(&name);
        match key {
            "background" | "images" => {
                let bytes = field.bytes().await.map_err(|e| {
                    ShortsError::validation(format!("failed to read '{name}' upload: {e}"))
                })?;
                if key == "background" {
                    background = Some(bytes.to_vec());
                } else {
                    images.push(bytes.to_vec());
                }
            }
            _ => {
                let value = field.text().await.map_err(|e| {
                    ShortsError::validation(format!("failed to read field '{name}': {e}"))
                })?;
                form.push_field(&name, value);
            }
        }
    }

    form.into_request(background, images)
}
