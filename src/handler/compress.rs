//! `POST /compress` handler
//!
//! Parses the multipart body into an upload, hands it to the dispatcher and
//! turns the outcome into an attachment or a plain-text error.

use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response};
use multer::Multipart;

use crate::config::AppState;
use crate::dispatch::{read_upload, CompressedFile, DispatchError};
use crate::http;
use crate::logger;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub async fn handle_compress<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    match compress(req, state).await {
        Ok(file) => {
            tracing::info!(
                result = %file.path.display(),
                bytes = file.data.len(),
                "Compression succeeded"
            );
            http::build_attachment_response(file.data, file.content_type, &file.file_name)
        }
        Err(err) => {
            if err.is_client_error() {
                logger::log_warning(&format!("Rejected upload: {err}"));
            } else {
                logger::log_error(&format!("Compression failed: {err}"));
            }
            http::build_text_response(err.status(), err.public_message())
        }
    }
}

async fn compress<B>(req: Request<B>, state: &AppState) -> Result<CompressedFile, DispatchError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    // Anything but a form upload simply carries no file
    if !is_form_data(content_type) {
        return Err(DispatchError::NoFile);
    }
    let boundary = multer::parse_boundary(content_type)?;

    let limit = usize::try_from(state.config.http.max_body_size).unwrap_or(usize::MAX);
    let body = Limited::new(req.into_body(), limit);
    let multipart = Multipart::new(body.into_data_stream(), boundary);

    // The upload's temp file lives until this function returns
    let upload = read_upload(multipart, &state.config.compression).await?;
    state.dispatcher.dispatch(&upload).await
}

fn is_form_data(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("multipart/form-data"))
}
