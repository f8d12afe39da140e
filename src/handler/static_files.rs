//! Frontend file serving module
//!
//! Serves the landing page and its assets from the frontend directory, with a
//! built-in upload form when no frontend is deployed.

use crate::config::FrontendConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use tokio::fs;

/// Serve `GET /` and frontend assets
pub async fn serve_frontend(
    ctx: &RequestContext<'_>,
    frontend: &FrontendConfig,
) -> Response<Full<Bytes>> {
    let index_files = [frontend.index_file.clone()];
    match load_from_directory(&frontend.dir, ctx.path, &index_files).await {
        Some((content, content_type)) => build_static_file_response(
            content,
            content_type,
            ctx.if_none_match.as_deref(),
            ctx.is_head,
        ),
        None if ctx.path == "/" => {
            http::response::build_html_response(get_default_homepage(), ctx.is_head)
        }
        None => http::build_404_response(),
    }
}

/// Load static file from directory with index file support
pub async fn load_from_directory(
    static_dir: &str,
    path: &str,
    index_files: &[String],
) -> Option<(Vec<u8>, &'static str)> {
    // Remove leading slash and prevent directory traversal
    let cleaned = path.replace("..", "");
    let relative_path = cleaned.trim_start_matches('/');
    let mut file_path = Path::new(static_dir).join(relative_path);

    // Security: ensure file_path is within static_dir
    let static_dir_canonical = match Path::new(static_dir).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!("Frontend directory not available '{static_dir}': {e}");
            return None;
        }
    };

    // Check if path is a directory, try index files
    if file_path.is_dir() || relative_path.is_empty() || relative_path.ends_with('/') {
        if let Some(index_path) = index_files
            .iter()
            .map(|index_file| file_path.join(index_file))
            .find(|index_path| index_path.is_file())
        {
            file_path = index_path;
        }
    }

    // File not found is common (404), no need to log at warning level
    let Ok(file_path_canonical) = file_path.canonicalize() else {
        return None;
    };
    if !file_path_canonical.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_path_canonical.display()
        ));
        return None;
    }
    if !file_path_canonical.is_file() {
        return None;
    }

    let content = match fs::read(&file_path_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return None;
        }
    };

    let extension = file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    Some((content, mime::get_content_type(extension.as_deref())))
}

/// Built-in landing page: a bare upload form posting to `/compress`
pub fn get_default_homepage() -> String {
    String::from(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>squeeze - image &amp; PDF compressor</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Arial, sans-serif;
            background: #f4f5f7;
            display: flex;
            align-items: center;
            justify-content: center;
            min-height: 100vh;
            margin: 0;
        }
        form {
            background: white;
            padding: 32px 40px;
            border-radius: 12px;
            box-shadow: 0 4px 24px rgba(0, 0, 0, 0.08);
            max-width: 420px;
        }
        h1 { margin-top: 0; font-size: 1.6em; }
        label { display: block; margin: 16px 0 6px; font-weight: 600; }
        input[type=number] { width: 120px; }
        button {
            margin-top: 24px;
            padding: 10px 24px;
            border: none;
            border-radius: 6px;
            background: #2563eb;
            color: white;
            font-size: 1em;
            cursor: pointer;
        }
        p { color: #555; font-size: 0.9em; }
    </style>
</head>
<body>
    <form action="/compress" method="post" enctype="multipart/form-data">
        <h1>Compress a file</h1>
        <p>JPG, PNG or PDF. The compressed file downloads when it is ready.</p>
        <label for="file">File</label>
        <input id="file" name="file" type="file" accept=".jpg,.jpeg,.png,.pdf" required>
        <label for="targetSizeKB">Target size (KB)</label>
        <input id="targetSizeKB" name="targetSizeKB" type="number" min="1" value="500">
        <br>
        <button type="submit">Compress</button>
    </form>
</body>
</html>"#,
    )
}

/// Build static file response with `ETag` support
fn build_static_file_response(
    data: Vec<u8>,
    content_type: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&data);

    // Check if client has cached version
    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    http::response::build_cached_response(Bytes::from(data), content_type, &etag, is_head)
}
