//! Axum router binding the HTTP surface to [`crate::attr_ops`],
//! [`crate::file_ops`] and [`crate::io_ops`].
//!
//! Authentication is an external collaborator; [`CurrentUser`] only stands
//! in for it so the rest of the crate has something to extract requests
//! against. Nothing here verifies a session or a password.

use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, FromRequestParts, Path, Query, State};
use axum::http::{request::Parts, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::Filesystem;
use crate::{Error, MAX_WRITE_BODY};

/// The header the stand-in authentication layer reads the caller's uid
/// from. A real deployment replaces this extractor; the route handlers
/// underneath don't change.
const CALLER_UID_HEADER: &str = "x-rfsd-uid";

/// The already-authenticated caller of a request.
pub struct CurrentUser(pub u32);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let uid = parts
            .headers
            .get(CALLER_UID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u32>().ok())
            .ok_or_else(|| error_response(&Error::Access))?;
        Ok(CurrentUser(uid))
    }
}

/// Build the full router for a [`Filesystem`] handle.
pub fn router(fs: Filesystem) -> Router {
    Router::new()
        .route("/api/directories/{ino}/entries", get(readdir))
        .route("/api/directories/{parent_ino}/entries/lookup", get(lookup))
        .route("/api/directories/{parent_ino}/dirs/{name}", post(mkdir).delete(rmdir))
        .route("/api/directories/{parent_ino}/files/{name}", post(create).delete(unlink))
        .route("/api/directories/{old_parent_ino}/entries/{old_name}", patch(rename))
        .route("/api/files/{ino}", get(read).put(write))
        .route("/api/files/stream/{ino}", get(read_stream).put(write_stream))
        .route("/api/files/{ino}/attributes", get(getattr).patch(setattr))
        .route("/api/links/{target_ino}", post(hardlink))
        .route("/api/symlinks", post(symlink))
        .route("/api/symlinks/{ino}", get(readlink))
        .route("/api/size", get(free_space))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(MAX_WRITE_BODY as usize))
        .with_state(fs)
}

fn error_response(err: &Error) -> Response {
    let status = match err {
        Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        Error::Access => StatusCode::FORBIDDEN,
        Error::NoEntry => StatusCode::NOT_FOUND,
        Error::NotDir => StatusCode::BAD_REQUEST,
        Error::IsDir => StatusCode::BAD_REQUEST,
        Error::Exist => StatusCode::CONFLICT,
        Error::NotEmpty => StatusCode::CONFLICT,
        Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = Json(serde_json::json!({ "error": err.identifier(), "details": err.to_string() }));
    (status, body).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error_response(&self)
    }
}

async fn caller_or_response(fs: &Filesystem, uid: u32) -> Result<crate::service::Caller, Response> {
    fs.caller(uid).await.map_err(|e| error_response(&e))
}

#[derive(Deserialize)]
struct LookupQuery {
    name: String,
}

async fn readdir(State(fs): State<Filesystem>, CurrentUser(uid): CurrentUser, Path(ino): Path<u64>) -> Response {
    let caller = match caller_or_response(&fs, uid).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match fs.readdir(ino, &caller).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn lookup(
    State(fs): State<Filesystem>,
    CurrentUser(uid): CurrentUser,
    Path(parent_ino): Path<u64>,
    Query(q): Query<LookupQuery>,
) -> Response {
    let caller = match caller_or_response(&fs, uid).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match fs.lookup(parent_ino, &q.name, &caller).await {
        Ok(entry) => Json(entry).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn mkdir(
    State(fs): State<Filesystem>,
    CurrentUser(uid): CurrentUser,
    Path((parent_ino, name)): Path<(u64, String)>,
) -> Response {
    let caller = match caller_or_response(&fs, uid).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match fs.mkdir(parent_ino, &name, &caller).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn rmdir(
    State(fs): State<Filesystem>,
    CurrentUser(uid): CurrentUser,
    Path((parent_ino, name)): Path<(u64, String)>,
) -> Response {
    let caller = match caller_or_response(&fs, uid).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match fs.rmdir(parent_ino, &name, &caller).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => e.into_response(),
    }
}

async fn create(
    State(fs): State<Filesystem>,
    CurrentUser(uid): CurrentUser,
    Path((parent_ino, name)): Path<(u64, String)>,
) -> Response {
    let caller = match caller_or_response(&fs, uid).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match fs.create(parent_ino, &name, &caller).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn unlink(
    State(fs): State<Filesystem>,
    CurrentUser(uid): CurrentUser,
    Path((parent_ino, name)): Path<(u64, String)>,
) -> Response {
    let caller = match caller_or_response(&fs, uid).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match fs.unlink(parent_ino, &name, &caller).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Deserialize)]
struct RenameBody {
    new_parent_ino: u64,
    new_name: String,
}

async fn rename(
    State(fs): State<Filesystem>,
    CurrentUser(uid): CurrentUser,
    Path((old_parent_ino, old_name)): Path<(u64, String)>,
    Json(body): Json<RenameBody>,
) -> Response {
    let caller = match caller_or_response(&fs, uid).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match fs.rename(old_parent_ino, &old_name, body.new_parent_ino, &body.new_name, &caller).await {
        Ok(entry) => Json(entry).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Deserialize)]
struct ReadQuery {
    offset: u64,
    size: u64,
}

async fn read(
    State(fs): State<Filesystem>,
    CurrentUser(uid): CurrentUser,
    Path(ino): Path<u64>,
    Query(q): Query<ReadQuery>,
) -> Response {
    let caller = match caller_or_response(&fs, uid).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match fs.read(ino, q.offset, q.size, &caller).await {
        Ok(bytes) => bytes.into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Deserialize)]
struct WriteQuery {
    offset: u64,
}

#[derive(Serialize)]
struct WriteResponseBody {
    bytes: u64,
}

async fn write(
    State(fs): State<Filesystem>,
    CurrentUser(uid): CurrentUser,
    Path(ino): Path<u64>,
    Query(q): Query<WriteQuery>,
    body: Bytes,
) -> Response {
    let caller = match caller_or_response(&fs, uid).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match fs.write(ino, q.offset, &body, &caller).await {
        Ok(n) => Json(WriteResponseBody { bytes: n }).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn read_stream(State(fs): State<Filesystem>, CurrentUser(uid): CurrentUser, Path(ino): Path<u64>) -> Response {
    let caller = match caller_or_response(&fs, uid).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match fs.read_stream(ino, &caller).await {
        Ok(stream) => Body::from_stream(stream).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn write_stream(
    State(fs): State<Filesystem>,
    CurrentUser(uid): CurrentUser,
    Path(ino): Path<u64>,
    body: Body,
) -> Response {
    let caller = match caller_or_response(&fs, uid).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    let stream = body.into_data_stream();
    match fs.write_stream(ino, stream, &caller).await {
        Ok(n) => Json(WriteResponseBody { bytes: n }).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn getattr(
    State(fs): State<Filesystem>,
    CurrentUser(uid): CurrentUser,
    Path(ino): Path<u64>,
    headers: HeaderMap,
) -> Response {
    let caller = match caller_or_response(&fs, uid).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    let since = headers
        .get("if-modified-since")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok());
    match fs.getattr(ino, since, &caller).await {
        Ok(Some(entry)) => Json(entry).into_response(),
        Ok(None) => StatusCode::NOT_MODIFIED.into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Deserialize)]
struct SetAttrBody {
    perm: Option<u32>,
    uid: Option<u32>,
    gid: Option<u32>,
    size: Option<u64>,
}

async fn setattr(
    State(fs): State<Filesystem>,
    CurrentUser(uid): CurrentUser,
    Path(ino): Path<u64>,
    Json(body): Json<SetAttrBody>,
) -> Response {
    let caller = match caller_or_response(&fs, uid).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match fs.setattr(ino, body.perm, body.uid, body.gid, body.size, &caller).await {
        Ok(entry) => Json(entry).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Deserialize)]
struct HardlinkBody {
    link_parent_ino: u64,
    link_name: String,
}

async fn hardlink(
    State(fs): State<Filesystem>,
    CurrentUser(uid): CurrentUser,
    Path(target_ino): Path<u64>,
    Json(body): Json<HardlinkBody>,
) -> Response {
    let caller = match caller_or_response(&fs, uid).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match fs.hardlink(target_ino, body.link_parent_ino, &body.link_name, &caller).await {
        Ok(entry) => Json(entry).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Deserialize)]
struct SymlinkBody {
    link_parent_ino: u64,
    link_name: String,
    target_path: String,
}

async fn symlink(State(fs): State<Filesystem>, CurrentUser(uid): CurrentUser, Json(body): Json<SymlinkBody>) -> Response {
    let caller = match caller_or_response(&fs, uid).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match fs.symlink(&body.target_path, body.link_parent_ino, &body.link_name, &caller).await {
        Ok(entry) => Json(entry).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Serialize)]
struct ReadlinkResponseBody {
    target: String,
}

async fn readlink(State(fs): State<Filesystem>, CurrentUser(uid): CurrentUser, Path(ino): Path<u64>) -> Response {
    let caller = match caller_or_response(&fs, uid).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match fs.readlink(ino, &caller).await {
        Ok(target) => Json(ReadlinkResponseBody { target }).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Serialize)]
struct FreeSpaceBody {
    total: u64,
    available: u64,
}

async fn free_space(State(fs): State<Filesystem>) -> Response {
    match fs.backing().free_space().await {
        Ok((total, available)) => Json(FreeSpaceBody { total, available }).into_response(),
        Err(e) => e.into_response(),
    }
}
