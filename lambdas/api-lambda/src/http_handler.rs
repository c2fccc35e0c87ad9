use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use profile_auth_shared::{auth, error::ApiError, profile, AppState};
use serde::Serialize;
use std::sync::Arc;

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "POST, PUT, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type";

/// Main Lambda handler - routes requests to signup, login or profile endpoints
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body: &[u8] = event.body().as_ref();
    tracing::info!("Profile auth invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if *method == Method::OPTIONS {
        return Ok(cors(Response::builder().status(StatusCode::NO_CONTENT))
            .body(Body::Empty)
            .map_err(Box::new)?);
    }

    // Exact match; the stage is stripped by lambda_http
    // (AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH=true on REST APIs)
    let route = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    match (method, route) {
        (&Method::POST, "/signup") => respond(auth::signup(&state, body).await),
        (&Method::POST, "/login") => respond(auth::login(&state, body).await),
        (&Method::PUT, "/updateProfileImage") => {
            respond(profile::update_profile_image(&state, body).await)
        }
        (&Method::POST, _) | (&Method::PUT, _) => {
            tracing::warn!("No route matched - Method: {} Path: {}", method, path);
            json_response(
                StatusCode::NOT_FOUND,
                &serde_json::json!({"message": "Not Found"}),
            )
        }
        _ => json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &serde_json::json!({"message": "Method Not Allowed"}),
        ),
    }
}

fn respond<T: Serialize>(result: Result<T, ApiError>) -> Result<Response<Body>, Error> {
    match result {
        Ok(payload) => json_response(StatusCode::OK, &payload),
        Err(err) => {
            let status = err.status_code();
            if status.is_server_error() {
                tracing::error!("Request failed: {:?}", err);
            } else {
                tracing::info!("Request rejected ({}): {}", status, err);
            }
            json_response(status, &err.body())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, payload: &T) -> Result<Response<Body>, Error> {
    Ok(cors(Response::builder().status(status))
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(payload)?.into())
        .map_err(Box::new)?)
}

fn cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", ALLOW_ORIGIN)
        .header("Access-Control-Allow-Methods", ALLOW_METHODS)
        .header("Access-Control-Allow-Headers", ALLOW_HEADERS)
}
