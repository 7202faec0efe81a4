// Panic recovery. Sits outside the auth layers so a panic anywhere downstream
// (including during auth) still becomes a kinded response instead of a dropped
// connection.
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;

use crate::error::AppError;
use crate::middleware::request_id::current_request_id;

pub async fn recover_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let detail = panic_message(panic.as_ref());
            tracing::error!(
                request_id = %current_request_id().unwrap_or_default(),
                method = %method,
                path = %path,
                panic = %detail,
                backtrace = %std::backtrace::Backtrace::force_capture(),
                "handler panicked"
            );
            AppError::internal("internal server error")
                .with_field("panic", detail)
                .into_response()
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
