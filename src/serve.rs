//! Purpose: Provide the HTTP/JSON server for carton.
//! Exports: `ServeConfig`, `serve`.
//! Role: Axum-based loopback server exposing the cart-item collection.
//! Invariants: 404 bodies stay plain text (`ID Not Found` for GET by id,
//! `No item found with id: {id}` for PUT/DELETE).
//! Invariants: Unparseable path ids fall through to NotFound, never 400.
//! Invariants: Listing never fails; unparseable numeric filter values
//! match no records.
//! Notes: `pageSize` is a legacy query name; it filters by exact quantity.

use std::future::IntoFuture;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use carton::api::{CartStore, Error, ErrorKind, ItemFilter, NewCartItem};

#[derive(Clone, Debug)]
pub struct ServeConfig {
    pub bind: SocketAddr,
    pub allow_non_loopback: bool,
    pub max_body_bytes: u64,
    pub seed: bool,
}

struct AppState {
    store: Mutex<CartStore>,
}

pub async fn serve(config: ServeConfig) -> Result<(), Error> {
    validate_config(&config)?;

    init_tracing();

    let max_body_bytes: usize = config
        .max_body_bytes
        .try_into()
        .map_err(|_| Error::new(ErrorKind::Usage).with_message("--max-body-bytes is too large"))?;

    let store = if config.seed {
        CartStore::with_sample_items()
    } else {
        CartStore::new()
    };
    let state = Arc::new(AppState {
        store: Mutex::new(store),
    });

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/cart-items", get(list_items).post(create_item))
        .route(
            "/cart-items/:id",
            get(get_item).put(replace_item).delete(delete_item),
        )
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to bind server")
                .with_source(err)
        })?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            result.map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("server failed")
                    .with_source(err)
            })?;
        }
        _ = shutdown_signal() => {
            let _ = shutdown_tx.send(());
            match tokio::time::timeout(Duration::from_secs(10), &mut server).await {
                Ok(result) => result.map_err(|err| {
                    Error::new(ErrorKind::Io)
                        .with_message("server failed")
                        .with_source(err)
                })?,
                Err(_) => {
                    return Err(Error::new(ErrorKind::Io).with_message("server shutdown timed out"));
                }
            }
        }
    };
    Ok(())
}

fn is_loopback(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(addr) => addr.is_loopback(),
        IpAddr::V6(addr) => addr.is_loopback(),
    }
}

fn validate_config(config: &ServeConfig) -> Result<(), Error> {
    if !is_loopback(config.bind.ip()) && !config.allow_non_loopback {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("non-loopback bind requires explicit opt-in")
            .with_hint("Re-run with --allow-non-loopback or use a loopback address."));
    }

    if config.max_body_bytes == 0 {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("--max-body-bytes must be greater than zero")
            .with_hint("Use a positive value like 1048576."));
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        let mut signal = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler");
        signal.recv().await;
    };
    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    #[cfg(not(unix))]
    ctrl_c.await;
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(rename = "maxPrice")]
    max_price: Option<String>,
    prefix: Option<String>,
    #[serde(rename = "pageSize")]
    page_size: Option<String>,
}

async fn healthz() -> Response {
    Json(json!({ "ok": true })).into_response()
}

async fn list_items(State(state): State<Arc<AppState>>, Query(query): Query<ListQuery>) -> Response {
    let items = match filter_from_query(&query) {
        Some(filter) => lock_store(&state).list(&filter),
        None => Vec::new(),
    };
    Json(items).into_response()
}

async fn get_item(State(state): State<Arc<AppState>>, AxumPath(id): AxumPath<String>) -> Response {
    let result = parse_item_id(&id).and_then(|id| lock_store(&state).get(id));
    match result {
        Ok(item) => Json(item).into_response(),
        // Legacy wire contract: GET by id reports a fixed text body.
        Err(err) if err.kind() == ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "ID Not Found").into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn create_item(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewCartItem>, JsonRejection>,
) -> Response {
    let body = match read_body(payload) {
        Ok(body) => body,
        Err(err) => return error_response(err),
    };
    let item = lock_store(&state).create(body);
    (StatusCode::CREATED, Json(item)).into_response()
}

async fn replace_item(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<String>,
    payload: Result<Json<NewCartItem>, JsonRejection>,
) -> Response {
    let body = match read_body(payload) {
        Ok(body) => body,
        Err(err) => return error_response(err),
    };
    let result = parse_item_id(&id).and_then(|id| lock_store(&state).replace(id, body));
    match result {
        Ok(item) => Json(item).into_response(),
        Err(err) => error_response(err),
    }
}

async fn delete_item(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<String>,
) -> Response {
    let result = parse_item_id(&id).and_then(|id| lock_store(&state).remove(id));
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

fn lock_store(state: &AppState) -> MutexGuard<'_, CartStore> {
    state
        .store
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

/// Path ids that do not parse as integers match no record (NotFound),
/// matching the original service's contract.
fn parse_item_id(raw: &str) -> Result<u64, Error> {
    raw.trim().parse::<u64>().map_err(|_| {
        Error::new(ErrorKind::NotFound).with_message(format!("No item found with id: {raw}"))
    })
}

/// `None` means a numeric filter value did not parse: the listing still
/// succeeds but matches no records.
fn filter_from_query(query: &ListQuery) -> Option<ItemFilter> {
    let mut filter = ItemFilter::default();
    if let Some(raw) = non_empty(query.max_price.as_deref()) {
        let max_price = raw.parse::<f64>().ok().filter(|value| value.is_finite())?;
        filter.max_price = Some(max_price);
    }
    filter.prefix = non_empty(query.prefix.as_deref()).map(str::to_string);
    if let Some(raw) = non_empty(query.page_size.as_deref()) {
        filter.quantity = Some(raw.parse::<i64>().ok()?);
    }
    Some(filter)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn read_body(payload: Result<Json<NewCartItem>, JsonRejection>) -> Result<NewCartItem, Error> {
    let Json(body) = payload.map_err(|rejection| {
        Error::new(ErrorKind::Usage)
            .with_message(rejection.body_text())
            .with_hint("Send a JSON object with product, price, and quantity.")
    })?;
    body.validate()?;
    Ok(body)
}

fn error_response(err: Error) -> Response {
    let status = match err.kind() {
        ErrorKind::Usage => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Internal | ErrorKind::Io => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = err.message().unwrap_or("error").to_string();
    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::{ListQuery, ServeConfig, filter_from_query, parse_item_id, validate_config};
    use carton::api::ErrorKind;

    fn config(bind: &str) -> ServeConfig {
        ServeConfig {
            bind: bind.parse().expect("bind"),
            allow_non_loopback: false,
            max_body_bytes: 1024 * 1024,
            seed: true,
        }
    }

    #[test]
    fn non_loopback_requires_allow_flag() {
        let err = validate_config(&config("0.0.0.0:0")).expect_err("expected usage error");
        assert_eq!(err.kind(), ErrorKind::Usage);

        let mut allowed = config("0.0.0.0:0");
        allowed.allow_non_loopback = true;
        validate_config(&allowed).expect("config ok");
    }

    #[test]
    fn body_limit_requires_positive_value() {
        let mut zero = config("127.0.0.1:0");
        zero.max_body_bytes = 0;
        let err = validate_config(&zero).expect_err("expected usage error");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn item_ids_parse_or_fall_through_to_not_found() {
        assert_eq!(parse_item_id("3").expect("numeric id"), 3);
        let err = parse_item_id("abc").expect_err("non-numeric id");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), Some("No item found with id: abc"));
    }

    #[test]
    fn query_values_parse_into_filters() {
        let query = ListQuery {
            max_price: Some("5".to_string()),
            prefix: Some("hair".to_string()),
            page_size: Some("20".to_string()),
        };
        let filter = filter_from_query(&query).expect("valid query");
        assert_eq!(filter.max_price, Some(5.0));
        assert_eq!(filter.prefix.as_deref(), Some("hair"));
        assert_eq!(filter.quantity, Some(20));
    }

    #[test]
    fn empty_query_values_are_ignored() {
        let query = ListQuery {
            max_price: Some(String::new()),
            prefix: Some("  ".to_string()),
            page_size: None,
        };
        let filter = filter_from_query(&query).expect("valid query");
        assert_eq!(filter.max_price, None);
        assert_eq!(filter.prefix, None);
        assert_eq!(filter.quantity, None);
    }

    #[test]
    fn malformed_query_values_match_nothing() {
        for (max_price, page_size) in [
            (Some("cheap"), None),
            (Some("NaN"), None),
            (None, Some("many")),
        ] {
            let query = ListQuery {
                max_price: max_price.map(str::to_string),
                prefix: None,
                page_size: page_size.map(str::to_string),
            };
            assert!(
                filter_from_query(&query).is_none(),
                "{max_price:?}/{page_size:?} should match no records"
            );
        }
    }
}
