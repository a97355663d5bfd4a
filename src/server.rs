//! HTTP server implementation using hyper.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::header::HeaderValue;
use hyper::http::request::Parts;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto;
use tokio::net::TcpListener;
use tokio::sync::{Semaphore, oneshot};
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::config::{Config, SharedConfig};
use crate::db::Handle as DbHandle;
use crate::response::HttpResponse;
use crate::router::{Context, RouteMatch, RouterHandle};
use crate::templates::Templates;

/// Maximum request body size in bytes (1 MB).
const MAX_BODY_SIZE: usize = 1_048_576;

/// Maximum number of concurrent connections.
const MAX_CONNECTIONS: usize = 128;

/// Timeout for reading request headers (slowloris protection).
const HEADER_READ_TIMEOUT: Duration = Duration::from_secs(2);

const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Shared server state.
pub struct State {
    pub config: SharedConfig,
    pub db: Option<DbHandle>,
    pub router: Arc<RouterHandle>,
    pub templates: Arc<Templates>,
}

impl State {
    /// Build server state, compiling the page templates.
    pub fn new(
        config: Config,
        db: Option<DbHandle>,
        router: Arc<RouterHandle>,
    ) -> crate::Result<Self> {
        Ok(Self {
            config: Arc::new(config),
            db,
            router,
            templates: Arc::new(Templates::load()?),
        })
    }
}

/// Handle to a running server instance.
pub struct Server {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<crate::Result<()>>,
}

impl Server {
    /// The address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shut down the accept loop and wait for it to finish.
    pub async fn shutdown(self) -> crate::Result<()> {
        let _ = self.shutdown_tx.send(());
        self.task.await.unwrap_or(Ok(()))
    }
}

/// Add security headers and the request id to a response.
fn add_standard_headers(response: &mut HttpResponse, request_id: &HeaderValue) {
    let headers = response.headers_mut();
    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(REQUEST_ID_HEADER, request_id.clone());
}

fn simple_response(status: StatusCode, message: &'static str) -> HttpResponse {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from_static(message.as_bytes())))
        .unwrap()
}

/// A client-supplied request id is kept only if it is a valid UUID.
fn request_id(parts: &Parts) -> HeaderValue {
    parts
        .headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::try_parse(v).ok())
        .unwrap_or_else(Uuid::new_v4)
        .hyphenated()
        .to_string()
        .parse()
        .unwrap_or_else(|_| HeaderValue::from_static("invalid"))
}

/// Resolve the session to a user. A broken database here is logged and the
/// request continues anonymously; handlers that need the database will fail
/// on their own.
async fn resolve_user(state: &State, parts: &Parts) -> Option<crate::users::User> {
    let db = state.db.as_ref()?;
    let conn = match crate::db::connection(db).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("Failed to open database connection: {e}");
            return None;
        }
    };
    match crate::users::current_user(&conn, &parts.headers, &state.config.auth).await {
        Ok(user) => user,
        Err(e) => {
            error!("Failed to resolve session: {e}");
            None
        }
    }
}

/// Route an already-read request and produce its response.
///
/// This is the whole request pipeline minus the socket: session lookup,
/// routing, handler, error mapping and standard headers.
pub async fn dispatch(
    state: &State,
    parts: Parts,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
) -> HttpResponse {
    let request_id = request_id(&parts);
    let span = tracing::info_span!(
        "request",
        method = %parts.method,
        path = %parts.uri.path(),
        request_id = request_id.to_str().unwrap_or_default(),
    );

    async move {
        let path = parts.uri.path().to_string();
        let mut response = match state.router.match_route(&parts.method, &path) {
            RouteMatch::Matched { handler, params } => {
                let user = resolve_user(state, &parts).await;
                let ctx = Context {
                    method: parts.method,
                    uri: parts.uri,
                    headers: parts.headers,
                    params,
                    body,
                    db: state.db.clone(),
                    config: state.config.clone(),
                    templates: state.templates.clone(),
                    user,
                    remote_addr,
                };

                match handler(ctx).await {
                    Ok(response) => response,
                    Err(e) => e.into_response(),
                }
            }
            RouteMatch::MethodNotAllowed => {
                simple_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
            }
            RouteMatch::NotFound => simple_response(StatusCode::NOT_FOUND, "Not found"),
        };

        tracing::debug!(status = response.status().as_u16(), "Request handled");
        add_standard_headers(&mut response, &request_id);
        response
    }
    .instrument(span)
    .await
}

/// Handle an incoming HTTP request.
async fn handle_request(
    req: Request<Incoming>,
    state: Arc<State>,
    remote_addr: SocketAddr,
) -> Result<HttpResponse, std::convert::Infallible> {
    let (parts, body) = req.into_parts();

    // Reject oversized bodies early via Content-Length header
    if let Some(cl) = parts.headers.get(hyper::header::CONTENT_LENGTH)
        && let Ok(len) = cl.to_str().unwrap_or("0").parse::<usize>()
        && len > MAX_BODY_SIZE
    {
        let mut response = simple_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large");
        add_standard_headers(&mut response, &request_id(&parts));
        return Ok(response);
    }

    // Read body with size limit (fallback for chunked encoding)
    let body_bytes = match BodyExt::collect(Limited::new(body, MAX_BODY_SIZE)).await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => {
            let mut response =
                simple_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large");
            add_standard_headers(&mut response, &request_id(&parts));
            return Ok(response);
        }
    };

    Ok(dispatch(&state, parts, body_bytes, Some(remote_addr)).await)
}

/// Bind, start accepting connections, and return a handle.
///
/// The returned [`Server`] exposes the bound address and a
/// [`shutdown`](Server::shutdown) method for graceful termination.
pub async fn start(state: State) -> crate::Result<Server> {
    let addr: SocketAddr =
        format!("{}:{}", state.config.server.host, state.config.server.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;

    let state = Arc::new(state);

    info!("Server listening on http://{}", addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let semaphore = Arc::new(Semaphore::new(MAX_CONNECTIONS));

    let task = tokio::spawn(async move {
        tokio::pin!(shutdown_rx);

        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, remote_addr) = result?;
                    let io = TokioIo::new(stream);

                    match semaphore.clone().try_acquire_owned() {
                        Ok(permit) => {
                            let state = Arc::clone(&state);
                            tokio::spawn(async move {
                                let service = service_fn(move |req| {
                                    let state = Arc::clone(&state);
                                    handle_request(req, state, remote_addr)
                                });

                                let mut builder = auto::Builder::new(TokioExecutor::new());
                                builder.http1()
                                    .timer(TokioTimer::new())
                                    .header_read_timeout(HEADER_READ_TIMEOUT);

                                if let Err(e) = builder.serve_connection(io, service).await {
                                    error!("Error serving connection from {}: {}", remote_addr, e);
                                }

                                drop(permit);
                            });
                        }
                        Err(_) => {
                            warn!("Connection limit reached, rejecting {}", remote_addr);
                            tokio::spawn(async move {
                                let service = service_fn(|_req: Request<Incoming>| async {
                                    Ok::<_, std::convert::Infallible>(simple_response(
                                        StatusCode::SERVICE_UNAVAILABLE,
                                        "Service unavailable",
                                    ))
                                });

                                let mut builder = auto::Builder::new(TokioExecutor::new());
                                builder.http1()
                                    .timer(TokioTimer::new())
                                    .header_read_timeout(HEADER_READ_TIMEOUT);

                                let _ = builder.serve_connection(io, service).await;
                            });
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    info!("Server shutting down");
                    break;
                }
            }
        }

        Ok(())
    });

    Ok(Server {
        addr,
        shutdown_tx,
        task,
    })
}

/// Run the HTTP server until the accept loop ends.
pub async fn run(state: State) -> crate::Result<()> {
    let server = start(state).await?;
    server.task.await.unwrap_or(Ok(()))
}
