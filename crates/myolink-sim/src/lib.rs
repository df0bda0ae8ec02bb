//! HTTP muscle-sensor simulator.
//!
//! Serves the same two endpoints as the sensor firmware so the client can be
//! exercised without hardware:
//!
//! - `GET /data` → `{"muscle": n}`
//! - `GET /random` → `{"random": n}`
//!
//! Each endpoint replays a script of [`Reply`] values first. Once the script
//! is exhausted it falls back to generated values or a fixed error,
//! depending on [`Fallback`].

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use rand::Rng;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Upper bound of generated muscle values (12-bit ADC).
pub const ADC_MAX: u32 = 4095;

/// One scripted answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// 200 with the endpoint's field set to this value.
    Value(f64),
    /// Empty response with this status code.
    Status(u16),
    /// 200 with a body that is not JSON.
    Malformed,
    /// 200 with a JSON object lacking the endpoint's field.
    MissingField,
}

/// What an endpoint answers once its script runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fallback {
    /// Generated values: muscle in `0..=ADC_MAX`, random as a `u32`.
    #[default]
    Generate,
    /// Always answer with this status code.
    Status(u16),
}

/// Scripts for both endpoints.
#[derive(Debug, Clone, Default)]
pub struct DeviceScript {
    pub data: Vec<Reply>,
    pub random: Vec<Reply>,
    pub fallback: Fallback,
}

impl DeviceScript {
    pub fn data(mut self, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.data.extend(replies);
        self
    }

    pub fn random(mut self, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.random.extend(replies);
        self
    }

    pub fn fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }
}

/// Request counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Hits {
    pub data: u64,
    pub random: u64,
}

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Data,
    Random,
}

impl Endpoint {
    fn field(self) -> &'static str {
        match self {
            Self::Data => "muscle",
            Self::Random => "random",
        }
    }
}

/// Shared simulator state.
struct SimState {
    data: Mutex<VecDeque<Reply>>,
    random: Mutex<VecDeque<Reply>>,
    fallback: Fallback,
    hits: Mutex<Hits>,
}

impl SimState {
    fn new(script: DeviceScript) -> Self {
        Self {
            data: Mutex::new(script.data.into()),
            random: Mutex::new(script.random.into()),
            fallback: script.fallback,
            hits: Mutex::new(Hits::default()),
        }
    }

    fn next_reply(&self, endpoint: Endpoint) -> Reply {
        let queue = match endpoint {
            Endpoint::Data => &self.data,
            Endpoint::Random => &self.random,
        };
        {
            let mut hits = lock(&self.hits);
            match endpoint {
                Endpoint::Data => hits.data += 1,
                Endpoint::Random => hits.random += 1,
            }
        }
        if let Some(reply) = lock(queue).pop_front() {
            return reply;
        }
        match self.fallback {
            Fallback::Status(code) => Reply::Status(code),
            Fallback::Generate => {
                let mut rng = rand::rng();
                let value = match endpoint {
                    Endpoint::Data => rng.random_range(0..=ADC_MAX) as f64,
                    Endpoint::Random => rng.random::<u32>() as f64,
                };
                Reply::Value(value)
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn respond(endpoint: Endpoint, reply: Reply) -> Response {
    match reply {
        Reply::Value(v) => {
            let mut body = serde_json::Map::new();
            body.insert(endpoint.field().to_string(), json_number(v));
            Json(serde_json::Value::Object(body)).into_response()
        }
        Reply::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        Reply::Malformed => (StatusCode::OK, "<html>sensor busy</html>").into_response(),
        Reply::MissingField => {
            Json(serde_json::json!({ "status": "warming up" })).into_response()
        }
    }
}

/// Integral values serialize without a fractional part, like the firmware's.
fn json_number(v: f64) -> serde_json::Value {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        serde_json::Value::from(v as i64)
    } else {
        serde_json::Value::from(v)
    }
}

async fn handle_data(State(state): State<Arc<SimState>>) -> Response {
    respond(Endpoint::Data, state.next_reply(Endpoint::Data))
}

async fn handle_random(State(state): State<Arc<SimState>>) -> Response {
    respond(Endpoint::Random, state.next_reply(Endpoint::Random))
}

async fn handle_index(State(state): State<Arc<SimState>>) -> Json<serde_json::Value> {
    let hits = *lock(&state.hits);
    Json(serde_json::json!({
        "name": "myolink sensor simulator",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/data": "Latest muscle reading: {\"muscle\": n}",
            "/random": "One random value: {\"random\": n}",
        },
        "hits": hits,
    }))
}

/// Build the axum router.
fn build_router(state: Arc<SimState>) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/data", get(handle_data))
        .route("/random", get(handle_random))
        .with_state(state)
}

/// A simulator running in the background on a local port.
pub struct Simulator {
    addr: SocketAddr,
    state: Arc<SimState>,
    task: JoinHandle<()>,
}

impl Simulator {
    /// Bind `127.0.0.1` on an ephemeral port and serve `script`.
    pub async fn spawn(script: DeviceScript) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(SimState::new(script));
        let app = build_router(Arc::clone(&state));
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("simulator stopped: {e}");
            }
        });
        Ok(Self { addr, state, task })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL to put in the client config, e.g. `http://127.0.0.1:49152`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> Hits {
        *lock(&self.state.hits)
    }

    /// Append replies to the `/data` script.
    pub fn push_data(&self, replies: impl IntoIterator<Item = Reply>) {
        lock(&self.state.data).extend(replies);
    }

    /// Append replies to the `/random` script.
    pub fn push_random(&self, replies: impl IntoIterator<Item = Reply>) {
        lock(&self.state.random).extend(replies);
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Run the simulator in the foreground until the process is stopped.
pub async fn run_server(host: &str, port: u16, script: DeviceScript) -> std::io::Result<()> {
    let app = build_router(Arc::new(SimState::new(script)));
    let listener = TcpListener::bind((host, port)).await?;
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn get(sim: &Simulator, path: &str) -> (u16, String) {
        let resp = reqwest::get(format!("{}{}", sim.base_url(), path))
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.text().await.unwrap())
    }

    #[test]
    fn json_number_keeps_integers_integral() {
        assert_eq!(json_number(500.0).to_string(), "500");
        assert_eq!(json_number(0.25).to_string(), "0.25");
        assert_eq!(json_number(-3.0).to_string(), "-3");
    }

    #[test]
    fn script_builder_accumulates() {
        let script = DeviceScript::default()
            .data([Reply::Value(1.0)])
            .data([Reply::Status(500)])
            .random([Reply::Malformed])
            .fallback(Fallback::Status(503));
        assert_eq!(script.data.len(), 2);
        assert_eq!(script.random, vec![Reply::Malformed]);
        assert_eq!(script.fallback, Fallback::Status(503));
    }

    #[test]
    fn generated_values_in_range() {
        let state = SimState::new(DeviceScript::default());
        for _ in 0..100 {
            match state.next_reply(Endpoint::Data) {
                Reply::Value(v) => assert!((0.0..=ADC_MAX as f64).contains(&v)),
                other => panic!("unexpected reply {other:?}"),
            }
        }
        assert_eq!(lock(&state.hits).data, 100);
    }

    #[tokio::test]
    async fn scripted_replies_then_fallback() {
        let script = DeviceScript::default()
            .data([Reply::Value(500.0), Reply::Status(500)])
            .random([Reply::Value(11.0), Reply::Malformed, Reply::MissingField])
            .fallback(Fallback::Status(503));
        let sim = Simulator::spawn(script).await.unwrap();

        assert_eq!(get(&sim, "/data").await, (200, r#"{"muscle":500}"#.to_string()));
        assert_eq!(get(&sim, "/data").await.0, 500);
        assert_eq!(get(&sim, "/data").await.0, 503);

        assert_eq!(get(&sim, "/random").await, (200, r#"{"random":11}"#.to_string()));
        let (status, body) = get(&sim, "/random").await;
        assert_eq!(status, 200);
        assert!(serde_json::from_str::<serde_json::Value>(&body).is_err());
        let (_, body) = get(&sim, "/random").await;
        assert!(!body.contains("random"));

        assert_eq!(sim.hits(), Hits { data: 3, random: 3 });
    }

    #[tokio::test]
    async fn push_extends_script() {
        let sim = Simulator::spawn(DeviceScript::default().fallback(Fallback::Status(404)))
            .await
            .unwrap();
        assert_eq!(get(&sim, "/random").await.0, 404);
        sim.push_random([Reply::Value(42.0)]);
        assert_eq!(get(&sim, "/random").await.1, r#"{"random":42}"#);
    }

    #[tokio::test]
    async fn push_data_on_loopback() {
        let sim = Simulator::spawn(DeviceScript::default().fallback(Fallback::Status(503)))
            .await
            .unwrap();
        assert!(sim.addr().ip().is_loopback());
        assert!(sim.base_url().ends_with(&sim.addr().port().to_string()));

        sim.push_data([Reply::Value(1234.0), Reply::MissingField]);
        assert_eq!(get(&sim, "/data").await.1, r#"{"muscle":1234}"#);
        assert!(!get(&sim, "/data").await.1.contains("muscle"));
        assert_eq!(get(&sim, "/data").await.0, 503);
    }

    #[tokio::test]
    async fn index_lists_endpoints() {
        let sim = Simulator::spawn(DeviceScript::default()).await.unwrap();
        let (status, body) = get(&sim, "/").await;
        assert_eq!(status, 200);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["endpoints"]["/data"].is_string());
        assert!(json["endpoints"]["/random"].is_string());
    }
}
