use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header::USER_AGENT, Request, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use tower::ServiceExt;

use server_timing::{ManualClock, MetricMap, ServerTiming, ServerTimingConfig, Timeline};

const CHROME_62: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/62.0.3202.94 Safari/537.36";

fn config(clock: &ManualClock) -> ServerTimingConfig {
    ServerTimingConfig::default().with_clock(Arc::new(clock.clone()))
}

fn timed_route(clock: &ManualClock) -> Router {
    let clock = clock.clone();
    Router::new().route(
        "/",
        get(move |timing: ServerTiming| {
            let clock = clock.clone();
            async move {
                timing.lock().from("db", Some("query")).unwrap();
                clock.advance(Duration::from_millis(40));
                timing.lock().to("db", None).unwrap();
                timing.lock().add("cache", "hit", 2.0).unwrap();
                "ok"
            }
        }),
    )
}

async fn send(app: Router, user_agent: Option<&str>) -> Response {
    let mut req = Request::builder().uri("/");
    if let Some(ua) = user_agent {
        req = req.header(USER_AGENT, ua);
    }
    app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
}

fn server_timing(res: &Response) -> Vec<String> {
    res.headers()
        .get_all("server-timing")
        .iter()
        .map(|v| v.to_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn writes_one_value_per_metric() {
    let clock = ManualClock::new();
    let app = config(&clock).attach(timed_route(&clock));

    let res = send(app, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        server_timing(&res),
        ["db;desc=\"query\";dur=40", "cache;desc=\"hit\";dur=2"]
    );
}

#[tokio::test]
async fn old_chrome_gets_legacy_syntax() {
    let clock = ManualClock::new();
    let app = config(&clock).attach(timed_route(&clock));

    let res = send(app, Some(CHROME_62)).await;
    assert_eq!(server_timing(&res), ["db=40; \"query\"", "cache=2; \"hit\""]);
}

#[tokio::test]
async fn disabled_headers_still_provide_a_session() {
    let clock = ManualClock::new();
    let mut config = config(&clock);
    config.send_headers = false;
    let app = config.attach(timed_route(&clock));

    let res = send(app, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(server_timing(&res).is_empty());
}

#[tokio::test]
async fn keeps_upstream_values_first() {
    let clock = ManualClock::new();
    let routes = Router::new().route(
        "/",
        get(|timing: ServerTiming| async move {
            timing.lock().add("app", "handler", 7.0).unwrap();
            ([("server-timing", "edge;dur=1")], "ok")
        }),
    );
    let app = config(&clock).attach(routes);

    let res = send(app, None).await;
    assert_eq!(server_timing(&res), ["edge;dur=1", "app;desc=\"handler\";dur=7"]);
}

#[tokio::test]
async fn untouched_session_writes_nothing() {
    let clock = ManualClock::new();
    let routes = Router::new().route("/", get(|| async { "ok" }));
    let app = config(&clock).attach(routes);

    let res = send(app, None).await;
    assert!(res.headers().get("server-timing").is_none());
}

#[tokio::test]
async fn hooks_run_before_the_header_is_written() {
    let clock = ManualClock::new();
    let handler_clock = clock.clone();
    let routes = Router::new().route(
        "/",
        get(move |timing: ServerTiming| {
            let clock = handler_clock.clone();
            async move {
                {
                    let mut session = timing.lock();
                    session.from("render", None).unwrap();
                    session.from("data", None).unwrap();
                }
                clock.advance(Duration::from_millis(550));
                timing.lock().to("data", None).unwrap();
                clock.advance(Duration::from_millis(50));

                let mut session = timing.lock();
                session.to("render", None).unwrap();
                session.add_hook(
                    "render-only",
                    |mut m: MetricMap, timeline: &Timeline| {
                        let own = match (m.get("render"), m.get("data")) {
                            (Some(r), Some(d)) => Some(
                                (timeline.calculate_duration_smart(r)
                                    - timeline.calculate_duration_smart(d))
                                .abs(),
                            ),
                            _ => None,
                        };
                        if let (Some(own), Some(render)) = (own, m.get_mut("render")) {
                            render.duration = Some(own);
                        }
                        m
                    },
                    None,
                );
                "ok"
            }
        }),
    );
    let app = config(&clock).attach(routes);

    let res = send(app, None).await;
    assert_eq!(server_timing(&res), ["render;dur=50", "data;dur=550"]);
}

#[tokio::test]
async fn invalid_name_surfaces_as_server_error() {
    let clock = ManualClock::new();
    let routes = Router::new().route(
        "/",
        get(|timing: ServerTiming| async move {
            timing.lock().add("ok", "recorded", 1.0)?;
            timing.lock().from("not a token", None)?;
            Ok::<_, server_timing::ServerTimingError>("unreachable")
        }),
    );
    let app = config(&clock).attach(routes);

    let res = send(app, None).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(server_timing(&res), ["ok;desc=\"recorded\";dur=1"]);
}

#[tokio::test]
async fn extractor_rejects_without_middleware() {
    let routes = Router::new().route("/", get(|_timing: ServerTiming| async { "ok" }));

    let res = send(routes, None).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
