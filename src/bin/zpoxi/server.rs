//! HTTP scrape endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use log::{error, info};
use tokio::net::TcpListener;

use zpoxi::Exporter;
use zpoxi::zpool::Zpool;

pub struct Config {
    pub address: SocketAddr,
    pub endpoint: String,
    pub exit_on_error: bool,
}

struct Shared<Z> {
    exporter: Exporter<Z>,
    exit_on_error: bool,
}

pub async fn serve<Z>(exporter: Exporter<Z>, config: Config) -> Result<()>
where
    Z: Zpool + Send + Sync + 'static,
{
    let shared = Arc::new(Shared {
        exporter,
        exit_on_error: config.exit_on_error,
    });

    let router = Router::new()
        .route(&config.endpoint, get(metrics::<Z>))
        .with_state(shared);

    let listener = TcpListener::bind(config.address)
        .await
        .with_context(|| format!("binding to {}", config.address))?;

    info!(
        "starting zpool metrics exporter on http://{}{}",
        config.address, config.endpoint
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown())
        .await
        .context("serving metrics")
}

async fn metrics<Z>(State(shared): State<Arc<Shared<Z>>>) -> Response
where
    Z: Zpool + Send + Sync + 'static,
{
    let exit_on_error = shared.exit_on_error;

    let result = tokio::task::spawn_blocking(move || {
        let mut output = Vec::with_capacity(2048);
        shared.exporter.scrape(&mut output).map(|()| output)
    })
    .await;

    match result {
        Ok(Ok(body)) => {
            ([(header::CONTENT_TYPE, zpoxi::prom::CONTENT_TYPE)], body)
                .into_response()
        }

        Ok(Err(error)) => {
            let error = anyhow::Error::new(error);
            error!("collecting metrics: {error:#}");

            if exit_on_error {
                std::process::exit(1);
            }

            (StatusCode::SERVICE_UNAVAILABLE, format!("{error:#}\n"))
                .into_response()
        }

        Err(error) => {
            error!("collection task failed: {error}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!("listening for shutdown signal: {error}");
        std::future::pending::<()>().await;
    }

    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use axum::body::to_bytes;

    use super::*;

    /// A healthy pool whose capacity report breaks on demand.
    #[derive(Debug, Default)]
    struct Tank {
        broken: Arc<AtomicBool>,
    }

    impl Zpool for Tank {
        fn run(&self, args: &[&str]) -> zpoxi::Result<String> {
            let broken = self.broken.load(Ordering::SeqCst);

            let report = match args {
                ["list", "tank"] => "NAME SIZE\ntank 150G\n",
                ["status", "tank"] => {
                    "  pool: tank\n state: ONLINE\n\ttank ONLINE 0 0 0\n\
                     \t  sda ONLINE 0 0 0\n"
                }
                ["list", "-H", "-o", "health", "tank"] => "ONLINE\n",
                ["list", "-H", "-o", "cap", "tank"] if broken => "garbage\n",
                ["list", "-H", "-o", "cap", "tank"] => "42%\n",
                ["iostat", "tank", "1", "2"] => "tank 1G 1G 3 4 5K 6K\n",
                _ => "",
            };

            Ok(report.into())
        }
    }

    fn shared() -> (Arc<Shared<Tank>>, Arc<AtomicBool>) {
        let tank = Tank::default();
        let broken = Arc::clone(&tank.broken);

        let collector = zpoxi::Collector::new(tank, "tank");

        let shared = Arc::new(Shared {
            exporter: Exporter::new(collector).unwrap(),
            exit_on_error: false,
        });

        (shared, broken)
    }

    async fn body(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn scrape() {
        let (shared, _broken) = shared();

        let response = metrics(State(shared)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            zpoxi::prom::CONTENT_TYPE
        );

        let body = body(response).await;
        assert!(body.contains("zpool_capacity_percentage{pool=\"tank\"} 42"));
        assert!(body.contains("zpool_bandwidth_write{pool=\"tank\"} 6000"));
    }

    #[tokio::test]
    async fn failed_scrape() {
        let (shared, broken) = shared();
        broken.store(true, Ordering::SeqCst);

        let response = metrics(State(Arc::clone(&shared))).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body(response).await;
        assert!(body.starts_with("parsing capacity report: "), "{body}");
        assert!(!body.contains("zpool_capacity_percentage"));

        assert_eq!(shared.exporter.snapshot().capacity_percent(), 42);
    }
}
