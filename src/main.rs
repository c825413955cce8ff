//! HTTP server for one darknode epoch.
//!
//! Config from env: `PORT` (default 8080) plus the epoch variables read by
//! [`EpochConfig::from_env`].

use std::sync::Arc;

use darkpool_compute::{api, Epoch, EpochConfig};
use log::{error, info};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    let _ = env_logger::try_init();
    let epoch = match EpochConfig::from_env().and_then(Epoch::new) {
        Ok(epoch) => epoch,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let app = api::create_router(Arc::new(epoch));

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await.expect("bind");
    info!("listening on http://{}", addr);
    axum::serve(listener, app.into_make_service())
        .await
        .expect("serve");
}
