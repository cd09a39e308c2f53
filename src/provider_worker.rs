use crate::logger;
use crate::models::{ProviderRequest, ProviderResponse};
use crate::provider::{load_batch, ProviderError};
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

/// Runs provider traffic off the UI thread. Requests arrive over `req_rx`,
/// batches go back over `resp_tx` tagged with the epoch they were issued
/// under; the main loop decides whether a batch is still current.
pub fn spawn_provider_worker(
    resp_tx: Sender<ProviderResponse>,
    req_rx: Receiver<ProviderRequest>,
) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("grammar-hero::provider_worker".to_string())
        .spawn(move || loop {
            match req_rx.recv() {
                Ok(ProviderRequest::Fetch {
                    epoch,
                    config,
                    count,
                    kind,
                }) => {
                    logger::log(&format!(
                        "worker received {:?} fetch for {} (epoch {}, count {})",
                        kind,
                        config.topic.title(),
                        epoch,
                        count
                    ));

                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            let _ = resp_tx.send(ProviderResponse::Batch {
                                epoch,
                                kind,
                                result: Err(ProviderError::Request(format!(
                                    "failed to start runtime: {}",
                                    e
                                ))),
                            });
                            continue;
                        }
                    };

                    let result = rt.block_on(load_batch(&config, count));

                    match &result {
                        Ok(batch) => {
                            logger::log(&format!("worker sending {} questions", batch.len()))
                        }
                        Err(e) => logger::log(&format!("worker fetch failed: {}", e)),
                    }

                    let _ = resp_tx.send(ProviderResponse::Batch {
                        epoch,
                        kind,
                        result,
                    });
                }
                Err(_) => {
                    // Channel disconnected, exit worker
                    logger::log("worker channel disconnected, exiting");
                    break;
                }
            }
        })
        .expect("Failed to spawn provider worker thread")
}
