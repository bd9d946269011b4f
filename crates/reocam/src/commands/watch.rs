//! `reocam watch`: run pollers and stream their output until interrupted.

use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use reocam_core::{Device, DeviceConfig, FeatureKind, FeatureStatus, NodeHandle, OutputEvent};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

const DEFAULT_FEATURES: [FeatureKind; 2] = [FeatureKind::Motion, FeatureKind::AiDetection];

enum Update {
    Event(FeatureKind, OutputEvent),
    Status(FeatureKind, FeatureStatus),
}

/// Relay one node's events (and optionally status changes) to the printer.
async fn forward(node: NodeHandle, tx: mpsc::Sender<Update>, with_status: bool) {
    let kind = node.kind();
    let mut events = node.subscribe();
    let mut status = node.status();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if tx.send(Update::Event(kind, event)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(feature = %kind, skipped, "output lagged, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
            changed = status.changed(), if with_status => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                if tx.send(Update::Status(kind, current)).await.is_err() {
                    break;
                }
            }
        }
    }
}

pub async fn handle(
    args: WatchArgs,
    mut config: DeviceConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let features = if args.features.is_empty() {
        DEFAULT_FEATURES.to_vec()
    } else {
        args.features
    };
    if let Some(ms) = args.interval {
        if ms == 0 {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be greater than zero".into(),
            });
        }
        for kind in &features {
            config.poll_intervals.insert(*kind, Duration::from_millis(ms));
        }
    }

    let color = output::should_color(global.color);
    let device = Device::new(config)?;
    device.start().await;

    let (tx, mut rx) = mpsc::channel(64);
    let mut forwarders = Vec::with_capacity(features.len());
    for kind in features {
        let node = device.attach(kind).await;
        forwarders.push(tokio::spawn(forward(node, tx.clone(), args.status)));
    }
    drop(tx);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut seen = 0_usize;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                debug!("interrupted");
                break;
            }
            update = rx.recv() => {
                let Some(update) = update else { break };
                match update {
                    Update::Event(kind, event) => {
                        let line = output::render_event(global.output, kind, &event, color);
                        output::print_output(&line, global.quiet);
                        seen += 1;
                        if args.count.is_some_and(|n| seen >= n) {
                            break;
                        }
                    }
                    Update::Status(kind, status) => {
                        let line = output::render_status(global.output, kind, &status, color);
                        output::print_status(&line, global.quiet);
                    }
                }
            }
        }
    }

    device.stop().await;
    for handle in forwarders {
        handle.abort();
    }
    Ok(())
}
