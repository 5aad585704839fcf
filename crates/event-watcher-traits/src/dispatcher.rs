// Copyright 2022 Webb Technologies Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// A trait that defines a handler for a single kind of event.
///
/// The handlers are implemented separately from the watchers, so that one watcher
/// can feed a handler that runs many events in parallel.
#[async_trait::async_trait]
pub trait EventHandler: Send + Sync {
    /// The type of event this handler is for.
    type Event: Send + 'static;

    /// a method to be called with the event information,
    /// it is up to the handler to decide what to do with the event.
    ///
    /// An error ends the processing of this event only, it is logged by [`dispatch_events`].
    async fn handle_event(
        &self,
        event: Self::Event,
    ) -> fusion_relayer_utils::Result<()>;
}

/// Receives events from `source` and runs `handler` on each of them in its own task.
///
/// Events are spawned in the order they are received, without waiting for the previous
/// ones to finish. Returns once `source` is closed and every spawned task completed.
#[tracing::instrument(skip_all)]
pub async fn dispatch_events<H>(
    handler: Arc<H>,
    mut source: mpsc::Receiver<H::Event>,
) where
    H: EventHandler + 'static,
{
    let mut in_flight = JoinSet::new();
    loop {
        tokio::select! {
            maybe_event = source.recv() => match maybe_event {
                Some(event) => {
                    let handler = handler.clone();
                    in_flight.spawn(async move { handler.handle_event(event).await });
                }
                None => break,
            },
            Some(done) = in_flight.join_next(), if !in_flight.is_empty() => {
                log_task_result(done);
            }
        }
    }
    tracing::debug!(
        "Event source closed, waiting for {} in-flight events",
        in_flight.len()
    );
    while let Some(done) = in_flight.join_next().await {
        log_task_result(done);
    }
}

fn log_task_result(
    done: Result<fusion_relayer_utils::Result<()>, tokio::task::JoinError>,
) {
    match done {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::error!(%e, "Error while handling the event");
        }
        Err(e) => {
            tracing::error!(%e, "Event handler task failed");
        }
    }
}
