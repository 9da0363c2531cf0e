// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Single-task event loop around the session controller.
//!
//! One tokio task owns the controller and handles commands strictly one at
//! a time, so session state needs no locking. Geocoding lookups run as
//! separate tasks and report back into the same queue as ordinary commands.

use crate::db::KeyValueStore;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, Submission, ViewState, Workout, WorkoutId};
use crate::services::geocoding::{GeocodeError, Geocoder};
use crate::services::render::ViewRenderer;
use crate::services::session::{GeolocationError, SessionController, SessionId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Queue depth for pending commands.
const COMMAND_BUFFER: usize = 64;

/// Key that closes the open form.
pub const CANCEL_KEY: &str = "Escape";

type Reply<T> = oneshot::Sender<Result<T>>;

/// Inbound events for the controller.
enum Command {
    Position(std::result::Result<Coordinates, GeolocationError>, Reply<()>),
    MapClick(Coordinates, Reply<SessionId>),
    LocationResolved(SessionId, std::result::Result<String, GeocodeError>),
    Submit(Submission, Reply<Workout>),
    Cancel(Reply<bool>),
    Reset(Reply<usize>),
    Focus(WorkoutId, Reply<Coordinates>),
    Workouts(Reply<Vec<Workout>>),
    View(Reply<ViewState>),
}

/// Cloneable handle for sending events to the controller loop.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
}

/// Start the loop on the current tokio runtime.
pub fn spawn<S, G>(
    controller: SessionController<S, ViewRenderer>,
    geocoder: G,
) -> (SessionHandle, JoinHandle<()>)
where
    S: KeyValueStore,
    G: Geocoder,
{
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let lookups = tx.downgrade();
    let join = tokio::spawn(run(controller, Arc::new(geocoder), lookups, rx));
    let handle = SessionHandle { tx };
    (handle, join)
}

async fn run<S, G>(
    mut controller: SessionController<S, ViewRenderer>,
    geocoder: Arc<G>,
    lookups: mpsc::WeakSender<Command>,
    mut rx: mpsc::Receiver<Command>,
) where
    S: KeyValueStore,
    G: Geocoder,
{
    tracing::info!("Session loop started");

    while let Some(command) = rx.recv().await {
        match command {
            Command::Position(result, reply) => {
                let _ = reply.send(controller.on_position(result));
            }
            Command::MapClick(coordinates, reply) => {
                let outcome = controller.on_map_click(coordinates).map(|request| {
                    // Fire and forget: the loop keeps serving events while
                    // the lookup is in flight.
                    let geocoder = geocoder.clone();
                    let lookups = lookups.clone();
                    tokio::spawn(async move {
                        let result = geocoder.reverse(request.coordinates).await;
                        // Nobody is listening once every handle is gone.
                        if let Some(tx) = lookups.upgrade() {
                            let _ = tx
                                .send(Command::LocationResolved(request.session, result))
                                .await;
                        }
                    });
                    request.session
                });
                let _ = reply.send(outcome);
            }
            Command::LocationResolved(session, result) => {
                controller.on_location_resolved(session, result);
            }
            Command::Submit(submission, reply) => {
                let _ = reply.send(controller.on_submit(submission));
            }
            Command::Cancel(reply) => {
                let _ = reply.send(Ok(controller.on_cancel()));
            }
            Command::Reset(reply) => {
                let _ = reply.send(controller.on_reset());
            }
            Command::Focus(id, reply) => {
                let _ = reply.send(controller.focus(id));
            }
            Command::Workouts(reply) => {
                let _ = reply.send(Ok(controller.workouts().to_vec()));
            }
            Command::View(reply) => {
                let _ = reply.send(Ok(controller.renderer().state().clone()));
            }
        }
    }

    tracing::info!("Session loop stopped");
}

impl SessionHandle {
    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Session loop is not running")))?;
        response
            .await
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Session loop dropped the request")))?
    }

    /// Deliver the initial position result (accepted once).
    pub async fn report_position(
        &self,
        result: std::result::Result<Coordinates, GeolocationError>,
    ) -> Result<()> {
        self.request(|reply| Command::Position(result, reply)).await
    }

    /// Open the input form at a clicked point.
    pub async fn map_click(&self, coordinates: Coordinates) -> Result<SessionId> {
        self.request(|reply| Command::MapClick(coordinates, reply))
            .await
    }

    /// Submit the open form.
    pub async fn submit(&self, submission: Submission) -> Result<Workout> {
        self.request(|reply| Command::Submit(submission, reply))
            .await
    }

    /// Close the open form. Returns whether a form was open.
    pub async fn cancel(&self) -> Result<bool> {
        self.request(Command::Cancel).await
    }

    /// Keyboard input while the form has focus. Only Escape does anything.
    pub async fn key_down(&self, key: &str) -> Result<bool> {
        if key == CANCEL_KEY {
            self.cancel().await
        } else {
            Ok(false)
        }
    }

    /// Remove every workout. Returns how many were removed.
    pub async fn reset(&self) -> Result<usize> {
        self.request(Command::Reset).await
    }

    /// Center the map on a workout.
    pub async fn focus(&self, id: WorkoutId) -> Result<Coordinates> {
        self.request(|reply| Command::Focus(id, reply)).await
    }

    pub async fn workouts(&self) -> Result<Vec<Workout>> {
        self.request(Command::Workouts).await
    }

    pub async fn view(&self) -> Result<ViewState> {
        self.request(Command::View).await
    }
}
