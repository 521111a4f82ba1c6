use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use tokio::sync::mpsc;

use crate::session::{SessionBroadcaster, FRAME_BUFFER};
use crate::web::state::AppState;

/// `GET /czml`: opens a session and streams its frames as server-sent events.
///
/// The session runs on its own task. When the client goes away hyper drops
/// the body, which drops the frame receiver and closes the session.
pub async fn stream(State(state): State<AppState>) -> Response {
    let (tx, rx) = mpsc::channel::<String>(FRAME_BUFFER);

    let session = SessionBroadcaster::new(
        state.store.clone(),
        state.settings.clone(),
        state.timeline,
    );
    let cancel = state.shutdown.child_token();
    log::debug!("Client connected, starting session {}", session.id());
    tokio::spawn(session.run(tx, cancel));

    let frames = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|frame| (Ok::<_, Infallible>(frame), rx))
    });

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        Body::from_stream(frames),
    )
        .into_response()
}
