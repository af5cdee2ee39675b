use actix_web::{HttpRequest, HttpResponse, web};
use actix_ws::Message;
use futures_util::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::auth::jwt::TokenVerifier;
use crate::auth::middleware::resolve_profile;
use crate::db::profiles as profile_db;
use crate::live::hub::{ChangeNotice, Scope};
use crate::live::protocol::{ClientMessage, Collection, ServerMessage};
use crate::live::snapshot::snapshot;
use crate::models::profiles;
use crate::workflow::Workflow;

/// Query params for the WebSocket handshake endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// GET /api/live/ws?token=<jwt>
///
/// Browsers can't set an Authorization header on the handshake, so the
/// bearer token travels as a query param.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<WsQuery>,
    verifier: web::Data<Arc<TokenVerifier>>,
    workflow: web::Data<Arc<Workflow>>,
) -> Result<HttpResponse, actix_web::Error> {
    let viewer = resolve_profile(&query.token, verifier.get_ref(), workflow.db()).await?;

    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;

    debug!("Live session opened for {}", viewer.id);
    actix_web::rt::spawn(run_session(
        session,
        msg_stream,
        viewer,
        workflow.get_ref().clone(),
    ));

    Ok(response)
}

/// Everything a session needs while it handles one client message.
struct LiveSession {
    viewer: profiles::Model,
    workflow: Arc<Workflow>,
    scope: Scope,
    notices: mpsc::UnboundedSender<ChangeNotice>,
    subscriptions: HashMap<Collection, u64>,
}

async fn run_session(
    mut session: actix_ws::Session,
    mut msg_stream: actix_ws::MessageStream,
    viewer: profiles::Model,
    workflow: Arc<Workflow>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let scope = if viewer.is_admin() {
        Scope::All
    } else {
        Scope::Worker(viewer.id)
    };
    let mut live = LiveSession {
        viewer,
        workflow,
        scope,
        notices: tx,
        subscriptions: HashMap::new(),
    };

    loop {
        tokio::select! {
            msg = msg_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if live.handle_client_message(&text, &mut session).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            Some(notice) = rx.recv() => {
                // A notice may still be queued for a collection the client
                // just unsubscribed from.
                if live.subscriptions.contains_key(&notice.collection)
                    && live.send_snapshot(&mut session, notice.collection).await.is_err()
                {
                    break;
                }
            }
        }
    }

    for (collection, id) in live.subscriptions.drain() {
        live.workflow.live().unsubscribe(collection, id).await;
    }
    debug!("Live session closed for {}", live.viewer.id);
    let _ = session.close(None).await;
}

impl LiveSession {
    async fn handle_client_message(
        &mut self,
        text: &str,
        session: &mut actix_ws::Session,
    ) -> Result<(), actix_ws::Closed> {
        let client_msg: ClientMessage = match serde_json::from_str(text) {
            Ok(m) => m,
            Err(e) => {
                return send(session, error(format!("Invalid message format: {e}"))).await;
            }
        };

        match client_msg {
            ClientMessage::Subscribe { collection } => {
                if collection == Collection::Users && !self.viewer.is_admin() {
                    return send(session, error("Only admins can view users")).await;
                }
                if !self.subscriptions.contains_key(&collection) {
                    let id = self
                        .workflow
                        .live()
                        .subscribe(collection, self.scope, self.notices.clone())
                        .await;
                    self.subscriptions.insert(collection, id);
                }
                self.send_snapshot(session, collection).await
            }
            ClientMessage::Unsubscribe { collection } => {
                if let Some(id) = self.subscriptions.remove(&collection) {
                    self.workflow.live().unsubscribe(collection, id).await;
                }
                Ok(())
            }
            ClientMessage::Refresh { collection } => self.send_snapshot(session, collection).await,
        }
    }

    /// Refetch the viewer's list and send it whole.
    async fn send_snapshot(
        &mut self,
        session: &mut actix_ws::Session,
        collection: Collection,
    ) -> Result<(), actix_ws::Closed> {
        // Approval can change while the socket is open.
        match profile_db::get_profile_by_id(self.workflow.db(), self.viewer.id).await {
            Ok(Some(profile)) => self.viewer = profile,
            Ok(None) => return send(session, error("Profile no longer exists")).await,
            Err(e) => return send(session, error(format!("Database error: {e}"))).await,
        }

        let message = match snapshot(&self.workflow, &self.viewer, collection).await {
            Ok(items) => ServerMessage::Snapshot { collection, items },
            Err(e) => error(e.to_string()),
        };
        send(session, message).await
    }
}

fn error(message: impl Into<String>) -> ServerMessage {
    ServerMessage::Error {
        message: message.into(),
    }
}

async fn send(
    session: &mut actix_ws::Session,
    message: ServerMessage,
) -> Result<(), actix_ws::Closed> {
    session
        .text(serde_json::to_string(&message).unwrap_or_default())
        .await
}
