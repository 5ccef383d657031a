use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::fmt::Display;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::server::hub::{StateHub, Subscription};

#[derive(Debug, Clone, Copy)]
pub(crate) struct ConnectionTimeouts {
    ///longest a single socket write may take before the viewer is dropped
    pub send: Duration,
    ///how long to wait for a client message before checking again. Not a disconnect.
    pub keepalive: Duration,
}

///One viewer. Lives until the socket closes or a write to it fails.
pub(crate) struct WebSocketConnection {
    hub: StateHub,
    timeouts: ConnectionTimeouts,
}

impl WebSocketConnection {
    pub fn new(hub: StateHub, timeouts: ConnectionTimeouts) -> Self {
        Self { hub, timeouts }
    }

    pub async fn run(self, web_socket: WebSocket) {
        let (ws_tx, ws_rx) = web_socket.split();
        self.run_split(ws_tx, ws_rx).await
    }

    pub async fn run_split<S, R, E>(self, mut ws_tx: S, mut ws_rx: R)
    where
        S: Sink<Message> + Unpin + Send + 'static,
        S::Error: Display + Send,
        R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
        E: Display + Send,
    {
        let Subscription { id, mut rx } = self.hub.subscribe();
        debug!("websocket {} connected", id);

        //the first payload is the state at subscribe time
        let send_timeout = self.timeouts.send;
        let mut send_task = tokio::spawn(async move {
            while let Some(payload) = rx.recv().await {
                match timeout(send_timeout, ws_tx.send(Message::Text(payload.to_string()))).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        debug!("websocket {} send failed: {}", id, err);
                        break;
                    }
                    Err(_) => {
                        warn!("websocket {} send timed out after {:?}", id, send_timeout);
                        break;
                    }
                }
            }
        });

        //client messages are only read to notice the socket closing
        let keepalive = self.timeouts.keepalive;
        let mut recv_task = tokio::spawn(async move {
            loop {
                match timeout(keepalive, ws_rx.next()).await {
                    Err(_) => trace!("websocket {} quiet for {:?}", id, keepalive),
                    Ok(None) => break,
                    Ok(Some(Err(err))) => {
                        debug!("websocket {} receive failed: {}", id, err);
                        break;
                    }
                    Ok(Some(Ok(Message::Close(frame)))) => {
                        debug!("websocket {} sent close frame: {:?}", id, frame);
                        break;
                    }
                    Ok(Some(Ok(message))) => {
                        trace!("ignoring message from websocket {}: {:?}", id, message)
                    }
                }
            }
        });

        tokio::select! {
            _ = &mut send_task => recv_task.abort(),
            _ = &mut recv_task => send_task.abort(),
        }

        self.hub.unsubscribe(&id);
        debug!("websocket {} closed", id);
    }
}
