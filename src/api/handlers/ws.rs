use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;

use crate::api::ws_types::{LogLevel, WsCommand, WsEvent};
use crate::AppState;

pub async fn handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    tracing::info!("Dashboard WebSocket client connected");

    // Subscribe before the snapshot so no event between the two is lost.
    let mut rx = state.engine.subscribe();

    let init = WsEvent::Init(Box::new(state.engine.snapshot().await));
    match serde_json::to_string(&init) {
        Ok(json) => {
            if socket.send(Message::Text(json)).await.is_err() {
                return;
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize init snapshot");
            return;
        }
    }

    loop {
        tokio::select! {
            // Forward broadcast events to client
            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        match serde_json::to_string(&event) {
                            Ok(json) => {
                                if socket.send(Message::Text(json)).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to serialize WsEvent");
                            }
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Dashboard WS client lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
            // Handle incoming messages from client (commands, ping/pong, close)
            client_msg = socket.recv() => {
                match client_msg {
                    Some(Ok(Message::Text(text))) => dispatch_command(&state, &text).await,
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // ignore binary frames
                    Some(Err(_)) => break,
                }
            }
        }
    }

    tracing::info!("Dashboard WebSocket client disconnected");
}

/// Parse and run one client command. Unknown or malformed payloads are
/// reported back on the activity feed instead of dropping the socket.
async fn dispatch_command(state: &AppState, text: &str) {
    let command: WsCommand = match serde_json::from_str(text) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable client command");
            state.engine.log(LogLevel::Error, "Unrecognized command");
            return;
        }
    };

    let engine = &state.engine;
    match command {
        WsCommand::StartBot(settings) => {
            if let Err(e) = engine.start(settings).await {
                tracing::warn!(error = %e, "Start rejected");
            }
        }
        WsCommand::StopBot => engine.stop().await,
        WsCommand::ScanMarket { chain } => {
            engine.scan_market(chain).await;
        }
        WsCommand::AddWallet(data) => {
            engine
                .add_wallet(data.chain, &data.private_key, data.label)
                .await;
        }
        WsCommand::AddWhale(data) => {
            engine
                .add_whale(data.name, data.address, data.chain, data.auto_buy)
                .await;
        }
        WsCommand::RemoveWhale { address } => {
            engine.remove_whale(&address).await;
        }
        WsCommand::SniperBuy(data) => {
            engine
                .sniper_buy(data.token, data.address, data.chain, data.price)
                .await;
        }
        WsCommand::BuySignal(data) => match data.key() {
            Some(key) => {
                engine.buy_signal(key).await;
            }
            None => engine.log(LogLevel::Warning, "buySignal needs an id or token"),
        },
        WsCommand::ClosePosition { id } => {
            engine.close_position(id).await;
        }
        WsCommand::SaveSettings(doc) => {
            if let Err(e) = engine.save_settings(*doc).await {
                tracing::warn!(error = %e, "Settings rejected");
            }
        }
    }
}
