use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream;
use http::{Request, StatusCode};
use micro_ws_bridge::bridge::FrameBridge;
use micro_ws_bridge::config::{CONTENT_TYPE_PARAM, RECYCLE_REQUESTS_PARAM};
use micro_ws_bridge::connection::{ConnectionEvent, ConnectionResource, FrameConnection, FrameDispatcher};
use micro_ws_bridge::handler::make_sink;
use micro_ws_bridge::protocol::{
    AttributeSource, FrameRequest, HandshakeRequest, ProtocolFault, Session, SharedAttributes,
};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let params = HashMap::from([(CONTENT_TYPE_PARAM, "application/json"), (RECYCLE_REQUESTS_PARAM, "true")]);
    let bridge = Arc::new(FrameBridge::from_params(&params));

    let attributes = Arc::new(SharedAttributes::new());
    attributes.insert("user", "alice");
    attributes.record_len_hint();

    let handshake = Request::builder()
        .uri("/chat?room=lobby")
        .header(http::header::HOST, "127.0.0.1:8080")
        .header(http::header::UPGRADE, "websocket")
        .body(())
        .expect("static handshake request is valid");
    let handshake =
        HandshakeRequest::from(handshake).with_attributes(Arc::clone(&attributes) as Arc<dyn AttributeSource>);
    let resource = ConnectionResource::new(handshake).with_session(Arc::new(Session::new("demo")));
    let connection = FrameConnection::new(resource);

    let sink = Arc::new(make_sink(|request: FrameRequest| async move {
        let request = request.into_http()?;
        info!(
            method = %request.method(),
            uri = %request.uri(),
            content_type = ?request.headers().get(http::header::CONTENT_TYPE),
            body_len = request.body().len(),
            "frame request ready for the pipeline"
        );
        Ok::<_, micro_ws_bridge::protocol::RequestBuildError>(())
    }));

    let events = stream::iter(vec![
        ConnectionEvent::Open,
        ConnectionEvent::from(r#"@@/messages@@{"text": "hello"}"#),
        ConnectionEvent::from("@@no route here"),
        ConnectionEvent::from(Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef])),
        ConnectionEvent::from(ProtocolFault::with_status("client went silent", StatusCode::REQUEST_TIMEOUT)),
        ConnectionEvent::Close,
    ]);

    let dispatcher = FrameDispatcher::new(bridge, sink);
    let summary = dispatcher.process(&connection, events).await;
    connection.close();

    info!(frames = summary.frames, delivered = summary.delivered, failed = summary.failed, "demo finished");
}
