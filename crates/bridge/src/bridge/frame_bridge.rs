use bytes::Bytes;
use tracing::{trace, warn};

use crate::bridge::FrameProtocol;
use crate::bridge::propagate::propagate_attributes;
use crate::bridge::routing::split_route;
use crate::config::{BridgeConfig, InitParams};
use crate::connection::{Connection, ConnectionResource};
use crate::protocol::body::FrameBody;
use crate::protocol::{FrameRequest, HandshakeRequest, ProtocolFault};

/// Turns every text or binary frame into exactly one [`FrameRequest`].
///
/// The bridge keeps no per-frame state, so a single instance can translate
/// frames from any number of connections and threads at once.
#[derive(Debug, Clone, Default)]
pub struct FrameBridge {
    config: BridgeConfig,
}

impl FrameBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    pub fn from_params<P: InitParams + ?Sized>(params: &P) -> Self {
        Self::new(BridgeConfig::from_params(params))
    }

    /// Replaces the configuration with one read from `params`.
    ///
    /// Taking `&mut self` rules out reconfiguring while frames are translated.
    pub fn configure<P: InitParams + ?Sized>(&mut self, params: &P) {
        self.config = BridgeConfig::from_params(params);
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    fn build_request(&self, resource: &ConnectionResource, target: Target, body: FrameBody) -> FrameRequest {
        let handshake = resource.request();
        let attributes = propagate_attributes(handshake.attributes());

        // the template supplies headers and version
        FrameRequest::builder()
            .request(handshake)
            .method(self.config.method.clone())
            .content_type(self.config.content_type.clone())
            .body(body)
            .attributes(attributes)
            .path_info(target.path_info)
            .request_uri(target.request_uri)
            .query(target.query)
            .destroyable(self.config.recycle_requests)
            .session(resource.session().cloned())
            .build()
    }
}

/// Where a frame request is addressed.
struct Target {
    path_info: String,
    request_uri: String,
    query: Option<String>,
}

impl Target {
    fn handshake(handshake: &HandshakeRequest) -> Self {
        Self {
            path_info: handshake.path_info().to_owned(),
            request_uri: handshake.request_uri().to_owned(),
            query: handshake.query().map(str::to_owned),
        }
    }

    /// A query in the routed path comes first, the handshake query is appended after it.
    fn routed(handshake: &HandshakeRequest, route: &str) -> Self {
        let (path, routed_query) = match route.split_once('?') {
            Some((path, query)) => (path, Some(query).filter(|query| !query.is_empty())),
            None => (route, None),
        };
        let query = match (routed_query, handshake.query()) {
            (Some(routed), Some(base)) => Some(format!("{routed}&{base}")),
            (routed, base) => routed.or(base).map(str::to_owned),
        };

        Self { path_info: path.to_owned(), request_uri: format!("{}{}", handshake.request_uri(), path), query }
    }
}

impl FrameProtocol for FrameBridge {
    fn on_text(&self, connection: &dyn Connection, payload: String) -> Vec<FrameRequest> {
        let Some(resource) = connection.resource() else {
            trace!("connection closed before the text frame was processed");
            return Vec::new();
        };
        let handshake = resource.request();

        let (target, body) = match split_route(&payload, &self.config.path_delimiter) {
            Some((route, body)) => {
                trace!(route, "routing text frame");
                (Target::routed(handshake, route), body.to_owned())
            }
            None => (Target::handshake(handshake), payload),
        };

        vec![self.build_request(&resource, target, FrameBody::text(body))]
    }

    fn on_binary(&self, connection: &dyn Connection, payload: Bytes) -> Vec<FrameRequest> {
        let Some(resource) = connection.resource() else {
            trace!("connection closed before the binary frame was processed");
            return Vec::new();
        };

        let target = Target::handshake(resource.request());
        vec![self.build_request(&resource, target, FrameBody::binary(payload))]
    }

    fn on_error(&self, _connection: &dyn Connection, fault: &ProtocolFault) {
        warn!(status = fault.status().as_u16(), status_message = fault.status_message(), "{}", fault.message());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread;

    use http::header::HOST;
    use http::{HeaderValue, Method, Request, StatusCode};
    use indoc::indoc;
    use tracing_test::traced_test;

    use super::*;
    use crate::config::{METHOD_PARAM, PATH_DELIMITER_PARAM, RECYCLE_REQUESTS_PARAM};
    use crate::connection::FrameConnection;
    use crate::protocol::{
        ATTRIBUTE_COUNT_HINT, AttributeSource, AttributeValue, SIMPLE_HTTP_OVER_WEBSOCKET,
        SUBPROTOCOL_ATTRIBUTE, Session, SharedAttributes,
    };

    fn connection_with(attributes: Arc<SharedAttributes>) -> FrameConnection {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/chat?room=7")
            .header(HOST, "127.0.0.1:8080")
            .body(())
            .unwrap();
        let handshake = HandshakeRequest::from(request)
            .with_path_info("/lobby")
            .with_attributes(attributes as Arc<dyn AttributeSource>);
        FrameConnection::new(ConnectionResource::new(handshake).with_session(Arc::new(Session::new("s-1"))))
    }

    fn connection() -> FrameConnection {
        let attributes = SharedAttributes::new();
        attributes.insert("user", "alice");
        connection_with(Arc::new(attributes))
    }

    fn single(mut requests: Vec<FrameRequest>) -> FrameRequest {
        assert_eq!(requests.len(), 1);
        requests.remove(0)
    }

    #[test]
    fn routed_text_frame() {
        let bridge = FrameBridge::default();
        let request = single(bridge.on_text(&connection(), "@@/foo/bar@@hello".to_owned()));

        assert_eq!(request.path_info(), "/foo/bar");
        assert_eq!(request.request_uri(), "/chat/foo/bar");
        assert_eq!(request.body().as_text(), Some("hello"));
    }

    #[test]
    fn routed_query_is_split_from_path() {
        let bridge = FrameBridge::default();
        let request = single(bridge.on_text(&connection(), "@@/foo?x=1@@b".to_owned()));

        assert_eq!(request.path_info(), "/foo");
        assert_eq!(request.request_uri(), "/chat/foo");
        assert_eq!(request.query(), Some("x=1&room=7"));
        assert_eq!(request.body().as_text(), Some("b"));

        let http_request = request.into_http().unwrap();
        assert_eq!(http_request.uri().path(), "/chat/foo");
        assert_eq!(http_request.uri().query(), Some("x=1&room=7"));
    }

    #[test]
    fn empty_routed_query_keeps_handshake_query() {
        let bridge = FrameBridge::default();
        let request = single(bridge.on_text(&connection(), "@@/foo?@@b".to_owned()));

        assert_eq!(request.request_uri(), "/chat/foo");
        assert_eq!(request.query(), Some("room=7"));
    }

    #[test]
    fn incomplete_prefix_is_body() {
        let bridge = FrameBridge::default();
        let request = single(bridge.on_text(&connection(), "@@incomplete".to_owned()));

        assert_eq!(request.body().as_text(), Some("@@incomplete"));
        assert_eq!(request.path_info(), "/lobby");
        assert_eq!(request.request_uri(), "/chat");
    }

    #[test]
    fn plain_text_frame() {
        let bridge = FrameBridge::default();
        let payload = indoc! {r#"
            {"type": "message",
             "text": "hello @@/not/a/route@@"}
        "#};
        let request = single(bridge.on_text(&connection(), payload.to_owned()));

        assert_eq!(request.body().as_text(), Some(payload));
        assert_eq!(request.path_info(), "/lobby");
        assert_eq!(request.request_uri(), "/chat");
    }

    #[test]
    fn request_is_templated_on_handshake() {
        let bridge = FrameBridge::default();
        let request = single(bridge.on_text(&connection(), "hi".to_owned()));

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.content_type(), &mime::TEXT_PLAIN);
        assert_eq!(request.query(), Some("room=7"));
        assert_eq!(request.headers().get(HOST), Some(&HeaderValue::from_static("127.0.0.1:8080")));
        assert_eq!(request.session().map(|s| s.id()), Some("s-1"));
        assert!(!request.is_destroyable());
        assert_eq!(request.attributes().get("user").and_then(AttributeValue::as_str), Some("alice"));
        assert_eq!(
            request.attributes().get(SUBPROTOCOL_ATTRIBUTE).and_then(AttributeValue::as_str),
            Some(SIMPLE_HTTP_OVER_WEBSOCKET)
        );
    }

    #[test]
    fn configured_values_are_stamped() {
        let params =
            HashMap::from([(METHOD_PARAM, "PUT"), (PATH_DELIMITER_PARAM, "##"), (RECYCLE_REQUESTS_PARAM, "true")]);
        let bridge = FrameBridge::from_params(&params);

        let request = single(bridge.on_text(&connection(), "##/topic##payload".to_owned()));
        assert_eq!(request.method(), &Method::PUT);
        assert!(request.is_destroyable());
        assert_eq!(request.path_info(), "/topic");
        assert_eq!(request.body().as_text(), Some("payload"));

        // the default delimiter means nothing once another is configured
        let request = single(bridge.on_text(&connection(), "@@/foo@@bar".to_owned()));
        assert_eq!(request.path_info(), "/lobby");
        assert_eq!(request.body().as_text(), Some("@@/foo@@bar"));
    }

    #[test]
    fn configure_replaces_config() {
        let mut bridge = FrameBridge::default();
        bridge.configure(&HashMap::from([(METHOD_PARAM, "PATCH")]));
        assert_eq!(bridge.config().method, Method::PATCH);

        bridge.configure(&HashMap::<String, String>::new());
        assert_eq!(bridge.config(), &BridgeConfig::default());
    }

    #[test]
    fn binary_frame_is_passed_through() {
        let bridge = FrameBridge::default();
        let received = Bytes::from_static(b"\x00\xff@@/foo@@\xc3\x28tail");
        let payload = received.slice(1..received.len() - 2);

        let request = single(bridge.on_binary(&connection(), payload.clone()));

        assert!(request.body().is_binary());
        assert_eq!(request.body().as_bytes(), &payload[..]);
        assert_eq!(request.path_info(), "/lobby");
        assert_eq!(request.request_uri(), "/chat");
        assert_eq!(request.attributes().get("user").and_then(AttributeValue::as_str), Some("alice"));
    }

    #[test]
    fn closed_connection_yields_nothing() {
        let bridge = FrameBridge::default();
        let connection = connection();
        connection.close();

        assert!(bridge.on_text(&connection, "@@/foo@@bar".to_owned()).is_empty());
        assert!(bridge.on_binary(&connection, Bytes::from_static(b"data")).is_empty());
    }

    #[test]
    fn requests_do_not_share_attributes() {
        let bridge = FrameBridge::default();
        let connection = connection();

        let mut first = single(bridge.on_text(&connection, "one".to_owned()));
        let second = single(bridge.on_text(&connection, "two".to_owned()));

        first.attributes_mut().insert("user", "mallory");
        first.attributes_mut().insert("extra", true);

        assert_eq!(second.attributes().get("user").and_then(AttributeValue::as_str), Some("alice"));
        assert!(!second.attributes().contains("extra"));
    }

    #[test]
    fn stale_hint_yields_snapshot() {
        let attributes = Arc::new(SharedAttributes::new());
        attributes.insert("user", "alice");
        attributes.insert(ATTRIBUTE_COUNT_HINT, 1_i64);
        let connection = connection_with(Arc::clone(&attributes));
        let bridge = FrameBridge::default();

        let request = single(bridge.on_text(&connection, "hi".to_owned()));
        attributes.insert("late", "value");

        assert!(request.attributes().contains("user"));
        assert!(!request.attributes().contains("late"));
    }

    #[test]
    fn concurrent_frames_on_one_connection() {
        let bridge = FrameBridge::default();
        let attributes = Arc::new(SharedAttributes::new());
        attributes.insert("user", "alice");
        attributes.record_len_hint();
        let connection = connection_with(Arc::clone(&attributes));

        let requests = thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..200_i64 {
                    attributes.insert("counter", i);
                }
            });

            let handles: Vec<_> = (0..4)
                .map(|worker| {
                    let bridge = &bridge;
                    let connection = &connection;
                    scope.spawn(move || {
                        (0..50)
                            .flat_map(|i| bridge.on_text(connection, format!("@@/w{worker}@@{i}")))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles.into_iter().flat_map(|handle| handle.join().unwrap()).collect::<Vec<_>>()
        });

        assert_eq!(requests.len(), 200);
        for request in &requests {
            assert!(request.path_info().starts_with("/w"));
            assert!(request.attributes().contains(SUBPROTOCOL_ATTRIBUTE));
            assert!(request.attributes().contains("user"));
        }
    }

    #[test]
    #[traced_test]
    fn error_is_logged_with_status() {
        let bridge = FrameBridge::default();
        let connection = connection();
        let fault = ProtocolFault::with_status("frame too large", StatusCode::PAYLOAD_TOO_LARGE);

        bridge.on_error(&connection, &fault);

        assert!(connection.is_open());
        logs_assert(|lines: &[&str]| {
            lines
                .iter()
                .find(|line| {
                    line.contains("WARN")
                        && line.contains("frame too large")
                        && line.contains("status=413")
                        && line.contains("Payload Too Large")
                })
                .map(|_| ())
                .ok_or_else(|| "protocol fault warning not found".to_string())
        });
    }

    #[test]
    fn open_and_close_are_no_ops() {
        let bridge = FrameBridge::default();
        let connection = connection();

        bridge.on_open(&connection);
        bridge.on_close(&connection);

        assert!(connection.is_open());
        assert_eq!(single(bridge.on_text(&connection, "still here".to_owned())).body().as_text(), Some("still here"));
    }
}
