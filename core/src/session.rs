//! Optional glue that runs built requests through a host transport.
//!
//! # Design
//! The core never performs I/O itself. A `Transport` is the host's HTTP
//! stack; a `Session` pairs it with a `HaikuClient` and a list of
//! `Interceptor`s that observe each exchange. Interceptors are passed in
//! explicitly per session, so request logging never depends on global
//! state.

use tracing::{debug, trace};

use crate::client::HaikuClient;
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one HTTP exchange. Implementations return non-2xx responses as
/// data and reserve `Err` for failures where no response was received.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request)
    }
}

/// Observes requests before they are sent and responses once received.
pub trait Interceptor: Send + Sync {
    fn before_send(&self, _request: &HttpRequest) {}

    fn after_receive(&self, _request: &HttpRequest, _response: &HttpResponse) {}
}

/// Logs every exchange through `tracing`: summaries at `debug`, bodies at
/// `trace`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceExchanges;

impl Interceptor for TraceExchanges {
    fn before_send(&self, request: &HttpRequest) {
        debug!(method = request.method.as_str(), url = %request.url_with_query(), "sending request");
        if let Some(body) = request.form_body() {
            trace!(%body, "request body");
        }
    }

    fn after_receive(&self, request: &HttpRequest, response: &HttpResponse) {
        debug!(url = %request.url, status = response.status, "received response");
        trace!(body = %response.body, "response body");
    }
}

/// A client bound to a transport.
pub struct Session<T> {
    client: HaikuClient,
    transport: T,
    interceptors: Vec<Box<dyn Interceptor>>,
}

impl<T: Transport> Session<T> {
    pub fn new(client: HaikuClient, transport: T) -> Self {
        Self {
            client,
            transport,
            interceptors: Vec::new(),
        }
    }

    pub fn with_interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    pub fn client(&self) -> &HaikuClient {
        &self.client
    }

    /// Send `request` and hand the response to `parse`, typically one of
    /// the `HaikuClient::parse_*` methods.
    ///
    /// ```ignore
    /// let opts = TimelineOptions::default();
    /// let statuses = session.execute(
    ///     session.client().build_public_timeline(&opts)?,
    ///     HaikuClient::parse_statuses,
    /// )?;
    /// ```
    pub fn execute<R>(
        &self,
        request: HttpRequest,
        parse: impl FnOnce(&HaikuClient, HttpResponse) -> Result<R>,
    ) -> Result<R> {
        for interceptor in &self.interceptors {
            interceptor.before_send(&request);
        }
        let response = self.transport.execute(&request)?;
        for interceptor in &self.interceptors {
            interceptor.after_receive(&request, &response);
        }
        parse(&self.client, response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::ApiError;
    use crate::options::KeywordOptions;

    struct Canned(u16, &'static str);

    impl Transport for Canned {
        fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse> {
            Ok(HttpResponse {
                status: self.0,
                headers: Vec::new(),
                body: self.1.to_string(),
            })
        }
    }

    struct Offline;

    impl Transport for Offline {
        fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse> {
            Err(ApiError::Transport("connection refused".into()))
        }
    }

    #[derive(Default, Clone)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Interceptor for Recorder {
        fn before_send(&self, request: &HttpRequest) {
            self.0.lock().unwrap().push(format!("send {}", request.url));
        }

        fn after_receive(&self, _request: &HttpRequest, response: &HttpResponse) {
            self.0.lock().unwrap().push(format!("recv {}", response.status));
        }
    }

    #[test]
    fn interceptors_see_exchange_in_order() {
        let recorder = Recorder::default();
        let session = Session::new(HaikuClient::new("http://h/api"), Canned(200, "[]"))
            .with_interceptor(recorder.clone())
            .with_interceptor(TraceExchanges);
        let req = session
            .client()
            .build_hot_keywords(&KeywordOptions::default())
            .unwrap();
        let keywords = session.execute(req, HaikuClient::parse_keywords).unwrap();
        assert!(keywords.is_empty());
        assert_eq!(
            *recorder.0.lock().unwrap(),
            ["send http://h/api/keywords/hot.json", "recv 200"]
        );
    }

    #[test]
    fn transport_errors_propagate_unmodified() {
        let recorder = Recorder::default();
        let session = Session::new(HaikuClient::default(), Offline).with_interceptor(recorder.clone());
        let req = session.client().build_show_user(None).unwrap();
        let err = session.execute(req, HaikuClient::parse_user).unwrap_err();
        assert!(matches!(err, ApiError::Transport(ref e) if e.to_string() == "connection refused"));
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn http_errors_reach_the_parser() {
        let session = Session::new(HaikuClient::default(), Canned(503, "busy"));
        let req = session.client().build_show_user(Some("alice")).unwrap();
        let err = session.execute(req, HaikuClient::parse_user).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 503, .. }));
    }
}
