use crate::error::Result;
use http::{Request, Response};
use std::io::Read;
use std::time::Duration;

/// Streaming response body.
pub type Body = Box<dyn Read + Send>;

/// Sync HTTP transport used for Range requests
///
/// Implementations send the request as given and hand back the response
/// status, headers and an unread body. Non-2xx statuses must be returned as
/// responses, not as errors, so the caller can classify them.
pub trait HttpTransport: Send + Sync {
    /// Send a request and return the response with a streaming body
    fn send(&self, request: Request<()>) -> Result<Response<Body>>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn send(&self, request: Request<()>) -> Result<Response<Body>> {
        (**self).send(request)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
    fn send(&self, request: Request<()>) -> Result<Response<Body>> {
        (**self).send(request)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    fn send(&self, request: Request<()>) -> Result<Response<Body>> {
        (**self).send(request)
    }
}

/// Per-request deadline, attached as a request extension.
///
/// Set it on the prototype request; every request cloned from the prototype
/// carries it along and the bundled transports apply it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout(pub Duration);

impl Timeout {
    pub(crate) fn of<B>(request: &Request<B>) -> Option<Duration> {
        request.extensions().get::<Timeout>().map(|t| t.0)
    }
}
