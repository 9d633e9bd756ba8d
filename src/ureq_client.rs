use crate::error::{HttpError, Result};
use crate::range_client::{Body, HttpTransport, Timeout};
use crate::reader_at::HttpReaderAt;
use crate::store::Store;
use http::{Request, Response};
use std::time::Duration;

#[cfg(feature = "ureq-sync")]
pub(crate) mod sync {
    use super::*;

    impl HttpTransport for ureq::Agent {
        fn send(&self, request: Request<()>) -> Result<Response<Body>> {
            let mut req = self.request(request.method().as_str(), &request.uri().to_string());
            for (name, value) in request.headers() {
                let value = value
                    .to_str()
                    .map_err(|_| HttpError::InvalidHeader("request header"))?;
                req = req.set(name.as_str(), value);
            }
            if let Some(timeout) = Timeout::of(&request) {
                req = req.timeout(timeout);
            }
            let response = match req.call() {
                Ok(response) => response,
                // Statuses are classified by the caller
                Err(ureq::Error::Status(_, response)) => response,
                Err(ureq::Error::Transport(e)) => return Err(HttpError::transport(e)),
            };

            let mut converted = Response::builder().status(response.status());
            for name in response.headers_names() {
                for value in response.all(&name) {
                    converted = converted.header(name.as_str(), value);
                }
            }
            let body: Body = Box::new(response.into_reader());
            converted.body(body).map_err(HttpError::transport)
        }
    }

    /// Random access reader over HTTP using a ureq agent.
    pub type UreqHttpReader = HttpReaderAt<ureq::Agent>;

    impl UreqHttpReader {
        /// Create a reader for `url` with an agent using 5 s read and write timeouts.
        pub fn from_url(url: &str, store: Option<Box<dyn Store>>) -> Result<Self> {
            let agent = ureq::AgentBuilder::new()
                .timeout_read(Duration::from_secs(5))
                .timeout_write(Duration::from_secs(5))
                .build();
            let request = Request::get(url).body(())?;
            Self::new(agent, request, store)
        }
    }
}
