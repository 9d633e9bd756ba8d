use crate::error::{HttpError, Result};
use crate::range_client::{Body, HttpTransport, Timeout};
use crate::reader_at::HttpReaderAt;
use crate::store::Store;
use http::{Request, Response};

pub(crate) mod sync {
    use super::*;

    impl HttpTransport for reqwest::blocking::Client {
        fn send(&self, request: Request<()>) -> Result<Response<Body>> {
            let mut builder = self
                .request(request.method().clone(), request.uri().to_string())
                .headers(request.headers().clone());
            if let Some(timeout) = Timeout::of(&request) {
                builder = builder.timeout(timeout);
            }
            let response = builder.send().map_err(HttpError::transport)?;

            let mut converted = Response::builder()
                .status(response.status())
                .version(response.version());
            if let Some(headers) = converted.headers_mut() {
                *headers = response.headers().clone();
            }
            let body: Body = Box::new(response);
            converted.body(body).map_err(HttpError::transport)
        }
    }

    /// Random access reader over HTTP using a blocking reqwest client.
    pub type HttpReader = HttpReaderAt<reqwest::blocking::Client>;

    impl HttpReader {
        /// Create a reader for `url` with a default client.
        pub fn from_url(url: &str, store: Option<Box<dyn Store>>) -> Result<Self> {
            let request = Request::get(url).body(())?;
            Self::new(reqwest::blocking::Client::new(), request, store)
        }
    }
}
