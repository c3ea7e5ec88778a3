use axum::http::{HeaderName, HeaderValue, Response};

pub const SERVER_TIMING: HeaderName = HeaderName::from_static("server-timing");

/// What a timing session needs from the response it writes to.
pub trait TimingResponse {
    /// Whether the headers have already gone out on the wire.
    fn headers_sent(&self) -> bool;

    /// `server-timing` values already on the response, in order.
    fn server_timing_values(&self) -> Vec<HeaderValue>;

    /// Replaces every `server-timing` value with `values`, one header line each.
    fn set_server_timing(&mut self, values: Vec<HeaderValue>);
}

/// A response still held by a middleware has not been transmitted yet.
impl<B> TimingResponse for Response<B> {
    fn headers_sent(&self) -> bool {
        false
    }

    fn server_timing_values(&self) -> Vec<HeaderValue> {
        self.headers().get_all(&SERVER_TIMING).iter().cloned().collect()
    }

    fn set_server_timing(&mut self, values: Vec<HeaderValue>) {
        let headers = self.headers_mut();
        headers.remove(&SERVER_TIMING);
        for value in values {
            headers.append(SERVER_TIMING.clone(), value);
        }
    }
}
