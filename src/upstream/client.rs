//! Pooled HTTP client for the upstream target.

use axum::body::Body;
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::UpstreamConfig;

/// Shared client; connections to the single target are pooled across requests.
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build the client used for every forwarded request.
///
/// Plain `http://` and `https://` targets are both supported; TLS roots are
/// the bundled Mozilla set so the proxy does not depend on the host's store.
pub fn build_client(config: &UpstreamConfig) -> UpstreamClient {
    let mut http = HttpConnector::new();
    http.set_connect_timeout(Some(config.connect_timeout()));
    http.set_nodelay(true);
    http.enforce_http(false);

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .wrap_connector(http);

    Client::builder(TokioExecutor::new()).build(https)
}
