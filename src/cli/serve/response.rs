//! Bundle HTTP responses.
//!
//! [`bundle_reply`] decides status, headers and body from the collection
//! alone so it can be tested without a socket; [`send`] hands the result to
//! tiny_http.

use crate::{
    cache::version::token_from_query, collection::BundleCollection, debug,
    utils::date::http_date, vpath,
};
use anyhow::{Result, anyhow};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::time::{Duration, SystemTime};
use tiny_http::{Header, Method, Request, Response, StatusCode};

const PLAIN: &str = "text/plain; charset=utf-8";

/// One year, the lifetime of a version-stamped response.
const CACHE_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Status, headers and body for one request.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: vec![
                ("Content-Type", PLAIN.to_string()),
                ("Cache-Control", "no-cache".to_string()),
            ],
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn not_found() -> Self {
        Self::text(404, "404 Not Found")
    }

    pub fn unavailable() -> Self {
        Self::text(503, "503 Service Unavailable")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Answer a request URL (`/bundles/site?v=...`) from the collection.
pub fn bundle_reply(collection: &BundleCollection, url: &str) -> Reply {
    let (path, query) = vpath::split_query(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(Cow::into_owned)
        .unwrap_or_else(|_| path.to_string());
    let Some(virtual_path) = vpath::from_absolute(&decoded, collection.application_path()) else {
        return Reply::not_found();
    };

    let response = match collection.get_bundle_response(&virtual_path) {
        Ok(Some(response)) => response,
        Ok(None) => return Reply::not_found(),
        Err(e) => {
            debug!("serve"; "{}: {}", virtual_path, e);
            return Reply::text(500, &format!("500 Internal Server Error\n{e}"));
        }
    };

    let content_type = if response.content_type.is_empty() {
        PLAIN.to_string()
    } else {
        response.content_type.clone()
    };
    let mut headers = vec![("Content-Type", content_type)];

    let requested = query.and_then(token_from_query);
    if collection.enable_optimizations() && requested == Some(response.version.as_str()) {
        headers.push(("Cache-Control", "public".to_string()));
        headers.push(("Expires", http_date(SystemTime::now() + CACHE_LIFETIME)));
        headers.push(("Vary", "User-Agent".to_string()));
        if let Some(modified) = response.last_modified {
            headers.push(("Last-Modified", http_date(modified)));
        }
    } else {
        headers.push(("Cache-Control", "no-cache".to_string()));
    }

    Reply {
        status: 200,
        headers,
        body: response.content.as_bytes().to_vec(),
    }
}

/// Send a reply, dropping the body for HEAD requests.
pub fn send(request: Request, reply: Reply) -> Result<()> {
    let headers = reply
        .headers
        .iter()
        .map(|(key, value)| make_header(key, value))
        .collect::<Result<Vec<_>>>()?;

    let body = if request.method() == &Method::Head {
        Vec::new()
    } else {
        reply.body
    };
    let mut response = Response::from_data(body).with_status_code(StatusCode(reply.status));
    for header in headers {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("invalid header `{key}: {value}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::Bundle;
    use crate::vfs::MemoryFileProvider;
    use std::sync::Arc;

    fn collection(optimize: bool) -> BundleCollection {
        let provider = Arc::new(MemoryFileProvider::new());
        provider.add_file("~/js/a.js", "alert( 1 );");
        let mut collection = BundleCollection::new(provider);
        collection.set_enable_optimizations(optimize);

        let mut site = Bundle::script("~/bundles/site").unwrap();
        site.include("~/js/*.js").unwrap();
        collection.add(site);

        let mut spaced = Bundle::new("~/bundles/my site").unwrap();
        spaced.include("~/js/a.js").unwrap();
        collection.add(spaced);

        let mut broken = Bundle::new("~/bundles/broken").unwrap();
        broken.include("~/js/missing.js").unwrap();
        collection.add(broken);
        collection
    }

    fn current_url(collection: &BundleCollection) -> String {
        collection.resolve_bundle_url("~/bundles/site").unwrap()
    }

    #[test]
    fn test_versioned_request_is_cacheable() {
        let collection = collection(true);
        let reply = bundle_reply(&collection, &current_url(&collection));

        assert_eq!(reply.status, 200);
        assert_eq!(reply.header("content-type"), Some("text/javascript"));
        assert_eq!(reply.header("Cache-Control"), Some("public"));
        assert_eq!(reply.header("Vary"), Some("User-Agent"));
        assert!(reply.header("Expires").unwrap().ends_with(" GMT"));
        assert!(reply.header("Last-Modified").is_some());
    }

    #[test]
    fn test_stale_token_is_not_cached() {
        let collection = collection(true);
        let reply = bundle_reply(&collection, "/bundles/site?v=stale");

        assert_eq!(reply.status, 200);
        assert_eq!(reply.header("Cache-Control"), Some("no-cache"));
        assert!(reply.header("Vary").is_none());
        assert!(reply.header("Last-Modified").is_none());
    }

    #[test]
    fn test_debug_mode_is_never_cached() {
        let collection = collection(false);
        let reply = bundle_reply(&collection, &current_url(&collection));
        assert_eq!(reply.status, 200);
        assert_eq!(reply.header("Cache-Control"), Some("no-cache"));
    }

    #[test]
    fn test_unknown_and_broken_bundles() {
        let collection = collection(true);
        assert_eq!(bundle_reply(&collection, "/bundles/nope").status, 404);
        assert_eq!(bundle_reply(&collection, "/bundles/broken").status, 500);
        assert_eq!(bundle_reply(&collection, "/bundles/my%20site").status, 200);
    }

    #[test]
    fn test_application_path_prefix() {
        let mut collection = collection(true);
        collection.set_application_path("/app");
        assert_eq!(bundle_reply(&collection, "/bundles/site").status, 404);
        assert_eq!(bundle_reply(&collection, "/app/bundles/site").status, 200);
    }
}
