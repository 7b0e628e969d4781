//! Header propagation to backend calls.
//!
//! Every inbound header is copied onto each outbound request, all values of
//! repeated headers included. Tracing context, the request id and the
//! `backends`/`latency` directives travel down the whole call tree this way.
//! Entries describing the inbound message itself are left behind: the
//! outbound authority comes from the backend address and the outbound
//! request has no body.

use axum::http::{header, HeaderMap, HeaderName};

/// Headers that belong to the inbound message, not to the request context.
fn is_message_header(name: &HeaderName) -> bool {
    *name == header::HOST || *name == header::CONTENT_LENGTH || *name == header::TRANSFER_ENCODING
}

/// Copy `inbound` into a fresh header map for a backend call.
pub fn propagate(inbound: &HeaderMap) -> HeaderMap {
    let mut outbound = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if is_message_header(name) {
            continue;
        }
        outbound.append(name.clone(), value.clone());
    }
    outbound
}
