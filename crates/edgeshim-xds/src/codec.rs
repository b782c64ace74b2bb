//! Typed-config codec
//!
//! Envoy embeds extension configuration as `google.protobuf.Any`. Every
//! read-modify-write of an embedded message goes through `decode` and
//! `encode`; nothing edits the encoded bytes in place.

use crate::envoy::auth::{ExtAuthz, JwtAuthentication};
use crate::envoy::hcm::{HttpConnectionManager, Router};
use crate::envoy::listener::{Listener, LISTENER_TYPE_URL};
use crate::envoy::tls::DownstreamTlsContext;
use prost::Message;
use prost_types::Any;
use thiserror::Error;

/// Codec errors
#[derive(Error, Debug)]
pub enum CodecError {
    /// The envelope holds a different message type
    #[error("type url mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    /// The envelope bytes are not a valid message
    #[error("failed to decode {type_url}: {source}")]
    Decode {
        type_url: &'static str,
        #[source]
        source: prost::DecodeError,
    },

    /// The slot carries no typed config at all
    #[error("missing typed config in {0}")]
    MissingTypedConfig(String),
}

/// A prost message with a fixed `Any` type URL
pub trait TypedMessage: Message + Default {
    const TYPE_URL: &'static str;
}

impl TypedMessage for HttpConnectionManager {
    const TYPE_URL: &'static str =
        "type.googleapis.com/envoy.extensions.filters.network.http_connection_manager.v3.HttpConnectionManager";
}

impl TypedMessage for DownstreamTlsContext {
    const TYPE_URL: &'static str =
        "type.googleapis.com/envoy.extensions.transport_sockets.tls.v3.DownstreamTlsContext";
}

impl TypedMessage for Router {
    const TYPE_URL: &'static str = "type.googleapis.com/envoy.extensions.filters.http.router.v3.Router";
}

impl TypedMessage for JwtAuthentication {
    const TYPE_URL: &'static str =
        "type.googleapis.com/envoy.extensions.filters.http.jwt_authn.v3.JwtAuthentication";
}

impl TypedMessage for ExtAuthz {
    const TYPE_URL: &'static str = "type.googleapis.com/envoy.extensions.filters.http.ext_authz.v3.ExtAuthz";
}

impl TypedMessage for Listener {
    const TYPE_URL: &'static str = LISTENER_TYPE_URL;
}

/// Wrap a message in an `Any` envelope.
///
/// Encoding into a `Vec` cannot fail with prost, so there is no error path.
pub fn encode<M: TypedMessage>(message: &M) -> Any {
    Any {
        type_url: M::TYPE_URL.to_string(),
        value: message.encode_to_vec(),
    }
}

/// Unwrap an `Any` envelope into `M`
pub fn decode<M: TypedMessage>(any: &Any) -> Result<M, CodecError> {
    if any.type_url != M::TYPE_URL {
        return Err(CodecError::TypeMismatch {
            expected: M::TYPE_URL,
            found: any.type_url.clone(),
        });
    }
    M::decode(any.value.as_slice()).map_err(|source| CodecError::Decode {
        type_url: M::TYPE_URL,
        source,
    })
}

pub fn encode_hcm(manager: &HttpConnectionManager) -> Any {
    encode(manager)
}

pub fn decode_hcm(any: &Any) -> Result<HttpConnectionManager, CodecError> {
    decode(any)
}

pub fn encode_tls_context(context: &DownstreamTlsContext) -> Any {
    encode(context)
}

pub fn decode_tls_context(any: &Any) -> Result<DownstreamTlsContext, CodecError> {
    decode(any)
}
