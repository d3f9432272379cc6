//! Response body decoders.
//!
//! Decoding a fetched body into a typed model is delegated to a
//! [`ResponseDecoder`]. A dispatch carries a [`Decoders`] pair: one decoder
//! for success bodies and, optionally, one for error bodies.

use std::convert::Infallible;
use std::marker::PhantomData;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::DecodeError;

/// Capability that decodes a body into a model.
pub trait ResponseDecoder: Send + Sync {
    /// The decoded model type.
    type Output;

    /// Decode `body`.
    fn decode(&self, body: &[u8]) -> Result<Self::Output, DecodeError>;
}

/// Decodes JSON bodies with `serde_json`.
pub struct JsonDecoder<T>(PhantomData<fn() -> T>);

impl<T> JsonDecoder<T> {
    /// Create a JSON decoder for `T`.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for JsonDecoder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JsonDecoder<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned> ResponseDecoder for JsonDecoder<T> {
    type Output = T;

    fn decode(&self, body: &[u8]) -> Result<T, DecodeError> {
        Ok(serde_json::from_slice(body)?)
    }
}

/// Decoder backed by a closure.
pub struct FnDecoder<F, T> {
    decode: F,
    _output: PhantomData<fn() -> T>,
}

impl<F, T> FnDecoder<F, T>
where
    F: Fn(&[u8]) -> Result<T, DecodeError> + Send + Sync,
{
    /// Wrap a decoding closure.
    pub fn new(decode: F) -> Self {
        Self {
            decode,
            _output: PhantomData,
        }
    }
}

impl<F, T> ResponseDecoder for FnDecoder<F, T>
where
    F: Fn(&[u8]) -> Result<T, DecodeError> + Send + Sync,
{
    type Output = T;

    fn decode(&self, body: &[u8]) -> Result<T, DecodeError> {
        (self.decode)(body)
    }
}

/// The decoders used by one dispatch.
///
/// `E` is the error model; without an error decoder it stays [`Infallible`]
/// and server errors carry the raw body.
pub struct Decoders<M, E = Infallible> {
    model: Arc<dyn ResponseDecoder<Output = M>>,
    error: Option<Arc<dyn ResponseDecoder<Output = E>>>,
}

impl<M: DeserializeOwned + 'static> Decoders<M> {
    /// Decode success bodies as JSON.
    pub fn json() -> Self {
        Self::from_decoder(JsonDecoder::new())
    }
}

impl Decoders<Bytes> {
    /// Pass success bodies through as raw bytes.
    pub fn raw() -> Self {
        Self::new(|body: &[u8]| Ok(Bytes::copy_from_slice(body)))
    }
}

impl<M: 'static> Decoders<M> {
    /// Decode success bodies with a closure.
    pub fn new<F>(decode: F) -> Self
    where
        F: Fn(&[u8]) -> Result<M, DecodeError> + Send + Sync + 'static,
    {
        Self::from_decoder(FnDecoder::new(decode))
    }

    /// Decode success bodies with any decoder.
    pub fn from_decoder<D>(decoder: D) -> Self
    where
        D: ResponseDecoder<Output = M> + 'static,
    {
        Self {
            model: Arc::new(decoder),
            error: None,
        }
    }
}

impl<M, E> Decoders<M, E> {
    /// Decode error bodies with the given decoder.
    pub fn with_error_decoder<E2, D>(self, decoder: D) -> Decoders<M, E2>
    where
        D: ResponseDecoder<Output = E2> + 'static,
    {
        Decoders {
            model: self.model,
            error: Some(Arc::new(decoder)),
        }
    }

    /// Decode error bodies as JSON into `E2`.
    pub fn with_json_errors<E2: DeserializeOwned + 'static>(self) -> Decoders<M, E2> {
        self.with_error_decoder(JsonDecoder::<E2>::new())
    }

    /// Whether an error decoder is configured.
    pub fn has_error_decoder(&self) -> bool {
        self.error.is_some()
    }

    pub(crate) fn decode_model(&self, body: &[u8]) -> Result<M, DecodeError> {
        self.model.decode(body)
    }

    pub(crate) fn decode_error(&self, body: &[u8]) -> Option<Result<E, DecodeError>> {
        self.error.as_ref().map(|decoder| decoder.decode(body))
    }
}

impl<M, E> Clone for Decoders<M, E> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            error: self.error.clone(),
        }
    }
}

impl<M, E> std::fmt::Debug for Decoders<M, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoders")
            .field("model", &std::any::type_name::<M>())
            .field("has_error_decoder", &self.error.is_some())
            .finish()
    }
}
