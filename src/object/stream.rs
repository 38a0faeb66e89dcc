//! Stream values.
//!
//! A stream couples a dictionary with a byte payload that may be held
//! in-memory, supplied on demand by a provider, or rewritten by token
//! filters. This layer stores those collaborators and severs them at
//! disconnect; running filter pipelines is the job of external code.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use bytes::Bytes;
use serde_json::Value as Json;

use crate::error::Result;
use crate::lexer::Token;
use crate::object::Object;

/// Callback producing stream bytes on demand, for data that is paged in
/// lazily or computed at write time.
pub trait StreamDataProvider {
    /// Produce the stream bytes.
    fn provide(&self) -> Bytes;
}

/// Hook for content-token rewriting pipelines. The object layer only stores
/// filters and drops them on disconnect; a pipeline drives them.
pub trait TokenFilter {
    /// Observe or rewrite one token.
    fn handle_token(&mut self, token: &Token<'_>);

    /// Called once after the last token.
    fn handle_eof(&mut self) {}
}

/// Stream payload: dictionary edge plus byte data.
#[derive(Clone)]
pub struct Stream {
    dict: Object,
    data: Option<Bytes>,
    provider: Option<Rc<dyn StreamDataProvider>>,
    token_filters: Vec<Rc<RefCell<dyn TokenFilter>>>,
    offset: u64,
    length: u64,
}

impl Stream {
    pub(crate) fn with_data(dict: Object, data: Bytes) -> Self {
        let length = data.len() as u64;
        Stream {
            dict,
            data: Some(data),
            provider: None,
            token_filters: Vec::new(),
            offset: 0,
            length,
        }
    }

    pub(crate) fn deferred(dict: Object, offset: u64, length: u64) -> Self {
        Stream {
            dict,
            data: None,
            provider: None,
            token_filters: Vec::new(),
            offset,
            length,
        }
    }

    /// The stream dictionary.
    pub fn dict(&self) -> Object {
        self.dict.clone()
    }

    /// Raw (still encoded) stream bytes, from memory or the provider.
    pub fn raw_data(&self) -> Option<Bytes> {
        self.data
            .clone()
            .or_else(|| self.provider.as_ref().map(|p| p.provide()))
    }

    /// Byte offset of the stream data in its source, when parsed from one.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Recorded data length.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Whether token filters are attached, meaning the effective data no
    /// longer matches the stored bytes.
    pub fn is_data_modified(&self) -> bool {
        !self.token_filters.is_empty()
    }

    pub(crate) fn set_data(&mut self, data: Bytes) {
        self.length = data.len() as u64;
        self.data = Some(data);
        self.provider = None;
    }

    pub(crate) fn set_provider(&mut self, provider: Rc<dyn StreamDataProvider>) {
        self.data = None;
        self.provider = Some(provider);
    }

    pub(crate) fn add_token_filter(&mut self, filter: Rc<RefCell<dyn TokenFilter>>) {
        self.token_filters.push(filter);
    }

    pub(crate) fn disconnect(&mut self) {
        self.provider = None;
        self.dict.disconnect();
    }

    pub(crate) fn copy_value(&self, shallow: bool) -> Result<Stream> {
        let dict = if shallow {
            self.dict.clone()
        } else {
            self.dict.copy(false)?
        };
        Ok(Stream {
            dict,
            data: self.data.clone(),
            provider: self.provider.clone(),
            token_filters: self.token_filters.clone(),
            offset: self.offset,
            length: self.length,
        })
    }

    /// Serialized dictionary-plus-body form, used for streams that have not
    /// been adopted into a document.
    pub(crate) fn unparse_body(&self) -> Result<String> {
        let mut out = self.dict.unparse()?;
        out.push_str("\nstream\n");
        if let Some(data) = self.raw_data() {
            out.push_str(&String::from_utf8_lossy(&data));
        }
        out.push_str("\nendstream");
        Ok(out)
    }

    pub(crate) fn to_json(&self, version: i32) -> Result<Json> {
        let mut out = serde_json::Map::new();
        out.insert("dict".to_string(), self.dict.to_json(version)?);
        Ok(Json::Object(out))
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("dict", &self.dict)
            .field("length", &self.length)
            .field("offset", &self.offset)
            .field("has_data", &self.data.is_some())
            .field("has_provider", &self.provider.is_some())
            .field("token_filters", &self.token_filters.len())
            .finish()
    }
}
