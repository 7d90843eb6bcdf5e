//! # Document Reader
//!
//! [`DocumentReader`] combines a [`DocumentParser`], a [`Resolver`] and a
//! [`DocumentCache`]: callers ask for the parsed document at a path across
//! some locations, and get a cached instance when one is still alive or a
//! freshly retrieved and parsed one otherwise.

use std::io::Read;
use std::sync::Arc;

use log::debug;

use crate::doc_cache::{CachedDocument, DocumentCache};
use crate::error::Result;
use crate::event::EventMetadata;
use crate::location::Location;
use crate::manager::TransferManager;
use crate::resolver::Resolver;
use crate::resource::VirtualResource;
use crate::transfer::Transfer;

type Key<P> = <<P as DocumentParser>::Document as CachedDocument>::Key;

/// Turns retrieved bytes into a document.
pub trait DocumentParser: Send + Sync {
    type Document: CachedDocument;

    /// Parses content read from `location`. The returned document must
    /// report `key` and `location` so the cache files it correctly.
    fn parse(
        &self,
        key: &<Self::Document as CachedDocument>::Key,
        location: &Location,
        content: &mut dyn Read,
    ) -> Result<Self::Document>;
}

/// Parse-and-cache reader over a resolver.
pub struct DocumentReader<P: DocumentParser, M: TransferManager + ?Sized> {
    parser: P,
    resolver: Resolver<M>,
    cache: DocumentCache<P::Document>,
}

impl<P: DocumentParser, M: TransferManager + ?Sized> DocumentReader<P, M> {
    pub fn new(parser: P, resolver: Resolver<M>) -> Self {
        Self {
            parser,
            resolver,
            cache: DocumentCache::new(),
        }
    }

    pub fn cache(&self) -> &DocumentCache<P::Document> {
        &self.cache
    }

    /// The document for `key` from the first location that has one.
    ///
    /// A live cached document for any of the locations is returned as is;
    /// otherwise the content is retrieved with the resolver's
    /// first-match rule, parsed and cached.
    pub fn read_first(
        &self,
        key: &Key<P>,
        path: &str,
        locations: &[Location],
    ) -> Result<Option<Arc<P::Document>>> {
        if let Some(doc) = self.cache.get_first(key, locations) {
            return Ok(Some(doc));
        }
        let resource = VirtualResource::new(locations.to_vec(), path)?;
        let Some(transfer) = self
            .resolver
            .retrieve_first(&resource, &EventMetadata::default())?
        else {
            return Ok(None);
        };
        self.parse_and_cache(key, &transfer)
    }

    /// Documents for `key` from every location that has one, in location
    /// order. Locations with a live cached document are not retrieved again.
    pub fn read_all(
        &self,
        key: &Key<P>,
        path: &str,
        locations: &[Location],
    ) -> Result<Vec<(Location, Arc<P::Document>)>> {
        let cached = self.cache.get_all(key, locations);
        let missing: Vec<Location> = locations
            .iter()
            .filter(|l| !cached.iter().any(|(hit, _)| hit == *l))
            .cloned()
            .collect();

        let mut parsed = Vec::new();
        if !missing.is_empty() {
            let resource = VirtualResource::new(missing, path)?;
            for transfer in self
                .resolver
                .retrieve_all(&resource, &EventMetadata::default())?
            {
                if let Some(doc) = self.parse_and_cache(key, &transfer)? {
                    parsed.push((transfer.location().clone(), doc));
                }
            }
        }

        let mut all = Vec::with_capacity(cached.len() + parsed.len());
        for location in locations {
            let found = cached
                .iter()
                .chain(parsed.iter())
                .find(|(l, _)| l == location);
            if let Some((l, doc)) = found {
                all.push((l.clone(), Arc::clone(doc)));
            }
        }
        Ok(all)
    }

    fn parse_and_cache(
        &self,
        key: &Key<P>,
        transfer: &Transfer,
    ) -> Result<Option<Arc<P::Document>>> {
        let Some(mut stream) = transfer.open_input_stream(true)? else {
            return Ok(None);
        };
        let doc = Arc::new(self.parser.parse(key, transfer.location(), &mut stream)?);
        stream.close();
        debug!("parsed and cached document from {}", transfer);
        self.cache.put(&doc);
        Ok(Some(doc))
    }
}
