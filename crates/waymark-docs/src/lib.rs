//! Docs content pipeline: fetch, rewrite, cache.
//!
//! Raw docs HTML is fetched through a [`ContentSource`], post-processed
//! by [`rewrite`] (absolute links, section markers), and cached per URL
//! by [`DocsFetcher`].

pub mod fetcher;
pub mod rewrite;

pub use fetcher::{ContentSource, DocsError, DocsFetcher, FakeContentSource, HttpContentSource};
pub use rewrite::{inject_section_markers, process_page, rewrite_links};
