//! Fetch a web resource named by a URL, or by a bare domain such as
//! `www.example.com`, and write its body to standard output or to a file
//! named after the URL's last path segment.
//!
//! [`target::Target`] carries one such request. The network fetch and the
//! choice of destination are injected through [`retriever::Retrieve`] and
//! [`output::OutputResolver`].
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod retriever;
pub mod target;
pub mod urls;
