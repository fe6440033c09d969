#![doc = "latexmill-core: build logic for latexmill."]

//! Drives latex, bibtex and the dvi/ps/pdf converters through as many passes
//! as a document needs for references, citations and the table of contents
//! to settle, then distributes the result.
//!
//! The CLI crate only parses arguments and loads configuration; everything
//! with a decision in it lives here.
//!
//! # Usage
//! Build a [`build::Builder`] over a [`contract::Toolchain`] and a
//! [`contract::Reporter`], then call `build` with a loaded
//! [`config::ProjectConfig`].

pub mod build;
pub mod config;
pub mod contract;
pub mod conversion;
pub mod diagnostics;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod preflight;
pub mod reporter;
pub mod request;
pub mod scm;
pub mod spell;
pub mod staging;
pub mod template;
pub mod tool;
pub mod toolchain;
pub mod viewer;
