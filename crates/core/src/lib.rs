//! Core library for moviedb
//!
//! This crate implements the **Functional Core** of the moviedb application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The moviedb project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`moviedb_core`** (this crate): Pure data types and transformation functions with zero I/O
//! - **`moviedb`**: HTTP search service, the search presenter and the CLI (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! All functions in this crate adhere to these principles:
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no external state mutations
//! - **Testable**: Can be tested with simple fixture data, no mocking required
//!
//! # Module Organization
//!
//! - [`search`]: Query validation, user-facing message keys and pagination affordances
//! - [`page`]: Result pages and the movie records they carry
//! - [`tmdb`]: The Movie Database (TMDB) wire types and their transformation into pages
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use moviedb_core::search::{pagination_control, SearchQuery, Visibility};
//! use moviedb_core::page::ResultPage;
//!
//! let query = SearchQuery::new("star wars", 1)?;
//! let page = ResultPage::new(1, 2, 40, vec![])?;
//!
//! let control = pagination_control(&query, &page);
//! assert_eq!(control.visibility, Visibility::Visible);
//! assert_eq!(control.next_page, 2);
//! ```

pub mod page;
pub mod search;
pub mod tmdb;
