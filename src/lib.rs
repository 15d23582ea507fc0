#![forbid(unsafe_code)]
//! # cdp_reasons
//!
//! Word-frequency and bigram-network views over the reasons cities give for
//! year-on-year changes in their greenhouse-gas emissions, as disclosed in the
//! CDP open-data snapshots for 2013-2020.
//!
//! A request is a `(year, region, top_n)` triple. The pipeline fetches the
//! year's CSV snapshot, reconciles its columns and regions, normalizes each
//! reason text and assembles a chart-ready view:
//!
//! - [`build_frequency_view`]: top words, split by increase/decrease where the
//!   year records that category.
//! - [`build_network_view`]: a weighted bigram graph with node positions.
//!
//! ## Example
//! ```no_run
//! use cdp_reasons::{HttpSource, PipelineConfig, RegionFilter, build_frequency_view};
//!
//! let config = PipelineConfig::default();
//! let source = HttpSource::new(&config.base_url, config.row_limit)?;
//! let view = build_frequency_view(&source, &config, 2017, RegionFilter::All, 13)?;
//! println!("{}", cdp_reasons::export::render_frequency_txt(&view));
//! # Ok::<(), cdp_reasons::Error>(())
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod frequency;
pub mod layout;
pub mod lemma;
pub mod matrix;
pub mod network;
pub mod normalize;
pub mod source;
pub mod stopwords;

pub use config::PipelineConfig;
pub use dataset::{Dataset, Region, RegionFilter};
pub use error::{Error, Result};
pub use export::{ExportFormat, csv_safe_cell, export_frequency, export_network};
pub use frequency::{FrequencyView, build_frequency_view};
pub use layout::LayoutConfig;
pub use matrix::FrequencyMatrix;
pub use network::{NetworkView, build_network_view};
pub use normalize::{NormalizeOptions, Normalizer};
pub use source::{DataSource, DirectorySource, HttpSource};
