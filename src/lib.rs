// dreadmap: embedding similarity and PCA for horror-movie descriptions
//
// This is the library root. Each module corresponds to a stage of the
// pipeline or to the plumbing around it.

pub mod config;
pub mod dataset;
pub mod db;
pub mod embeddings;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod projection;
pub mod similarity;
pub mod status;
