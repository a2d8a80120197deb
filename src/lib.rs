//! Golf swing capture and analysis service.
//!
//! A capture is submitted with a video reference, ingested into local
//! storage, run through pose extraction, phase segmentation and scoring,
//! and stored as exactly one analysis. Progress is observable per stage.

pub mod api;
pub mod audit;
pub mod cli;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod pose;
pub mod reporting;
pub mod scoring;
pub mod taxonomy;
pub mod video;
