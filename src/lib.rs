//! # Receipt Shelf-Life Engine
//!
//! Turns noisy, line-oriented OCR text from a photographed grocery receipt
//! into a clean list of identified food items, each tagged with a
//! confidence level, a category, and shelf-life guidance. OCR itself and
//! the HTTP serving layer are external collaborators; this crate is the
//! classification and matching core between them.

pub mod assembler;
pub mod confidence;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod food_table;
pub mod matcher;
pub mod noise_filter;
pub mod normalizer;
pub mod observability;
pub mod pipeline;

// Re-export types for easier access
pub use assembler::MatchedItem;
pub use confidence::Confidence;
pub use config::EngineConfig;
pub use errors::{AppError, AppResult};
pub use food_table::{load_food_table, FoodTable, ReferenceEntry, ShelfLife};
pub use matcher::MatchTier;
pub use pipeline::ReceiptPipeline;
