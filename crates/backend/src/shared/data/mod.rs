pub mod dataset;
pub mod dataset_cache;
