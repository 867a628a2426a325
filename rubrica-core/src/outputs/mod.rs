pub mod analytics;
pub mod flatten;
pub mod serialization;
// Re-export for easy access
pub use analytics::{AreaProfile, DescriptorStats};
pub use flatten::get_flattened_sections;
pub use serialization::FlatDocument;
