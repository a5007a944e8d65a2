mod catalog;

pub use catalog::{TrainingCatalog, TrainingPhrase, TrainingRecord};
