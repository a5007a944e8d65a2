mod index;
mod retrieve;
mod vectorizer;

pub use index::TrainingIndex;
pub use retrieve::{retrieve, CandidateIntent, Evidence, Retriever};
pub use vectorizer::{dot, terms, SparseVector, TfidfVectorizer, MAX_FEATURES};
