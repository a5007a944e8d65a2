mod extract;
mod model;

pub use extract::extract_cases;
pub use model::Case;
