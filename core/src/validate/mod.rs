mod post;

pub use post::{
    PostValidator, NEW_INTENT_CAP, OUT_OF_DOMAIN_KEYWORDS, OUT_OF_SCOPE_CONFIDENCE,
    SHORT_TRIGGER_WORDS, UNHANDLED_PARAMETER_CAP,
};
