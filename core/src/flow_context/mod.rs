mod flow;

pub use flow::{
    is_specific_flow, ContextEntry, FlowContextResolver, FlowRef, CHIT_FLOW, NO_MATCH_FLOW,
    UNKNOWN_FLOW,
};
