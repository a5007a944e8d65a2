mod slot;

pub use slot::{detect_slot_signals, slot_rules, SlotRule, SlotSignal};
