/// Tag for the Custom Settle event.
pub const SETTLE_TAG: u8 = u8::MAX - 5;
