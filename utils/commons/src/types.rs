use super::*;

/// Contract token ID type. Token IDs of any length are accepted.
pub type ContractTokenId = TokenIdVec;
