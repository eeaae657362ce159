use super::*;

/// The custom errors the contract can produce.
#[derive(Serialize, Debug, PartialEq, Eq, Reject, SchemaType)]
pub enum CustomContractError {
    /// Failed parsing the parameter (Error code: -1).
    #[from(ParseError)]
    ParseParams,
    /// Failed logging: Log is full (Error code: -2).
    LogFull,
    /// Failed logging: Log is malformed (Error code: -3).
    LogMalformed,
    /// Only account addresses can bid (Error code: -4).
    OnlyAccountAddress,
    /// Seller is not allowed to bid on their own auction (Error code: -5).
    SellerCannotBid,
    /// Auction is settled or the bidding window has elapsed (Error code: -6).
    AuctionEnded,
    /// Payment is below the current auction price (Error code: -7).
    BidTooLow,
    /// NFT contract refused or failed the ownership transfer (Error code: -8).
    TransferFailed,
    /// Auction parameters are malformed (Error code: -9).
    InvalidParameter,
}

/// Mapping the logging errors to CustomContractError.
impl From<LogError> for CustomContractError {
    fn from(le: LogError) -> Self {
        match le {
            LogError::Full => Self::LogFull,
            LogError::Malformed => Self::LogMalformed,
        }
    }
}
