use commons::Token;
use concordium_std::*;

use crate::state::AuctionStatus;

/// Parameters the seller supplies when creating the auction.
#[derive(Debug, Serialize, SchemaType)]
pub struct InitParams {
    /// NFT to sell.
    pub token: Token,
    /// Price floor reached at the end of the bidding window.
    pub reserve_price: Amount,
    /// Length of the bidding window.
    pub open_window: Duration,
    /// Amount the price falls per millisecond of slot time.
    pub price_decrement: Amount,
}

/// Full auction snapshot returned by the `view` entrypoint.
#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct ViewResult {
    pub seller: AccountAddress,
    pub token: Token,
    pub reserve_price: Amount,
    pub open_window: Duration,
    pub price_decrement: Amount,
    pub start: Timestamp,
    pub status: AuctionStatus,
}

/// Returned to the winning bidder when their bid settles the auction.
#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct SettlementReceipt {
    /// Account the NFT was transferred to.
    pub winner: AccountAddress,
    /// Price actually paid. Overpayment beyond this was refunded.
    pub price: Amount,
}
