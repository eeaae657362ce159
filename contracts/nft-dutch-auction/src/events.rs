use commons::*;
use concordium_std::*;

/// An untagged event of an auction being settled.
/// For a tagged version, use `AuctionEvent`.
#[derive(Debug, Serial)]
pub struct SettleEvent<'a> {
    /// NFT contract the sold token lives on.
    pub contract: &'a ContractAddress,
    /// Id of the sold token.
    pub id: &'a ContractTokenId,
    /// Account that received the proceeds.
    pub seller: &'a AccountAddress,
    /// Account that won the auction.
    pub winner: &'a AccountAddress,
    /// Price the winner paid.
    pub price: Amount,
    /// Overpayment returned to the winner.
    pub refund: Amount,
}

/// Tagged auction event to be serialized for the event log.
#[derive(Debug)]
pub enum AuctionEvent<'a> {
    Settle(SettleEvent<'a>),
}

impl<'a> AuctionEvent<'a> {
    pub fn settle(
        token: &'a Token,
        seller: &'a AccountAddress,
        winner: &'a AccountAddress,
        price: Amount,
        refund: Amount,
    ) -> Self {
        Self::Settle(SettleEvent {
            contract: &token.contract,
            id: &token.id,
            seller,
            winner,
            price,
            refund,
        })
    }
}

impl<'a> Serial for AuctionEvent<'a> {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            AuctionEvent::Settle(event) => {
                out.write_u8(SETTLE_TAG)?;
                event.serial(out)
            }
        }
    }
}
