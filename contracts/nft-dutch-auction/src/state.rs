use commons::{CustomContractError, Token};
use concordium_std::*;
use core::marker::PhantomData;

/// Auction lifecycle. Settlement happens at most once; expiry is derived
/// from slot time on every bid rather than stored.
#[derive(Debug, Clone, Serialize, SchemaType, PartialEq, Eq)]
pub enum AuctionStatus {
    /// No bid has been accepted yet.
    Open,
    /// Sold to `winner` at `price`. Terminal.
    Settled {
        winner: AccountAddress,
        price: Amount,
    },
}

/// The contract state.
#[derive(Debug, Serial, DeserialWithState)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// Account that listed the NFT and receives the settlement proceeds.
    pub seller: AccountAddress,
    /// NFT being auctioned.
    pub token: Token,
    /// Price floor. The NFT is never sold below this amount.
    pub reserve_price: Amount,
    /// How long bids are accepted, counted from `start`.
    pub open_window: Duration,
    /// Amount the price falls per millisecond of slot time.
    pub price_decrement: Amount,
    /// Slot time the auction was created.
    pub start: Timestamp,
    /// Current lifecycle state.
    pub status: AuctionStatus,
    pub phantom_data: PhantomData<S>,
}

impl<S: HasStateApi> State<S> {
    /// Create a fresh auction state after validating the pricing
    /// parameters. The window and the decrement must be positive and the
    /// full price range must be representable in `Amount`.
    pub fn new(
        seller: AccountAddress,
        token: Token,
        reserve_price: Amount,
        open_window: Duration,
        price_decrement: Amount,
        start: Timestamp,
    ) -> Result<Self, CustomContractError> {
        ensure!(
            open_window > Duration::from_millis(0),
            CustomContractError::InvalidParameter
        );
        ensure!(
            price_decrement > Amount::zero(),
            CustomContractError::InvalidParameter
        );
        price_decrement
            .micro_ccd
            .checked_mul(open_window.millis())
            .and_then(|drop| drop.checked_add(reserve_price.micro_ccd))
            .ok_or(CustomContractError::InvalidParameter)?;

        Ok(Self {
            seller,
            token,
            reserve_price,
            open_window,
            price_decrement,
            start,
            status: AuctionStatus::Open,
            phantom_data: PhantomData,
        })
    }

    /// Price at auction creation: `reserve + window * decrement`.
    pub fn initial_price(&self) -> Amount {
        self.reserve_price + self.price_decrement * self.open_window.millis()
    }

    /// Time the bidding window has been open at `now`, clamped to zero
    /// before `start`.
    fn elapsed(&self, now: Timestamp) -> Duration {
        now.duration_since(self.start)
            .unwrap_or_else(|| Duration::from_millis(0))
    }

    /// Whether the bidding window has fully elapsed. The boundary is
    /// terminal: a bid arriving exactly `open_window` after `start` is
    /// already too late.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.elapsed(now) >= self.open_window
    }

    /// Price a bid must meet at `now`: the initial price reduced by
    /// `price_decrement` per elapsed millisecond, never below the
    /// reserve price.
    pub fn current_price(&self, now: Timestamp) -> Amount {
        let remaining = self
            .open_window
            .millis()
            .saturating_sub(self.elapsed(now).millis());
        self.reserve_price + self.price_decrement * remaining
    }

    /// Check a bid against the live auction and return the amount due on
    /// success. A settled auction and an elapsed window are the same
    /// observable outcome and take precedence over the price check, so a
    /// bid at the expiry boundary is rejected even though the price has
    /// reached the reserve.
    pub fn validate_bid(
        &self,
        bidder: &AccountAddress,
        amount: Amount,
        now: Timestamp,
    ) -> Result<Amount, CustomContractError> {
        ensure!(
            self.status == AuctionStatus::Open && !self.is_expired(now),
            CustomContractError::AuctionEnded
        );
        ensure!(
            bidder != &self.seller,
            CustomContractError::SellerCannotBid
        );
        let due = self.current_price(now);
        ensure!(amount >= due, CustomContractError::BidTooLow);
        Ok(due)
    }

    /// The single settlement transition. Records the winner and the
    /// final price; the auction is read-only afterwards.
    pub fn settle(&mut self, winner: AccountAddress, price: Amount) {
        self.status = AuctionStatus::Settled { winner, price };
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use concordium_cis1::TokenIdVec;
    use concordium_std::test_infrastructure::*;

    const SELLER: AccountAddress = AccountAddress([1u8; 32]);
    const BIDDER: AccountAddress = AccountAddress([16u8; 32]);

    const RESERVE_PRICE: Amount = Amount::from_micro_ccd(30_000);
    const PRICE_DECREMENT: Amount = Amount::from_micro_ccd(10);
    const OPEN_WINDOW_MILLIS: u64 = 100;
    const START_MILLIS: u64 = 1_000_000;

    fn token() -> Token {
        Token {
            contract: ContractAddress {
                index: 1,
                subindex: 0,
            },
            id: TokenIdVec(vec![0, 1]),
        }
    }

    fn at_elapsed(millis: u64) -> Timestamp {
        Timestamp::from_timestamp_millis(START_MILLIS + millis)
    }

    fn fresh_state() -> State<TestStateApi> {
        State::new(
            SELLER,
            token(),
            RESERVE_PRICE,
            Duration::from_millis(OPEN_WINDOW_MILLIS),
            PRICE_DECREMENT,
            Timestamp::from_timestamp_millis(START_MILLIS),
        )
        .expect_report("Valid parameters should be accepted")
    }

    #[concordium_test]
    fn test_new_rejects_zero_window() {
        let result: Result<State<TestStateApi>, _> = State::new(
            SELLER,
            token(),
            RESERVE_PRICE,
            Duration::from_millis(0),
            PRICE_DECREMENT,
            Timestamp::from_timestamp_millis(START_MILLIS),
        );
        match result {
            Ok(_) => fail!("A zero open window should be rejected"),
            Err(error) => claim_eq!(error, CustomContractError::InvalidParameter),
        }
    }

    #[concordium_test]
    fn test_new_rejects_zero_decrement() {
        let result: Result<State<TestStateApi>, _> = State::new(
            SELLER,
            token(),
            RESERVE_PRICE,
            Duration::from_millis(OPEN_WINDOW_MILLIS),
            Amount::zero(),
            Timestamp::from_timestamp_millis(START_MILLIS),
        );
        match result {
            Ok(_) => fail!("A zero price decrement should be rejected"),
            Err(error) => claim_eq!(error, CustomContractError::InvalidParameter),
        }
    }

    #[concordium_test]
    fn test_new_rejects_price_overflow() {
        let result: Result<State<TestStateApi>, _> = State::new(
            SELLER,
            token(),
            Amount::from_micro_ccd(u64::MAX),
            Duration::from_millis(OPEN_WINDOW_MILLIS),
            PRICE_DECREMENT,
            Timestamp::from_timestamp_millis(START_MILLIS),
        );
        match result {
            Ok(_) => fail!("An unrepresentable initial price should be rejected"),
            Err(error) => claim_eq!(error, CustomContractError::InvalidParameter),
        }
    }

    #[concordium_test]
    fn test_price_decays_to_reserve() {
        let state = fresh_state();

        claim_eq!(state.initial_price(), Amount::from_micro_ccd(31_000));
        claim_eq!(state.current_price(at_elapsed(0)), Amount::from_micro_ccd(31_000));
        claim_eq!(state.current_price(at_elapsed(1)), Amount::from_micro_ccd(30_990));
        claim_eq!(state.current_price(at_elapsed(50)), Amount::from_micro_ccd(30_500));
        claim_eq!(state.current_price(at_elapsed(99)), Amount::from_micro_ccd(30_010));
        claim_eq!(state.current_price(at_elapsed(100)), RESERVE_PRICE);
        claim_eq!(state.current_price(at_elapsed(200)), RESERVE_PRICE);
    }

    #[concordium_test]
    fn test_price_is_monotonically_non_increasing() {
        let state = fresh_state();

        let mut previous = state.initial_price();
        for elapsed in 0..=2 * OPEN_WINDOW_MILLIS {
            let price = state.current_price(at_elapsed(elapsed));
            claim!(price <= previous, "Price must never increase");
            claim!(price >= RESERVE_PRICE, "Price must never drop below the reserve");
            previous = price;
        }
    }

    #[concordium_test]
    fn test_price_before_start_is_initial() {
        let state = fresh_state();
        let before_start = Timestamp::from_timestamp_millis(START_MILLIS - 10);

        claim!(!state.is_expired(before_start));
        claim_eq!(state.current_price(before_start), state.initial_price());
    }

    #[concordium_test]
    fn test_expiry_boundary() {
        let state = fresh_state();

        claim!(!state.is_expired(at_elapsed(99)));
        claim!(state.is_expired(at_elapsed(100)));
        claim!(state.is_expired(at_elapsed(200)));
    }

    #[concordium_test]
    fn test_validate_bid_expired_before_price() {
        let state = fresh_state();

        // The window elapsed, so even an enormous payment is too late.
        let result = state.validate_bid(&BIDDER, Amount::from_micro_ccd(1_000_000), at_elapsed(100));
        claim_eq!(result, Err(CustomContractError::AuctionEnded));
    }

    #[concordium_test]
    fn test_validate_bid_seller_rejected() {
        let state = fresh_state();

        let result = state.validate_bid(&SELLER, Amount::from_micro_ccd(1_000_000), at_elapsed(0));
        claim_eq!(result, Err(CustomContractError::SellerCannotBid));
    }

    #[concordium_test]
    fn test_validate_bid_too_low() {
        let state = fresh_state();

        let result = state.validate_bid(&BIDDER, Amount::from_micro_ccd(100), at_elapsed(0));
        claim_eq!(result, Err(CustomContractError::BidTooLow));
    }

    #[concordium_test]
    fn test_validate_bid_at_price_succeeds() {
        let state = fresh_state();

        let result = state.validate_bid(&BIDDER, Amount::from_micro_ccd(30_500), at_elapsed(50));
        claim_eq!(result, Ok(Amount::from_micro_ccd(30_500)));
    }

    #[concordium_test]
    fn test_settled_auction_rejects_bids() {
        let mut state = fresh_state();
        state.settle(BIDDER, Amount::from_micro_ccd(31_000));

        claim_eq!(
            state.status,
            AuctionStatus::Settled {
                winner: BIDDER,
                price: Amount::from_micro_ccd(31_000),
            }
        );
        let result = state.validate_bid(&BIDDER, Amount::from_micro_ccd(1_000_000), at_elapsed(1));
        claim_eq!(result, Err(CustomContractError::AuctionEnded));
    }
}
