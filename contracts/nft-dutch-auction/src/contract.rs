use commons::CustomContractError;
use concordium_std::*;

use crate::events::*;
use crate::external::*;
use crate::nft;
use crate::state::State;

/// Initialize the auction. The account creating the contract becomes the
/// seller. The starting price is `reserve_price + open_window *
/// price_decrement` and starts falling immediately.
///
/// The NFT itself is not moved here. The seller must separately make
/// this contract an operator on the NFT contract, otherwise settlement
/// fails and bids are rejected with `TransferFailed`.
#[init(contract = "NftDutchAuction", parameter = "InitParams")]
fn contract_init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    _state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    let params = InitParams::deserial(&mut ctx.parameter_cursor())?;
    let state = State::new(
        ctx.init_origin(),
        params.token,
        params.reserve_price,
        params.open_window,
        params.price_decrement,
        ctx.metadata().slot_time(),
    )?;
    Ok(state)
}

/// Attempt to buy the NFT at the current price. The attached payment is
/// the bid. The first sufficient bid settles the auction in one step:
/// the NFT moves from the seller to the bidder, the seller is paid the
/// current price and any overpayment is returned to the bidder. Any
/// rejection reverts the whole invocation, returning the payment.
#[receive(
    mutable,
    payable,
    contract = "NftDutchAuction",
    name = "bid",
    return_value = "SettlementReceipt",
    enable_logger
)]
fn contract_bid<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ReceiveResult<SettlementReceipt> {
    let bidder = if let Address::Account(bidder) = ctx.sender() {
        bidder
    } else {
        bail!(CustomContractError::OnlyAccountAddress.into());
    };

    let now = ctx.metadata().slot_time();
    let due = host.state().validate_bid(&bidder, amount, now)?;
    let refund = amount - due;
    let seller = host.state().seller;
    let token = host.state().token.clone();

    // Move the NFT first. If the NFT contract refuses, the auction
    // stays open and a later bid can still win.
    nft::transfer(host, &token, seller, bidder)?;

    host.invoke_transfer(&seller, due)?;
    if refund > Amount::zero() {
        host.invoke_transfer(&bidder, refund)?;
    }

    host.state_mut().settle(bidder, due);

    logger.log(&AuctionEvent::settle(&token, &seller, &bidder, due, refund))?;

    Ok(SettlementReceipt {
        winner: bidder,
        price: due,
    })
}

/// Get the full auction state.
#[receive(contract = "NftDutchAuction", name = "view", return_value = "ViewResult")]
fn contract_view<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<ViewResult> {
    let state = host.state();
    Ok(ViewResult {
        seller: state.seller,
        token: state.token.clone(),
        reserve_price: state.reserve_price,
        open_window: state.open_window,
        price_decrement: state.price_decrement,
        start: state.start,
        status: state.status.clone(),
    })
}

/// Get the price a bid would have to meet right now. After the window
/// has elapsed this is the reserve price, even though bids are no
/// longer accepted.
#[receive(
    contract = "NftDutchAuction",
    name = "viewCurrentPrice",
    return_value = "Amount"
)]
fn contract_view_current_price<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Amount> {
    Ok(host.state().current_price(ctx.metadata().slot_time()))
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use crate::state::AuctionStatus;
    use commons::test::*;
    use commons::*;
    use concordium_cis1::*;
    use concordium_std::test_infrastructure::*;

    const SELLER: AccountAddress = AccountAddress([1u8; 32]);
    const BIDDER_1: AccountAddress = AccountAddress([16u8; 32]);
    const BIDDER_2: AccountAddress = AccountAddress([17u8; 32]);
    const NFT_CONTRACT: ContractAddress = ContractAddress {
        index: 1,
        subindex: 0,
    };
    const OTHER_CONTRACT: ContractAddress = ContractAddress {
        index: 5,
        subindex: 0,
    };

    const RESERVE_PRICE: Amount = Amount::from_micro_ccd(30_000);
    const PRICE_DECREMENT: Amount = Amount::from_micro_ccd(10);
    const OPEN_WINDOW_MILLIS: u64 = 100;
    const START_MILLIS: u64 = 1_000_000;

    fn token() -> Token {
        Token {
            contract: NFT_CONTRACT,
            id: TokenIdVec(vec![0, 1]),
        }
    }

    fn auction_params() -> InitParams {
        InitParams {
            token: token(),
            reserve_price: RESERVE_PRICE,
            open_window: Duration::from_millis(OPEN_WINDOW_MILLIS),
            price_decrement: PRICE_DECREMENT,
        }
    }

    fn start_time() -> Timestamp {
        Timestamp::from_timestamp_millis(START_MILLIS)
    }

    fn at_elapsed(millis: u64) -> Timestamp {
        Timestamp::from_timestamp_millis(START_MILLIS + millis)
    }

    fn default_host() -> TestHost<State<TestStateApi>> {
        let params_bytes = to_bytes(&auction_params());
        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(SELLER)
            .set_parameter(&params_bytes)
            .set_metadata_slot_time(start_time());

        let mut state_builder = TestStateBuilder::new();
        let state =
            contract_init(&ctx, &mut state_builder).expect_report("Auction init should succeed");
        TestHost::new(state, state_builder)
    }

    fn bid_ctx(sender: AccountAddress, elapsed_millis: u64) -> TestReceiveContext<'static> {
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(sender))
            .set_invoker(sender)
            .set_metadata_slot_time(at_elapsed(elapsed_millis));
        ctx
    }

    fn mock_nft_transfer(host: &mut TestHost<State<TestStateApi>>, winner: AccountAddress) {
        host.setup_mock_entrypoint(
            NFT_CONTRACT,
            OwnedEntrypointName::new_unchecked(String::from("transfer")),
            parse_and_check_mock::<TransferParams<TokenIdVec>, _>(move |params| {
                params.0.len() == 1
                    && params.0[0].token_id == TokenIdVec(vec![0, 1])
                    && params.0[0].amount == 1
                    && params.0[0].from == Address::Account(SELLER)
                    && matches!(&params.0[0].to, Receiver::Account(account) if *account == winner)
            }),
        );
    }

    #[concordium_test]
    fn test_init_stores_auction_parameters() {
        let host = default_host();
        let state = host.state();

        claim_eq!(state.seller, SELLER);
        claim_eq!(state.token, token());
        claim_eq!(state.reserve_price, RESERVE_PRICE);
        claim_eq!(state.open_window, Duration::from_millis(OPEN_WINDOW_MILLIS));
        claim_eq!(state.price_decrement, PRICE_DECREMENT);
        claim_eq!(state.start, start_time());
        claim_eq!(state.status, AuctionStatus::Open);
        claim_eq!(state.initial_price(), Amount::from_micro_ccd(31_000));
    }

    #[concordium_test]
    fn test_init_rejects_zero_window() {
        let params_bytes = to_bytes(&InitParams {
            open_window: Duration::from_millis(0),
            ..auction_params()
        });
        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(SELLER)
            .set_parameter(&params_bytes)
            .set_metadata_slot_time(start_time());

        let mut state_builder = TestStateBuilder::new();
        match contract_init::<TestStateApi>(&ctx, &mut state_builder) {
            Ok(_) => fail!("A zero open window should be rejected"),
            Err(error) => claim_eq!(error, CustomContractError::InvalidParameter.into()),
        }
    }

    #[concordium_test]
    fn test_init_rejects_zero_decrement() {
        let params_bytes = to_bytes(&InitParams {
            price_decrement: Amount::zero(),
            ..auction_params()
        });
        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(SELLER)
            .set_parameter(&params_bytes)
            .set_metadata_slot_time(start_time());

        let mut state_builder = TestStateBuilder::new();
        match contract_init::<TestStateApi>(&ctx, &mut state_builder) {
            Ok(_) => fail!("A zero price decrement should be rejected"),
            Err(error) => claim_eq!(error, CustomContractError::InvalidParameter.into()),
        }
    }

    #[concordium_test]
    fn test_bid_settles_with_refund() {
        let mut host = default_host();
        mock_nft_transfer(&mut host, BIDDER_1);
        let payment = Amount::from_micro_ccd(50_000);
        host.set_self_balance(payment);

        let mut logger = TestLogger::init();
        let ctx = bid_ctx(BIDDER_1, 0);

        let receipt = contract_bid(&ctx, &mut host, payment, &mut logger)
            .expect_report("Sufficient bid should settle the auction");

        claim_eq!(
            receipt,
            SettlementReceipt {
                winner: BIDDER_1,
                price: Amount::from_micro_ccd(31_000),
            }
        );
        claim!(host.transfer_occurred(&SELLER, Amount::from_micro_ccd(31_000)));
        claim!(host.transfer_occurred(&BIDDER_1, Amount::from_micro_ccd(19_000)));
        claim_eq!(host.self_balance(), Amount::zero());
        claim_eq!(
            host.state().status,
            AuctionStatus::Settled {
                winner: BIDDER_1,
                price: Amount::from_micro_ccd(31_000),
            }
        );

        claim_eq!(logger.logs.len(), 1);
        claim_eq!(
            logger.logs[0],
            to_bytes(&AuctionEvent::settle(
                &token(),
                &SELLER,
                &BIDDER_1,
                Amount::from_micro_ccd(31_000),
                Amount::from_micro_ccd(19_000),
            ))
        );
    }

    #[concordium_test]
    fn test_bid_exact_payment_no_refund() {
        let mut host = default_host();
        mock_nft_transfer(&mut host, BIDDER_1);
        let payment = Amount::from_micro_ccd(30_600);
        host.set_self_balance(payment);

        let mut logger = TestLogger::init();
        let ctx = bid_ctx(BIDDER_1, 40);

        let receipt = contract_bid(&ctx, &mut host, payment, &mut logger)
            .expect_report("Exact bid should settle the auction");

        claim_eq!(receipt.price, Amount::from_micro_ccd(30_600));
        claim!(host.transfer_occurred(&SELLER, Amount::from_micro_ccd(30_600)));
        claim_eq!(host.self_balance(), Amount::zero());
    }

    #[concordium_test]
    fn test_bid_below_price_rejected() {
        let mut host = default_host();
        mock_nft_transfer(&mut host, BIDDER_1);
        let mut logger = TestLogger::init();
        let ctx = bid_ctx(BIDDER_1, 0);

        let result = contract_bid(&ctx, &mut host, Amount::from_micro_ccd(100), &mut logger);
        claim_eq!(result, Err(CustomContractError::BidTooLow.into()));
        claim_eq!(host.state().status, AuctionStatus::Open);
    }

    #[concordium_test]
    fn test_bid_by_seller_rejected() {
        let mut host = default_host();
        mock_nft_transfer(&mut host, SELLER);
        let mut logger = TestLogger::init();
        let ctx = bid_ctx(SELLER, 0);

        let result = contract_bid(&ctx, &mut host, Amount::from_micro_ccd(50_000), &mut logger);
        claim_eq!(result, Err(CustomContractError::SellerCannotBid.into()));
    }

    #[concordium_test]
    fn test_bid_after_window_rejected() {
        let mut host = default_host();
        mock_nft_transfer(&mut host, BIDDER_1);
        let mut logger = TestLogger::init();

        // The boundary itself already counts as elapsed.
        for elapsed in [OPEN_WINDOW_MILLIS, 2 * OPEN_WINDOW_MILLIS] {
            let ctx = bid_ctx(BIDDER_1, elapsed);
            let result =
                contract_bid(&ctx, &mut host, Amount::from_micro_ccd(50_000), &mut logger);
            claim_eq!(result, Err(CustomContractError::AuctionEnded.into()));
        }
    }

    #[concordium_test]
    fn test_second_bid_after_settlement_rejected() {
        let mut host = default_host();
        mock_nft_transfer(&mut host, BIDDER_1);
        let payment = Amount::from_micro_ccd(31_000);
        host.set_self_balance(payment);

        let mut logger = TestLogger::init();
        let ctx = bid_ctx(BIDDER_1, 0);
        contract_bid(&ctx, &mut host, payment, &mut logger)
            .expect_report("First bid should settle the auction");

        let ctx = bid_ctx(BIDDER_2, 10);
        let result = contract_bid(&ctx, &mut host, Amount::from_micro_ccd(50_000), &mut logger);
        claim_eq!(result, Err(CustomContractError::AuctionEnded.into()));
    }

    #[concordium_test]
    fn test_bid_from_contract_rejected() {
        let mut host = default_host();
        let mut logger = TestLogger::init();
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Contract(OTHER_CONTRACT))
            .set_invoker(BIDDER_1)
            .set_metadata_slot_time(at_elapsed(0));

        let result = contract_bid(&ctx, &mut host, Amount::from_micro_ccd(50_000), &mut logger);
        claim_eq!(result, Err(CustomContractError::OnlyAccountAddress.into()));
    }

    #[concordium_test]
    fn test_failed_nft_transfer_keeps_auction_open() {
        let mut host = default_host();
        host.setup_mock_entrypoint(
            NFT_CONTRACT,
            OwnedEntrypointName::new_unchecked(String::from("transfer")),
            reject_mock(),
        );
        let payment = Amount::from_micro_ccd(50_000);
        host.set_self_balance(payment);

        let mut logger = TestLogger::init();
        let ctx = bid_ctx(BIDDER_1, 0);

        let result = contract_bid(&ctx, &mut host, payment, &mut logger);
        claim_eq!(result, Err(CustomContractError::TransferFailed.into()));
        claim_eq!(host.state().status, AuctionStatus::Open);
        claim_eq!(logger.logs.len(), 0);

        // Once the operator approval is in place a later bid wins.
        mock_nft_transfer(&mut host, BIDDER_2);
        let ctx = bid_ctx(BIDDER_2, 50);
        let receipt = contract_bid(&ctx, &mut host, payment, &mut logger)
            .expect_report("Bid should settle once the NFT transfer succeeds");
        claim_eq!(receipt.price, Amount::from_micro_ccd(30_500));
    }

    #[concordium_test]
    fn test_view_reports_full_state() {
        let host = default_host();
        let mut ctx = TestReceiveContext::empty();
        ctx.set_metadata_slot_time(at_elapsed(0));

        let view = contract_view(&ctx, &host).expect_report("View should succeed");
        claim_eq!(
            view,
            ViewResult {
                seller: SELLER,
                token: token(),
                reserve_price: RESERVE_PRICE,
                open_window: Duration::from_millis(OPEN_WINDOW_MILLIS),
                price_decrement: PRICE_DECREMENT,
                start: start_time(),
                status: AuctionStatus::Open,
            }
        );
    }

    #[concordium_test]
    fn test_view_current_price_follows_decay() {
        let host = default_host();

        let mut ctx = TestReceiveContext::empty();
        ctx.set_metadata_slot_time(at_elapsed(50));
        let price =
            contract_view_current_price(&ctx, &host).expect_report("Price view should succeed");
        claim_eq!(price, Amount::from_micro_ccd(30_500));

        let mut ctx = TestReceiveContext::empty();
        ctx.set_metadata_slot_time(at_elapsed(500));
        let price =
            contract_view_current_price(&ctx, &host).expect_report("Price view should succeed");
        claim_eq!(price, RESERVE_PRICE);
    }
}
