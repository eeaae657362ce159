use commons::*;
use concordium_cis1::*;
use concordium_std::*;

use crate::state::State;

/// Move the auctioned NFT from `from` to `to` by invoking the CIS-1
/// `transfer` entrypoint on the NFT contract. Any refusal by the NFT
/// contract, including a missing operator approval, surfaces as
/// `TransferFailed` and leaves this contract's state untouched.
pub fn transfer<S: HasStateApi>(
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    token: &Token,
    from: AccountAddress,
    to: AccountAddress,
) -> Result<(), CustomContractError> {
    let transfer = Transfer {
        token_id: token.id.clone(),
        amount: 1,
        from: Address::Account(from),
        to: Receiver::Account(to),
        data: AdditionalData::empty(),
    };

    host.invoke_contract(
        &token.contract,
        &(1u16, transfer),
        EntrypointName::new_unchecked("transfer"),
        Amount::zero(),
    )
    .map_err(|_| CustomContractError::TransferFailed)?;

    Ok(())
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use commons::test::*;
    use concordium_std::test_infrastructure::*;
    use core::marker::PhantomData;

    use crate::state::AuctionStatus;

    const SELLER: AccountAddress = AccountAddress([1u8; 32]);
    const WINNER: AccountAddress = AccountAddress([16u8; 32]);
    const NFT_CONTRACT: ContractAddress = ContractAddress {
        index: 1,
        subindex: 0,
    };

    fn token() -> Token {
        Token {
            contract: NFT_CONTRACT,
            id: TokenIdVec(vec![0, 1]),
        }
    }

    fn host() -> TestHost<State<TestStateApi>> {
        let state = State {
            seller: SELLER,
            token: token(),
            reserve_price: Amount::from_micro_ccd(30_000),
            open_window: Duration::from_millis(100),
            price_decrement: Amount::from_micro_ccd(10),
            start: Timestamp::from_timestamp_millis(0),
            status: AuctionStatus::Open,
            phantom_data: PhantomData,
        };
        TestHost::new(state, TestStateBuilder::new())
    }

    #[concordium_test]
    fn test_transfer_sends_single_token_to_winner() {
        let mut host = host();
        host.setup_mock_entrypoint(
            NFT_CONTRACT,
            OwnedEntrypointName::new_unchecked(String::from("transfer")),
            parse_and_check_mock::<TransferParams<TokenIdVec>, _>(|params| {
                params.0.len() == 1
                    && params.0[0].token_id == TokenIdVec(vec![0, 1])
                    && params.0[0].amount == 1
                    && params.0[0].from == Address::Account(SELLER)
                    && matches!(&params.0[0].to, Receiver::Account(account) if *account == WINNER)
            }),
        );

        let result = transfer(&mut host, &token(), SELLER, WINNER);
        claim_eq!(result, Ok(()));
    }

    #[concordium_test]
    fn test_transfer_refusal_is_transfer_failed() {
        let mut host = host();
        host.setup_mock_entrypoint(
            NFT_CONTRACT,
            OwnedEntrypointName::new_unchecked(String::from("transfer")),
            reject_mock(),
        );

        let result = transfer(&mut host, &token(), SELLER, WINNER);
        claim_eq!(result, Err(CustomContractError::TransferFailed));
    }
}
