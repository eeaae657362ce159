//! Mock entrypoint helpers shared by the contract test suites.
use concordium_std::test_infrastructure::MockFn;
use concordium_std::*;

/// Mock that parses the parameter as `D` and returns `return_value`.
pub fn parse_and_ok_mock<D: Deserial, S>(
    return_value: impl Clone + Serial + 'static,
) -> MockFn<S> {
    MockFn::new_v1(move |parameter, _amount, _balance, _state| {
        D::deserial(&mut Cursor::new(parameter.as_ref())).map_err(|_| CallContractError::Trap)?;
        Ok((false, return_value.clone()))
    })
}

/// Mock that parses the parameter as `D` and traps unless `check` accepts
/// it.
pub fn parse_and_check_mock<D: Deserial, S>(check: impl Fn(&D) -> bool + 'static) -> MockFn<S> {
    MockFn::new_v1(move |parameter, _, _, _state| {
        let value = D::deserial(&mut Cursor::new(parameter.as_ref()))
            .map_err(|_| CallContractError::Trap)?;
        if !check(&value) {
            return Err(CallContractError::Trap);
        };
        Ok((false, ()))
    })
}

/// Mock that traps on any invocation.
pub fn reject_mock<S>() -> MockFn<S> {
    MockFn::new_v1(|_, _, _, _| -> Result<(bool, ()), CallContractError<()>> {
        Err(CallContractError::Trap)
    })
}
