//! # Implementation of a Dutch auction smart contract
//!
//! A descending price auction for a single CIS-1 NFT. The account that
//! initializes the contract becomes the seller and fixes a reserve price,
//! a bidding window and a price decrement. The price starts at
//! `reserve + window * decrement` and falls linearly with elapsed slot
//! time until it reaches the reserve price at the end of the window.
//!
//! The first account to send a payment covering the current price wins:
//! the NFT is transferred from the seller to the winner, the seller
//! receives exactly the current price and any overpayment is returned to
//! the winner. Every later bid is rejected, as is any bid once the
//! window has elapsed.
//!
//! The NFT stays with the seller while the auction is open. The seller
//! must make this contract an operator on the NFT contract before a bid
//! can settle; until then bids fail with `TransferFailed` and the
//! auction remains open.
#![cfg_attr(not(feature = "std"), no_std)]

mod contract;
mod events;
mod external;
mod nft;
mod state;
