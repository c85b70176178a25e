//! Arcade V3 Lending Implementation
//!
//! Arcade is an NFT-collateralized lending protocol with an off-chain order
//! book. Lenders sign typed-data loan terms against a single asset, a vault,
//! an existing loan, or a whole collection, and post them to the order book;
//! borrowers accept on-chain. This crate computes offer economics, builds and
//! signs the terms, and scans active loans approaching maturity.

pub mod calculator;
pub mod catalog;
pub mod constants;
pub mod currency;
pub mod nonce;
pub mod offer;
pub mod report;
pub mod scanner;
pub mod signer;
pub mod state;
pub mod submit;
pub mod typed_data;

pub use calculator::{
    calculate_apr, calculate_interest_rate, calculate_repayment_amount, validate_duration_days,
    OfferEconomics,
};
pub use catalog::{collection_name, filter_listings, verified_collections, CollectionEntry};
pub use constants::{Currency, BID_LIFETIME_PRESETS, SUPPORTED_CURRENCIES};
pub use currency::{find_by_address, find_by_code, to_human_amount, to_protocol_amount};
pub use nonce::{next_nonce, unix_now, NonceGenerator};
pub use offer::{
    build_offer, deadline_from_lifetime, resolve_loan_collateral, BuiltOffer, Collateral,
    OfferRequest, OfferTarget, OfferTerms,
};
pub use report::{render_due_soon_report, render_listings_report, report_file_name, write_report};
pub use scanner::{scan_due_soon, LoanSource, Pacer, PriceSource, RateSource, TokioPacer};
pub use signer::{LocalSigner, OfferSignature, OfferSigner};
pub use state::EnhancedLoan;
pub use submit::{place_offer, sign_offer, to_submission, OrderBook};
pub use typed_data::Domain;
