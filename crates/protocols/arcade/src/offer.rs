//! Structured offer builder
//!
//! Turns validated economics plus a target (existing loan, single asset,
//! vault, or whole collection) into the loan terms that get signed. Two shapes
//! exist: direct terms carrying a `collateralId`, and collection terms carrying
//! exactly one collateral predicate instead.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolValue;
use arcade_client::ApiLoan;
use lender_core::constants::SECONDS_PER_MINUTE;
use lender_core::{OfferError, OfferKind, Side, UnixSeconds};
use num_bigint::BigUint;

use crate::calculator::OfferEconomics;
use crate::constants::{Currency, COLLECTION_OFFER_VERIFIER, VAULT_FACTORY};

/// What the lender's collateral is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collateral {
    /// A single token of a collection
    Asset { address: Address, id: U256 },
    /// A vault, identified by its token id on the vault factory
    Vault { vault_id: U256 },
}

impl Collateral {
    /// Collateral from an entered address and id. An address equal to the
    /// vault factory means the id is a vault id.
    pub fn parse(address: &str, id: &str) -> Result<Self, OfferError> {
        let address = parse_address("collateralAddress", address)?;
        let id = parse_collateral_id(id)?;
        Ok(Self::from_parts(address, id))
    }

    pub fn from_parts(address: Address, id: U256) -> Self {
        if address == VAULT_FACTORY {
            Self::Vault { vault_id: id }
        } else {
            Self::Asset { address, id }
        }
    }

    /// Address signed as `collateralAddress`
    pub fn signed_address(&self) -> Address {
        match self {
            Self::Asset { address, .. } => *address,
            Self::Vault { .. } => VAULT_FACTORY,
        }
    }

    pub fn id(&self) -> U256 {
        match self {
            Self::Asset { id, .. } => *id,
            Self::Vault { vault_id } => *vault_id,
        }
    }

    pub fn is_vault(&self) -> bool {
        matches!(self, Self::Vault { .. })
    }
}

/// What the offer is made against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferTarget {
    /// Extension offer on an existing loan
    Loan { loan_id: String, collateral: Collateral },
    /// A specific asset or vault
    Direct(Collateral),
    /// Any token of a collection
    Collection(Address),
}

impl OfferTarget {
    pub fn kind(&self) -> OfferKind {
        match self {
            Self::Loan { .. } => OfferKind::Loan,
            Self::Direct(Collateral::Asset { .. }) => OfferKind::Asset,
            Self::Direct(Collateral::Vault { .. }) => OfferKind::Vault,
            Self::Collection(_) => OfferKind::Collection,
        }
    }
}

/// Collateral-matching predicate evaluated by the verifier contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub data: Bytes,
    pub verifier: Address,
}

impl Predicate {
    /// Predicate matching any token of `collection`
    pub fn for_collection(collection: Address) -> Self {
        Self {
            data: Bytes::from(collection.abi_encode()),
            verifier: COLLECTION_OFFER_VERIFIER,
        }
    }
}

/// Fields shared by both term shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreTerms {
    pub prorated_interest_rate: U256,
    pub principal: U256,
    pub collateral_address: Address,
    pub duration_secs: u64,
    pub payable_currency: Address,
    pub deadline: UnixSeconds,
    pub affiliate_code: B256,
    pub nonce: u64,
    pub side: Side,
}

/// Direct loan terms (single asset or vault)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanTerms {
    pub core: CoreTerms,
    pub collateral_id: U256,
}

/// Collection-wide offer terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionOfferTerms {
    pub core: CoreTerms,
    pub items: Vec<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferTerms {
    Direct(LoanTerms),
    Collection(CollectionOfferTerms),
}

impl OfferTerms {
    pub fn core(&self) -> &CoreTerms {
        match self {
            Self::Direct(t) => &t.core,
            Self::Collection(t) => &t.core,
        }
    }
}

/// Everything needed to build one offer
#[derive(Debug, Clone)]
pub struct OfferRequest {
    pub target: OfferTarget,
    pub currency: &'static Currency,
    pub economics: OfferEconomics,
    pub deadline: UnixSeconds,
    pub nonce: u64,
    pub side: Side,
}

/// Built, unsigned offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltOffer {
    pub kind: OfferKind,
    pub terms: OfferTerms,
    /// Reported as `collectionId` on submission
    pub collection_id: Address,
}

/// Build the terms for an offer, validating them against `now`
pub fn build_offer(request: &OfferRequest, now: UnixSeconds) -> Result<BuiltOffer, OfferError> {
    if request.deadline <= now {
        return Err(OfferError::DeadlineExpired {
            deadline: request.deadline,
            now,
        });
    }
    if request.economics.duration_secs == 0 {
        return Err(OfferError::InvalidDuration { days: 0 });
    }

    let principal = to_u256("principal", &request.economics.principal)?;
    if principal.is_zero() {
        return Err(OfferError::InvalidAmount {
            field: "principal",
            message: "principal must be positive".to_string(),
        });
    }
    let prorated_interest_rate = to_u256("proratedInterestRate", &request.economics.interest_rate)?;

    let core = |collateral_address: Address| CoreTerms {
        prorated_interest_rate,
        principal,
        collateral_address,
        duration_secs: request.economics.duration_secs,
        payable_currency: request.currency.address,
        deadline: request.deadline,
        affiliate_code: B256::ZERO,
        nonce: request.nonce,
        side: request.side,
    };

    let (terms, collection_id) = match &request.target {
        OfferTarget::Loan { collateral, .. } | OfferTarget::Direct(collateral) => {
            let address = collateral.signed_address();
            let terms = OfferTerms::Direct(LoanTerms {
                core: core(address),
                collateral_id: collateral.id(),
            });
            (terms, address)
        }
        OfferTarget::Collection(collection) => {
            let terms = OfferTerms::Collection(CollectionOfferTerms {
                core: core(*collection),
                items: vec![Predicate::for_collection(*collection)],
            });
            (terms, *collection)
        }
    };

    let kind = request.target.kind();
    tracing::debug!(
        kind = %kind,
        collection = %collection_id,
        principal = %principal,
        deadline = request.deadline,
        nonce = request.nonce,
        "Built offer terms"
    );

    Ok(BuiltOffer {
        kind,
        terms,
        collection_id,
    })
}

/// Resolve the collateral of an existing loan for an extension offer
pub fn resolve_loan_collateral(loans: &[ApiLoan], loan_id: &str) -> Result<Collateral, OfferError> {
    let loan = loans
        .iter()
        .find(|l| l.loan_id == loan_id.trim())
        .ok_or_else(|| OfferError::LoanNotFound {
            loan_id: loan_id.to_string(),
        })?;

    let id = loan.collateral_id.as_deref().ok_or_else(|| OfferError::InvalidAmount {
        field: "collateralId",
        message: format!("loan {} has no collateral id", loan.loan_id),
    })?;
    let id = parse_collateral_id(id)?;

    if loan.vault_address.is_some() {
        return Ok(Collateral::Vault { vault_id: id });
    }

    let address = parse_address("collateralAddress", &loan.collateral_address)?;
    Ok(Collateral::from_parts(address, id))
}

/// Deadline for a bid lifetime starting at `now`
pub fn deadline_from_lifetime(now: UnixSeconds, lifetime_minutes: u64) -> UnixSeconds {
    now + lifetime_minutes * SECONDS_PER_MINUTE
}

pub fn parse_address(field: &'static str, value: &str) -> Result<Address, OfferError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|_| OfferError::InvalidAddress {
            field,
            value: value.to_string(),
        })
}

/// Direct collateral ids are non-negative decimal integers
pub fn parse_collateral_id(value: &str) -> Result<U256, OfferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(OfferError::InvalidAmount {
            field: "collateralId",
            message: format!("{:?} is not a non-negative integer", value),
        });
    }
    U256::from_str_radix(trimmed, 10).map_err(|e| OfferError::InvalidAmount {
        field: "collateralId",
        message: e.to_string(),
    })
}

fn to_u256(field: &'static str, value: &BigUint) -> Result<U256, OfferError> {
    U256::try_from_be_slice(&value.to_bytes_be()).ok_or_else(|| OfferError::InvalidAmount {
        field,
        message: format!("{} does not fit in 256 bits", value),
    })
}
