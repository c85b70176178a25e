//! Offer submission: wire mapping and the sign-and-post flow

use std::future::Future;

use arcade_client::{ArcadeClient, LoanTermsSubmission, WireLoanTerms, WirePredicate};
use lender_core::{ApiError, Error};

use crate::constants::{COLLECTION_OFFER_COLLATERAL_ID, ZERO_BYTES32};
use crate::offer::{BuiltOffer, OfferTerms};
use crate::signer::{self, OfferSignature, OfferSigner};
use crate::typed_data::{self, Domain};

/// Destination for signed loan terms
pub trait OrderBook {
    fn submit_loan_terms(
        &self,
        submission: &LoanTermsSubmission,
    ) -> impl Future<Output = Result<serde_json::Value, ApiError>> + Send;
}

impl OrderBook for ArcadeClient {
    fn submit_loan_terms(
        &self,
        submission: &LoanTermsSubmission,
    ) -> impl Future<Output = Result<serde_json::Value, ApiError>> + Send {
        ArcadeClient::submit_loan_terms(self, submission)
    }
}

/// Map a signed offer to the order-book request body
pub fn to_submission(offer: &BuiltOffer, signature: &OfferSignature) -> LoanTermsSubmission {
    let core = offer.terms.core();

    let (collateral_id, item_predicates) = match &offer.terms {
        OfferTerms::Direct(terms) => (terms.collateral_id.to_string(), None),
        OfferTerms::Collection(terms) => {
            let predicates = terms
                .items
                .iter()
                .map(|p| WirePredicate {
                    data: format!("0x{}", hex::encode(&p.data)),
                    verifier: p.verifier.to_string(),
                })
                .collect();
            (COLLECTION_OFFER_COLLATERAL_ID.to_string(), Some(predicates))
        }
    };

    LoanTermsSubmission {
        loan_terms: WireLoanTerms {
            duration_secs: core.duration_secs,
            principal: core.principal.to_string(),
            prorated_interest_rate: core.prorated_interest_rate.to_string(),
            collateral_address: core.collateral_address.to_string(),
            collateral_id,
            payable_currency: core.payable_currency.to_string(),
            deadline: core.deadline.to_string(),
            affiliate_code: format!("0x{}", hex::encode(core.affiliate_code.as_slice())),
        },
        collection_id: offer.collection_id.to_string(),
        signature: signature.to_hex(),
        extra_data: ZERO_BYTES32.to_string(),
        nonce: core.nonce.to_string(),
        kind: offer.kind,
        role: core.side.role(),
        item_predicates,
    }
}

/// Sign a built offer with the origination controller domain
pub fn sign_offer(offer: &BuiltOffer, signer: &dyn OfferSigner) -> Result<OfferSignature, Error> {
    let schema = typed_data::schema_for(&offer.terms);
    let message = typed_data::message_for(&offer.terms);
    Ok(signer::sign(
        &Domain::origination_controller(),
        schema,
        message,
        signer,
    )?)
}

/// Post a submission; rejections come back with the body verbatim
pub async fn submit_offer<B: OrderBook>(
    client: &B,
    submission: &LoanTermsSubmission,
) -> Result<serde_json::Value, Error> {
    Ok(client.submit_loan_terms(submission).await?)
}

/// Sign and submit one offer
pub async fn place_offer<B: OrderBook>(
    client: &B,
    signer: &dyn OfferSigner,
    offer: &BuiltOffer,
) -> Result<serde_json::Value, Error> {
    let signature = sign_offer(offer, signer)?;
    let submission = to_submission(offer, &signature);

    tracing::info!(
        kind = %offer.kind,
        collection = %offer.collection_id,
        nonce = %submission.nonce,
        "Submitting offer"
    );

    submit_offer(client, &submission).await
}
