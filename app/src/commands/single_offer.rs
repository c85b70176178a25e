//! Single offer: loan extension, listed asset/vault, or collection

use anyhow::Context;
use arcade::calculator::interest_rate_percent;
use arcade::currency::format_units;
use arcade::offer::parse_address;
use arcade::{
    build_offer, deadline_from_lifetime, next_nonce, place_offer, resolve_loan_collateral,
    to_protocol_amount, unix_now, Collateral, Currency, LoanSource, LocalSigner, OfferEconomics,
    OfferRequest, OfferTarget,
};
use lender_core::Side;
use tokio::io::AsyncBufRead;

use super::{ask_bid_lifetime, ask_currency, parse_duration_days};
use crate::prompt::{Prompt, Step};
use crate::AppContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferChoice {
    LoanExtension,
    AssetOrVault,
    Collection,
}

const OFFER_CHOICES: &[(OfferChoice, &str)] = &[
    (OfferChoice::LoanExtension, "Loan extension"),
    (OfferChoice::AssetOrVault, "Listed asset / vault"),
    (OfferChoice::Collection, "Collection"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Question {
    OfferType,
    LoanId,
    CollateralAddress,
    CollateralId,
    Currency,
    Principal,
    Repayment,
    Duration,
    BidLifetime,
}

fn questions_for(choice: Option<OfferChoice>) -> Vec<Question> {
    let mut questions = vec![Question::OfferType];
    match choice {
        Some(OfferChoice::LoanExtension) => questions.push(Question::LoanId),
        Some(OfferChoice::AssetOrVault) => {
            questions.extend([Question::CollateralAddress, Question::CollateralId])
        }
        Some(OfferChoice::Collection) => questions.push(Question::CollateralAddress),
        None => {}
    }
    questions.extend([
        Question::Currency,
        Question::Principal,
        Question::Repayment,
        Question::Duration,
        Question::BidLifetime,
    ]);
    questions
}

/// Everything the operator entered for one offer
#[derive(Debug, Clone, Default)]
pub struct OfferAnswers {
    pub choice: Option<OfferChoice>,
    pub loan_id: String,
    pub loan_collateral: Option<Collateral>,
    pub collateral_address: String,
    pub collateral_id: String,
    pub currency: Option<&'static Currency>,
    pub principal: String,
    pub repayment: String,
    pub duration_days: i64,
    pub bid_lifetime_minutes: u64,
}

/// Walk the questionnaire; `back` returns to the previous question and
/// cancels from the first one. Loan ids are checked against `loans` as they
/// are entered.
pub async fn collect_answers<R, L>(
    prompt: &mut Prompt<R>,
    loans: &L,
) -> anyhow::Result<Step<OfferAnswers>>
where
    R: AsyncBufRead + Unpin,
    L: LoanSource,
{
    let mut answers = OfferAnswers::default();
    let mut index = 0;

    loop {
        let questions = questions_for(answers.choice);
        let Some(question) = questions.get(index).copied() else {
            return Ok(Step::Continue(answers));
        };

        let answered = ask(prompt, loans, question, &mut answers).await?;
        if answered {
            index += 1;
        } else if index == 0 {
            return Ok(Step::Cancelled);
        } else {
            index -= 1;
        }
    }
}

async fn ask<R, L>(
    prompt: &mut Prompt<R>,
    loans: &L,
    question: Question,
    answers: &mut OfferAnswers,
) -> anyhow::Result<bool>
where
    R: AsyncBufRead + Unpin,
    L: LoanSource,
{
    let answered = match question {
        Question::OfferType => {
            let labels: Vec<&str> = OFFER_CHOICES.iter().map(|(_, l)| *l).collect();
            prompt
                .select("What type of offer? (type 'back' to go back)", labels.as_slice())
                .await?
                .map(|i| answers.choice = Some(OFFER_CHOICES[i].0))
        }
        Question::LoanId => {
            let known = loans.fetch_loans().await?;
            prompt
                .parsed("Loan ID:", |a| {
                    non_empty(a, "Enter a loan id")?;
                    resolve_loan_collateral(&known, a)
                        .map(|collateral| (a.to_string(), collateral))
                        .map_err(|e| e.to_string())
                })
                .await?
                .map(|(id, collateral)| {
                    answers.loan_id = id;
                    answers.loan_collateral = Some(collateral);
                })
        }
        Question::CollateralAddress => {
            let question = if answers.choice == Some(OfferChoice::Collection) {
                "Collection address:"
            } else {
                "Collateral address (vault factory address for a vault):"
            };
            prompt
                .parsed(question, |a| {
                    parse_address("collateralAddress", a)
                        .map(|_| a.to_string())
                        .map_err(|e| e.to_string())
                })
                .await?
                .map(|address| answers.collateral_address = address)
        }
        Question::CollateralId => prompt
            .parsed("Collateral ID (vault ID for a vault):", |a| {
                arcade::offer::parse_collateral_id(a)
                    .map(|_| a.to_string())
                    .map_err(|e| e.to_string())
            })
            .await?
            .map(|id| answers.collateral_id = id),
        Question::Currency => ask_currency(prompt)
            .await?
            .map(|c| answers.currency = Some(c)),
        Question::Principal => {
            let Some(currency) = answers.currency else {
                return Ok(false);
            };
            prompt
                .parsed(&format!("Principal in {}:", currency.code), |a| {
                    amount_in(a, currency)
                })
                .await?
                .map(|p| answers.principal = p)
        }
        Question::Repayment => {
            let Some(currency) = answers.currency else {
                return Ok(false);
            };
            let principal = answers.principal.clone();
            prompt
                .parsed(&format!("Repayment in {}:", currency.code), |a| {
                    repayment_in(a, &principal, currency)
                })
                .await?
                .map(|r| answers.repayment = r)
        }
        Question::Duration => prompt
            .parsed("Loan duration in days:", parse_duration_days)
            .await?
            .map(|d| answers.duration_days = d),
        Question::BidLifetime => ask_bid_lifetime(prompt)
            .await?
            .map(|m| answers.bid_lifetime_minutes = m),
    };

    Ok(matches!(answered, Step::Continue(())))
}

fn non_empty(answer: &str, message: &str) -> Result<String, String> {
    if answer.is_empty() {
        Err(message.to_string())
    } else {
        Ok(answer.to_string())
    }
}

fn amount_in(answer: &str, currency: &Currency) -> Result<String, String> {
    let amount = to_protocol_amount(answer, currency).map_err(|e| e.to_string())?;
    if amount.bits() == 0 {
        return Err("Amount must be greater than zero".to_string());
    }
    Ok(answer.to_string())
}

fn repayment_in(answer: &str, principal: &str, currency: &Currency) -> Result<String, String> {
    amount_in(answer, currency)?;
    let repayment = to_protocol_amount(answer, currency).map_err(|e| e.to_string())?;
    let principal = to_protocol_amount(principal, currency).map_err(|e| e.to_string())?;
    if repayment <= principal {
        return Err("Repayment must be greater than the principal".to_string());
    }
    Ok(answer.to_string())
}

/// Confirmation summary shown before signing
pub fn summary(economics: &OfferEconomics, currency: &Currency, duration_days: i64) -> String {
    format!(
        "Principal: {} {code}\nRepayment: {} {code}\nInterest rate: {:.2}%\n\
         Duration: {} days\nEstimated APR: {:.2}%",
        format_units(&economics.principal, currency.decimals),
        format_units(&economics.repayment, currency.decimals),
        interest_rate_percent(&economics.interest_rate),
        duration_days,
        economics.apr_estimate,
        code = currency.code,
    )
}

pub async fn run<R>(ctx: &AppContext, prompt: &mut Prompt<R>) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let answers = match collect_answers(prompt, &ctx.arcade).await? {
        Step::Continue(a) => a,
        Step::Cancelled => return Ok(()),
    };
    let currency = answers.currency.context("currency not selected")?;
    let choice = answers.choice.context("offer type not selected")?;

    let economics = OfferEconomics::from_amounts(
        &answers.principal,
        &answers.repayment,
        answers.duration_days,
        currency,
    )?;

    println!("\n{}\n", summary(&economics, currency, answers.duration_days));
    if prompt.confirm("Place this offer?").await? != Step::Continue(true) {
        println!("Offer placement cancelled.");
        return Ok(());
    }

    let target = match choice {
        OfferChoice::LoanExtension => OfferTarget::Loan {
            loan_id: answers.loan_id.clone(),
            collateral: answers
                .loan_collateral
                .clone()
                .context("loan collateral not resolved")?,
        },
        OfferChoice::AssetOrVault => OfferTarget::Direct(Collateral::parse(
            &answers.collateral_address,
            &answers.collateral_id,
        )?),
        OfferChoice::Collection => OfferTarget::Collection(parse_address(
            "collateralAddress",
            &answers.collateral_address,
        )?),
    };

    let signer = LocalSigner::from_env()?;
    let now = unix_now();
    let request = OfferRequest {
        target,
        currency,
        economics,
        deadline: deadline_from_lifetime(now, answers.bid_lifetime_minutes),
        nonce: next_nonce(),
        side: Side::Lender,
    };
    let offer = build_offer(&request, now)?;

    match place_offer(&ctx.arcade, &signer, &offer).await {
        Ok(response) => {
            tracing::debug!(response = %response, "Order book response");
            println!("Offer placed successfully ({}).", offer.kind);
        }
        Err(e) => {
            tracing::error!(
                kind = %offer.kind,
                error = %e,
                code = e.error_code(),
                "Failed to place offer"
            );
            println!("Failed to place offer: {}", e);
        }
    }

    Ok(())
}
