//! Typed-data schemas, domain and message encoding for signed loan terms.
//!
//! Field order and ABI types are part of the digest the origination
//! controller verifies, so both schemas are fixed tables here. Messages are
//! rendered to JSON and resolved through `alloy`'s dynamic typed-data encoder,
//! which hashes each field according to its declared type.

use alloy::dyn_abi::eip712::TypedData;
use alloy::primitives::{Address, B256};
use lender_core::SignerError;
use serde_json::{json, Map, Value};

use crate::constants::{CHAIN_ID, DOMAIN_NAME, DOMAIN_VERSION, ORIGINATION_CONTROLLER};
use crate::offer::{CollectionOfferTerms, CoreTerms, LoanTerms, OfferTerms, Predicate};

/// One schema field: name and ABI type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldType {
    pub name: &'static str,
    pub ty: &'static str,
}

const fn field(name: &'static str, ty: &'static str) -> FieldType {
    FieldType { name, ty }
}

pub const EIP712_DOMAIN_FIELDS: &[FieldType] = &[
    field("name", "string"),
    field("version", "string"),
    field("chainId", "uint256"),
    field("verifyingContract", "address"),
];

pub const LOAN_TERMS_FIELDS: &[FieldType] = &[
    field("proratedInterestRate", "uint256"),
    field("principal", "uint256"),
    field("collateralAddress", "address"),
    field("durationSecs", "uint96"),
    field("collateralId", "uint256"),
    field("payableCurrency", "address"),
    field("deadline", "uint96"),
    field("affiliateCode", "bytes32"),
    field("nonce", "uint160"),
    field("side", "uint8"),
];

pub const LOAN_TERMS_WITH_ITEMS_FIELDS: &[FieldType] = &[
    field("proratedInterestRate", "uint256"),
    field("principal", "uint256"),
    field("collateralAddress", "address"),
    field("durationSecs", "uint96"),
    field("items", "Predicate[]"),
    field("payableCurrency", "address"),
    field("deadline", "uint96"),
    field("affiliateCode", "bytes32"),
    field("nonce", "uint160"),
    field("side", "uint8"),
];

pub const PREDICATE_FIELDS: &[FieldType] = &[field("data", "bytes"), field("verifier", "address")];

/// A primary type with the struct types it references
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub primary_type: &'static str,
    pub fields: &'static [FieldType],
    pub dependencies: &'static [(&'static str, &'static [FieldType])],
}

/// Direct loan terms (asset, vault, loan extension)
pub const LOAN_TERMS_SCHEMA: Schema = Schema {
    primary_type: "LoanTerms",
    fields: LOAN_TERMS_FIELDS,
    dependencies: &[],
};

/// Collection-wide offer with collateral predicates
pub const LOAN_TERMS_WITH_ITEMS_SCHEMA: Schema = Schema {
    primary_type: "LoanTermsWithItems",
    fields: LOAN_TERMS_WITH_ITEMS_FIELDS,
    dependencies: &[("Predicate", PREDICATE_FIELDS)],
};

impl Schema {
    fn types_json(&self) -> Value {
        let mut types = Map::new();
        types.insert("EIP712Domain".to_string(), fields_json(EIP712_DOMAIN_FIELDS));
        types.insert(self.primary_type.to_string(), fields_json(self.fields));
        for (name, fields) in self.dependencies {
            types.insert(name.to_string(), fields_json(fields));
        }
        Value::Object(types)
    }

    /// Canonical `encodeType` string, e.g. `LoanTerms(uint256 proratedInterestRate,...)`
    pub fn encode_type(&self) -> String {
        let mut out = struct_signature(self.primary_type, self.fields);
        let mut deps: Vec<_> = self.dependencies.to_vec();
        deps.sort_by_key(|(name, _)| *name);
        for (name, fields) in deps {
            out.push_str(&struct_signature(name, fields));
        }
        out
    }
}

fn fields_json(fields: &[FieldType]) -> Value {
    Value::Array(
        fields
            .iter()
            .map(|f| json!({ "name": f.name, "type": f.ty }))
            .collect(),
    )
}

fn struct_signature(name: &str, fields: &[FieldType]) -> String {
    let members: Vec<String> = fields.iter().map(|f| format!("{} {}", f.ty, f.name)).collect();
    format!("{}({})", name, members.join(","))
}

/// Signing domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    pub name: &'static str,
    pub version: &'static str,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl Domain {
    /// Origination controller domain on mainnet
    pub fn origination_controller() -> Self {
        Self {
            name: DOMAIN_NAME,
            version: DOMAIN_VERSION,
            chain_id: CHAIN_ID,
            verifying_contract: ORIGINATION_CONTROLLER,
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "version": self.version,
            "chainId": self.chain_id,
            "verifyingContract": self.verifying_contract.to_string(),
        })
    }
}

/// Schema matching the shape of the terms
pub fn schema_for(terms: &OfferTerms) -> &'static Schema {
    match terms {
        OfferTerms::Direct(_) => &LOAN_TERMS_SCHEMA,
        OfferTerms::Collection(_) => &LOAN_TERMS_WITH_ITEMS_SCHEMA,
    }
}

/// Render terms as a typed-data message
pub fn message_for(terms: &OfferTerms) -> Value {
    match terms {
        OfferTerms::Direct(t) => loan_terms_message(t),
        OfferTerms::Collection(t) => collection_terms_message(t),
    }
}

fn core_message(core: &CoreTerms) -> Map<String, Value> {
    let mut message = Map::new();
    message.insert("proratedInterestRate".into(), core.prorated_interest_rate.to_string().into());
    message.insert("principal".into(), core.principal.to_string().into());
    message.insert("collateralAddress".into(), core.collateral_address.to_string().into());
    message.insert("durationSecs".into(), core.duration_secs.to_string().into());
    message.insert("payableCurrency".into(), core.payable_currency.to_string().into());
    message.insert("deadline".into(), core.deadline.to_string().into());
    message.insert("affiliateCode".into(), bytes32_hex(&core.affiliate_code).into());
    message.insert("nonce".into(), core.nonce.to_string().into());
    message.insert("side".into(), core.side.as_u8().into());
    message
}

fn loan_terms_message(terms: &LoanTerms) -> Value {
    let mut message = core_message(&terms.core);
    message.insert("collateralId".into(), terms.collateral_id.to_string().into());
    Value::Object(message)
}

fn collection_terms_message(terms: &CollectionOfferTerms) -> Value {
    let mut message = core_message(&terms.core);
    let items: Vec<Value> = terms.items.iter().map(predicate_message).collect();
    message.insert("items".into(), Value::Array(items));
    Value::Object(message)
}

fn predicate_message(predicate: &Predicate) -> Value {
    json!({
        "data": format!("0x{}", hex::encode(&predicate.data)),
        "verifier": predicate.verifier.to_string(),
    })
}

fn bytes32_hex(value: &B256) -> String {
    format!("0x{}", hex::encode(value.as_slice()))
}

/// Assemble a typed-data document ready for hashing
pub fn typed_data(
    domain: &Domain,
    schema: &Schema,
    message: Value,
) -> Result<TypedData, SignerError> {
    let document = json!({
        "types": schema.types_json(),
        "primaryType": schema.primary_type,
        "domain": domain.to_json(),
        "message": message,
    });

    serde_json::from_value(document).map_err(|e| SignerError::Encoding {
        reason: format!("{} typed data: {}", schema.primary_type, e),
    })
}

/// Typed-data digest of the given document
pub fn signing_hash(typed: &TypedData) -> Result<B256, SignerError> {
    typed.eip712_signing_hash().map_err(|e| SignerError::Encoding {
        reason: e.to_string(),
    })
}
