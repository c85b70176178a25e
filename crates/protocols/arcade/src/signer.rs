//! Typed-data signing of loan terms

use alloy::dyn_abi::eip712::TypedData;
use alloy::primitives::{Address, Signature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use lender_core::SignerError;
use serde_json::Value;

use crate::typed_data::{self, Domain, Schema};

/// A signing backend
pub trait OfferSigner {
    /// Address that will appear as the signer on-chain
    fn address(&self) -> Address;

    /// Short label for logs and errors
    fn label(&self) -> String {
        self.address().to_string()
    }

    /// Sign a typed-data document. Backends without typed-data support keep
    /// the default.
    fn sign_typed_data(&self, typed: &TypedData) -> Result<Signature, SignerError> {
        let _ = typed;
        Err(SignerError::Unsupported {
            signer: self.label(),
        })
    }
}

/// In-process secp256k1 key
pub struct LocalSigner {
    inner: PrivateKeySigner,
}

impl LocalSigner {
    /// Parse a hex private key, with or without `0x`
    pub fn from_hex(key: &str) -> Result<Self, SignerError> {
        let inner = key
            .trim()
            .parse::<PrivateKeySigner>()
            .map_err(|e| SignerError::InvalidKey {
                reason: e.to_string(),
            })?;
        Ok(Self { inner })
    }

    /// Read the key from `PRIVATE_KEY`
    pub fn from_env() -> Result<Self, SignerError> {
        let key = std::env::var("PRIVATE_KEY").map_err(|_| SignerError::InvalidKey {
            reason: "PRIVATE_KEY is not set".to_string(),
        })?;
        Self::from_hex(&key)
    }
}

impl OfferSigner for LocalSigner {
    fn address(&self) -> Address {
        self.inner.address()
    }

    fn sign_typed_data(&self, typed: &TypedData) -> Result<Signature, SignerError> {
        let digest = typed_data::signing_hash(typed)?;
        self.inner
            .sign_hash_sync(&digest)
            .map_err(|e| SignerError::SigningFailed {
                reason: e.to_string(),
            })
    }
}

/// A signature together with the digest it covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferSignature {
    pub signature: Signature,
    pub digest: B256,
}

impl OfferSignature {
    /// `0x` + r(32) + s(32) + v(1), v in {27, 28}
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signature.as_bytes()))
    }
}

/// Sign a message under `schema` and `domain`
pub fn sign(
    domain: &Domain,
    schema: &Schema,
    message: Value,
    signer: &dyn OfferSigner,
) -> Result<OfferSignature, SignerError> {
    let typed = typed_data::typed_data(domain, schema, message)?;
    let digest = typed_data::signing_hash(&typed)?;
    let signature = signer.sign_typed_data(&typed)?;

    tracing::debug!(
        signer = %signer.label(),
        primary_type = schema.primary_type,
        digest = %digest,
        "Signed typed data"
    );

    Ok(OfferSignature { signature, digest })
}
