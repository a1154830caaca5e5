//! Attest Crypto: Ed25519 keys, signer-recoverable signatures and the
//! domain-bound typed-data digest verifiers sign.

pub mod error;
pub mod hashing;
pub mod keys;
pub mod signing;
pub mod typed_data;

pub use error::CryptoError;
pub use hashing::{hash, Hash};
pub use keys::{KeyPair, PublicKey};
pub use signing::{recover, sign_digest, RecoverableSignature, Signature};
pub use typed_data::{
    recover_verification_signer, sign_verification_result, typed_data_digest,
    verification_struct_hash, TypedDataDomain,
};
