//! Credential sources a requirement can be satisfied by.

use attest_core::Principal;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Token type identifier within a multi-token contract.
pub type TokenTypeId = u64;

/// Stable identity of a credential source: what an aggregator stores and
/// compares. Carries the kind discriminator and, for tokens, the token type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceRef {
    /// A credential ledger, by its principal.
    Ledger { ledger: Principal },
    /// Possession of a token type on a token contract.
    TokenBalance {
        contract: Principal,
        token_type: TokenTypeId,
    },
}

impl SourceRef {
    pub fn ledger(ledger: Principal) -> Self {
        Self::Ledger { ledger }
    }

    pub fn token_balance(contract: Principal, token_type: TokenTypeId) -> Self {
        Self::TokenBalance {
            contract,
            token_type,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ledger { ledger } => write!(f, "ledger:{}", ledger),
            Self::TokenBalance {
                contract,
                token_type,
            } => write!(f, "token:{}#{}", contract, token_type),
        }
    }
}

/// Anything that can answer "is this subject verified".
pub trait CredentialSource: Send + Sync {
    /// Identity used for set membership in an aggregator.
    fn source_ref(&self) -> SourceRef;

    fn is_verified(&self, subject: &Principal) -> bool;
}

/// External multi-token contract queried for balances.
pub trait TokenBalanceOracle: Send + Sync {
    /// Principal of the token contract.
    fn contract(&self) -> Principal;

    fn balance_of(&self, holder: &Principal, token_type: TokenTypeId) -> u128;
}

/// A source satisfied by holding a positive balance of one token type.
pub struct TokenBalanceSource {
    oracle: Arc<dyn TokenBalanceOracle>,
    token_type: TokenTypeId,
}

impl TokenBalanceSource {
    pub fn new(oracle: Arc<dyn TokenBalanceOracle>, token_type: TokenTypeId) -> Self {
        Self { oracle, token_type }
    }
}

impl CredentialSource for TokenBalanceSource {
    fn source_ref(&self) -> SourceRef {
        SourceRef::token_balance(self.oracle.contract(), self.token_type)
    }

    fn is_verified(&self, subject: &Principal) -> bool {
        self.oracle.balance_of(subject, self.token_type) > 0
    }
}

/// In-process multi-token balance book.
pub struct InMemoryTokenBalances {
    contract: Principal,
    balances: DashMap<(Principal, TokenTypeId), u128>,
}

impl InMemoryTokenBalances {
    pub fn new(contract: Principal) -> Self {
        Self {
            contract,
            balances: DashMap::new(),
        }
    }

    /// Credit `amount` tokens of `token_type` to `holder`. Saturates.
    pub fn mint(&self, holder: &Principal, token_type: TokenTypeId, amount: u128) {
        let mut entry = self
            .balances
            .entry((holder.clone(), token_type))
            .or_insert(0);
        *entry = entry.saturating_add(amount);
        tracing::debug!(contract = %self.contract, holder = %holder, token_type, balance = *entry, "tokens minted");
    }

    /// Debit up to `amount` tokens; the balance never goes below zero.
    pub fn burn(&self, holder: &Principal, token_type: TokenTypeId, amount: u128) {
        if let Some(mut entry) = self.balances.get_mut(&(holder.clone(), token_type)) {
            *entry = entry.saturating_sub(amount);
        }
    }
}

impl TokenBalanceOracle for InMemoryTokenBalances {
    fn contract(&self) -> Principal {
        self.contract.clone()
    }

    fn balance_of(&self, holder: &Principal, token_type: TokenTypeId) -> u128 {
        self.balances
            .get(&(holder.clone(), token_type))
            .map(|b| *b)
            .unwrap_or(0)
    }
}
