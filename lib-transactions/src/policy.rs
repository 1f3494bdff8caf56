//! Transaction policies
//!
//! Policies are optional limits a transaction opts into. Which ones are
//! present is recorded as a bitmask in the transaction header; the values
//! follow in canonical (ascending bit) order, each as one word.

use std::collections::HashSet;

use lib_abi_coder::coders::NumberCoder;
use lib_abi_coder::{AbiValue, BitfieldCoder, BitfieldField, Coder, CoderArena, NumberWidth};
use serde::{Deserialize, Serialize};

use crate::errors::{PolicyError, PolicyResult};

/// Policy bit in the header mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u32)]
pub enum PolicyType {
    GasPrice = 1,
    WitnessLimit = 2,
    Maturity = 4,
    MaxFee = 8,
}

impl PolicyType {
    /// All policies, in canonical order
    pub const ALL: [PolicyType; 4] = [
        PolicyType::GasPrice,
        PolicyType::WitnessLimit,
        PolicyType::Maturity,
        PolicyType::MaxFee,
    ];

    pub const fn bit(self) -> u32 {
        self as u32
    }

    pub fn from_bit(bit: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.bit() == bit)
    }

    const fn width(self) -> NumberWidth {
        match self {
            PolicyType::Maturity => NumberWidth::U32,
            _ => NumberWidth::U64,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PolicyType::GasPrice => "GasPrice",
            PolicyType::WitnessLimit => "WitnessLimit",
            PolicyType::Maturity => "Maturity",
            PolicyType::MaxFee => "MaxFee",
        }
    }
}

/// A policy with its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Policy {
    GasPrice(u64),
    WitnessLimit(u64),
    /// Block height before which the transaction cannot be included
    Maturity(u32),
    MaxFee(u64),
}

impl Policy {
    pub const fn policy_type(&self) -> PolicyType {
        match self {
            Policy::GasPrice(_) => PolicyType::GasPrice,
            Policy::WitnessLimit(_) => PolicyType::WitnessLimit,
            Policy::Maturity(_) => PolicyType::Maturity,
            Policy::MaxFee(_) => PolicyType::MaxFee,
        }
    }

    pub fn value(&self) -> u64 {
        match *self {
            Policy::GasPrice(v) | Policy::WitnessLimit(v) | Policy::MaxFee(v) => v,
            Policy::Maturity(v) => u64::from(v),
        }
    }

    pub fn from_value(policy: PolicyType, value: u64) -> PolicyResult<Self> {
        Ok(match policy {
            PolicyType::GasPrice => Policy::GasPrice(value),
            PolicyType::WitnessLimit => Policy::WitnessLimit(value),
            PolicyType::Maturity => Policy::Maturity(
                u32::try_from(value).map_err(|_| PolicyError::OutOfRange { policy, value })?,
            ),
            PolicyType::MaxFee => Policy::MaxFee(value),
        })
    }
}

/// Header mask naming every policy in `policies`
pub fn policy_types(policies: &[Policy]) -> u32 {
    policies
        .iter()
        .fold(0, |mask, policy| mask | policy.policy_type().bit())
}

/// Encodes and decodes the policy section of a transaction
#[derive(Debug, Clone)]
pub struct PoliciesCoder {
    arena: CoderArena,
    bitfield: BitfieldCoder,
}

impl PoliciesCoder {
    pub fn new() -> PolicyResult<Self> {
        let mut arena = CoderArena::new();
        let mut fields = Vec::with_capacity(PolicyType::ALL.len());
        for policy in PolicyType::ALL {
            let coder = arena.insert(Coder::Number(NumberCoder::new(policy.width())))?;
            fields.push(BitfieldField::new(policy.name(), policy.bit(), coder));
        }
        let bitfield = BitfieldCoder::new("Policies", fields)?;
        Ok(Self { arena, bitfield })
    }

    /// Encode present policies in canonical order
    ///
    /// The header mask is not part of the output; derive it with
    /// [`policy_types`].
    pub fn encode(&self, policies: &[Policy]) -> PolicyResult<Vec<u8>> {
        let mut seen = HashSet::with_capacity(policies.len());
        for policy in policies {
            if !seen.insert(policy.policy_type()) {
                return Err(PolicyError::Duplicate(policy.policy_type()));
            }
        }

        let entries: Vec<(u32, AbiValue)> = policies
            .iter()
            .map(|p| (p.policy_type().bit(), AbiValue::Number(p.value())))
            .collect();
        Ok(self.bitfield.encode_fields(&self.arena, &entries)?.finish(0))
    }

    /// Decode the policies named by `policy_types`, starting at `offset`
    ///
    /// Bits naming no known policy are ignored.
    pub fn decode(
        &self,
        bytes: &[u8],
        offset: usize,
        policy_types: u32,
    ) -> PolicyResult<(Vec<Policy>, usize)> {
        let (entries, next) = self
            .bitfield
            .decode_fields(&self.arena, bytes, offset, policy_types)?;

        let mut policies = Vec::with_capacity(entries.len());
        for (bit, value) in entries {
            let Some(policy) = PolicyType::from_bit(bit) else {
                continue;
            };
            let number = value
                .as_number()
                .ok_or(PolicyError::UnexpectedValue(policy))?;
            policies.push(Policy::from_value(policy, number)?);
        }
        Ok((policies, next))
    }
}
