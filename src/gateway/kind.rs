// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gateway operation kinds and their static routing policy.

/// Category of backend call. Each kind maps to one routing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    About,
    ValidatorAuction,
    NetworkStatus,
    NetworkConfig,
    NetworkEconomics,
    NodeHeartbeat,
    TrieStatistics,
    NodeWaitingEpochsLeft,
    AddressDetails,
    AddressBalance,
    AddressEsdt,
    AddressEsdtBalance,
    AddressEsdtAllRoles,
    AddressNftByNonce,
    GuardianData,
    EsdtSupply,
    AllFungibleTokens,
    TransactionDetails,
    TransactionProcessStatus,
    TransactionPool,
    TransactionSend,
    BlockByNonce,
    VmQuery,
    AliasAddress,
    CanonicalAddress,
}

/// Which endpoint variants an operation kind may be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndpointPolicy {
    pub uses_snapshotless_endpoint: bool,
    pub uses_deep_history_endpoint: bool,
}

impl OperationKind {
    pub const ALL: [OperationKind; 25] = [
        Self::About,
        Self::ValidatorAuction,
        Self::NetworkStatus,
        Self::NetworkConfig,
        Self::NetworkEconomics,
        Self::NodeHeartbeat,
        Self::TrieStatistics,
        Self::NodeWaitingEpochsLeft,
        Self::AddressDetails,
        Self::AddressBalance,
        Self::AddressEsdt,
        Self::AddressEsdtBalance,
        Self::AddressEsdtAllRoles,
        Self::AddressNftByNonce,
        Self::GuardianData,
        Self::EsdtSupply,
        Self::AllFungibleTokens,
        Self::TransactionDetails,
        Self::TransactionProcessStatus,
        Self::TransactionPool,
        Self::TransactionSend,
        Self::BlockByNonce,
        Self::VmQuery,
        Self::AliasAddress,
        Self::CanonicalAddress,
    ];

    /// Routing policy for this kind.
    pub const fn policy(self) -> EndpointPolicy {
        let uses_snapshotless_endpoint = matches!(
            self,
            Self::AddressBalance
                | Self::AddressDetails
                | Self::AddressEsdt
                | Self::AddressNftByNonce
                | Self::VmQuery
                | Self::TransactionPool
        );
        let uses_deep_history_endpoint = matches!(
            self,
            Self::AddressDetails
                | Self::AddressEsdt
                | Self::AddressEsdtBalance
                | Self::AddressNftByNonce
                | Self::VmQuery
        );

        EndpointPolicy {
            uses_snapshotless_endpoint,
            uses_deep_history_endpoint,
        }
    }

    /// Stable label used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::About => "about",
            Self::ValidatorAuction => "validatorAuction",
            Self::NetworkStatus => "networkStatus",
            Self::NetworkConfig => "networkConfig",
            Self::NetworkEconomics => "networkEconomics",
            Self::NodeHeartbeat => "nodeHeartbeat",
            Self::TrieStatistics => "trieStatistics",
            Self::NodeWaitingEpochsLeft => "nodeWaitingEpochsLeft",
            Self::AddressDetails => "addressDetails",
            Self::AddressBalance => "addressBalance",
            Self::AddressEsdt => "addressEsdt",
            Self::AddressEsdtBalance => "addressEsdtBalance",
            Self::AddressEsdtAllRoles => "addressEsdtAllRoles",
            Self::AddressNftByNonce => "addressNftByNonce",
            Self::GuardianData => "guardianData",
            Self::EsdtSupply => "esdtSupply",
            Self::AllFungibleTokens => "allFungibleTokens",
            Self::TransactionDetails => "transactionDetails",
            Self::TransactionProcessStatus => "transactionProcessStatus",
            Self::TransactionPool => "transactionPool",
            Self::TransactionSend => "transactionSend",
            Self::BlockByNonce => "blockByNonce",
            Self::VmQuery => "vmQuery",
            Self::AliasAddress => "aliasAddress",
            Self::CanonicalAddress => "canonicalAddress",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn snapshotless_kinds() {
        let kinds: HashSet<_> = OperationKind::ALL
            .into_iter()
            .filter(|k| k.policy().uses_snapshotless_endpoint)
            .collect();

        assert_eq!(
            kinds,
            HashSet::from([
                OperationKind::AddressBalance,
                OperationKind::AddressDetails,
                OperationKind::AddressEsdt,
                OperationKind::AddressNftByNonce,
                OperationKind::VmQuery,
                OperationKind::TransactionPool,
            ])
        );
    }

    #[test]
    fn deep_history_kinds() {
        let kinds: HashSet<_> = OperationKind::ALL
            .into_iter()
            .filter(|k| k.policy().uses_deep_history_endpoint)
            .collect();

        assert_eq!(
            kinds,
            HashSet::from([
                OperationKind::AddressDetails,
                OperationKind::AddressEsdt,
                OperationKind::AddressEsdtBalance,
                OperationKind::AddressNftByNonce,
                OperationKind::VmQuery,
            ])
        );
    }

    #[test]
    fn labels_are_unique() {
        let labels: HashSet<_> = OperationKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(labels.len(), OperationKind::ALL.len());
    }
}
