use super::entitlement::Tier;
use super::entitlement::UserEntitlement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed { debited: bool },
    Denied,
}

impl GateDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Allowed { .. } => "allowed",
            Self::Denied => "denied",
        }
    }
}

/// Single choke point for every simulated AI action.
///
/// Only the Free tier is metered. Pro carries a finite balance but is never
/// debited here.
pub fn try_consume(entitlement: &mut UserEntitlement) -> GateDecision {
    let decision = match (entitlement.tier, entitlement.credits) {
        (Tier::Pro | Tier::Enterprise, _) => GateDecision::Allowed { debited: false },
        (Tier::Free, credits) if credits.is_exhausted() => GateDecision::Denied,
        (Tier::Free, credits) => {
            entitlement.credits = credits.debit();
            GateDecision::Allowed { debited: true }
        }
    };
    tracing::debug!(
        tier = entitlement.tier.label(),
        credits = %entitlement.credits,
        decision = decision.label(),
        "request gate"
    );
    decision
}

#[cfg(test)]
mod tests {
    use super::try_consume;
    use super::GateDecision;
    use crate::entitlement::Credits;
    use crate::entitlement::Tier;
    use crate::entitlement::UserEntitlement;
    use pretty_assertions::assert_eq;

    fn free(credits: u32) -> UserEntitlement {
        UserEntitlement {
            tier: Tier::Free,
            credits: Credits::Finite(credits),
        }
    }

    #[test]
    fn free_tier_debits_until_exhausted_then_denies() {
        for (start, calls) in [(0_u32, 3_u32), (1, 1), (3, 5), (50, 50), (50, 60)] {
            let mut entitlement = free(start);
            let mut allowed = 0;
            for _ in 0..calls {
                if try_consume(&mut entitlement).is_allowed() {
                    allowed += 1;
                }
            }
            assert_eq!(entitlement.credits, Credits::Finite(start.saturating_sub(calls)));
            assert_eq!(allowed, start.min(calls));
        }
    }

    #[test]
    fn exhausted_free_tier_is_denied_without_mutation() {
        let mut entitlement = free(0);
        assert_eq!(try_consume(&mut entitlement), GateDecision::Denied);
        assert_eq!(entitlement, free(0));
    }

    #[test]
    fn pro_tier_is_never_debited() {
        let mut entitlement = UserEntitlement {
            tier: Tier::Pro,
            credits: Credits::Finite(500),
        };
        for _ in 0..3 {
            assert_eq!(
                try_consume(&mut entitlement),
                GateDecision::Allowed { debited: false }
            );
        }
        assert_eq!(entitlement.credits, Credits::Finite(500));
    }

    #[test]
    fn pro_tier_with_zero_balance_is_still_allowed() {
        let mut entitlement = UserEntitlement {
            tier: Tier::Pro,
            credits: Credits::Finite(0),
        };
        assert!(try_consume(&mut entitlement).is_allowed());
    }

    #[test]
    fn enterprise_is_unbounded() {
        let mut entitlement = UserEntitlement {
            tier: Tier::Enterprise,
            credits: Credits::Unbounded,
        };
        assert!(try_consume(&mut entitlement).is_allowed());
        assert_eq!(entitlement.credits, Credits::Unbounded);
    }
}
