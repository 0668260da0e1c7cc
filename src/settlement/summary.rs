use crate::core::member::MemberId;
use crate::matrix::balance_matrix::BalanceMatrix;
use crate::settlement::engine::NetTransfer;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a single member pays and receives across a settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberFlow {
    pub member: MemberId,
    /// Total sent as debtor.
    pub paid: Decimal,
    /// Total received as creditor.
    pub received: Decimal,
}

impl MemberFlow {
    /// Received minus paid. Positive for members the group owes.
    pub fn net(&self) -> Decimal {
        self.received - self.paid
    }
}

/// Gross vs. net comparison of a settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementSummary {
    /// Sum of every off-diagonal matrix cell.
    pub gross_total: Decimal,
    /// Sum of all transfer amounts.
    pub net_total: Decimal,
    pub transfer_count: usize,
    /// Per-member flows in matrix order.
    pub flows: Vec<MemberFlow>,
}

impl SettlementSummary {
    pub fn from_transfers(matrix: &BalanceMatrix, transfers: &[NetTransfer]) -> Self {
        let mut flows: Vec<MemberFlow> = matrix
            .members()
            .iter()
            .map(|m| MemberFlow {
                member: m.clone(),
                paid: Decimal::ZERO,
                received: Decimal::ZERO,
            })
            .collect();

        for t in transfers {
            if let Some(flow) = flows.iter_mut().find(|f| f.member == t.debtor) {
                flow.paid += t.amount;
            }
            if let Some(flow) = flows.iter_mut().find(|f| f.member == t.creditor) {
                flow.received += t.amount;
            }
        }

        SettlementSummary {
            gross_total: matrix.gross_total(),
            net_total: transfers.iter().map(|t| t.amount).sum(),
            transfer_count: transfers.len(),
            flows,
        }
    }

    /// Money that never has to move thanks to pairwise netting.
    pub fn savings(&self) -> Decimal {
        self.gross_total - self.net_total
    }

    /// Savings as a percentage of gross.
    pub fn savings_percent(&self) -> f64 {
        if self.gross_total == Decimal::ZERO {
            return 0.0;
        }
        let pct = self.savings() * Decimal::from(100) / self.gross_total;
        pct.to_string().parse::<f64>().unwrap_or(0.0)
    }

    /// Flow of a specific member, if part of the settlement.
    pub fn flow(&self, member: &MemberId) -> Option<&MemberFlow> {
        self.flows.iter().find(|f| &f.member == member)
    }

    /// Total paid equals total received.
    pub fn is_balanced(&self) -> bool {
        let paid: Decimal = self.flows.iter().map(|f| f.paid).sum();
        let received: Decimal = self.flows.iter().map(|f| f.received).sum();
        paid == received
    }
}

impl std::fmt::Display for SettlementSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Settlement Summary ===")?;
        writeln!(f, "Gross Total:    {}", self.gross_total.round_dp(2))?;
        writeln!(f, "Net Total:      {}", self.net_total)?;
        writeln!(f, "Savings:        {}", self.savings().round_dp(2))?;
        writeln!(f, "Savings %:      {:.1}%", self.savings_percent())?;
        writeln!(f, "Transfers:      {}", self.transfer_count)?;

        writeln!(f, "\nMember Flows:")?;
        for flow in &self.flows {
            writeln!(
                f,
                "  {:<12} pays {:>10}  receives {:>10}  net {:>10}",
                flow.member,
                flow.paid,
                flow.received,
                flow.net()
            )?;
        }
        Ok(())
    }
}
