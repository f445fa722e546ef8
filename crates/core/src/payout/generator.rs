//! Payout batch generation
//!
//! Only approved sales with a stored computed block are paid. Derived splits
//! are never used for money going out.

use std::collections::BTreeMap;

use fyxed_domain::{FyxedError, Money, PayoutBatch, PayoutLine, Result, Sale, SaleStatus};

#[derive(Default)]
struct LineAccumulator<'a> {
    personal: Money,
    overrides: Money,
    sale_count: u32,
    last_sale: Option<&'a str>,
}

impl<'a> LineAccumulator<'a> {
    fn touch(&mut self, sale_id: &'a str) {
        if self.last_sale != Some(sale_id) {
            self.sale_count = self.sale_count.saturating_add(1);
            self.last_sale = Some(sale_id);
        }
    }
}

/// Aggregate approved sales into one line per recipient
///
/// Sales in any other status are ignored. Lines are sorted by user id.
///
/// # Errors
/// - `InvalidInput` when an approved sale has no computed block, or when the
///   approved sales span more than one currency
/// - `AmountOverflow` when a line or batch total leaves `i64`
pub fn generate_payouts(sales: &[Sale]) -> Result<PayoutBatch> {
    let approved: Vec<&Sale> =
        sales.iter().filter(|sale| sale.status == SaleStatus::Approved).collect();

    let missing: Vec<&str> = approved
        .iter()
        .filter(|sale| sale.computed.is_none())
        .map(|sale| sale.id.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(FyxedError::InvalidInput(format!(
            "approved sales without computed shares: {}",
            missing.join(", ")
        )));
    }

    let mut currency: Option<&str> = None;
    let mut accumulators: BTreeMap<&str, LineAccumulator<'_>> = BTreeMap::new();
    let mut batch = PayoutBatch::default();

    for sale in &approved {
        let Some(computed) = &sale.computed else { continue };

        match currency {
            None => currency = Some(sale.currency.as_str()),
            Some(expected) if !expected.eq_ignore_ascii_case(&sale.currency) => {
                return Err(FyxedError::InvalidInput(format!(
                    "payout batch mixes currencies {expected} and {} (sale '{}')",
                    sale.currency, sale.id
                )));
            }
            Some(_) => {}
        }

        let seller = accumulators.entry(sale.seller_id.as_str()).or_default();
        seller.personal = seller
            .personal
            .try_add(computed.seller_share, &format!("personal payout of '{}'", sale.seller_id))?;
        seller.touch(&sale.id);

        for (recipient, share) in [
            (computed.leader_id.as_deref(), computed.leader_share),
            (computed.sponsor_id.as_deref(), computed.sponsor_share),
        ] {
            if let Some(recipient) = recipient {
                let line = accumulators.entry(recipient).or_default();
                line.overrides =
                    line.overrides.try_add(share, &format!("override payout of '{recipient}'"))?;
                line.touch(&sale.id);
            }
        }

        batch.company_share = batch.company_share.try_add(computed.fyxed_share, "company share")?;
        batch.gross = batch.gross.try_add(sale.amount, "batch gross")?;
        batch.sale_ids.push(sale.id.clone());
    }

    batch.currency = currency.map(str::to_ascii_uppercase);
    batch.lines = accumulators
        .into_iter()
        .map(|(user_id, acc)| {
            Ok(PayoutLine {
                user_id: user_id.to_string(),
                personal: acc.personal,
                overrides: acc.overrides,
                total: acc.personal.try_add(acc.overrides, &format!("payout of '{user_id}'"))?,
                sale_count: acc.sale_count,
            })
        })
        .collect::<Result<_>>()?;

    Ok(batch)
}
