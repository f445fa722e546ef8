//! Argument parsing and dispatch for the `fyxed` binary
//!
//! Every command prints one JSON document on stdout.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use fyxed_domain::{
    BasisPoints, CommissionRates, Money, NewSale, RecomputeConfirmation, Result as DomainResult,
    SaleFilter, SaleStatus,
};
use serde::Serialize;
use serde_json::Value;

use crate::commands;
use crate::context::AppContext;

pub const USAGE: &str = "\
Fyxed commission ledger

USAGE:
    fyxed <COMMAND> [ARGS] [OPTIONS]

COMMANDS:
    hierarchy                         Sponsor forest with earnings and warnings
    team <user-id>                    Subtree rooted at one user
    record-sale <seller-id> <amount>  Record a sale (amount in major units, e.g. 12.50)
    approve <sale-id>                 Approve an open sale
    recompute                         Recompute every stored split (needs both opt-in flags)
    rates                             Show the commission rates in effect
    rates set <seller> <leader> <sponsor> <fyxed>
                                      Store new rates in percent, e.g. 50 10 10 30
    payouts preview                   Payout batch for approved sales
    payouts settle                    Same batch, and mark its sales paid
    import <file.json>                Upsert users and insert sales from a snapshot
    help                              Show this help message

OPTIONS:
    --from <date>                     Only sales created at or after (YYYY-MM-DD or RFC 3339)
    --to <date>                       Only sales created before
    --status <s1,s2>                  Only sales with these statuses (open, approved, paid)
    --currency <code>                 Currency for record-sale
    --at <date>                       Creation time for record-sale
    --confirm                         Recompute opt-in
    --acknowledge-overwrite           Recompute opt-in";

/// A parsed command line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Hierarchy { filter: SaleFilter },
    Team { user_id: String, filter: SaleFilter },
    RecordSale(NewSale),
    Approve { sale_id: String },
    Recompute(RecomputeConfirmation),
    ShowRates,
    SetRates(CommissionRates),
    PreviewPayouts { filter: SaleFilter },
    SettlePayouts { filter: SaleFilter },
    Import { path: PathBuf },
    Help,
}

/// Result of a dispatched command
///
/// `ok` is false when the command completed but reported failures, such as
/// a recompute that was not applied.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub body: Value,
    pub ok: bool,
}

const SWITCHES: [&str; 2] = ["--confirm", "--acknowledge-overwrite"];

/// Positional arguments and `--option value` pairs
#[derive(Debug, Default)]
struct Args {
    positional: Vec<String>,
    options: Vec<(String, String)>,
    switches: Vec<String>,
}

impl Args {
    fn split(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut parsed = Self::default();
        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            if SWITCHES.contains(&arg.as_str()) {
                parsed.switches.push(arg);
            } else if arg.starts_with("--") {
                let value = iter.next().ok_or_else(|| anyhow!("{arg} needs a value"))?;
                parsed.options.push((arg, value));
            } else {
                parsed.positional.push(arg);
            }
        }
        Ok(parsed)
    }

    fn option(&self, name: &str) -> Option<&str> {
        self.options.iter().rev().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    fn switch(&self, name: &str) -> bool {
        self.switches.iter().any(|s| s == name)
    }

    /// Exactly `N` positional arguments, or the usage line as the error
    fn positional<const N: usize>(&self, usage: &str) -> anyhow::Result<&[String; N]> {
        <&[String; N]>::try_from(self.positional.as_slice())
            .map_err(|_| anyhow!("usage: fyxed {usage}"))
    }

    fn filter(&self) -> anyhow::Result<SaleFilter> {
        let statuses = match self.option("--status") {
            Some(list) => list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse::<SaleStatus>().map_err(|e| anyhow!(e)))
                .collect::<anyhow::Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(SaleFilter {
            from: self.option("--from").map(parse_instant).transpose()?,
            to: self.option("--to").map(parse_instant).transpose()?,
            statuses,
        })
    }
}

/// Parse the arguments that follow the program name
pub fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Command> {
    let mut args = args.into_iter();
    let Some(command) = args.next() else {
        return Ok(Command::Help);
    };
    let rest = Args::split(args)?;

    let parsed = match command.as_str() {
        "hierarchy" => {
            rest.positional::<0>("hierarchy [--from] [--to] [--status]")?;
            Command::Hierarchy { filter: rest.filter()? }
        }
        "team" => {
            let [user_id] = rest.positional("team <user-id>")?;
            Command::Team { user_id: user_id.clone(), filter: rest.filter()? }
        }
        "record-sale" => {
            let [seller_id, amount] = rest.positional("record-sale <seller-id> <amount>")?;
            Command::RecordSale(NewSale {
                seller_id: seller_id.clone(),
                amount: amount.parse::<Money>()?,
                currency: rest.option("--currency").map(str::to_string),
                created_at: rest.option("--at").map(parse_instant).transpose()?,
            })
        }
        "approve" => {
            let [sale_id] = rest.positional("approve <sale-id>")?;
            Command::Approve { sale_id: sale_id.clone() }
        }
        "recompute" => Command::Recompute(RecomputeConfirmation {
            confirmed: rest.switch("--confirm"),
            acknowledge_overwrite: rest.switch("--acknowledge-overwrite"),
        }),
        "rates" => match rest.positional.first().map(String::as_str) {
            None | Some("get") => Command::ShowRates,
            Some("set") => {
                let [_, seller, leader, sponsor, fyxed] =
                    rest.positional("rates set <seller> <leader> <sponsor> <fyxed>")?;
                Command::SetRates(CommissionRates::new(
                    seller.parse::<BasisPoints>()?,
                    leader.parse::<BasisPoints>()?,
                    sponsor.parse::<BasisPoints>()?,
                    fyxed.parse::<BasisPoints>()?,
                ))
            }
            Some(other) => bail!("unknown rates action '{other}'"),
        },
        "payouts" => match rest.positional.first().map(String::as_str) {
            Some("preview") => Command::PreviewPayouts { filter: rest.filter()? },
            Some("settle") => Command::SettlePayouts { filter: rest.filter()? },
            _ => bail!("usage: fyxed payouts <preview|settle>"),
        },
        "import" => {
            let [path] = rest.positional("import <file.json>")?;
            Command::Import { path: PathBuf::from(path) }
        }
        "help" | "--help" | "-h" => Command::Help,
        unknown => bail!("unknown command '{unknown}'"),
    };

    Ok(parsed)
}

/// Run a parsed command against the context
pub async fn dispatch(ctx: &AppContext, command: Command) -> DomainResult<CommandOutput> {
    match command {
        Command::Hierarchy { filter } => ok(commands::get_hierarchy(ctx, &filter).await?),
        Command::Team { user_id, filter } => ok(commands::get_team(ctx, &user_id, &filter).await?),
        Command::RecordSale(new_sale) => ok(commands::record_sale(ctx, new_sale).await?),
        Command::Approve { sale_id } => ok(commands::approve_sale(ctx, &sale_id).await?),
        Command::Recompute(confirmation) => {
            let report = commands::recompute_commissions(ctx, confirmation).await?;
            Ok(CommandOutput { ok: report.failed.is_empty(), body: serde_json::to_value(report)? })
        }
        Command::ShowRates => ok(commands::get_commission_rates(ctx).await?),
        Command::SetRates(rates) => ok(commands::update_commission_rates(ctx, rates).await?),
        Command::PreviewPayouts { filter } => ok(commands::preview_payouts(ctx, &filter).await?),
        Command::SettlePayouts { filter } => ok(commands::settle_payouts(ctx, &filter).await?),
        Command::Import { path } => ok(commands::import_snapshot(ctx, &path).await?),
        Command::Help => Ok(CommandOutput { body: Value::String(USAGE.to_string()), ok: true }),
    }
}

fn ok<T: Serialize>(value: T) -> DomainResult<CommandOutput> {
    Ok(CommandOutput { body: serde_json::to_value(value)?, ok: true })
}

/// `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp
fn parse_instant(text: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{text}'"))?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| anyhow!("invalid date '{text}'"))?;
    Ok(Utc.from_utc_datetime(&midnight))
}
