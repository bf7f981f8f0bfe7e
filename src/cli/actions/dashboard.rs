use crate::{
    cli::{
        actions::{redirect_error, require_session},
        globals::GlobalArgs,
    },
    features::{
        dashboard::{DashboardController, SalesPeriod},
        format::format_amount,
        screen::ScreenState,
    },
};
use anyhow::Result;

#[derive(Debug, Clone)]
pub struct Args {
    pub globals: GlobalArgs,
    pub period: SalesPeriod,
}

fn print_error<T>(panel: &str, state: &ScreenState<T>) {
    if let Some(error) = &state.error {
        eprintln!("warning: {panel}: {error}");
    }
}

/// # Errors
/// Returns an error when nobody is signed in.
pub async fn execute(args: Args) -> Result<()> {
    let (config, api) = args.globals.client()?;
    require_session(&api)?;

    let dashboard =
        DashboardController::new(api, &config.referral_base_url).with_period(args.period);
    dashboard.load().await.map_err(redirect_error)?;

    if let Some(card) = dashboard.profile_card() {
        println!("{} <{}>", card.name, card.email);
        println!("Referral code: {}", card.ref_code);
        println!("Referral link: {}", card.referral_url);
    }
    print_error("profile", &dashboard.profile_state());

    if let Some(kpis) = dashboard.kpis() {
        println!();
        for kpi in kpis {
            match kpi.badge {
                Some(badge) => println!("{:<24} {} [{badge}]", kpi.title, kpi.value),
                None => println!("{:<24} {}", kpi.title, kpi.value),
            }
        }
    }

    let sales = dashboard.sales_state();
    println!();
    println!("Sales ({})", args.period.label());
    match &sales.data {
        Some(points) if !points.is_empty() => {
            for point in points {
                println!(
                    "{:<10} {:>6} tx  ${} USDT",
                    point.axis_label,
                    point.bucket.total_transactions,
                    format_amount(point.bucket.total_usd_stake)
                );
            }
        }
        _ => println!("No sales data available"),
    }
    print_error("sales", &sales);

    let recent = dashboard.recent_state();
    println!();
    println!("Recent transactions");
    match &recent.data {
        Some(page) if !page.items.is_empty() => {
            for transaction in &page.items {
                println!(
                    "{:<25} {:<10} ${}",
                    transaction.created_at,
                    transaction.status,
                    format_amount(transaction.usd_stake.unwrap_or(0.0))
                );
            }
        }
        _ => println!("No transactions yet"),
    }
    print_error("recent transactions", &recent);

    Ok(())
}
