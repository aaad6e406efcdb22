//! Plain-text rendering of engine output, shared by the subcommands and
//! the chat assistant's slash commands.

use cartola_core::{
    BudgetHealth, CategoryType, DebtSummary, FinanceSnapshot, ProjectionPoint, Subscription,
};

/// Chilean peso formatting: `$6.137.000`, no decimals.
pub fn format_clp(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    if negative {
        format!("-${out}")
    } else {
        format!("${out}")
    }
}

pub fn render_health(health: &BudgetHealth, monthly_income: i64) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "Salud financiera: {:.0}/100\n",
        health.score.round()
    ));
    s.push_str(&format!("Ingreso mensual: {}\n", format_clp(monthly_income)));
    for category in [
        CategoryType::Need,
        CategoryType::Want,
        CategoryType::Savings,
    ] {
        let total = health.totals.get(category);
        let pct = match category {
            CategoryType::Need => health.need_pct,
            CategoryType::Want => health.want_pct,
            CategoryType::Savings if monthly_income > 0 => {
                total as f64 / monthly_income as f64 * 100.0
            }
            CategoryType::Savings => 0.0,
        };
        s.push_str(&format!(
            "  {:<12} {:>14}  {:>5.1}% (meta {}%)\n",
            category.label(),
            format_clp(total),
            pct,
            category.target_pct()
        ));
    }
    s
}

pub fn render_subscriptions(subs: &[Subscription]) -> String {
    if subs.is_empty() {
        return "No se detectaron suscripciones recurrentes.\n".to_string();
    }
    let mut s = String::new();
    let total: i64 = subs.iter().map(|x| x.amount).sum();
    for sub in subs {
        s.push_str(&format!(
            "  {:<28} {:>12}  {} ({} cargos)\n",
            sub.description,
            format_clp(sub.amount),
            sub.frequency,
            sub.count
        ));
    }
    s.push_str(&format!("  Total mensual: {}\n", format_clp(total)));
    s
}

pub fn render_debts(debts: &[DebtSummary]) -> String {
    if debts.is_empty() {
        return "No hay compras en cuotas activas.\n".to_string();
    }
    let mut s = String::new();
    for d in debts {
        s.push_str(&format!(
            "  {:<28} cuota {}/{} de {:>12}  saldo {:>12}  termina {}\n",
            d.description,
            d.current_installment,
            d.total_installments,
            format_clp(d.monthly_value),
            format_clp(d.remaining_balance),
            d.end_date
        ));
    }
    let total: i64 = debts.iter().map(|d| d.remaining_balance).sum();
    s.push_str(&format!("  Saldo total: {}\n", format_clp(total)));
    s
}

pub fn render_projection(points: &[ProjectionPoint]) -> String {
    let mut s = String::new();
    for p in points {
        s.push_str(&format!("  {:<4} {:>14}\n", p.month, format_clp(p.amount)));
    }
    s
}

pub fn render_summary(snapshot: &FinanceSnapshot, user_name: &str) -> String {
    let mut s = String::new();
    if user_name.is_empty() {
        s.push_str("Resumen financiero\n");
    } else {
        s.push_str(&format!("Resumen financiero de {user_name}\n"));
    }
    s.push_str(&format!(
        "  Ingreso mensual:   {}\n",
        format_clp(snapshot.monthly_income)
    ));
    s.push_str(&format!(
        "  Gasto mensual:     {}\n",
        format_clp(snapshot.total_monthly_expenses)
    ));
    s.push_str(&format!(
        "  Deuda pendiente:   {}\n",
        format_clp(snapshot.total_debt_balance)
    ));
    s.push_str(&format!(
        "  Salud financiera:  {:.0}/100\n",
        snapshot.health.score.round()
    ));
    if !snapshot.category_spending.is_empty() {
        s.push_str("  Gasto por categoría:\n");
        for c in &snapshot.category_spending {
            s.push_str(&format!("    {:<20} {:>12}\n", c.name, format_clp(c.value)));
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartola_core::{Transaction, calculate_health};
    use chrono::NaiveDate;

    #[test]
    fn test_format_clp_groups_thousands() {
        assert_eq!(format_clp(0), "$0");
        assert_eq!(format_clp(950), "$950");
        assert_eq!(format_clp(9_500), "$9.500");
        assert_eq!(format_clp(6_137_000), "$6.137.000");
        assert_eq!(format_clp(-85_000), "-$85.000");
    }

    #[test]
    fn test_render_health_mentions_score_and_targets() {
        let mut t = Transaction::new(
            "1",
            NaiveDate::from_ymd_opt(2023, 11, 1).unwrap(),
            "Arriendo",
            650_000,
        );
        t.category = Some(cartola_core::CategoryType::Need);
        let health = calculate_health(&[t], 1_300_000);
        let out = render_health(&health, 1_300_000);
        assert!(out.contains("100/100"));
        assert!(out.contains("meta 50%"));
        assert!(out.contains("$650.000"));
    }

    #[test]
    fn test_render_debts_empty() {
        assert!(render_debts(&[]).contains("cuotas"));
    }
}
