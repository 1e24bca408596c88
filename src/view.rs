use serde::Serialize;

use crate::{MovementKind, SessionState};

#[derive(Debug, Clone, Serialize)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
    pub savings_rate: f64,
}

#[derive(Serialize)]
pub struct GoalPanel {
    pub progress_percent: f64,
    pub status: String,
    pub tone: String,
}

#[derive(Serialize)]
pub struct HistoryEntry {
    pub concept: String,
    pub amount: String,
    pub kind: MovementKind,
}

#[derive(Serialize)]
pub struct DashboardView {
    pub total_income: String,
    pub total_expense: String,
    pub balance: String,
    pub savings_rate: String,
    pub goal_input: String,
    pub goal: GoalPanel,
    pub history: Vec<HistoryEntry>,
    pub history_placeholder: Option<String>,
}

fn pesos(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        cents % 100
    )
}

pub fn compute_totals(state: &SessionState) -> Totals {
    let mut income = 0.0;
    let mut expense = 0.0;
    for movement in &state.movements {
        match movement.kind {
            MovementKind::Income => income += movement.amount,
            MovementKind::Expense => expense += movement.amount,
        }
    }

    let balance = income - expense;
    let savings_rate = if income > 0.0 {
        balance / income * 100.0
    } else {
        0.0
    };

    Totals {
        income,
        expense,
        balance,
        savings_rate,
    }
}

fn goal_panel(balance: f64, goal: f64) -> GoalPanel {
    if goal <= 0.0 {
        return GoalPanel {
            progress_percent: 0.0,
            status: "Define una meta para ver tu progreso.".to_string(),
            tone: "neutral".to_string(),
        };
    }

    let progress_percent = (balance / goal * 100.0).clamp(0.0, 100.0);

    if balance >= goal {
        return GoalPanel {
            progress_percent,
            status: format!(
                "¡Meta cumplida! Has superado tu objetivo mensual de {}.",
                pesos(goal)
            ),
            tone: "success".to_string(),
        };
    }

    let missing = goal - balance.max(0.0);
    GoalPanel {
        progress_percent,
        status: format!("Te faltan {} para cumplir tu meta de ahorro.", pesos(missing)),
        tone: "warn".to_string(),
    }
}

/// Stateless projection of the session onto the display regions. Safe to
/// call repeatedly with the same input.
pub fn build_dashboard(state: &SessionState) -> DashboardView {
    let totals = compute_totals(state);

    let history: Vec<HistoryEntry> = state
        .movements
        .iter()
        .map(|movement| {
            let sign = match movement.kind {
                MovementKind::Income => "+",
                MovementKind::Expense => "-",
            };
            HistoryEntry {
                concept: movement.concept.clone(),
                amount: format!("{} {}", sign, pesos(movement.amount)),
                kind: movement.kind,
            }
        })
        .collect();
    let history_placeholder = if history.is_empty() {
        Some("Aún no hay movimientos registrados.".to_string())
    } else {
        None
    };

    DashboardView {
        total_income: pesos(totals.income),
        total_expense: pesos(totals.expense),
        balance: pesos(totals.balance),
        savings_rate: format!("{:.1}%", totals.savings_rate),
        goal_input: if state.goal > 0.0 {
            state.goal.to_string()
        } else {
            String::new()
        },
        goal: goal_panel(totals.balance, state.goal),
        history,
        history_placeholder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Movement;
    use chrono::Utc;
    use uuid::Uuid;

    fn movement(concept: &str, kind: MovementKind, amount: f64) -> Movement {
        Movement {
            id: Uuid::new_v4(),
            concept: concept.to_string(),
            kind,
            amount,
            created_at: Utc::now(),
        }
    }

    fn session(movements: Vec<Movement>, goal: f64) -> SessionState {
        SessionState { movements, goal }
    }

    #[test]
    fn totals_balance_matches_manual_summation() {
        let state = session(
            vec![
                movement("Extra", MovementKind::Income, 250.75),
                movement("Renta", MovementKind::Expense, 400.0),
                movement("Salario", MovementKind::Income, 1000.0),
            ],
            0.0,
        );

        let totals = compute_totals(&state);
        assert_eq!(totals.income, 1250.75);
        assert_eq!(totals.expense, 400.0);
        assert_eq!(totals.balance, totals.income - totals.expense);
    }

    #[test]
    fn savings_rate_is_zero_without_income() {
        let state = session(vec![movement("Renta", MovementKind::Expense, 400.0)], 0.0);
        let totals = compute_totals(&state);
        assert_eq!(totals.balance, -400.0);
        assert_eq!(totals.savings_rate, 0.0);
    }

    #[test]
    fn single_income_reads_as_full_savings_rate() {
        let state = session(vec![movement("Salario", MovementKind::Income, 1000.0)], 0.0);
        let view = build_dashboard(&state);
        assert_eq!(view.total_income, "$1,000.00");
        assert_eq!(view.total_expense, "$0.00");
        assert_eq!(view.balance, "$1,000.00");
        assert_eq!(view.savings_rate, "100.0%");
    }

    #[test]
    fn history_keeps_store_order_and_signs_amounts() {
        let state = session(
            vec![
                movement("Renta", MovementKind::Expense, 400.0),
                movement("Salario", MovementKind::Income, 1000.0),
            ],
            0.0,
        );

        let view = build_dashboard(&state);
        assert_eq!(view.savings_rate, "60.0%");
        assert_eq!(view.history[0].concept, "Renta");
        assert_eq!(view.history[0].amount, "- $400.00");
        assert_eq!(view.history[1].concept, "Salario");
        assert_eq!(view.history[1].amount, "+ $1,000.00");
        assert!(view.history_placeholder.is_none());
    }

    #[test]
    fn empty_history_shows_placeholder() {
        let view = build_dashboard(&session(vec![], 0.0));
        assert!(view.history.is_empty());
        assert_eq!(
            view.history_placeholder.as_deref(),
            Some("Aún no hay movimientos registrados.")
        );
    }

    #[test]
    fn zero_goal_stays_neutral_regardless_of_balance() {
        let state = session(vec![movement("Salario", MovementKind::Income, 9000.0)], 0.0);
        let view = build_dashboard(&state);
        assert_eq!(view.goal.progress_percent, 0.0);
        assert_eq!(view.goal.status, "Define una meta para ver tu progreso.");
        assert_eq!(view.goal.tone, "neutral");
        assert_eq!(view.goal_input, "");
    }

    #[test]
    fn met_goal_caps_progress_at_one_hundred() {
        let state = session(
            vec![movement("Salario", MovementKind::Income, 50_000.0)],
            100.0,
        );
        let view = build_dashboard(&state);
        assert_eq!(view.goal.progress_percent, 100.0);
        assert_eq!(view.goal.tone, "success");
        assert!(view.goal.status.contains("$100.00"));
    }

    #[test]
    fn missing_amount_ignores_negative_balance() {
        let state = session(vec![movement("Renta", MovementKind::Expense, 400.0)], 1000.0);
        let view = build_dashboard(&state);
        assert_eq!(view.goal.progress_percent, 0.0);
        assert_eq!(view.goal.tone, "warn");
        // remaining amount is measured from zero, not from the deficit
        assert!(view.goal.status.contains("$1,000.00"));
    }

    #[test]
    fn partial_progress_reports_missing_amount() {
        let state = session(
            vec![
                movement("Renta", MovementKind::Expense, 400.0),
                movement("Salario", MovementKind::Income, 1000.0),
            ],
            1000.0,
        );
        let view = build_dashboard(&state);
        assert_eq!(view.goal.progress_percent, 60.0);
        assert!(view.goal.status.contains("$400.00"));
        assert_eq!(view.goal_input, "1000");
    }

    #[test]
    fn projection_is_idempotent() {
        let state = session(
            vec![
                movement("Renta", MovementKind::Expense, 400.0),
                movement("Salario", MovementKind::Income, 1000.0),
            ],
            750.0,
        );

        let first = serde_json::to_value(build_dashboard(&state)).expect("serialize view");
        let second = serde_json::to_value(build_dashboard(&state)).expect("serialize view");
        assert_eq!(first, second);
    }

    #[test]
    fn pesos_groups_thousands_and_keeps_sign() {
        let state = session(
            vec![
                movement("Venta", MovementKind::Income, 1_234_567.5),
                movement("Compra", MovementKind::Expense, 2_234_567.5),
            ],
            0.0,
        );
        let view = build_dashboard(&state);
        assert_eq!(view.total_income, "$1,234,567.50");
        assert_eq!(view.balance, "-$1,000,000.00");
    }
}
