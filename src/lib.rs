pub mod store;
pub mod view;

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Manager, State};
use uuid::Uuid;

use view::DashboardView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    pub id: Uuid,
    pub concept: String,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub amount: f64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub movements: Vec<Movement>,
    pub goal: f64,
}

/// The single session instance, handed to the shell at startup and passed
/// to every handler explicitly.
pub struct Tracker(pub Mutex<SessionState>);

fn parse_positive_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
}

fn parse_goal(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|goal| goal.is_finite() && *goal >= 0.0)
        .unwrap_or(0.0)
}

pub fn add_movement_internal(
    path: &Path,
    state: &mut SessionState,
    concept: &str,
    kind: MovementKind,
    amount: &str,
) -> Result<DashboardView, String> {
    let concept = concept.trim();
    let amount = match parse_positive_amount(amount) {
        Some(amount) if !concept.is_empty() => amount,
        // Rejected input is dropped silently; the unchanged view goes back.
        _ => return Ok(view::build_dashboard(state)),
    };

    state.movements.insert(
        0,
        Movement {
            id: Uuid::new_v4(),
            concept: concept.to_string(),
            kind,
            amount,
            created_at: Utc::now(),
        },
    );
    store::save(path, state).map_err(|err| err.to_string())?;
    Ok(view::build_dashboard(state))
}

pub fn clear_movements_internal(
    path: &Path,
    state: &mut SessionState,
) -> Result<DashboardView, String> {
    state.movements.clear();
    store::save(path, state).map_err(|err| err.to_string())?;
    Ok(view::build_dashboard(state))
}

pub fn set_goal_internal(
    path: &Path,
    state: &mut SessionState,
    goal: &str,
) -> Result<DashboardView, String> {
    state.goal = parse_goal(goal);
    store::save(path, state).map_err(|err| err.to_string())?;
    Ok(view::build_dashboard(state))
}

#[tauri::command(rename_all = "snake_case")]
fn get_dashboard(tracker: State<'_, Tracker>) -> Result<DashboardView, String> {
    let state = tracker.0.lock().map_err(|err| err.to_string())?;
    Ok(view::build_dashboard(&state))
}

#[tauri::command(rename_all = "snake_case")]
fn add_movement(
    app: AppHandle,
    tracker: State<'_, Tracker>,
    concept: String,
    kind: MovementKind,
    amount: String,
) -> Result<DashboardView, String> {
    let path = store::data_path(&app).map_err(|err| err.to_string())?;
    let mut state = tracker.0.lock().map_err(|err| err.to_string())?;
    add_movement_internal(&path, &mut state, &concept, kind, &amount)
}

#[tauri::command(rename_all = "snake_case")]
fn clear_movements(
    app: AppHandle,
    tracker: State<'_, Tracker>,
) -> Result<DashboardView, String> {
    let path = store::data_path(&app).map_err(|err| err.to_string())?;
    let mut state = tracker.0.lock().map_err(|err| err.to_string())?;
    clear_movements_internal(&path, &mut state)
}

#[tauri::command(rename_all = "snake_case")]
fn set_goal(
    app: AppHandle,
    tracker: State<'_, Tracker>,
    goal: String,
) -> Result<DashboardView, String> {
    let path = store::data_path(&app).map_err(|err| err.to_string())?;
    let mut state = tracker.0.lock().map_err(|err| err.to_string())?;
    set_goal_internal(&path, &mut state, &goal)
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::init();
    tauri::Builder::default()
        .setup(|app| {
            let path = store::data_path(app.handle())?;
            store::init_store(&path)?;
            let state = store::load(&path);
            log::info!("session loaded with {} movements", state.movements.len());
            app.manage(Tracker(Mutex::new(state)));
            Ok(())
        })
        .plugin(tauri_plugin_opener::init())
        .invoke_handler(tauri::generate_handler![
            get_dashboard,
            add_movement,
            clear_movements,
            set_goal
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
