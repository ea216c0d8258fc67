use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

mod config;
mod error;
mod planner;
mod player;
mod quest;
mod reward;
mod skills;
mod skillset;
mod strategy;
mod training;

use config::ServerConfig;
use error::{PlanError, Result};
use planner::optimal_search;
use player::Player;
use quest::QuestRegistry;
use skills::{min_xp_for_level, Skill};
use skillset::SkillSet;

// ============================================================================
// App State
// ============================================================================

#[derive(Clone)]
struct AppState {
    // Frozen after load; shared read-only across planning requests.
    registry: Arc<QuestRegistry>,
}

// ============================================================================
// HTTP Handlers - Catalog
// ============================================================================

#[derive(Serialize)]
struct QuestSummary {
    id: i64,
    name: String,
    difficulty: String,
    combat_requirement: i32,
    qp_requirement: i32,
    quest_points: i32,
}

/// GET /api/quests - the catalog summary a front-end renders its form from
async fn list_quests(State(state): State<AppState>) -> impl IntoResponse {
    let mut quests: Vec<QuestSummary> = state
        .registry
        .all()
        .map(|quest| QuestSummary {
            id: quest.id,
            name: quest.name.clone(),
            difficulty: quest.difficulty.as_str().to_string(),
            combat_requirement: quest.combat_requirement,
            qp_requirement: quest.qp_requirement,
            quest_points: quest.quest_points,
        })
        .collect();
    quests.sort_by_key(|quest| quest.id);
    Json(quests)
}

// ============================================================================
// HTTP Handlers - Planning
// ============================================================================

/// Initial value for one skill: raw XP, or a level converted through the
/// XP table. XP wins if both are supplied.
#[derive(Deserialize)]
struct InitialSkill {
    skill: String,
    xp: Option<i64>,
    level: Option<i32>,
}

#[derive(Deserialize)]
struct PlanRequest {
    #[serde(default)]
    skills: Vec<InitialSkill>,
    #[serde(default)]
    completed_quests: Vec<i64>,
}

#[derive(Serialize)]
struct PlanEntry {
    id: i64,
    name: String,
    steps: Vec<String>,
}

#[derive(Serialize)]
struct PlanResponse {
    plan: Vec<PlanEntry>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_player(request: &PlanRequest) -> Result<Player> {
    let mut skills = SkillSet::new();
    for entry in &request.skills {
        let skill = Skill::from_name(&entry.skill)?;
        let xp = match (entry.xp, entry.level) {
            (Some(xp), _) => u64::try_from(xp).map_err(|_| PlanError::InvalidXp(xp))?,
            (None, Some(level)) => min_xp_for_level(level)?,
            (None, None) => continue,
        };
        skills.set(skill, xp);
    }

    let mut player = Player::with_skills(skills);
    for &quest_id in &request.completed_quests {
        player.mark_completed(quest_id);
    }
    Ok(player)
}

/// POST /api/plan - run the planner for the submitted starting state
async fn plan(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> impl IntoResponse {
    let mut player = match build_player(&request) {
        Ok(player) => player,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    match optimal_search(&mut player, &state.registry) {
        Ok(strategy) => {
            let plan: Vec<PlanEntry> = strategy
                .iter()
                .map(|item| PlanEntry {
                    id: item.quest.id,
                    name: item.quest.name.clone(),
                    steps: item.steps.iter().map(ToString::to_string).collect(),
                })
                .collect();
            Json(PlanResponse { plan }).into_response()
        }
        Err(e) => {
            error!("Planning failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().timestamp_millis()
    }))
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quest_planner_server=info".parse().unwrap()),
        )
        .init();

    let config = ServerConfig::load(Path::new("config.toml"));

    let registry = match QuestRegistry::load_from_file(&config.catalog_path) {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            error!("Failed to load quest catalog: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState { registry };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/quests", get(list_quests))
        .route("/api/plan", post(plan))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        )
        .with_state(state);

    info!("Quest planner listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_player_from_mixed_inputs() {
        let request = PlanRequest {
            skills: vec![
                InitialSkill {
                    skill: "attack".to_string(),
                    xp: Some(30000),
                    level: None,
                },
                InitialSkill {
                    skill: "Magic".to_string(),
                    xp: None,
                    level: Some(40),
                },
            ],
            completed_quests: vec![3, 17],
        };
        let player = build_player(&request).unwrap();
        assert_eq!(player.skills.get(Skill::Attack), 30000);
        assert_eq!(player.skills.get(Skill::Magic), 37224);
        assert!(player.completed.contains(&3));
        assert!(player.completed.contains(&17));
        // Unspecified skills keep their initial values.
        assert_eq!(player.skills.get(Skill::Constitution), 1154);
    }

    #[test]
    fn test_build_player_rejects_bad_input() {
        let negative = PlanRequest {
            skills: vec![InitialSkill {
                skill: "attack".to_string(),
                xp: Some(-10),
                level: None,
            }],
            completed_quests: Vec::new(),
        };
        assert!(matches!(
            build_player(&negative),
            Err(PlanError::InvalidXp(-10))
        ));

        let unknown = PlanRequest {
            skills: vec![InitialSkill {
                skill: "sailing".to_string(),
                xp: Some(10),
                level: None,
            }],
            completed_quests: Vec::new(),
        };
        assert!(matches!(
            build_player(&unknown),
            Err(PlanError::UnknownSkill(_))
        ));

        let bad_level = PlanRequest {
            skills: vec![InitialSkill {
                skill: "attack".to_string(),
                xp: None,
                level: Some(121),
            }],
            completed_quests: Vec::new(),
        };
        assert!(matches!(
            build_player(&bad_level),
            Err(PlanError::InvalidLevel(121))
        ));
    }
}
