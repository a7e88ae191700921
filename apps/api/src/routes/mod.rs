pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ai::handlers as ai;
use crate::plants::handlers as plants;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Plants API
        .route(
            "/plants",
            get(plants::handle_list_plants).post(plants::handle_create_plant),
        )
        .route(
            "/plants/:id",
            get(plants::handle_get_plant)
                .put(plants::handle_update_plant)
                .delete(plants::handle_delete_plant),
        )
        // Generative pass-through
        .route("/ai/generate-article", post(ai::handle_generate_article))
        .with_state(state)
}
