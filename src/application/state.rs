use std::sync::Arc;

use crate::application::services::{
    BookService, GoalService, SeriesService, SessionService, StatsService,
};
use crate::domain::repositories::{
    BookRepository, GoalRepository, SeriesRepository, SessionRepository, StatsRepository,
    TokenRepository, UserRepository,
};
use crate::infrastructure::database::Database;
use crate::infrastructure::repositories::book_repos::SqlBookRepository;
use crate::infrastructure::repositories::goals::SqlGoalRepository;
use crate::infrastructure::repositories::series::SqlSeriesRepository;
use crate::infrastructure::repositories::sessions::SqlSessionRepository;
use crate::infrastructure::repositories::stats::SqlStatsRepository;
use crate::infrastructure::repositories::tokens::SqlTokenRepository;
use crate::infrastructure::repositories::users::SqlUserRepository;

#[derive(Clone)]
pub struct AppState {
    pub user_repo: Arc<dyn UserRepository>,
    pub token_repo: Arc<dyn TokenRepository>,
    pub book_service: BookService,
    pub session_service: SessionService,
    pub stats_service: StatsService,
    pub goal_service: GoalService,
    pub series_service: SeriesService,
}

impl AppState {
    /// Build the full application state from a database connection.
    /// Creates all repositories and services internally.
    pub fn from_database(database: &Database) -> Self {
        let pool = database.clone_pool();

        let user_repo: Arc<dyn UserRepository> = Arc::new(SqlUserRepository::new(pool.clone()));
        let token_repo: Arc<dyn TokenRepository> = Arc::new(SqlTokenRepository::new(pool.clone()));
        let book_repo: Arc<dyn BookRepository> = Arc::new(SqlBookRepository::new(pool.clone()));
        let session_repo: Arc<dyn SessionRepository> =
            Arc::new(SqlSessionRepository::new(pool.clone()));
        let series_repo: Arc<dyn SeriesRepository> =
            Arc::new(SqlSeriesRepository::new(pool.clone()));
        let goal_repo: Arc<dyn GoalRepository> = Arc::new(SqlGoalRepository::new(pool.clone()));
        let stats_repo: Arc<dyn StatsRepository> = Arc::new(SqlStatsRepository::new(pool));

        let book_service = BookService::new(
            Arc::clone(&book_repo),
            Arc::clone(&series_repo),
            Arc::clone(&session_repo),
        );
        let session_service = SessionService::new(Arc::clone(&session_repo));
        let stats_service = StatsService::new(Arc::clone(&stats_repo));
        let goal_service = GoalService::new(goal_repo, Arc::clone(&stats_repo));
        let series_service = SeriesService::new(series_repo);

        Self {
            user_repo,
            token_repo,
            book_service,
            session_service,
            stats_service,
            goal_service,
            series_service,
        }
    }
}
