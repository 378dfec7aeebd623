mod helpers;
mod series_api;
mod sessions_api;
mod stats_api;
