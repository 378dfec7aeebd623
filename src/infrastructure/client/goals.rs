use anyhow::Result;
use reqwest::Method;

use super::BokbadClient;
use crate::domain::goals::{GoalProgress, GoalTargets, ReadingGoal};

pub struct GoalsClient<'a> {
    client: &'a BokbadClient,
}

impl<'a> GoalsClient<'a> {
    pub fn new(client: &'a BokbadClient) -> Self {
        Self { client }
    }

    pub async fn set(&self, year: i32, targets: &GoalTargets) -> Result<ReadingGoal> {
        let url = self.client.endpoint(&format!("api/v1/goals/{year}"))?;
        self.client.send_json(Method::PUT, url, targets).await
    }

    pub async fn get(&self, year: i32) -> Result<GoalProgress> {
        let url = self.client.endpoint(&format!("api/v1/goals/{year}"))?;
        self.client.get_json(url).await
    }

    pub async fn delete(&self, year: i32) -> Result<()> {
        let url = self.client.endpoint(&format!("api/v1/goals/{year}"))?;
        self.client.delete(url).await
    }
}
