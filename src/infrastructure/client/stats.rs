use anyhow::Result;
use chrono::NaiveDate;

use super::BokbadClient;
use crate::domain::activity::{ActivityCalendar, YearlyBreakdown};
use crate::domain::genres::GenreBreakdown;
use crate::domain::period::{DailyActivity, PeriodStats};
use crate::domain::streak::StreakOverview;

pub struct StatsClient<'a> {
    client: &'a BokbadClient,
}

impl<'a> StatsClient<'a> {
    pub fn new(client: &'a BokbadClient) -> Self {
        Self { client }
    }

    pub async fn period(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<PeriodStats> {
        let mut url = self.client.endpoint("api/v1/stats")?;
        append_range(&mut url, from, to);
        self.client.get_json(url).await
    }

    pub async fn streak(&self, days: Option<u32>) -> Result<StreakOverview> {
        let mut url = self.client.endpoint("api/v1/stats/streak")?;
        if let Some(days) = days {
            url.query_pairs_mut().append_pair("days", &days.to_string());
        }
        self.client.get_json(url).await
    }

    pub async fn daily(
        &self,
        from: NaiveDate,
        to: Option<NaiveDate>,
    ) -> Result<Vec<DailyActivity>> {
        let mut url = self.client.endpoint("api/v1/stats/daily")?;
        append_range(&mut url, Some(from), to);
        self.client.get_json(url).await
    }

    pub async fn genres(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<GenreBreakdown> {
        let mut url = self.client.endpoint("api/v1/stats/genres")?;
        append_range(&mut url, from, to);
        self.client.get_json(url).await
    }

    pub async fn yearly(&self, year: Option<i32>, compare: bool) -> Result<YearlyBreakdown> {
        let mut url = self.client.endpoint("api/v1/stats/yearly")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(year) = year {
                pairs.append_pair("year", &year.to_string());
            }
            if compare {
                pairs.append_pair("compare", "true");
            }
        }
        self.client.get_json(url).await
    }

    pub async fn calendar(&self, year: Option<i32>, month: Option<u32>) -> Result<ActivityCalendar> {
        let mut url = self.client.endpoint("api/v1/stats/calendar")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(year) = year {
                pairs.append_pair("year", &year.to_string());
            }
            if let Some(month) = month {
                pairs.append_pair("month", &month.to_string());
            }
        }
        self.client.get_json(url).await
    }
}

fn append_range(url: &mut reqwest::Url, from: Option<NaiveDate>, to: Option<NaiveDate>) {
    if from.is_none() && to.is_none() {
        return;
    }
    let mut pairs = url.query_pairs_mut();
    if let Some(from) = from {
        pairs.append_pair("from", &from.to_string());
    }
    if let Some(to) = to {
        pairs.append_pair("to", &to.to_string());
    }
}
