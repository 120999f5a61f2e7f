//! Usage aggregation for the dashboard.
//!
//! Everything is recomputed from the `translations` table on each call;
//! nothing is cached between requests.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::str::FromStr;

use crate::db::translations;
use crate::error::Result;

/// How characters are normalised before frequency counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFolding {
    /// Count characters exactly as typed
    #[default]
    Preserve,
    /// Fold letters to uppercase before counting
    Upper,
}

impl FromStr for CaseFolding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preserve" | "none" => Ok(CaseFolding::Preserve),
            "upper" | "uppercase" => Ok(CaseFolding::Upper),
            other => Err(format!("unknown case folding: {other}")),
        }
    }
}

/// Character-frequency settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrequencyOptions {
    pub top_k: usize,
    pub case_folding: CaseFolding,
    pub strip_whitespace: bool,
}

impl Default for FrequencyOptions {
    fn default() -> Self {
        Self {
            top_k: 15,
            case_folding: CaseFolding::Preserve,
            strip_whitespace: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserUsage {
    pub username: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyUsage {
    pub day: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharCount {
    pub character: char,
    pub count: u64,
}

/// Snapshot rendered by the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total: i64,
    pub unique_users: i64,
    pub average_per_user: f64,
    pub top_users: Vec<UserUsage>,
    pub daily: Vec<DailyUsage>,
    pub top_characters: Vec<CharCount>,
}

pub async fn total_count(pool: &SqlitePool) -> Result<i64> {
    translations::total_count(pool).await
}

pub async fn unique_user_count(pool: &SqlitePool) -> Result<i64> {
    translations::unique_user_count(pool).await
}

pub async fn top_users(pool: &SqlitePool, n: u32) -> Result<Vec<UserUsage>> {
    Ok(translations::top_users(pool, n)
        .await?
        .into_iter()
        .map(|(username, count)| UserUsage { username, count })
        .collect())
}

pub async fn daily_trend(pool: &SqlitePool) -> Result<Vec<DailyUsage>> {
    Ok(translations::daily_counts(pool)
        .await?
        .into_iter()
        .map(|(day, count)| DailyUsage { day, count })
        .collect())
}

pub async fn character_frequency(
    pool: &SqlitePool,
    options: &FrequencyOptions,
) -> Result<Vec<CharCount>> {
    let texts = translations::all_input_texts(pool).await?;
    Ok(count_characters(texts.iter().map(String::as_str), options))
}

pub async fn average_per_user(pool: &SqlitePool) -> Result<f64> {
    let total = total_count(pool).await?;
    let users = unique_user_count(pool).await?;
    Ok(average(total, users))
}

/// Gather every dashboard figure in one pass
pub async fn dashboard(
    pool: &SqlitePool,
    top_users_limit: u32,
    options: &FrequencyOptions,
) -> Result<DashboardStats> {
    let total = total_count(pool).await?;
    let unique_users = unique_user_count(pool).await?;

    Ok(DashboardStats {
        total,
        unique_users,
        average_per_user: average(total, unique_users),
        top_users: top_users(pool, top_users_limit).await?,
        daily: daily_trend(pool).await?,
        top_characters: character_frequency(pool, options).await?,
    })
}

/// `total / users` rounded to two decimals; 0 when there are no users
pub fn average(total: i64, users: i64) -> f64 {
    if users <= 0 {
        return 0.0;
    }
    (total as f64 / users as f64 * 100.0).round() / 100.0
}

/// Count characters across all texts and keep the `top_k` most frequent.
///
/// Ordered by descending count, then by character so equal counts come
/// out the same way on every call.
pub fn count_characters<'a, I>(texts: I, options: &FrequencyOptions) -> Vec<CharCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<char, u64> = HashMap::new();

    for text in texts {
        for c in text.chars() {
            if options.strip_whitespace && c.is_whitespace() {
                continue;
            }
            match options.case_folding {
                CaseFolding::Preserve => *counts.entry(c).or_default() += 1,
                // Some characters uppercase to several (e.g. 'ß' -> "SS")
                CaseFolding::Upper => {
                    for upper in c.to_uppercase() {
                        *counts.entry(upper).or_default() += 1;
                    }
                }
            }
        }
    }

    let mut ranked: Vec<CharCount> = counts
        .into_iter()
        .map(|(character, count)| CharCount { character, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.character.cmp(&b.character)));
    ranked.truncate(options.top_k);
    ranked
}
