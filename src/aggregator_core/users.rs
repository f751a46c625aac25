//! Synthetic team members and team-level rollups

use super::ranking::RankingEngine;
use super::types::{round_to, Ranking};
use crate::random::RandomSource;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const FIRST_NAMES: [&str; 15] = [
    "James", "Emma", "Michael", "Olivia", "William", "Ava", "Alexander", "Sophia", "Daniel",
    "Isabella", "David", "Mia", "Joseph", "Charlotte", "Andrew",
];

const LAST_NAMES: [&str; 15] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Wilson", "Anderson", "Taylor", "Thomas", "Moore",
];

const DEPARTMENTS: [&str; 4] = ["Sales", "Marketing", "Support", "Operations"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Sales,
    Support,
}

impl Role {
    const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Sales, Role::Support];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub sales: u32,
    pub revenue: f64,
    /// Same metric for the prior period; drives ranking trends
    pub previous_revenue: f64,
    pub conversion_rate: f64,
    pub avg_order_value: f64,
    pub target: f64,
    pub achieved: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: String,
    pub performance: Performance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPerformance {
    pub department: String,
    pub total_revenue: f64,
    pub avg_revenue: f64,
    pub member_count: usize,
    pub target_achievement: f64,
    pub top_performer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_users: usize,
    pub active_users: usize,
    pub new_users_this_month: usize,
    pub avg_performance: f64,
    pub top_performer_revenue: f64,
}

/// One metric of a member set against the whole team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub name: String,
    pub value: f64,
    pub team_avg: f64,
    /// Share of the team strictly below `value`, 0..=100
    pub percentile: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceComparison {
    pub user_id: String,
    pub user_name: String,
    pub metrics: Vec<MetricComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub revenue: f64,
}

/// Members shown when none of the requested ids match
const DEFAULT_COMPARISON_SIZE: usize = 5;

/// Generate `count` team members
pub fn generate_members(rng: &mut dyn RandomSource, count: usize) -> Vec<TeamMember> {
    (0..count)
        .map(|i| {
            let first = FIRST_NAMES[rng.index(FIRST_NAMES.len())];
            let last = LAST_NAMES[rng.index(LAST_NAMES.len())];
            let target = rng.int_inclusive(50_000, 100_000) as f64;
            let achieved = round_to(rng.uniform(target * 0.6, target * 1.2), 2);
            let revenue = round_to(rng.uniform(10_000.0, 80_000.0), 2);

            TeamMember {
                id: format!("usr-{:03}", i + 1),
                name: format!("{} {}", first, last),
                email: format!("{}.{}@company.com", first.to_lowercase(), last.to_lowercase()),
                role: Role::ALL[rng.index(Role::ALL.len())],
                department: DEPARTMENTS[rng.index(DEPARTMENTS.len())].to_string(),
                performance: Performance {
                    sales: rng.int_inclusive(20, 150) as u32,
                    revenue,
                    previous_revenue: round_to(revenue * rng.uniform(0.8, 1.2), 2),
                    conversion_rate: round_to(rng.uniform(2.0, 8.0), 2),
                    avg_order_value: round_to(rng.uniform(50.0, 200.0), 2),
                    target,
                    achieved,
                },
            }
        })
        .collect()
}

/// Members ranked by revenue, trend against their previous-period revenue
pub fn rank_by_revenue(engine: &RankingEngine, members: &[TeamMember], limit: usize) -> Vec<Ranking<TeamMember>> {
    engine.rank(
        members,
        |m| m.performance.revenue,
        |m| Some(m.performance.previous_revenue),
        limit,
    )
}

/// Per-department rollup, sorted descending by total revenue
pub fn team_performance(members: &[TeamMember]) -> Vec<TeamPerformance> {
    let mut departments: BTreeMap<&str, Vec<&TeamMember>> = BTreeMap::new();
    for member in members {
        departments.entry(member.department.as_str()).or_default().push(member);
    }

    let mut teams: Vec<TeamPerformance> = departments
        .into_iter()
        .map(|(department, team)| {
            let total_revenue: f64 = team.iter().map(|m| m.performance.revenue).sum();
            let total_target: f64 = team.iter().map(|m| m.performance.target).sum();
            let total_achieved: f64 = team.iter().map(|m| m.performance.achieved).sum();

            let top_performer = team
                .iter()
                .max_by(|a, b| a.performance.revenue.total_cmp(&b.performance.revenue))
                .map(|m| m.name.clone())
                .unwrap_or_else(|| "N/A".to_string());

            let target_achievement = if total_target > 0.0 {
                round_to(total_achieved / total_target * 100.0, 1)
            } else {
                0.0
            };

            TeamPerformance {
                department: department.to_string(),
                total_revenue: round_to(total_revenue, 2),
                avg_revenue: round_to(total_revenue / team.len() as f64, 2),
                member_count: team.len(),
                target_achievement,
                top_performer,
            }
        })
        .collect();

    teams.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
    teams
}

pub fn find_member<'a>(members: &'a [TeamMember], id: &str) -> Option<&'a TeamMember> {
    members.iter().find(|m| m.id == id)
}

/// Position of `value` in the ascending population, as a percentage
///
/// Counts the entries strictly below `value`.
fn population_percentile(value: f64, population: &[f64]) -> u32 {
    if population.is_empty() {
        return 0;
    }
    let mut sorted = population.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let index = sorted.iter().position(|v| *v >= value).unwrap_or(sorted.len());
    (index as f64 / sorted.len() as f64 * 100.0).round() as u32
}

fn compare_metric(
    name: &str,
    members: &[TeamMember],
    member: &TeamMember,
    decimals: i32,
    metric: fn(&Performance) -> f64,
) -> MetricComparison {
    let population: Vec<f64> = members.iter().map(|m| metric(&m.performance)).collect();
    let value = metric(&member.performance);

    MetricComparison {
        name: name.to_string(),
        value,
        team_avg: round_to(population.iter().sum::<f64>() / population.len() as f64, decimals),
        percentile: population_percentile(value, &population),
    }
}

/// Revenue, sales, conversion rate and average order value of each requested
/// member against the team
///
/// Ids that match nobody are skipped. If none match, the first
/// `min(ids.len(), 5)` members are compared instead.
pub fn compare_members<S: AsRef<str>>(members: &[TeamMember], ids: &[S]) -> Vec<PerformanceComparison> {
    let mut selected: Vec<&TeamMember> = members
        .iter()
        .filter(|m| ids.iter().any(|id| id.as_ref() == m.id))
        .collect();
    if selected.is_empty() {
        selected = members
            .iter()
            .take(ids.len().min(DEFAULT_COMPARISON_SIZE))
            .collect();
    }

    selected
        .into_iter()
        .map(|member| PerformanceComparison {
            user_id: member.id.clone(),
            user_name: member.name.clone(),
            metrics: vec![
                compare_metric("Revenue", members, member, 2, |p| p.revenue),
                compare_metric("Sales", members, member, 0, |p| p.sales as f64),
                compare_metric("Conversion Rate", members, member, 2, |p| p.conversion_rate),
                compare_metric("Avg Order Value", members, member, 2, |p| p.avg_order_value),
            ],
        })
        .collect()
}

/// Daily revenue for the `days` days up to and including `end`
///
/// `revenue = base * (1 + elapsed/days * 0.2) * (1 + uniform(-0.15, 0.15))`,
/// oldest first, `days + 1` points.
pub fn performance_trend(rng: &mut dyn RandomSource, base: f64, end: NaiveDate, days: u32) -> Vec<TrendPoint> {
    (0..=days)
        .rev()
        .map(|remaining| {
            let elapsed = days - remaining;
            let trend = if days == 0 {
                1.0
            } else {
                1.0 + elapsed as f64 / days as f64 * 0.2
            };
            let variance = rng.uniform(-0.15, 0.15);

            TrendPoint {
                date: end - Duration::days(remaining as i64),
                revenue: round_to(base * trend * (1.0 + variance), 2),
            }
        })
        .collect()
}

pub fn user_stats(members: &[TeamMember]) -> UserStats {
    let total = members.len();
    let ratios: Vec<f64> = members
        .iter()
        .filter(|m| m.performance.target > 0.0)
        .map(|m| m.performance.achieved / m.performance.target)
        .collect();

    let avg_performance = if ratios.is_empty() {
        0.0
    } else {
        round_to(ratios.iter().sum::<f64>() / ratios.len() as f64 * 100.0, 1)
    };

    UserStats {
        total_users: total,
        active_users: (total as f64 * 0.85).floor() as usize,
        new_users_this_month: (total as f64 * 0.15).floor() as usize,
        avg_performance,
        top_performer_revenue: members
            .iter()
            .map(|m| m.performance.revenue)
            .fold(0.0, f64::max),
    }
}
