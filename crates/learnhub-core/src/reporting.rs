//! Cross-user performance reports for managers and HR

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use learnhub_db::entities::{course, performance_analytics, EnrollmentStatus, ProgressStatus};
use learnhub_directory::{UserDirectory, UserRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};
use utoipa::{IntoParams, ToSchema};

use crate::error::CoreError;
use crate::store::{LearningStore, ProgressFilter};

/// Size of the HR leaderboard
pub const TOP_PERFORMERS: usize = 10;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ManagerCourseScore {
    pub course_id: i32,
    pub course_code: String,
    pub course_title: String,
    pub course_description: String,
    pub detailed_description: Option<String>,
    pub instructor: String,
    pub start_date: String,
    pub end_date: String,
    pub duration: String,
    pub created_at: DateTime<Utc>,
    pub total_score: i32,
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ManagerUserReport {
    pub user_id: i32,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub courses: Vec<ManagerCourseScore>,
}

/// Query parameters of the HR report
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct HrFilters {
    pub course_id: Option<i32>,
    pub user_id: Option<i32>,
    /// `YYYY-MM-DD` or RFC 3339; bounds `last_accessed` from below
    pub start_date: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339; bounds `last_accessed` from above
    pub end_date: Option<String>,
}

impl HrFilters {
    fn to_progress_filter(&self) -> Result<ProgressFilter, CoreError> {
        Ok(ProgressFilter {
            course_id: self.course_id,
            user_id: self.user_id,
            accessed_from: self
                .start_date
                .as_deref()
                .map(|d| parse_bound(d, NaiveTime::MIN))
                .transpose()?,
            accessed_until: self
                .end_date
                .as_deref()
                .map(|d| parse_bound(d, last_instant_of_day()))
                .transpose()?,
        })
    }
}

fn last_instant_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

/// Parse an RFC 3339 timestamp, or a plain date placed at `time_of_day`
fn parse_bound(value: &str, time_of_day: NaiveTime) -> Result<DateTime<Utc>, CoreError> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(time_of_day).and_utc())
        .map_err(|_| CoreError::validation(format!("Invalid date '{}'", value)))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseTrend {
    pub course_id: i32,
    pub course_title: Option<String>,
    /// Mean of the per-user average scores
    pub average_score: f64,
    pub total_score: i64,
    pub total_employees: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TopPerformer {
    pub user_id: i32,
    pub user_name: Option<String>,
    pub total_score: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserCourseCompletion {
    pub course_id: i32,
    pub course_title: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub completion_percentage: f64,
    #[schema(value_type = String)]
    pub status: ProgressStatus,
}

#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
pub struct UserMetrics {
    pub completed_courses: usize,
    pub active_courses: usize,
    /// Sum of every quiz score of the user
    pub total_quiz_scores: i64,
    pub total_courses: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserPerformance {
    pub user_id: i32,
    pub user_name: Option<String>,
    pub courses: Vec<UserCourseCompletion>,
    pub metrics: UserMetrics,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HrReport {
    pub trends: Vec<CourseTrend>,
    pub top_performers: Vec<TopPerformer>,
    pub detailed_performance: Vec<UserPerformance>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrolledCourseStatus {
    pub course_id: i32,
    #[schema(value_type = String)]
    pub status: EnrollmentStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseCompletion {
    pub course_id: i32,
    pub course_name: Option<String>,
    pub completion_percentage: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuizScore {
    pub module_id: i32,
    pub score: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IndividualPerformance {
    pub team_member_id: i32,
    pub enrolled_courses: Vec<EnrolledCourseStatus>,
    pub course_progress: Vec<CourseCompletion>,
    pub quiz_scores: Vec<QuizScore>,
    pub active_courses: usize,
    pub completed_courses: usize,
}

/// Per-course rollup of analytics rows, ordered by course id
pub fn course_trends(rows: &[performance_analytics::Model]) -> Vec<(i32, f64, i64, usize)> {
    let mut groups: BTreeMap<i32, (f64, i64, usize)> = BTreeMap::new();
    for row in rows {
        let entry = groups.entry(row.course_id).or_insert((0.0, 0, 0));
        entry.0 += row.average_score;
        entry.1 += i64::from(row.total_score);
        entry.2 += 1;
    }
    groups
        .into_iter()
        .map(|(course_id, (average_sum, total, count))| {
            (course_id, average_sum / count as f64, total, count)
        })
        .collect()
}

/// Users ranked by total score over all courses; ties go to the lower id
pub fn leaderboard(rows: &[performance_analytics::Model], limit: usize) -> Vec<(i32, i64)> {
    let mut totals: HashMap<i32, i64> = HashMap::new();
    for row in rows {
        *totals.entry(row.user_id).or_insert(0) += i64::from(row.total_score);
    }
    let mut ranked: Vec<(i32, i64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// Read-only reporting across users and courses
#[derive(Clone)]
pub struct PerformanceReporter {
    store: Arc<dyn LearningStore>,
    directory: Arc<dyn UserDirectory>,
}

impl PerformanceReporter {
    pub fn new(store: Arc<dyn LearningStore>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { store, directory }
    }

    /// Look up each user once. Failed lookups are logged and left out.
    async fn resolve_users(&self, ids: impl IntoIterator<Item = i32>) -> HashMap<i32, UserRecord> {
        let mut users = HashMap::new();
        let unique: BTreeSet<i32> = ids.into_iter().collect();
        for id in unique {
            match self.directory.get_user(id).await {
                Ok(Some(user)) => {
                    users.insert(id, user);
                }
                Ok(None) => warn!("User {} not found in the directory", id),
                Err(e) => warn!("Failed to fetch user {}: {}", id, e),
            }
        }
        users
    }

    async fn course_index(&self, ids: &[i32]) -> Result<HashMap<i32, course::Model>, CoreError> {
        Ok(self
            .store
            .courses_by_ids(ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect())
    }

    /// Scores of every user, grouped by user
    pub async fn manager_view(&self) -> Result<Vec<ManagerUserReport>, CoreError> {
        let rows = self.store.all_analytics().await?;
        let users = self.resolve_users(rows.iter().map(|r| r.user_id)).await;
        let course_ids: Vec<i32> = rows
            .iter()
            .map(|r| r.course_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let courses = self.course_index(&course_ids).await?;

        let mut reports: BTreeMap<i32, ManagerUserReport> = BTreeMap::new();
        for row in &rows {
            let Some(course) = courses.get(&row.course_id) else {
                continue;
            };
            let user = users.get(&row.user_id);
            let report = reports.entry(row.user_id).or_insert_with(|| ManagerUserReport {
                user_id: row.user_id,
                user_name: user.map(|u| u.name.clone()),
                user_email: user.map(|u| u.email.clone()),
                courses: Vec::new(),
            });

            report.courses.push(ManagerCourseScore {
                course_id: course.id,
                course_code: course.course_code.clone(),
                course_title: course.title.clone(),
                course_description: course.description.clone(),
                detailed_description: course.detailed_description.clone(),
                instructor: course.instructor.clone(),
                start_date: course.start_date.clone(),
                end_date: course.end_date.clone(),
                duration: course.duration.clone(),
                created_at: course.created_at,
                total_score: row.total_score,
                average_score: row.average_score,
            });
        }

        debug!("Manager view covers {} users", reports.len());
        Ok(reports.into_values().collect())
    }

    /// Course trends, leaderboard and per-user completion snapshot
    pub async fn hr_view(&self, filters: &HrFilters) -> Result<HrReport, CoreError> {
        let progress_filter = filters.to_progress_filter()?;
        let analytics = self.store.all_analytics().await?;

        let enrolled: HashSet<(i32, i32)> = self
            .store
            .enrollments(progress_filter)
            .await?
            .into_iter()
            .map(|e| (e.user_id, e.course_id))
            .collect();
        let mut snapshot: BTreeMap<i32, BTreeMap<i32, (f64, ProgressStatus)>> = BTreeMap::new();
        for row in self.store.progress_rows(progress_filter).await? {
            if enrolled.contains(&(row.user_id, row.course_id)) {
                snapshot
                    .entry(row.user_id)
                    .or_default()
                    .insert(row.course_id, (row.completion_percentage, row.status));
            }
        }

        let trends = course_trends(&analytics);
        let ranked = leaderboard(&analytics, TOP_PERFORMERS);

        let mut course_ids: BTreeSet<i32> = trends.iter().map(|t| t.0).collect();
        course_ids.extend(snapshot.values().flat_map(|courses| courses.keys().copied()));
        let courses = self
            .course_index(&course_ids.into_iter().collect::<Vec<_>>())
            .await?;
        let users = self
            .resolve_users(
                snapshot
                    .keys()
                    .copied()
                    .chain(ranked.iter().map(|(user_id, _)| *user_id)),
            )
            .await;
        let name_of = |user_id: i32| users.get(&user_id).map(|u| u.name.clone());

        let mut detailed_performance = Vec::with_capacity(snapshot.len());
        for (user_id, user_courses) in snapshot {
            let total_quiz_scores: i64 = self
                .store
                .results_for_user(user_id)
                .await?
                .iter()
                .map(|r| i64::from(r.score))
                .sum();
            let mut metrics = UserMetrics {
                total_quiz_scores,
                ..UserMetrics::default()
            };

            let completions = user_courses
                .into_iter()
                .map(|(course_id, (completion_percentage, status))| {
                    if status == ProgressStatus::Completed {
                        metrics.completed_courses += 1;
                    } else {
                        metrics.active_courses += 1;
                    }
                    metrics.total_courses += 1;

                    let course = courses.get(&course_id);
                    UserCourseCompletion {
                        course_id,
                        course_title: course.map(|c| c.title.clone()),
                        start_date: course.map(|c| c.start_date.clone()),
                        end_date: course.map(|c| c.end_date.clone()),
                        completion_percentage,
                        status,
                    }
                })
                .collect();

            detailed_performance.push(UserPerformance {
                user_id,
                user_name: name_of(user_id),
                courses: completions,
                metrics,
            });
        }

        Ok(HrReport {
            trends: trends
                .into_iter()
                .map(|(course_id, average_score, total_score, total_employees)| CourseTrend {
                    course_id,
                    course_title: courses.get(&course_id).map(|c| c.title.clone()),
                    average_score,
                    total_score,
                    total_employees,
                })
                .collect(),
            top_performers: ranked
                .into_iter()
                .map(|(user_id, total_score)| TopPerformer {
                    user_id,
                    user_name: name_of(user_id),
                    total_score,
                })
                .collect(),
            detailed_performance,
        })
    }

    /// Enrollments, completion and quiz scores of one user
    pub async fn individual_view(&self, user_id: i32) -> Result<IndividualPerformance, CoreError> {
        let enrollments = self.store.enrollments_for_user(user_id).await?;
        let progress = self.store.progress_for_user(user_id).await?;
        let results = self.store.results_for_user(user_id).await?;

        let course_ids: Vec<i32> = progress.iter().map(|p| p.course_id).collect();
        let courses = self.course_index(&course_ids).await?;

        let active_courses = progress
            .iter()
            .filter(|p| p.status == ProgressStatus::InProgress)
            .count();
        let completed_courses = progress
            .iter()
            .filter(|p| p.status == ProgressStatus::Completed)
            .count();

        Ok(IndividualPerformance {
            team_member_id: user_id,
            enrolled_courses: enrollments
                .into_iter()
                .map(|e| EnrolledCourseStatus {
                    course_id: e.course_id,
                    status: e.status,
                })
                .collect(),
            course_progress: progress
                .into_iter()
                .map(|p| CourseCompletion {
                    course_id: p.course_id,
                    course_name: courses.get(&p.course_id).map(|c| c.title.clone()),
                    completion_percentage: p.completion_percentage,
                })
                .collect(),
            quiz_scores: results
                .into_iter()
                .map(|r| QuizScore {
                    module_id: r.module_id,
                    score: r.score,
                })
                .collect(),
            active_courses,
            completed_courses,
        })
    }
}
