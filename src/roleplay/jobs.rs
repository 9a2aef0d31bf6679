/// Job assignment rules for a character record.
use serde::Serialize;

use super::errors::{RoleplayError, RoleplayResult};
use super::types::{CharacterRecord, JobAssignment, JobDefinition};
use crate::config::JobsConfig;

pub const UNEMPLOYED: &str = "Unemployed";
pub const NO_GRADE: &str = "N/A";
pub const UNKNOWN_RANK: &str = "Unknown Rank";

/// Job and rank labels shown on the HUD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobLabel {
    pub job_name: String,
    pub grade_name: String,
}

impl JobLabel {
    pub fn unemployed() -> Self {
        Self {
            job_name: UNEMPLOYED.to_string(),
            grade_name: NO_GRADE.to_string(),
        }
    }
}

/// Give `job` at `grade` to the character.
///
/// With double jobs disabled a character holds one job: re-assigning the held job changes
/// its grade, any other job replaces the list. With double jobs enabled the grade of a
/// held job is updated, otherwise the job is appended up to `max_jobs`.
pub fn assign_job(
    record: &mut CharacterRecord,
    job: &JobDefinition,
    grade: u32,
    config: &JobsConfig,
) -> RoleplayResult<()> {
    if job.rank(grade).is_none() {
        return Err(RoleplayError::InvalidArgument(format!(
            "job {} has no grade {}",
            job.name, grade
        )));
    }

    if let Some(existing) = record.jobs.iter_mut().find(|j| j.name == job.name) {
        existing.grade = grade;
        return Ok(());
    }

    if !config.double_job_allowed {
        record.jobs = vec![JobAssignment::new(&job.name, grade)];
        return Ok(());
    }

    if record.jobs.len() >= config.max_jobs {
        return Err(RoleplayError::CapacityExceeded(format!(
            "already holds {} of {} jobs",
            record.jobs.len(),
            config.max_jobs
        )));
    }
    record.jobs.push(JobAssignment::new(&job.name, grade));
    Ok(())
}

/// Drop a job by name. Returns false when it was not held.
pub fn remove_job(record: &mut CharacterRecord, job_name: &str) -> bool {
    let before = record.jobs.len();
    record.jobs.retain(|j| j.name != job_name);
    record.jobs.len() != before
}

/// The first (primary) job.
pub fn primary_job(record: &CharacterRecord) -> Option<&JobAssignment> {
    record.jobs.first()
}

pub fn has_job(record: &CharacterRecord, job_name: &str) -> bool {
    record.jobs.iter().any(|j| j.name == job_name)
}

pub fn has_job_grade(record: &CharacterRecord, job_name: &str, grade: u32) -> bool {
    record
        .jobs
        .iter()
        .any(|j| j.name == job_name && j.grade == grade)
}

/// Labels for the primary job.
pub fn job_label<'a>(
    record: &CharacterRecord,
    lookup: impl Fn(&str) -> Option<&'a JobDefinition>,
) -> JobLabel {
    let Some(assignment) = primary_job(record) else {
        return JobLabel::unemployed();
    };
    let Some(definition) = lookup(&assignment.name) else {
        return JobLabel::unemployed();
    };
    JobLabel {
        job_name: assignment.name.clone(),
        grade_name: definition
            .rank(assignment.grade)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| UNKNOWN_RANK.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn police() -> JobDefinition {
        JobDefinition::new(
            "police",
            &[
                ("Cadet", 1),
                ("Officer", 2),
                ("Sergeant", 3),
                ("Lieutenant", 4),
                ("Captain", 5),
            ],
        )
    }

    fn medic() -> JobDefinition {
        JobDefinition::new("medic", &[("Paramedic", 1), ("Medic", 2), ("Senior Medic", 3)])
    }

    fn character() -> CharacterRecord {
        CharacterRecord::new("char-1", "John Doe", 40)
    }

    #[test]
    fn single_job_mode_replaces_other_job() {
        let config = JobsConfig::default();
        let mut record = character();
        assign_job(&mut record, &medic(), 1, &config).expect("medic");
        assign_job(&mut record, &police(), 2, &config).expect("police");
        assert_eq!(record.jobs, vec![JobAssignment::new("police", 2)]);
    }

    #[test]
    fn reassigning_held_job_updates_grade() {
        let config = JobsConfig::default();
        let mut record = character();
        assign_job(&mut record, &police(), 1, &config).expect("cadet");
        assign_job(&mut record, &police(), 4, &config).expect("lieutenant");
        assert_eq!(record.jobs, vec![JobAssignment::new("police", 4)]);
    }

    #[test]
    fn invalid_grade_is_rejected() {
        let config = JobsConfig::default();
        let mut record = character();
        let err = assign_job(&mut record, &medic(), 7, &config).unwrap_err();
        assert!(matches!(err, RoleplayError::InvalidArgument(_)));
        assert!(record.jobs.is_empty());
    }

    #[test]
    fn double_jobs_respect_max_jobs() {
        let config = JobsConfig {
            double_job_allowed: true,
            max_jobs: 2,
        };
        let mut record = character();
        assign_job(&mut record, &police(), 2, &config).expect("police");
        assign_job(&mut record, &medic(), 1, &config).expect("medic");
        let taxi = JobDefinition::new("taxi", &[("Driver", 1)]);
        let err = assign_job(&mut record, &taxi, 1, &config).unwrap_err();
        assert!(matches!(err, RoleplayError::CapacityExceeded(_)));
        assert_eq!(record.jobs.len(), 2);
        assert!(has_job_grade(&record, "medic", 1));
    }

    #[test]
    fn remove_and_query_jobs() {
        let config = JobsConfig::default();
        let mut record = character();
        assign_job(&mut record, &police(), 3, &config).expect("assign");
        assert!(has_job(&record, "police"));
        assert!(!has_job_grade(&record, "police", 2));
        assert!(remove_job(&mut record, "police"));
        assert!(!remove_job(&mut record, "police"));
        assert!(primary_job(&record).is_none());
    }

    #[test]
    fn labels_fall_back() {
        let config = JobsConfig::default();
        let jobs = [police()];
        let lookup = |name: &str| jobs.iter().find(|j| j.name == name);

        let mut record = character();
        assert_eq!(job_label(&record, lookup), JobLabel::unemployed());

        assign_job(&mut record, &police(), 2, &config).expect("assign");
        let label = job_label(&record, lookup);
        assert_eq!(label.job_name, "police");
        assert_eq!(label.grade_name, "Officer");

        record.jobs[0].grade = 9;
        assert_eq!(job_label(&record, lookup).grade_name, UNKNOWN_RANK);
    }
}
