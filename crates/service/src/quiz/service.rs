use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::metrics::{QUIZZES_CREATED_TOTAL, RESULT_REQUESTS_TOTAL, SUBMISSIONS_REJECTED_TOTAL};
use tracing::{debug, info, instrument};

use crate::errors::ServiceError;
use crate::quiz::domain::{NewQuizInput, Quiz, QuizDocument};
use crate::quiz::repository::QuizRepository;
use crate::quiz::window::{release_status, window_contains, Release};

/// Application service over a quiz repository.
pub struct QuizService<R: QuizRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: QuizRepository + ?Sized> QuizService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Validate a submission and persist it under the next id.
    #[instrument(skip_all)]
    pub async fn create(&self, input: NewQuizInput) -> Result<Quiz, ServiceError> {
        let new = match input.validate() {
            Ok(new) => new,
            Err(e) => {
                if matches!(e, ServiceError::MissingFields(_)) {
                    SUBMISSIONS_REJECTED_TOTAL.inc();
                }
                return Err(e);
            }
        };
        let quiz = self.repo.create(new).await?;
        QUIZZES_CREATED_TOTAL.inc();
        info!(quiz_id = quiz.id, options = quiz.options.len(), "quiz created");
        Ok(quiz)
    }

    pub async fn active(&self) -> Result<Option<QuizDocument>, ServiceError> {
        self.active_at(Utc::now()).await
    }

    /// First stored quiz whose window contains `now`.
    #[instrument(skip(self))]
    pub async fn active_at(&self, now: DateTime<Utc>) -> Result<Option<QuizDocument>, ServiceError> {
        for doc in self.repo.list().await? {
            if window_contains(doc.start_date()?, doc.end_date()?, now)? {
                debug!(quiz_id = ?doc.id().ok(), "active quiz found");
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }

    pub async fn result(&self, id: u64) -> Result<QuizDocument, ServiceError> {
        self.result_at(id, Utc::now()).await
    }

    /// Full quiz, answer included, once its end date plus the grace period has passed.
    #[instrument(skip(self))]
    pub async fn result_at(&self, id: u64, now: DateTime<Utc>) -> Result<QuizDocument, ServiceError> {
        let Some(doc) = self.repo.get_by_id(id).await? else {
            RESULT_REQUESTS_TOTAL.with_label_values(&["not_found"]).inc();
            return Err(ServiceError::NotFound(id));
        };
        match release_status(doc.end_date()?, now)? {
            Release::Available => {
                RESULT_REQUESTS_TOTAL.with_label_values(&["released"]).inc();
                Ok(doc)
            }
            Release::Pending { remaining_secs } => {
                RESULT_REQUESTS_TOTAL.with_label_values(&["pending"]).inc();
                Err(ServiceError::NotYetAvailable { remaining_secs })
            }
        }
    }

    /// Every stored quiz with its answer removed.
    #[instrument(skip(self))]
    pub async fn list_public(&self) -> Result<Vec<QuizDocument>, ServiceError> {
        let docs = self
            .repo
            .list()
            .await?
            .into_iter()
            .map(QuizDocument::without_answer)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = docs.len(), "listed quizzes");
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::quiz_store::MemoryQuizStore;
    use crate::quiz::window::parse_timestamp;
    use serde_json::json;

    fn at(s: &str) -> DateTime<Utc> {
        parse_timestamp(s).expect("timestamp").with_timezone(&Utc)
    }

    fn submission(question: &str, start: &str, end: &str) -> NewQuizInput {
        serde_json::from_value(json!({
            "question": question,
            "options": ["a", "b", "c"],
            "answer": 2,
            "start_date": start,
            "end_date": end
        }))
        .expect("input")
    }

    fn service() -> QuizService<MemoryQuizStore> {
        QuizService::new(Arc::new(MemoryQuizStore::new()))
    }

    #[tokio::test]
    async fn ids_follow_existing_count() -> Result<(), anyhow::Error> {
        let svc = service();
        for expected in 1..=3u64 {
            let q = svc
                .create(submission("q", "2021-01-01T00:00:00Z", "2021-01-02T00:00:00Z"))
                .await?;
            assert_eq!(q.id, expected);
        }
        Ok(())
    }

    #[tokio::test]
    async fn minute_precision_dates_are_accepted() -> Result<(), anyhow::Error> {
        let svc = service();
        let q = svc.create(submission("day one", "2021-01-01T00:00Z", "2021-01-02T00:00Z")).await?;
        assert_eq!(q.id, 1);

        let active = svc.active_at(at("2021-01-01T12:00Z")).await?.expect("active at midday");
        assert_eq!(active.as_map()["start_date"], "2021-01-01T00:00Z");
        assert!(svc.active_at(at("2021-01-02T00:01Z")).await?.is_none());

        let released = svc.result_at(1, at("2021-01-02T00:06Z")).await?;
        assert_eq!(released.as_map()["answer"], 2);
        Ok(())
    }

    #[tokio::test]
    async fn active_returns_first_matching_window_or_none() -> Result<(), anyhow::Error> {
        let svc = service();
        assert!(svc.active_at(at("2021-01-01T12:00:00Z")).await?.is_none());

        svc.create(submission("past", "2020-01-01T00:00:00Z", "2020-01-02T00:00:00Z")).await?;
        svc.create(submission("now", "2021-01-01T00:00:00Z", "2021-01-02T00:00:00Z")).await?;
        svc.create(submission("overlap", "2021-01-01T06:00:00Z", "2021-01-03T00:00:00Z")).await?;

        let active = svc.active_at(at("2021-01-01T12:00:00Z")).await?.expect("active");
        assert_eq!(active.as_map()["question"], "now");
        assert_eq!(active.as_map()["answer"], 2);

        assert!(svc.active_at(at("2022-06-01T00:00:00Z")).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn result_waits_for_grace_period() -> Result<(), anyhow::Error> {
        let svc = service();
        let q = svc
            .create(submission("q", "2021-01-01T00:00:00Z", "2021-01-02T00:00:00.000Z"))
            .await?;

        match svc.result_at(q.id, at("2021-01-02T00:04:59Z")).await {
            Err(ServiceError::NotYetAvailable { remaining_secs }) => {
                assert!(remaining_secs > 0.0 && (remaining_secs - 1.0).abs() < 1e-6)
            }
            other => panic!("expected pending, got {other:?}"),
        }

        let released = svc.result_at(q.id, at("2021-01-02T00:05:01Z")).await?;
        assert_eq!(released.as_map()["answer"], 2);
        assert_eq!(released, QuizDocument::from(&q));
        Ok(())
    }

    #[tokio::test]
    async fn result_for_unknown_id_is_not_found() {
        let svc = service();
        assert!(matches!(svc.result(42).await, Err(ServiceError::NotFound(42))));
    }

    #[tokio::test]
    async fn listing_hides_answers_and_keeps_fields() -> Result<(), anyhow::Error> {
        let svc = service();
        let created = svc
            .create(submission("Which?", "2021-01-01T00:00:00+05:30", "2021-01-02T00:00:00+05:30"))
            .await?;
        let all = svc.list_public().await?;
        assert_eq!(all.len(), 1);
        let doc = all[0].as_map();
        assert!(!doc.contains_key("answer"));
        assert_eq!(doc["question"], created.question.as_str());
        assert_eq!(doc["options"], json!(created.options));
        assert_eq!(doc["start_date"], "2021-01-01T00:00:00+05:30");
        assert_eq!(doc["end_date"], "2021-01-02T00:00:00+05:30");
        Ok(())
    }

    #[tokio::test]
    async fn listing_fails_when_a_record_has_no_answer() {
        let broken: QuizDocument = serde_json::from_value(json!({
            "id": 1, "question": "q", "options": ["a"],
            "start_date": "2021-01-01T00:00:00Z", "end_date": "2021-01-02T00:00:00Z"
        }))
        .expect("doc");
        let svc = QuizService::new(Arc::new(MemoryQuizStore::with_documents(vec![broken])));
        assert!(matches!(svc.list_public().await, Err(ServiceError::MissingField("answer"))));
        // the other lookups still work on it
        assert!(svc.active_at(at("2021-01-01T01:00:00Z")).await.expect("active").is_some());
    }

    #[tokio::test]
    async fn missing_fields_do_not_persist() {
        let svc = service();
        let err = svc.create(NewQuizInput::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingFields(ref f) if f.len() == 5));
        assert!(svc.list_public().await.expect("list").is_empty());
    }
}
