//! Today's-question query.

use std::sync::Arc;

use thiserror::Error;
use triviad_domain::Question;

use crate::ports::store::{QuestionStore, StoreError};

#[derive(Error, Debug)]
pub enum GetTodayError {
    #[error("no question yet")]
    NoQuestion,

    #[error(transparent)]
    Store(StoreError),
}

/// Use case returning the most recently created question.
pub struct GetTodayUseCase {
    store: Arc<dyn QuestionStore>,
}

impl GetTodayUseCase {
    pub fn new(store: Arc<dyn QuestionStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self) -> Result<Question, GetTodayError> {
        self.store.latest_question().await.map_err(|err| match err {
            StoreError::NotFound => GetTodayError::NoQuestion,
            other => GetTodayError::Store(other),
        })
    }
}
