//! Background loader for quiz data: fetches the question and string documents
//! and indexes their rows by key. Runs as its own task and talks to callers
//! only through messages.

use crate::utils::error::{CommerceError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

const QUESTION_KEY: &str = "questions";
const STRING_KEY: &str = "q";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDataRequest {
    pub question_url: String,
    pub string_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizData {
    pub question_data: Value,
    pub question_list: BTreeMap<String, Value>,
    pub string_data: Value,
    pub string_q_list: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuizReply {
    Data(Box<QuizData>),
    Error { error: String },
}

/// 以指定欄位為 key 建立 `questions.data[]` 的索引
pub fn index_rows(document: &Value, key_field: &str) -> Result<BTreeMap<String, Value>> {
    let rows = document
        .get("questions")
        .and_then(|questions| questions.get("data"))
        .and_then(Value::as_array)
        .ok_or_else(|| CommerceError::MalformedDataError {
            message: "quiz document has no questions.data array".to_string(),
        })?;

    let mut index = BTreeMap::new();
    for row in rows {
        let key = match row.get(key_field) {
            Some(Value::String(key)) => key.clone(),
            Some(Value::Null) | None => {
                tracing::debug!("Skipping quiz row without '{}'", key_field);
                continue;
            }
            Some(other) => other.to_string(),
        };
        index.insert(key, row.clone());
    }
    Ok(index)
}

async fn fetch_json(client: &Client, url: &str) -> Result<Value> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.json().await?)
}

pub async fn load_quiz_data(client: &Client, request: &QuizDataRequest) -> Result<QuizData> {
    let (question_data, string_data) = tokio::try_join!(
        fetch_json(client, &request.question_url),
        fetch_json(client, &request.string_url),
    )?;

    let question_list = index_rows(&question_data, QUESTION_KEY)?;
    let string_q_list = index_rows(&string_data, STRING_KEY)?;
    tracing::debug!(
        "Indexed {} questions and {} strings",
        question_list.len(),
        string_q_list.len()
    );

    Ok(QuizData {
        question_data,
        question_list,
        string_data,
        string_q_list,
    })
}

struct QuizJob {
    request: QuizDataRequest,
    reply: oneshot::Sender<QuizReply>,
}

#[derive(Debug)]
pub struct QuizWorker {
    sender: mpsc::Sender<QuizJob>,
    handle: JoinHandle<()>,
}

impl std::fmt::Debug for QuizJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizJob").field("request", &self.request).finish()
    }
}

pub fn spawn_quiz_worker(client: Client) -> QuizWorker {
    let (sender, mut receiver) = mpsc::channel::<QuizJob>(8);
    let handle = tokio::spawn(async move {
        while let Some(job) = receiver.recv().await {
            let reply = match load_quiz_data(&client, &job.request).await {
                Ok(data) => QuizReply::Data(Box::new(data)),
                Err(e) => {
                    tracing::warn!("Quiz data load failed: {}", e);
                    QuizReply::Error {
                        error: e.to_string(),
                    }
                }
            };
            if job.reply.send(reply).is_err() {
                tracing::debug!("Quiz caller went away before the reply");
            }
        }
    });
    QuizWorker { sender, handle }
}

impl QuizWorker {
    pub async fn request(&self, request: QuizDataRequest) -> Result<QuizReply> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(QuizJob { request, reply })
            .await
            .map_err(|_| CommerceError::WorkerError {
                message: "quiz worker is no longer running".to_string(),
            })?;
        response.await.map_err(|_| CommerceError::WorkerError {
            message: "quiz worker dropped the request".to_string(),
        })
    }

    pub async fn shutdown(self) {
        drop(self.sender);
        if let Err(e) = self.handle.await {
            tracing::warn!("Quiz worker ended abnormally: {}", e);
        }
    }
}
