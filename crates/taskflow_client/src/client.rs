//! Typed HTTP client for the TaskFlow REST API.
//!
//! # Responsibility
//! - Map each API route to one async method with typed inputs and outputs.
//! - Turn failure envelopes into [`ClientError::Api`].
//!
//! # Invariants
//! - Every task call takes an explicit `&Session`; there is no ambient token.
//! - Blank titles are rejected locally before a create request is sent.

use crate::error::ClientError;
use crate::session::Session;
use log::debug;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use taskflow_core::{
    CreateTaskInput, HealthEnvelope, LoginInput, MessageEnvelope, RegisterInput,
    SessionEnvelope, Task, TaskEnvelope, TaskId, TaskListEnvelope, TaskListFilter,
    UpdateTaskInput, User, UserEnvelope,
};

pub struct TaskflowClient {
    http: Client,
    base_url: Url,
}

impl TaskflowClient {
    /// Creates a client for the server at `base_url`.
    ///
    /// The base may carry a path prefix (`http://host/taskflow`); API routes
    /// are resolved beneath it.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_http(Client::new(), base_url)
    }

    /// Reuses a caller-configured `reqwest::Client`.
    pub fn with_http(http: Client, base_url: &str) -> Result<Self, ClientError> {
        let invalid = || ClientError::InvalidBaseUrl(base_url.to_string());
        let mut url = Url::parse(base_url).map_err(|_| invalid())?;
        if url.cannot_be_a_base() {
            return Err(invalid());
        }
        if !url.path().ends_with('/') {
            let prefix = format!("{}/", url.path());
            url.set_path(&prefix);
        }
        Ok(Self {
            http,
            base_url: url,
        })
    }

    pub async fn health(&self) -> Result<HealthEnvelope, ClientError> {
        let request = self.http.get(self.endpoint("api/health")?);
        send(request).await
    }

    pub async fn register(&self, input: &RegisterInput) -> Result<Session, ClientError> {
        let request = self
            .http
            .post(self.endpoint("api/auth/register")?)
            .json(input);
        let envelope: SessionEnvelope = send(request).await?;
        Ok(envelope.into())
    }

    pub async fn login(&self, input: &LoginInput) -> Result<Session, ClientError> {
        let request = self.http.post(self.endpoint("api/auth/login")?).json(input);
        let envelope: SessionEnvelope = send(request).await?;
        Ok(envelope.into())
    }

    pub async fn me(&self, session: &Session) -> Result<User, ClientError> {
        let request = self.authed(self.http.get(self.endpoint("api/auth/me")?), session);
        let envelope: UserEnvelope = send(request).await?;
        Ok(envelope.user)
    }

    /// Revokes `session` on the server.
    pub async fn logout(&self, session: Session) -> Result<(), ClientError> {
        let request = self.authed(self.http.post(self.endpoint("api/auth/logout")?), &session);
        let _: MessageEnvelope = send(request).await?;
        Ok(())
    }

    /// Lists the caller's tasks, newest first, filtered server-side.
    pub async fn list_tasks(
        &self,
        session: &Session,
        filter: &TaskListFilter,
    ) -> Result<Vec<Task>, ClientError> {
        let mut url = self.endpoint("api/tasks")?;
        let mut pairs = Vec::new();
        if let Some(status) = filter.status {
            pairs.push(("status", status.as_str()));
        }
        if let Some(priority) = filter.priority {
            pairs.push(("priority", priority.as_str()));
        }
        if let Some(search) = filter.search.as_deref().filter(|term| !term.trim().is_empty()) {
            pairs.push(("search", search));
        }
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let envelope: TaskListEnvelope = send(self.authed(self.http.get(url), session)).await?;
        debug!(
            "event=task_list module=client status=ok count={}",
            envelope.count
        );
        Ok(envelope.tasks)
    }

    pub async fn get_task(&self, session: &Session, id: TaskId) -> Result<Task, ClientError> {
        let request = self.authed(self.http.get(self.task_endpoint(id)?), session);
        let envelope: TaskEnvelope = send(request).await?;
        Ok(envelope.task)
    }

    pub async fn create_task(
        &self,
        session: &Session,
        input: &CreateTaskInput,
    ) -> Result<Task, ClientError> {
        if input.title.as_deref().map_or(true, |title| title.trim().is_empty()) {
            return Err(ClientError::Validation(
                "Task title is required".to_string(),
            ));
        }

        let request = self
            .authed(self.http.post(self.endpoint("api/tasks")?), session)
            .json(input);
        let envelope: TaskEnvelope = send(request).await?;
        Ok(envelope.task)
    }

    pub async fn update_task(
        &self,
        session: &Session,
        id: TaskId,
        input: &UpdateTaskInput,
    ) -> Result<Task, ClientError> {
        let request = self
            .authed(self.http.put(self.task_endpoint(id)?), session)
            .json(input);
        let envelope: TaskEnvelope = send(request).await?;
        Ok(envelope.task)
    }

    /// Deletes a task; returns the server's confirmation message.
    pub async fn delete_task(&self, session: &Session, id: TaskId) -> Result<String, ClientError> {
        let request = self.authed(self.http.delete(self.task_endpoint(id)?), session);
        let envelope: MessageEnvelope = send(request).await?;
        Ok(envelope.message)
    }

    /// `path` is relative so the base's own path prefix survives the join.
    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|_| ClientError::InvalidBaseUrl(format!("{}{path}", self.base_url)))
    }

    fn task_endpoint(&self, id: TaskId) -> Result<Url, ClientError> {
        self.endpoint(&format!("api/tasks/{id}"))
    }

    fn authed(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        request.bearer_auth(session.token())
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = match response.json::<MessageEnvelope>().await {
        Ok(envelope) => envelope.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
