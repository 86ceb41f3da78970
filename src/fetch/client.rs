use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. Wrappers such as [`super::ApiKey`] decorate
/// requests before handing them to an inner client.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// Lets concurrent tasks share one client.
#[async_trait]
impl<C: HttpClient + ?Sized> HttpClient for Arc<C> {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        (**self).execute(req).await
    }
}
